//! Heuristic bot players.
//!
//! `bot_actions` fills a turn for one player from a fixed priority list. Every
//! action it emits satisfies its preconditions against the state it was given,
//! taking the batch's resolution order into account, so a bot batch never
//! fails validation or resolution.

use crate::board::{
    ActionKind, CrewId, CrewMember, CrewStatus, GameState, ManeuverDirection, ObjectKind, PlayerAction, PlayerId,
    PlayerState, PowerTransfer, RepairTarget, ShipSection, SpaceObject, ALL_SECTIONS, SECTION_COUNT,
};
use crate::board::section::has_corridor;
use crate::power::{self, POWER_PER_CONDUIT};
use crate::resolve::sensors::{ACQUIRE_BASE_RANGE, SCAN_BASE_RANGE};

/// Turns before the limit at which bots head for the exit.
pub const ESCAPE_MARGIN: u32 = 3;

const MAX_TOTAL_HULL: u32 = 70;

/// Power each section can still give up this turn.
struct PowerBudget([u32; SECTION_COUNT]);

impl PowerBudget {
    fn of(player: &PlayerState) -> Self {
        PowerBudget(ALL_SECTIONS.map(|s| player.ship.power(s)))
    }

    fn get(&self, section: ShipSection) -> u32 {
        self.0[section.index()]
    }

    fn take(&mut self, section: ShipSection, amount: u32) {
        let slot = &mut self.0[section.index()];
        *slot = slot.saturating_sub(amount);
    }

    fn give(&mut self, section: ShipSection, amount: u32) {
        self.0[section.index()] += amount;
    }
}

/// Planning state for one player's turn.
struct Planner<'a> {
    state: &'a GameState,
    player: &'a PlayerState,
    budget: PowerBudget,
    idle: Vec<&'a CrewMember>,
    actions: Vec<PlayerAction>,
    moving: bool,
}

impl<'a> Planner<'a> {
    fn assign(&mut self, member: &CrewId, kind: ActionKind) {
        self.idle.retain(|m| m.id != *member);
        self.actions.push(PlayerAction::new(&self.player.id, member, kind));
    }

    /// First idle member standing in an intact `section`.
    fn idle_in(&self, section: ShipSection) -> Option<CrewId> {
        if self.player.ship.hull(section) == 0 {
            return None;
        }
        self.idle.iter().find(|m| m.location == Some(section)).map(|m| m.id.clone())
    }

    /// Thrust for this turn's climb, if the ship wants to move. Ships below
    /// the outer ring always climb; on the outer ring they escape once badly
    /// hurt or short of turns.
    fn climb_thrust(&self) -> Option<u32> {
        let ship = &self.player.ship;
        if ship.position.ring > 0 {
            return self.state.board.ring(ship.position.ring).map(|r| r.speed_requirement);
        }
        let hurt = ship.total_hull() * 2 < MAX_TOTAL_HULL;
        let late = self.state.current_turn + ESCAPE_MARGIN >= self.state.settings.max_turns;
        (hurt || late).then_some(self.state.settings.escape_speed)
    }

    fn plan_engineering(&mut self) {
        if let Some(crew) = self.idle_in(ShipSection::Engineering) {
            self.assign(&crew, ActionKind::Restore { transfers: Vec::new() });
        }
        let player = self.player;
        let ship = &player.ship;
        let Some(need) = self.climb_thrust() else { return };
        let short = need.saturating_sub(self.budget.get(ShipSection::Drives));
        if short == 0 || ship.hull(ShipSection::Drives) == 0 {
            return;
        }
        let Some(path) = power::find_path(ship, ShipSection::Engineering, ShipSection::Drives) else { return };
        let capacity = power::bottleneck(ship, &path).map_or(0, |(_, c)| u32::from(c) * POWER_PER_CONDUIT);
        let amount = short.min(capacity).min(self.budget.get(ShipSection::Engineering));
        if amount == 0 {
            return;
        }
        let Some(crew) = self.idle_in(ShipSection::Engineering) else { return };
        self.budget.take(ShipSection::Engineering, amount);
        self.budget.give(ShipSection::Drives, amount);
        let transfers = vec![PowerTransfer::between(ShipSection::Engineering, ShipSection::Drives, amount)];
        self.assign(&crew, ActionKind::Route { transfers });
    }

    fn plan_maneuver(&mut self) {
        if self.player.ship.hull(ShipSection::Drives) == 0 || self.budget.get(ShipSection::Bridge) == 0 {
            return;
        }
        let Some(need) = self.climb_thrust() else { return };
        if self.budget.get(ShipSection::Drives) < need {
            return;
        }
        let Some(crew) = self.idle_in(ShipSection::Bridge) else { return };
        self.budget.take(ShipSection::Drives, need);
        // Bridge must stay powered until the maneuver resolves.
        self.budget.take(ShipSection::Bridge, 1);
        self.moving = true;
        self.assign(&crew, ActionKind::Maneuver { direction: ManeuverDirection::Outward, power: need });
    }

    fn plan_revives(&mut self) {
        if self.budget.get(ShipSection::MedLab) == 0 {
            return;
        }
        let patients: Vec<CrewId> = self
            .player
            .members()
            .filter(|m| m.status == CrewStatus::Unconscious)
            .map(|m| m.id.clone())
            .collect();
        let mut reserved = false;
        for patient in patients {
            let Some(crew) = self.idle_in(ShipSection::MedLab) else { break };
            if !reserved {
                self.budget.take(ShipSection::MedLab, 1);
                reserved = true;
            }
            self.assign(&crew, ActionKind::Revive { target: patient });
        }
    }

    fn plan_sensors(&mut self) {
        if self.moving {
            return;
        }
        let (state, player) = (self.state, self.player);
        let board = &state.board;
        let here = player.ship.position;
        let mut by_distance: Vec<(&SpaceObject, u32)> =
            board.objects.iter().map(|o| (o, board.distance(here, o.position))).collect();
        by_distance.sort_by_key(|(_, d)| *d);

        let claimable = by_distance.iter().find(|(o, d)| {
            *d <= ACQUIRE_BASE_RANGE
                && player.has_discovered(&o.id)
                && match &o.kind {
                    ObjectKind::Hazard { .. } | ObjectKind::HostileShip { .. } => false,
                    ObjectKind::FunctionalStation { visited_by } => !visited_by.contains(&player.id),
                    _ => true,
                }
        });
        if let Some((obj, _)) = claimable {
            if self.budget.get(ShipSection::SciLab) >= 1 {
                if let Some(crew) = self.idle_in(ShipSection::SciLab) {
                    self.budget.take(ShipSection::SciLab, 1);
                    self.assign(&crew, ActionKind::Acquire { target: obj.id.clone() });
                }
            }
        }

        let range = SCAN_BASE_RANGE.saturating_sub(state.scan_penalty());
        let unscanned = by_distance.iter().find(|(o, d)| *d <= range && !player.scan_cache.contains_key(&o.id));
        if let Some((obj, _)) = unscanned {
            if self.budget.get(ShipSection::SciLab) >= 1 {
                if let Some(crew) = self.idle_in(ShipSection::SciLab) {
                    self.budget.take(ShipSection::SciLab, 1);
                    self.assign(&crew, ActionKind::Scan { target: obj.id.clone() });
                }
            }
        }
    }

    /// Hull repairs, worst damaged section first, by any idle member who can
    /// reach it and pay the power.
    fn plan_repairs(&mut self) {
        let player = self.player;
        let ship = &player.ship;
        let mut damaged: Vec<ShipSection> = ALL_SECTIONS
            .into_iter()
            .filter(|&s| ship.hull(s) < s.max_hull())
            .collect();
        damaged.sort_by_key(|&s| std::cmp::Reverse(s.max_hull() - ship.hull(s)));

        for section in damaged {
            let helper = self.idle.iter().find_map(|m| {
                let here = m.location?;
                let reachable = here == section || (has_corridor(here, section) && ship.corridor_intact(here, section));
                (reachable && ship.hull(here) > 0 && self.budget.get(here) >= 1).then(|| (m.id.clone(), here))
            });
            let Some((crew, here)) = helper else { continue };
            self.budget.take(here, 1);
            self.assign(&crew, ActionKind::Repair { section, target: RepairTarget::Hull });
        }
    }
}

/// A full turn of actions for `player`. Empty if the player is not in play.
pub fn bot_actions(state: &GameState, player: &PlayerId) -> Vec<PlayerAction> {
    let Some(p) = state.player(player).filter(|p| p.is_active()) else {
        return Vec::new();
    };
    let mut planner = Planner {
        state,
        player: p,
        budget: PowerBudget::of(p),
        idle: p.members().filter(|m| m.is_active()).collect(),
        actions: Vec::new(),
        moving: false,
    };
    planner.plan_engineering();
    planner.plan_maneuver();
    planner.plan_revives();
    planner.plan_sensors();
    planner.plan_repairs();
    planner.actions
}
