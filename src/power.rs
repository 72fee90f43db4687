//! Power storage and routing.
//!
//! Each section stores power as dice (values 1..=6). Power moves between
//! sections along conduits; an edge safely carries three power per conduit.
//! Loads are accumulated per edge over a player's whole action batch and
//! settled once at the end, so splitting a large transfer does not avoid the
//! overload.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::board::section::MAX_DIE;
use crate::board::{Edge, PowerNode, Ship, ShipSection, ALL_SECTIONS, SECTION_COUNT};

/// Power each conduit carries before the edge overloads.
pub const POWER_PER_CONDUIT: u32 = 3;

/// Errors from power storage and routing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowerError {
    #[error("{} holds {available} power, {requested} requested", .section.name())]
    InsufficientPower { section: ShipSection, available: u32, requested: u32 },

    #[error("life support holds {available}, {requested} requested")]
    InsufficientLifeSupport { available: u32, requested: u32 },

    #[error("no conduit path from {} to {}; repair a conduit first", .from.name(), .to.name())]
    NoConduitPath { from: ShipSection, to: ShipSection },

    #[error("transfer amount must be positive")]
    ZeroAmount,

    #[error("transfer source and destination are the same")]
    SameEndpoint,
}

/// Removes `amount` power from a section, draining the last die first.
pub fn spend(ship: &mut Ship, section: ShipSection, amount: u32) -> Result<(), PowerError> {
    let available = ship.power(section);
    if available < amount {
        return Err(PowerError::InsufficientPower { section, available, requested: amount });
    }
    let dice = &mut ship.section_mut(section).power_dice;
    let mut remaining = amount;
    while remaining > 0 {
        let Some(last) = dice.last_mut() else {
            break;
        };
        let take = remaining.min(u32::from(*last));
        *last -= take as u8;
        remaining -= take;
        if *last == 0 {
            dice.pop();
        }
    }
    Ok(())
}

/// Adds power to a section: tops up existing dice, then appends new ones.
pub fn add(ship: &mut Ship, section: ShipSection, amount: u32) {
    let dice = &mut ship.section_mut(section).power_dice;
    let mut remaining = amount;
    for die in dice.iter_mut() {
        if remaining == 0 {
            break;
        }
        let room = u32::from(MAX_DIE - *die);
        let put = room.min(remaining);
        *die += put as u8;
        remaining -= put;
    }
    while remaining > 0 {
        let put = remaining.min(u32::from(MAX_DIE));
        dice.push(put as u8);
        remaining -= put;
    }
}

/// Shortest conduit path between two sections, both endpoints included.
///
/// Breadth-first over edges with at least one conduit; neighbours are visited
/// in section declaration order, so the first shortest path wins.
pub fn find_path(ship: &Ship, from: ShipSection, to: ShipSection) -> Option<Vec<ShipSection>> {
    if from == to {
        return Some(vec![from]);
    }
    let mut prev: [Option<ShipSection>; SECTION_COUNT] = [None; SECTION_COUNT];
    let mut seen = [false; SECTION_COUNT];
    let mut queue = VecDeque::new();
    seen[from.index()] = true;
    queue.push_back(from);

    while let Some(cur) = queue.pop_front() {
        for next in ALL_SECTIONS {
            if seen[next.index()] || ship.conduits(cur, next) == 0 {
                continue;
            }
            seen[next.index()] = true;
            prev[next.index()] = Some(cur);
            if next == to {
                let mut path = vec![to];
                let mut at = to;
                while let Some(p) = prev[at.index()] {
                    path.push(p);
                    at = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// The edge with the fewest conduits along a path (first in path order on
/// ties), with its conduit count. `None` for single-section paths.
pub fn bottleneck(ship: &Ship, path: &[ShipSection]) -> Option<(Edge, u8)> {
    let mut best: Option<(Edge, u8)> = None;
    for pair in path.windows(2) {
        let count = ship.conduits(pair[0], pair[1]);
        if best.map_or(true, |(_, c)| count < c) {
            best = Some((Edge::new(pair[0], pair[1]), count));
        }
    }
    best
}

/// Accumulated power carried by each edge during one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingLedger {
    loads: BTreeMap<Edge, u32>,
}

impl RoutingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `amount` on every edge of the path.
    pub fn record(&mut self, path: &[ShipSection], amount: u32) {
        for pair in path.windows(2) {
            *self.loads.entry(Edge::new(pair[0], pair[1])).or_insert(0) += amount;
        }
    }

    pub fn load(&self, edge: Edge) -> u32 {
        self.loads.get(&edge).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Merges another ledger's loads into this one.
    pub fn absorb(&mut self, other: RoutingLedger) {
        for (edge, load) in other.loads {
            *self.loads.entry(edge).or_insert(0) += load;
        }
    }

    /// Edges whose load exceeds their current safe capacity, in canonical order.
    pub fn overloaded(&self, ship: &Ship) -> Vec<Edge> {
        self.loads
            .iter()
            .filter(|(edge, &load)| load > u32::from(ship.conduits(edge.0, edge.1)) * POWER_PER_CONDUIT)
            .map(|(edge, _)| *edge)
            .collect()
    }
}

/// Moves power between two nodes, recording section-to-section loads.
pub fn transfer(
    ship: &mut Ship,
    from: PowerNode,
    to: PowerNode,
    amount: u32,
    ledger: &mut RoutingLedger,
) -> Result<(), PowerError> {
    if amount == 0 {
        return Err(PowerError::ZeroAmount);
    }
    if from == to {
        return Err(PowerError::SameEndpoint);
    }
    match (from, to) {
        (PowerNode::Section(a), PowerNode::Section(b)) => {
            let path = find_path(ship, a, b).ok_or(PowerError::NoConduitPath { from: a, to: b })?;
            spend(ship, a, amount)?;
            add(ship, b, amount);
            ledger.record(&path, amount);
        }
        (PowerNode::Section(a), PowerNode::LifeSupport) => {
            spend(ship, a, amount)?;
            ship.life_support += amount;
        }
        (PowerNode::LifeSupport, PowerNode::Section(b)) => {
            if ship.life_support < amount {
                return Err(PowerError::InsufficientLifeSupport {
                    available: ship.life_support,
                    requested: amount,
                });
            }
            ship.life_support -= amount;
            add(ship, b, amount);
        }
        (PowerNode::LifeSupport, PowerNode::LifeSupport) => return Err(PowerError::SameEndpoint),
    }
    Ok(())
}

/// What happened when a batch's loads were settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverloadReport {
    pub degraded: Vec<Edge>,
    pub mitigated: Option<Edge>,
}

impl OverloadReport {
    pub fn used_mitigation(&self) -> bool {
        self.mitigated.is_some()
    }
}

/// Degrades every overloaded edge by one conduit. With mitigation, the first
/// overloaded edge in canonical order is spared.
pub fn settle_overloads(ship: &mut Ship, ledger: &RoutingLedger, mitigation_available: bool) -> OverloadReport {
    let mut report = OverloadReport::default();
    for edge in ledger.overloaded(ship) {
        if mitigation_available && report.mitigated.is_none() {
            report.mitigated = Some(edge);
            continue;
        }
        ship.degrade_conduit(edge.0, edge.1);
        report.degraded.push(edge);
    }
    if !report.degraded.is_empty() || report.mitigated.is_some() {
        debug!(degraded = report.degraded.len(), mitigated = report.used_mitigation(), "settled conduit overloads");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use ShipSection::*;

    fn ship() -> Ship {
        Ship::new(Position::new(0, 0), 4, 8)
    }

    #[test]
    fn spend_then_add_conserves_power() {
        let mut s = ship();
        let before = s.total_power();
        spend(&mut s, Engineering, 7).unwrap();
        assert_eq!(s.power(Engineering), 1);
        add(&mut s, Engineering, 7);
        assert_eq!(s.total_power(), before);
        assert!(s.section(Engineering).power_dice.iter().all(|&d| (1..=6).contains(&d)));
    }

    #[test]
    fn spend_drains_last_die_first() {
        let mut s = ship();
        spend(&mut s, Engineering, 2).unwrap();
        assert_eq!(s.section(Engineering).power_dice, vec![6]);
        spend(&mut s, Engineering, 1).unwrap();
        assert_eq!(s.section(Engineering).power_dice, vec![5]);
    }

    #[test]
    fn spend_rejects_overdraw() {
        let mut s = ship();
        let err = spend(&mut s, MedLab, 5).unwrap_err();
        assert_eq!(err, PowerError::InsufficientPower { section: MedLab, available: 4, requested: 5 });
        assert_eq!(s.power(MedLab), 4);
    }

    #[test]
    fn add_fills_then_appends() {
        let mut s = ship();
        add(&mut s, Engineering, 9);
        assert_eq!(s.section(Engineering).power_dice, vec![6, 6, 5]);
    }

    #[test]
    fn path_prefers_declaration_order() {
        let s = ship();
        assert_eq!(find_path(&s, Bridge, Bridge), Some(vec![Bridge]));
        assert_eq!(find_path(&s, Bridge, Engineering), Some(vec![Bridge, Engineering]));
        // Bridge -> Engineering -> Drives is found before Bridge -> Defense -> Drives.
        assert_eq!(find_path(&s, Bridge, Drives), Some(vec![Bridge, Engineering, Drives]));
    }

    #[test]
    fn path_skips_empty_conduits() {
        let mut s = ship();
        // Drives-MedLab has no conduits, so the path goes through Engineering.
        assert_eq!(find_path(&s, Drives, MedLab), Some(vec![Drives, Engineering, MedLab]));
        s.set_conduits(MedLab, Engineering, 0);
        s.set_conduits(MedLab, SciLab, 0);
        assert_eq!(find_path(&s, Bridge, MedLab), None);
    }

    /// Routes one transfer and settles it on its own, as the pipeline does
    /// for a batch holding a single transfer.
    fn route_once(s: &mut Ship, from: ShipSection, to: ShipSection, amount: u32, mitigate: bool) -> OverloadReport {
        let mut ledger = RoutingLedger::new();
        transfer(s, PowerNode::Section(from), PowerNode::Section(to), amount, &mut ledger).unwrap();
        settle_overloads(s, &ledger, mitigate)
    }

    #[test]
    fn route_over_capacity_degrades_bottleneck_once() {
        let mut s = ship();
        assert_eq!(bottleneck(&s, &[Bridge, SciLab]), Some((Edge::new(Bridge, SciLab), 1)));
        let report = route_once(&mut s, Bridge, SciLab, 4, false);
        assert_eq!(report.degraded, vec![Edge::new(Bridge, SciLab)]);
        assert_eq!(s.conduits(Bridge, SciLab), 0);
        assert_eq!(s.conduits(SciLab, Bridge), 0);
        assert_eq!(s.power(SciLab), 8);
    }

    #[test]
    fn route_mitigated_keeps_conduits() {
        let mut s = ship();
        let report = route_once(&mut s, Bridge, SciLab, 4, true);
        assert_eq!(report.mitigated, Some(Edge::new(Bridge, SciLab)));
        assert!(report.degraded.is_empty());
        assert_eq!(s.conduits(Bridge, SciLab), 1);
    }

    #[test]
    fn route_within_capacity_is_safe() {
        let mut s = ship();
        let report = route_once(&mut s, Engineering, Drives, 6, false);
        assert_eq!(report, OverloadReport::default());
        assert_eq!(s.conduits(Engineering, Drives), 3);
    }

    #[test]
    fn transfer_records_ledger_and_settles() {
        let mut s = ship();
        let mut ledger = RoutingLedger::new();
        transfer(&mut s, PowerNode::Section(Bridge), PowerNode::Section(SciLab), 2, &mut ledger).unwrap();
        transfer(&mut s, PowerNode::Section(Bridge), PowerNode::Section(SciLab), 2, &mut ledger).unwrap();
        assert_eq!(ledger.load(Edge::new(Bridge, SciLab)), 4);
        let report = settle_overloads(&mut s, &ledger, false);
        assert_eq!(report.degraded, vec![Edge::new(Bridge, SciLab)]);
        assert_eq!(s.conduits(Bridge, SciLab), 0);
    }

    #[test]
    fn settle_with_mitigation_spares_first_edge() {
        let mut s = ship();
        let mut ledger = RoutingLedger::new();
        ledger.record(&[Bridge, SciLab], 4);
        ledger.record(&[Drives, Defense], 5);
        let report = settle_overloads(&mut s, &ledger, true);
        assert_eq!(report.mitigated, Some(Edge::new(Bridge, SciLab)));
        assert_eq!(report.degraded, vec![Edge::new(Drives, Defense)]);
        assert_eq!(s.conduits(Bridge, SciLab), 1);
        assert_eq!(s.conduits(Drives, Defense), 0);
    }

    #[test]
    fn life_support_transfers_need_no_path() {
        let mut s = ship();
        s.set_conduits(MedLab, Engineering, 0);
        s.set_conduits(MedLab, SciLab, 0);
        let mut ledger = RoutingLedger::new();
        transfer(&mut s, PowerNode::Section(MedLab), PowerNode::LifeSupport, 3, &mut ledger).unwrap();
        assert_eq!(s.life_support, 11);
        transfer(&mut s, PowerNode::LifeSupport, PowerNode::Section(MedLab), 11, &mut ledger).unwrap();
        assert_eq!(s.life_support, 0);
        assert_eq!(s.power(MedLab), 12);
        assert!(ledger.is_empty());
        let err = transfer(&mut s, PowerNode::LifeSupport, PowerNode::Section(Bridge), 1, &mut ledger).unwrap_err();
        assert!(matches!(err, PowerError::InsufficientLifeSupport { .. }));
    }

    #[test]
    fn transfer_rejects_bad_amounts() {
        let mut s = ship();
        let mut ledger = RoutingLedger::new();
        let n = PowerNode::Section(Bridge);
        assert_eq!(transfer(&mut s, n, PowerNode::Section(SciLab), 0, &mut ledger), Err(PowerError::ZeroAmount));
        assert_eq!(transfer(&mut s, n, n, 1, &mut ledger), Err(PowerError::SameEndpoint));
    }
}
