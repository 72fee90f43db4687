//! Orbit rings, board positions, and space objects.
//!
//! Ring 0 is the outermost ring; higher indices are closer to the black hole.
//! Space indices are absolute positions on a ring, `0..num_spaces`.

use serde::{Deserialize, Serialize};

use super::player::Resources;
use super::state::{ObjectId, PlayerId};

/// Danger tier of a ring, driving per-turn environment damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingColor {
    Green,
    Yellow,
    Orange,
    Red,
}

/// A circular orbit lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitRing {
    pub index: usize,
    /// Accumulated rotation in spaces, `0..num_spaces`.
    pub rotation_offset: u32,
    pub num_spaces: u32,
    /// Thrust needed to climb out of this ring.
    pub speed_requirement: u32,
    pub color: RingColor,
}

/// A location on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub ring: usize,
    pub space: u32,
}

impl Position {
    pub fn new(ring: usize, space: u32) -> Self {
        Position { ring, space }
    }
}

/// Type-specific data for a board object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Hazard { intensity: u32 },
    Debris,
    AsteroidCluster { hull: u32 },
    WreckedShip,
    FunctionalStation { visited_by: Vec<PlayerId> },
    HostileShip {
        hull: u32,
        has_torpedo: bool,
        /// Players whose cloak this hostile has already seen through.
        cloak_scanned: Vec<PlayerId>,
    },
}

impl ObjectKind {
    /// Short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Hazard { .. } => "hazard",
            ObjectKind::Debris => "debris",
            ObjectKind::AsteroidCluster { .. } => "asteroid_cluster",
            ObjectKind::WreckedShip => "wrecked_ship",
            ObjectKind::FunctionalStation { .. } => "functional_station",
            ObjectKind::HostileShip { .. } => "hostile_ship",
        }
    }

    /// Hull damage a ship takes when sharing a space with this object.
    /// Hazards do not collide.
    pub fn collision_damage(&self) -> u32 {
        match self {
            ObjectKind::Hazard { .. } => 0,
            ObjectKind::Debris => 2,
            ObjectKind::AsteroidCluster { .. } => 4,
            ObjectKind::WreckedShip => 3,
            ObjectKind::FunctionalStation { .. } => 2,
            ObjectKind::HostileShip { .. } => 3,
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self, ObjectKind::Hazard { .. })
    }
}

/// An object on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceObject {
    pub id: ObjectId,
    pub position: Position,
    pub kind: ObjectKind,
    /// Loot, once rolled by a scan or probe.
    pub loot: Option<Resources>,
}

/// The game board: rings plus the objects on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub rings: Vec<OrbitRing>,
    pub objects: Vec<SpaceObject>,
}

impl Board {
    pub fn ring(&self, index: usize) -> Option<&OrbitRing> {
        self.rings.get(index)
    }

    pub fn innermost_ring(&self) -> usize {
        self.rings.len().saturating_sub(1)
    }

    /// True if the position references an existing ring and space.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.ring(pos.ring).is_some_and(|r| pos.space < r.num_spaces)
    }

    /// Returns an error message if the position is off the board.
    pub fn validate_position(&self, pos: Position) -> Result<(), String> {
        if self.is_valid_position(pos) {
            Ok(())
        } else {
            Err(format!("position ring {} space {} is off the board", pos.ring, pos.space))
        }
    }

    pub fn object(&self, id: &ObjectId) -> Option<&SpaceObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn object_mut(&mut self, id: &ObjectId) -> Option<&mut SpaceObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    pub fn remove_object(&mut self, id: &ObjectId) -> Option<SpaceObject> {
        let idx = self.objects.iter().position(|o| &o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Maps a space on ring `from` to the proportional space on ring `to`.
    pub fn project_space(&self, space: u32, from: usize, to: usize) -> u32 {
        let (Some(src), Some(dst)) = (self.ring(from), self.ring(to)) else {
            return space;
        };
        if src.num_spaces == 0 {
            return 0;
        }
        let projected = u64::from(space) * u64::from(dst.num_spaces) / u64::from(src.num_spaces);
        (projected as u32).min(dst.num_spaces.saturating_sub(1))
    }

    /// Moves a position `delta` spaces along its ring, wrapping around.
    pub fn advance_along_ring(&self, pos: Position, delta: i64) -> Position {
        let n = self.ring(pos.ring).map_or(1, |r| i64::from(r.num_spaces.max(1)));
        let space = (i64::from(pos.space) + delta).rem_euclid(n);
        Position { ring: pos.ring, space: space as u32 }
    }

    /// Moves a position to another ring, projecting its space.
    pub fn change_ring(&self, pos: Position, to: usize) -> Position {
        Position {
            ring: to,
            space: self.project_space(pos.space, pos.ring, to),
        }
    }

    /// Ring difference plus circular space distance, measured on the ring with
    /// more spaces after projecting both positions onto it.
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        let ring_gap = a.ring.abs_diff(b.ring) as u32;
        let spaces_a = self.ring(a.ring).map_or(0, |r| r.num_spaces);
        let spaces_b = self.ring(b.ring).map_or(0, |r| r.num_spaces);
        let target = if spaces_a >= spaces_b { a.ring } else { b.ring };
        let n = spaces_a.max(spaces_b);
        if n == 0 {
            return ring_gap;
        }
        let pa = self.project_space(a.space, a.ring, target);
        let pb = self.project_space(b.space, b.ring, target);
        let diff = pa.abs_diff(pb);
        ring_gap + diff.min(n - diff)
    }

    /// Signed single-space step that moves `from` toward `to` along the
    /// shorter arc of `from`'s ring. Zero when already aligned.
    pub fn step_toward(&self, from: Position, to: Position) -> i64 {
        let n = self.ring(from.ring).map_or(0, |r| r.num_spaces);
        if n == 0 {
            return 0;
        }
        let target = self.project_space(to.space, to.ring, from.ring);
        let forward = (target + n - from.space) % n;
        if forward == 0 {
            0
        } else if forward <= n - forward {
            1
        } else {
            -1
        }
    }
}
