//! Keyed deterministic randomness.
//!
//! Every random draw in the engine comes from a stream seeded by a stable
//! string key (game id, turn, entity id, purpose). The same key always yields
//! the same sequence, no matter what else the engine has drawn, so a saved
//! game replays identically.
//!
//! The generator is a 32-bit linear congruential step over a seed obtained by
//! hashing the key's UTF-16 code units.

use rand::RngCore;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Hashes a key into a non-zero 32-bit seed.
pub fn seed_from_key(key: &str) -> u32 {
    let mut hash: u32 = 0;
    for unit in key.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    if hash == 0 {
        1
    } else {
        hash
    }
}

/// Builds the key used to shuffle a deck: `"{purpose}:{game_id}{created_at}"`.
pub fn deck_key(purpose: &str, game_id: &str, created_at: u64) -> String {
    format!("{}:{}{}", purpose, game_id, created_at)
}

/// Builds the key for a per-entity draw: `"{purpose}:{game_id}:{turn}:{entity}"`.
pub fn entity_key(purpose: &str, game_id: &str, turn: u32, entity: &str) -> String {
    format!("{}:{}:{}:{}", purpose, game_id, turn, entity)
}

/// A reproducible random stream derived from a string key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRng {
    state: u32,
}

impl KeyedRng {
    /// Creates a stream seeded from `key`.
    pub fn new(key: &str) -> Self {
        KeyedRng {
            state: seed_from_key(key),
        }
    }

    /// Creates a stream from an explicit seed (zero is replaced by one).
    pub fn from_seed(seed: u32) -> Self {
        KeyedRng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn step(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Returns the next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / TWO_POW_32
    }

    /// Returns a uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index() on an empty range");
        let i = (self.next_f64() * len as f64) as usize;
        i.min(len.saturating_sub(1))
    }

    /// Rolls a die with `sides` faces, returning `1..=sides`.
    pub fn roll(&mut self, sides: u32) -> u32 {
        self.index(sides.max(1) as usize) as u32 + 1
    }

    /// Fisher-Yates shuffle, walking from the back of the slice.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

impl RngCore for KeyedRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.step());
        let lo = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Rolls a single die from a fresh stream for `key`.
pub fn roll_keyed(key: &str, sides: u32) -> u32 {
    KeyedRng::new(key).roll(sides)
}
