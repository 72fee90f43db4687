//! Escape Velocity engine library.
//!
//! A deterministic turn-resolution engine for a black-hole survival board
//! game. Exposes the board representation, power routing, the turn resolver,
//! game setup, bots, the batch simulator, and the session protocol for use by
//! integration tests and the binaries.

pub mod board;
pub mod bonus;
pub mod bot;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod power;
pub mod protocol;
pub mod resolve;
pub mod rng;
pub mod setup;
pub mod simulate;
