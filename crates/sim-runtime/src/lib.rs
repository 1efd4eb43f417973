#![deny(warnings)]

//! Simulation runtime: the engine that owns the world state, the subsystems
//! it drives each tick (product, hiring, funding, events) and the player
//! actions it accepts.
//!
//! Subsystems never own state; they take the slices of `GameState` they need
//! and a borrowed RNG, so a seeded engine replays deterministically.

pub mod engine;
pub mod error;
pub mod events;
pub mod funding;
pub mod hiring;
pub mod product;
pub mod staffing;

pub use engine::GameEngine;
pub use error::ActionError;
