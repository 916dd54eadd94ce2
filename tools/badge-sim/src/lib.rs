//! Host-side simulation of badges sharing one IR link.
//!
//! Two complete badge runtimes run in lock step against an in-memory link
//! that drops frames at a configurable rate. The collaborators a real badge
//! gets from its board (display, storage, scoring, randomness) are replaced
//! by console and in-memory stand-ins, and the game is a small toy engine.

pub mod config;
pub mod sim;
pub mod toy;

pub use config::{ConfigError, PlayerConfig, SimConfig};
pub use sim::{BadgeSummary, SimError, Simulation, Summary};
pub use toy::ToyEngine;
