#![no_std]
#![forbid(unsafe_code)]

//! # Badge Versus
//!
//! Point-to-point synchronization of a two-badge game.
//!
//! ```text
//! WAITING --start--> PLAYING --local or remote game over--> GAME_OVER
//! ```
//!
//! While playing, cleared lines are sent to the peer as attacks. The badge
//! that reaches game over first sends its score with a fresh nonce; the
//! peer answers with its own score echoing that nonce. Each side reports
//! the two-party outcome once, and an acknowledgment whose nonce does not
//! match the last one generated is discarded. An abort from either side
//! returns both badges to the menu.

#[cfg(feature = "std")]
extern crate std;

pub mod app;
pub mod config;
pub mod engine;
pub mod packet;
pub mod session;

pub use app::*;
pub use config::*;
pub use engine::*;
pub use packet::*;
pub use session::*;
