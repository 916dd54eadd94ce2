#![no_std]
#![forbid(unsafe_code)]

//! # Badge IR
//!
//! The shared infrared link: a single-slot priority message that preempts
//! the recurring broadcast, a short FIFO of outgoing game frames, and a
//! type-tag dispatch of received frames to one subscriber per type.
//!
//! Everything here is best effort. A frame that cannot go out now is tried
//! again on the next broadcast tick; a malformed frame is dropped.

#[cfg(feature = "std")]
extern crate std;

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod frame;
pub mod inbox;
pub mod selftest;
pub mod transport;

pub use channel::*;
pub use config::*;
pub use dispatch::*;
pub use frame::*;
pub use inbox::*;
pub use selftest::*;
pub use transport::*;
