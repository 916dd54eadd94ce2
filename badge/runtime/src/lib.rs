#![no_std]
#![forbid(unsafe_code)]

//! # Badge Runtime
//!
//! One badge, assembled: a scheduler, the application controller and the
//! IR channel, constructed explicitly and owned by a single [`Badge`].
//!
//! The board support code drives it with three calls: [`Badge::tick`] from
//! the periodic timer, [`Badge::press`] for button events and
//! [`Badge::on_frame_received`] (or [`Badge::poll_inbox`]) for IR frames.
//! All three run on the same thread of control.

extern crate alloc;

pub mod badge;
pub mod config;
pub mod services;
pub mod task;

pub use badge::*;
pub use config::*;
pub use services::*;
pub use task::*;

