#![no_std]
#![forbid(unsafe_code)]

//! # Badge Applications
//!
//! The contract every mini-application implements, and the controller that
//! keeps exactly one of them active.
//!
//! Applications are registered once at start-up. Each may own a periodic
//! routine task in the scheduler; the application arms it in `on_entry` and
//! disarms it in `on_exit`. Input reaches only the active application.

extern crate alloc;

pub mod app;
pub mod builtin;
pub mod context;
pub mod controller;

pub use app::*;
pub use builtin::*;
pub use context::*;
pub use controller::*;

/// Default capacity of the application roster
pub const MAX_APPS: usize = 8;
