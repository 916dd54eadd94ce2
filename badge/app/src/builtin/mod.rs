//! Applications every badge carries

mod menu;
mod score;
mod show_text;

pub use menu::*;
pub use score::*;
pub use show_text::*;
