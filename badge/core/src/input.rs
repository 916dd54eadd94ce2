//! Button input events

use core::fmt;

/// A discrete input event from the badge buttons.
///
/// Long presses are distinct events; handlers that treat a long press like
/// a short one match on both variants or call [`Button::base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
    Mode,
    LongOk,
    LongBack,
    LongMode,
}

impl Button {
    /// True for the long-press variants
    pub const fn is_long(self) -> bool {
        matches!(self, Button::LongOk | Button::LongBack | Button::LongMode)
    }

    /// True for the four directional buttons
    pub const fn is_direction(self) -> bool {
        matches!(self, Button::Up | Button::Down | Button::Left | Button::Right)
    }

    /// The short-press button underlying this event
    pub const fn base(self) -> Button {
        match self {
            Button::LongOk => Button::Ok,
            Button::LongBack => Button::Back,
            Button::LongMode => Button::Mode,
            other => other,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::Ok => "ok",
            Button::Back => "back",
            Button::Mode => "mode",
            Button::LongOk => "long-ok",
            Button::LongBack => "long-back",
            Button::LongMode => "long-mode",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Button {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Button({=u8})", *self as u8);
    }
}
