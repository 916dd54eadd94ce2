//! Core type tests for badge-core

use badge_core::{duration, BadgeError, Button, Instant, Priority, Username};

#[test]
fn test_due_order_is_ascending_value() {
    let mut priorities = [Priority::new(930), Priority::new(950), Priority::new(800)];
    priorities.sort();
    assert_eq!(priorities.map(Priority::raw), [800, 930, 950]);
}

#[test]
fn test_interval_arithmetic() {
    let last = Instant::from_millis(1_000);
    assert!(Instant::from_millis(1_020).has_elapsed(last, duration!(20 ms)));
    assert!(!Instant::from_millis(1_019).has_elapsed(last, duration!(20 ms)));
}

#[test]
fn test_username_roundtrip_through_bytes() {
    let name = Username::new("alice");
    let copy = Username::from_bytes(*name.as_bytes());
    assert_eq!(copy.as_str(), "alice");
}

#[test]
fn test_long_buttons_map_to_short() {
    for (long, short) in [
        (Button::LongOk, Button::Ok),
        (Button::LongBack, Button::Back),
        (Button::LongMode, Button::Mode),
    ] {
        assert!(long.is_long());
        assert_eq!(long.base(), short);
    }
}

#[test]
fn test_error_display() {
    assert_eq!(BadgeError::TaskTableFull.to_string(), "Task table is full");
}
