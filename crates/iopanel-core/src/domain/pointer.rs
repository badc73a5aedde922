//! Routes raw pointer events to controls.
//!
//! # Pointer sessions (for beginners)
//!
//! A touch screen reports each finger separately, each with its own id.
//! When a finger goes down the router finds the topmost control under it and
//! opens a *session* binding that finger to that control.  Every later move
//! or lift of the same finger goes to the same control, even if the finger
//! slides off it.  This is what lets a joystick keep tracking a thumb that
//! wanders outside the circle.
//!
//! Rules:
//!
//! - One finger per control.  A second finger landing on a control that is
//!   already being touched is ignored for its whole lifetime.
//! - A move to the exact same position as the last one is dropped.
//! - A cancelled touch is treated as a lift.
//! - A finger that goes down again without lifting first is lifted at its
//!   last position before the new touch is routed.
//! - If the control disappears mid-gesture, the session is dropped quietly.

use std::collections::HashMap;
use std::time::Instant;

use super::controls::{ControlEvent, Interaction};
use super::geometry::Point;
use super::registry::{ControlRegistry, InstanceKey};

/// Platform-assigned identifier of one finger or mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

#[derive(Debug, Clone, Copy)]
struct Session {
    last: Point,
    key: InstanceKey,
}

/// The result of routing one pointer event to a control.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub key: InstanceKey,
    pub interaction: Interaction,
}

/// Tracks active pointer sessions.
#[derive(Debug, Default)]
pub struct PointerRouter {
    sessions: HashMap<PointerId, Session>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fingers currently bound to a control.
    pub fn active(&self) -> usize {
        self.sessions.len()
    }

    fn is_targeted(&self, key: InstanceKey) -> bool {
        self.sessions.values().any(|s| s.key == key)
    }

    pub fn down(
        &mut self,
        registry: &mut ControlRegistry,
        pointer: PointerId,
        p: Point,
        now: Instant,
    ) -> Option<Routed> {
        if let Some(stale) = self.sessions.get(&pointer).map(|s| s.last) {
            tracing::trace!(?pointer, "pointer went down again, ending its old session");
            self.up(registry, pointer, stale, now);
        }
        let key = registry.hit_test(p).map(|(key, _)| key)?;
        if self.is_targeted(key) {
            tracing::trace!(?pointer, key = key.value(), "control already owned by another pointer");
            return None;
        }
        self.sessions.insert(pointer, Session { last: p, key });

        let interaction = registry.update_by_key(key, |c| c.mouse_down(p, now))?;
        if let Interaction::Emit(ControlEvent::ToggleChanged { checked: true, .. }) = &interaction {
            registry.select_radio(key);
        }
        Some(Routed { key, interaction })
    }

    pub fn move_to(
        &mut self,
        registry: &mut ControlRegistry,
        pointer: PointerId,
        p: Point,
        now: Instant,
    ) -> Option<Routed> {
        let session = self.sessions.get_mut(&pointer)?;
        if session.last == p {
            return None;
        }
        session.last = p;
        let key = session.key;
        match registry.update_by_key(key, |c| c.mouse_move(p, now)) {
            Some(interaction) => Some(Routed { key, interaction }),
            None => {
                self.sessions.remove(&pointer);
                None
            }
        }
    }

    pub fn up(
        &mut self,
        registry: &mut ControlRegistry,
        pointer: PointerId,
        p: Point,
        now: Instant,
    ) -> Option<Routed> {
        let session = self.sessions.remove(&pointer)?;
        let interaction = registry.update_by_key(session.key, |c| c.mouse_up(p, now))?;
        Some(Routed {
            key: session.key,
            interaction,
        })
    }

    /// A cancelled touch ends exactly like a lift at its last position.
    pub fn cancel(
        &mut self,
        registry: &mut ControlRegistry,
        pointer: PointerId,
        now: Instant,
    ) -> Option<Routed> {
        let last = self.sessions.get(&pointer)?.last;
        self.up(registry, pointer, last, now)
    }

    /// Drops every session without notifying controls.
    pub fn reset(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::controls::{Button, ButtonStyle, Control, Joystick};
    use crate::domain::geometry::{Color, Frame, Rect};

    fn registry_with_button_and_stick() -> ControlRegistry {
        let mut reg = ControlRegistry::headless();
        reg.try_add(Control::Button(Button::new(
            "btn".into(),
            Frame::new(Rect::new(0.0, 0.0, 100.0, 100.0), false),
            Color::WHITE,
            Color::BLACK,
            1.0,
            ButtonStyle::Rectangle,
            String::new(),
        )));
        reg.try_add(Control::Joystick(Joystick::new(
            "stick".into(),
            Point::new(200.0, 0.0),
            100.0,
            Color::BLACK,
            false,
        )));
        reg
    }

    fn pressed(reg: &ControlRegistry, id: &str) -> bool {
        reg.get(id.as_bytes())
            .and_then(Control::as_push_like)
            .map(|p| p.is_pressed())
            .unwrap_or(false)
    }

    #[test]
    fn test_down_on_empty_space_opens_no_session() {
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let routed = router.down(&mut reg, PointerId(1), Point::new(150.0, 500.0), Instant::now());
        assert!(routed.is_none());
        assert_eq!(router.active(), 0);
    }

    #[test]
    fn test_second_pointer_on_owned_control_is_ignored() {
        // Arrange
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(10.0, 10.0), t0);

        // Act
        let second = router.down(&mut reg, PointerId(2), Point::new(20.0, 20.0), t0);
        let second_up = router.up(&mut reg, PointerId(2), Point::new(20.0, 20.0), t0);

        // Assert – the first finger still holds the button down
        assert!(second.is_none());
        assert!(second_up.is_none());
        assert!(pressed(&reg, "btn"));
    }

    #[test]
    fn test_move_follows_pointer_off_the_control() {
        // Arrange
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(250.0, 50.0), t0);

        // Act – far to the right of the stick
        router.move_to(&mut reg, PointerId(1), Point::new(900.0, 50.0), t0 + Duration::from_secs(1));

        // Assert
        let stick = reg.get(b"stick").and_then(Control::as_position_like).unwrap();
        assert_eq!(stick.position(), Some((1.0, 0.0)));
    }

    #[test]
    fn test_repeated_position_is_suppressed() {
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(250.0, 50.0), t0);

        let same = router.move_to(&mut reg, PointerId(1), Point::new(250.0, 50.0), t0);
        assert!(same.is_none());
    }

    #[test]
    fn test_repeated_down_releases_the_previous_control() {
        // Arrange
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(10.0, 10.0), t0);

        // Act – the same finger id lands on the stick without an up
        let routed = router.down(&mut reg, PointerId(1), Point::new(250.0, 50.0), t0);

        // Assert
        assert!(routed.is_some());
        assert!(!pressed(&reg, "btn"));
        assert!(pressed(&reg, "stick"));
        assert_eq!(router.active(), 1);
    }

    #[test]
    fn test_repeated_down_on_the_same_control_keeps_it_pressed() {
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(10.0, 10.0), t0);

        let routed = router.down(&mut reg, PointerId(1), Point::new(20.0, 20.0), t0);

        assert!(routed.is_some());
        assert!(pressed(&reg, "btn"));
        assert_eq!(router.active(), 1);
    }

    #[test]
    fn test_cancel_releases_like_up() {
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(7), Point::new(10.0, 10.0), t0);

        let routed = router.cancel(&mut reg, PointerId(7), t0);

        assert_eq!(routed.map(|r| r.interaction), Some(Interaction::Redraw));
        assert!(!pressed(&reg, "btn"));
        assert_eq!(router.active(), 0);
    }

    #[test]
    fn test_pointer_on_removed_control_goes_nowhere() {
        // Arrange
        let mut reg = registry_with_button_and_stick();
        let mut router = PointerRouter::new();
        let t0 = Instant::now();
        router.down(&mut reg, PointerId(1), Point::new(250.0, 50.0), t0);

        // Act – the server replaces the stick under the finger
        reg.remove(b"stick");
        reg.try_add(Control::Joystick(Joystick::new(
            "stick".into(),
            Point::new(200.0, 0.0),
            100.0,
            Color::BLACK,
            false,
        )));
        let moved = router.move_to(&mut reg, PointerId(1), Point::new(260.0, 50.0), t0);

        // Assert – the new instance is untouched
        assert!(moved.is_none());
        assert!(!pressed(&reg, "stick"));
        assert_eq!(router.active(), 0);
    }
}
