use std::time::Instant;

use super::{ControlEvent, ControlId, Interaction, PositionLike, PushLike};
use crate::domain::geometry::{Color, Frame, Point, Rect};
use crate::domain::throttle::EventThrottle;

/// Extra touch margin around the joystick circle, in pixels.
pub const JOYSTICK_TOUCH_PAD: f32 = 20.0;

/// A circular thumb-stick of diameter `width`.
///
/// The stick vector is the touch offset from the centre divided by the
/// radius, clamped to the unit circle, with +y pointing up in the control's
/// local frame.  Releasing snaps it back to the origin.
#[derive(Debug, Clone)]
pub struct Joystick {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub color: Color,
    vector: (f32, f32),
    pressed: bool,
    throttle: EventThrottle,
}

impl Joystick {
    pub fn new(id: ControlId, anchor: Point, width: f32, color: Color, landscape: bool) -> Self {
        Self {
            id,
            frame: Frame::new(Rect::new(anchor.x, anchor.y, width, width), landscape),
            color,
            vector: (0.0, 0.0),
            pressed: false,
            throttle: EventThrottle::new(),
        }
    }

    fn radius(&self) -> f32 {
        self.frame.width() / 2.0
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        let local = self.frame.to_local(p);
        let r = self.radius();
        let (dx, dy) = (local.x - r, local.y - r);
        (dx * dx + dy * dy).sqrt() <= r + JOYSTICK_TOUCH_PAD
    }

    fn track(&mut self, p: Point) {
        let r = self.radius();
        if r <= 0.0 {
            return;
        }
        let local = self.frame.to_local(p);
        let x = (local.x - r) / r;
        let y = (r - local.y) / r;
        let len = (x * x + y * y).sqrt();
        self.vector = if len > 1.0 { (x / len, y / len) } else { (x, y) };
    }

    fn emit(&mut self, now: Instant, forced: bool) -> Interaction {
        match self.throttle.admit(now, forced) {
            Some(seq) => Interaction::Emit(ControlEvent::JoystickMoved {
                id: self.id.clone(),
                seq,
                x: self.vector.0,
                y: self.vector.1,
            }),
            None => Interaction::Redraw,
        }
    }

    pub(crate) fn mouse_down(&mut self, p: Point, now: Instant) -> Interaction {
        self.pressed = true;
        self.track(p);
        self.emit(now, true)
    }

    pub(crate) fn mouse_move(&mut self, p: Point, now: Instant) -> Interaction {
        self.track(p);
        self.emit(now, false)
    }

    pub(crate) fn mouse_up(&mut self, now: Instant) -> Interaction {
        self.vector = (0.0, 0.0);
        self.pressed = false;
        self.emit(now, true)
    }
}

impl PositionLike for Joystick {
    fn position(&self) -> Option<(f32, f32)> {
        Some(self.vector)
    }
}

impl PushLike for Joystick {
    fn is_pressed(&self) -> bool {
        self.pressed
    }
}
