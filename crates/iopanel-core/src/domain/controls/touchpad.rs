use std::time::Instant;

use super::{ControlEvent, ControlId, Interaction, PositionLike, PushLike};
use crate::domain::geometry::{Color, Frame, Point};
use crate::domain::throttle::EventThrottle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchpadStyle {
    #[default]
    Rectangle,
    Square,
}

impl TouchpadStyle {
    pub fn from_wire(byte: u8) -> Self {
        if byte == 1 {
            TouchpadStyle::Square
        } else {
            TouchpadStyle::Rectangle
        }
    }
}

/// A rectangular pad reporting the cursor position in `[-1, 1]²`.
///
/// Touches that drift outside the pad are ignored rather than clamped; the
/// cursor keeps its last inside value until the finger comes back or lifts.
#[derive(Debug, Clone)]
pub struct Touchpad {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub color: Color,
    pub style: TouchpadStyle,
    cursor: Option<(f32, f32)>,
    throttle: EventThrottle,
}

impl Touchpad {
    pub fn new(id: ControlId, frame: Frame, color: Color, style: TouchpadStyle) -> Self {
        Self {
            id,
            frame,
            color,
            style,
            cursor: None,
            throttle: EventThrottle::new(),
        }
    }

    /// Unit-range position of `p`, or `None` if it lies outside the pad.
    fn unit_position(&self, p: Point) -> Option<(f32, f32)> {
        let local = self.frame.to_local(p);
        let (w, h) = (self.frame.width(), self.frame.height());
        if w <= 0.0 || h <= 0.0 || !self.frame.local_rect().contains(local) {
            return None;
        }
        Some((2.0 * local.x / w - 1.0, 1.0 - 2.0 * local.y / h))
    }

    fn emit(&mut self, now: Instant, forced: bool) -> Interaction {
        match self.throttle.admit(now, forced) {
            Some(seq) => Interaction::Emit(ControlEvent::TouchpadMoved {
                id: self.id.clone(),
                seq,
                position: self.cursor,
            }),
            None => Interaction::Redraw,
        }
    }

    pub(crate) fn mouse_down(&mut self, p: Point, now: Instant) -> Interaction {
        match self.unit_position(p) {
            Some(pos) => {
                self.cursor = Some(pos);
                self.emit(now, true)
            }
            None => Interaction::None,
        }
    }

    pub(crate) fn mouse_move(&mut self, p: Point, now: Instant) -> Interaction {
        if self.cursor.is_none() {
            return Interaction::None;
        }
        match self.unit_position(p) {
            Some(pos) => {
                self.cursor = Some(pos);
                self.emit(now, false)
            }
            None => Interaction::None,
        }
    }

    pub(crate) fn mouse_up(&mut self, now: Instant) -> Interaction {
        if self.cursor.take().is_none() {
            return Interaction::None;
        }
        self.emit(now, true)
    }
}

impl PositionLike for Touchpad {
    fn position(&self) -> Option<(f32, f32)> {
        self.cursor
    }
}

impl PushLike for Touchpad {
    fn is_pressed(&self) -> bool {
        self.cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::geometry::Rect;

    fn pad() -> Touchpad {
        Touchpad::new(
            "pad".into(),
            Frame::new(Rect::new(0.0, 0.0, 200.0, 100.0), false),
            Color::BLACK,
            TouchpadStyle::Rectangle,
        )
    }

    #[test]
    fn test_centre_maps_to_origin_and_top_left_to_minus_one_plus_one() {
        let mut p = pad();
        p.mouse_down(Point::new(100.0, 50.0), Instant::now());
        assert_eq!(p.position(), Some((0.0, 0.0)));

        let mut p = pad();
        p.mouse_down(Point::new(0.0, 0.0), Instant::now());
        assert_eq!(p.position(), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_moves_outside_pad_are_ignored() {
        // Arrange
        let mut p = pad();
        let t0 = Instant::now();
        p.mouse_down(Point::new(100.0, 50.0), t0);

        // Act
        let out = p.mouse_move(Point::new(250.0, 50.0), t0 + Duration::from_secs(1));

        // Assert
        assert_eq!(out, Interaction::None);
        assert_eq!(p.position(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_release_emits_event_without_position() {
        let mut p = pad();
        let t0 = Instant::now();
        p.mouse_down(Point::new(100.0, 50.0), t0);
        let up = p.mouse_up(t0);
        assert_eq!(
            up,
            Interaction::Emit(ControlEvent::TouchpadMoved {
                id: "pad".into(),
                seq: 1,
                position: None
            })
        );
        assert!(!p.is_pressed());
    }
}
