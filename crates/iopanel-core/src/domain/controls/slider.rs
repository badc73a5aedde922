use std::time::Instant;

use super::{ControlEvent, ControlId, Interaction, LevelLike, PushLike};
use crate::domain::geometry::{Color, Frame, Point, Rect};
use crate::domain::throttle::EventThrottle;

/// Extra touch margin around the slider bar, in pixels.
pub const SLIDER_TOUCH_PAD: f32 = 20.0;

/// A horizontal bar with a level in `[0, 1]`.
///
/// The bar is `width` long and `width / 10` thick.  Dragging along it sets
/// the level from the local x coordinate.
#[derive(Debug, Clone)]
pub struct Slider {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub color: Color,
    level: f32,
    pressed: bool,
    throttle: EventThrottle,
}

impl Slider {
    pub fn new(id: ControlId, anchor: Point, width: f32, color: Color, landscape: bool) -> Self {
        Self {
            id,
            frame: Frame::new(Rect::new(anchor.x, anchor.y, width, width / 10.0), landscape),
            color,
            level: 0.0,
            pressed: false,
            throttle: EventThrottle::new(),
        }
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        self.frame.contains(p, SLIDER_TOUCH_PAD)
    }

    fn track(&mut self, p: Point) {
        let width = self.frame.width();
        if width > 0.0 {
            self.set_level(self.frame.to_local(p).x / width);
        }
    }

    fn emit(&mut self, now: Instant, forced: bool) -> Interaction {
        match self.throttle.admit(now, forced) {
            Some(seq) => Interaction::Emit(ControlEvent::SliderMoved {
                id: self.id.clone(),
                seq,
                level: self.level,
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

    pub(crate) fn mouse_up(&mut self, p: Point, now: Instant) -> Interaction {
        self.track(p);
        self.pressed = false;
        self.emit(now, true)
    }
}

impl LevelLike for Slider {
    fn level(&self) -> f32 {
        self.level
    }

    fn set_level(&mut self, level: f32) {
        self.level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    }
}

impl PushLike for Slider {
    fn is_pressed(&self) -> bool {
        self.pressed
    }
}
