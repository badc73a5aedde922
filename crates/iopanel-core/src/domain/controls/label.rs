use super::{ControlId, TextLike};
use crate::domain::geometry::{Color, Frame, Point, Rect};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Decodes the wire byte; unknown values fall back to left.
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            1 => TextAlign::Center,
            2 => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// Static text.  Never hit-testable.
#[derive(Debug, Clone)]
pub struct Label {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub text_color: Color,
    pub font_scale: f32,
    pub align: TextAlign,
    text: String,
}

impl Label {
    /// Creates a label anchored at `anchor`.  A label has no extent of its
    /// own; the renderer sizes it from the text.
    pub fn new(
        id: ControlId,
        anchor: Point,
        text_color: Color,
        font_scale: f32,
        align: TextAlign,
        landscape: bool,
        text: String,
    ) -> Self {
        Self {
            id,
            frame: Frame::new(Rect::new(anchor.x, anchor.y, 0.0, 0.0), landscape),
            text_color,
            font_scale,
            align,
            text,
        }
    }
}

impl TextLike for Label {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}
