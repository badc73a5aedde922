use super::{ControlEvent, ControlId, Interaction, PushLike, TextLike};
use crate::domain::geometry::{Color, Frame, Point};

/// Button outline.  The square styles are resolved to equal width and height
/// when the button is created, leaving only the outline to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStyle {
    #[default]
    Rectangle,
    Ellipse,
}

impl ButtonStyle {
    /// Decodes the wire byte into `(style, force_square)`.
    ///
    /// `0` rectangle, `1` ellipse, `2` square, `3` circle.  Anything else is a
    /// plain rectangle.
    pub fn from_wire(byte: u8) -> (Self, bool) {
        match byte {
            1 => (ButtonStyle::Ellipse, false),
            2 => (ButtonStyle::Rectangle, true),
            3 => (ButtonStyle::Ellipse, true),
            _ => (ButtonStyle::Rectangle, false),
        }
    }
}

/// A push button.  Sends one event per press.
#[derive(Debug, Clone)]
pub struct Button {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub color: Color,
    pub text_color: Color,
    pub font_scale: f32,
    pub style: ButtonStyle,
    text: String,
    pressed: bool,
}

impl Button {
    pub fn new(
        id: ControlId,
        frame: Frame,
        color: Color,
        text_color: Color,
        font_scale: f32,
        style: ButtonStyle,
        text: String,
    ) -> Self {
        Self {
            id,
            frame,
            color,
            text_color,
            font_scale,
            style,
            text,
            pressed: false,
        }
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        match self.style {
            ButtonStyle::Rectangle => self.frame.contains(p, 0.0),
            ButtonStyle::Ellipse => self.frame.ellipse_contains(p),
        }
    }

    pub(crate) fn mouse_down(&mut self) -> Interaction {
        self.pressed = true;
        Interaction::Emit(ControlEvent::ButtonPressed {
            id: self.id.clone(),
        })
    }

    pub(crate) fn mouse_up(&mut self) -> Interaction {
        self.pressed = false;
        Interaction::Redraw
    }
}

impl TextLike for Button {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl PushLike for Button {
    fn is_pressed(&self) -> bool {
        self.pressed
    }
}
