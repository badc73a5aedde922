//! The virtual controls a server can place on the device screen.
//!
//! # One enum, several capabilities (for beginners)
//!
//! The set of control kinds is closed, so [`Control`] is a plain `enum` with
//! one variant per kind.  The protocol, however, rarely cares *which* kind a
//! control is.  It cares what the control can *do*: "set the text of `id`"
//! works on a label, a button, a text field, a toggle and a radio button.
//!
//! Those abilities are expressed as small capability traits:
//!
//! | Trait            | Meaning                                   |
//! |------------------|-------------------------------------------|
//! | [`TextLike`]     | has UTF-8 text that can be read and set   |
//! | [`ToggleLike`]   | has a checked / unchecked state           |
//! | [`LevelLike`]    | has a level in `[0, 1]`                   |
//! | [`PushLike`]     | is currently pressed or not               |
//! | [`PositionLike`] | may report a 2D position in `[-1, 1]²`    |
//! | [`ImageLike`]    | holds a raster image                      |
//!
//! [`Control::as_text_like`] and friends return `Some(&dyn TextLike)` when
//! the variant has the capability and `None` otherwise, so a handler can
//! answer "not supported" without matching on every variant.
//!
//! # Pointer interaction
//!
//! Each variant reacts to pointer down / move / up in its own local frame and
//! returns an [`Interaction`] telling the caller what to do next: nothing,
//! redraw, send an event, or ask a platform dialog for text or an image.

mod button;
mod events;
mod image_display;
mod joystick;
mod label;
mod radio;
mod slider;
mod text_field;
mod toggle;
mod touchpad;

use std::fmt;
use std::time::Instant;

pub use button::{Button, ButtonStyle};
pub use events::ControlEvent;
pub use image_display::{ImageDisplay, ImageFit, RawImage};
pub use joystick::Joystick;
pub use label::{Label, TextAlign};
pub use radio::RadioButton;
pub use slider::Slider;
pub use text_field::TextField;
pub use toggle::{Toggle, ToggleStyle};
pub use touchpad::{Touchpad, TouchpadStyle};

use super::geometry::{Frame, Point};

// ── Identity ──────────────────────────────────────────────────────────────────

/// The server-chosen name of a control: an opaque byte string of 0–255 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ControlId(Vec<u8>);

impl ControlId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for ControlId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for ControlId {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

// ── Capability traits ─────────────────────────────────────────────────────────

pub trait TextLike {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);
}

pub trait ToggleLike {
    fn is_checked(&self) -> bool;
    fn set_checked(&mut self, checked: bool);
}

pub trait LevelLike {
    fn level(&self) -> f32;
    /// Stores `level` clamped to `[0, 1]`.
    fn set_level(&mut self, level: f32);
}

pub trait PushLike {
    fn is_pressed(&self) -> bool;
}

pub trait PositionLike {
    /// The current position in unit range, or `None` when not engaged.
    fn position(&self) -> Option<(f32, f32)>;
}

pub trait ImageLike {
    fn image(&self) -> &RawImage;
    fn set_image(&mut self, image: RawImage);
}

// ── Interaction ───────────────────────────────────────────────────────────────

/// What a control wants done after handling a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// The event changed nothing.
    None,
    /// Visible state changed; nothing to send.
    Redraw,
    /// Visible state changed and the server must be told.
    Emit(ControlEvent),
    /// Ask the platform for new text, seeded with `initial`.
    RequestTextEdit { initial: String },
    /// Ask the platform to pick an image.
    RequestImage,
}

// ── Control ───────────────────────────────────────────────────────────────────

/// A control of any kind.
#[derive(Debug, Clone)]
pub enum Control {
    Label(Label),
    Button(Button),
    TextField(TextField),
    ImageDisplay(ImageDisplay),
    Slider(Slider),
    Toggle(Toggle),
    RadioButton(RadioButton),
    Joystick(Joystick),
    Touchpad(Touchpad),
}

macro_rules! each_variant {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Control::Label($c) => $body,
            Control::Button($c) => $body,
            Control::TextField($c) => $body,
            Control::ImageDisplay($c) => $body,
            Control::Slider($c) => $body,
            Control::Toggle($c) => $body,
            Control::RadioButton($c) => $body,
            Control::Joystick($c) => $body,
            Control::Touchpad($c) => $body,
        }
    };
}

impl Control {
    pub fn id(&self) -> &ControlId {
        each_variant!(self, c => &c.id)
    }

    pub fn frame(&self) -> &Frame {
        each_variant!(self, c => &c.frame)
    }

    /// Short lowercase kind name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Control::Label(_) => "label",
            Control::Button(_) => "button",
            Control::TextField(_) => "textfield",
            Control::ImageDisplay(_) => "imagedisplay",
            Control::Slider(_) => "slider",
            Control::Toggle(_) => "toggle",
            Control::RadioButton(_) => "radiobutton",
            Control::Joystick(_) => "joystick",
            Control::Touchpad(_) => "touchpad",
        }
    }

    /// Hit test in canvas coordinates.  Labels never match.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Control::Label(_) => false,
            Control::Button(c) => c.contains(p),
            Control::TextField(c) => c.frame.contains(p, 0.0),
            Control::ImageDisplay(c) => c.frame.contains(p, 0.0),
            Control::Slider(c) => c.contains(p),
            Control::Toggle(c) => c.contains(p),
            Control::RadioButton(c) => c.contains(p),
            Control::Joystick(c) => c.contains(p),
            Control::Touchpad(c) => c.frame.contains(p, 0.0),
        }
    }

    pub fn mouse_down(&mut self, p: Point, now: Instant) -> Interaction {
        match self {
            Control::Label(_) => Interaction::None,
            Control::Button(c) => c.mouse_down(),
            Control::TextField(c) => c.mouse_down(),
            Control::ImageDisplay(c) => c.mouse_down(),
            Control::Slider(c) => c.mouse_down(p, now),
            Control::Toggle(c) => c.mouse_down(),
            Control::RadioButton(c) => c.mouse_down(),
            Control::Joystick(c) => c.mouse_down(p, now),
            Control::Touchpad(c) => c.mouse_down(p, now),
        }
    }

    pub fn mouse_move(&mut self, p: Point, now: Instant) -> Interaction {
        match self {
            Control::Slider(c) => c.mouse_move(p, now),
            Control::Joystick(c) => c.mouse_move(p, now),
            Control::Touchpad(c) => c.mouse_move(p, now),
            _ => Interaction::None,
        }
    }

    pub fn mouse_up(&mut self, p: Point, now: Instant) -> Interaction {
        match self {
            Control::Button(c) => c.mouse_up(),
            Control::Slider(c) => c.mouse_up(p, now),
            Control::Joystick(c) => c.mouse_up(now),
            Control::Touchpad(c) => c.mouse_up(now),
            _ => Interaction::None,
        }
    }

    /// Applies the result of a text edit the control asked for.
    ///
    /// Returns the event to send, or `None` if this control does not take
    /// edits (for example because it was made read-only in the meantime).
    pub fn complete_text_edit(&mut self, text: String) -> Option<ControlEvent> {
        match self {
            Control::TextField(c) => c.complete_edit(text),
            _ => None,
        }
    }

    /// Applies an image the control asked the platform to pick.
    pub fn complete_image_pick(&mut self, image: RawImage) -> Option<ControlEvent> {
        match self {
            Control::ImageDisplay(c) => c.complete_pick(image),
            _ => None,
        }
    }

    /// The radio group this control belongs to, if it is a radio button.
    pub fn radio_group(&self) -> Option<&[u8]> {
        match self {
            Control::RadioButton(c) => Some(&c.group),
            _ => None,
        }
    }

    // ── Capability queries ───────────────────────────────────────────────────

    pub fn as_text_like(&self) -> Option<&dyn TextLike> {
        match self {
            Control::Label(c) => Some(c),
            Control::Button(c) => Some(c),
            Control::TextField(c) => Some(c),
            Control::Toggle(c) => Some(c),
            Control::RadioButton(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text_like_mut(&mut self) -> Option<&mut dyn TextLike> {
        match self {
            Control::Label(c) => Some(c),
            Control::Button(c) => Some(c),
            Control::TextField(c) => Some(c),
            Control::Toggle(c) => Some(c),
            Control::RadioButton(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_toggle_like(&self) -> Option<&dyn ToggleLike> {
        match self {
            Control::Toggle(c) => Some(c),
            Control::RadioButton(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_toggle_like_mut(&mut self) -> Option<&mut dyn ToggleLike> {
        match self {
            Control::Toggle(c) => Some(c),
            Control::RadioButton(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_level_like(&self) -> Option<&dyn LevelLike> {
        match self {
            Control::Slider(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_level_like_mut(&mut self) -> Option<&mut dyn LevelLike> {
        match self {
            Control::Slider(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_push_like(&self) -> Option<&dyn PushLike> {
        match self {
            Control::Button(c) => Some(c),
            Control::Slider(c) => Some(c),
            Control::Joystick(c) => Some(c),
            Control::Touchpad(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_position_like(&self) -> Option<&dyn PositionLike> {
        match self {
            Control::Joystick(c) => Some(c),
            Control::Touchpad(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_image_like(&self) -> Option<&dyn ImageLike> {
        match self {
            Control::ImageDisplay(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_image_like_mut(&mut self) -> Option<&mut dyn ImageLike> {
        match self {
            Control::ImageDisplay(c) => Some(c),
            _ => None,
        }
    }
}
