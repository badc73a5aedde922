use super::{ControlEvent, ControlId, Interaction, TextLike, ToggleLike};
use crate::domain::geometry::{Color, Frame, Point, Rect};

/// Extra touch margin around text-sized controls, in pixels.
pub const TEXT_CONTROL_TOUCH_PAD: f32 = 10.0;

/// Estimated width of one character, as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleStyle {
    #[default]
    Switch,
    Checkbox,
}

impl ToggleStyle {
    pub fn from_wire(byte: u8) -> Self {
        if byte == 1 {
            ToggleStyle::Checkbox
        } else {
            ToggleStyle::Switch
        }
    }
}

/// Local-space touch area of a text-sized control: an indicator box of
/// `box_width × font_size` followed by the estimated label width.
pub(crate) fn text_control_area(font_size: f32, box_width: f32, text: &str) -> Rect {
    let label = CHAR_WIDTH_FACTOR * font_size * text.chars().count() as f32;
    Rect::new(0.0, 0.0, box_width + label, font_size).inflate(TEXT_CONTROL_TOUCH_PAD)
}

/// An on/off switch or checkbox with a text label.
#[derive(Debug, Clone)]
pub struct Toggle {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub check_color: Color,
    pub text_color: Color,
    /// Font size in pixels, already scaled to the canvas.
    pub font_size: f32,
    pub style: ToggleStyle,
    pub readonly: bool,
    text: String,
    checked: bool,
}

impl Toggle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ControlId,
        anchor: Point,
        check_color: Color,
        text_color: Color,
        font_size: f32,
        style: ToggleStyle,
        checked: bool,
        readonly: bool,
        landscape: bool,
        text: String,
    ) -> Self {
        Self {
            id,
            frame: Frame::new(Rect::new(anchor.x, anchor.y, 0.0, 0.0), landscape),
            check_color,
            text_color,
            font_size,
            style,
            readonly,
            text,
            checked,
        }
    }

    fn box_width(&self) -> f32 {
        match self.style {
            ToggleStyle::Switch => 2.0 * self.font_size,
            ToggleStyle::Checkbox => self.font_size,
        }
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        text_control_area(self.font_size, self.box_width(), &self.text)
            .contains(self.frame.to_local(p))
    }

    pub(crate) fn mouse_down(&mut self) -> Interaction {
        if self.readonly {
            return Interaction::None;
        }
        self.checked = !self.checked;
        Interaction::Emit(ControlEvent::ToggleChanged {
            id: self.id.clone(),
            checked: self.checked,
        })
    }
}

impl TextLike for Toggle {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl ToggleLike for Toggle {
    fn is_checked(&self) -> bool {
        self.checked
    }

    fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(style: ToggleStyle, readonly: bool) -> Toggle {
        Toggle::new(
            "t".into(),
            Point::new(100.0, 100.0),
            Color::BLACK,
            Color::BLACK,
            20.0,
            style,
            false,
            readonly,
            false,
            "ab".into(),
        )
    }

    #[test]
    fn test_touch_flips_state_and_emits() {
        let mut t = toggle(ToggleStyle::Switch, false);
        assert_eq!(
            t.mouse_down(),
            Interaction::Emit(ControlEvent::ToggleChanged {
                id: "t".into(),
                checked: true
            })
        );
        t.mouse_down();
        assert!(!t.is_checked());
    }

    #[test]
    fn test_readonly_toggle_keeps_state() {
        let mut t = toggle(ToggleStyle::Checkbox, true);
        assert_eq!(t.mouse_down(), Interaction::None);
        assert!(!t.is_checked());
    }

    #[test]
    fn test_switch_is_wider_than_checkbox() {
        // Switch: 40 + 2 chars * 12 = 64 wide; checkbox: 20 + 24 = 44 wide
        let switch = toggle(ToggleStyle::Switch, false);
        let checkbox = toggle(ToggleStyle::Checkbox, false);
        let p = Point::new(100.0 + 60.0, 110.0);
        assert!(switch.contains(p));
        assert!(!checkbox.contains(p));
    }

    #[test]
    fn test_hit_area_includes_padding() {
        let t = toggle(ToggleStyle::Checkbox, false);
        assert!(t.contains(Point::new(95.0, 95.0)));
        assert!(!t.contains(Point::new(85.0, 95.0)));
    }
}
