use super::toggle::text_control_area;
use super::{ControlEvent, ControlId, Interaction, TextLike, ToggleLike};
use crate::domain::geometry::{Color, Frame, Point, Rect};

/// A radio button.  Radio buttons with equal `group` bytes are mutually
/// exclusive; the registry clears the others when one is selected.
#[derive(Debug, Clone)]
pub struct RadioButton {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub(crate) group: Vec<u8>,
    pub check_color: Color,
    pub text_color: Color,
    /// Font size in pixels, already scaled to the canvas.
    pub font_size: f32,
    pub readonly: bool,
    text: String,
    checked: bool,
}

impl RadioButton {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ControlId,
        anchor: Point,
        group: Vec<u8>,
        check_color: Color,
        text_color: Color,
        font_size: f32,
        checked: bool,
        readonly: bool,
        landscape: bool,
        text: String,
    ) -> Self {
        Self {
            id,
            frame: Frame::new(Rect::new(anchor.x, anchor.y, 0.0, 0.0), landscape),
            group,
            check_color,
            text_color,
            font_size,
            readonly,
            text,
            checked,
        }
    }

    pub fn group(&self) -> &[u8] {
        &self.group
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        text_control_area(self.font_size, self.font_size, &self.text)
            .contains(self.frame.to_local(p))
    }

    /// Selecting is idempotent on this button but always reported, so the
    /// server sees every tap.
    pub(crate) fn mouse_down(&mut self) -> Interaction {
        if self.readonly {
            return Interaction::None;
        }
        self.checked = true;
        Interaction::Emit(ControlEvent::ToggleChanged {
            id: self.id.clone(),
            checked: true,
        })
    }
}

impl TextLike for RadioButton {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl ToggleLike for RadioButton {
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

    #[test]
    fn test_tapping_checked_radio_still_reports() {
        // Arrange
        let mut r = RadioButton::new(
            "r".into(),
            Point::new(0.0, 0.0),
            b"g".to_vec(),
            Color::BLACK,
            Color::BLACK,
            20.0,
            true,
            false,
            false,
            String::new(),
        );

        // Act
        let i = r.mouse_down();

        // Assert
        assert!(r.is_checked());
        assert!(matches!(i, Interaction::Emit(ControlEvent::ToggleChanged { checked: true, .. })));
    }

    #[test]
    fn test_readonly_radio_ignores_touch() {
        let mut r = RadioButton::new(
            "r".into(),
            Point::new(0.0, 0.0),
            Vec::new(),
            Color::BLACK,
            Color::BLACK,
            20.0,
            false,
            true,
            false,
            String::new(),
        );
        assert_eq!(r.mouse_down(), Interaction::None);
        assert!(!r.is_checked());
    }
}
