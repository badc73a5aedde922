use super::{ControlEvent, ControlId, Interaction, TextAlign, TextLike};
use crate::domain::geometry::{Color, Frame};

/// Editable text box.
///
/// Touching an editable field asks the platform for new text.  The result
/// comes back later through [`TextField::complete_edit`], which applies it
/// and produces the event for the server.
#[derive(Debug, Clone)]
pub struct TextField {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub color: Color,
    pub text_color: Color,
    pub font_scale: f32,
    pub align: TextAlign,
    pub readonly: bool,
    text: String,
}

impl TextField {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ControlId,
        frame: Frame,
        color: Color,
        text_color: Color,
        font_scale: f32,
        align: TextAlign,
        readonly: bool,
        text: String,
    ) -> Self {
        Self {
            id,
            frame,
            color,
            text_color,
            font_scale,
            align,
            readonly,
            text,
        }
    }

    pub(crate) fn mouse_down(&mut self) -> Interaction {
        if self.readonly {
            return Interaction::None;
        }
        Interaction::RequestTextEdit {
            initial: self.text.clone(),
        }
    }

    pub(crate) fn complete_edit(&mut self, text: String) -> Option<ControlEvent> {
        if self.readonly {
            return None;
        }
        self.text = text.clone();
        Some(ControlEvent::TextChanged {
            id: self.id.clone(),
            text,
        })
    }
}

impl TextLike for TextField {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}
