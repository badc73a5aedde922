//! Parsing of the add-control requests.
//!
//! Every add request starts with `opcode + password` (9 bytes), followed by
//! a fixed-size block and then variable-length fields:
//!
//! | Op  | Fixed block after the header                                       | Min |
//! |-----|--------------------------------------------------------------------|-----|
//! | `g` | x y, text colour, font, align, landscape, id len                   | 28  |
//! | `B` | x y w h, colour, text colour, font, style, landscape, id len       | 40  |
//! | `T` | x y w h, colour, text colour, font, align, readonly, landscape, id len | 41 |
//! | `U` | x y w h, readonly, landscape, fit, id len                          | 29  |
//! | `j` | x y w, colour, landscape, id len                                   | 27  |
//! | `N` | x y w h, colour, style, landscape, id len                          | 32  |
//! | `Z` | x y, check colour, text colour, font, checked, style, landscape, readonly, id len | 34 |
//! | `y` | x y, check colour, text colour, font, checked, landscape, readonly, id len | 33 |
//!
//! The id bytes follow the id length; the radio button then has a
//! length-prefixed group; any remaining bytes are the control's text, which
//! must be valid UTF-8 or the whole request is dropped.
//!
//! Positions and sizes are percentages of the canvas: `x` and `w` of its
//! width, `y` and `h` of its height.  They are converted to pixels once, with
//! the canvas size known at creation time.

use iopanel_core::domain::controls::{
    Button, ButtonStyle, ImageDisplay, ImageFit, Joystick, Label, RadioButton, TextAlign,
    TextField, Toggle, ToggleStyle, Touchpad, TouchpadStyle,
};
use iopanel_core::domain::geometry::Frame;
use iopanel_core::protocol::codec::{require_len, CodecError, PayloadReader};
use iopanel_core::protocol::AUTH_HEADER_LEN;
use iopanel_core::{Control, ControlId, Opcode, Point, Rect, Size};

/// Minimum payload length for an add opcode, or `None` if `op` adds nothing.
pub fn min_len(op: Opcode) -> Option<usize> {
    let n = match op {
        Opcode::AddLabel => 28,
        Opcode::AddButton => 40,
        Opcode::AddTextField => 41,
        Opcode::AddImageDisplay => 29,
        Opcode::AddJoystick => 27,
        Opcode::AddTouchpad => 32,
        Opcode::AddToggle => 34,
        Opcode::AddRadioButton => 33,
        _ => return None,
    };
    Some(n)
}

/// Builds the control described by an add request.
///
/// # Errors
///
/// Returns [`CodecError::InsufficientData`] when the payload is shorter than
/// its opcode's minimum or a length-prefixed field runs past the end.
/// Returns it too (with `needed = 0`) if `op` is not an add opcode.
/// Returns [`CodecError::InvalidUtf8`] if the text is not valid UTF-8.
pub fn parse_add_control(op: Opcode, payload: &[u8], canvas: Size) -> Result<Control, CodecError> {
    let min = min_len(op).ok_or(CodecError::InsufficientData {
        needed: 0,
        available: payload.len(),
    })?;
    require_len(payload, min)?;
    let mut r = PayloadReader::at(payload, AUTH_HEADER_LEN);

    let control = match op {
        Opcode::AddLabel => {
            let anchor = read_point(&mut r, canvas)?;
            let text_color = r.color()?;
            let font_scale = r.f32()?;
            let align = TextAlign::from_wire(r.u8()?);
            let landscape = r.flag()?;
            let id = read_id(&mut r)?;
            let text = r.rest_utf8()?;
            Control::Label(Label::new(id, anchor, text_color, font_scale, align, landscape, text))
        }
        Opcode::AddButton => {
            let mut rect = read_rect(&mut r, canvas)?;
            let color = r.color()?;
            let text_color = r.color()?;
            let font_scale = r.f32()?;
            let (style, square) = ButtonStyle::from_wire(r.u8()?);
            let landscape = r.flag()?;
            let id = read_id(&mut r)?;
            let text = r.rest_utf8()?;
            if square {
                rect.height = rect.width;
            }
            Control::Button(Button::new(
                id,
                Frame::new(rect, landscape),
                color,
                text_color,
                font_scale,
                style,
                text,
            ))
        }
        Opcode::AddTextField => {
            let rect = read_rect(&mut r, canvas)?;
            let color = r.color()?;
            let text_color = r.color()?;
            let font_scale = r.f32()?;
            let align = TextAlign::from_wire(r.u8()?);
            let readonly = r.flag()?;
            let landscape = r.flag()?;
            let id = read_id(&mut r)?;
            let text = r.rest_utf8()?;
            Control::TextField(TextField::new(
                id,
                Frame::new(rect, landscape),
                color,
                text_color,
                font_scale,
                align,
                readonly,
                text,
            ))
        }
        Opcode::AddImageDisplay => {
            let rect = read_rect(&mut r, canvas)?;
            let readonly = r.flag()?;
            let landscape = r.flag()?;
            let fit = ImageFit::from_wire(r.u8()?);
            let id = read_id(&mut r)?;
            Control::ImageDisplay(ImageDisplay::new(id, Frame::new(rect, landscape), readonly, fit))
        }
        Opcode::AddJoystick => {
            let anchor = read_point(&mut r, canvas)?;
            let width = r.f32()? / 100.0 * canvas.width;
            let color = r.color()?;
            let landscape = r.flag()?;
            let id = read_id(&mut r)?;
            Control::Joystick(Joystick::new(id, anchor, width, color, landscape))
        }
        Opcode::AddTouchpad => {
            let mut rect = read_rect(&mut r, canvas)?;
            let color = r.color()?;
            let style = TouchpadStyle::from_wire(r.u8()?);
            let landscape = r.flag()?;
            let id = read_id(&mut r)?;
            if style == TouchpadStyle::Square {
                rect.height = rect.width;
            }
            Control::Touchpad(Touchpad::new(id, Frame::new(rect, landscape), color, style))
        }
        Opcode::AddToggle => {
            let anchor = read_point(&mut r, canvas)?;
            let check_color = r.color()?;
            let text_color = r.color()?;
            let font_size = r.f32()? * canvas.base_font_size();
            let checked = r.flag()?;
            let style = ToggleStyle::from_wire(r.u8()?);
            let landscape = r.flag()?;
            let readonly = r.flag()?;
            let id = read_id(&mut r)?;
            let text = r.rest_utf8()?;
            Control::Toggle(Toggle::new(
                id,
                anchor,
                check_color,
                text_color,
                font_size,
                style,
                checked,
                readonly,
                landscape,
                text,
            ))
        }
        Opcode::AddRadioButton => {
            let anchor = read_point(&mut r, canvas)?;
            let check_color = r.color()?;
            let text_color = r.color()?;
            let font_size = r.f32()? * canvas.base_font_size();
            let checked = r.flag()?;
            let landscape = r.flag()?;
            let readonly = r.flag()?;
            let id = read_id(&mut r)?;
            let group = r.short_bytes()?.to_vec();
            let text = r.rest_utf8()?;
            Control::RadioButton(RadioButton::new(
                id,
                anchor,
                group,
                check_color,
                text_color,
                font_size,
                checked,
                readonly,
                landscape,
                text,
            ))
        }
        _ => {
            return Err(CodecError::InsufficientData {
                needed: 0,
                available: payload.len(),
            })
        }
    };
    Ok(control)
}

fn read_point(r: &mut PayloadReader<'_>, canvas: Size) -> Result<Point, CodecError> {
    let (x, y) = canvas.from_percent(r.f32()?, r.f32()?);
    Ok(Point::new(x, y))
}

fn read_rect(r: &mut PayloadReader<'_>, canvas: Size) -> Result<Rect, CodecError> {
    let (x, y) = canvas.from_percent(r.f32()?, r.f32()?);
    let (w, h) = canvas.from_percent(r.f32()?, r.f32()?);
    Ok(Rect::new(x, y, w, h))
}

fn read_id(r: &mut PayloadReader<'_>) -> Result<ControlId, CodecError> {
    r.short_bytes().map(ControlId::from)
}
