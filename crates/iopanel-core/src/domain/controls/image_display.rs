use super::{ControlEvent, ControlId, ImageLike, Interaction};
use crate::domain::geometry::Frame;

/// An uncompressed RGBA8 raster.
///
/// Encoding to and from a transport format (PNG, JPEG, …) is the platform
/// codec's job; the control model only stores pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl RawImage {
    /// A fully transparent image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wraps pixel data, returning `None` if the buffer size does not match.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        (rgba.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.rgba[i..i + 4]);
        Some(px)
    }

    /// Halves both dimensions (never below 1) with nearest-neighbour sampling.
    pub fn downscale_half(&self) -> RawImage {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let sy = (y * 2).min(self.height.saturating_sub(1));
            for x in 0..width {
                let sx = (x * 2).min(self.width.saturating_sub(1));
                let px = self.pixel(sx, sy).unwrap_or([0; 4]);
                rgba.extend_from_slice(&px);
            }
        }
        RawImage {
            width,
            height,
            rgba,
        }
    }
}

/// How the image is scaled into the control's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFit {
    /// Scale to fit inside, keeping aspect ratio.
    #[default]
    Fit,
    /// Scale to fill, keeping aspect ratio and cropping.
    Zoom,
    /// Fill exactly, ignoring aspect ratio.
    Stretch,
}

impl ImageFit {
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            1 => ImageFit::Zoom,
            2 => ImageFit::Stretch,
            _ => ImageFit::Fit,
        }
    }
}

/// Displays an image; optionally lets the user replace it.
#[derive(Debug, Clone)]
pub struct ImageDisplay {
    pub(crate) id: ControlId,
    pub(crate) frame: Frame,
    pub readonly: bool,
    pub fit: ImageFit,
    image: RawImage,
}

impl ImageDisplay {
    pub fn new(id: ControlId, frame: Frame, readonly: bool, fit: ImageFit) -> Self {
        Self {
            id,
            frame,
            readonly,
            fit,
            image: RawImage::blank(1, 1),
        }
    }

    pub(crate) fn mouse_down(&mut self) -> Interaction {
        if self.readonly {
            Interaction::None
        } else {
            Interaction::RequestImage
        }
    }

    pub(crate) fn complete_pick(&mut self, image: RawImage) -> Option<ControlEvent> {
        if self.readonly {
            return None;
        }
        self.image = image;
        Some(ControlEvent::ImageChanged {
            id: self.id.clone(),
        })
    }
}

impl ImageLike for ImageDisplay {
    fn image(&self) -> &RawImage {
        &self.image
    }

    fn set_image(&mut self, image: RawImage) {
        self.image = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Rect;

    fn checker(width: u32, height: u32) -> RawImage {
        let mut rgba = Vec::new();
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        RawImage::from_rgba(width, height, rgba).unwrap()
    }

    #[test]
    fn test_from_rgba_rejects_wrong_buffer_size() {
        assert!(RawImage::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(RawImage::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_downscale_half_samples_even_pixels() {
        // Arrange
        let img = checker(4, 4);

        // Act
        let half = img.downscale_half();

        // Assert
        assert_eq!((half.width, half.height), (2, 2));
        assert_eq!(half.pixel(1, 1), Some([2, 2, 0, 255]));
    }

    #[test]
    fn test_downscale_never_goes_below_one_pixel() {
        let img = checker(1, 3);
        let half = img.downscale_half();
        assert_eq!((half.width, half.height), (1, 1));
        assert_eq!(half.rgba.len(), 4);
    }

    #[test]
    fn test_readonly_display_does_not_request_image() {
        let mut d = ImageDisplay::new(
            "img".into(),
            Frame::new(Rect::new(0.0, 0.0, 10.0, 10.0), false),
            true,
            ImageFit::Fit,
        );
        assert_eq!(d.mouse_down(), Interaction::None);
        assert_eq!(d.complete_pick(RawImage::blank(2, 2)), None);
    }

    #[test]
    fn test_picked_image_replaces_current_and_emits() {
        let mut d = ImageDisplay::new(
            "img".into(),
            Frame::new(Rect::new(0.0, 0.0, 10.0, 10.0), false),
            false,
            ImageFit::Zoom,
        );
        assert_eq!(d.mouse_down(), Interaction::RequestImage);
        let ev = d.complete_pick(RawImage::blank(2, 2));
        assert_eq!(ev, Some(ControlEvent::ImageChanged { id: "img".into() }));
        assert_eq!(d.image().width, 2);
    }
}
