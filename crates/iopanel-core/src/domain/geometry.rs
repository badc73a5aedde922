//! Canvas geometry: points, sizes, rectangles, colours and control frames.
//!
//! All coordinates are canvas pixels with the origin at the top-left corner
//! and y growing downward.  Controls convert canvas points into their own
//! *local* frame before doing anything with them; see [`Frame::to_local`].

/// A point in canvas (or control-local) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Base font size for text-driven controls on a canvas of this size.
    pub fn base_font_size(&self) -> f32 {
        30.0 * self.height / 1200.0
    }

    /// Converts a percentage pair (0–100) into pixels on this canvas.
    ///
    /// `x` is relative to the width, `y` to the height.
    pub fn from_percent(&self, x: f32, y: f32) -> (f32, f32) {
        (x / 100.0 * self.width, y / 100.0 * self.height)
    }
}

impl Default for Size {
    /// The canvas size assumed before the presentation layer reports one.
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Returns this rectangle grown by `pad` pixels on every side.
    pub fn inflate(&self, pad: f32) -> Rect {
        Rect::new(
            self.x - pad,
            self.y - pad,
            self.width + 2.0 * pad,
            self.height + 2.0 * pad,
        )
    }

    /// Tests `p` against the ellipse inscribed in this rectangle.
    pub fn ellipse_contains(&self, p: Point) -> bool {
        let rx = self.width / 2.0;
        let ry = self.height / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = self.center();
        let dx = (p.x - c.x) / rx;
        let dy = (p.y - c.y) / ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// An RGBA colour with every channel normalised to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Unpacks `(a << 24) | (r << 16) | (g << 8) | b`.
    pub fn from_packed(raw: u32) -> Self {
        let channel = |shift: u32| ((raw >> shift) & 0xFF) as f32 / 255.0;
        Self::rgba(channel(16), channel(8), channel(0), channel(24))
    }

    /// Packs the colour back into ARGB, rounding each channel to 8 bits.
    pub fn to_packed(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.alpha) << 24)
            | (channel(self.red) << 16)
            | (channel(self.green) << 8)
            | channel(self.blue)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Where a control sits on the canvas and which way it faces.
///
/// A landscape control is rotated 90° about its anchor (the top-left corner
/// of `rect`), so its local x axis runs down the canvas and its local y axis
/// runs toward the left edge.  In local space every control occupies
/// `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub rect: Rect,
    pub landscape: bool,
}

impl Frame {
    pub const fn new(rect: Rect, landscape: bool) -> Self {
        Self { rect, landscape }
    }

    pub fn width(&self) -> f32 {
        self.rect.width
    }

    pub fn height(&self) -> f32 {
        self.rect.height
    }

    /// Maps a canvas point into this control's local frame.
    pub fn to_local(&self, p: Point) -> Point {
        let anchor = Point::new(self.rect.x, self.rect.y);
        if self.landscape {
            Point::new(p.y - anchor.y, anchor.x - p.x)
        } else {
            Point::new(p.x - anchor.x, p.y - anchor.y)
        }
    }

    /// The control's area in its own local frame.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.rect.width, self.rect.height)
    }

    /// Rectangle containment in local space, grown by `pad`.
    pub fn contains(&self, p: Point, pad: f32) -> bool {
        self.local_rect().inflate(pad).contains(self.to_local(p))
    }

    /// Ellipse containment in local space.
    pub fn ellipse_contains(&self, p: Point) -> bool {
        self.local_rect().ellipse_contains(self.to_local(p))
    }
}
