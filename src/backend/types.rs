//! Shared drawing value types
//!
//! Pixel-space rectangles, RGBA colors, and font style flags used across
//! the backend trait, the resource stores, and the compositor.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in integer pixel space.
///
/// Used both as a source region inside an image and as a destination
/// on a render target. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge in pixels
    pub x: i32,
    /// Top edge in pixels
    pub y: i32,
    /// Width in pixels
    pub w: i32,
    /// Height in pixels
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive)
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive)
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Check if a point is inside the rectangle
    #[must_use]
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Check if `other` lies entirely within this rectangle
    #[must_use]
    pub const fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (255 = opaque)
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color from red, green and blue channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from all four channels
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack the channels into a single little-endian word.
    ///
    /// Layout is `r | g << 8 | b << 16 | a << 24`; text cache keys hash
    /// this packed form so two colors collide only when byte-identical.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        self.r as u32 | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
    }

    /// Channels as normalized floats in RGBA order
    #[must_use]
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Font rendering style flags, combinable with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontStyle(u8);

impl FontStyle {
    /// Plain rendering
    pub const NORMAL: Self = Self(0x00);
    /// Thickened strokes
    pub const BOLD: Self = Self(0x01);
    /// Slanted glyphs
    pub const ITALIC: Self = Self(0x02);
    /// Line under the baseline
    pub const UNDERLINE: Self = Self(0x04);
    /// Line through the glyph body
    pub const STRIKETHROUGH: Self = Self(0x08);

    /// Raw flag bits
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Reconstruct from raw bits, masking unknown flags off
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0f)
    }

    /// Check whether every flag in `other` is set
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for FontStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for FontStyle {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_contains() {
        let rect = Rect::new(10, 20, 30, 40);

        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert!(rect.contains(10, 20));
        assert!(rect.contains(39, 59));
        assert!(!rect.contains(40, 20)); // right edge is exclusive
        assert!(!rect.contains(9, 20));
    }

    #[test]
    fn test_rect_encloses() {
        let outer = Rect::new(0, 0, 64, 64);

        assert!(outer.encloses(&Rect::new(0, 0, 64, 64)));
        assert!(outer.encloses(&Rect::new(16, 16, 16, 16)));
        assert!(!outer.encloses(&Rect::new(48, 48, 32, 32)));
        assert!(!outer.encloses(&Rect::new(-1, 0, 8, 8)));
    }

    #[test]
    fn test_color_packed_layout() {
        let color = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(color.packed(), 0x4433_2211);

        assert_eq!(Color::WHITE.packed(), 0xffff_ffff);
        assert_eq!(Color::BLACK.packed(), 0xff00_0000); // alpha only
    }

    #[test]
    fn test_font_style_flags_combine() {
        let style = FontStyle::BOLD | FontStyle::UNDERLINE;

        assert_eq!(style.bits(), 0x05);
        assert!(style.contains(FontStyle::BOLD));
        assert!(style.contains(FontStyle::UNDERLINE));
        assert!(!style.contains(FontStyle::ITALIC));
        assert_eq!(FontStyle::from_bits(0xf5).bits(), 0x05);
    }
}
