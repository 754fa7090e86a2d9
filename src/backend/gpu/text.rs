//! Font loading and glyph rasterization
//!
//! Text is laid out and rasterized on the CPU with `rusttype`, producing
//! a tightly packed RGBA8 bitmap the caller uploads as a texture. Style
//! flags are applied here: bold and italic are synthesized (double-strike
//! and shear) since a single font file backs every style, underline and
//! strikethrough are drawn as bars, and outlines dilate the glyph
//! coverage before coloring.

use std::fs;
use std::path::Path;

use rusttype::{Font, Scale, point};

use crate::backend::{BackendError, Color, FontStyle, TextBitmap};

/// Horizontal shear applied per pixel of height for synthesized italics.
const ITALIC_SHEAR: f32 = 0.25;

/// A font file loaded at a fixed point size, plus its mutable render
/// attributes.
pub(super) struct LoadedFont {
    font: Font<'static>,
    point_size: u16,
    pub style: FontStyle,
    pub outline: u32,
}

impl LoadedFont {
    pub fn load(path: &Path, point_size: u16) -> Result<Self, BackendError> {
        if point_size == 0 {
            return Err(BackendError::Font(format!(
                "{}: zero point size",
                path.display()
            )));
        }
        let data = fs::read(path)
            .map_err(|err| BackendError::Font(format!("{}: {err}", path.display())))?;
        let font = Font::try_from_vec(data)
            .ok_or_else(|| BackendError::Font(format!("{}: not a usable font file", path.display())))?;
        Ok(Self {
            font,
            point_size,
            style: FontStyle::NORMAL,
            outline: 0,
        })
    }

    /// Rasterize one line of text into an RGBA8 bitmap.
    ///
    /// Always returns at least a 1x1 transparent bitmap so the result can
    /// back a texture.
    pub fn rasterize(&self, text: &str, color: Color) -> Result<TextBitmap, BackendError> {
        let scale = Scale::uniform(f32::from(self.point_size));
        let v_metrics = self.font.v_metrics(scale);
        let ascent = v_metrics.ascent.ceil();
        let line_height = (v_metrics.ascent - v_metrics.descent).ceil().max(1.0) as u32;

        let bold = self.style.contains(FontStyle::BOLD);
        let italic = self.style.contains(FontStyle::ITALIC);
        let pad = self.outline + u32::from(bold);

        let glyphs: Vec<_> = self
            .font
            .layout(text, scale, point(pad as f32, pad as f32 + ascent))
            .collect();
        let advance_width = glyphs
            .last()
            .map(|glyph| {
                (glyph.position().x + glyph.unpositioned().h_metrics().advance_width).ceil() as u32
            })
            .unwrap_or(0);
        if text.is_empty() || advance_width == 0 {
            return Ok(TextBitmap {
                pixels: vec![0, 0, 0, 0],
                width: 1,
                height: 1,
            });
        }

        let slant_extra = if italic {
            (line_height as f32 * ITALIC_SHEAR).ceil() as u32
        } else {
            0
        };
        let width = advance_width + pad + slant_extra;
        let height = line_height + pad * 2;

        // Coverage accumulates as the max of overlapping glyph parts, so
        // kerned pairs and the bold double-strike never over-darken.
        let mut coverage = vec![0.0f32; (width * height) as usize];
        let strike_offsets: &[i32] = if bold { &[0, 1] } else { &[0] };
        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            for &strike in strike_offsets {
                glyph.draw(|gx, gy, value| {
                    let py = bb.min.y + gy as i32;
                    let slant = if italic {
                        ((height as i32 - 1 - py) as f32 * ITALIC_SHEAR) as i32
                    } else {
                        0
                    };
                    let px = bb.min.x + gx as i32 + slant + strike;
                    if px >= 0 && (px as u32) < width && py >= 0 && (py as u32) < height {
                        let index = (py as u32 * width + px as u32) as usize;
                        coverage[index] = coverage[index].max(value);
                    }
                });
            }
        }

        let baseline = pad + ascent as u32;
        let bar_thickness = (u32::from(self.point_size) / 16).max(1);
        if self.style.contains(FontStyle::UNDERLINE) {
            fill_bar(&mut coverage, width, height, baseline + 1, bar_thickness);
        }
        if self.style.contains(FontStyle::STRIKETHROUGH) {
            let y = pad + (ascent * 0.6) as u32;
            fill_bar(&mut coverage, width, height, y, bar_thickness);
        }

        if self.outline > 0 {
            coverage = dilate(&coverage, width, height, self.outline);
        }

        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for value in &coverage {
            let alpha = (value.clamp(0.0, 1.0) * f32::from(color.a)).round() as u8;
            pixels.extend_from_slice(&[color.r, color.g, color.b, alpha]);
        }
        Ok(TextBitmap {
            pixels,
            width,
            height,
        })
    }
}

/// Set a horizontal bar of rows to full coverage.
fn fill_bar(coverage: &mut [f32], width: u32, height: u32, top: u32, thickness: u32) {
    for y in top..(top + thickness).min(height) {
        let row = (y * width) as usize;
        coverage[row..row + width as usize].fill(1.0);
    }
}

/// Square max-filter dilation of a coverage buffer by `radius` pixels.
fn dilate(coverage: &[f32], width: u32, height: u32, radius: u32) -> Vec<f32> {
    let radius = radius as i32;
    let mut out = vec![0.0f32; coverage.len()];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut value = 0.0f32;
            for dy in -radius..=radius {
                let sy = y + dy;
                if sy < 0 || sy >= height as i32 {
                    continue;
                }
                for dx in -radius..=radius {
                    let sx = x + dx;
                    if sx < 0 || sx >= width as i32 {
                        continue;
                    }
                    value = value.max(coverage[(sy * width as i32 + sx) as usize]);
                }
            }
            out[(y * width as i32 + x) as usize] = value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dilate_grows_a_point_into_a_square() {
        let mut coverage = vec![0.0f32; 25];
        coverage[12] = 1.0; // center of a 5x5 grid

        let dilated = dilate(&coverage, 5, 5, 1);

        for y in 0..5u32 {
            for x in 0..5u32 {
                let expected = (1..=3).contains(&x) && (1..=3).contains(&y);
                let value = dilated[(y * 5 + x) as usize];
                assert_eq!(value > 0.0, expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_dilate_zero_stays_zero() {
        let coverage = vec![0.0f32; 16];
        assert!(dilate(&coverage, 4, 4, 2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fill_bar_clamps_to_height() {
        let mut coverage = vec![0.0f32; 4 * 4];
        fill_bar(&mut coverage, 4, 4, 3, 5);

        // Only the last row fits.
        assert!(coverage[..12].iter().all(|&v| v == 0.0));
        assert!(coverage[12..].iter().all(|&v| v == 1.0));
    }
}
