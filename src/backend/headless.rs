//! Headless recording backend
//!
//! A [`RenderBackend`] that performs no real rendering: it mints fake
//! handles, tracks resource accounting, and records every draw call in
//! order. Used by the test suites of the stores and the compositor, and
//! usable for CI runs without a GPU.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::{BackendError, Color, FontId, FontStyle, Rect, RenderBackend, TextBitmap, TextureId};

/// One recorded draw or frame call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedDraw {
    /// Offscreen target cleared
    Clear(Color),
    /// Filled rectangle
    FillRect(Rect, Color),
    /// Rectangle outline
    OutlineRect(Rect, Color),
    /// Texture blit, `angle_degrees` is zero for unrotated blits
    Blit {
        /// Source texture
        texture: TextureId,
        /// Source region, `None` for the whole texture
        src: Option<Rect>,
        /// Destination rectangle
        dst: Rect,
        /// Clockwise rotation around the destination center
        angle_degrees: f64,
    },
    /// Offscreen target presented into the window at this rectangle
    PresentTarget(Rect),
    /// Frame flipped to the display
    Flip,
}

struct HeadlessFont {
    path: PathBuf,
    point_size: u16,
    style: FontStyle,
    outline: u32,
}

/// The recording backend. Construct with [`HeadlessBackend::new`] and
/// inspect via the accessors after driving the code under test.
pub struct HeadlessBackend {
    next_id: u64,
    textures: FxHashMap<TextureId, (u32, u32)>,
    fonts: FxHashMap<FontId, HeadlessFont>,
    draws: Vec<RecordedDraw>,
    destroyed_textures: Vec<TextureId>,
    destroyed_fonts: Vec<FontId>,
    invalid_destroys: u32,
    created_textures: u32,
    rasterize_calls: u32,
    resize_calls: u32,
    target_size: Option<(u32, u32)>,
    window_size: (u32, u32),
    window_position: (i32, i32),
    window_title: String,
    fullscreen: bool,
    fail_next_texture: bool,
    last_upload: Option<(TextureId, Vec<u8>)>,
}

impl HeadlessBackend {
    /// Create a backend with a 1280x720 window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window_size(1280, 720)
    }

    /// Create a backend reporting the given window size.
    #[must_use]
    pub fn with_window_size(width: u32, height: u32) -> Self {
        Self {
            next_id: 1,
            textures: FxHashMap::default(),
            fonts: FxHashMap::default(),
            draws: Vec::new(),
            destroyed_textures: Vec::new(),
            destroyed_fonts: Vec::new(),
            invalid_destroys: 0,
            created_textures: 0,
            rasterize_calls: 0,
            resize_calls: 0,
            target_size: None,
            window_size: (width, height),
            window_position: (0, 0),
            window_title: String::new(),
            fullscreen: false,
            fail_next_texture: false,
            last_upload: None,
        }
    }

    fn mint(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// All draw calls recorded so far, in issue order.
    #[must_use]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Forget recorded draws (resource accounting is kept).
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// The most recent present rectangle, if any frame was presented.
    #[must_use]
    pub fn last_present(&self) -> Option<Rect> {
        self.draws.iter().rev().find_map(|draw| match draw {
            RecordedDraw::PresentTarget(rect) => Some(*rect),
            _ => None,
        })
    }

    /// Number of textures currently alive.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Dimensions of a live texture.
    #[must_use]
    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    /// Total `create_texture` successes.
    #[must_use]
    pub fn created_textures(&self) -> u32 {
        self.created_textures
    }

    /// Every texture destroyed, in destruction order.
    #[must_use]
    pub fn destroyed_textures(&self) -> &[TextureId] {
        &self.destroyed_textures
    }

    /// Every font destroyed, in destruction order.
    #[must_use]
    pub fn destroyed_fonts(&self) -> &[FontId] {
        &self.destroyed_fonts
    }

    /// Count of destroy calls naming a handle that was not alive.
    /// A correct owner keeps this at zero.
    #[must_use]
    pub fn invalid_destroys(&self) -> u32 {
        self.invalid_destroys
    }

    /// Number of fonts currently alive.
    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Current style flags of a live font.
    #[must_use]
    pub fn font_style(&self, font: FontId) -> Option<FontStyle> {
        self.fonts.get(&font).map(|f| f.style)
    }

    /// Current outline width of a live font.
    #[must_use]
    pub fn font_outline(&self, font: FontId) -> Option<u32> {
        self.fonts.get(&font).map(|f| f.outline)
    }

    /// Path a live font was loaded from.
    #[must_use]
    pub fn font_path(&self, font: FontId) -> Option<&Path> {
        self.fonts.get(&font).map(|f| f.path.as_path())
    }

    /// Total `rasterize_text` calls.
    #[must_use]
    pub fn rasterize_calls(&self) -> u32 {
        self.rasterize_calls
    }

    /// Total `set_window_size` calls.
    #[must_use]
    pub fn resize_calls(&self) -> u32 {
        self.resize_calls
    }

    /// Offscreen target size, if one was created.
    #[must_use]
    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.target_size
    }

    /// Current fullscreen flag.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current window position.
    #[must_use]
    pub fn window_position(&self) -> (i32, i32) {
        self.window_position
    }

    /// Current window title.
    #[must_use]
    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    /// Make the next `create_texture` call fail, for error-path tests.
    pub fn fail_next_texture_creation(&mut self) {
        self.fail_next_texture = true;
    }

    /// The pixel buffer most recently passed to `create_texture`.
    #[must_use]
    pub fn last_upload(&self) -> Option<(TextureId, &[u8])> {
        self.last_upload
            .as_ref()
            .map(|(id, pixels)| (*id, pixels.as_slice()))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureId, BackendError> {
        if self.fail_next_texture {
            self.fail_next_texture = false;
            return Err(BackendError::Texture("injected failure".into()));
        }
        if width == 0 || height == 0 {
            return Err(BackendError::Texture(format!(
                "zero-sized texture ({width}x{height})"
            )));
        }
        if pixels.len() != (width * height * 4) as usize {
            return Err(BackendError::Texture(format!(
                "pixel buffer is {} bytes, expected {}",
                pixels.len(),
                width * height * 4
            )));
        }
        let id = TextureId(self.mint());
        self.textures.insert(id, (width, height));
        self.created_textures += 1;
        self.last_upload = Some((id, pixels.to_vec()));
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            self.destroyed_textures.push(texture);
        } else {
            self.invalid_destroys += 1;
        }
    }

    fn load_font(&mut self, path: &Path, point_size: u16) -> Result<FontId, BackendError> {
        if point_size == 0 {
            return Err(BackendError::Font("zero point size".into()));
        }
        let id = FontId(self.mint());
        self.fonts.insert(
            id,
            HeadlessFont {
                path: path.to_path_buf(),
                point_size,
                style: FontStyle::NORMAL,
                outline: 0,
            },
        );
        Ok(id)
    }

    fn destroy_font(&mut self, font: FontId) {
        if self.fonts.remove(&font).is_some() {
            self.destroyed_fonts.push(font);
        } else {
            self.invalid_destroys += 1;
        }
    }

    fn set_font_style(&mut self, font: FontId, style: FontStyle) {
        if let Some(entry) = self.fonts.get_mut(&font) {
            entry.style = style;
        }
    }

    fn set_font_outline(&mut self, font: FontId, width: u32) {
        if let Some(entry) = self.fonts.get_mut(&font) {
            entry.outline = width;
        }
    }

    fn rasterize_text(
        &mut self,
        font: FontId,
        text: &str,
        color: Color,
    ) -> Result<TextBitmap, BackendError> {
        let entry = self
            .fonts
            .get(&font)
            .ok_or_else(|| BackendError::Font(format!("unknown font id {}", font.0)))?;
        self.rasterize_calls += 1;

        // Deterministic stand-in geometry: half a point per character wide,
        // one point tall, every pixel the requested color.
        let glyph_width = u32::from(entry.point_size / 2).max(1);
        let width = (text.chars().count() as u32 * glyph_width).max(1);
        let height = u32::from(entry.point_size).max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Ok(TextBitmap {
            pixels,
            width,
            height,
        })
    }

    fn create_target(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Texture(format!(
                "zero-sized render target ({width}x{height})"
            )));
        }
        self.target_size = Some((width, height));
        Ok(())
    }

    fn clear_target(&mut self, color: Color) {
        self.draws.push(RecordedDraw::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.draws.push(RecordedDraw::FillRect(rect, color));
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.draws.push(RecordedDraw::OutlineRect(rect, color));
    }

    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect) {
        self.draws.push(RecordedDraw::Blit {
            texture,
            src,
            dst,
            angle_degrees: 0.0,
        });
    }

    fn blit_rotated(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle_degrees: f64,
    ) {
        self.draws.push(RecordedDraw::Blit {
            texture,
            src,
            dst,
            angle_degrees,
        });
    }

    fn present_target(&mut self, dst: Rect) {
        self.draws.push(RecordedDraw::PresentTarget(dst));
    }

    fn flip(&mut self) {
        self.draws.push(RecordedDraw::Flip);
    }

    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.resize_calls += 1;
        self.window_size = (width, height);
    }

    fn set_window_position(&mut self, x: i32, y: i32) {
        self.window_position = (x, y);
    }

    fn center_window(&mut self) {
        self.window_position = (0, 0);
    }

    fn set_window_title(&mut self, title: &str) {
        self.window_title = title.to_string();
    }

    fn set_fullscreen(&mut self, enabled: bool, _use_desktop_resolution: bool) {
        self.fullscreen = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_accounting() {
        let mut backend = HeadlessBackend::new();

        let pixels = vec![0u8; 4 * 4 * 4];
        let id = backend.create_texture(&pixels, 4, 4).unwrap();
        assert_eq!(backend.texture_count(), 1);
        assert_eq!(backend.texture_size(id), Some((4, 4)));

        backend.destroy_texture(id);
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.destroyed_textures(), &[id]);

        // Destroying again is an ownership bug the double must surface.
        backend.destroy_texture(id);
        assert_eq!(backend.invalid_destroys(), 1);
    }

    #[test]
    fn test_create_texture_validates_input() {
        let mut backend = HeadlessBackend::new();

        assert!(backend.create_texture(&[], 0, 4).is_err());
        assert!(backend.create_texture(&[0u8; 8], 4, 4).is_err()); // wrong length
    }

    #[test]
    fn test_draws_record_in_order() {
        let mut backend = HeadlessBackend::new();

        backend.clear_target(Color::BLACK);
        backend.fill_rect(Rect::new(1, 2, 3, 4), Color::WHITE);
        backend.present_target(Rect::new(0, 0, 10, 10));
        backend.flip();

        assert_eq!(backend.draws().len(), 4);
        assert_eq!(backend.draws()[0], RecordedDraw::Clear(Color::BLACK));
        assert_eq!(backend.last_present(), Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(backend.draws()[3], RecordedDraw::Flip);
    }

    #[test]
    fn test_rasterize_counts_and_sizes() {
        let mut backend = HeadlessBackend::new();
        let font = backend.load_font(Path::new("any.ttf"), 16).unwrap();

        let bitmap = backend.rasterize_text(font, "ab", Color::WHITE).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (16, 16)); // 2 chars * 8px
        assert_eq!(backend.rasterize_calls(), 1);

        let empty = backend.rasterize_text(font, "", Color::WHITE).unwrap();
        assert_eq!((empty.width, empty.height), (1, 16));
    }
}
