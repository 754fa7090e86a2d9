//! Frame composition and presentation
//!
//! Every frame is drawn at a fixed logical resolution into an offscreen
//! target, then blitted into the window scaled by an integer factor and
//! centered, letterboxing whatever the window shape leaves over. Game
//! code thus always addresses the same pixel grid no matter the window.
//!
//! The per-frame call shape is:
//!
//! ```ignore
//! compositor.clear(backend);
//! compositor.draw_sprite(backend, resources, "ship", 120, 80)?;
//! compositor.present_scaled(backend);
//! compositor.flip(backend);
//! ```
//!
//! Draw calls compose in strict call order (painter's algorithm, no depth
//! sorting) and read from the stores they are passed: images from the
//! [`ResourceStore`], regions through the [`SheetRegistry`], text through
//! the [`TextCache`]. A draw fails exactly the way its store lookup fails.
//! Calling out of order (draw before clear, flip before present) is a
//! caller defect caught by debug assertions, tolerated in release.

use crate::backend::{Color, Rect, RenderBackend, TextureId};
use crate::resources::{ResourceError, ResourceStore, SheetRegistry, TextCache};

/// Position in the per-frame call cycle. Debug builds assert the cycle
/// `Ready → Cleared → Composed → Presented → Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    Uninitialized,
    Ready,
    Cleared,
    Composed,
    Presented,
}

/// Owns frame state: logical resolution, display scale, window size,
/// fullscreen flag, clear color, and the default font name.
pub struct Compositor {
    logical_width: u32,
    logical_height: u32,
    scale: u32,
    window_width: u32,
    window_height: u32,
    fullscreen: bool,
    clear_color: Color,
    default_font: Option<String>,
    phase: FramePhase,
}

impl Compositor {
    /// Create a compositor for a logical resolution and integer scale.
    /// Call [`init`](Self::init) once the backend exists.
    #[must_use]
    pub fn new(logical_width: u32, logical_height: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        Self {
            logical_width,
            logical_height,
            scale,
            window_width: logical_width * scale,
            window_height: logical_height * scale,
            fullscreen: false,
            clear_color: Color::BLACK,
            default_font: None,
            phase: FramePhase::Uninitialized,
        }
    }

    /// Create the offscreen target and adopt the backend's window size.
    pub fn init(&mut self, backend: &mut impl RenderBackend) -> Result<(), ResourceError> {
        backend.create_target(self.logical_width, self.logical_height)?;
        let (width, height) = backend.window_size();
        self.window_width = width;
        self.window_height = height;
        self.phase = FramePhase::Ready;
        log::info!(
            "compositor ready: {}x{} logical, {}x scale, {width}x{height} window",
            self.logical_width,
            self.logical_height,
            self.scale
        );
        Ok(())
    }

    // =========================================================================
    // Frame cycle
    // =========================================================================

    /// Begin a frame: fill the offscreen target with the clear color.
    pub fn clear(&mut self, backend: &mut impl RenderBackend) {
        debug_assert!(
            self.phase != FramePhase::Uninitialized,
            "clear() before init()"
        );
        debug_assert!(
            self.phase == FramePhase::Ready,
            "clear() in mid-frame, was the previous frame flipped?"
        );
        backend.clear_target(self.clear_color);
        self.phase = FramePhase::Cleared;
    }

    /// Scale and center the offscreen target into the window.
    pub fn present_scaled(&mut self, backend: &mut impl RenderBackend) {
        debug_assert!(
            matches!(self.phase, FramePhase::Cleared | FramePhase::Composed),
            "present_scaled() without a cleared frame"
        );
        backend.present_target(self.present_rect());
        self.phase = FramePhase::Presented;
    }

    /// Show the composed frame on the display.
    pub fn flip(&mut self, backend: &mut impl RenderBackend) {
        debug_assert!(
            self.phase == FramePhase::Presented,
            "flip() before present_scaled()"
        );
        backend.flip();
        self.phase = FramePhase::Ready;
    }

    /// The letterboxed destination for the scaled offscreen target,
    /// centered in the current window.
    #[must_use]
    pub fn present_rect(&self) -> Rect {
        let scaled_w = (self.logical_width * self.scale) as i32;
        let scaled_h = (self.logical_height * self.scale) as i32;
        Rect::new(
            (self.window_width as i32 - scaled_w) / 2,
            (self.window_height as i32 - scaled_h) / 2,
            scaled_w,
            scaled_h,
        )
    }

    fn mark_composed(&mut self) {
        debug_assert!(
            matches!(self.phase, FramePhase::Cleared | FramePhase::Composed),
            "draw call outside clear()..present_scaled()"
        );
        self.phase = FramePhase::Composed;
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Fill a rectangle on the offscreen target.
    pub fn fill_rect(&mut self, backend: &mut impl RenderBackend, rect: Rect, color: Color) {
        self.mark_composed();
        backend.fill_rect(rect, color);
    }

    /// Draw a one-pixel rectangle outline on the offscreen target.
    pub fn draw_rect(&mut self, backend: &mut impl RenderBackend, rect: Rect, color: Color) {
        self.mark_composed();
        backend.outline_rect(rect, color);
    }

    // =========================================================================
    // Sprites
    // =========================================================================

    /// Draw a stored image with its top-left corner at (x, y).
    pub fn draw_sprite(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        name: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let sprite = resources.get_image(name)?;
        self.mark_composed();
        let dst = Rect::new(x, y, sprite.width as i32, sprite.height as i32);
        backend.blit(sprite.texture, None, dst);
        Ok(())
    }

    /// Draw a stored image centered on (x, y).
    pub fn draw_sprite_centered(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        name: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let sprite = resources.get_image(name)?;
        self.mark_composed();
        let w = sprite.width as i32;
        let h = sprite.height as i32;
        backend.blit(sprite.texture, None, Rect::new(x - w / 2, y - h / 2, w, h));
        Ok(())
    }

    /// Draw a stored image centered on (x, y), rotated clockwise.
    pub fn draw_sprite_centered_rotated(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        name: &str,
        x: i32,
        y: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let sprite = resources.get_image(name)?;
        self.mark_composed();
        let w = sprite.width as i32;
        let h = sprite.height as i32;
        let dst = Rect::new(x - w / 2, y - h / 2, w, h);
        backend.blit_rotated(sprite.texture, None, dst, angle_degrees);
        Ok(())
    }

    /// Draw a region of a stored image with its top-left at (x, y).
    pub fn draw_sprite_region(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        name: &str,
        region: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let sprite = resources.get_image(name)?;
        self.mark_composed();
        let dst = Rect::new(x, y, region.w, region.h);
        backend.blit(sprite.texture, Some(region), dst);
        Ok(())
    }

    /// Draw a region of a stored image centered on (x, y).
    pub fn draw_sprite_region_centered(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        name: &str,
        region: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let sprite = resources.get_image(name)?;
        self.mark_composed();
        let dst = Rect::new(x - region.w / 2, y - region.h / 2, region.w, region.h);
        backend.blit(sprite.texture, Some(region), dst);
        Ok(())
    }

    // =========================================================================
    // Sheet sprites
    // =========================================================================

    fn resolve_region(
        resources: &ResourceStore,
        sheets: &SheetRegistry,
        sheet_name: &str,
        region_name: &str,
    ) -> Result<(TextureId, Rect), ResourceError> {
        let sheet = sheets.get(sheet_name)?;
        let region = sheet.region_by_name(region_name)?;
        let image = resources.get_image(sheet.image())?;
        Ok((image.texture, region))
    }

    /// Draw a named sheet region with its top-left at (x, y).
    pub fn draw_sheet_sprite(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        sheets: &SheetRegistry,
        sheet_name: &str,
        region_name: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let (texture, region) = Self::resolve_region(resources, sheets, sheet_name, region_name)?;
        self.mark_composed();
        backend.blit(texture, Some(region), Rect::new(x, y, region.w, region.h));
        Ok(())
    }

    /// Draw a named sheet region centered on (x, y).
    pub fn draw_sheet_sprite_centered(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        sheets: &SheetRegistry,
        sheet_name: &str,
        region_name: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let (texture, region) = Self::resolve_region(resources, sheets, sheet_name, region_name)?;
        self.mark_composed();
        let dst = Rect::new(x - region.w / 2, y - region.h / 2, region.w, region.h);
        backend.blit(texture, Some(region), dst);
        Ok(())
    }

    /// Draw a named sheet region centered on (x, y), rotated clockwise.
    pub fn draw_sheet_sprite_centered_rotated(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        sheets: &SheetRegistry,
        sheet_name: &str,
        region_name: &str,
        x: i32,
        y: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let (texture, region) = Self::resolve_region(resources, sheets, sheet_name, region_name)?;
        self.mark_composed();
        let dst = Rect::new(x - region.w / 2, y - region.h / 2, region.w, region.h);
        backend.blit_rotated(texture, Some(region), dst, angle_degrees);
        Ok(())
    }

    /// Draw a named sheet region centered on (x, y), stretched to
    /// `width` x `height` and rotated clockwise.
    pub fn draw_sheet_sprite_centered_scaled(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        sheets: &SheetRegistry,
        sheet_name: &str,
        region_name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let (texture, region) = Self::resolve_region(resources, sheets, sheet_name, region_name)?;
        self.mark_composed();
        let dst = Rect::new(x - width / 2, y - height / 2, width, height);
        backend.blit_rotated(texture, Some(region), dst, angle_degrees);
        Ok(())
    }

    // =========================================================================
    // Text
    // =========================================================================

    fn default_font_name(&self) -> Result<&str, ResourceError> {
        self.default_font
            .as_deref()
            .ok_or(ResourceError::NoDefaultFont)
    }

    /// Draw text with the default font, top-left at (x, y).
    pub fn draw_text(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        cache: &mut TextCache,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let sprite = {
            let font = resources.get_font(self.default_font_name()?)?;
            cache.get_or_render(backend, font, color, text)?
        };
        self.mark_composed();
        let dst = Rect::new(x, y, sprite.width as i32, sprite.height as i32);
        backend.blit(sprite.texture, None, dst);
        Ok(())
    }

    /// Draw text with the default font, centered on (x, y).
    pub fn draw_text_centered(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        cache: &mut TextCache,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let sprite = {
            let font = resources.get_font(self.default_font_name()?)?;
            cache.get_or_render(backend, font, color, text)?
        };
        self.mark_composed();
        let w = sprite.width as i32;
        let h = sprite.height as i32;
        backend.blit(sprite.texture, None, Rect::new(x - w / 2, y - h / 2, w, h));
        Ok(())
    }

    /// Draw text with a named font, top-left at (x, y).
    pub fn draw_text_font(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        cache: &mut TextCache,
        font_name: &str,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let font = resources.get_font(font_name)?;
        let sprite = cache.get_or_render(backend, font, color, text)?;
        self.mark_composed();
        let dst = Rect::new(x, y, sprite.width as i32, sprite.height as i32);
        backend.blit(sprite.texture, None, dst);
        Ok(())
    }

    /// Draw text with a named font, centered on (x, y).
    pub fn draw_text_font_centered(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &ResourceStore,
        cache: &mut TextCache,
        font_name: &str,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let font = resources.get_font(font_name)?;
        let sprite = cache.get_or_render(backend, font, color, text)?;
        self.mark_composed();
        let w = sprite.width as i32;
        let h = sprite.height as i32;
        backend.blit(sprite.texture, None, Rect::new(x - w / 2, y - h / 2, w, h));
        Ok(())
    }

    // =========================================================================
    // Window and display state
    // =========================================================================

    /// Change the integer display scale. Passing the current scale is a
    /// no-op; otherwise the window is resized to fit the scaled target.
    /// The logical resolution never changes.
    pub fn set_scale(&mut self, backend: &mut impl RenderBackend, scale: u32) {
        let scale = scale.max(1);
        if scale == self.scale {
            return;
        }
        self.scale = scale;
        let width = self.logical_width * scale;
        let height = self.logical_height * scale;
        backend.set_window_size(width, height);
        self.window_width = width;
        self.window_height = height;
        log::debug!("display scale set to {scale}x ({width}x{height} window)");
    }

    /// Flip between windowed and fullscreen, then adopt whatever window
    /// size the backend reports.
    pub fn toggle_fullscreen(
        &mut self,
        backend: &mut impl RenderBackend,
        use_desktop_resolution: bool,
    ) {
        self.fullscreen = !self.fullscreen;
        backend.set_fullscreen(self.fullscreen, use_desktop_resolution);
        let (width, height) = backend.window_size();
        self.window_width = width;
        self.window_height = height;
        log::debug!("fullscreen {}", if self.fullscreen { "on" } else { "off" });
    }

    /// Adopt a window size reported by the platform (resize events).
    pub fn handle_window_resize(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Move the window to a screen position.
    pub fn set_window_position(&mut self, backend: &mut impl RenderBackend, x: i32, y: i32) {
        backend.set_window_position(x, y);
    }

    /// Center the window on its monitor.
    pub fn center_window(&mut self, backend: &mut impl RenderBackend) {
        backend.center_window();
    }

    /// Set the window title.
    pub fn set_window_title(&mut self, backend: &mut impl RenderBackend, title: &str) {
        backend.set_window_title(title);
    }

    /// Set the color [`clear`](Self::clear) fills with.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Name the font used by [`draw_text`](Self::draw_text) and
    /// [`draw_text_centered`](Self::draw_text_centered).
    pub fn set_default_font(&mut self, name: impl Into<String>) {
        self.default_font = Some(name.into());
    }

    /// The configured default font name, if any.
    #[must_use]
    pub fn default_font(&self) -> Option<&str> {
        self.default_font.as_deref()
    }

    /// Fixed logical resolution of the offscreen target.
    #[must_use]
    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    /// Current integer display scale.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Cached window client size.
    #[must_use]
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Current fullscreen flag.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, RecordedDraw};

    use tempfile::TempDir;

    fn ready(window_w: u32, window_h: u32) -> (HeadlessBackend, Compositor) {
        let mut backend = HeadlessBackend::with_window_size(window_w, window_h);
        let mut compositor = Compositor::new(320, 180, 3);
        compositor.init(&mut backend).unwrap();
        (backend, compositor)
    }

    fn store_with_image(
        backend: &mut HeadlessBackend,
        name: &str,
        w: u32,
        h: u32,
    ) -> (TempDir, ResourceStore) {
        let dir = TempDir::new().unwrap();
        let file = format!("{name}.png");
        image::RgbaImage::from_pixel(w, h, image::Rgba([200, 60, 60, 255]))
            .save(dir.path().join(&file))
            .unwrap();
        let mut store = ResourceStore::new();
        store.set_base_dir(dir.path());
        store.load_image(backend, name, &file).unwrap();
        (dir, store)
    }

    #[test]
    fn test_letterbox_rect_centers_scaled_target() {
        let (_backend, compositor) = ready(1280, 720);

        // 320x180 at 3x inside 1280x720: (1280 - 960) / 2 = 160,
        // (720 - 540) / 2 = 90.
        assert_eq!(compositor.present_rect(), Rect::new(160, 90, 960, 540));
    }

    #[test]
    fn test_present_rect_is_flush_when_window_fits_exactly() {
        let (_backend, compositor) = ready(960, 540);
        assert_eq!(compositor.present_rect(), Rect::new(0, 0, 960, 540));
    }

    #[test]
    fn test_frame_cycle_emits_calls_in_order() {
        let (mut backend, mut compositor) = ready(1280, 720);

        for _ in 0..2 {
            compositor.clear(&mut backend);
            compositor.fill_rect(&mut backend, Rect::new(1, 2, 3, 4), Color::WHITE);
            compositor.present_scaled(&mut backend);
            compositor.flip(&mut backend);
        }

        let draws = backend.draws();
        assert_eq!(draws.len(), 8);
        assert!(matches!(draws[0], RecordedDraw::Clear(_)));
        assert!(matches!(draws[1], RecordedDraw::FillRect(_, _)));
        assert_eq!(draws[2], RecordedDraw::PresentTarget(Rect::new(160, 90, 960, 540)));
        assert_eq!(draws[3], RecordedDraw::Flip);
    }

    #[test]
    fn test_init_creates_logical_target() {
        let (backend, _compositor) = ready(1280, 720);
        assert_eq!(backend.target_size(), Some((320, 180)));
    }

    #[test]
    fn test_set_scale_with_current_value_skips_resize() {
        let (mut backend, mut compositor) = ready(960, 540);

        compositor.set_scale(&mut backend, 3);
        assert_eq!(backend.resize_calls(), 0);

        compositor.set_scale(&mut backend, 2);
        assert_eq!(backend.resize_calls(), 1);
        assert_eq!(compositor.window_size(), (640, 360));
        assert_eq!(compositor.present_rect(), Rect::new(0, 0, 640, 360));
    }

    #[test]
    fn test_toggle_fullscreen_flips_state_both_ways() {
        let (mut backend, mut compositor) = ready(1280, 720);

        compositor.toggle_fullscreen(&mut backend, true);
        assert!(compositor.is_fullscreen());
        assert!(backend.is_fullscreen());

        compositor.toggle_fullscreen(&mut backend, true);
        assert!(!compositor.is_fullscreen());
        assert!(!backend.is_fullscreen());
    }

    #[test]
    fn test_window_resize_moves_letterbox() {
        let (mut backend, mut compositor) = ready(1280, 720);

        backend.set_window_size(1000, 600);
        compositor.handle_window_resize(1000, 600);
        assert_eq!(compositor.present_rect(), Rect::new(20, 30, 960, 540));
    }

    #[test]
    fn test_draw_sprite_blits_full_image_at_point() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let (_dir, store) = store_with_image(&mut backend, "ship", 12, 7);

        compositor.clear(&mut backend);
        compositor
            .draw_sprite(&mut backend, &store, "ship", 5, 6)
            .unwrap();

        let ship = store.get_image("ship").unwrap();
        assert_eq!(
            backend.draws()[1],
            RecordedDraw::Blit {
                texture: ship.texture,
                src: None,
                dst: Rect::new(5, 6, 12, 7),
                angle_degrees: 0.0,
            }
        );
    }

    #[test]
    fn test_draw_sprite_centered_offsets_by_half_size() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let (_dir, store) = store_with_image(&mut backend, "ship", 12, 7);

        compositor.clear(&mut backend);
        compositor
            .draw_sprite_centered(&mut backend, &store, "ship", 10, 10)
            .unwrap();

        match backend.draws()[1] {
            RecordedDraw::Blit { dst, .. } => assert_eq!(dst, Rect::new(4, 7, 12, 7)),
            ref other => panic!("expected a blit, got {other:?}"),
        }
    }

    #[test]
    fn test_draw_missing_sprite_fails_and_draws_nothing() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let store = ResourceStore::new();

        compositor.clear(&mut backend);
        let result = compositor.draw_sprite(&mut backend, &store, "ghost", 0, 0);

        assert!(matches!(result, Err(ResourceError::NotFound { .. })));
        assert_eq!(backend.draws().len(), 1); // just the clear
    }

    #[test]
    fn test_sheet_draw_uses_region_geometry() {
        let (mut backend, mut compositor) = ready(1280, 720);

        let dir = TempDir::new().unwrap();
        image::RgbaImage::from_pixel(64, 64, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join("atlas.png"))
            .unwrap();
        std::fs::write(dir.path().join("atlas.txt"), "atlas.png 1\n2 jump 0 16 16 32\n").unwrap();

        let mut store = ResourceStore::new();
        store.set_base_dir(dir.path());
        let mut sheets = SheetRegistry::new();
        sheets
            .load_sheet(&mut backend, &mut store, "atlas", "atlas.txt")
            .unwrap();

        compositor.clear(&mut backend);
        compositor
            .draw_sheet_sprite(&mut backend, &store, &sheets, "atlas", "jump", 3, 4)
            .unwrap();
        compositor
            .draw_sheet_sprite_centered_scaled(
                &mut backend,
                &store,
                &sheets,
                "atlas",
                "jump",
                100,
                100,
                64,
                64,
                45.0,
            )
            .unwrap();

        let atlas = store.get_image("atlas.png").unwrap();
        assert_eq!(
            backend.draws()[1],
            RecordedDraw::Blit {
                texture: atlas.texture,
                src: Some(Rect::new(0, 16, 16, 32)),
                dst: Rect::new(3, 4, 16, 32),
                angle_degrees: 0.0,
            }
        );
        assert_eq!(
            backend.draws()[2],
            RecordedDraw::Blit {
                texture: atlas.texture,
                src: Some(Rect::new(0, 16, 16, 32)),
                dst: Rect::new(68, 68, 64, 64),
                angle_degrees: 45.0,
            }
        );
    }

    #[test]
    fn test_draw_text_needs_default_font() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let store = ResourceStore::new();
        let mut cache = TextCache::new();

        compositor.clear(&mut backend);
        let result = compositor.draw_text(&mut backend, &store, &mut cache, 0, 0, Color::WHITE, "hi");
        assert!(matches!(result, Err(ResourceError::NoDefaultFont)));
    }

    #[test]
    fn test_draw_text_caches_across_frames() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let mut store = ResourceStore::new();
        let mut cache = TextCache::new();
        store
            .load_font(&mut backend, "normal", "pixel.ttf", 16)
            .unwrap();
        compositor.set_default_font("normal");

        for _ in 0..2 {
            compositor.clear(&mut backend);
            compositor
                .draw_text(&mut backend, &store, &mut cache, 5, 5, Color::WHITE, "Score: 10")
                .unwrap();
            compositor.present_scaled(&mut backend);
            compositor.flip(&mut backend);
        }

        assert_eq!(backend.rasterize_calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_draw_text_centered_offsets_by_bitmap_size() {
        let (mut backend, mut compositor) = ready(1280, 720);
        let mut store = ResourceStore::new();
        let mut cache = TextCache::new();
        store
            .load_font(&mut backend, "normal", "pixel.ttf", 16)
            .unwrap();

        compositor.clear(&mut backend);
        compositor
            .draw_text_font_centered(
                &mut backend,
                &store,
                &mut cache,
                "normal",
                100,
                50,
                Color::WHITE,
                "hi",
            )
            .unwrap();

        // Headless bitmaps are (chars * pt/2) x pt: 16x16 for "hi" at 16pt.
        match backend.draws()[1] {
            RecordedDraw::Blit { dst, .. } => assert_eq!(dst, Rect::new(92, 42, 16, 16)),
            ref other => panic!("expected a blit, got {other:?}"),
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "draw call outside clear()")]
    fn test_draw_before_clear_panics_in_debug() {
        let (mut backend, mut compositor) = ready(1280, 720);
        compositor.fill_rect(&mut backend, Rect::new(0, 0, 1, 1), Color::WHITE);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "before init()")]
    fn test_clear_before_init_panics_in_debug() {
        let mut backend = HeadlessBackend::new();
        let mut compositor = Compositor::new(320, 180, 3);
        compositor.clear(&mut backend);
    }
}
