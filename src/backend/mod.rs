//! Graphics backend abstraction
//!
//! Everything the engine core needs from a graphics stack sits behind the
//! [`RenderBackend`] trait: texture upload, font rasterization, the
//! fixed-resolution offscreen target, draw commands, and window control.
//! Two implementations ship: [`WgpuBackend`] renders for real through
//! winit and wgpu, [`HeadlessBackend`] records calls for tests.

mod gpu;
mod headless;
mod types;

pub use gpu::WgpuBackend;
pub use headless::{HeadlessBackend, RecordedDraw};
pub use types::{Color, FontStyle, Rect};

use std::fmt;
use std::path::Path;

/// Opaque handle to a backend-owned texture.
///
/// Minted by [`RenderBackend::create_texture`] and valid until the matching
/// [`RenderBackend::destroy_texture`]. Plain `Copy` data; whichever store
/// created the texture is responsible for destroying it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) u64);

/// Opaque handle to a backend-owned font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) u64);

/// A rasterized string: tightly packed RGBA8 pixels plus dimensions.
#[derive(Debug, Clone)]
pub struct TextBitmap {
    /// RGBA8 pixel data, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
}

/// Errors surfaced by backend resource operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Texture allocation or upload failed
    Texture(String),
    /// Font loading or rasterization failed
    Font(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture(msg) => write!(f, "texture error: {msg}"),
            Self::Font(msg) => write!(f, "font error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The seam between the engine core and a concrete graphics stack.
///
/// The core drives one frame as: [`clear_target`](Self::clear_target),
/// any number of draw calls, [`present_target`](Self::present_target),
/// then [`flip`](Self::flip). Draw calls between clear and present land on
/// the offscreen target created by [`create_target`](Self::create_target);
/// the present blit letterboxes that target into the window. Resource
/// calls (textures, fonts) may happen at any point outside that sequence.
///
/// Implementations are single-threaded; the engine serializes all calls on
/// the frame-loop thread.
pub trait RenderBackend {
    /// Upload tightly packed RGBA8 pixels as a new texture.
    ///
    /// Fails on zero-sized input or allocation failure.
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureId, BackendError>;

    /// Release a texture. Unknown ids are tolerated (logged in debug).
    fn destroy_texture(&mut self, texture: TextureId);

    /// Load a font file at a point size.
    fn load_font(&mut self, path: &Path, point_size: u16) -> Result<FontId, BackendError>;

    /// Release a font.
    fn destroy_font(&mut self, font: FontId);

    /// Change a font's style flags for subsequent rasterization.
    fn set_font_style(&mut self, font: FontId, style: FontStyle);

    /// Change a font's outline width (in pixels) for subsequent rasterization.
    fn set_font_outline(&mut self, font: FontId, width: u32);

    /// Render a string with a font into an RGBA8 bitmap.
    ///
    /// Empty text yields a 1x1 transparent bitmap rather than a zero-sized
    /// one, so the result can always back a texture.
    fn rasterize_text(
        &mut self,
        font: FontId,
        text: &str,
        color: Color,
    ) -> Result<TextBitmap, BackendError>;

    /// Create (or recreate) the fixed-resolution offscreen render target.
    fn create_target(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Begin a frame on the offscreen target, filling it with `color`.
    fn clear_target(&mut self, color: Color);

    /// Fill a rectangle on the offscreen target.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a one-pixel rectangle outline on the offscreen target.
    fn outline_rect(&mut self, rect: Rect, color: Color);

    /// Blit a texture region (`None` = whole texture) to a destination
    /// rectangle on the offscreen target, stretching if sizes differ.
    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect);

    /// Like [`blit`](Self::blit), rotated by `angle_degrees` clockwise
    /// around the destination rectangle's center.
    fn blit_rotated(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle_degrees: f64,
    );

    /// End offscreen composition and blit the target into the window at
    /// `dst`, clearing the remaining window area to black.
    fn present_target(&mut self, dst: Rect);

    /// Present the composed frame to the display.
    fn flip(&mut self);

    /// Current window client size in pixels.
    fn window_size(&self) -> (u32, u32);

    /// Resize the window client area.
    fn set_window_size(&mut self, width: u32, height: u32);

    /// Move the window to a screen position.
    fn set_window_position(&mut self, x: i32, y: i32);

    /// Center the window on its current monitor.
    fn center_window(&mut self);

    /// Set the window title.
    fn set_window_title(&mut self, title: &str);

    /// Enter or leave fullscreen. `use_desktop_resolution` selects the
    /// desktop-sized borderless mode rather than pinning a monitor.
    fn set_fullscreen(&mut self, enabled: bool, use_desktop_resolution: bool);
}
