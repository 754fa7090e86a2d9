//! Engine shell: configuration, game trait, context, and the event loop

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::backend::{Color, Rect, WgpuBackend};
use crate::core::{FrameLog, FrameStats, Time};
use crate::render::Compositor;
use crate::resources::{
    Font, ResourceError, ResourceStore, SheetRegistry, Sprite, SpriteSheet, TextCache,
};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Fixed logical resolution width
    pub logical_width: u32,
    /// Fixed logical resolution height
    pub logical_height: u32,
    /// Integer display scale; the window opens at logical size times this
    pub scale: u32,
    /// Enable VSync
    pub vsync: bool,
    /// Color the offscreen target is cleared to every frame
    pub clear_color: Color,
    /// Directory every relative load path is resolved against
    pub data_dir: String,
    /// Hide the platform cursor over the window
    pub hide_cursor: bool,
    /// Logical name of the font `draw_text` uses, set after loading it
    pub default_font: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("ember2d"),
            logical_width: 320,
            logical_height: 180,
            scale: 3,
            vsync: true,
            clear_color: Color::BLACK,
            data_dir: String::from("data"),
            hide_cursor: true,
            default_font: None,
        }
    }
}

impl EngineConfig {
    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the fixed logical resolution
    pub fn with_logical_size(mut self, width: u32, height: u32) -> Self {
        self.logical_width = width;
        self.logical_height = height;
        self
    }

    /// Set the initial integer display scale
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    /// Enable or disable VSync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the per-frame clear color
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the base data directory
    pub fn with_data_dir(mut self, dir: impl Into<String>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Show or hide the cursor over the window
    pub fn with_cursor_hidden(mut self, hidden: bool) -> Self {
        self.hide_cursor = hidden;
        self
    }

    /// Name the default font (load a font under this name in `init`)
    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = Some(name.into());
        self
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Errors from configuration loading and saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Reading or writing the file failed
    IoError(String),
    /// Parsing the RON content failed
    DeserializeError(String),
    /// Serializing to RON failed
    SerializeError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "config io error: {msg}"),
            Self::DeserializeError(msg) => write!(f, "config parse error: {msg}"),
            Self::SerializeError(msg) => write!(f, "config serialize error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once when the engine starts, after the backend exists
    fn init(&mut self, ctx: &mut EngineContext);

    /// Called every frame for game logic updates
    fn update(&mut self, ctx: &mut EngineContext);

    /// Called every frame to compose the frame
    fn render(&mut self, ctx: &mut EngineContext);

    /// Called when the window is resized
    fn on_resize(&mut self, _ctx: &mut EngineContext, _width: u32, _height: u32) {}

    /// Called when the game is shutting down
    fn shutdown(&mut self, _ctx: &mut EngineContext) {}
}

/// Context passed to game callbacks: the stores, the compositor, timing,
/// and the backend, behind convenience methods that wire them together.
pub struct EngineContext {
    /// Frame timing
    pub time: Time,
    /// Rolling frame statistics
    pub stats: FrameStats,
    /// Per-frame on-screen text overlay
    pub frame_log: FrameLog,
    /// Image and font ownership
    pub resources: ResourceStore,
    /// Sprite sheet metadata
    pub sheets: SheetRegistry,
    /// Rendered-text memoization
    pub text_cache: TextCache,
    /// Frame composition and window state
    pub compositor: Compositor,
    /// Backend (available after initialization)
    backend: Option<WgpuBackend>,
    should_quit: bool,
}

impl EngineContext {
    fn new(config: &EngineConfig) -> Self {
        let mut resources = ResourceStore::new();
        resources.set_base_dir(&config.data_dir);
        let mut compositor =
            Compositor::new(config.logical_width, config.logical_height, config.scale);
        compositor.set_clear_color(config.clear_color);
        if let Some(name) = &config.default_font {
            compositor.set_default_font(name);
        }
        Self {
            time: Time::new(),
            stats: FrameStats::new(),
            frame_log: FrameLog::new(),
            resources,
            sheets: SheetRegistry::new(),
            text_cache: TextCache::new(),
            compositor,
            backend: None,
            should_quit: false,
        }
    }

    /// Get the backend
    pub fn backend(&self) -> &WgpuBackend {
        self.backend.as_ref().expect("Backend not initialized")
    }

    /// Get the backend mutably
    pub fn backend_mut(&mut self) -> &mut WgpuBackend {
        self.backend.as_mut().expect("Backend not initialized")
    }

    /// Check if the backend is available
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if the engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    // =========================================================================
    // Resource loading
    // =========================================================================

    /// Load an image under a logical name (see [`ResourceStore::load_image`])
    pub fn load_image(&mut self, name: &str, path: &str) -> Result<Sprite, ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.load_image(backend, name, path)
    }

    /// Load a white-recolored image variant
    pub fn load_image_white(&mut self, name: &str, path: &str) -> Result<Sprite, ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.load_image_white(backend, name, path)
    }

    /// Look up a loaded image
    pub fn get_image(&self, name: &str) -> Result<Sprite, ResourceError> {
        self.resources.get_image(name)
    }

    /// Release an image
    pub fn remove_image(&mut self, name: &str) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.remove_image(backend, name);
    }

    /// Load a font under a logical name
    pub fn load_font(
        &mut self,
        name: &str,
        path: &str,
        point_size: u16,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.load_font(backend, name, path, point_size)?;
        Ok(())
    }

    /// Look up a loaded font
    pub fn get_font(&self, name: &str) -> Result<&Font, ResourceError> {
        self.resources.get_font(name)
    }

    /// Change a font's style flags (affects future cache entries only)
    pub fn set_font_style(
        &mut self,
        name: &str,
        style: crate::backend::FontStyle,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.set_font_style(backend, name, style)
    }

    /// Change a font's outline width
    pub fn set_font_outline(&mut self, name: &str, width: u32) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.set_font_outline(backend, name, width)
    }

    /// Release a font
    pub fn remove_font(&mut self, name: &str) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.resources.remove_font(backend, name);
    }

    /// Load a sprite sheet from a descriptor file
    pub fn load_sheet(&mut self, name: &str, descriptor_path: &str) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.sheets
            .load_sheet(backend, &mut self.resources, name, descriptor_path)
    }

    /// Derive a white-recolored sheet from a loaded one
    pub fn derive_white_sheet(&mut self, name: &str, source: &str) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.sheets
            .derive_white(backend, &mut self.resources, name, source)
    }

    /// Look up a loaded sheet
    pub fn sheet(&self, name: &str) -> Result<&SpriteSheet, ResourceError> {
        self.sheets.get(name)
    }

    /// Release every image, font, and cached text texture
    pub fn cleanup(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            self.resources.cleanup(backend, &mut self.text_cache);
        }
    }

    // =========================================================================
    // Frame composition
    // =========================================================================

    /// Begin the frame: clear the offscreen target
    pub fn clear(&mut self) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.clear(backend);
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.fill_rect(backend, rect, color);
    }

    /// Draw a one-pixel rectangle outline
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_rect(backend, rect, color);
    }

    /// Draw an image with its top-left at (x, y)
    pub fn draw_sprite(&mut self, name: &str, x: i32, y: i32) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sprite(backend, &self.resources, name, x, y)
    }

    /// Draw an image centered on (x, y)
    pub fn draw_sprite_centered(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sprite_centered(backend, &self.resources, name, x, y)
    }

    /// Draw an image centered on (x, y), rotated clockwise
    pub fn draw_sprite_centered_rotated(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sprite_centered_rotated(backend, &self.resources, name, x, y, angle_degrees)
    }

    /// Draw a region of an image with its top-left at (x, y)
    pub fn draw_sprite_region(
        &mut self,
        name: &str,
        region: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sprite_region(backend, &self.resources, name, region, x, y)
    }

    /// Draw a region of an image centered on (x, y)
    pub fn draw_sprite_region_centered(
        &mut self,
        name: &str,
        region: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sprite_region_centered(backend, &self.resources, name, region, x, y)
    }

    /// Draw a named sheet region with its top-left at (x, y)
    pub fn draw_sheet_sprite(
        &mut self,
        sheet: &str,
        region: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .draw_sheet_sprite(backend, &self.resources, &self.sheets, sheet, region, x, y)
    }

    /// Draw a named sheet region centered on (x, y)
    pub fn draw_sheet_sprite_centered(
        &mut self,
        sheet: &str,
        region: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_sheet_sprite_centered(
            backend,
            &self.resources,
            &self.sheets,
            sheet,
            region,
            x,
            y,
        )
    }

    /// Draw a named sheet region centered on (x, y), rotated clockwise
    pub fn draw_sheet_sprite_centered_rotated(
        &mut self,
        sheet: &str,
        region: &str,
        x: i32,
        y: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_sheet_sprite_centered_rotated(
            backend,
            &self.resources,
            &self.sheets,
            sheet,
            region,
            x,
            y,
            angle_degrees,
        )
    }

    /// Draw a named sheet region centered, stretched, and rotated
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sheet_sprite_centered_scaled(
        &mut self,
        sheet: &str,
        region: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        angle_degrees: f64,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_sheet_sprite_centered_scaled(
            backend,
            &self.resources,
            &self.sheets,
            sheet,
            region,
            x,
            y,
            width,
            height,
            angle_degrees,
        )
    }

    /// Draw text with the default font, top-left at (x, y)
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_text(
            backend,
            &self.resources,
            &mut self.text_cache,
            x,
            y,
            color,
            text,
        )
    }

    /// Draw text with the default font, centered on (x, y)
    pub fn draw_text_centered(
        &mut self,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_text_centered(
            backend,
            &self.resources,
            &mut self.text_cache,
            x,
            y,
            color,
            text,
        )
    }

    /// Draw text with a named font, top-left at (x, y)
    pub fn draw_text_font(
        &mut self,
        font: &str,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_text_font(
            backend,
            &self.resources,
            &mut self.text_cache,
            font,
            x,
            y,
            color,
            text,
        )
    }

    /// Draw text with a named font, centered on (x, y)
    pub fn draw_text_font_centered(
        &mut self,
        font: &str,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), ResourceError> {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.draw_text_font_centered(
            backend,
            &self.resources,
            &mut self.text_cache,
            font,
            x,
            y,
            color,
            text,
        )
    }

    /// Present the offscreen target scaled into the window, drawing the
    /// frame log overlay first if it is enabled
    pub fn present_scaled(&mut self) {
        self.draw_frame_log();
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.present_scaled(backend);
    }

    /// Show the composed frame on the display
    pub fn flip(&mut self) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.flip(backend);
    }

    fn draw_frame_log(&mut self) {
        if !self.frame_log.is_enabled() || self.frame_log.lines().is_empty() {
            return;
        }
        let Some(font_name) = self.compositor.default_font().map(String::from) else {
            return;
        };
        let Ok(font) = self.resources.get_font(&font_name) else {
            return;
        };
        let line_height = i32::from(font.point_size) + 2;
        let (x, y) = self.frame_log.anchor();
        let lines: Vec<String> = self.frame_log.lines().to_vec();
        let backend = self.backend.as_mut().expect("Backend not initialized");
        for (index, line) in lines.iter().enumerate() {
            let result = self.compositor.draw_text(
                backend,
                &self.resources,
                &mut self.text_cache,
                x,
                y + index as i32 * line_height,
                Color::WHITE,
                line,
            );
            if let Err(err) = result {
                log::warn!("frame log line dropped: {err}");
                break;
            }
        }
    }

    // =========================================================================
    // Window and display state
    // =========================================================================

    /// Change the integer display scale (no-op when unchanged)
    pub fn set_scale(&mut self, scale: u32) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.set_scale(backend, scale);
    }

    /// Flip between windowed and fullscreen
    pub fn toggle_fullscreen(&mut self, use_desktop_resolution: bool) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor
            .toggle_fullscreen(backend, use_desktop_resolution);
    }

    /// Set the window title
    pub fn set_window_title(&mut self, title: &str) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.set_window_title(backend, title);
    }

    /// Move the window to a screen position
    pub fn set_window_position(&mut self, x: i32, y: i32) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.set_window_position(backend, x, y);
    }

    /// Center the window on its monitor
    pub fn center_window(&mut self) {
        let backend = self.backend.as_mut().expect("Backend not initialized");
        self.compositor.center_window(backend);
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(&config);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
        }
    }

    /// Run the engine
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        log::info!("Starting engine: {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        Ok(())
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.game.shutdown(&mut self.context);
        self.context.cleanup();
        event_loop.exit();
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(
                self.config.logical_width * self.config.scale,
                self.config.logical_height * self.config.scale,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let mut backend =
            pollster::block_on(WgpuBackend::new(Arc::clone(&window), self.config.vsync));
        backend.set_cursor_visible(!self.config.hide_cursor);

        self.context.backend = Some(backend);
        self.window = Some(window);

        self.context
            .compositor
            .init(self.context.backend.as_mut().expect("Backend just set"))
            .expect("Failed to create offscreen target");

        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            log::info!("Engine initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.shut_down(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    if let Some(backend) = &mut self.context.backend {
                        backend.handle_resize(new_size.width, new_size.height);
                    }
                    self.context
                        .compositor
                        .handle_window_resize(new_size.width, new_size.height);
                    self.game
                        .on_resize(&mut self.context, new_size.width, new_size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                self.context.time.update();
                self.context.stats.record_frame(self.context.time.delta());
                self.context.frame_log.begin_frame();

                self.game.update(&mut self.context);

                if self.context.should_quit() {
                    self.shut_down(event_loop);
                    return;
                }

                self.game.render(&mut self.context);

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_config_builder_chains() {
        let config = EngineConfig::default()
            .with_title("Punch")
            .with_logical_size(320, 180)
            .with_scale(4)
            .with_clear_color(Color::rgb(16, 16, 32))
            .with_data_dir("assets")
            .with_default_font("normal");

        assert_eq!(config.title, "Punch");
        assert_eq!((config.logical_width, config.logical_height), (320, 180));
        assert_eq!(config.scale, 4);
        assert_eq!(config.data_dir, "assets");
        assert_eq!(config.default_font.as_deref(), Some("normal"));
    }

    #[test]
    fn test_config_scale_clamps_to_one() {
        let config = EngineConfig::default().with_scale(0);
        assert_eq!(config.scale, 1);
    }

    #[test]
    fn test_config_ron_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.ron");

        let config = EngineConfig::default()
            .with_title("Saved")
            .with_scale(2)
            .with_vsync(false);
        config.save_ron(&path).unwrap();

        let loaded = EngineConfig::load_ron(&path).unwrap();
        assert_eq!(loaded.title, "Saved");
        assert_eq!(loaded.scale, 2);
        assert!(!loaded.vsync);
        assert_eq!(loaded.clear_color, config.clear_color);
    }

    #[test]
    fn test_config_load_missing_file_fails() {
        let result = EngineConfig::load_ron("no/such/engine.ron");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
