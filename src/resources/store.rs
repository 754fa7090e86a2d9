//! Image and font ownership
//!
//! The [`ResourceStore`] maps logical names to backend resources and is the
//! single owner of every texture and font it registers: whatever the store
//! inserts, only the store destroys, exactly once. Load paths are resolved
//! against a base data directory configured before the first load.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::backend::{FontId, FontStyle, Rect, RenderBackend, TextureId};

use super::{ResourceError, ResourceKind, TextCache, recolor_to_white};

/// A loaded image: backend texture handle plus pixel dimensions.
///
/// Plain copyable data. The handle stays valid until the store removes or
/// replaces the entry it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    /// Backend texture handle
    pub texture: TextureId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Sprite {
    /// The whole image as a source rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// A loaded font: backend handle, logical name, and current render
/// attributes. Style and outline participate in text-cache keys, so the
/// values recorded here are the ones that matter for caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    /// Backend font handle
    pub id: FontId,
    /// Logical name the font is registered under
    pub name: String,
    /// Point size it was loaded at
    pub point_size: u16,
    /// Current style flags
    pub style: FontStyle,
    /// Current outline width in pixels
    pub outline: u32,
}

/// Name-keyed owner of images and fonts.
pub struct ResourceStore {
    base_dir: PathBuf,
    images: FxHashMap<String, Sprite>,
    fonts: FxHashMap<String, Font>,
}

impl ResourceStore {
    /// Create an empty store with no base directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::new(),
            images: FxHashMap::default(),
            fonts: FxHashMap::default(),
        }
    }

    /// Set the directory every relative load path is resolved against.
    /// Call once, before the first load.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = dir.into();
    }

    /// The configured base data directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a load path against the base directory.
    #[must_use]
    pub fn data_path(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Decode an image file, upload it, and register it under `name`.
    ///
    /// Re-using a name replaces the entry and releases the previous
    /// texture. On failure the previous entry, if any, is left intact.
    pub fn load_image(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        path: &str,
    ) -> Result<Sprite, ResourceError> {
        let (pixels, width, height) = self.decode_rgba(path)?;
        self.insert_image(backend, name, &pixels, width, height)
    }

    /// Like [`load_image`](Self::load_image), but recolors every visible
    /// pixel to opaque white before upload (see
    /// [`recolor_to_white`](super::recolor_to_white)).
    pub fn load_image_white(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        path: &str,
    ) -> Result<Sprite, ResourceError> {
        let (mut pixels, width, height) = self.decode_rgba(path)?;
        recolor_to_white(&mut pixels);
        self.insert_image(backend, name, &pixels, width, height)
    }

    /// Look up an image by logical name.
    pub fn get_image(&self, name: &str) -> Result<Sprite, ResourceError> {
        self.images
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Image, name))
    }

    /// Release an image and erase its entry. No-op if absent.
    pub fn remove_image(&mut self, backend: &mut impl RenderBackend, name: &str) {
        if let Some(sprite) = self.images.remove(name) {
            backend.destroy_texture(sprite.texture);
            log::debug!("removed image '{name}'");
        }
    }

    /// Load a font file at `point_size` and register it under `name`.
    ///
    /// The font starts with normal style and no outline. Re-using a name
    /// replaces the entry and releases the previous font.
    pub fn load_font(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        path: &str,
        point_size: u16,
    ) -> Result<FontId, ResourceError> {
        let full_path = self.data_path(path);
        let id = backend.load_font(&full_path, point_size).map_err(|err| {
            log::error!("failed to load font '{name}' from {}: {err}", full_path.display());
            ResourceError::from(err)
        })?;
        let font = Font {
            id,
            name: name.to_string(),
            point_size,
            style: FontStyle::NORMAL,
            outline: 0,
        };
        if let Some(previous) = self.fonts.insert(name.to_string(), font) {
            log::debug!("replacing font '{name}'");
            backend.destroy_font(previous.id);
        }
        log::debug!("loaded font '{name}' at {point_size}pt");
        Ok(id)
    }

    /// Look up a font by logical name.
    pub fn get_font(&self, name: &str) -> Result<&Font, ResourceError> {
        self.fonts
            .get(name)
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Font, name))
    }

    /// Change a font's style flags.
    ///
    /// Takes effect for every rasterization after this call; text already
    /// cached under the old style stays cached under the old key.
    pub fn set_font_style(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        style: FontStyle,
    ) -> Result<(), ResourceError> {
        let font = self
            .fonts
            .get_mut(name)
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Font, name))?;
        font.style = style;
        backend.set_font_style(font.id, style);
        Ok(())
    }

    /// Change a font's outline width in pixels.
    pub fn set_font_outline(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        width: u32,
    ) -> Result<(), ResourceError> {
        let font = self
            .fonts
            .get_mut(name)
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Font, name))?;
        font.outline = width;
        backend.set_font_outline(font.id, width);
        Ok(())
    }

    /// Release a font and erase its entry. No-op if absent.
    pub fn remove_font(&mut self, backend: &mut impl RenderBackend, name: &str) {
        if let Some(font) = self.fonts.remove(name) {
            backend.destroy_font(font.id);
            log::debug!("removed font '{name}'");
        }
    }

    /// Release every image and font, then clear the text cache, whose
    /// entries were rendered with the fonts just destroyed. Idempotent.
    pub fn cleanup(&mut self, backend: &mut impl RenderBackend, text_cache: &mut TextCache) {
        let images = self.images.len();
        let fonts = self.fonts.len();
        for (_, sprite) in self.images.drain() {
            backend.destroy_texture(sprite.texture);
        }
        for (_, font) in self.fonts.drain() {
            backend.destroy_font(font.id);
        }
        text_cache.clear(backend);
        if images > 0 || fonts > 0 {
            log::info!("released {images} images and {fonts} fonts");
        }
    }

    /// Number of registered images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Number of registered fonts.
    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    fn decode_rgba(&self, path: &str) -> Result<(Vec<u8>, u32, u32), ResourceError> {
        let full_path = self.data_path(path);
        let bytes = fs::read(&full_path).map_err(|err| {
            log::error!("failed to read image {}: {err}", full_path.display());
            ResourceError::Io(err.to_string())
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|err| {
            log::error!("failed to decode image {}: {err}", full_path.display());
            ResourceError::Decode(err.to_string())
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok((rgba.into_raw(), width, height))
    }

    fn insert_image(
        &mut self,
        backend: &mut impl RenderBackend,
        name: &str,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Sprite, ResourceError> {
        let texture = backend.create_texture(pixels, width, height).map_err(|err| {
            log::error!("failed to upload image '{name}': {err}");
            ResourceError::from(err)
        })?;
        let sprite = Sprite {
            texture,
            width,
            height,
        };
        if let Some(previous) = self.images.insert(name.to_string(), sprite) {
            log::debug!("replacing image '{name}'");
            backend.destroy_texture(previous.texture);
        }
        log::debug!("loaded image '{name}' ({width}x{height})");
        Ok(sprite)
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    use std::io::Write;

    use tempfile::TempDir;

    /// Write a solid-color PNG fixture and return its file name.
    fn write_png(dir: &TempDir, name: &str, w: u32, h: u32, rgba: [u8; 4]) -> String {
        let image = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        image.save(dir.path().join(name)).unwrap();
        name.to_string()
    }

    fn store_in(dir: &TempDir) -> ResourceStore {
        let mut store = ResourceStore::new();
        store.set_base_dir(dir.path());
        store
    }

    #[test]
    fn test_load_and_get_image() {
        let dir = TempDir::new().unwrap();
        let file = write_png(&dir, "hero.png", 12, 7, [255, 0, 0, 255]);
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        let loaded = store.load_image(&mut backend, "hero", &file).unwrap();
        assert_eq!((loaded.width, loaded.height), (12, 7));

        let fetched = store.get_image("hero").unwrap();
        assert_eq!(fetched, loaded);
        assert_eq!(backend.texture_size(fetched.texture), Some((12, 7)));
    }

    #[test]
    fn test_get_image_unknown_name_fails() {
        let store = ResourceStore::new();
        assert!(matches!(
            store.get_image("ghost"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_image_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        let result = store.load_image(&mut backend, "hero", "nope.png");
        assert!(matches!(result, Err(ResourceError::Io(_))));
        assert_eq!(store.image_count(), 0);
    }

    #[test]
    fn test_load_image_garbage_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("bad.png")).unwrap();
        file.write_all(b"not a png at all").unwrap();
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        let result = store.load_image(&mut backend, "bad", "bad.png");
        assert!(matches!(result, Err(ResourceError::Decode(_))));
    }

    #[test]
    fn test_reloading_name_releases_previous_texture() {
        let dir = TempDir::new().unwrap();
        let first = write_png(&dir, "a.png", 4, 4, [1, 2, 3, 255]);
        let second = write_png(&dir, "b.png", 9, 3, [4, 5, 6, 255]);
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        let old = store.load_image(&mut backend, "hero", &first).unwrap();
        let new = store.load_image(&mut backend, "hero", &second).unwrap();

        // The live entry is backed by the second file's pixels.
        let current = store.get_image("hero").unwrap();
        assert_eq!((current.width, current.height), (9, 3));
        assert_eq!(current.texture, new.texture);

        // Exactly the first texture was destroyed, exactly once.
        assert_eq!(backend.destroyed_textures(), &[old.texture]);
        assert_eq!(backend.invalid_destroys(), 0);
        assert_eq!(backend.texture_count(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_entry() {
        let dir = TempDir::new().unwrap();
        let file = write_png(&dir, "a.png", 4, 4, [1, 2, 3, 255]);
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        let original = store.load_image(&mut backend, "hero", &file).unwrap();
        backend.fail_next_texture_creation();
        assert!(store.load_image(&mut backend, "hero", &file).is_err());

        assert_eq!(store.get_image("hero").unwrap(), original);
        assert!(backend.destroyed_textures().is_empty());
    }

    #[test]
    fn test_load_image_white_uploads_recolored_pixels() {
        let dir = TempDir::new().unwrap();
        let file = write_png(&dir, "tinted.png", 2, 1, [120, 40, 200, 255]);
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);

        store.load_image_white(&mut backend, "flash", &file).unwrap();

        let (_, pixels) = backend.last_upload().unwrap();
        assert_eq!(pixels, &[255, 255, 255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_remove_image_is_noop_when_absent() {
        let mut backend = HeadlessBackend::new();
        let mut store = ResourceStore::new();

        store.remove_image(&mut backend, "ghost");
        assert_eq!(backend.invalid_destroys(), 0);
    }

    #[test]
    fn test_base_dir_prefixes_font_paths() {
        let mut backend = HeadlessBackend::new();
        let mut store = ResourceStore::new();
        store.set_base_dir("data");

        let id = store
            .load_font(&mut backend, "normal", "pixel.ttf", 15)
            .unwrap();
        let expected = Path::new("data").join("pixel.ttf");
        assert_eq!(backend.font_path(id), Some(expected.as_path()));
    }

    #[test]
    fn test_font_style_and_outline_update_store_and_backend() {
        let mut backend = HeadlessBackend::new();
        let mut store = ResourceStore::new();
        let id = store
            .load_font(&mut backend, "normal", "pixel.ttf", 15)
            .unwrap();

        store
            .set_font_style(&mut backend, "normal", FontStyle::BOLD | FontStyle::ITALIC)
            .unwrap();
        store.set_font_outline(&mut backend, "normal", 2).unwrap();

        let font = store.get_font("normal").unwrap();
        assert_eq!(font.style, FontStyle::BOLD | FontStyle::ITALIC);
        assert_eq!(font.outline, 2);
        assert_eq!(backend.font_style(id), Some(FontStyle::BOLD | FontStyle::ITALIC));
        assert_eq!(backend.font_outline(id), Some(2));
    }

    #[test]
    fn test_set_style_on_unknown_font_fails() {
        let mut backend = HeadlessBackend::new();
        let mut store = ResourceStore::new();

        let result = store.set_font_style(&mut backend, "ghost", FontStyle::BOLD);
        assert!(matches!(result, Err(ResourceError::NotFound { .. })));
    }

    #[test]
    fn test_load_font_zero_point_size_fails() {
        let mut backend = HeadlessBackend::new();
        let mut store = ResourceStore::new();

        let result = store.load_font(&mut backend, "broken", "pixel.ttf", 0);
        assert!(matches!(result, Err(ResourceError::Backend(_))));
        assert_eq!(store.font_count(), 0);
    }

    #[test]
    fn test_cleanup_releases_everything_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = write_png(&dir, "a.png", 4, 4, [9, 9, 9, 255]);
        let mut backend = HeadlessBackend::new();
        let mut store = store_in(&dir);
        let mut cache = TextCache::new();

        store.load_image(&mut backend, "hero", &file).unwrap();
        store
            .load_font(&mut backend, "normal", "pixel.ttf", 15)
            .unwrap();

        store.cleanup(&mut backend, &mut cache);
        assert_eq!(store.image_count(), 0);
        assert_eq!(store.font_count(), 0);
        assert!(store.get_image("hero").is_err());
        assert!(store.get_font("normal").is_err());
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.font_count(), 0);

        store.cleanup(&mut backend, &mut cache);
        assert_eq!(backend.invalid_destroys(), 0);
    }
}
