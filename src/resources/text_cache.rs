//! Rendered-text memoization
//!
//! Rasterizing a string is the most expensive per-call operation the
//! backend offers, and HUD text is mostly the same strings frame after
//! frame. The [`TextCache`] renders each distinct request once and hands
//! back the cached texture on every later frame.
//!
//! # Caching policy
//!
//! The key is a 64-bit digest of (font logical name, text, packed RGBA
//! color, style flags, outline width). Entries are immutable: a hit
//! never re-renders or invalidates. Changing a font's style or outline
//! changes the key, so subsequent draws render fresh entries while the
//! superseded ones stay in the map until [`TextCache::clear`]. Growth is
//! bounded by the distinct text vocabulary ever drawn, which for game HUD
//! and menu text stays small. Digest collisions between distinct tuples
//! are theoretically possible and deliberately not guarded against.

use std::hash::{DefaultHasher, Hash, Hasher};

use rustc_hash::FxHashMap;

use crate::backend::{Color, RenderBackend};

use super::{Font, ResourceError, Sprite};

/// Hash-keyed store of rendered text textures.
///
/// Owns every texture it inserts; [`TextCache::clear`] is the only
/// release path and must run before the fonts the entries were rendered
/// with are destroyed.
pub struct TextCache {
    entries: FxHashMap<u64, Sprite>,
}

impl TextCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    fn cache_key(font: &Font, color: Color, text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        font.name.hash(&mut hasher);
        text.hash(&mut hasher);
        color.packed().hash(&mut hasher);
        font.style.bits().hash(&mut hasher);
        font.outline.hash(&mut hasher);
        hasher.finish()
    }

    /// Return the cached texture for this request, rendering it first if
    /// this is the first time the tuple is drawn.
    pub fn get_or_render(
        &mut self,
        backend: &mut impl RenderBackend,
        font: &Font,
        color: Color,
        text: &str,
    ) -> Result<Sprite, ResourceError> {
        let key = Self::cache_key(font, color, text);
        if let Some(&sprite) = self.entries.get(&key) {
            return Ok(sprite);
        }
        let bitmap = backend.rasterize_text(font.id, text, color)?;
        let texture = backend.create_texture(&bitmap.pixels, bitmap.width, bitmap.height)?;
        let sprite = Sprite {
            texture,
            width: bitmap.width,
            height: bitmap.height,
        };
        self.entries.insert(key, sprite);
        Ok(sprite)
    }

    /// Release every cached texture and empty the map.
    pub fn clear(&mut self, backend: &mut impl RenderBackend) {
        let count = self.entries.len();
        for (_, sprite) in self.entries.drain() {
            backend.destroy_texture(sprite.texture);
        }
        if count > 0 {
            log::debug!("cleared {count} cached text textures");
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FontStyle, HeadlessBackend};

    use std::path::Path;

    fn test_font(backend: &mut HeadlessBackend) -> Font {
        let id = backend.load_font(Path::new("pixel.ttf"), 16).unwrap();
        Font {
            id,
            name: "normal".to_string(),
            point_size: 16,
            style: FontStyle::NORMAL,
            outline: 0,
        }
    }

    #[test]
    fn test_identical_request_renders_once() {
        let mut backend = HeadlessBackend::new();
        let font = test_font(&mut backend);
        let mut cache = TextCache::new();

        let first = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Score: 10")
            .unwrap();
        let second = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Score: 10")
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.rasterize_calls(), 1);
        assert_eq!(backend.created_textures(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_text_and_color_distinguish_entries() {
        let mut backend = HeadlessBackend::new();
        let font = test_font(&mut backend);
        let mut cache = TextCache::new();

        let white = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Score: 10")
            .unwrap();
        let red = cache
            .get_or_render(&mut backend, &font, Color::rgb(255, 0, 0), "Score: 10")
            .unwrap();
        let other = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Score: 11")
            .unwrap();

        assert_ne!(white.texture, red.texture);
        assert_ne!(white.texture, other.texture);
        assert_eq!(backend.rasterize_calls(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_style_change_yields_fresh_entry() {
        let mut backend = HeadlessBackend::new();
        let mut font = test_font(&mut backend);
        let mut cache = TextCache::new();

        let plain = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Pause")
            .unwrap();

        font.style = FontStyle::BOLD;
        let bold = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Pause")
            .unwrap();

        assert_ne!(plain.texture, bold.texture);
        assert_eq!(backend.rasterize_calls(), 2);

        // The plain entry is still served from cache, not re-rendered.
        font.style = FontStyle::NORMAL;
        let again = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "Pause")
            .unwrap();
        assert_eq!(again, plain);
        assert_eq!(backend.rasterize_calls(), 2);
    }

    #[test]
    fn test_empty_string_is_cacheable() {
        let mut backend = HeadlessBackend::new();
        let font = test_font(&mut backend);
        let mut cache = TextCache::new();

        let first = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "")
            .unwrap();
        let second = cache
            .get_or_render(&mut backend, &font, Color::WHITE, "")
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.rasterize_calls(), 1);
        assert!(first.width >= 1 && first.height >= 1);
    }

    #[test]
    fn test_clear_destroys_every_entry() {
        let mut backend = HeadlessBackend::new();
        let font = test_font(&mut backend);
        let mut cache = TextCache::new();

        cache
            .get_or_render(&mut backend, &font, Color::WHITE, "a")
            .unwrap();
        cache
            .get_or_render(&mut backend, &font, Color::WHITE, "b")
            .unwrap();
        assert_eq!(backend.texture_count(), 2);

        cache.clear(&mut backend);
        assert!(cache.is_empty());
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.destroyed_textures().len(), 2);
        assert_eq!(backend.invalid_destroys(), 0);
    }
}
