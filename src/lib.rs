//! A 2D game engine core built in Rust
//!
//! This engine provides:
//! - Name-keyed image and font ownership with explicit lifecycle
//! - Sprite sheet descriptors with id/name region lookup
//! - Cached text rendering so HUD strings rasterize once
//! - Fixed logical-resolution frames, integer-scaled and letterboxed
//! - Rendering with wgpu behind a swappable backend trait

pub mod backend;
pub mod core;
pub mod render;
pub mod resources;

// Re-exports for convenience
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::backend::{Color, FontStyle, Rect, RenderBackend};
    pub use crate::core::{Engine, EngineConfig, EngineContext, FrameStats, Game, Time};
    pub use crate::render::Compositor;
    pub use crate::resources::{
        ResourceError, ResourceStore, SheetRegistry, Sprite, SpriteSheet, TextCache,
    };
}
