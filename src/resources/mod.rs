//! Resource ownership and caching
//!
//! The stores that own every backend resource: [`ResourceStore`] for
//! images and fonts, [`SheetRegistry`] for sprite sheet metadata, and
//! [`TextCache`] for rendered text. All lookups are by logical name and
//! fail with an explicit [`ResourceError`] instead of panicking.

mod recolor;
mod sheet;
mod store;
mod text_cache;

pub use recolor::recolor_to_white;
pub use sheet::{SheetRegistry, SpriteRegion, SpriteSheet};
pub use store::{Font, ResourceStore, Sprite};
pub use text_cache::TextCache;

use std::fmt;

use crate::backend::BackendError;

/// What kind of resource a failed lookup was after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An image in the resource store
    Image,
    /// A font in the resource store
    Font,
    /// A sheet in the sheet registry
    Sheet,
    /// A region inside one sheet
    Region,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Image => "image",
            Self::Font => "font",
            Self::Sheet => "sprite sheet",
            Self::Region => "sheet region",
        };
        f.write_str(label)
    }
}

/// Errors from resource loading, lookup, and drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No resource of this kind is registered under this name
    NotFound {
        /// The kind of resource looked up
        kind: ResourceKind,
        /// The key that missed
        name: String,
    },
    /// Text was drawn without a default font configured
    NoDefaultFont,
    /// Reading a file failed
    Io(String),
    /// Decoding an image file failed
    Decode(String),
    /// A sheet descriptor was malformed
    Descriptor(String),
    /// The graphics backend rejected an operation
    Backend(String),
}

impl ResourceError {
    pub(crate) fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, name } => write!(f, "{kind} '{name}' not found"),
            Self::NoDefaultFont => write!(f, "no default font has been set"),
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Descriptor(msg) => write!(f, "sheet descriptor error: {msg}"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<BackendError> for ResourceError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err.to_string())
    }
}
