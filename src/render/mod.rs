//! Frame rendering module
//!
//! The compositor that turns store contents into letterboxed frames.

mod compositor;

pub use compositor::Compositor;
