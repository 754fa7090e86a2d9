//! Core engine module
//!
//! Contains the engine shell, configuration, and frame timing

mod engine;
mod time;

pub use engine::{ConfigError, Engine, EngineConfig, EngineContext, Game};
pub use time::{FrameLog, FrameStats, Time};
