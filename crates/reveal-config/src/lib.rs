//! Configuration for the accessibility coordination layer
//!
//! Loads [`CoordinationConfig`] from built-in defaults, a user-level file, a
//! project-level file, runtime overrides and environment variables, in that
//! order of increasing priority.

pub mod error;
pub mod loader;
pub mod types;

pub use error::{ConfigError, Result};
pub use loader::{
    load_file, load_from_env, ConfigLoader, ENV_ANIMATIONS, ENV_LOG_LEVEL, ENV_PLATFORM,
    ENV_REDUCE_MOTION,
};
pub use types::{
    AnimationConfig, AnimationLayer, AnnouncementConfig, AnnouncementStrategy, ConfigLayer,
    CoordinationConfig, FocusConfig, FocusLayer, LoggingConfig, LoggingLayer, PlatformProfile,
    PlatformTarget, WidgetTimings, WidgetTimingsLayer,
};
