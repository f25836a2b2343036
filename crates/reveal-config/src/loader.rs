//! Configuration hierarchy loading
//!
//! Priority order, highest to lowest:
//! 1. Environment variables
//! 2. Runtime overrides
//! 3. Project-level config (`.reveal/a11y.yaml`, `.json` or `.toml`, searched upward)
//! 4. User-level config (`<config_dir>/reveal/a11y.yaml`, `.json` or `.toml`)
//! 5. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::types::{ConfigLayer, CoordinationConfig, PlatformTarget};

pub const ENV_PLATFORM: &str = "REVEAL_PLATFORM";
pub const ENV_REDUCE_MOTION: &str = "REVEAL_REDUCE_MOTION";
pub const ENV_ANIMATIONS: &str = "REVEAL_ANIMATIONS";
pub const ENV_LOG_LEVEL: &str = "REVEAL_LOG_LEVEL";

const PROJECT_DIR: &str = ".reveal";
const FILE_STEM: &str = "a11y";
const EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// Loads [`CoordinationConfig`] through the full hierarchy
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    user_dir: Option<PathBuf>,
    project_root: Option<PathBuf>,
    overrides: Option<ConfigLayer>,
    read_env: bool,
}

impl ConfigLoader {
    /// Loader using the platform config directory and the working directory
    pub fn new() -> Self {
        Self {
            user_dir: dirs::config_dir().map(|dir| dir.join("reveal")),
            project_root: std::env::current_dir().ok(),
            overrides: None,
            read_env: true,
        }
    }

    /// Replace the directory searched for the user-level file
    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    /// Replace the directory the project search starts from
    pub fn with_project_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_root = Some(dir.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigLayer) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Skip environment variable overrides
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Load and validate the layered configuration
    pub fn load(&self) -> Result<CoordinationConfig> {
        let mut config = CoordinationConfig::default();

        if let Some(user) = self.load_user_config()? {
            config = config.apply(user);
        }

        if let Some(project) = self.load_project_config()? {
            config = config.apply(project);
        }

        if let Some(overrides) = &self.overrides {
            config = config.apply(overrides.clone());
        }

        if self.read_env {
            config = config.apply(load_from_env()?);
        }

        config.validate()?;
        debug!(platform = %config.platform(), "configuration loaded");
        Ok(config)
    }

    /// User-level file, if present
    pub fn load_user_config(&self) -> Result<Option<ConfigLayer>> {
        match &self.user_dir {
            Some(dir) => find_in_dir(dir).map(|path| load_file(&path)).transpose(),
            None => Ok(None),
        }
    }

    /// Nearest project-level file walking up from the project root
    pub fn load_project_config(&self) -> Result<Option<ConfigLayer>> {
        let Some(root) = &self.project_root else {
            return Ok(None);
        };

        let mut current = root.clone();
        loop {
            if let Some(path) = find_in_dir(&current.join(PROJECT_DIR)) {
                return load_file(&path).map(Some);
            }
            if !current.pop() {
                return Ok(None);
            }
        }
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", FILE_STEM, ext)))
        .find(|path| path.is_file())
}

/// Parse a single configuration file, choosing the format by extension
pub fn load_file(path: &Path) -> Result<ConfigLayer> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let layer: ConfigLayer = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?
        }
        Some("json") => serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
        Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
        _ => return Err(ConfigError::NotFound(path.display().to_string())),
    };

    debug!(path = %path.display(), "read configuration file");
    Ok(layer)
}

/// Layer holding only the environment variables that are set
pub fn load_from_env() -> Result<ConfigLayer> {
    let mut layer = ConfigLayer::default();

    if let Ok(platform) = std::env::var(ENV_PLATFORM) {
        layer.platform = Some(platform.parse::<PlatformTarget>()?);
    }

    if let Ok(value) = std::env::var(ENV_REDUCE_MOTION) {
        layer.animation.reduce_motion = Some(parse_flag(ENV_REDUCE_MOTION, &value)?);
    }

    if let Ok(value) = std::env::var(ENV_ANIMATIONS) {
        layer.animation.enabled = Some(parse_flag(ENV_ANIMATIONS, &value)?);
    }

    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        layer.logging.level = Some(level);
    }

    Ok(layer)
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => {
            warn!(variable = name, value = other, "unrecognised boolean");
            Err(ConfigError::Env(format!("{} must be a boolean, got {}", name, other)))
        }
    }
}
