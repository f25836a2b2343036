//! Configuration types
//!
//! # Configuration File Format
//!
//! ```yaml
//! platform: android
//! animation:
//!   enabled: true
//!   speed: 1.0
//!   reduce_motion: false
//!   frame_interval_ms: 16
//! focus:
//!   open_delay_ms: 500
//!   return_delay_ms: 400
//! announcements:
//!   strategy: live_region
//! widgets:
//!   dropdown_duration_ms: 300
//! logging:
//!   level: info
//! ```

use std::fmt;
use std::str::FromStr;

use reveal_common::LogLevel;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Host platform family.
///
/// The two families differ in how quickly the accessibility tree is rebuilt
/// after a visual change and in whether programmatic announcements are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTarget {
    /// Fast tree rebuilds, explicit announcements
    Ios,
    /// Slow tree rebuilds, passive live regions
    Android,
}

impl PlatformTarget {
    /// Platform family of the current compile target
    pub fn detect() -> Self {
        if cfg!(target_os = "ios") {
            PlatformTarget::Ios
        } else {
            PlatformTarget::Android
        }
    }

    pub fn is_ios(&self) -> bool {
        matches!(self, PlatformTarget::Ios)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformTarget::Ios => f.write_str("ios"),
            PlatformTarget::Android => f.write_str("android"),
        }
    }
}

impl FromStr for PlatformTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(PlatformTarget::Ios),
            "android" => Ok(PlatformTarget::Android),
            other => Err(ConfigError::Env(format!("unknown platform: {}", other))),
        }
    }
}

/// How spoken announcements reach the assistive reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStrategy {
    /// Push each message to the platform speech primitive
    Programmatic,
    /// Mark the changed region live and let the platform speak it
    LiveRegion,
}

impl AnnouncementStrategy {
    pub fn default_for(target: PlatformTarget) -> Self {
        match target {
            PlatformTarget::Ios => AnnouncementStrategy::Programmatic,
            PlatformTarget::Android => AnnouncementStrategy::LiveRegion,
        }
    }
}

/// Animation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Enable animations
    pub enabled: bool,
    /// Animation speed (0.1 to 4.0, where 1.0 is normal)
    pub speed: f32,
    /// Reduce motion for accessibility
    pub reduce_motion: bool,
    /// Spacing between progress ticks
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 1.0,
            reduce_motion: false,
            frame_interval_ms: 16,
        }
    }
}

impl AnimationConfig {
    /// Effective duration in milliseconds; zero means transitions are instant
    pub fn duration_ms(&self, base_ms: u64) -> u64 {
        if !self.should_animate() {
            return 0;
        }
        ((base_ms as f64) / f64::from(self.speed)).round() as u64
    }

    /// Check if animations should be shown
    pub fn should_animate(&self) -> bool {
        self.enabled && !self.reduce_motion
    }
}

/// Focus transfer delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Delay before focusing revealed content; platform default when unset
    pub open_delay_ms: Option<u64>,
    /// Delay before returning focus to the trigger after a close
    pub return_delay_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: None,
            return_delay_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementConfig {
    /// Delivery strategy; platform default when unset
    pub strategy: Option<AnnouncementStrategy>,
}

/// Base animation and announcement timings per widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTimings {
    pub dropdown_duration_ms: u64,
    pub tooltip_duration_ms: u64,
    pub tooltip_announce_delay_ms: u64,
    pub modal_duration_ms: u64,
    /// How long the modal exit control carries the opening announcement
    pub modal_announcement_duration_ms: u64,
    pub error_duration_ms: u64,
}

impl Default for WidgetTimings {
    fn default() -> Self {
        Self {
            dropdown_duration_ms: 300,
            tooltip_duration_ms: 200,
            tooltip_announce_delay_ms: 100,
            modal_duration_ms: 300,
            modal_announcement_duration_ms: 2000,
            error_duration_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info.as_str().to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Platform override; detected from the compile target when unset
    pub platform: Option<PlatformTarget>,
    pub animation: AnimationConfig,
    pub focus: FocusConfig,
    pub announcements: AnnouncementConfig,
    pub widgets: WidgetTimings,
    pub logging: LoggingConfig,
}

impl CoordinationConfig {
    /// Apply one configuration layer; every value the layer sets wins
    pub fn apply(mut self, layer: ConfigLayer) -> Self {
        if layer.platform.is_some() {
            self.platform = layer.platform;
        }

        let animation = layer.animation;
        if let Some(enabled) = animation.enabled {
            self.animation.enabled = enabled;
        }
        if let Some(speed) = animation.speed {
            self.animation.speed = speed;
        }
        if let Some(reduce_motion) = animation.reduce_motion {
            self.animation.reduce_motion = reduce_motion;
        }
        if let Some(frame_interval_ms) = animation.frame_interval_ms {
            self.animation.frame_interval_ms = frame_interval_ms;
        }

        if layer.focus.open_delay_ms.is_some() {
            self.focus.open_delay_ms = layer.focus.open_delay_ms;
        }
        if let Some(return_delay_ms) = layer.focus.return_delay_ms {
            self.focus.return_delay_ms = return_delay_ms;
        }

        if layer.announcements.strategy.is_some() {
            self.announcements.strategy = layer.announcements.strategy;
        }

        self.widgets = layer.widgets.apply_to(self.widgets);

        if let Some(level) = layer.logging.level {
            self.logging.level = level;
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=4.0).contains(&self.animation.speed) {
            return Err(ConfigError::Validation(format!(
                "animation speed must be between 0.1 and 4.0, got {}",
                self.animation.speed
            )));
        }

        if self.animation.frame_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "animation frame interval must be greater than 0".to_string(),
            ));
        }

        self.log_level()?;
        Ok(())
    }

    /// Platform in effect after applying the override
    pub fn platform(&self) -> PlatformTarget {
        self.platform.unwrap_or_else(PlatformTarget::detect)
    }

    pub fn log_level(&self) -> Result<LogLevel> {
        self.logging
            .level
            .parse()
            .map_err(|e| ConfigError::Validation(format!("{}", e)))
    }

    /// Accessibility timings and strategy for the effective platform
    pub fn profile(&self) -> PlatformProfile {
        let mut profile = PlatformProfile::for_target(self.platform());
        if let Some(delay) = self.focus.open_delay_ms {
            profile.open_focus_delay_ms = delay;
        }
        profile.return_focus_delay_ms = self.focus.return_delay_ms;
        if let Some(strategy) = self.announcements.strategy {
            profile.strategy = strategy;
        }
        profile
    }
}

/// One source in the configuration hierarchy.
///
/// Unlike [`CoordinationConfig`] every field is optional, so a layer only
/// overrides what its source actually sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub platform: Option<PlatformTarget>,
    pub animation: AnimationLayer,
    pub focus: FocusLayer,
    pub announcements: AnnouncementConfig,
    pub widgets: WidgetTimingsLayer,
    pub logging: LoggingLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationLayer {
    pub enabled: Option<bool>,
    pub speed: Option<f32>,
    pub reduce_motion: Option<bool>,
    pub frame_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusLayer {
    pub open_delay_ms: Option<u64>,
    pub return_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTimingsLayer {
    pub dropdown_duration_ms: Option<u64>,
    pub tooltip_duration_ms: Option<u64>,
    pub tooltip_announce_delay_ms: Option<u64>,
    pub modal_duration_ms: Option<u64>,
    pub modal_announcement_duration_ms: Option<u64>,
    pub error_duration_ms: Option<u64>,
}

impl WidgetTimingsLayer {
    fn apply_to(&self, base: WidgetTimings) -> WidgetTimings {
        WidgetTimings {
            dropdown_duration_ms: self.dropdown_duration_ms.unwrap_or(base.dropdown_duration_ms),
            tooltip_duration_ms: self.tooltip_duration_ms.unwrap_or(base.tooltip_duration_ms),
            tooltip_announce_delay_ms: self
                .tooltip_announce_delay_ms
                .unwrap_or(base.tooltip_announce_delay_ms),
            modal_duration_ms: self.modal_duration_ms.unwrap_or(base.modal_duration_ms),
            modal_announcement_duration_ms: self
                .modal_announcement_duration_ms
                .unwrap_or(base.modal_announcement_duration_ms),
            error_duration_ms: self.error_duration_ms.unwrap_or(base.error_duration_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingLayer {
    pub level: Option<String>,
}

/// A layer that sets every value of `config`
impl From<CoordinationConfig> for ConfigLayer {
    fn from(config: CoordinationConfig) -> Self {
        let CoordinationConfig {
            platform,
            animation,
            focus,
            announcements,
            widgets,
            logging,
        } = config;
        Self {
            platform,
            animation: AnimationLayer {
                enabled: Some(animation.enabled),
                speed: Some(animation.speed),
                reduce_motion: Some(animation.reduce_motion),
                frame_interval_ms: Some(animation.frame_interval_ms),
            },
            focus: FocusLayer {
                open_delay_ms: focus.open_delay_ms,
                return_delay_ms: Some(focus.return_delay_ms),
            },
            announcements,
            widgets: WidgetTimingsLayer {
                dropdown_duration_ms: Some(widgets.dropdown_duration_ms),
                tooltip_duration_ms: Some(widgets.tooltip_duration_ms),
                tooltip_announce_delay_ms: Some(widgets.tooltip_announce_delay_ms),
                modal_duration_ms: Some(widgets.modal_duration_ms),
                modal_announcement_duration_ms: Some(widgets.modal_announcement_duration_ms),
                error_duration_ms: Some(widgets.error_duration_ms),
            },
            logging: LoggingLayer {
                level: Some(logging.level),
            },
        }
    }
}

/// Per-platform accessibility behaviour derived from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub target: PlatformTarget,
    pub strategy: AnnouncementStrategy,
    /// Delay before focusing content that just finished revealing
    pub open_focus_delay_ms: u64,
    /// Delay before focus returns to the trigger of a closing disclosure
    pub return_focus_delay_ms: u64,
}

impl PlatformProfile {
    pub fn for_target(target: PlatformTarget) -> Self {
        // Android registers new nodes noticeably later than iOS.
        let open_focus_delay_ms = match target {
            PlatformTarget::Ios => 0,
            PlatformTarget::Android => 500,
        };
        Self {
            target,
            strategy: AnnouncementStrategy::default_for(target),
            open_focus_delay_ms,
            return_focus_delay_ms: FocusConfig::default().return_delay_ms,
        }
    }
}
