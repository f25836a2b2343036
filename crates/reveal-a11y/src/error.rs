//! Error taxonomy for the coordination layer
//!
//! None of these errors reach callers. Each is built where it is detected,
//! logged through [`A11yError::log`], and dropped; the widget keeps working
//! without the accessibility enhancement.

use thiserror::Error;
use tracing::{debug, error, warn};

/// Non-fatal coordination failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum A11yError {
    /// A focus target could not be resolved to a live node
    #[error("focus target unavailable for {owner}")]
    TargetUnavailable { owner: String },

    /// The platform speech primitive is missing or refused the message
    #[error("announcement dropped for {owner}: {reason}")]
    AnnouncementDropped { owner: String, reason: String },

    /// A scheduled effect was cancelled by a newer request
    #[error("{what} for {owner} superseded by a newer request")]
    TransitionSuperseded { owner: String, what: &'static str },

    /// Listeners were still registered when their owner was torn down
    #[error("{count} {owner} listener(s) still registered at teardown")]
    SubscriptionLeak { owner: &'static str, count: usize },
}

impl A11yError {
    pub fn target_unavailable(owner: impl Into<String>) -> Self {
        Self::TargetUnavailable {
            owner: owner.into(),
        }
    }

    pub fn announcement_dropped(owner: impl Into<String>, reason: impl ToString) -> Self {
        Self::AnnouncementDropped {
            owner: owner.into(),
            reason: reason.to_string(),
        }
    }

    pub fn superseded(owner: impl Into<String>, what: &'static str) -> Self {
        Self::TransitionSuperseded {
            owner: owner.into(),
            what,
        }
    }

    /// Emit the diagnostic at the level its kind calls for
    pub fn log(&self) {
        match self {
            A11yError::TransitionSuperseded { .. } => debug!(error = %self, "superseded"),
            A11yError::TargetUnavailable { .. } => warn!(error = %self, "focus request dropped"),
            A11yError::AnnouncementDropped { .. } => warn!(error = %self, "announcement dropped"),
            A11yError::SubscriptionLeak { .. } => error!(error = %self, "subscription leak"),
        }
    }
}

/// Failures reported by the host accessibility surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("platform API unavailable: {0}")]
    Unsupported(&'static str),

    #[error("platform call failed: {0}")]
    Failed(String),
}

/// Report listeners that outlived their owner.
///
/// A leak is a contract violation: debug builds panic (unless already
/// unwinding), release builds only log.
pub(crate) fn report_leak(owner: &'static str, count: usize) {
    if count == 0 {
        return;
    }
    let err = A11yError::SubscriptionLeak { owner, count };
    err.log();
    if cfg!(debug_assertions) && !std::thread::panicking() {
        panic!("{}", err);
    }
}
