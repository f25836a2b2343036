//! Error types for widget operations

use thiserror::Error;

/// Caller mistakes when driving a widget.
///
/// Accessibility failures never show up here; those are logged and absorbed
/// by the coordination layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("option {index} out of range for {count} option(s)")]
    OptionOutOfRange { index: usize, count: usize },

    #[error("cannot select while the menu is closed")]
    MenuClosed,
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
