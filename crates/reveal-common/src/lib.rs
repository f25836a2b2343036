//! Shared utilities for reveal crates
//!
//! Holds the pieces every crate in the workspace reaches for but that carry no
//! accessibility semantics of their own: the `tracing` bootstrap and error
//! chain formatting.

pub mod logging;

pub use logging::{format_error, init, LogLevel, LogOptions};
