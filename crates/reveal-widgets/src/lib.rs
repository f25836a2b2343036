//! Disclosure widgets
//!
//! Each widget composes one [`reveal_a11y::DisclosureController`] with its
//! own labels, stacking and announcement rules:
//!
//! - [`Dropdown`]: option menu; focus moves to the first option on open and
//!   back to the trigger on close
//! - [`Tooltip`]: icon-anchored text bubble
//! - [`Modal`]: dialog whose exit control carries the opening announcement
//! - [`ErrorBanner`]: growing error message region
//!
//! All widgets implement [`reveal_a11y::Disclosure`], so hosts can drive
//! them uniformly.

pub mod dropdown;
pub mod error;
pub mod error_banner;
pub mod layers;
pub mod modal;
pub mod tooltip;

pub use dropdown::{option_label, Dropdown, DropdownState};
pub use error::{Result, WidgetError};
pub use error_banner::{alert_text, ErrorBanner};
pub use layers::ZIndex;
pub use modal::{Modal, ModalState};
pub use tooltip::{AnchorOffset, Tooltip, TooltipState};
