//! Accessibility coordination for animated disclosure widgets
//!
//! The crate tracks whether a screen reader is active, moves accessibility
//! focus with cancellable delays, speaks announcements with interrupt or
//! queue semantics, and drives the open/close state machine that dropdowns,
//! tooltips, modals and error banners are built on.
//!
//! Everything is single-threaded and timer driven. Time comes from an
//! injected [`Scheduler`]: [`VirtualScheduler`] in tests, [`TokioScheduler`]
//! inside a tokio `LocalSet` in applications.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use reveal_a11y::{
//!     AccessibilityCoordinator, Disclosure, DisclosureOptions, DisclosurePhase, NodeId, NodeRef,
//!     VirtualScheduler,
//! };
//! use reveal_a11y::testing::FakePlatform;
//! use reveal_config::{PlatformProfile, PlatformTarget};
//!
//! let clock = VirtualScheduler::new();
//! let platform = Rc::new(FakePlatform::new(PlatformTarget::Ios, clock.clone()));
//! let coordinator = AccessibilityCoordinator::new(
//!     platform.clone(),
//!     Rc::new(clock.clone()),
//!     PlatformProfile::for_target(PlatformTarget::Ios),
//! );
//!
//! let menu = coordinator.disclosure(
//!     DisclosureOptions::new("menu")
//!         .animated(coordinator.animation_spec(300))
//!         .first_focus(NodeRef::mounted(NodeId(2)), 0),
//! );
//! menu.open();
//! clock.advance(300);
//! assert_eq!(menu.state().phase, DisclosurePhase::Open);
//! assert_eq!(platform.focus_calls(), vec![(NodeId(2), 300)]);
//! ```

pub mod announce;
pub mod aria;
pub mod coordinator;
pub mod disclosure;
pub mod error;
pub mod focus;
pub mod monitor;
pub mod platform;
pub mod scheduler;
pub mod testing;

pub use announce::{AnnounceOptions, AnnouncementQueue};
pub use aria::{AriaLive, AriaProperties, AriaRole};
pub use coordinator::AccessibilityCoordinator;
pub use disclosure::{
    AnimationSpec, Disclosure, DisclosureController, DisclosureOptions, DisclosurePhase,
    DisclosureState, OpenAnnouncement, Transition,
};
pub use error::{A11yError, PlatformError};
pub use focus::{FocusCoordinator, FocusToken};
pub use monitor::{ReaderProbe, ReaderSubscription, ScreenReaderMonitor};
pub use platform::{
    AccessibilityPlatform, HeadlessPlatform, NodeId, NodeRef, PlatformListenerId, ReaderListener,
};
pub use scheduler::{Callback, Scheduler, TimerToken, TokioScheduler, VirtualScheduler};
