//! Modal dialog with an opening announcement
//!
//! iOS has no reliable way to speak a dialog's purpose as it appears, so the
//! exit control temporarily carries the announcement as its label. Focus
//! lands on the exit control when the fade completes and the reader reads
//! the announcement; once the announcement window has elapsed the control
//! reverts to its normal label. Android marks the whole layout as an
//! assertive live region instead.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use reveal_a11y::{
    AccessibilityCoordinator, AriaLive, AriaProperties, AriaRole, Disclosure,
    DisclosureController, DisclosureOptions, DisclosureState, NodeRef, Scheduler, TimerToken,
};
use tracing::debug;

use crate::layers::ZIndex;

/// Label of the exit control outside the announcement window
pub const EXIT_LABEL: &str = "exit modal: button";

/// Modal state snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalState {
    pub disclosure: DisclosureState,
    /// The announcement window has elapsed since the last show
    pub has_announced_open: bool,
}

type CloseHandler = Box<dyn Fn()>;

/// Modal widget
pub struct Modal {
    reason: Option<String>,
    exit: NodeRef,
    opener: NodeRef,
    announcement_duration_ms: u64,
    has_announced: Rc<Cell<bool>>,
    announce_timer: Cell<Option<TimerToken>>,
    on_close: RefCell<Option<CloseHandler>>,
    scheduler: Rc<dyn Scheduler>,
    disclosure: DisclosureController,
}

impl Modal {
    /// Create a hidden modal
    pub fn new(coordinator: &AccessibilityCoordinator) -> Self {
        let profile = coordinator.profile();
        let timings = coordinator.widget_timings();
        let exit = NodeRef::new();
        let opener = NodeRef::new();
        let options = DisclosureOptions::new("modal")
            .animated(coordinator.animation_spec(timings.modal_duration_ms))
            .first_focus(exit.clone(), profile.open_focus_delay_ms)
            .return_focus(opener.clone(), profile.return_focus_delay_ms);

        Self {
            reason: None,
            exit,
            opener,
            announcement_duration_ms: timings.modal_announcement_duration_ms,
            has_announced: Rc::new(Cell::new(false)),
            announce_timer: Cell::new(None),
            on_close: RefCell::new(None),
            scheduler: coordinator.scheduler(),
            disclosure: coordinator.disclosure(options),
        }
    }

    /// Explain why the modal opened
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Override how long the exit control carries the announcement
    pub fn with_announcement_duration(mut self, duration_ms: u64) -> Self {
        self.announcement_duration_ms = duration_ms;
        self
    }

    /// Call `handler` when the exit control is pressed
    pub fn on_close(&self, handler: impl Fn() + 'static) {
        *self.on_close.borrow_mut() = Some(Box::new(handler));
    }

    /// Reference the host attaches to the exit control
    pub fn exit_ref(&self) -> &NodeRef {
        &self.exit
    }

    /// Reference to the control that opened the modal
    pub fn opener_ref(&self) -> &NodeRef {
        &self.opener
    }

    /// Make the modal visible
    pub fn show(&self) {
        if self.is_visible() {
            return;
        }
        self.disclosure.open();
        if !self.disclosure.uses_live_region() {
            self.start_announcement_window();
        }
    }

    /// Hide the modal and reset the announcement window
    pub fn hide(&self) {
        self.reset_announcement_window();
        self.disclosure.close();
    }

    /// Handle a press on the exit control
    pub fn press_exit(&self) {
        if let Some(handler) = self.on_close.borrow().as_ref() {
            handler();
        }
        self.hide();
    }

    pub fn is_visible(&self) -> bool {
        self.disclosure.phase().is_showing()
    }

    pub fn has_announced_open(&self) -> bool {
        self.has_announced.get()
    }

    pub fn modal_state(&self) -> ModalState {
        ModalState {
            disclosure: self.disclosure.state(),
            has_announced_open: self.has_announced.get(),
        }
    }

    /// Text spoken as the modal appears
    pub fn announcement(&self) -> String {
        match &self.reason {
            Some(reason) => format!("Modal has opened. Reason: {}", reason),
            None => "Modal has opened.".to_string(),
        }
    }

    /// Current label of the exit control
    pub fn exit_label(&self) -> String {
        if self.has_announced.get() || self.disclosure.uses_live_region() {
            EXIT_LABEL.to_string()
        } else {
            self.announcement()
        }
    }

    /// Semantics of the full-screen layout
    pub fn layout_semantics(&self) -> AriaProperties {
        let live = if self.disclosure.uses_live_region() {
            AriaLive::Assertive
        } else {
            AriaLive::Off
        };
        AriaProperties::with_role(AriaRole::Dialog)
            .with_label(self.announcement())
            .with_modal(self.is_visible())
            .with_accessible(false)
            .with_live(live)
    }

    pub fn exit_semantics(&self) -> AriaProperties {
        AriaProperties::with_role(AriaRole::None).with_label(self.exit_label())
    }

    /// Layer of the exit control inside the modal content
    pub fn exit_z_index(&self) -> ZIndex {
        ZIndex::Middle
    }

    fn start_announcement_window(&self) {
        self.reset_announcement_window();
        let flag = Rc::clone(&self.has_announced);
        let token = self.scheduler.schedule(
            self.announcement_duration_ms,
            Box::new(move || {
                flag.set(true);
                debug!("modal announcement window elapsed");
            }),
        );
        self.announce_timer.set(Some(token));
    }

    fn reset_announcement_window(&self) {
        if let Some(token) = self.announce_timer.take() {
            self.scheduler.cancel(token);
        }
        self.has_announced.set(false);
    }
}

impl Disclosure for Modal {
    fn state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    fn open(&self) {
        self.show();
    }

    fn close(&self) {
        self.hide();
    }

    fn toggle(&self) {
        if self.is_visible() {
            self.hide();
        } else {
            self.show();
        }
    }
}

impl Drop for Modal {
    fn drop(&mut self) {
        if let Some(token) = self.announce_timer.take() {
            self.scheduler.cancel(token);
        }
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("reason", &self.reason)
            .field("state", &self.modal_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use reveal_a11y::testing::FakePlatform;
    use reveal_a11y::{DisclosurePhase, NodeId, VirtualScheduler};
    use reveal_config::{PlatformProfile, PlatformTarget};

    use super::*;

    fn setup(target: PlatformTarget) -> (VirtualScheduler, Rc<FakePlatform>, AccessibilityCoordinator) {
        let clock = VirtualScheduler::new();
        let platform = Rc::new(FakePlatform::new(target, clock.clone()));
        let coordinator = AccessibilityCoordinator::new(
            platform.clone(),
            Rc::new(clock.clone()),
            PlatformProfile::for_target(target),
        );
        (clock, platform, coordinator)
    }

    fn mounted(coordinator: &AccessibilityCoordinator) -> Modal {
        let modal = Modal::new(coordinator).with_reason("Form submitted");
        modal.exit_ref().attach(NodeId(50));
        modal.opener_ref().attach(NodeId(5));
        modal
    }

    #[test]
    fn test_ios_exit_label_carries_announcement() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let modal = mounted(&coordinator);
        assert_eq!(modal.exit_label(), "Modal has opened. Reason: Form submitted");

        modal.show();
        clock.advance(300);
        assert_eq!(modal.state().phase, DisclosurePhase::Open);
        assert_eq!(platform.focus_calls(), vec![(NodeId(50), 300)]);
        assert_eq!(
            modal.exit_semantics().screen_reader_description(),
            "Modal has opened. Reason: Form submitted"
        );

        clock.advance(1699);
        assert!(!modal.has_announced_open());
        clock.advance(1);
        assert!(modal.modal_state().has_announced_open);
        assert_eq!(modal.exit_label(), EXIT_LABEL);
    }

    #[test]
    fn test_hide_resets_announcement_window() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let modal = mounted(&coordinator);
        let closed = Rc::new(Cell::new(false));
        let flag = closed.clone();
        modal.on_close(move || flag.set(true));

        modal.show();
        clock.run_until_idle();
        assert!(modal.has_announced_open());
        platform.clear_calls();

        modal.press_exit();
        assert!(closed.get());
        assert!(!modal.has_announced_open());
        clock.run_until_idle();
        assert_eq!(modal.state().phase, DisclosurePhase::Closed);
        assert_eq!(platform.focus_calls(), vec![(NodeId(5), 2400)]);

        modal.show();
        assert_eq!(modal.exit_label(), "Modal has opened. Reason: Form submitted");
    }

    #[test]
    fn test_hide_before_window_cancels_timer() {
        let (clock, _platform, coordinator) = setup(PlatformTarget::Ios);
        let modal = mounted(&coordinator);
        modal.show();
        clock.advance(500);
        modal.hide();
        clock.run_until_idle();
        assert!(!modal.has_announced_open());
    }

    #[test]
    fn test_android_uses_live_region_layout() {
        let (clock, _platform, coordinator) = setup(PlatformTarget::Android);
        let modal = Modal::new(&coordinator);
        modal.show();
        assert_eq!(modal.exit_label(), EXIT_LABEL);
        assert_eq!(modal.layout_semantics().live, AriaLive::Assertive);
        assert_eq!(modal.layout_semantics().label.as_deref(), Some("Modal has opened."));
        assert!(modal.layout_semantics().modal);

        clock.run_until_idle();
        assert!(!modal.has_announced_open());
    }

    #[test]
    fn test_drop_cancels_announcement_timer() {
        let (clock, _platform, coordinator) = setup(PlatformTarget::Ios);
        let modal = mounted(&coordinator);
        modal.show();
        drop(modal);
        assert_eq!(clock.pending(), 0);
    }
}
