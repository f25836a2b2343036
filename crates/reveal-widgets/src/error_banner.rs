//! Animated error message region
//!
//! Used for form-level errors and for the error line under an input. The
//! region grows in when shown; iOS queues an `Error alert:` announcement
//! once it has grown in, Android relies on a polite live region.

use std::cell::RefCell;
use std::fmt;

use reveal_a11y::{
    AccessibilityCoordinator, AnnounceOptions, AriaLive, AriaProperties, AriaRole, Disclosure,
    DisclosureController, DisclosureOptions, DisclosurePhase, DisclosureState, OpenAnnouncement,
};
use tracing::debug;

/// Error region widget
pub struct ErrorBanner {
    message: RefCell<String>,
    disclosure: DisclosureController,
}

impl ErrorBanner {
    pub fn new(coordinator: &AccessibilityCoordinator) -> Self {
        let timings = coordinator.widget_timings();
        let options = DisclosureOptions::new("error-banner")
            .animated(coordinator.animation_spec(timings.error_duration_ms));
        Self {
            message: RefCell::new(String::new()),
            disclosure: coordinator.disclosure(options),
        }
    }

    /// Show `message`, re-announcing it if it replaced a different one
    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        let changed = *self.message.borrow() != message;
        *self.message.borrow_mut() = message;

        match self.disclosure.phase() {
            DisclosurePhase::Closed | DisclosurePhase::Closing => {
                self.disclosure.set_open_announcement(Some(self.alert()));
                self.disclosure.open();
            }
            DisclosurePhase::Opening if changed => {
                self.disclosure.set_open_announcement(Some(self.alert()));
            }
            DisclosurePhase::Open if changed => {
                debug!("error message changed while visible");
                let alert = self.alert();
                self.disclosure.announce(alert.message, alert.options);
            }
            DisclosurePhase::Opening | DisclosurePhase::Open => {}
        }
    }

    pub fn hide(&self) {
        self.disclosure.close();
    }

    pub fn is_visible(&self) -> bool {
        self.disclosure.phase().is_showing()
    }

    pub fn message(&self) -> String {
        self.message.borrow().clone()
    }

    /// Fraction of the region's full height currently shown
    pub fn growth(&self) -> f32 {
        self.disclosure.progress()
    }

    /// Semantics of the surrounding region
    pub fn region_semantics(&self) -> AriaProperties {
        let live = if self.is_visible() && self.disclosure.uses_live_region() {
            AriaLive::Polite
        } else {
            AriaLive::Off
        };
        AriaProperties::default().with_live(live)
    }

    /// Semantics of the message text
    pub fn text_semantics(&self) -> AriaProperties {
        AriaProperties::with_role(AriaRole::Alert).with_label(self.message())
    }

    fn alert(&self) -> OpenAnnouncement {
        OpenAnnouncement {
            message: alert_text(&self.message.borrow()),
            options: AnnounceOptions::queued(),
        }
    }
}

/// Spoken form of an error message
pub fn alert_text(message: &str) -> String {
    format!("Error alert: {}", message)
}

impl Disclosure for ErrorBanner {
    fn state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    /// Show the current message again
    fn open(&self) {
        let message = self.message();
        self.show(message);
    }

    fn close(&self) {
        self.hide();
    }

    fn toggle(&self) {
        if self.is_visible() {
            self.hide();
        } else {
            self.open();
        }
    }
}

impl fmt::Debug for ErrorBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorBanner")
            .field("message", &self.message())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use reveal_a11y::testing::FakePlatform;
    use reveal_a11y::VirtualScheduler;
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

    #[test]
    fn test_ios_queues_alert_once_grown() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let banner = ErrorBanner::new(&coordinator);

        banner.show("Email is required");
        clock.advance(299);
        assert!(platform.spoken().is_empty());
        clock.advance(1);
        assert_eq!(
            platform.speech_calls(),
            vec![("Error alert: Email is required".to_string(), true, 300)]
        );
        assert_eq!(banner.growth(), 1.0);
    }

    #[test]
    fn test_changed_message_is_announced_again() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let banner = ErrorBanner::new(&coordinator);
        banner.show("Email is required");
        clock.run_until_idle();

        banner.show("Email is required");
        banner.show("Email is invalid");
        clock.run_until_idle();

        assert_eq!(
            platform.spoken(),
            vec![
                "Error alert: Email is required".to_string(),
                "Error alert: Email is invalid".to_string(),
            ]
        );
    }

    #[test]
    fn test_message_change_while_growing_replaces_alert() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let banner = ErrorBanner::new(&coordinator);
        banner.show("first");
        clock.advance(100);
        banner.show("second");
        clock.run_until_idle();

        assert_eq!(platform.spoken(), vec!["Error alert: second".to_string()]);
    }

    #[test]
    fn test_android_marks_polite_live_region() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Android);
        let banner = ErrorBanner::new(&coordinator);
        assert_eq!(banner.region_semantics().live, AriaLive::Off);

        banner.show("Password too short");
        assert_eq!(banner.region_semantics().live, AriaLive::Polite);
        clock.run_until_idle();
        assert!(platform.spoken().is_empty());

        banner.hide();
        assert_eq!(banner.region_semantics().live, AriaLive::Off);
        clock.run_until_idle();
        assert!(!banner.is_visible());
        assert_eq!(
            banner.text_semantics().screen_reader_description(),
            "Password too short, alert"
        );
    }

    #[test]
    fn test_toggle_reshows_last_message() {
        let (clock, platform, coordinator) = setup(PlatformTarget::Ios);
        let banner = ErrorBanner::new(&coordinator);
        banner.show("Required");
        clock.run_until_idle();
        banner.toggle();
        clock.run_until_idle();
        banner.toggle();
        clock.run_until_idle();

        assert!(banner.is_visible());
        assert_eq!(platform.spoken().len(), 2);
    }
}
