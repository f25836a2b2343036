//! Tooltip bubble anchored to an icon
//!
//! The icon toggles a short text bubble. iOS speaks the text shortly after
//! the bubble has finished fading in; Android marks the bubble as an
//! assertive live region instead.

use std::cell::Cell;
use std::fmt;

use reveal_a11y::{
    AccessibilityCoordinator, AnnounceOptions, AriaLive, AriaProperties, AriaRole, Disclosure,
    DisclosureController, DisclosureOptions, DisclosureState, NodeRef,
};
use tracing::debug;

use crate::layers::ZIndex;

/// Accessible label of the toggle icon
pub const ICON_LABEL: &str = "show tooltip icon";

/// Measured position of the tooltip container on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorOffset {
    pub x: f32,
    pub y: f32,
}

/// Tooltip state snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipState {
    pub disclosure: DisclosureState,
    pub anchor_offset: Option<AnchorOffset>,
}

/// Tooltip widget
pub struct Tooltip {
    text: String,
    icon: NodeRef,
    anchor_offset: Cell<Option<AnchorOffset>>,
    disclosure: DisclosureController,
}

impl Tooltip {
    pub fn new(coordinator: &AccessibilityCoordinator, text: impl Into<String>) -> Self {
        let timings = coordinator.widget_timings();
        let text = text.into();
        let options = DisclosureOptions::new("tooltip")
            .animated(coordinator.animation_spec(timings.tooltip_duration_ms))
            .announce_on_open(
                text.clone(),
                AnnounceOptions::interrupt().with_delay(timings.tooltip_announce_delay_ms),
            );
        Self {
            text,
            icon: NodeRef::new(),
            anchor_offset: Cell::new(None),
            disclosure: coordinator.disclosure(options),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn icon_ref(&self) -> &NodeRef {
        &self.icon
    }

    /// Record where the host laid the tooltip out
    pub fn set_anchor_offset(&self, x: f32, y: f32) {
        self.anchor_offset.set(Some(AnchorOffset { x, y }));
    }

    /// Handle a press on the icon
    pub fn press_icon(&self) {
        self.toggle();
    }

    /// Handle a tap anywhere outside the bubble.
    ///
    /// Only dismisses once the bubble is shown and its position is known;
    /// returns whether the tap was consumed.
    pub fn tap_outside(&self) -> bool {
        if !self.is_shown() || self.anchor_offset.get().is_none() {
            return false;
        }
        debug!("tooltip dismissed by outside tap");
        self.disclosure.close();
        true
    }

    pub fn is_shown(&self) -> bool {
        self.disclosure.phase().is_showing()
    }

    pub fn tooltip_state(&self) -> TooltipState {
        TooltipState {
            disclosure: self.disclosure.state(),
            anchor_offset: self.anchor_offset.get(),
        }
    }

    /// Bubble opacity
    pub fn opacity(&self) -> f32 {
        self.disclosure.progress()
    }

    /// The tooltip container always sits above its surroundings
    pub fn z_index(&self) -> ZIndex {
        ZIndex::Max
    }

    pub fn icon_semantics(&self) -> AriaProperties {
        AriaProperties::with_role(AriaRole::Button).with_label(ICON_LABEL)
    }

    /// Semantics of the text bubble
    pub fn bubble_semantics(&self) -> AriaProperties {
        let shown = self.is_shown();
        let live = if shown && self.disclosure.uses_live_region() {
            AriaLive::Assertive
        } else {
            AriaLive::Off
        };
        AriaProperties::with_role(AriaRole::Text)
            .with_label(self.text.clone())
            .with_accessible(shown)
            .with_live(live)
    }
}

impl Disclosure for Tooltip {
    fn state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    fn open(&self) {
        self.disclosure.open();
    }

    fn close(&self) {
        self.disclosure.close();
    }

    fn toggle(&self) {
        if self.is_shown() {
            self.close();
        } else {
            self.open();
        }
    }
}

impl fmt::Debug for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tooltip")
            .field("text", &self.text)
            .field("state", &self.tooltip_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use reveal_a11y::testing::FakePlatform;
    use reveal_a11y::{DisclosurePhase, VirtualScheduler};
    use reveal_config::{PlatformProfile, PlatformTarget};

    use super::*;

    fn setup(target: PlatformTarget) -> (VirtualScheduler, Rc<FakePlatform>, Tooltip, AccessibilityCoordinator) {
        let clock = VirtualScheduler::new();
        let platform = Rc::new(FakePlatform::new(target, clock.clone()));
        let coordinator = AccessibilityCoordinator::new(
            platform.clone(),
            Rc::new(clock.clone()),
            PlatformProfile::for_target(target),
        );
        let tooltip = Tooltip::new(&coordinator, "Your ID is on the back of the card");
        (clock, platform, tooltip, coordinator)
    }

    #[test]
    fn test_ios_announces_text_after_fade_in() {
        let (clock, platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        tooltip.press_icon();
        clock.advance(150);
        assert_eq!(tooltip.state().phase, DisclosurePhase::Opening);
        assert!(platform.spoken().is_empty());

        clock.advance(50);
        assert_eq!(tooltip.state().phase, DisclosurePhase::Open);
        assert_eq!(tooltip.opacity(), 1.0);
        clock.advance(99);
        assert!(platform.spoken().is_empty());

        clock.advance(1);
        assert_eq!(
            platform.speech_calls(),
            vec![("Your ID is on the back of the card".to_string(), false, 300)]
        );
        assert_eq!(tooltip.bubble_semantics().live, AriaLive::Off);
    }

    #[test]
    fn test_close_after_open_drops_pending_announcement() {
        let (clock, platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        tooltip.press_icon();
        clock.advance(250);
        tooltip.press_icon();
        clock.run_until_idle();

        assert!(platform.spoken().is_empty());
        assert_eq!(tooltip.state().phase, DisclosurePhase::Closed);
    }

    #[test]
    fn test_reopen_announces_again() {
        let (clock, platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        tooltip.press_icon();
        clock.run_until_idle();
        tooltip.press_icon();
        clock.run_until_idle();
        tooltip.press_icon();
        clock.run_until_idle();

        assert_eq!(platform.spoken().len(), 2);
    }

    #[test]
    fn test_quick_dismiss_drops_pending_announcement() {
        let (clock, platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        tooltip.press_icon();
        clock.advance(50);
        tooltip.press_icon();
        clock.run_until_idle();

        assert!(platform.spoken().is_empty());
        assert_eq!(tooltip.state().phase, DisclosurePhase::Closed);
    }

    #[test]
    fn test_android_uses_assertive_live_region() {
        let (clock, platform, tooltip, _coordinator) = setup(PlatformTarget::Android);
        assert_eq!(tooltip.bubble_semantics().live, AriaLive::Off);
        assert!(!tooltip.bubble_semantics().accessible);

        tooltip.press_icon();
        clock.run_until_idle();
        let bubble = tooltip.bubble_semantics();
        assert_eq!(bubble.live, AriaLive::Assertive);
        assert!(bubble.accessible);
        assert!(platform.spoken().is_empty());
    }

    #[test]
    fn test_outside_tap_needs_known_offset() {
        let (clock, _platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        assert!(!tooltip.tap_outside());

        tooltip.press_icon();
        clock.run_until_idle();
        assert!(!tooltip.tap_outside());
        assert!(tooltip.is_shown());

        tooltip.set_anchor_offset(120.0, 340.0);
        assert!(tooltip.tap_outside());
        clock.run_until_idle();
        assert_eq!(tooltip.state().phase, DisclosurePhase::Closed);
        assert_eq!(
            tooltip.tooltip_state().anchor_offset,
            Some(AnchorOffset { x: 120.0, y: 340.0 })
        );
    }

    #[test]
    fn test_icon_semantics() {
        let (_clock, _platform, tooltip, _coordinator) = setup(PlatformTarget::Ios);
        assert_eq!(
            tooltip.icon_semantics().screen_reader_description(),
            "show tooltip icon, button"
        );
        assert_eq!(tooltip.z_index(), ZIndex::Max);
    }
}
