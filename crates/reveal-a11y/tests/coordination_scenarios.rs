//! End-to-end coordination scenarios driven by virtual time

use std::rc::Rc;

use reveal_a11y::testing::FakePlatform;
use reveal_a11y::{
    AccessibilityCoordinator, AnimationSpec, Disclosure, DisclosureController, DisclosureOptions,
    DisclosurePhase, HeadlessPlatform, NodeId, NodeRef, VirtualScheduler,
};
use reveal_config::{PlatformProfile, PlatformTarget};

struct Scenario {
    clock: VirtualScheduler,
    platform: Rc<FakePlatform>,
    coordinator: AccessibilityCoordinator,
}

impl Scenario {
    fn new(target: PlatformTarget) -> Self {
        let clock = VirtualScheduler::new();
        let platform = Rc::new(FakePlatform::new(target, clock.clone()));
        let coordinator = AccessibilityCoordinator::new(
            platform.clone(),
            Rc::new(clock.clone()),
            PlatformProfile::for_target(target),
        );
        Self {
            clock,
            platform,
            coordinator,
        }
    }

    fn menu(&self, first_option: &NodeRef, trigger: &NodeRef) -> DisclosureController {
        let profile = self.coordinator.profile();
        self.coordinator.disclosure(
            DisclosureOptions::new("dropdown")
                .animated(Some(AnimationSpec::new(300)))
                .first_focus(first_option.clone(), profile.open_focus_delay_ms)
                .return_focus(trigger.clone(), profile.return_focus_delay_ms),
        )
    }
}

#[test]
fn test_menu_focuses_first_option_after_reveal() {
    for (target, delay) in [(PlatformTarget::Ios, 0), (PlatformTarget::Android, 500)] {
        let scenario = Scenario::new(target);
        let option_a = NodeRef::mounted(NodeId(11));
        let trigger = NodeRef::mounted(NodeId(1));
        let menu = scenario.menu(&option_a, &trigger);

        menu.open();
        scenario.clock.advance_to(299);
        assert_eq!(menu.state().phase, DisclosurePhase::Opening);

        scenario.clock.advance_to(300);
        assert_eq!(menu.state().phase, DisclosurePhase::Open);
        assert_eq!(menu.has_pending_focus(), delay > 0);

        scenario.clock.run_until_idle();
        assert_eq!(scenario.platform.focus_calls(), vec![(NodeId(11), 300 + delay)]);
    }
}

#[test]
fn test_early_close_never_focuses_withdrawn_content() {
    let scenario = Scenario::new(PlatformTarget::Android);
    let option_a = NodeRef::mounted(NodeId(11));
    let trigger = NodeRef::mounted(NodeId(1));
    let menu = scenario.menu(&option_a, &trigger);

    menu.open();
    scenario.clock.advance(50);
    menu.close();
    scenario.clock.run_until_idle();

    let state = menu.state();
    assert_eq!(state.phase, DisclosurePhase::Closed);
    assert!(!state.elevated);
    assert_eq!(scenario.platform.focus_calls(), vec![(NodeId(1), 450)]);
}

#[test]
fn test_rapid_double_tap_settles_consistently() {
    let scenario = Scenario::new(PlatformTarget::Ios);
    let menu = scenario.menu(&NodeRef::mounted(NodeId(11)), &NodeRef::mounted(NodeId(1)));

    menu.toggle();
    scenario.clock.advance(20);
    menu.toggle();
    scenario.clock.advance(20);
    menu.toggle();
    scenario.clock.run_until_idle();

    assert_eq!(menu.state().phase, DisclosurePhase::Open);
    assert_eq!(menu.state().progress, 1.0);
    assert_eq!(scenario.platform.focus_calls().last(), Some(&(NodeId(11), 340)));
}

#[test]
fn test_reader_activation_reaches_subscribers() {
    let scenario = Scenario::new(PlatformTarget::Ios);
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let log = seen.clone();
    let subscription = scenario
        .coordinator
        .subscribe_reader(move |enabled| log.borrow_mut().push(enabled));

    assert!(!scenario.coordinator.reader_enabled());
    scenario.platform.emit_reader_changed(true);
    assert!(scenario.coordinator.reader_enabled());
    assert_eq!(*seen.borrow(), vec![true]);

    drop(subscription);
    scenario.coordinator.shutdown();
    assert_eq!(scenario.platform.listener_count(), 0);
}

#[test]
fn test_unmounted_content_degrades_gracefully() {
    let scenario = Scenario::new(PlatformTarget::Ios);
    let option_a = NodeRef::new();
    let menu = scenario.menu(&option_a, &NodeRef::mounted(NodeId(1)));

    menu.open();
    scenario.clock.run_until_idle();
    assert_eq!(menu.state().phase, DisclosurePhase::Open);
    assert!(scenario.platform.focus_calls().is_empty());
}

#[test]
fn test_headless_platform_still_animates() {
    let clock = VirtualScheduler::new();
    let coordinator = AccessibilityCoordinator::new(
        Rc::new(HeadlessPlatform::new(PlatformTarget::Ios)),
        Rc::new(clock.clone()),
        PlatformProfile::for_target(PlatformTarget::Ios),
    );
    let menu = coordinator.disclosure(
        DisclosureOptions::new("dropdown")
            .animated(Some(AnimationSpec::new(300)))
            .first_focus(NodeRef::mounted(NodeId(3)), 0)
            .announce_on_open("menu open", Default::default()),
    );

    assert!(!coordinator.reader_enabled());
    menu.open();
    clock.run_until_idle();
    assert_eq!(menu.state().phase, DisclosurePhase::Open);
}
