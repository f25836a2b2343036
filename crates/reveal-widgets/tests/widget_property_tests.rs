//! Property-based tests for widget stacking and focus
//!
//! For any sequence of presses and elapsed time, a dropdown is raised above
//! its siblings exactly while its disclosure is elevated, and accessibility
//! focus only ever lands on nodes the dropdown owns.

use std::rc::Rc;

use proptest::prelude::*;
use reveal_a11y::testing::FakePlatform;
use reveal_a11y::{AccessibilityCoordinator, Disclosure, DisclosurePhase, NodeId, VirtualScheduler};
use reveal_config::{PlatformProfile, PlatformTarget};
use reveal_widgets::{Dropdown, ZIndex};

#[derive(Debug, Clone)]
enum Input {
    Press,
    Select(usize),
    Wait(u64),
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Press),
        (0usize..4).prop_map(Input::Select),
        (0u64..600).prop_map(Input::Wait),
    ]
}

fn arb_target() -> impl Strategy<Value = PlatformTarget> {
    prop_oneof![Just(PlatformTarget::Ios), Just(PlatformTarget::Android)]
}

proptest! {
    #[test]
    fn prop_dropdown_layer_tracks_elevation(
        inputs in prop::collection::vec(arb_input(), 1..50),
        target in arb_target(),
    ) {
        let clock = VirtualScheduler::new();
        let platform = Rc::new(FakePlatform::new(target, clock.clone()));
        let coordinator = AccessibilityCoordinator::new(
            platform.clone(),
            Rc::new(clock.clone()),
            PlatformProfile::for_target(target),
        );
        let dropdown = Dropdown::new(
            &coordinator,
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        );
        dropdown.trigger_ref().attach(NodeId(1));
        for index in 0..3 {
            if let Some(node) = dropdown.option_ref(index) {
                node.attach(NodeId(10 + index as u64));
            }
        }

        for input in inputs {
            match input {
                Input::Press => dropdown.press_trigger(),
                Input::Select(index) => { let _ = dropdown.select(index); }
                Input::Wait(ms) => { clock.advance(ms); }
            }
            let state = dropdown.state();
            prop_assert_eq!(dropdown.z_index() == ZIndex::Middle, state.elevated);
            prop_assert_eq!(state.phase == DisclosurePhase::Closed, dropdown.z_index() == ZIndex::Min);
        }
        clock.run_until_idle();

        let owned = [NodeId(1), NodeId(10), NodeId(11), NodeId(12)];
        for (node, _) in platform.focus_calls() {
            prop_assert!(owned.contains(&node));
        }
        if let Some((node, _)) = platform.focus_calls().last() {
            let expected = if dropdown.is_open() { NodeId(10) } else { NodeId(1) };
            prop_assert_eq!(*node, expected);
        }
    }
}
