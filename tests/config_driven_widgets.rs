//! Configuration files flowing through to widget behaviour

use std::fs;
use std::rc::Rc;

use reveal_a11y::testing::FakePlatform;
use reveal_a11y::{AccessibilityCoordinator, Disclosure, DisclosurePhase, NodeId, VirtualScheduler};
use reveal_config::{AnnouncementStrategy, ConfigLoader, PlatformTarget};
use reveal_widgets::{Dropdown, ErrorBanner};
use tempfile::TempDir;

fn project_with(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".reveal")).unwrap();
    fs::write(dir.path().join(".reveal/a11y.yaml"), config).unwrap();
    dir
}

#[test]
fn test_project_timings_reach_dropdown() {
    let project = project_with(
        "platform: android\nwidgets:\n  dropdown_duration_ms: 150\nfocus:\n  open_delay_ms: 200\n",
    );
    let config = ConfigLoader::default()
        .with_project_root(project.path())
        .load()
        .unwrap();

    let clock = VirtualScheduler::new();
    let platform = Rc::new(FakePlatform::new(PlatformTarget::Android, clock.clone()));
    let coordinator =
        AccessibilityCoordinator::from_config(platform.clone(), Rc::new(clock.clone()), &config);

    let dropdown = Dropdown::new(&coordinator, vec!["A".to_string()]);
    dropdown.trigger_ref().attach(NodeId(1));
    dropdown.option_ref(0).unwrap().attach(NodeId(10));

    dropdown.open();
    clock.advance(150);
    assert_eq!(dropdown.state().phase, DisclosurePhase::Open);
    clock.run_until_idle();
    assert_eq!(platform.focus_calls(), vec![(NodeId(10), 350)]);
}

#[test]
fn test_reduced_motion_and_strategy_override() {
    let project = project_with(
        "platform: android\nanimation:\n  reduce_motion: true\nannouncements:\n  strategy: programmatic\n",
    );
    let config = ConfigLoader::default()
        .with_project_root(project.path())
        .load()
        .unwrap();
    assert_eq!(config.profile().strategy, AnnouncementStrategy::Programmatic);

    let clock = VirtualScheduler::new();
    let platform = Rc::new(FakePlatform::new(PlatformTarget::Android, clock.clone()));
    let coordinator =
        AccessibilityCoordinator::from_config(platform.clone(), Rc::new(clock.clone()), &config);

    let banner = ErrorBanner::new(&coordinator);
    banner.show("Required");
    assert_eq!(banner.state().phase, DisclosurePhase::Open);
    clock.run_until_idle();
    assert_eq!(platform.spoken(), vec!["Error alert: Required".to_string()]);
}
