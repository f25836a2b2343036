//! Composition root
//!
//! [`AccessibilityCoordinator`] is built once at application start and passed
//! down to every widget. It owns the process-wide [`ScreenReaderMonitor`] and
//! hands out per-widget focus coordinators, announcement queues and
//! disclosure controllers configured for the running platform.

use std::fmt;
use std::rc::Rc;

use reveal_config::{
    AnimationConfig, CoordinationConfig, PlatformProfile, PlatformTarget, WidgetTimings,
};
use tracing::info;

use crate::announce::{AnnounceOptions, AnnouncementQueue};
use crate::disclosure::{AnimationSpec, DisclosureController, DisclosureOptions};
use crate::focus::{FocusCoordinator, FocusToken};
use crate::monitor::{ReaderSubscription, ScreenReaderMonitor};
use crate::platform::{AccessibilityPlatform, NodeRef};
use crate::scheduler::Scheduler;

const APP_OWNER: &str = "app";

/// Shared accessibility services for one application
pub struct AccessibilityCoordinator {
    platform: Rc<dyn AccessibilityPlatform>,
    scheduler: Rc<dyn Scheduler>,
    profile: PlatformProfile,
    animation: AnimationConfig,
    widgets: WidgetTimings,
    monitor: ScreenReaderMonitor,
    focus: FocusCoordinator,
    announcer: AnnouncementQueue,
}

impl AccessibilityCoordinator {
    /// Coordinator with default animation settings and widget timings
    pub fn new(
        platform: Rc<dyn AccessibilityPlatform>,
        scheduler: Rc<dyn Scheduler>,
        profile: PlatformProfile,
    ) -> Self {
        Self::build(
            platform,
            scheduler,
            profile,
            AnimationConfig::default(),
            WidgetTimings::default(),
        )
    }

    /// Coordinator for a loaded configuration.
    ///
    /// Without an explicit platform override the profile follows the
    /// platform's own target rather than the compile target.
    pub fn from_config(
        platform: Rc<dyn AccessibilityPlatform>,
        scheduler: Rc<dyn Scheduler>,
        config: &CoordinationConfig,
    ) -> Self {
        let mut config = config.clone();
        config.platform.get_or_insert(platform.target());
        let profile = config.profile();
        Self::build(platform, scheduler, profile, config.animation, config.widgets)
    }

    fn build(
        platform: Rc<dyn AccessibilityPlatform>,
        scheduler: Rc<dyn Scheduler>,
        profile: PlatformProfile,
        animation: AnimationConfig,
        widgets: WidgetTimings,
    ) -> Self {
        let monitor = ScreenReaderMonitor::start(Rc::clone(&platform));
        let focus = FocusCoordinator::new(APP_OWNER, Rc::clone(&platform), Rc::clone(&scheduler));
        let announcer = AnnouncementQueue::new(
            APP_OWNER,
            profile.strategy,
            Rc::clone(&platform),
            Rc::clone(&scheduler),
        );
        announcer.attach_reader(monitor.probe());

        info!(
            target_platform = %profile.target,
            strategy = ?profile.strategy,
            open_focus_delay_ms = profile.open_focus_delay_ms,
            reader_enabled = monitor.current(),
            "accessibility coordinator ready"
        );

        Self {
            platform,
            scheduler,
            profile,
            animation,
            widgets,
            monitor,
            focus,
            announcer,
        }
    }

    /// Last known screen reader state
    pub fn reader_enabled(&self) -> bool {
        self.monitor.current()
    }

    pub fn monitor(&self) -> &ScreenReaderMonitor {
        &self.monitor
    }

    pub fn subscribe_reader(&self, callback: impl Fn(bool) + 'static) -> ReaderSubscription {
        self.monitor.subscribe(callback)
    }

    /// Application-level focus request; supersedes the previous one
    pub fn request_focus(&self, target: &NodeRef, delay_ms: u64) -> Option<FocusToken> {
        self.focus.request_focus(target, delay_ms)
    }

    pub fn cancel_focus(&self, token: FocusToken) -> bool {
        self.focus.cancel(token)
    }

    /// Application-level announcement using the platform's strategy
    pub fn announce(&self, message: impl Into<String>, options: AnnounceOptions) {
        self.announcer.announce(message, options);
    }

    /// Independent focus coordinator for one widget
    pub fn focus_coordinator(&self, owner: &str) -> FocusCoordinator {
        FocusCoordinator::new(owner, Rc::clone(&self.platform), Rc::clone(&self.scheduler))
    }

    /// Independent announcement queue for one widget
    pub fn announcement_queue(&self, owner: &str) -> AnnouncementQueue {
        let queue = AnnouncementQueue::new(
            owner,
            self.profile.strategy,
            Rc::clone(&self.platform),
            Rc::clone(&self.scheduler),
        );
        queue.attach_reader(self.monitor.probe());
        queue
    }

    /// Disclosure controller wired to its own focus coordinator and queue
    pub fn disclosure(&self, options: DisclosureOptions) -> DisclosureController {
        let focus = self.focus_coordinator(&options.owner);
        let announcer = self.announcement_queue(&options.owner);
        DisclosureController::new(options, focus, announcer, Rc::clone(&self.scheduler))
    }

    /// Animation for a widget with nominal duration `base_ms`
    pub fn animation_spec(&self, base_ms: u64) -> Option<AnimationSpec> {
        AnimationSpec::from_config(&self.animation, base_ms)
    }

    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    pub fn target(&self) -> PlatformTarget {
        self.profile.target
    }

    pub fn widget_timings(&self) -> WidgetTimings {
        self.widgets
    }

    pub fn animation(&self) -> AnimationConfig {
        self.animation
    }

    pub fn platform(&self) -> Rc<dyn AccessibilityPlatform> {
        Rc::clone(&self.platform)
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        Rc::clone(&self.scheduler)
    }

    /// Cancel application-level work and release the platform listener
    pub fn shutdown(&self) {
        self.focus.cancel_pending();
        self.announcer.clear();
        self.monitor.shutdown();
        info!("accessibility coordinator shut down");
    }
}

impl fmt::Debug for AccessibilityCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessibilityCoordinator")
            .field("profile", &self.profile)
            .field("monitor", &self.monitor)
            .finish()
    }
}
