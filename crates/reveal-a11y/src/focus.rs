//! Accessibility focus transfer
//!
//! A [`FocusCoordinator`] owns at most one pending focus request. A newer
//! request, an explicit cancel, or dropping the coordinator invalidates the
//! pending one, so only the most recent transition ever wins focus.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::error::A11yError;
use crate::platform::{AccessibilityPlatform, NodeRef};
use crate::scheduler::{Scheduler, TimerToken};

/// Handle for a scheduled focus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusToken(TimerToken);

struct FocusShared {
    owner: String,
    platform: Rc<dyn AccessibilityPlatform>,
    scheduler: Rc<dyn Scheduler>,
    pending: RefCell<Option<TimerToken>>,
}

impl FocusShared {
    fn fire(&self, token: TimerToken, target: &NodeRef) {
        {
            let mut pending = self.pending.borrow_mut();
            if *pending == Some(token) {
                *pending = None;
            }
        }

        // The node may have unmounted while the delay ran.
        let Some(node) = self.platform.resolve_node(target) else {
            A11yError::target_unavailable(self.owner.as_str()).log();
            return;
        };

        match self.platform.set_accessibility_focus(node) {
            Ok(()) => debug!(owner = %self.owner, %node, "accessibility focus moved"),
            Err(err) => warn!(owner = %self.owner, %node, error = %err, "focus transfer failed"),
        }
    }

    fn cancel_pending(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(token) => self.scheduler.cancel(token),
            None => false,
        }
    }
}

/// Schedules and cancels focus transfers for one owner
pub struct FocusCoordinator {
    shared: Rc<FocusShared>,
}

impl FocusCoordinator {
    pub fn new(
        owner: impl Into<String>,
        platform: Rc<dyn AccessibilityPlatform>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Rc::new(FocusShared {
                owner: owner.into(),
                platform,
                scheduler,
                pending: RefCell::new(None),
            }),
        }
    }

    /// Move accessibility focus to `target` after `delay_ms`.
    ///
    /// Supersedes any request still pending on this coordinator. Returns
    /// `None` without scheduling anything when `target` is not mounted.
    pub fn request_focus(&self, target: &NodeRef, delay_ms: u64) -> Option<FocusToken> {
        if self.shared.platform.resolve_node(target).is_none() {
            A11yError::target_unavailable(self.shared.owner.as_str()).log();
            return None;
        }

        if self.shared.cancel_pending() {
            A11yError::superseded(self.shared.owner.as_str(), "focus request").log();
        }

        let weak: Weak<FocusShared> = Rc::downgrade(&self.shared);
        let target = target.clone();
        let slot = Rc::new(RefCell::new(None::<TimerToken>));
        let own_token = Rc::clone(&slot);

        let token = self.shared.scheduler.schedule(
            delay_ms,
            Box::new(move || {
                let (Some(shared), Some(token)) = (weak.upgrade(), *own_token.borrow()) else {
                    return;
                };
                shared.fire(token, &target);
            }),
        );
        *slot.borrow_mut() = Some(token);
        *self.shared.pending.borrow_mut() = Some(token);

        debug!(owner = %self.shared.owner, delay_ms, "focus transfer scheduled");
        Some(FocusToken(token))
    }

    /// Cancel `token` if it is still pending; always safe to call
    pub fn cancel(&self, token: FocusToken) -> bool {
        let is_pending = *self.shared.pending.borrow() == Some(token.0);
        is_pending && self.shared.cancel_pending()
    }

    /// Cancel whatever request is pending
    pub fn cancel_pending(&self) -> bool {
        self.shared.cancel_pending()
    }

    pub fn has_pending(&self) -> bool {
        self.shared.pending.borrow().is_some()
    }

    pub fn owner(&self) -> &str {
        &self.shared.owner
    }
}

impl Drop for FocusCoordinator {
    fn drop(&mut self) {
        self.shared.cancel_pending();
    }
}

impl fmt::Debug for FocusCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusCoordinator")
            .field("owner", &self.shared.owner)
            .field("pending", &self.has_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use reveal_config::PlatformTarget;

    use super::*;
    use crate::platform::NodeId;
    use crate::scheduler::VirtualScheduler;
    use crate::testing::FakePlatform;

    fn setup() -> (VirtualScheduler, Rc<FakePlatform>, FocusCoordinator) {
        let clock = VirtualScheduler::new();
        let platform = Rc::new(FakePlatform::new(PlatformTarget::Android, clock.clone()));
        let focus = FocusCoordinator::new("test", platform.clone(), Rc::new(clock.clone()));
        (clock, platform, focus)
    }

    #[test]
    fn test_focus_fires_after_delay() {
        let (clock, platform, focus) = setup();
        let target = NodeRef::mounted(NodeId(1));

        assert!(focus.request_focus(&target, 300).is_some());
        clock.advance(299);
        assert!(platform.focus_calls().is_empty());

        clock.advance(1);
        assert_eq!(platform.focus_calls(), vec![(NodeId(1), 300)]);
        assert!(!focus.has_pending());
    }

    #[test]
    fn test_newer_request_supersedes() {
        let (clock, platform, focus) = setup();
        let a = NodeRef::mounted(NodeId(1));
        let b = NodeRef::mounted(NodeId(2));

        focus.request_focus(&a, 300);
        clock.advance(100);
        focus.request_focus(&b, 300);
        clock.run_until_idle();

        assert_eq!(platform.focus_calls(), vec![(NodeId(2), 400)]);
    }

    #[test]
    fn test_unmounted_target_schedules_nothing() {
        let (clock, platform, focus) = setup();
        assert!(focus.request_focus(&NodeRef::new(), 0).is_none());
        assert_eq!(clock.pending(), 0);
        clock.run_until_idle();
        assert!(platform.focus_calls().is_empty());
    }

    #[test]
    fn test_unavailable_target_keeps_prior_request() {
        let (clock, platform, focus) = setup();
        focus.request_focus(&NodeRef::mounted(NodeId(5)), 50);
        focus.request_focus(&NodeRef::new(), 0);
        clock.run_until_idle();
        assert_eq!(platform.focus_calls(), vec![(NodeId(5), 50)]);
    }

    #[test]
    fn test_target_unmounted_before_firing_is_dropped() {
        let (clock, platform, focus) = setup();
        let target = NodeRef::mounted(NodeId(3));
        focus.request_focus(&target, 500);
        target.detach();
        clock.run_until_idle();
        assert!(platform.focus_calls().is_empty());
    }

    #[test]
    fn test_cancel_is_always_safe() {
        let (clock, platform, focus) = setup();
        let token = focus.request_focus(&NodeRef::mounted(NodeId(1)), 10).unwrap();
        assert!(focus.cancel(token));
        assert!(!focus.cancel(token));
        clock.run_until_idle();
        assert!(platform.focus_calls().is_empty());

        let fired = focus.request_focus(&NodeRef::mounted(NodeId(1)), 0).unwrap();
        clock.run_until_idle();
        assert!(!focus.cancel(fired));
        assert_eq!(platform.focus_calls().len(), 1);
    }

    #[test]
    fn test_stale_token_does_not_cancel_newer_request() {
        let (clock, platform, focus) = setup();
        let old = focus.request_focus(&NodeRef::mounted(NodeId(1)), 10).unwrap();
        focus.request_focus(&NodeRef::mounted(NodeId(2)), 10);
        assert!(!focus.cancel(old));
        clock.run_until_idle();
        assert_eq!(platform.focus_calls(), vec![(NodeId(2), 10)]);
    }

    #[test]
    fn test_drop_cancels_pending() {
        let (clock, platform, focus) = setup();
        focus.request_focus(&NodeRef::mounted(NodeId(1)), 100);
        drop(focus);
        assert_eq!(clock.pending(), 0);
        clock.run_until_idle();
        assert!(platform.focus_calls().is_empty());
    }

    #[test]
    fn test_platform_failure_is_swallowed() {
        let (clock, platform, focus) = setup();
        platform.set_focus_available(false);
        focus.request_focus(&NodeRef::mounted(NodeId(1)), 0);
        clock.run_until_idle();
        assert!(platform.focus_calls().is_empty());
    }
}
