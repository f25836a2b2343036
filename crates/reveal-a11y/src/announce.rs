//! Spoken announcements
//!
//! Two delivery strategies reach the same outcome:
//!
//! - [`AnnouncementStrategy::Programmatic`] (iOS default): messages go through
//!   the platform speech primitive after their delay. An interrupting
//!   message clears everything pending; queued messages keep FIFO order.
//! - [`AnnouncementStrategy::LiveRegion`] (Android default): the widget marks
//!   its region live and the platform speaks changes on its own, so
//!   [`AnnouncementQueue::announce`] does nothing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use reveal_config::AnnouncementStrategy;
use tracing::debug;

use crate::error::A11yError;
use crate::monitor::ReaderProbe;
use crate::platform::AccessibilityPlatform;
use crate::scheduler::{Scheduler, TimerToken};

/// How a single announcement is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnounceOptions {
    /// Append after pending speech instead of interrupting it
    pub queued: bool,
    /// Wait this long before speaking, so the visual change settles first
    pub delay_ms: u64,
}

impl AnnounceOptions {
    pub fn interrupt() -> Self {
        Self::default()
    }

    pub fn queued() -> Self {
        Self {
            queued: true,
            delay_ms: 0,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

#[derive(Debug, Clone)]
struct PendingAnnouncement {
    message: String,
    queued: bool,
    due_ms: u64,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<PendingAnnouncement>,
    timer: Option<TimerToken>,
}

struct QueueShared {
    owner: String,
    strategy: AnnouncementStrategy,
    platform: Rc<dyn AccessibilityPlatform>,
    scheduler: Rc<dyn Scheduler>,
    reader: RefCell<Option<ReaderProbe>>,
    state: RefCell<QueueState>,
}

impl QueueShared {
    /// Schedule the head of the queue if nothing is armed yet
    fn arm(self: &Rc<Self>) {
        let now = self.scheduler.now_ms();
        let delay = {
            let state = self.state.borrow();
            if state.timer.is_some() {
                return;
            }
            match state.pending.front() {
                Some(head) => head.due_ms.saturating_sub(now),
                None => return,
            }
        };

        let weak: Weak<QueueShared> = Rc::downgrade(self);
        let token = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire();
                }
            }),
        );
        self.state.borrow_mut().timer = Some(token);
    }

    fn fire(self: &Rc<Self>) {
        let head = {
            let mut state = self.state.borrow_mut();
            state.timer = None;
            state.pending.pop_front()
        };

        if let Some(entry) = head {
            match self
                .platform
                .speak_announcement(&entry.message, entry.queued)
            {
                Ok(()) => debug!(owner = %self.owner, queued = entry.queued, "announcement spoken"),
                Err(err) => self.dropped(err),
            }
        }

        self.arm();
    }

    fn dropped(&self, reason: impl ToString) {
        let err = A11yError::announcement_dropped(self.owner.as_str(), reason);
        let reader = self.reader.borrow().as_ref().and_then(ReaderProbe::enabled);
        if reader == Some(false) {
            // Nobody is listening, so this is the expected outcome.
            debug!(error = %err, "reader off");
        } else {
            err.log();
        }
    }

    fn clear(&self) -> usize {
        let mut state = self.state.borrow_mut();
        if let Some(token) = state.timer.take() {
            self.scheduler.cancel(token);
        }
        let dropped = state.pending.len();
        state.pending.clear();
        dropped
    }
}

/// Per-owner queue of spoken announcements
pub struct AnnouncementQueue {
    shared: Rc<QueueShared>,
}

impl AnnouncementQueue {
    pub fn new(
        owner: impl Into<String>,
        strategy: AnnouncementStrategy,
        platform: Rc<dyn AccessibilityPlatform>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Rc::new(QueueShared {
                owner: owner.into(),
                strategy,
                platform,
                scheduler,
                reader: RefCell::new(None),
                state: RefCell::new(QueueState::default()),
            }),
        }
    }

    /// Schedule `message` for speech.
    ///
    /// Fire-and-forget: nothing confirms the reader actually spoke it.
    pub fn announce(&self, message: impl Into<String>, options: AnnounceOptions) {
        if self.shared.strategy == AnnouncementStrategy::LiveRegion {
            debug!(owner = %self.shared.owner, "live region strategy, announce skipped");
            return;
        }

        let entry = PendingAnnouncement {
            message: message.into(),
            queued: options.queued,
            due_ms: self.shared.scheduler.now_ms().saturating_add(options.delay_ms),
        };

        if !entry.queued && self.shared.clear() > 0 {
            A11yError::superseded(self.shared.owner.as_str(), "pending announcement").log();
        }

        self.shared.state.borrow_mut().pending.push_back(entry);
        self.shared.arm();
    }

    /// Consult `reader` when deciding how loudly to report dropped speech
    pub fn attach_reader(&self, reader: ReaderProbe) {
        *self.shared.reader.borrow_mut() = Some(reader);
    }

    /// Drop every pending announcement and its timer
    pub fn clear(&self) {
        self.shared.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.shared.state.borrow().pending.len()
    }

    pub fn strategy(&self) -> AnnouncementStrategy {
        self.shared.strategy
    }

    /// Whether widgets using this queue must mark their region live instead
    pub fn uses_live_region(&self) -> bool {
        self.shared.strategy == AnnouncementStrategy::LiveRegion
    }
}

impl Drop for AnnouncementQueue {
    fn drop(&mut self) {
        self.shared.clear();
    }
}

impl fmt::Debug for AnnouncementQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncementQueue")
            .field("owner", &self.shared.owner)
            .field("strategy", &self.shared.strategy)
            .field("pending", &self.pending_len())
            .finish()
    }
}
