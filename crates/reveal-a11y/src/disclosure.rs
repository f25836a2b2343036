//! Animated disclosure state machine
//!
//! Every reveal-style widget drives one [`DisclosureController`]:
//!
//! ```text
//! Closed --open()--> Opening --complete--> Open --close()--> Closing --complete--> Closed
//!                       ^                                       |
//!                       +------- open() / close() reversal -----+
//! ```
//!
//! The `Opening -> Open` completion is the only place focus moves into the
//! revealed content and the only place an opening announcement is issued.
//! Without an animation the controller jumps straight between `Closed` and
//! `Open` and fires the same side effects immediately.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use reveal_config::AnimationConfig;
use tracing::debug;

use crate::announce::{AnnounceOptions, AnnouncementQueue};
use crate::error::A11yError;
use crate::focus::FocusCoordinator;
use crate::platform::NodeRef;
use crate::scheduler::{Scheduler, TimerToken};

/// Logical phase of a disclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisclosurePhase {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DisclosurePhase {
    /// `Opening` or `Closing`
    pub fn is_transient(&self) -> bool {
        matches!(self, DisclosurePhase::Opening | DisclosurePhase::Closing)
    }

    /// Whether the latest request was to show the content
    pub fn is_showing(&self) -> bool {
        matches!(self, DisclosurePhase::Opening | DisclosurePhase::Open)
    }
}

impl fmt::Display for DisclosurePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisclosurePhase::Closed => "closed",
            DisclosurePhase::Opening => "opening",
            DisclosurePhase::Open => "open",
            DisclosurePhase::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Snapshot of a disclosure's visual and logical state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisclosureState {
    pub phase: DisclosurePhase,
    /// Animation progress, 0.0 fully hidden to 1.0 fully revealed
    pub progress: f32,
    /// Raised above sibling stacking order
    pub elevated: bool,
}

impl Default for DisclosureState {
    fn default() -> Self {
        Self {
            phase: DisclosurePhase::Closed,
            progress: 0.0,
            elevated: false,
        }
    }
}

/// One observed phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DisclosurePhase,
    pub to: DisclosurePhase,
    pub at_ms: u64,
}

/// Fixed-duration progress animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub duration_ms: u64,
    pub frame_interval_ms: u64,
}

impl AnimationSpec {
    pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            frame_interval_ms: Self::DEFAULT_FRAME_INTERVAL_MS,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms.max(1);
        self
    }

    /// Animation for a widget whose nominal duration is `base_ms`; `None`
    /// when configuration asks for instant transitions
    pub fn from_config(config: &AnimationConfig, base_ms: u64) -> Option<Self> {
        let duration_ms = config.duration_ms(base_ms);
        (duration_ms > 0)
            .then(|| Self::new(duration_ms).with_frame_interval(config.frame_interval_ms))
    }
}

/// Message spoken when the disclosure finishes opening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAnnouncement {
    pub message: String,
    pub options: AnnounceOptions,
}

/// Per-widget wiring of a [`DisclosureController`]
#[derive(Debug, Clone, Default)]
pub struct DisclosureOptions {
    pub owner: String,
    /// `None` makes every transition instant
    pub animation: Option<AnimationSpec>,
    /// Focused once the content has finished opening
    pub first_focus: Option<NodeRef>,
    /// Focused again when the content starts closing
    pub return_focus: Option<NodeRef>,
    pub open_focus_delay_ms: u64,
    pub return_focus_delay_ms: u64,
    pub open_announcement: Option<OpenAnnouncement>,
}

impl DisclosureOptions {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn animated(mut self, animation: Option<AnimationSpec>) -> Self {
        self.animation = animation;
        self
    }

    pub fn first_focus(mut self, target: NodeRef, delay_ms: u64) -> Self {
        self.first_focus = Some(target);
        self.open_focus_delay_ms = delay_ms;
        self
    }

    pub fn return_focus(mut self, target: NodeRef, delay_ms: u64) -> Self {
        self.return_focus = Some(target);
        self.return_focus_delay_ms = delay_ms;
        self
    }

    pub fn announce_on_open(mut self, message: impl Into<String>, options: AnnounceOptions) -> Self {
        self.open_announcement = Some(OpenAnnouncement {
            message: message.into(),
            options,
        });
        self
    }
}

/// Uniform handle every disclosure widget exposes
pub trait Disclosure {
    fn state(&self) -> DisclosureState;
    fn open(&self);
    fn close(&self);
    fn toggle(&self);
}

#[derive(Debug, Clone, Copy)]
struct AnimationRun {
    from: f32,
    to: f32,
    started_ms: u64,
    token: TimerToken,
}

struct DisclosureInner {
    phase: DisclosurePhase,
    progress: f32,
    elevated: bool,
    run: Option<AnimationRun>,
    options: DisclosureOptions,
    focus: FocusCoordinator,
    announcer: AnnouncementQueue,
}

impl DisclosureInner {
    fn set_phase(&mut self, to: DisclosurePhase, at_ms: u64, transitions: &mut Vec<Transition>) {
        let from = self.phase;
        self.phase = to;
        debug!(owner = %self.options.owner, %from, %to, at_ms, "disclosure transition");
        transitions.push(Transition { from, to, at_ms });
    }

    fn on_opened(&mut self) {
        if let Some(target) = self.options.first_focus.clone() {
            self.focus
                .request_focus(&target, self.options.open_focus_delay_ms);
        }
        if let Some(announcement) = self.options.open_announcement.clone() {
            self.announcer
                .announce(announcement.message, announcement.options);
        }
    }

    fn request_return_focus(&mut self) {
        if let Some(target) = self.options.return_focus.clone() {
            self.focus
                .request_focus(&target, self.options.return_focus_delay_ms);
        }
    }

    fn settle_closed(&mut self, at_ms: u64, transitions: &mut Vec<Transition>) {
        self.progress = 0.0;
        self.set_phase(DisclosurePhase::Closed, at_ms, transitions);
        self.elevated = false;
    }

    fn settle_open(&mut self, at_ms: u64, transitions: &mut Vec<Transition>) {
        self.progress = 1.0;
        self.set_phase(DisclosurePhase::Open, at_ms, transitions);
        self.on_opened();
    }
}

type Observer = Box<dyn FnMut(&Transition)>;

struct DisclosureShared {
    scheduler: Rc<dyn Scheduler>,
    inner: RefCell<DisclosureInner>,
    observers: RefCell<Vec<Observer>>,
    undelivered: RefCell<VecDeque<Transition>>,
    notifying: Cell<bool>,
}

impl DisclosureShared {
    fn open(self: &Rc<Self>) {
        let mut transitions = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let now = self.scheduler.now_ms();
            match inner.phase {
                DisclosurePhase::Closed => {
                    if inner.focus.cancel_pending() {
                        A11yError::superseded(inner.options.owner.as_str(), "return focus").log();
                    }
                    inner.elevated = true;
                    if inner.options.animation.is_some() {
                        inner.set_phase(DisclosurePhase::Opening, now, &mut transitions);
                        self.start_run(&mut inner, 1.0, now);
                    } else {
                        inner.settle_open(now, &mut transitions);
                    }
                }
                DisclosurePhase::Closing => {
                    self.cancel_run(&mut inner, "collapse animation");
                    if inner.focus.cancel_pending() {
                        A11yError::superseded(inner.options.owner.as_str(), "return focus").log();
                    }
                    inner.set_phase(DisclosurePhase::Opening, now, &mut transitions);
                    self.start_run(&mut inner, 1.0, now);
                }
                DisclosurePhase::Opening | DisclosurePhase::Open => {
                    debug!(owner = %inner.options.owner, "already open");
                }
            }
        }
        self.notify(&transitions);
    }

    fn close(self: &Rc<Self>) {
        let mut transitions = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let now = self.scheduler.now_ms();
            match inner.phase {
                DisclosurePhase::Open => {
                    inner.announcer.clear();
                    inner.request_return_focus();
                    if inner.options.animation.is_some() {
                        inner.set_phase(DisclosurePhase::Closing, now, &mut transitions);
                        self.start_run(&mut inner, 0.0, now);
                    } else {
                        inner.settle_closed(now, &mut transitions);
                    }
                }
                DisclosurePhase::Opening => {
                    // The Opening -> Open focus request must never be issued.
                    self.cancel_run(&mut inner, "reveal animation");
                    inner.focus.cancel_pending();
                    inner.announcer.clear();
                    inner.set_phase(DisclosurePhase::Closing, now, &mut transitions);
                    inner.request_return_focus();
                    self.start_run(&mut inner, 0.0, now);
                }
                DisclosurePhase::Closing | DisclosurePhase::Closed => {
                    debug!(owner = %inner.options.owner, "already closed");
                }
            }
        }
        self.notify(&transitions);
    }

    fn tick(self: &Rc<Self>) {
        let mut transitions = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let (Some(run), Some(spec)) = (inner.run, inner.options.animation) else {
                return;
            };

            let now = self.scheduler.now_ms();
            let elapsed = now.saturating_sub(run.started_ms);
            let fraction = if spec.duration_ms == 0 {
                1.0
            } else {
                (elapsed as f32 / spec.duration_ms as f32).min(1.0)
            };
            inner.progress = (run.from + (run.to - run.from) * fraction).clamp(0.0, 1.0);

            if elapsed >= spec.duration_ms {
                inner.run = None;
                if run.to >= 1.0 {
                    inner.settle_open(now, &mut transitions);
                } else {
                    inner.settle_closed(now, &mut transitions);
                }
            } else {
                let remaining = spec.duration_ms - elapsed;
                let token = self.schedule_tick(spec.frame_interval_ms.min(remaining));
                inner.run = Some(AnimationRun { token, ..run });
            }
        }
        self.notify(&transitions);
    }

    /// Animate from the current progress to `to` over the full duration
    fn start_run(self: &Rc<Self>, inner: &mut DisclosureInner, to: f32, now: u64) {
        let Some(spec) = inner.options.animation else {
            return;
        };
        let token = self.schedule_tick(spec.frame_interval_ms.min(spec.duration_ms));
        inner.run = Some(AnimationRun {
            from: inner.progress,
            to,
            started_ms: now,
            token,
        });
    }

    fn cancel_run(&self, inner: &mut DisclosureInner, what: &'static str) {
        if let Some(run) = inner.run.take() {
            self.scheduler.cancel(run.token);
            A11yError::superseded(inner.options.owner.as_str(), what).log();
        }
    }

    fn schedule_tick(self: &Rc<Self>, delay_ms: u64) -> TimerToken {
        let weak: Weak<DisclosureShared> = Rc::downgrade(self);
        self.scheduler.schedule(
            delay_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }),
        )
    }

    fn notify(&self, transitions: &[Transition]) {
        if transitions.is_empty() {
            return;
        }
        self.undelivered.borrow_mut().extend(transitions.iter().copied());

        // A transition caused from inside an observer is queued and
        // delivered by the outermost call, after the current one.
        if self.notifying.replace(true) {
            return;
        }

        let mut observers = std::mem::take(&mut *self.observers.borrow_mut());
        loop {
            let next = self.undelivered.borrow_mut().pop_front();
            let Some(transition) = next else {
                break;
            };
            for observer in observers.iter_mut() {
                observer(&transition);
            }
            observers.append(&mut self.observers.borrow_mut());
        }
        let mut slot = self.observers.borrow_mut();
        let added = std::mem::replace(&mut *slot, observers);
        slot.extend(added);
        drop(slot);
        self.notifying.set(false);
    }
}

/// Open/closed state machine with an attached progress animation.
///
/// Owns its focus coordinator and announcement queue; dropping the
/// controller cancels every timer it scheduled.
pub struct DisclosureController {
    shared: Rc<DisclosureShared>,
}

impl DisclosureController {
    pub fn new(
        options: DisclosureOptions,
        focus: FocusCoordinator,
        announcer: AnnouncementQueue,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Rc::new(DisclosureShared {
                scheduler,
                inner: RefCell::new(DisclosureInner {
                    phase: DisclosurePhase::Closed,
                    progress: 0.0,
                    elevated: false,
                    run: None,
                    options,
                    focus,
                    announcer,
                }),
                observers: RefCell::new(Vec::new()),
                undelivered: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    pub fn phase(&self) -> DisclosurePhase {
        self.shared.inner.borrow().phase
    }

    pub fn progress(&self) -> f32 {
        self.shared.inner.borrow().progress
    }

    pub fn is_elevated(&self) -> bool {
        self.shared.inner.borrow().elevated
    }

    pub fn is_animating(&self) -> bool {
        self.shared.inner.borrow().run.is_some()
    }

    pub fn owner(&self) -> String {
        self.shared.inner.borrow().options.owner.clone()
    }

    /// Call `observer` for every subsequent phase change.
    ///
    /// Observers may reenter the controller. Phase changes they cause are
    /// delivered to every observer once the current change has been.
    pub fn on_transition(&self, observer: impl FnMut(&Transition) + 'static) {
        self.shared.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn set_first_focus(&self, target: Option<NodeRef>, delay_ms: u64) {
        let mut inner = self.shared.inner.borrow_mut();
        inner.options.first_focus = target;
        inner.options.open_focus_delay_ms = delay_ms;
    }

    pub fn set_return_focus(&self, target: Option<NodeRef>, delay_ms: u64) {
        let mut inner = self.shared.inner.borrow_mut();
        inner.options.return_focus = target;
        inner.options.return_focus_delay_ms = delay_ms;
    }

    pub fn set_open_announcement(&self, announcement: Option<OpenAnnouncement>) {
        self.shared.inner.borrow_mut().options.open_announcement = announcement;
    }

    /// Speak through this disclosure's own queue
    pub fn announce(&self, message: impl Into<String>, options: AnnounceOptions) {
        self.shared.inner.borrow().announcer.announce(message, options);
    }

    /// Whether this disclosure's content should be marked as a live region
    pub fn uses_live_region(&self) -> bool {
        self.shared.inner.borrow().announcer.uses_live_region()
    }

    pub fn has_pending_focus(&self) -> bool {
        self.shared.inner.borrow().focus.has_pending()
    }
}

impl Disclosure for DisclosureController {
    fn state(&self) -> DisclosureState {
        let inner = self.shared.inner.borrow();
        DisclosureState {
            phase: inner.phase,
            progress: inner.progress,
            elevated: inner.elevated,
        }
    }

    fn open(&self) {
        self.shared.open();
    }

    fn close(&self) {
        self.shared.close();
    }

    /// Closed or closing content opens; open or opening content closes
    fn toggle(&self) {
        if self.phase().is_showing() {
            self.shared.close();
        } else {
            self.shared.open();
        }
    }
}

impl Drop for DisclosureController {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.borrow_mut();
        if let Some(run) = inner.run.take() {
            self.shared.scheduler.cancel(run.token);
        }
        inner.focus.cancel_pending();
        inner.announcer.clear();
    }
}

impl fmt::Debug for DisclosureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisclosureController")
            .field("owner", &self.owner())
            .field("state", &self.state())
            .finish()
    }
}
