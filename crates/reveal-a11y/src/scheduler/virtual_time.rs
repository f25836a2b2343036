//! Deterministic virtual time

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::{Callback, Scheduler, TimerToken};

/// Upper bound on callbacks fired by one `run_until_idle` call
const IDLE_FIRE_LIMIT: usize = 10_000;

#[derive(Default)]
struct VirtualState {
    now: u64,
    next_id: u64,
    /// Keyed by (deadline, id) so equal deadlines fire in scheduling order
    timers: BTreeMap<(u64, u64), Callback>,
    deadlines: HashMap<u64, u64>,
}

/// Scheduler whose time only moves when told to.
///
/// Cloning yields another handle to the same clock.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `ms`, firing every timer that comes due
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms().saturating_add(ms);
        self.advance_to(target)
    }

    /// Move time forward to `target_ms`, firing due timers in deadline order.
    ///
    /// Timers scheduled by a firing callback run in the same call when they
    /// fall due before `target_ms`. Returns the number of callbacks fired.
    pub fn advance_to(&self, target_ms: u64) -> usize {
        let mut fired = 0;
        while let Some(callback) = self.pop_due(target_ms) {
            callback();
            fired += 1;
        }

        let mut state = self.state.borrow_mut();
        state.now = state.now.max(target_ms);
        fired
    }

    /// Fire timers until none remain
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            if fired >= IDLE_FIRE_LIMIT {
                warn!(fired, "virtual scheduler still busy, giving up");
                break;
            }
            fired += self.advance_to(deadline);
        }
        fired
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.state
            .borrow()
            .timers
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    fn pop_due(&self, target_ms: u64) -> Option<Callback> {
        let mut state = self.state.borrow_mut();
        let key = *state.timers.keys().next()?;
        if key.0 > target_ms {
            return None;
        }

        let callback = state.timers.remove(&key)?;
        state.deadlines.remove(&key.1);
        state.now = state.now.max(key.0);
        Some(callback)
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> u64 {
        self.state.borrow().now
    }

    fn schedule(&self, delay_ms: u64, callback: Callback) -> TimerToken {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;

        let deadline = state.now.saturating_add(delay_ms);
        state.timers.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);
        TimerToken::from_raw(id)
    }

    fn cancel(&self, token: TimerToken) -> bool {
        let mut state = self.state.borrow_mut();
        match state.deadlines.remove(&token.id()) {
            Some(deadline) => state.timers.remove(&(deadline, token.id())).is_some(),
            None => false,
        }
    }
}

impl fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualScheduler")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .finish()
    }
}
