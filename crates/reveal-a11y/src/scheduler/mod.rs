//! Timer scheduling behind an injectable clock
//!
//! All coordination work is single-threaded and cooperative: callers never
//! block, and every delayed effect is a callback registered with a
//! [`Scheduler`]. Tests drive [`VirtualScheduler`] by hand; applications run
//! on [`TokioScheduler`] inside a `LocalSet`.

mod tokio_time;
mod virtual_time;

pub use tokio_time::TokioScheduler;
pub use virtual_time::VirtualScheduler;

/// Work to run when a timer fires
pub type Callback = Box<dyn FnOnce() + 'static>;

/// Invalidation handle for a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Clock plus one-shot timers
pub trait Scheduler {
    /// Milliseconds since the scheduler's origin
    fn now_ms(&self) -> u64;

    /// Run `callback` once, `delay_ms` from now
    fn schedule(&self, delay_ms: u64, callback: Callback) -> TimerToken;

    /// Cancel a timer; returns `false` if it already fired or was cancelled
    fn cancel(&self, token: TimerToken) -> bool;
}
