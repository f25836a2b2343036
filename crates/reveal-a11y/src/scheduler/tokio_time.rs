//! Real-time scheduling on a tokio `LocalSet`

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{Callback, Scheduler, TimerToken};

/// Scheduler backed by `tokio::time`.
///
/// Callbacks are `!Send`, so timers are spawned with `spawn_local`; every
/// method that schedules must run inside a `tokio::task::LocalSet`.
pub struct TokioScheduler {
    origin: Instant,
    next_id: Cell<u64>,
    tasks: Rc<RefCell<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            next_id: Cell::new(0),
            tasks: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn schedule(&self, delay_ms: u64, callback: Callback) -> TimerToken {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let tasks = Rc::downgrade(&self.tasks);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Some(tasks) = tasks.upgrade() {
                tasks.borrow_mut().remove(&id);
            }
            callback();
        });

        self.tasks.borrow_mut().insert(id, handle);
        TimerToken::from_raw(id)
    }

    fn cancel(&self, token: TimerToken) -> bool {
        match self.tasks.borrow_mut().remove(&token.id()) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.borrow_mut().drain() {
            handle.abort();
        }
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tokio::task::LocalSet;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new();
                let fired = Rc::new(RefCell::new(Vec::new()));

                let log = fired.clone();
                scheduler.schedule(300, Box::new(move || log.borrow_mut().push("open")));
                assert_eq!(scheduler.pending(), 1);

                tokio::time::sleep(Duration::from_millis(299)).await;
                assert!(fired.borrow().is_empty());

                tokio::time::sleep(Duration::from_millis(2)).await;
                assert_eq!(*fired.borrow(), vec!["open"]);
                assert_eq!(scheduler.pending(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_timer() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new();
                let fired = Rc::new(Cell::new(false));

                let flag = fired.clone();
                let token = scheduler.schedule(50, Box::new(move || flag.set(true)));
                assert!(scheduler.cancel(token));
                assert!(!scheduler.cancel(token));

                tokio::time::sleep(Duration::from_millis(100)).await;
                assert!(!fired.get());
            })
            .await;
    }
}
