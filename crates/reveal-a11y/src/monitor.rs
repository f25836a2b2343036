//! Screen reader status monitoring
//!
//! [`ScreenReaderMonitor`] is the single writer of the process-wide reader
//! state. It listens to platform change events and fans them out to
//! [`ReaderSubscription`]s, which release themselves when dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::error::report_leak;
use crate::platform::{AccessibilityPlatform, PlatformListenerId};

type Listener = Rc<dyn Fn(bool)>;

struct MonitorShared {
    platform: Rc<dyn AccessibilityPlatform>,
    enabled: Cell<bool>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    platform_listener: Cell<Option<PlatformListenerId>>,
    shut_down: Cell<bool>,
}

impl MonitorShared {
    fn update(&self, enabled: bool) {
        if self.shut_down.get() || self.enabled.replace(enabled) == enabled {
            return;
        }
        info!(enabled, "screen reader status changed");

        // Listeners may subscribe or unsubscribe while being notified.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(enabled);
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn shutdown(&self) {
        if self.shut_down.replace(true) {
            return;
        }
        if let Some(id) = self.platform_listener.take() {
            self.platform.unsubscribe_reader_changed(id);
            debug!("platform reader listener removed");
        }
        let leaked = self.listeners.borrow().len();
        self.listeners.borrow_mut().clear();
        report_leak("reader", leaked);
    }
}

impl Drop for MonitorShared {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tracks whether an assistive reader is active.
///
/// Clones are handles to the same monitor; the platform listener is removed
/// when [`shutdown`](Self::shutdown) is called or the last handle drops.
#[derive(Clone)]
pub struct ScreenReaderMonitor {
    shared: Rc<MonitorShared>,
}

impl ScreenReaderMonitor {
    /// Query the initial state and register for platform change events.
    ///
    /// A platform without reader APIs leaves the state at `false`.
    pub fn start(platform: Rc<dyn AccessibilityPlatform>) -> Self {
        let initial = platform.query_reader_enabled().unwrap_or(false);
        let shared = Rc::new(MonitorShared {
            platform: Rc::clone(&platform),
            enabled: Cell::new(initial),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            platform_listener: Cell::new(None),
            shut_down: Cell::new(false),
        });

        let weak = Rc::downgrade(&shared);
        let listener = Rc::new(move |enabled: bool| {
            if let Some(shared) = weak.upgrade() {
                shared.update(enabled);
            }
        });

        match platform.subscribe_reader_changed(listener) {
            Some(id) => shared.platform_listener.set(Some(id)),
            None => debug!(enabled = initial, "reader change events unavailable"),
        }

        Self { shared }
    }

    /// Last known reader state
    pub fn current(&self) -> bool {
        self.shared.enabled.get()
    }

    /// Register `callback` for every subsequent change
    pub fn subscribe(&self, callback: impl Fn(bool) + 'static) -> ReaderSubscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push((id, Rc::new(callback)));

        ReaderSubscription {
            monitor: Rc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    /// Release `subscription`; calling it again is a no-op
    pub fn unsubscribe(&self, subscription: &mut ReaderSubscription) {
        subscription.unsubscribe();
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    /// Remove the platform listener. Widget subscriptions still registered
    /// at this point are reported as leaks.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.get()
    }

    /// Non-owning view of the reader state
    pub fn probe(&self) -> ReaderProbe {
        ReaderProbe {
            monitor: Rc::downgrade(&self.shared),
        }
    }
}

impl fmt::Debug for ScreenReaderMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenReaderMonitor")
            .field("enabled", &self.current())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Reads the reader state without keeping the monitor alive
#[derive(Debug, Clone)]
pub struct ReaderProbe {
    monitor: Weak<MonitorShared>,
}

impl ReaderProbe {
    /// `None` once the monitor is gone or shut down
    pub fn enabled(&self) -> Option<bool> {
        let monitor = self.monitor.upgrade()?;
        (!monitor.shut_down.get()).then(|| monitor.enabled.get())
    }
}

/// Scoped registration with a [`ScreenReaderMonitor`]
#[derive(Debug)]
pub struct ReaderSubscription {
    monitor: Weak<MonitorShared>,
    id: Option<u64>,
}

impl ReaderSubscription {
    /// Stop receiving notifications. Idempotent.
    pub fn unsubscribe(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(monitor) = self.monitor.upgrade() {
            monitor.remove(id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.monitor.strong_count() > 0
    }
}

impl Drop for ReaderSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
