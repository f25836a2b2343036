//! Accessibility platform that reports to the log

use std::cell::{Cell, RefCell};

use reveal_a11y::{
    AccessibilityPlatform, NodeId, PlatformError, PlatformListenerId, ReaderListener,
};
use reveal_config::PlatformTarget;
use tracing::info;

/// Logs every focus move and announcement instead of driving a real reader
pub struct ConsolePlatform {
    target: PlatformTarget,
    reader_enabled: Cell<bool>,
    listeners: RefCell<Vec<(PlatformListenerId, ReaderListener)>>,
    next_id: Cell<u64>,
}

impl ConsolePlatform {
    pub fn new(target: PlatformTarget, reader_enabled: bool) -> Self {
        Self {
            target,
            reader_enabled: Cell::new(reader_enabled),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Simulate the user switching the reader on or off
    pub fn switch_reader(&self, enabled: bool) {
        self.reader_enabled.set(enabled);
        let listeners: Vec<ReaderListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(enabled);
        }
    }
}

impl AccessibilityPlatform for ConsolePlatform {
    fn target(&self) -> PlatformTarget {
        self.target
    }

    fn query_reader_enabled(&self) -> Option<bool> {
        Some(self.reader_enabled.get())
    }

    fn subscribe_reader_changed(&self, listener: ReaderListener) -> Option<PlatformListenerId> {
        let id = PlatformListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        Some(id)
    }

    fn unsubscribe_reader_changed(&self, id: PlatformListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    fn set_accessibility_focus(&self, node: NodeId) -> Result<(), PlatformError> {
        info!(%node, "reader focus");
        Ok(())
    }

    fn speak_announcement(&self, message: &str, queued: bool) -> Result<(), PlatformError> {
        if !self.reader_enabled.get() {
            return Err(PlatformError::Failed("no reader running".to_string()));
        }
        info!(message, queued, "reader speaks");
        Ok(())
    }
}
