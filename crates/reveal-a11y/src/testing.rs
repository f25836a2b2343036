//! Recording platform double
//!
//! [`FakePlatform`] stands in for the host accessibility surface in tests. It
//! timestamps every focus and speech call against a [`VirtualScheduler`] so
//! assertions can check both what happened and when.

use std::cell::{Cell, RefCell};

use reveal_config::PlatformTarget;

use crate::error::PlatformError;
use crate::platform::{AccessibilityPlatform, NodeId, PlatformListenerId, ReaderListener};
use crate::scheduler::{Scheduler, VirtualScheduler};

/// One recorded side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Focus { node: NodeId, at_ms: u64 },
    Speak { message: String, queued: bool, at_ms: u64 },
}

/// Scriptable [`AccessibilityPlatform`] that records every call
pub struct FakePlatform {
    target: PlatformTarget,
    clock: VirtualScheduler,
    reader_enabled: Cell<bool>,
    reader_api: Cell<bool>,
    focus_available: Cell<bool>,
    speech_available: Cell<bool>,
    listeners: RefCell<Vec<(PlatformListenerId, ReaderListener)>>,
    next_listener: Cell<u64>,
    calls: RefCell<Vec<PlatformCall>>,
}

impl FakePlatform {
    pub fn new(target: PlatformTarget, clock: VirtualScheduler) -> Self {
        Self {
            target,
            clock,
            reader_enabled: Cell::new(false),
            reader_api: Cell::new(true),
            focus_available: Cell::new(true),
            speech_available: Cell::new(true),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Set the value the next query returns, without emitting an event
    pub fn set_reader_enabled(&self, enabled: bool) {
        self.reader_enabled.set(enabled);
    }

    /// Simulate a platform reader-change event
    pub fn emit_reader_changed(&self, enabled: bool) {
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

    /// Make the reader query and change events unavailable
    pub fn set_reader_api_available(&self, available: bool) {
        self.reader_api.set(available);
    }

    pub fn set_focus_available(&self, available: bool) {
        self.focus_available.set(available);
    }

    pub fn set_speech_available(&self, available: bool) {
        self.speech_available.set(available);
    }

    /// Reader-change listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Successful focus transfers as `(node, at_ms)`
    pub fn focus_calls(&self) -> Vec<(NodeId, u64)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Focus { node, at_ms } => Some((*node, *at_ms)),
                PlatformCall::Speak { .. } => None,
            })
            .collect()
    }

    /// Spoken announcements as `(message, queued, at_ms)`
    pub fn speech_calls(&self) -> Vec<(String, bool, u64)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Speak {
                    message,
                    queued,
                    at_ms,
                } => Some((message.clone(), *queued, *at_ms)),
                PlatformCall::Focus { .. } => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.speech_calls()
            .into_iter()
            .map(|(message, _, _)| message)
            .collect()
    }
}

impl AccessibilityPlatform for FakePlatform {
    fn target(&self) -> PlatformTarget {
        self.target
    }

    fn query_reader_enabled(&self) -> Option<bool> {
        self.reader_api.get().then(|| self.reader_enabled.get())
    }

    fn subscribe_reader_changed(&self, listener: ReaderListener) -> Option<PlatformListenerId> {
        if !self.reader_api.get() {
            return None;
        }
        let id = PlatformListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        Some(id)
    }

    fn unsubscribe_reader_changed(&self, id: PlatformListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    fn set_accessibility_focus(&self, node: NodeId) -> Result<(), PlatformError> {
        if !self.focus_available.get() {
            return Err(PlatformError::Unsupported("accessibility focus"));
        }
        self.calls.borrow_mut().push(PlatformCall::Focus {
            node,
            at_ms: self.clock.now_ms(),
        });
        Ok(())
    }

    fn speak_announcement(&self, message: &str, queued: bool) -> Result<(), PlatformError> {
        if !self.speech_available.get() {
            return Err(PlatformError::Unsupported("speech"));
        }
        self.calls.borrow_mut().push(PlatformCall::Speak {
            message: message.to_string(),
            queued,
            at_ms: self.clock.now_ms(),
        });
        Ok(())
    }
}
