//! Host accessibility surface
//!
//! The coordination layer never talks to a UI toolkit directly. Everything it
//! needs from the host (reader status, focus, speech, node resolution) goes
//! through [`AccessibilityPlatform`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use reveal_config::PlatformTarget;

use crate::error::PlatformError;

/// Platform-specific handle of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Logical reference to an element that may or may not be mounted.
///
/// Clones share one slot, so the widget that renders the element and the
/// coordinator that focuses it always agree on what is currently mounted.
#[derive(Clone, Default)]
pub struct NodeRef {
    slot: Rc<Cell<Option<NodeId>>>,
}

impl NodeRef {
    /// An unmounted reference
    pub fn new() -> Self {
        Self::default()
    }

    /// A reference already attached to `node`
    pub fn mounted(node: NodeId) -> Self {
        let reference = Self::new();
        reference.attach(node);
        reference
    }

    pub fn attach(&self, node: NodeId) {
        self.slot.set(Some(node));
    }

    pub fn detach(&self) {
        self.slot.set(None);
    }

    pub fn current(&self) -> Option<NodeId> {
        self.slot.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.current().is_some()
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.current()).finish()
    }
}

/// Handle returned by the platform for a reader-change listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformListenerId(pub u64);

/// Receives the new reader state on every platform change event
pub type ReaderListener = Rc<dyn Fn(bool)>;

/// Capabilities consumed from the host platform
pub trait AccessibilityPlatform {
    /// Platform family, used to pick delays and announcement strategy
    fn target(&self) -> PlatformTarget;

    /// Current reader state, or `None` when the API is absent
    fn query_reader_enabled(&self) -> Option<bool>;

    /// Register for reader-change events, or `None` when unsupported
    fn subscribe_reader_changed(&self, listener: ReaderListener) -> Option<PlatformListenerId>;

    fn unsubscribe_reader_changed(&self, id: PlatformListenerId);

    /// Resolve a logical reference to a live node
    fn resolve_node(&self, node: &NodeRef) -> Option<NodeId> {
        node.current()
    }

    fn set_accessibility_focus(&self, node: NodeId) -> Result<(), PlatformError>;

    /// Speak `message`; `queued` appends after current speech instead of
    /// interrupting it
    fn speak_announcement(&self, message: &str, queued: bool) -> Result<(), PlatformError>;
}

/// Platform with no accessibility APIs at all.
///
/// The reader is permanently off, focus and speech are unsupported.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessPlatform {
    target: PlatformTarget,
}

impl HeadlessPlatform {
    pub fn new(target: PlatformTarget) -> Self {
        Self { target }
    }
}

impl AccessibilityPlatform for HeadlessPlatform {
    fn target(&self) -> PlatformTarget {
        self.target
    }

    fn query_reader_enabled(&self) -> Option<bool> {
        None
    }

    fn subscribe_reader_changed(&self, _listener: ReaderListener) -> Option<PlatformListenerId> {
        None
    }

    fn unsubscribe_reader_changed(&self, _id: PlatformListenerId) {}

    fn set_accessibility_focus(&self, _node: NodeId) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("accessibility focus"))
    }

    fn speak_announcement(&self, _message: &str, _queued: bool) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("speech"))
    }
}
