//! Dropdown menu
//!
//! A trigger button that reveals a list of options. Opening moves
//! accessibility focus to the first option once the menu has slid out;
//! closing (or picking an option) returns it to the trigger.

use std::cell::{Cell, RefCell};
use std::fmt;

use reveal_a11y::{
    AccessibilityCoordinator, AriaProperties, AriaRole, Disclosure, DisclosureController,
    DisclosureOptions, DisclosureState, NodeRef, Transition,
};
use tracing::debug;

use crate::error::{Result, WidgetError};
use crate::layers::ZIndex;

/// Trigger label when nothing is selected and no label was given
pub const DEFAULT_LABEL: &str = "Dropdown menu";

/// Hint read after the trigger label
pub const TRIGGER_HINT: &str = "Double tap to open and see dropdown options.";

/// Dropdown state snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropdownState {
    /// Menu disclosure
    pub disclosure: DisclosureState,
    /// Number of options
    pub option_count: usize,
    /// Currently selected option
    pub selected_index: Option<usize>,
}

type SelectHandler = Box<dyn Fn(&str)>;

/// Dropdown widget
pub struct Dropdown {
    options: Vec<String>,
    label: Option<String>,
    default_text: String,
    selected: Cell<Option<usize>>,
    trigger: NodeRef,
    option_refs: Vec<NodeRef>,
    on_select: RefCell<Option<SelectHandler>>,
    is_ios: bool,
    disclosure: DisclosureController,
}

impl Dropdown {
    /// Create a dropdown over `options`
    pub fn new(coordinator: &AccessibilityCoordinator, options: Vec<String>) -> Self {
        let profile = coordinator.profile();
        let timings = coordinator.widget_timings();
        let trigger = NodeRef::new();
        let option_refs: Vec<NodeRef> = options.iter().map(|_| NodeRef::new()).collect();

        let mut disclosure_options = DisclosureOptions::new("dropdown")
            .animated(coordinator.animation_spec(timings.dropdown_duration_ms))
            .return_focus(trigger.clone(), profile.return_focus_delay_ms);
        if let Some(first) = option_refs.first() {
            disclosure_options =
                disclosure_options.first_focus(first.clone(), profile.open_focus_delay_ms);
        }

        Self {
            options,
            label: None,
            default_text: String::new(),
            selected: Cell::new(None),
            trigger,
            option_refs,
            on_select: RefCell::new(None),
            is_ios: profile.target.is_ios(),
            disclosure: coordinator.disclosure(disclosure_options),
        }
    }

    /// Set the trigger label used while nothing is selected
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the placeholder shown while nothing is selected
    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = text.into();
        self
    }

    /// Call `handler` with the picked option
    pub fn on_select(&self, handler: impl Fn(&str) + 'static) {
        *self.on_select.borrow_mut() = Some(Box::new(handler));
    }

    /// Observe menu transitions
    pub fn on_transition(&self, observer: impl FnMut(&Transition) + 'static) {
        self.disclosure.on_transition(observer);
    }

    /// Reference the host attaches to the trigger button
    pub fn trigger_ref(&self) -> &NodeRef {
        &self.trigger
    }

    /// Reference the host attaches to option `index`
    pub fn option_ref(&self, index: usize) -> Option<&NodeRef> {
        self.option_refs.get(index)
    }

    /// Handle a press on the trigger
    pub fn press_trigger(&self) {
        self.toggle();
    }

    /// Pick option `index` and close the menu
    pub fn select(&self, index: usize) -> Result<&str> {
        if !self.is_open() {
            return Err(WidgetError::MenuClosed);
        }
        let option = self
            .options
            .get(index)
            .ok_or(WidgetError::OptionOutOfRange {
                index,
                count: self.options.len(),
            })?;

        self.selected.set(Some(index));
        debug!(index, option = %option, "dropdown option selected");
        if let Some(handler) = self.on_select.borrow().as_ref() {
            handler(option.as_str());
        }
        self.disclosure.close();
        Ok(option.as_str())
    }

    /// Whether the menu is opening or open
    pub fn is_open(&self) -> bool {
        self.disclosure.phase().is_showing()
    }

    /// Currently selected option text
    pub fn selection(&self) -> Option<&str> {
        self.selected
            .get()
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    /// Text rendered on the trigger
    pub fn display_text(&self) -> &str {
        self.selection().unwrap_or(&self.default_text)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Full widget state
    pub fn dropdown_state(&self) -> DropdownState {
        DropdownState {
            disclosure: self.disclosure.state(),
            option_count: self.options.len(),
            selected_index: self.selected.get(),
        }
    }

    /// Stacking layer for the whole dropdown
    pub fn z_index(&self) -> ZIndex {
        ZIndex::for_elevation(self.disclosure.is_elevated())
    }

    /// Accessible label of the trigger
    pub fn trigger_label(&self) -> String {
        match self.selection() {
            Some(selection) => format!("current selection: {}", selection),
            None => self
                .label
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        }
    }

    /// Semantics of the trigger button
    pub fn trigger_semantics(&self) -> AriaProperties {
        AriaProperties::with_role(AriaRole::Button)
            .with_label(self.trigger_label())
            .with_hint(TRIGGER_HINT)
            .with_expanded(self.is_open())
    }

    /// Semantics of the option list container.
    ///
    /// iOS reads the options individually, so only Android exposes the
    /// container itself.
    pub fn menu_semantics(&self) -> AriaProperties {
        AriaProperties::with_role(AriaRole::Menu)
            .with_accessible(!self.is_ios)
            .with_modal(self.is_open())
    }

    /// Semantics of option `index`; options are reachable only while open
    pub fn option_semantics(&self, index: usize) -> Option<AriaProperties> {
        let option = self.options.get(index)?;
        Some(
            AriaProperties::with_role(AriaRole::MenuItem)
                .with_label(option_label(option, index, self.options.len()))
                .with_selected(self.selected.get() == Some(index))
                .with_accessible(self.is_open()),
        )
    }
}

/// Accessible label of one option, e.g. `"A, option 1 of 2 "`
pub fn option_label(option: &str, index: usize, count: usize) -> String {
    format!("{}, option {} of {} ", option, index + 1, count)
}

impl Disclosure for Dropdown {
    fn state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    fn open(&self) {
        self.disclosure.open();
    }

    fn close(&self) {
        self.disclosure.close();
    }

    fn toggle(&self) {
        self.disclosure.toggle();
    }
}

impl fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropdown")
            .field("options", &self.options)
            .field("state", &self.dropdown_state())
            .finish()
    }
}
