//! ARIA-like semantics exposed by disclosure widgets
//!
//! Widgets describe each element they render with [`AriaProperties`]; the
//! host maps them onto its own accessibility attributes.

/// ARIA live property values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AriaLive {
    #[default]
    Off, // No announcements
    Polite,    // Announce when the reader is idle
    Assertive, // Announce immediately
}

/// Semantic roles used by disclosure widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaRole {
    Alert,
    Button,
    Dialog,
    Menu,
    MenuItem,
    Text,
    /// No role is spoken; the label carries everything
    None,
}

/// ARIA-like properties for one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AriaProperties {
    pub role: Option<AriaRole>,
    pub label: Option<String>,
    /// Spoken after the label, describing what activation does
    pub hint: Option<String>,
    pub expanded: Option<bool>,
    pub selected: Option<bool>,
    /// Whether the reader treats the element as a focusable unit
    pub accessible: bool,
    /// Confine reader navigation to this element's subtree
    pub modal: bool,
    pub live: AriaLive,
}

impl AriaProperties {
    /// Create properties for an accessible element with a specific role
    pub fn with_role(role: AriaRole) -> Self {
        Self {
            role: Some(role),
            accessible: true,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn with_accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    pub fn with_modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    pub fn with_live(mut self, live: AriaLive) -> Self {
        self.live = live;
        self
    }

    /// Approximate what a reader says when it lands on the element
    pub fn screen_reader_description(&self) -> String {
        let mut parts = Vec::new();

        if let Some(label) = &self.label {
            parts.push(label.trim().to_string());
        }

        match self.role {
            Some(AriaRole::None) | Some(AriaRole::Text) | None => {}
            Some(AriaRole::MenuItem) => parts.push("menu item".to_string()),
            Some(role) => parts.push(format!("{:?}", role).to_lowercase()),
        }

        if let Some(expanded) = self.expanded {
            parts.push(if expanded { "expanded" } else { "collapsed" }.to_string());
        }

        if self.selected == Some(true) {
            parts.push("selected".to_string());
        }

        if let Some(hint) = &self.hint {
            parts.push(hint.clone());
        }

        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_orders_label_role_state_hint() {
        let props = AriaProperties::with_role(AriaRole::Button)
            .with_label("Dropdown menu")
            .with_expanded(false)
            .with_hint("Double tap to open");

        assert_eq!(
            props.screen_reader_description(),
            "Dropdown menu, button, collapsed, Double tap to open"
        );
    }

    #[test]
    fn test_menu_item_description() {
        let props = AriaProperties::with_role(AriaRole::MenuItem)
            .with_label("A, option 1 of 2 ")
            .with_selected(true);
        assert_eq!(
            props.screen_reader_description(),
            "A, option 1 of 2, menu item, selected"
        );
    }

    #[test]
    fn test_defaults_are_inert() {
        let props = AriaProperties::default();
        assert!(!props.accessible);
        assert!(!props.modal);
        assert_eq!(props.live, AriaLive::Off);
        assert_eq!(props.screen_reader_description(), "");
    }
}
