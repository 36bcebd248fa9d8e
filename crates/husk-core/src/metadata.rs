//! Static, descriptive component metadata.
//!
//! Metadata is read by adapters (root element type, fallback role) and by
//! tooling (documentation, inspectors).  The core never validates dispatched
//! events against it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// WCAG conformance level a component targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WcagLevel {
    A,
    #[default]
    AA,
    AAA,
}

/// Accessibility declarations for a component as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityMetadata {
    /// Fallback ARIA role when the root element declares none.
    pub role: Option<String>,
    pub wcag_level: WcagLevel,
    /// WAI-ARIA authoring patterns implemented (`"dialog-modal"`, ...).
    pub patterns: Vec<String>,
    /// Key combination to description.
    pub keyboard_shortcuts: BTreeMap<String, String>,
    /// ARIA attributes the component may emit.
    pub aria_attributes: Vec<String>,
}

/// Event names a component understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsMetadata {
    pub supported: Vec<String>,
    pub required: Vec<String>,
    /// Widget-specific events and their descriptions.
    pub custom: BTreeMap<String, String>,
}

/// Expected element type and role for one part of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(rename = "type")]
    pub element_type: String,
    pub role: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl ElementSpec {
    /// An element rendered as `element_type` (`"div"`, `"button"`, ...).
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            role: None,
            optional: false,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Mark the element as one a renderer may omit.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Structural description of the parts a renderer is expected to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureMetadata {
    pub elements: BTreeMap<String, ElementSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
}

/// Everything static about a component.
///
/// Built fluently and frozen once handed to a
/// [`ComponentFactory`](crate::component::ComponentFactory).
///
/// # Example
///
/// ```
/// use husk_core::metadata::{ComponentMetadata, ElementSpec};
///
/// let meta = ComponentMetadata::new("Toggle")
///     .version("1.0.0")
///     .role("switch")
///     .supports(["toggle"])
///     .element("root", ElementSpec::new("button").role("switch"));
///
/// assert_eq!(meta.root_element().map(|(id, _)| id), Some("root"));
/// assert_eq!(meta.fallback_role(), Some("switch"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub name: String,
    pub version: String,
    pub accessibility: AccessibilityMetadata,
    pub events: EventsMetadata,
    pub structure: StructureMetadata,
}

impl ComponentMetadata {
    /// Metadata for a component called `name`, version `0.1.0`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.1.0".into(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.accessibility.role = Some(role.into());
        self
    }

    pub fn wcag_level(mut self, level: WcagLevel) -> Self {
        self.accessibility.wcag_level = level;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.accessibility.patterns.push(pattern.into());
        self
    }

    pub fn shortcut(mut self, keys: impl Into<String>, description: impl Into<String>) -> Self {
        self.accessibility
            .keyboard_shortcuts
            .insert(keys.into(), description.into());
        self
    }

    pub fn aria_attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.accessibility
            .aria_attributes
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn supports<I, N>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.events
            .supported
            .extend(events.into_iter().map(Into::into));
        self
    }

    pub fn requires<I, N>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.events
            .required
            .extend(events.into_iter().map(Into::into));
        self
    }

    pub fn custom_event(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.events.custom.insert(name.into(), description.into());
        self
    }

    /// Declare a part; a second declaration with the same id replaces the first.
    pub fn element(mut self, id: impl Into<String>, spec: ElementSpec) -> Self {
        self.structure.elements.insert(id.into(), spec);
        self
    }

    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.structure
            .slots
            .get_or_insert_with(Vec::new)
            .push(slot.into());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.structure
            .variants
            .get_or_insert_with(Vec::new)
            .push(variant.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.structure
            .sizes
            .get_or_insert_with(Vec::new)
            .push(size.into());
        self
    }

    /// The element a renderer should use as its outermost node.
    ///
    /// This is the element with id `root` when declared, otherwise the first
    /// declared element in id order.
    pub fn root_element(&self) -> Option<(&str, &ElementSpec)> {
        self.structure
            .elements
            .get_key_value("root")
            .or_else(|| self.structure.elements.iter().next())
            .map(|(id, spec)| (id.as_str(), spec))
    }

    /// Role for the root element: its declared role, else the component role.
    pub fn fallback_role(&self) -> Option<&str> {
        self.root_element()
            .and_then(|(_, spec)| spec.role.as_deref())
            .or(self.accessibility.role.as_deref())
    }

    pub fn supports_event(&self, name: &str) -> bool {
        self.events.supported.iter().any(|e| e == name)
    }

    /// Pretty-printed JSON, for documentation and inspectors.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog_meta() -> ComponentMetadata {
        ComponentMetadata::new("Dialog")
            .version("2.1.0")
            .role("dialog")
            .wcag_level(WcagLevel::AA)
            .pattern("dialog-modal")
            .shortcut("Escape", "Close the dialog")
            .aria_attributes(["aria-modal", "aria-labelledby"])
            .supports(["open", "close"])
            .requires(["close"])
            .custom_event("toggle", "Flip open state")
            .element("trigger", ElementSpec::new("button"))
            .element("content", ElementSpec::new("div").role("dialog"))
            .element("backdrop", ElementSpec::new("div").optional())
            .size("sm")
            .size("lg")
    }

    #[test]
    fn builder_accumulates_fields() {
        let meta = dialog_meta();
        assert_eq!(meta.name, "Dialog");
        assert_eq!(meta.version, "2.1.0");
        assert_eq!(meta.accessibility.patterns, vec!["dialog-modal"]);
        assert_eq!(meta.events.supported, vec!["open", "close"]);
        assert_eq!(meta.structure.elements.len(), 3);
        assert!(meta.structure.elements["backdrop"].optional);
        assert_eq!(meta.structure.sizes, Some(vec!["sm".into(), "lg".into()]));
        assert!(meta.structure.slots.is_none());
    }

    #[test]
    fn root_falls_back_to_first_element() {
        let meta = dialog_meta();
        // No `root` declared: ids are ordered, so `backdrop` comes first.
        assert_eq!(meta.root_element().map(|(id, _)| id), Some("backdrop"));
        assert_eq!(meta.fallback_role(), Some("dialog"));
    }

    #[test]
    fn fallback_role_prefers_root_declaration() {
        let meta = ComponentMetadata::new("Menu")
            .role("menu")
            .element("root", ElementSpec::new("ul").role("menubar"));
        assert_eq!(meta.fallback_role(), Some("menubar"));
    }

    #[test]
    fn no_elements_means_no_root() {
        let meta = ComponentMetadata::new("Empty");
        assert!(meta.root_element().is_none());
        assert_eq!(meta.fallback_role(), None);
    }

    #[test]
    fn json_uses_camel_case_and_type_key() {
        let json = dialog_meta().to_json().unwrap();
        assert!(json.contains("\"wcagLevel\": \"AA\""));
        assert!(json.contains("\"keyboardShortcuts\""));
        assert!(json.contains("\"type\": \"button\""));
        assert!(!json.contains("\"slots\""));
    }

    #[test]
    fn json_round_trips() {
        let meta = dialog_meta();
        let back = ComponentMetadata::from_json(&meta.to_json().unwrap()).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn supports_event_checks_supported_list() {
        let meta = dialog_meta();
        assert!(meta.supports_event("open"));
        assert!(!meta.supports_event("toggle"));
    }
}
