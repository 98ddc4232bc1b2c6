//! Component specification - the fundamental unit of UI-as-data.
//!
//! Shapes here mirror the wire format exactly (camelCase keys, `type`
//! discriminant). Everything is serializable: functions cannot be
//! embedded, so events reference handlers by name and visibility may
//! reference a named condition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ComponentSpec
// =============================================================================

/// A serializable description of one UI element and its subtree.
///
/// # Example
///
/// ```
/// use blueprint_tui::spec::ComponentSpec;
///
/// let spec: ComponentSpec = serde_json::from_str(r#"{
///     "type": "Box",
///     "children": [
///         { "type": "Text", "children": "hello" },
///         { "type": "Button", "events": { "onClick": "submit" } }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(spec.type_name, "Box");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Registry discriminant. Must be a non-empty registered type at
    /// resolve time; unknown types degrade to a placeholder node.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Optional identity, passed through to the produced view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Arbitrary keyed values forwarded to the produced view. A value
    /// that is itself an object with a string `type` field is treated
    /// as a nested spec and resolved before dispatch.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,

    /// Child content: a nested spec, a mixed list, or a plain scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<SpecChildren>,

    /// When false (or a condition evaluating false), this node and its
    /// entire subtree are pruned from output, not merely hidden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<VisibleWhen>,

    /// Event name -> handler reference. References are resolved against
    /// the host handler table; unresolved names bind a no-op.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, String>,

    /// Opaque passthrough metadata (`data-*` style).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_attributes: BTreeMap<String, String>,

    /// Accessibility hints: role marker, explicit tab index, label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a11y: Option<A11ySpec>,
}

impl ComponentSpec {
    /// Create a spec with only a type set.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// The a11y role marker, if declared.
    pub fn role(&self) -> Option<&str> {
        self.a11y.as_ref().and_then(|a| a.role.as_deref())
    }

    /// The explicit tab index, if declared.
    pub fn tab_index(&self) -> Option<i32> {
        self.a11y.as_ref().and_then(|a| a.tab_index)
    }
}

// =============================================================================
// Document Wrapper
// =============================================================================

/// A full UI document: a root spec plus optional theming.
///
/// The wire format accepts either shape - a bare [`ComponentSpec`] or
/// this wrapper; see [`parse_document`](super::parser::parse_document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UISpecification {
    pub root: ComponentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<crate::theme::Theme>,
}

impl From<ComponentSpec> for UISpecification {
    fn from(root: ComponentSpec) -> Self {
        Self { root, theme: None }
    }
}

// =============================================================================
// Children
// =============================================================================

/// The `children` field: one spec, a mixed list, or a scalar literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecChildren {
    /// A single nested spec.
    One(Box<ComponentSpec>),
    /// A list of specs and/or literals, order-preserving.
    Many(Vec<SpecChild>),
    /// Literal text content.
    Text(String),
    /// Literal numeric content.
    Number(f64),
    /// Literal boolean content.
    Bool(bool),
}

/// One entry of a children list.
///
/// `Other` catches JSON that is neither a spec nor a literal (for
/// example an object without a `type` field); the resolver reports it
/// as a malformed child instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecChild {
    Spec(ComponentSpec),
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
    Other(Value),
}

// =============================================================================
// Visibility
// =============================================================================

/// The `visible` field: a literal boolean or a named condition.
///
/// Conditions keep specs serializable: the name is looked up in the
/// host condition table at resolve time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisibleWhen {
    Static(bool),
    Condition(String),
}

// =============================================================================
// Accessibility
// =============================================================================

/// Accessibility hints carried on a spec.
///
/// `role` doubles as the member-discovery marker for roving focus
/// groups; `tab_index` feeds the focusable predicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A11ySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_spec() {
        let spec: ComponentSpec = serde_json::from_value(json!({ "type": "Box" })).unwrap();
        assert_eq!(spec.type_name, "Box");
        assert!(spec.props.is_empty());
        assert!(spec.children.is_none());
    }

    #[test]
    fn test_children_variants() {
        let one: ComponentSpec =
            serde_json::from_value(json!({ "type": "Box", "children": { "type": "Text" } }))
                .unwrap();
        assert!(matches!(one.children, Some(SpecChildren::One(_))));

        let text: ComponentSpec =
            serde_json::from_value(json!({ "type": "Text", "children": "hello" })).unwrap();
        assert!(matches!(text.children, Some(SpecChildren::Text(_))));

        let many: ComponentSpec = serde_json::from_value(json!({
            "type": "Box",
            "children": [{ "type": "Text" }, "literal", 42, null]
        }))
        .unwrap();
        let Some(SpecChildren::Many(children)) = many.children else {
            panic!("expected list children");
        };
        assert_eq!(children.len(), 4);
        assert!(matches!(children[0], SpecChild::Spec(_)));
        assert!(matches!(children[1], SpecChild::Text(_)));
        assert!(matches!(children[2], SpecChild::Number(_)));
        assert!(matches!(children[3], SpecChild::Null));
    }

    #[test]
    fn test_malformed_child_parses_as_other() {
        let spec: ComponentSpec = serde_json::from_value(json!({
            "type": "Box",
            "children": [{ "notAType": true }]
        }))
        .unwrap();
        let Some(SpecChildren::Many(children)) = spec.children else {
            panic!("expected list children");
        };
        assert!(matches!(children[0], SpecChild::Other(_)));
    }

    #[test]
    fn test_visible_variants() {
        let hidden: ComponentSpec =
            serde_json::from_value(json!({ "type": "Box", "visible": false })).unwrap();
        assert_eq!(hidden.visible, Some(VisibleWhen::Static(false)));

        let conditional: ComponentSpec =
            serde_json::from_value(json!({ "type": "Box", "visible": "isAdmin" })).unwrap();
        assert_eq!(
            conditional.visible,
            Some(VisibleWhen::Condition("isAdmin".to_string()))
        );
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let original = json!({
            "type": "Button",
            "id": "save",
            "props": { "variant": "primary", "icon": { "type": "Icon", "props": { "name": "disk" } } },
            "children": "Save",
            "visible": true,
            "events": { "onClick": "saveDocument" },
            "dataAttributes": { "testid": "save-button" },
            "a11y": { "role": "button", "tabIndex": 0, "label": "Save document" }
        });

        let spec: ComponentSpec = serde_json::from_value(original.clone()).unwrap();
        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_accessors() {
        let spec: ComponentSpec = serde_json::from_value(json!({
            "type": "Item",
            "a11y": { "role": "menuitem", "tabIndex": -1 }
        }))
        .unwrap();
        assert_eq!(spec.role(), Some("menuitem"));
        assert_eq!(spec.tab_index(), Some(-1));

        let bare = ComponentSpec::new("Box");
        assert_eq!(bare.role(), None);
        assert_eq!(bare.tab_index(), None);
    }
}
