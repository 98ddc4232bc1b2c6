//! View nodes - the resolved output tree.
//!
//! The resolver turns specification trees into [`ViewNode`] trees:
//! elements with fully materialized props, bound handlers, and resolved
//! children, or plain text for literal content. By the time a node
//! exists here, nothing in it references the spec layer anymore - no
//! raw handler strings, no unresolved nested specs.

use std::collections::BTreeMap;

use serde_json::Value;

use super::handlers::EventHandler;
use crate::types::NodeFlags;

// =============================================================================
// Resolved Props
// =============================================================================

/// A resolved prop value: plain JSON data, or a nested view node that
/// was itself a spec before resolution (e.g. an `icon` prop).
#[derive(Debug, Clone)]
pub enum ResolvedProp {
    Value(Value),
    Node(Box<ViewNode>),
}

impl ResolvedProp {
    /// The plain JSON value, if this prop is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Node(_) => None,
        }
    }

    /// The nested view node, if this prop resolved from a spec.
    pub fn as_node(&self) -> Option<&ViewNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Value(_) => None,
        }
    }
}

// =============================================================================
// View Element
// =============================================================================

/// A resolved UI element.
#[derive(Debug, Clone, Default)]
pub struct ViewElement {
    /// The component type this element was dispatched as.
    pub tag: String,
    pub id: Option<String>,
    pub props: BTreeMap<String, ResolvedProp>,
    /// Resolved children in declared order.
    pub children: Vec<ViewNode>,
    /// Bound event handlers keyed by event name.
    pub handlers: BTreeMap<String, EventHandler>,
    /// Passthrough data attributes.
    pub data: BTreeMap<String, String>,
    pub flags: NodeFlags,
    pub tab_index: Option<i32>,
    /// Accessibility role; also the roving-group member marker.
    pub role: Option<String>,
}

impl ViewElement {
    /// Create an element with only a tag set.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// View Node
// =============================================================================

/// One node of the resolved output tree.
#[derive(Debug, Clone)]
pub enum ViewNode {
    Element(ViewElement),
    /// Literal content emitted as-is (string/number/bool children).
    Text(String),
}

impl ViewNode {
    /// Create a literal text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// The diagnostic placeholder substituted for an unresolvable node.
    ///
    /// Carries the offending type in a data attribute and a readable
    /// message as its content, so partially rendered trees stay
    /// debuggable without breaking sibling layout.
    pub fn placeholder(type_name: &str) -> Self {
        let mut element = ViewElement::new("Unknown");
        element
            .data
            .insert("placeholderFor".to_string(), type_name.to_string());
        element
            .children
            .push(Self::text(format!("Unknown component type: {}", type_name)));
        Self::Element(element)
    }

    pub fn as_element(&self) -> Option<&ViewElement> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content),
            Self::Element(_) => None,
        }
    }

    /// Whether this node is the diagnostic placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.as_element()
            .is_some_and(|e| e.tag == "Unknown" && e.data.contains_key("placeholderFor"))
    }
}

// =============================================================================
// Tests
// =============================================================================
