//! Core types for blueprint-tui.
//!
//! These types are the shared vocabulary of the crate: node behavior
//! flags, navigation configuration, and the diagnostic/error taxonomy
//! that the resolver and state machines report through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Node Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Behavior flags carried by every mounted view node.
    ///
    /// Combine with bitwise OR: `NodeFlags::FOCUSABLE | NodeFlags::DISABLED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE = 0;
        /// Natively interactive (button, input, link, ...).
        const FOCUSABLE = 1 << 0;
        /// Interactive but currently disabled; excluded from focus.
        const DISABLED = 1 << 1;
        /// Editable content region; focusable even without FOCUSABLE.
        const EDITABLE = 1 << 2;
        /// Hidden via styling; excluded from focus but still mounted.
        const HIDDEN = 1 << 3;
        /// Collapsed to zero size; excluded from focus like HIDDEN.
        const ZERO_SIZE = 1 << 4;
    }
}

// =============================================================================
// Navigation Configuration
// =============================================================================

/// Which arrow keys a roving focus group responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left/Right arrows navigate.
    Horizontal,
    /// Up/Down arrows navigate.
    #[default]
    Vertical,
    /// All four arrows navigate.
    Both,
}

/// Reading direction; inverts Left/Right semantics when `Rtl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Check if this is right-to-left.
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

// =============================================================================
// Diagnostics - recovered faults, surfaced but never fatal
// =============================================================================

/// Category of a recovered fault.
///
/// Every variant is recovered locally (placeholder node, no-op handler,
/// advisory warning); none of them aborts resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A spec's `type` has no registry entry.
    UnknownType { type_name: String },
    /// An event reference has no entry in the handler table.
    UnresolvedHandler { name: String },
    /// A `visible` condition name has no entry in the condition table.
    UnresolvedCondition { name: String },
    /// A z-index value fell outside the sane stacking range.
    InvalidZIndex { value: i32 },
    /// A child entry could not be interpreted as spec or literal.
    MalformedChild,
}

/// A recovered fault, tagged with where in the tree it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Location in the spec tree, e.g. `root.children[2].props.icon`.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with a formatted message for its kind.
    pub fn new(kind: DiagnosticKind, path: impl Into<String>) -> Self {
        let path = path.into();
        let message = match &kind {
            DiagnosticKind::UnknownType { type_name } => {
                format!("unknown component type \"{}\"", type_name)
            }
            DiagnosticKind::UnresolvedHandler { name } => {
                format!("no handler registered for \"{}\"", name)
            }
            DiagnosticKind::UnresolvedCondition { name } => {
                format!("no condition registered for \"{}\"", name)
            }
            DiagnosticKind::InvalidZIndex { value } => {
                format!("z-index {} outside sane range", value)
            }
            DiagnosticKind::MalformedChild => "child is neither a spec nor a literal".to_string(),
        };
        Self { kind, path, message }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Dispatch failure signalled by the component registry.
///
/// Carried as a value so callers decide whether to substitute a
/// placeholder or abort; the registry itself never panics on a bad type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown component type \"{type_name}\"")]
    UnknownType { type_name: String },
}

/// Specification parsing/validation failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("specification root must be an object with a \"type\" field")]
    InvalidShape,
    #[error("empty component type at {path}")]
    EmptyType { path: String },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_flags_combine() {
        let flags = NodeFlags::FOCUSABLE | NodeFlags::DISABLED;
        assert!(flags.contains(NodeFlags::FOCUSABLE));
        assert!(flags.contains(NodeFlags::DISABLED));
        assert!(!flags.contains(NodeFlags::HIDDEN));
    }

    #[test]
    fn test_orientation_default() {
        assert_eq!(Orientation::default(), Orientation::Vertical);
    }

    #[test]
    fn test_orientation_serde() {
        let json = serde_json::to_string(&Orientation::Horizontal).unwrap();
        assert_eq!(json, "\"horizontal\"");
        let back: Orientation = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(back, Orientation::Both);
    }

    #[test]
    fn test_text_direction() {
        assert!(!TextDirection::Ltr.is_rtl());
        assert!(TextDirection::Rtl.is_rtl());
        assert_eq!(TextDirection::default(), TextDirection::Ltr);
    }

    #[test]
    fn test_diagnostic_message() {
        let diag = Diagnostic::new(
            DiagnosticKind::UnknownType {
                type_name: "Bogus".to_string(),
            },
            "root.children[0]",
        );
        assert!(diag.message.contains("Bogus"));
        assert_eq!(diag.path, "root.children[0]");
    }

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::UnknownType {
            type_name: "Widget".to_string(),
        };
        assert_eq!(err.to_string(), "unknown component type \"Widget\"");
    }
}
