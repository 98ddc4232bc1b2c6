//! Specification parsing and validation.
//!
//! Parsing is strict about JSON shape but tolerant about content:
//! unknown types, unresolved handler names, and malformed list children
//! all survive parsing and are handled per-node at resolve time.
//! Validation walks the whole tree and reports every problem it finds
//! rather than stopping at the first.

use serde_json::Value;

use super::model::{ComponentSpec, SpecChild, SpecChildren, UISpecification};
use crate::types::ParseError;

// =============================================================================
// Parsing
// =============================================================================

/// Parse a specification from a JSON string.
///
/// The root must be an object with a non-empty `type`. Deeper shape
/// problems are left to [`validate_spec`] and resolve-time fault
/// isolation.
pub fn parse_spec(input: &str) -> Result<ComponentSpec, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    spec_from_value(value)
}

/// Build a specification from an already-parsed JSON value.
pub fn spec_from_value(value: Value) -> Result<ComponentSpec, ParseError> {
    if !value.is_object() {
        return Err(ParseError::InvalidShape);
    }
    let spec: ComponentSpec = serde_json::from_value(value)?;
    if spec.type_name.is_empty() {
        return Err(ParseError::EmptyType {
            path: "root".to_string(),
        });
    }
    Ok(spec)
}

/// Parse a full document: either a `{ root, theme }` wrapper or a bare
/// component spec (which becomes a themeless document).
pub fn parse_document(input: &str) -> Result<UISpecification, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let is_wrapper = value
        .as_object()
        .is_some_and(|object| object.contains_key("root"));
    if is_wrapper {
        let document: UISpecification = serde_json::from_value(value)?;
        if document.root.type_name.is_empty() {
            return Err(ParseError::EmptyType {
                path: "root".to_string(),
            });
        }
        Ok(document)
    } else {
        Ok(spec_from_value(value)?.into())
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A shape problem found during whole-tree validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location in the tree, e.g. `root.children[1]`.
    pub path: String,
    pub message: String,
}

/// Walk the entire spec tree and collect every shape problem.
///
/// Checks: empty `type` discriminants (including nested prop specs),
/// empty event names or handler references, and list children that are
/// neither specs nor literals. Returns an empty list for a clean tree.
pub fn validate_spec(spec: &ComponentSpec) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    validate_node(spec, "root", &mut issues);
    issues
}

fn validate_node(spec: &ComponentSpec, path: &str, issues: &mut Vec<ValidationIssue>) {
    if spec.type_name.is_empty() {
        issues.push(ValidationIssue {
            path: path.to_string(),
            message: "component type is empty".to_string(),
        });
    }

    for (event, handler) in &spec.events {
        if event.is_empty() || handler.is_empty() {
            issues.push(ValidationIssue {
                path: format!("{}.events", path),
                message: format!("empty event wiring (\"{}\" -> \"{}\")", event, handler),
            });
        }
    }

    // Nested specs inside prop values participate in validation too.
    for (key, value) in &spec.props {
        if let Some(nested) = prop_as_spec(value) {
            validate_node(&nested, &format!("{}.props.{}", path, key), issues);
        }
    }

    match &spec.children {
        None => {}
        Some(SpecChildren::One(child)) => {
            validate_node(child, &format!("{}.children", path), issues);
        }
        Some(SpecChildren::Many(children)) => {
            for (i, child) in children.iter().enumerate() {
                let child_path = format!("{}.children[{}]", path, i);
                match child {
                    SpecChild::Spec(spec) => validate_node(spec, &child_path, issues),
                    SpecChild::Other(_) => issues.push(ValidationIssue {
                        path: child_path,
                        message: "child is neither a spec nor a literal".to_string(),
                    }),
                    _ => {}
                }
            }
        }
        Some(SpecChildren::Text(_) | SpecChildren::Number(_) | SpecChildren::Bool(_)) => {}
    }
}

/// Interpret a prop value as a nested spec, if it has that shape.
///
/// The convention: any JSON object with a string `type` field is a
/// nested spec. Other objects are plain data and pass through untouched.
pub fn prop_as_spec(value: &Value) -> Option<ComponentSpec> {
    let object = value.as_object()?;
    if !object.get("type").is_some_and(|t| t.is_string()) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid() {
        let spec = parse_spec(r#"{ "type": "Box", "children": "hi" }"#).unwrap();
        assert_eq!(spec.type_name, "Box");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_spec("{ not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_non_object_root() {
        let err = spec_from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ParseError::InvalidShape));
    }

    #[test]
    fn test_parse_empty_type() {
        let err = spec_from_value(json!({ "type": "" })).unwrap_err();
        assert!(matches!(err, ParseError::EmptyType { .. }));
    }

    #[test]
    fn test_validate_clean_tree() {
        let spec = spec_from_value(json!({
            "type": "Box",
            "children": [{ "type": "Text", "children": "ok" }, "literal"]
        }))
        .unwrap();
        assert!(validate_spec(&spec).is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let spec: ComponentSpec = serde_json::from_value(json!({
            "type": "Box",
            "events": { "onClick": "" },
            "children": [
                { "type": "", "children": "x" },
                { "missing": "type" }
            ]
        }))
        .unwrap();

        let issues = validate_spec(&spec);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].path, "root.events");
        assert_eq!(issues[1].path, "root.children[0]");
        assert_eq!(issues[2].path, "root.children[1]");
    }

    #[test]
    fn test_validate_nested_prop_spec() {
        let spec: ComponentSpec = serde_json::from_value(json!({
            "type": "Button",
            "props": { "icon": { "type": "", "props": {} } }
        }))
        .unwrap();

        let issues = validate_spec(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "root.props.icon");
    }

    #[test]
    fn test_parse_document_wrapper() {
        let document = parse_document(
            r#"{
                "root": { "type": "Box", "children": "hi" },
                "theme": { "zIndices": { "modal": 1200 } }
            }"#,
        )
        .unwrap();
        assert_eq!(document.root.type_name, "Box");
        assert_eq!(
            document.theme.unwrap().z_indices.get("modal").copied(),
            Some(1200)
        );
    }

    #[test]
    fn test_parse_document_bare_spec() {
        let document = parse_document(r#"{ "type": "Text", "children": "hi" }"#).unwrap();
        assert_eq!(document.root.type_name, "Text");
        assert!(document.theme.is_none());
    }

    #[test]
    fn test_prop_as_spec() {
        assert!(prop_as_spec(&json!({ "type": "Icon" })).is_some());
        assert!(prop_as_spec(&json!({ "type": 7 })).is_none());
        assert!(prop_as_spec(&json!({ "name": "disk" })).is_none());
        assert!(prop_as_spec(&json!("scalar")).is_none());
    }
}
