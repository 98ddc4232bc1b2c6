//! Structural Primitives - the built-in component factories.
//!
//! The visual component catalogue lives outside this crate; what ships
//! here is the minimum set of structural factories needed to express
//! real trees: `Box` (container), `Text` (content), `Button`
//! (interactive), `Input` (interactive and editable).
//!
//! Factories translate spec-level behavior props (`focusable`,
//! `disabled`, `hidden`, a11y role and tab index) into the node flags
//! the focus machinery reads; everything else passes through as
//! resolved props for the host renderer.

use crate::engine::registry::{ComponentRegistry, FactoryInputs};
use crate::engine::resolver::ResolveContext;
use crate::engine::view::{ResolvedProp, ViewElement, ViewNode};
use crate::types::{DiagnosticKind, NodeFlags};

// =============================================================================
// Registration
// =============================================================================

/// Register the built-in structural factories.
///
/// Hosts can override any of them afterwards; last registration wins.
pub fn register_builtins(registry: &mut ComponentRegistry) {
    registry.register("Box", |inputs, ctx| {
        ViewNode::Element(base_element(inputs, ctx, NodeFlags::NONE))
    });
    registry.register("Text", |inputs, ctx| {
        ViewNode::Element(base_element(inputs, ctx, NodeFlags::NONE))
    });
    registry.register("Button", |inputs, ctx| {
        ViewNode::Element(base_element(inputs, ctx, NodeFlags::FOCUSABLE))
    });
    registry.register("Input", |inputs, ctx| {
        ViewNode::Element(base_element(
            inputs,
            ctx,
            NodeFlags::FOCUSABLE | NodeFlags::EDITABLE,
        ))
    });
}

// =============================================================================
// Shared Element Construction
// =============================================================================

/// Build an element from resolved inputs, combining the factory's
/// intrinsic flags with spec-level behavior props.
fn base_element(
    inputs: FactoryInputs<'_>,
    ctx: &ResolveContext<'_>,
    intrinsic: NodeFlags,
) -> ViewElement {
    let spec = inputs.spec;
    let mut element = ViewElement::new(spec.type_name.clone());
    element.id = spec.id.clone();
    element.children = inputs.children;
    element.handlers = inputs.handlers;
    element.data = spec.data_attributes.clone();
    element.role = spec.role().map(str::to_string);
    element.tab_index = spec.tab_index();

    let mut flags = intrinsic;
    if prop_bool(&inputs.props, "focusable") {
        flags |= NodeFlags::FOCUSABLE;
    }
    if prop_bool(&inputs.props, "disabled") {
        flags |= NodeFlags::DISABLED;
    }
    let a11y_hidden = spec.a11y.as_ref().and_then(|a| a.hidden) == Some(true);
    if prop_bool(&inputs.props, "hidden") || a11y_hidden {
        flags |= NodeFlags::HIDDEN;
    }
    element.flags = flags;

    element.props = inputs.props;

    // A semantic `layer` prop resolves through the stacking cascade to
    // a concrete `zIndex` for the host renderer.
    if let Some(layer) = element
        .props
        .get("layer")
        .and_then(ResolvedProp::as_value)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
    {
        let value = crate::theme::z_index(ctx.theme, &layer);
        if !crate::theme::is_valid_z_index(value) {
            let at = spec.id.as_deref().unwrap_or(&spec.type_name);
            ctx.report(DiagnosticKind::InvalidZIndex { value }, at);
        }
        element
            .props
            .insert("zIndex".to_string(), ResolvedProp::Value(value.into()));
    }

    element
}

fn prop_bool(props: &std::collections::BTreeMap<String, ResolvedProp>, key: &str) -> bool {
    props
        .get(key)
        .and_then(ResolvedProp::as_value)
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{resolve, ConditionTable, HandlerTable, ResolveContext};
    use crate::spec::spec_from_value;
    use serde_json::json;

    fn resolve_builtin(value: serde_json::Value) -> ViewNode {
        let registry = ComponentRegistry::with_builtins();
        let handlers = HandlerTable::new();
        let conditions = ConditionTable::new();
        let ctx = ResolveContext::new(&registry, &handlers, &conditions);
        let spec = spec_from_value(value).unwrap();
        resolve(&spec, &ctx).unwrap()
    }

    #[test]
    fn test_box_is_plain_container() {
        let node = resolve_builtin(json!({ "type": "Box", "children": "inside" }));
        let element = node.as_element().unwrap();
        assert_eq!(element.tag, "Box");
        assert_eq!(element.flags, NodeFlags::NONE);
        assert_eq!(element.children[0].as_text(), Some("inside"));
    }

    #[test]
    fn test_button_is_focusable() {
        let node = resolve_builtin(json!({ "type": "Button", "children": "Save" }));
        let element = node.as_element().unwrap();
        assert!(element.flags.contains(NodeFlags::FOCUSABLE));
        assert!(!element.flags.contains(NodeFlags::EDITABLE));
    }

    #[test]
    fn test_input_is_editable() {
        let node = resolve_builtin(json!({ "type": "Input" }));
        let element = node.as_element().unwrap();
        assert!(element.flags.contains(NodeFlags::FOCUSABLE));
        assert!(element.flags.contains(NodeFlags::EDITABLE));
    }

    #[test]
    fn test_behavior_props_become_flags() {
        let node = resolve_builtin(json!({
            "type": "Box",
            "props": { "focusable": true, "disabled": true }
        }));
        let element = node.as_element().unwrap();
        assert!(element.flags.contains(NodeFlags::FOCUSABLE));
        assert!(element.flags.contains(NodeFlags::DISABLED));
    }

    #[test]
    fn test_a11y_fields_carried() {
        let node = resolve_builtin(json!({
            "type": "Button",
            "a11y": { "role": "menuitem", "tabIndex": -1, "hidden": true }
        }));
        let element = node.as_element().unwrap();
        assert_eq!(element.role.as_deref(), Some("menuitem"));
        assert_eq!(element.tab_index, Some(-1));
        assert!(element.flags.contains(NodeFlags::HIDDEN));
    }

    #[test]
    fn test_layer_prop_resolves_z_index() {
        let node = resolve_builtin(json!({
            "type": "Box",
            "props": { "layer": "modal" }
        }));
        let element = node.as_element().unwrap();
        assert_eq!(
            element.props.get("zIndex").unwrap().as_value(),
            Some(&json!(50))
        );
    }

    #[test]
    fn test_layer_prop_honors_theme_override() {
        let registry = ComponentRegistry::with_builtins();
        let handlers = HandlerTable::new();
        let conditions = ConditionTable::new();
        let theme = crate::theme::Theme::new().with_z_index("modal", 99_999);
        let ctx = ResolveContext::new(&registry, &handlers, &conditions).with_theme(&theme);

        let spec = spec_from_value(json!({
            "type": "Box",
            "props": { "layer": "modal" }
        }))
        .unwrap();
        let node = resolve(&spec, &ctx).unwrap();

        // The out-of-range value is still used; the check is advisory.
        let element = node.as_element().unwrap();
        assert_eq!(
            element.props.get("zIndex").unwrap().as_value(),
            Some(&json!(99_999))
        );
        let diagnostics = ctx.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0].kind,
            crate::types::DiagnosticKind::InvalidZIndex { value: 99_999 }
        ));
    }

    #[test]
    fn test_data_attributes_pass_through() {
        let node = resolve_builtin(json!({
            "type": "Box",
            "id": "panel",
            "dataAttributes": { "testid": "panel-1" }
        }));
        let element = node.as_element().unwrap();
        assert_eq!(element.id.as_deref(), Some("panel"));
        assert_eq!(element.data.get("testid").unwrap(), "panel-1");
    }
}
