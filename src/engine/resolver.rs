//! Tree Resolver - the specification interpreter.
//!
//! Walks a specification tree depth-first and produces the resolved
//! view tree: conditional visibility prunes subtrees, children
//! normalize to a flat ordered list, event references bind against the
//! handler table, nested prop specs materialize, and every node
//! dispatches through the component registry.
//!
//! Fault isolation is per-node: a subtree that cannot resolve (unknown
//! type, malformed child) becomes a diagnostic placeholder in place,
//! and its siblings resolve normally. Malformed specifications are
//! expected input, not a programmer error - nothing here panics on bad
//! data.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

use super::handlers::{ConditionTable, EventHandler, HandlerTable};
use super::registry::{ComponentRegistry, FactoryInputs};
use super::view::{ResolvedProp, ViewNode};
use crate::spec::parser::prop_as_spec;
use crate::spec::{ComponentSpec, SpecChild, SpecChildren, VisibleWhen};
use crate::theme::Theme;
use crate::types::{Diagnostic, DiagnosticKind};

// =============================================================================
// Resolve Context
// =============================================================================

/// Everything resolution needs, threaded explicitly through the walk.
///
/// Holding the registry and the handler/condition tables as context
/// (instead of globals) keeps the same spec tree deterministically
/// re-bindable against different hosts - the pattern the whole
/// indirection exists for.
pub struct ResolveContext<'a> {
    pub registry: &'a ComponentRegistry,
    pub handlers: &'a HandlerTable,
    pub conditions: &'a ConditionTable,
    pub theme: Option<&'a Theme>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        registry: &'a ComponentRegistry,
        handlers: &'a HandlerTable,
        conditions: &'a ConditionTable,
    ) -> Self {
        Self {
            registry,
            handlers,
            conditions,
            theme: None,
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn with_theme(mut self, theme: &'a Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Record a recovered fault. Also emitted as a tracing warning.
    pub fn report(&self, kind: DiagnosticKind, path: &str) {
        let diag = Diagnostic::new(kind, path);
        tracing::warn!(path = diag.path.as_str(), "{}", diag.message);
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Drain the diagnostics accumulated so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics.borrow_mut())
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve a specification tree into a view tree.
///
/// Returns `None` when the root itself is pruned by visibility.
pub fn resolve(spec: &ComponentSpec, ctx: &ResolveContext<'_>) -> Option<ViewNode> {
    resolve_at(spec, ctx, "root")
}

/// Resolve a single child entry (spec or primitive literal).
///
/// Primitives become literal text with no further processing; nulls
/// resolve to nothing.
pub fn resolve_child(child: &SpecChild, ctx: &ResolveContext<'_>) -> Option<ViewNode> {
    let mut out = Vec::new();
    resolve_list_entry(child, ctx, "root", false, &mut out);
    out.into_iter().next()
}

fn resolve_at(spec: &ComponentSpec, ctx: &ResolveContext<'_>, path: &str) -> Option<ViewNode> {
    // Visibility short-circuits before anything else: a pruned node's
    // children are never visited.
    if !is_visible(spec, ctx, path) {
        return None;
    }

    let children = resolve_children(spec, ctx, path);
    let handlers = resolve_events(spec, ctx, path);
    let props = resolve_props(spec, ctx, path);

    let inputs = FactoryInputs {
        spec,
        props,
        children,
        handlers,
    };

    match ctx.registry.dispatch(inputs, ctx) {
        Ok(node) => Some(node),
        Err(_) => {
            ctx.report(
                DiagnosticKind::UnknownType {
                    type_name: spec.type_name.clone(),
                },
                path,
            );
            Some(ViewNode::placeholder(&spec.type_name))
        }
    }
}

fn is_visible(spec: &ComponentSpec, ctx: &ResolveContext<'_>, path: &str) -> bool {
    match &spec.visible {
        None => true,
        Some(VisibleWhen::Static(visible)) => *visible,
        Some(VisibleWhen::Condition(name)) => match ctx.conditions.evaluate(name) {
            Some(result) => result,
            None => {
                // Best-effort like handlers: a typo'd condition name
                // must not make the node vanish.
                ctx.report(
                    DiagnosticKind::UnresolvedCondition { name: name.clone() },
                    path,
                );
                true
            }
        },
    }
}

/// Normalize children to a flat ordered list of resolved nodes.
///
/// A single spec becomes a one-element list, nested arrays flatten one
/// level (their entries splice in as ordinary siblings), and nulls are
/// dropped. Declared sibling order is preserved exactly - consumers
/// rely on stable positional rendering.
fn resolve_children(
    spec: &ComponentSpec,
    ctx: &ResolveContext<'_>,
    path: &str,
) -> Vec<ViewNode> {
    let mut resolved = Vec::new();
    match &spec.children {
        None => {}
        Some(SpecChildren::One(child)) => {
            let child_path = format!("{}.children", path);
            resolved.extend(resolve_at(child, ctx, &child_path));
        }
        Some(SpecChildren::Text(content)) => resolved.push(ViewNode::text(content.clone())),
        Some(SpecChildren::Number(n)) => resolved.push(ViewNode::text(format_number(*n))),
        Some(SpecChildren::Bool(b)) => resolved.push(ViewNode::text(b.to_string())),
        Some(SpecChildren::Many(children)) => {
            for (i, child) in children.iter().enumerate() {
                let child_path = format!("{}.children[{}]", path, i);
                resolve_list_entry(child, ctx, &child_path, true, &mut resolved);
            }
        }
    }
    resolved
}

/// Resolve one children-list entry into zero or more siblings.
///
/// `allow_flatten` permits one level of nested-array flattening; the
/// entries of a flattened array resolve with it disabled, so a deeper
/// array is a malformed child rather than flattened further.
fn resolve_list_entry(
    child: &SpecChild,
    ctx: &ResolveContext<'_>,
    path: &str,
    allow_flatten: bool,
    out: &mut Vec<ViewNode>,
) {
    match child {
        SpecChild::Spec(spec) => out.extend(resolve_at(spec, ctx, path)),
        SpecChild::Text(content) => out.push(ViewNode::text(content.clone())),
        SpecChild::Number(n) => out.push(ViewNode::text(format_number(*n))),
        SpecChild::Bool(b) => out.push(ViewNode::text(b.to_string())),
        SpecChild::Null => {}
        SpecChild::Other(Value::Array(items)) if allow_flatten => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                match serde_json::from_value::<SpecChild>(item.clone()) {
                    Ok(entry) => resolve_list_entry(&entry, ctx, &item_path, false, out),
                    Err(_) => {
                        ctx.report(DiagnosticKind::MalformedChild, &item_path);
                        out.push(ViewNode::placeholder("malformed"));
                    }
                }
            }
        }
        SpecChild::Other(_) => {
            ctx.report(DiagnosticKind::MalformedChild, path);
            out.push(ViewNode::placeholder("malformed"));
        }
    }
}

/// Bind every event reference before dispatch, so the produced view
/// never sees raw strings. Unresolved names bind a no-op and record a
/// diagnostic - event wiring is best-effort.
fn resolve_events(
    spec: &ComponentSpec,
    ctx: &ResolveContext<'_>,
    path: &str,
) -> BTreeMap<String, EventHandler> {
    let mut handlers = BTreeMap::new();
    for (event, reference) in &spec.events {
        let handler = match ctx.handlers.resolve(reference) {
            Some(handler) => handler,
            None => {
                ctx.report(
                    DiagnosticKind::UnresolvedHandler {
                        name: reference.clone(),
                    },
                    &format!("{}.events.{}", path, event),
                );
                EventHandler::noop(reference.clone())
            }
        };
        handlers.insert(event.clone(), handler);
    }
    handlers
}

/// Materialize prop values; nested specs resolve depth-first so every
/// factory input is fully resolved.
fn resolve_props(
    spec: &ComponentSpec,
    ctx: &ResolveContext<'_>,
    path: &str,
) -> BTreeMap<String, ResolvedProp> {
    let mut props = BTreeMap::new();
    for (key, value) in &spec.props {
        let prop_path = format!("{}.props.{}", path, key);
        let resolved = match prop_as_spec(value) {
            Some(nested) => match resolve_at(&nested, ctx, &prop_path) {
                Some(node) => ResolvedProp::Node(Box::new(node)),
                // A pruned nested spec drops the prop entirely.
                None => continue,
            },
            None => ResolvedProp::Value(value.clone()),
        };
        props.insert(key.clone(), resolved);
    }
    props
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// =============================================================================
// Tests
// =============================================================================
