//! Event Handler Resolution - where data becomes behavior.
//!
//! Specifications are serializable, so they cannot carry closures;
//! events reference handlers by *name*. The host supplies a
//! [`HandlerTable`] (and a [`ConditionTable`] for `visible` conditions)
//! that is threaded through resolution as explicit context - never
//! implicit global state - so the same spec tree is deterministically
//! re-bindable against different tables.
//!
//! Resolution is best-effort: an unresolved name binds a no-op callable
//! and records a diagnostic instead of failing the node.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

// =============================================================================
// Event Handler
// =============================================================================

/// A bound, callable event handler.
///
/// Keeps its source name so diagnostics and tests can see what a
/// handler was resolved from. `Debug` prints the name, not the closure.
#[derive(Clone)]
pub struct EventHandler {
    name: Rc<str>,
    func: Rc<dyn Fn(&Value)>,
    resolved: bool,
}

impl EventHandler {
    /// Bind a handler function under a name.
    pub fn bound(name: impl Into<String>, func: Rc<dyn Fn(&Value)>) -> Self {
        Self {
            name: name.into().into(),
            func,
            resolved: true,
        }
    }

    /// A no-op handler standing in for an unresolved reference.
    pub fn noop(name: impl Into<String>) -> Self {
        Self {
            name: name.into().into(),
            func: Rc::new(|_| {}),
            resolved: false,
        }
    }

    /// The handler reference this was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the reference resolved to a real table entry.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Invoke the handler with an event payload.
    pub fn call(&self, payload: &Value) {
        (self.func)(payload);
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.resolved {
            write!(f, "EventHandler({})", self.name)
        } else {
            write!(f, "EventHandler({}, noop)", self.name)
        }
    }
}

// =============================================================================
// Handler Table
// =============================================================================

/// Host-supplied map from handler reference to callable.
///
/// # Example
///
/// ```
/// use blueprint_tui::engine::HandlerTable;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let clicks = Rc::new(Cell::new(0));
/// let clicks_in = clicks.clone();
///
/// let mut handlers = HandlerTable::new();
/// handlers.insert("saveDocument", move |_payload| {
///     clicks_in.set(clicks_in.get() + 1);
/// });
///
/// let handler = handlers.resolve("saveDocument").unwrap();
/// handler.call(&serde_json::Value::Null);
/// assert_eq!(clicks.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct HandlerTable {
    entries: HashMap<String, Rc<dyn Fn(&Value)>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a name. Last registration wins.
    pub fn insert(&mut self, name: impl Into<String>, func: impl Fn(&Value) + 'static) {
        self.entries.insert(name.into(), Rc::new(func));
    }

    /// Resolve a reference to a bound handler, if registered.
    pub fn resolve(&self, name: &str) -> Option<EventHandler> {
        self.entries
            .get(name)
            .map(|func| EventHandler::bound(name, func.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Condition Table
// =============================================================================

/// Host-supplied map from condition name to predicate.
///
/// Consumed by `visible` fields that reference a condition by name
/// instead of carrying a literal boolean.
#[derive(Clone, Default)]
pub struct ConditionTable {
    entries: HashMap<String, Rc<dyn Fn() -> bool>>,
}

impl ConditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under a name. Last registration wins.
    pub fn insert(&mut self, name: impl Into<String>, predicate: impl Fn() -> bool + 'static) {
        self.entries.insert(name.into(), Rc::new(predicate));
    }

    /// Evaluate a named condition, if registered.
    pub fn evaluate(&self, name: &str) -> Option<bool> {
        self.entries.get(name).map(|predicate| predicate())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl fmt::Debug for ConditionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionTable")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
