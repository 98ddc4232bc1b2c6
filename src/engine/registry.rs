//! Component Registry - type-string dispatch to view factories.
//!
//! Specifications select their implementation with a `type` string; the
//! registry maps that discriminant to a factory function. Dispatch is
//! total and safe: an unknown type comes back as an error value for the
//! caller to recover from (the resolver substitutes a placeholder),
//! never a panic and never a silent no-op.
//!
//! Registration order is irrelevant; the last registration for a type
//! wins, which is how hosts override built-in components.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::handlers::EventHandler;
use super::resolver::ResolveContext;
use super::view::{ResolvedProp, ViewNode};
use crate::spec::ComponentSpec;
use crate::types::ResolveError;

// =============================================================================
// Factory
// =============================================================================

/// Everything a factory receives: the originating spec plus its fully
/// materialized props, children, and bound handlers. No raw handler
/// strings or unresolved nested specs ever reach a factory.
pub struct FactoryInputs<'a> {
    pub spec: &'a ComponentSpec,
    pub props: BTreeMap<String, ResolvedProp>,
    pub children: Vec<ViewNode>,
    pub handlers: BTreeMap<String, EventHandler>,
}

/// A view factory: resolved inputs in, concrete view node out.
pub type ComponentFactory = Rc<dyn Fn(FactoryInputs<'_>, &ResolveContext<'_>) -> ViewNode>;

// =============================================================================
// Registry
// =============================================================================

/// The mapping from spec `type` strings to view factories.
///
/// # Example
///
/// ```
/// use blueprint_tui::engine::{ComponentRegistry, ViewElement, ViewNode};
///
/// let mut registry = ComponentRegistry::new();
/// registry.register("Divider", |_inputs, _ctx| {
///     ViewNode::Element(ViewElement::new("Divider"))
/// });
///
/// assert!(registry.contains("Divider"));
/// assert!(!registry.contains("Bogus"));
/// ```
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the structural primitives
    /// (Box, Text, Button, Input).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::primitives::register_builtins(&mut registry);
        registry
    }

    /// Register a factory for a type. Last registration wins.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: impl Fn(FactoryInputs<'_>, &ResolveContext<'_>) -> ViewNode + 'static,
    ) {
        self.factories.insert(type_name.into(), Rc::new(factory));
    }

    /// Whether a type has a registered factory.
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted for stable iteration.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Dispatch resolved inputs to the factory for their spec's type.
    ///
    /// An unregistered type returns [`ResolveError::UnknownType`]
    /// carrying the offending string; callers decide whether to render
    /// a placeholder or abort.
    pub fn dispatch(
        &self,
        inputs: FactoryInputs<'_>,
        ctx: &ResolveContext<'_>,
    ) -> Result<ViewNode, ResolveError> {
        match self.factories.get(&inputs.spec.type_name) {
            Some(factory) => Ok(factory(inputs, ctx)),
            None => Err(ResolveError::UnknownType {
                type_name: inputs.spec.type_name.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
