//! # blueprint-tui
//!
//! Specification-driven UI interpreter for terminal applications.
//!
//! A UI is described as data - a serializable tree of typed
//! [`ComponentSpec`](spec::ComponentSpec) nodes - and interpreted into
//! a live view tree. Event handlers and visibility conditions are
//! carried as names and bound against host-supplied tables at resolve
//! time, so the same spec renders deterministically against different
//! hosts.
//!
//! ## Architecture
//!
//! ```text
//! ComponentSpec -> Tree Resolver -> ViewNode tree -> mounted View Tree
//!                  (registry + handler table)        (focus machinery attaches here)
//! ```
//!
//! Resolution is fault-isolated per node: an unknown type or malformed
//! child becomes a diagnostic placeholder, never a failure of the whole
//! tree. The mounted tree carries the behavior flags (focusable,
//! disabled, hidden) that the two keyboard state machines read:
//! [`FocusTrap`](state::FocusTrap) for modal containment and
//! [`RovingFocusGroup`](state::RovingFocusGroup) for composite-widget
//! arrow navigation.
//!
//! ## Modules
//!
//! - [`spec`] - the serializable specification model and parser
//! - [`engine`] - registry dispatch, tree resolution, mounted storage
//! - [`primitives`] - built-in structural factories (Box, Text, ...)
//! - [`state`] - focus position, keyboard routing, trap and roving
//! - [`theme`] - the stacking (z-index) cascade
//! - [`pipeline`] - mount/run lifecycle

pub mod engine;
pub mod pipeline;
pub mod primitives;
pub mod spec;
pub mod state;
pub mod theme;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use spec::{
    parse_document, parse_spec, spec_from_value, validate_spec, A11ySpec, ComponentSpec,
    SpecChild, SpecChildren, UISpecification, ValidationIssue, VisibleWhen,
};

pub use engine::{
    resolve, resolve_child, ComponentFactory, ComponentRegistry, ConditionTable, EventHandler,
    FactoryInputs, HandlerTable, ResolveContext, ResolvedProp, ViewElement, ViewNode,
};

pub use primitives::register_builtins;

pub use state::{
    FocusCallbacks, FocusRequest, FocusTrap, FocusTrapOptions, InputEvent, KeyHandler,
    KeyState, KeyboardEvent, Modifiers, RovingFocusGroup, RovingOptions, ITEM_ROLES,
};

pub use theme::{
    default_z_index, is_valid_z_index, layer_names, z_index, z_index_relative, Theme,
    DEFAULT_LAYERS, MAX_Z_INDEX, MIN_Z_INDEX,
};

pub use pipeline::{mount, mount_document, run, tick, MountHandle};
