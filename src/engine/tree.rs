//! View Tree - mounted node storage.
//!
//! Resolved view nodes mount into thread-local indexed storage: every
//! node gets a stable index, parent/child links, and the behavior
//! fields the interaction state machines read (flags, tab index, role).
//! This is the surface that focus traps and roving groups attach to.
//!
//! Structural mutation (mount, insert, remove) bumps a generation
//! counter and notifies subscribers. Consumers treat each notification
//! as an atomic observation point: they recompute full snapshots rather
//! than patching incrementally, so no transient half-updated state is
//! ever observable.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde_json::Value;

use super::handlers::EventHandler;
use super::view::{ResolvedProp, ViewNode};
use crate::types::NodeFlags;

// =============================================================================
// Storage
// =============================================================================

struct NodeData {
    parent: Option<usize>,
    children: Vec<usize>,
    tag: String,
    /// Literal content for text nodes; `None` for elements.
    text: Option<String>,
    id: Option<String>,
    props: BTreeMap<String, ResolvedProp>,
    handlers: BTreeMap<String, EventHandler>,
    data: BTreeMap<String, String>,
    flags: NodeFlags,
    tab_index: Option<i32>,
    role: Option<String>,
}

thread_local! {
    static NODES: RefCell<Vec<Option<NodeData>>> = RefCell::new(Vec::new());
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());
    static ROOTS: RefCell<Vec<usize>> = RefCell::new(Vec::new());
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());
    static GENERATION: Cell<u64> = const { Cell::new(0) };
    static SUBSCRIBERS: RefCell<Vec<(usize, Rc<dyn Fn()>)>> = RefCell::new(Vec::new());
    static NEXT_SUBSCRIBER_ID: Cell<usize> = const { Cell::new(0) };
}

fn alloc(data: NodeData) -> usize {
    let index = FREE_INDICES.with(|free| free.borrow_mut().pop());
    match index {
        Some(index) => {
            NODES.with(|nodes| nodes.borrow_mut()[index] = Some(data));
            index
        }
        None => NODES.with(|nodes| {
            let mut nodes = nodes.borrow_mut();
            nodes.push(Some(data));
            nodes.len() - 1
        }),
    }
}

fn store_node(node: ViewNode, parent: Option<usize>) -> usize {
    match node {
        ViewNode::Text(content) => alloc(NodeData {
            parent,
            children: Vec::new(),
            tag: "#text".to_string(),
            text: Some(content),
            id: None,
            props: BTreeMap::new(),
            handlers: BTreeMap::new(),
            data: BTreeMap::new(),
            flags: NodeFlags::NONE,
            tab_index: None,
            role: None,
        }),
        ViewNode::Element(element) => {
            let index = alloc(NodeData {
                parent,
                children: Vec::new(),
                tag: element.tag,
                text: None,
                id: element.id.clone(),
                props: element.props,
                handlers: element.handlers,
                data: element.data,
                flags: element.flags,
                tab_index: element.tab_index,
                role: element.role,
            });
            if let Some(id) = element.id {
                ID_TO_INDEX.with(|map| map.borrow_mut().insert(id, index));
            }
            let children: Vec<usize> = element
                .children
                .into_iter()
                .map(|child| store_node(child, Some(index)))
                .collect();
            NODES.with(|nodes| {
                if let Some(data) = nodes.borrow_mut()[index].as_mut() {
                    data.children = children;
                }
            });
            index
        }
    }
}

// =============================================================================
// Structural Mutation
// =============================================================================

/// Mount a resolved view tree as a new root. Returns the root index.
pub fn mount(node: ViewNode) -> usize {
    let index = store_node(node, None);
    ROOTS.with(|roots| roots.borrow_mut().push(index));
    notify_structural_change();
    index
}

/// Insert a resolved subtree as a child at `position` (clamped).
///
/// Returns the new subtree's index, or `None` if the parent does not
/// exist or is a text node.
pub fn insert_child(parent: usize, position: usize, node: ViewNode) -> Option<usize> {
    let is_element = NODES.with(|nodes| {
        nodes
            .borrow()
            .get(parent)
            .and_then(|slot| slot.as_ref())
            .map(|data| data.text.is_none())
    });
    if is_element != Some(true) {
        return None;
    }

    let index = store_node(node, Some(parent));
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        if let Some(data) = nodes[parent].as_mut() {
            let position = position.min(data.children.len());
            data.children.insert(position, index);
        }
    });
    notify_structural_change();
    Some(index)
}

/// Insert a resolved subtree as the parent's last child.
pub fn append_child(parent: usize, node: ViewNode) -> Option<usize> {
    let position = NODES.with(|nodes| {
        nodes
            .borrow()
            .get(parent)
            .and_then(|slot| slot.as_ref())
            .map(|data| data.children.len())
    })?;
    insert_child(parent, position, node)
}

/// Remove a node and its entire subtree. Returns false if it was
/// already gone.
pub fn remove_node(index: usize) -> bool {
    if !exists(index) {
        return false;
    }

    // Detach from the parent's child list (or the root list).
    let parent = parent_of(index);
    match parent {
        Some(parent) => NODES.with(|nodes| {
            if let Some(data) = nodes.borrow_mut()[parent].as_mut() {
                data.children.retain(|&child| child != index);
            }
        }),
        None => ROOTS.with(|roots| roots.borrow_mut().retain(|&root| root != index)),
    }

    release_subtree(index);
    notify_structural_change();
    true
}

fn release_subtree(index: usize) {
    let (children, id) = NODES.with(|nodes| {
        let nodes = nodes.borrow();
        match nodes.get(index).and_then(|slot| slot.as_ref()) {
            Some(data) => (data.children.clone(), data.id.clone()),
            None => (Vec::new(), None),
        }
    });

    for child in children {
        release_subtree(child);
    }

    if let Some(id) = id {
        ID_TO_INDEX.with(|map| {
            let mut map = map.borrow_mut();
            if map.get(&id) == Some(&index) {
                map.remove(&id);
            }
        });
    }
    NODES.with(|nodes| nodes.borrow_mut()[index] = None);
    FREE_INDICES.with(|free| free.borrow_mut().push(index));
}

// =============================================================================
// Change Notification
// =============================================================================

/// The structural generation: bumped on every mount/insert/remove.
///
/// Consumers that cannot subscribe can compare generations to detect
/// that their snapshot went stale.
pub fn generation() -> u64 {
    GENERATION.with(|generation| generation.get())
}

/// Subscribe to structural changes. Returns a cleanup closure that
/// removes exactly this subscription.
pub fn on_structural_change(callback: impl Fn() + 'static) -> impl FnOnce() {
    let id = NEXT_SUBSCRIBER_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    SUBSCRIBERS.with(|subscribers| {
        subscribers.borrow_mut().push((id, Rc::new(callback)));
    });

    move || {
        SUBSCRIBERS.with(|subscribers| {
            subscribers
                .borrow_mut()
                .retain(|(subscriber_id, _)| *subscriber_id != id);
        });
    }
}

fn notify_structural_change() {
    GENERATION.with(|generation| generation.set(generation.get().wrapping_add(1)));
    // Snapshot the subscriber list so callbacks may subscribe or
    // unsubscribe without poisoning the borrow.
    let callbacks: Vec<Rc<dyn Fn()>> = SUBSCRIBERS.with(|subscribers| {
        subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    });
    for callback in callbacks {
        callback();
    }
}

// =============================================================================
// Accessors
// =============================================================================

/// Check whether an index refers to a mounted node.
pub fn exists(index: usize) -> bool {
    NODES.with(|nodes| {
        nodes
            .borrow()
            .get(index)
            .is_some_and(|slot| slot.is_some())
    })
}

fn read<T>(index: usize, f: impl FnOnce(&NodeData) -> T) -> Option<T> {
    NODES.with(|nodes| {
        nodes
            .borrow()
            .get(index)
            .and_then(|slot| slot.as_ref())
            .map(f)
    })
}

pub fn parent_of(index: usize) -> Option<usize> {
    read(index, |data| data.parent).flatten()
}

pub fn children_of(index: usize) -> Vec<usize> {
    read(index, |data| data.children.clone()).unwrap_or_default()
}

pub fn tag_of(index: usize) -> Option<String> {
    read(index, |data| data.tag.clone())
}

pub fn text_of(index: usize) -> Option<String> {
    read(index, |data| data.text.clone()).flatten()
}

pub fn id_of(index: usize) -> Option<String> {
    read(index, |data| data.id.clone()).flatten()
}

pub fn role_of(index: usize) -> Option<String> {
    read(index, |data| data.role.clone()).flatten()
}

pub fn data_attr(index: usize, key: &str) -> Option<String> {
    read(index, |data| data.data.get(key).cloned()).flatten()
}

pub fn prop_of(index: usize, key: &str) -> Option<ResolvedProp> {
    read(index, |data| data.props.get(key).cloned()).flatten()
}

pub fn flags_of(index: usize) -> NodeFlags {
    read(index, |data| data.flags).unwrap_or(NodeFlags::NONE)
}

/// Replace a node's flags. An attribute change, not a structural one:
/// no generation bump.
pub fn set_flags(index: usize, flags: NodeFlags) {
    NODES.with(|nodes| {
        if let Some(data) = nodes.borrow_mut().get_mut(index).and_then(Option::as_mut) {
            data.flags = flags;
        }
    });
}

pub fn tab_index_of(index: usize) -> Option<i32> {
    read(index, |data| data.tab_index).flatten()
}

/// Set or clear a node's tab index. Like flags, not structural.
pub fn set_tab_index(index: usize, tab_index: Option<i32>) {
    NODES.with(|nodes| {
        if let Some(data) = nodes.borrow_mut().get_mut(index).and_then(Option::as_mut) {
            data.tab_index = tab_index;
        }
    });
}

/// Look up a mounted node by the spec id it carried.
pub fn index_of_id(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Number of currently mounted nodes.
pub fn node_count() -> usize {
    NODES.with(|nodes| nodes.borrow().iter().filter(|slot| slot.is_some()).count())
}

// =============================================================================
// Visibility and Focusability
// =============================================================================

/// Visible ignoring ancestors (not HIDDEN, not ZERO_SIZE).
pub fn is_self_visible(index: usize) -> bool {
    exists(index)
        && !flags_of(index).intersects(NodeFlags::HIDDEN | NodeFlags::ZERO_SIZE)
}

/// Effectively visible: this node and every ancestor is visible.
pub fn is_visible(index: usize) -> bool {
    if !is_self_visible(index) {
        return false;
    }
    let mut current = parent_of(index);
    while let Some(ancestor) = current {
        if !is_self_visible(ancestor) {
            return false;
        }
        current = parent_of(ancestor);
    }
    true
}

/// The actionable-element predicate: can this node receive focus at
/// all? Natively interactive, editable, or carrying any explicit tab
/// index - and visible, not disabled.
pub fn is_focusable(index: usize) -> bool {
    if !is_visible(index) {
        return false;
    }
    let flags = flags_of(index);
    if flags.contains(NodeFlags::DISABLED) {
        return false;
    }
    flags.intersects(NodeFlags::FOCUSABLE | NodeFlags::EDITABLE) || tab_index_of(index).is_some()
}

/// Focusable and in the sequential tab order: a negative explicit tab
/// index keeps a node arrow-reachable but excludes it from Tab cycling.
pub fn is_tabbable(index: usize) -> bool {
    is_focusable(index) && tab_index_of(index).unwrap_or(0) >= 0
}

// =============================================================================
// Traversal
// =============================================================================

/// All descendants of a container in depth-first pre-order (document
/// order), excluding the container itself.
pub fn descendants_of(container: usize) -> Vec<usize> {
    let mut order = Vec::new();
    collect_descendants(container, &mut order);
    order
}

fn collect_descendants(index: usize, order: &mut Vec<usize>) {
    for child in children_of(index) {
        order.push(child);
        collect_descendants(child, order);
    }
}

/// Whether `index` sits inside `container`'s subtree (strictly below).
pub fn is_descendant_of(index: usize, container: usize) -> bool {
    let mut current = parent_of(index);
    while let Some(ancestor) = current {
        if ancestor == container {
            return true;
        }
        current = parent_of(ancestor);
    }
    false
}

/// Tab-cycling candidates inside a container, in document order with a
/// stable sort by explicit tab index.
pub fn tabbables_within(container: usize) -> Vec<usize> {
    let mut order: Vec<usize> = descendants_of(container)
        .into_iter()
        .filter(|&index| is_tabbable(index))
        .collect();
    order.sort_by_key(|&index| tab_index_of(index).unwrap_or(0));
    order
}

/// The whole sequential tab order across all mounted roots.
pub fn tab_order() -> Vec<usize> {
    let roots = ROOTS.with(|roots| roots.borrow().clone());
    let mut order = Vec::new();
    for root in roots {
        if is_tabbable(root) {
            order.push(root);
        }
        order.extend(
            descendants_of(root)
                .into_iter()
                .filter(|&index| is_tabbable(index)),
        );
    }
    order.sort_by_key(|&index| tab_index_of(index).unwrap_or(0));
    order
}

// =============================================================================
// Events
// =============================================================================

/// Invoke a mounted node's bound handler for an event.
///
/// Returns true if a handler entry existed (even a no-op binding);
/// false for unmounted nodes or unwired events.
pub fn fire_event(index: usize, event: &str, payload: &Value) -> bool {
    let handler = read(index, |data| data.handlers.get(event).cloned()).flatten();
    match handler {
        Some(handler) => {
            handler.call(payload);
            true
        }
        None => false,
    }
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all tree state (for testing).
pub fn reset_tree() {
    NODES.with(|nodes| nodes.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    ROOTS.with(|roots| roots.borrow_mut().clear());
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    GENERATION.with(|generation| generation.set(0));
    SUBSCRIBERS.with(|subscribers| subscribers.borrow_mut().clear());
    NEXT_SUBSCRIBER_ID.with(|next| next.set(0));
}

// =============================================================================
// Tests
// =============================================================================
