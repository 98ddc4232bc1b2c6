//! Focus System - the shared focus position and navigation over it.
//!
//! The currently focused node is process-wide, single-owner state: a
//! thread-local signal holding at most one mounted node index. On top
//! of it sit:
//! - focus/blur callbacks per node
//! - sequential Tab navigation over the tree's tab order (with wrap)
//! - a deferred-focus queue for focus moves that must wait one
//!   event-loop tick (the focus trap's initial focus rides on this)
//! - a focus-request signal carrying the `prevent_scroll` option for
//!   hosts that scroll on focus
//!
//! # Example
//!
//! ```ignore
//! use blueprint_tui::state::focus;
//!
//! focus::focus_next();      // Tab
//! focus::focus_previous();  // Shift+Tab
//! focus::focus(index);      // focus a specific node
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use spark_signals::{signal, Signal};

use crate::engine::tree;

// =============================================================================
// Focused Node Signal
// =============================================================================

thread_local! {
    static FOCUSED: Signal<Option<usize>> = signal(None);
}

/// The currently focused node, if any.
pub fn focused() -> Option<usize> {
    FOCUSED.with(|s| s.get())
}

/// Check if any node is focused.
pub fn has_focus() -> bool {
    focused().is_some()
}

/// Check if a specific node is focused.
pub fn is_focused(index: usize) -> bool {
    focused() == Some(index)
}

// =============================================================================
// Focus Requests
// =============================================================================

/// A completed focus move, published for hosts that react to focus
/// (e.g. scrolling the target into view unless `prevent_scroll`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub index: usize,
    pub prevent_scroll: bool,
}

thread_local! {
    static LAST_REQUEST: Signal<Option<FocusRequest>> = signal(None);
}

/// The most recent focus move, if any.
pub fn last_focus_request() -> Option<FocusRequest> {
    LAST_REQUEST.with(|s| s.get())
}

// =============================================================================
// Focus Callbacks
// =============================================================================

/// Callbacks fired when a node gains or loses focus.
#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Box<dyn Fn()>>,
    pub on_blur: Option<Box<dyn Fn()>>,
}

thread_local! {
    static CALLBACKS: RefCell<HashMap<usize, Vec<(usize, FocusCallbacks)>>> =
        RefCell::new(HashMap::new());
    static NEXT_CALLBACK_ID: Cell<usize> = const { Cell::new(0) };
}

/// Register focus callbacks for a node.
/// Returns a cleanup function that unregisters exactly them.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let id = NEXT_CALLBACK_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    CALLBACKS.with(|map| {
        map.borrow_mut()
            .entry(index)
            .or_default()
            .push((id, callbacks));
    });

    move || {
        CALLBACKS.with(|map| {
            let mut map = map.borrow_mut();
            if let Some(list) = map.get_mut(&index) {
                list.retain(|(callback_id, _)| *callback_id != id);
                if list.is_empty() {
                    map.remove(&index);
                }
            }
        });
    }
}

/// Set focus and fire blur/focus callbacks at the source.
fn set_focus_with_callbacks(new: Option<usize>, prevent_scroll: bool) {
    let old = focused();
    if old == new {
        return;
    }

    if let Some(old) = old {
        CALLBACKS.with(|map| {
            let map = map.borrow();
            if let Some(list) = map.get(&old) {
                for (_, callbacks) in list {
                    if let Some(on_blur) = &callbacks.on_blur {
                        on_blur();
                    }
                }
            }
        });
    }

    FOCUSED.with(|s| s.set(new));
    if let Some(index) = new {
        LAST_REQUEST.with(|s| {
            s.set(Some(FocusRequest {
                index,
                prevent_scroll,
            }))
        });
        CALLBACKS.with(|map| {
            let map = map.borrow();
            if let Some(list) = map.get(&index) {
                for (_, callbacks) in list {
                    if let Some(on_focus) = &callbacks.on_focus {
                        on_focus();
                    }
                }
            }
        });
    }
}

// =============================================================================
// Focus Operations
// =============================================================================

/// Focus a specific node. Returns false if it is not focusable.
pub fn focus(index: usize) -> bool {
    focus_with_options(index, false)
}

/// Focus a specific node, carrying the prevent-scroll option through
/// to the focus-request signal.
pub fn focus_with_options(index: usize, prevent_scroll: bool) -> bool {
    if !tree::is_focusable(index) {
        return false;
    }
    set_focus_with_callbacks(Some(index), prevent_scroll);
    true
}

/// Clear focus (no node focused).
pub fn blur() {
    set_focus_with_callbacks(None, false);
}

fn step(direction: isize) -> bool {
    let order = tree::tab_order();
    if order.is_empty() {
        return false;
    }

    let current = focused().and_then(|index| order.iter().position(|&i| i == index));
    let next = match current {
        // Not on a tab stop: enter the order at the end matching the
        // direction of travel.
        None => {
            if direction > 0 {
                order[0]
            } else {
                order[order.len() - 1]
            }
        }
        Some(position) => {
            let len = order.len() as isize;
            let next = (position as isize + direction).rem_euclid(len);
            order[next as usize]
        }
    };

    if Some(next) == focused() {
        return false;
    }
    focus(next)
}

/// Move focus to the next node in tab order (wraps).
pub fn focus_next() -> bool {
    step(1)
}

/// Move focus to the previous node in tab order (wraps).
pub fn focus_previous() -> bool {
    step(-1)
}

/// Focus the first node in tab order.
pub fn focus_first() -> bool {
    match tree::tab_order().first() {
        Some(&index) => focus(index),
        None => false,
    }
}

/// Focus the last node in tab order.
pub fn focus_last() -> bool {
    match tree::tab_order().last() {
        Some(&index) => focus(index),
        None => false,
    }
}

// =============================================================================
// Deferred Focus
// =============================================================================

// Focus moves that must wait one scheduling tick (so the target
// container finishes structural setup first). Each entry is
// cancellable until the flush.

thread_local! {
    static DEFERRED: RefCell<Vec<(u64, FocusRequest)>> = RefCell::new(Vec::new());
    static NEXT_TICKET: Cell<u64> = const { Cell::new(0) };
}

/// Queue a focus move for the next tick. Returns a ticket for
/// cancellation.
pub fn defer_focus(index: usize, prevent_scroll: bool) -> u64 {
    let ticket = NEXT_TICKET.with(|next| {
        let ticket = next.get();
        next.set(ticket + 1);
        ticket
    });
    DEFERRED.with(|deferred| {
        deferred.borrow_mut().push((
            ticket,
            FocusRequest {
                index,
                prevent_scroll,
            },
        ));
    });
    ticket
}

/// Cancel a queued focus move. Returns false if it already flushed.
pub fn cancel_deferred(ticket: u64) -> bool {
    DEFERRED.with(|deferred| {
        let mut deferred = deferred.borrow_mut();
        let before = deferred.len();
        deferred.retain(|(t, _)| *t != ticket);
        deferred.len() != before
    })
}

/// Execute all queued focus moves, in queue order.
///
/// Called once per event-loop tick. Targets that became unfocusable
/// (or were unmounted) since queueing are skipped silently.
pub fn flush_deferred() {
    let pending: Vec<(u64, FocusRequest)> =
        DEFERRED.with(|deferred| std::mem::take(&mut *deferred.borrow_mut()));
    for (_, request) in pending {
        focus_with_options(request.index, request.prevent_scroll);
    }
}

/// Number of queued focus moves (for testing).
pub fn deferred_len() -> usize {
    DEFERRED.with(|deferred| deferred.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all focus state (for testing).
pub fn reset_focus_state() {
    FOCUSED.with(|s| s.set(None));
    LAST_REQUEST.with(|s| s.set(None));
    CALLBACKS.with(|map| map.borrow_mut().clear());
    NEXT_CALLBACK_ID.with(|next| next.set(0));
    DEFERRED.with(|deferred| deferred.borrow_mut().clear());
    NEXT_TICKET.with(|next| next.set(0));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::view::{ViewElement, ViewNode};
    use crate::types::NodeFlags;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        tree::reset_tree();
        reset_focus_state();
    }

    fn mount_buttons(count: usize) -> Vec<usize> {
        let mut root = ViewElement::new("Box");
        for _ in 0..count {
            let mut button = ViewElement::new("Button");
            button.flags = NodeFlags::FOCUSABLE;
            root.children.push(ViewNode::Element(button));
        }
        let root_index = tree::mount(ViewNode::Element(root));
        tree::children_of(root_index)
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert_eq!(focused(), None);
        assert!(!has_focus());
    }

    #[test]
    fn test_focus_focusable_node() {
        setup();
        let buttons = mount_buttons(1);

        assert!(focus(buttons[0]));
        assert!(is_focused(buttons[0]));
        assert!(has_focus());
    }

    #[test]
    fn test_focus_rejects_unfocusable() {
        setup();
        let root = tree::mount(ViewNode::Element(ViewElement::new("Box")));

        assert!(!focus(root));
        assert_eq!(focused(), None);
    }

    #[test]
    fn test_next_previous_with_wrap() {
        setup();
        let buttons = mount_buttons(3);

        assert!(focus_first());
        assert!(is_focused(buttons[0]));

        assert!(focus_next());
        assert!(is_focused(buttons[1]));
        assert!(focus_next());
        assert!(is_focused(buttons[2]));

        // Wrap around.
        assert!(focus_next());
        assert!(is_focused(buttons[0]));

        assert!(focus_previous());
        assert!(is_focused(buttons[2]));
    }

    #[test]
    fn test_first_last() {
        setup();
        let buttons = mount_buttons(3);

        assert!(focus_last());
        assert!(is_focused(buttons[2]));
        assert!(focus_first());
        assert!(is_focused(buttons[0]));
    }

    #[test]
    fn test_navigation_with_nothing_mounted() {
        setup();
        assert!(!focus_next());
        assert!(!focus_previous());
        assert!(!focus_first());
        assert!(!focus_last());
    }

    #[test]
    fn test_blur() {
        setup();
        let buttons = mount_buttons(1);

        focus(buttons[0]);
        assert!(has_focus());

        blur();
        assert!(!has_focus());
    }

    #[test]
    fn test_callbacks_fire_on_transition() {
        setup();
        let buttons = mount_buttons(2);

        let focus_count = Rc::new(Cell::new(0));
        let blur_count = Rc::new(Cell::new(0));

        let focus_in = focus_count.clone();
        let blur_in = blur_count.clone();
        let _cleanup = register_callbacks(
            buttons[0],
            FocusCallbacks {
                on_focus: Some(Box::new(move || focus_in.set(focus_in.get() + 1))),
                on_blur: Some(Box::new(move || blur_in.set(blur_in.get() + 1))),
            },
        );

        focus(buttons[0]);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 0));

        focus(buttons[1]);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 1));

        // Refocusing the same node is not a transition.
        focus(buttons[1]);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 1));

        focus(buttons[0]);
        assert_eq!((focus_count.get(), blur_count.get()), (2, 1));
    }

    #[test]
    fn test_callback_cleanup() {
        setup();
        let buttons = mount_buttons(1);

        let count = Rc::new(Cell::new(0));
        let count_in = count.clone();
        let cleanup = register_callbacks(
            buttons[0],
            FocusCallbacks {
                on_focus: Some(Box::new(move || count_in.set(count_in.get() + 1))),
                on_blur: None,
            },
        );

        focus(buttons[0]);
        assert_eq!(count.get(), 1);

        cleanup();
        blur();
        focus(buttons[0]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_focus_request_carries_prevent_scroll() {
        setup();
        let buttons = mount_buttons(1);

        focus_with_options(buttons[0], true);
        let request = last_focus_request().unwrap();
        assert_eq!(request.index, buttons[0]);
        assert!(request.prevent_scroll);
    }

    #[test]
    fn test_deferred_focus_waits_for_flush() {
        setup();
        let buttons = mount_buttons(1);

        defer_focus(buttons[0], false);
        assert_eq!(focused(), None);
        assert_eq!(deferred_len(), 1);

        flush_deferred();
        assert!(is_focused(buttons[0]));
        assert_eq!(deferred_len(), 0);
    }

    #[test]
    fn test_deferred_focus_cancellable() {
        setup();
        let buttons = mount_buttons(1);

        let ticket = defer_focus(buttons[0], false);
        assert!(cancel_deferred(ticket));
        flush_deferred();
        assert_eq!(focused(), None);

        // A flushed ticket cannot be cancelled again.
        let ticket = defer_focus(buttons[0], false);
        flush_deferred();
        assert!(!cancel_deferred(ticket));
    }

    #[test]
    fn test_deferred_skips_unmounted_target() {
        setup();
        let buttons = mount_buttons(1);

        defer_focus(buttons[0], false);
        tree::remove_node(buttons[0]);
        flush_deferred();
        assert_eq!(focused(), None);
    }
}
