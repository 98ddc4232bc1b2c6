//! Focus Trap - keyboard focus containment for modal surfaces.
//!
//! A trap constrains Tab cycling to one container's focusable
//! descendants until deactivated: Tab at the last wraps to the first,
//! Shift+Tab at the first wraps to the last. That wrap-around is the
//! defining behavior; everything else (escape deactivation, outside
//! pointer policy, focus restoration) is configuration.
//!
//! The trap session owns the previously focused node and restores it on
//! deactivation unless configured not to. Initial focus is deferred by
//! one event-loop tick so the container finishes structural setup
//! before focus moves - a trap deactivated before that tick fires must
//! not move focus at all.
//!
//! Exactly one trap should be active at a time; nesting is legal only
//! if the caller deactivates inner traps before outer ones (the capture
//! chain answers newest-first, so a well-nested stack behaves, but
//! nothing here serializes concurrent traps).

use std::cell::RefCell;
use std::rc::Rc;

use super::{focus, keyboard};
use crate::engine::tree;

// =============================================================================
// Options
// =============================================================================

/// Focus trap configuration.
#[derive(Debug, Clone)]
pub struct FocusTrapOptions {
    /// Node to focus on activation; wins over everything else.
    pub initial_focus: Option<usize>,
    /// Node to focus when `initial_focus` is absent and the container
    /// has no focusable descendant.
    pub fallback_focus: Option<usize>,
    /// Escape deactivates the trap (default true).
    pub escape_deactivates: bool,
    /// A pointer interaction outside the container deactivates the
    /// trap and lets the interaction through (default false).
    pub click_outside_deactivates: bool,
    /// Outside pointer interactions pass through without deactivating
    /// (default false; the default policy suppresses them).
    pub allow_outside_click: bool,
    /// Restore focus to the previously focused node on deactivation
    /// (default true).
    pub return_focus_on_deactivate: bool,
    /// Carried on every focus move this trap performs.
    pub prevent_scroll: bool,
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self {
            initial_focus: None,
            fallback_focus: None,
            escape_deactivates: true,
            click_outside_deactivates: false,
            allow_outside_click: false,
            return_focus_on_deactivate: true,
            prevent_scroll: false,
        }
    }
}

// =============================================================================
// Trap Session
// =============================================================================

struct TrapState {
    container: usize,
    options: FocusTrapOptions,
    active: bool,
    previous_focus: Option<usize>,
    pending_ticket: Option<u64>,
}

/// An activated focus trap session.
///
/// Created by [`FocusTrap::activate`]; torn down by
/// [`deactivate`](FocusTrap::deactivate) or drop. Teardown removes
/// exactly the key listener the activation added.
pub struct FocusTrap {
    state: Rc<RefCell<TrapState>>,
    key_cleanup: Option<Box<dyn FnOnce()>>,
}

impl FocusTrap {
    /// Activate a trap on a container.
    ///
    /// Records the currently focused node for restoration, queues the
    /// initial focus move for the next tick (explicit target, else
    /// fallback, else the container's first focusable descendant), and
    /// installs the capture key handler.
    ///
    /// A container with zero focusable descendants gets no focus move,
    /// and Tab becomes a full no-op while the trap is active.
    pub fn activate(container: usize, options: FocusTrapOptions) -> Self {
        let previous_focus = focus::focused();

        let target = options
            .initial_focus
            .or(options.fallback_focus)
            .or_else(|| tree::tabbables_within(container).into_iter().next());
        let pending_ticket = target.map(|index| focus::defer_focus(index, options.prevent_scroll));

        let state = Rc::new(RefCell::new(TrapState {
            container,
            options,
            active: true,
            previous_focus,
            pending_ticket,
        }));

        let handler_state = state.clone();
        let key_cleanup = keyboard::on_capture(move |event| handle_key(&handler_state, event));

        Self {
            state,
            key_cleanup: Some(Box::new(key_cleanup)),
        }
    }

    /// Whether the trap is still containing focus.
    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    /// The container this trap was activated on.
    pub fn container(&self) -> usize {
        self.state.borrow().container
    }

    /// Report a pointer interaction, identified by the node it hit
    /// (`None` for a hit outside every mounted surface).
    ///
    /// Returns true if the trap suppressed the interaction. Interactions
    /// inside the container always pass through; outside ones follow
    /// the configured policy.
    pub fn pointer_event(&self, target: Option<usize>) -> bool {
        let (active, container, deactivates, allows) = {
            let state = self.state.borrow();
            (
                state.active,
                state.container,
                state.options.click_outside_deactivates,
                state.options.allow_outside_click,
            )
        };
        if !active {
            return false;
        }

        let inside = target
            .is_some_and(|index| index == container || tree::is_descendant_of(index, container));
        if inside {
            return false;
        }

        if deactivates {
            deactivate_state(&self.state);
            return false;
        }
        !allows
    }

    /// Deactivate the trap: remove its key listener, cancel a pending
    /// initial focus, and restore the previously focused node when
    /// configured to.
    pub fn deactivate(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(cleanup) = self.key_cleanup.take() {
            cleanup();
        }
        deactivate_state(&self.state);
    }
}

impl Drop for FocusTrap {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Transitions
// =============================================================================

fn deactivate_state(state: &Rc<RefCell<TrapState>>) {
    let (ticket, restore, prevent_scroll) = {
        let mut state = state.borrow_mut();
        if !state.active {
            return;
        }
        state.active = false;
        let restore = if state.options.return_focus_on_deactivate {
            state.previous_focus
        } else {
            None
        };
        (
            state.pending_ticket.take(),
            restore,
            state.options.prevent_scroll,
        )
    };

    // A trap deactivated before its initial-focus tick fires must not
    // move focus at all.
    if let Some(ticket) = ticket {
        focus::cancel_deferred(ticket);
    }
    if let Some(previous) = restore {
        focus::focus_with_options(previous, prevent_scroll);
    }
}

fn handle_key(state: &Rc<RefCell<TrapState>>, event: &keyboard::KeyboardEvent) -> bool {
    let (active, container, escape_deactivates, prevent_scroll) = {
        let state = state.borrow();
        (
            state.active,
            state.container,
            state.options.escape_deactivates,
            state.options.prevent_scroll,
        )
    };
    if !active {
        return false;
    }

    match event.key.as_str() {
        "Escape" if escape_deactivates => {
            deactivate_state(state);
            true
        }
        "Tab" => {
            let order = tree::tabbables_within(container);
            if order.is_empty() {
                // Nothing to cycle to: suppress Tab entirely.
                return true;
            }

            let position = focus::focused().and_then(|index| {
                order.iter().position(|&candidate| candidate == index)
            });
            let target = if event.modifiers.shift {
                match position {
                    Some(0) | None => order[order.len() - 1],
                    Some(position) => order[position - 1],
                }
            } else {
                match position {
                    Some(position) if position + 1 < order.len() => order[position + 1],
                    // At the last descendant (or outside the trap):
                    // wrap to the first.
                    _ => order[0],
                }
            };

            focus::focus_with_options(target, prevent_scroll);
            true
        }
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
