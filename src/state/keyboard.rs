//! Keyboard Module - key event state and the handler priority chain.
//!
//! Holds the last-event reactive state and the handler registry that
//! key events route through. Does NOT own stdin (that is the input
//! module).
//!
//! Routing walks an explicit priority chain; the first handler that
//! returns `true` consumes the event and stops the walk:
//!
//! 1. **Capture** handlers (focus traps, roving groups), newest first -
//!    the innermost active trap answers before anything else.
//! 2. The **focused node's** handlers.
//! 3. **Key-specific** handlers.
//! 4. **Global** handlers (sequential Tab navigation lives here).
//!
//! Every registration returns a cleanup closure that removes exactly
//! the handlers it added - dangling observers would let destroyed
//! containers hijack keys, so teardown precision is a correctness
//! property here, not a nicety.

use std::cell::RefCell;
use std::collections::HashMap;

use spark_signals::{signal, Signal};

// =============================================================================
// Types
// =============================================================================

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl.
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Create modifiers with shift.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Key event state (press, repeat, release).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key pressed (e.g. "a", "Enter", "ArrowUp", "Tab").
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers.
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Check if this is a press event.
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Box<dyn Fn(&KeyboardEvent) -> bool>;

/// Handler for a specific key. Return true to consume the event.
pub type KeySpecificHandler = Box<dyn Fn() -> bool>;

// =============================================================================
// State
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Get the last keyboard event.
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Get the last key pressed.
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// Handler Registry
// =============================================================================

struct HandlerRegistry {
    capture_handlers: Vec<(usize, KeyHandler)>,
    focused_handlers: HashMap<usize, Vec<(usize, KeyHandler)>>,
    key_handlers: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    global_handlers: Vec<(usize, KeyHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            capture_handlers: Vec::new(),
            focused_handlers: HashMap::new(),
            key_handlers: HashMap::new(),
            global_handlers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// Routing
// =============================================================================

/// Route a keyboard event through the priority chain.
/// Returns true if any handler consumed the event.
pub fn route_key_event(event: KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    // Only press events reach handlers.
    if event.state != KeyState::Press {
        return false;
    }

    // Capture phase: newest registration first, so the innermost
    // active trap/group answers before outer ones.
    let consumed = REGISTRY.with(|reg| {
        let reg = reg.borrow();
        for (_, handler) in reg.capture_handlers.iter().rev() {
            if handler(&event) {
                return true;
            }
        }
        false
    });
    if consumed {
        return true;
    }

    // Focused-node phase.
    if let Some(focused) = super::focus::focused() {
        let consumed = REGISTRY.with(|reg| {
            let reg = reg.borrow();
            if let Some(handlers) = reg.focused_handlers.get(&focused) {
                for (_, handler) in handlers {
                    if handler(&event) {
                        return true;
                    }
                }
            }
            false
        });
        if consumed {
            return true;
        }
    }

    // Key-specific then global phase.
    REGISTRY.with(|reg| {
        let reg = reg.borrow();

        if let Some(handlers) = reg.key_handlers.get(&event.key) {
            for (_, handler) in handlers {
                if handler() {
                    return true;
                }
            }
        }

        for (_, handler) in &reg.global_handlers {
            if handler(&event) {
                return true;
            }
        }

        false
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Subscribe in the capture phase (checked before everything else,
/// newest first). Used by focus traps and roving groups.
/// Returns a cleanup function.
pub fn on_capture<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.capture_handlers.push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.capture_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to all keyboard events (global phase).
/// Return true from the handler to consume the event.
/// Returns a cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.global_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to a specific key.
/// Return true to consume the event.
/// Returns a cleanup function.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + 'static,
{
    let key = key.to_string();
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.key_handlers
            .entry(key.clone())
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.key_handlers.get_mut(&key) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.key_handlers.remove(&key);
                }
            }
        });
    }
}

/// Subscribe to events while a specific node has focus.
/// Return true from the handler to consume the event.
/// Returns a cleanup function.
pub fn on_focused<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.focused_handlers
            .entry(index)
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.focused_handlers.remove(&index);
                }
            }
        });
    }
}

/// Remove all focused-node handlers for an index.
/// Called when a node is released to prevent leaks.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused_handlers.remove(&index);
    });
}

/// Reset keyboard state (for testing).
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.capture_handlers.clear();
        reg.focused_handlers.clear();
        reg.key_handlers.clear();
        reg.global_handlers.clear();
        reg.next_id = 0;
    });
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// Tests
// =============================================================================
