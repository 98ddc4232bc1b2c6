//! State - focus position, keyboard routing, and the interaction
//! state machines attached to rendered surfaces.

pub mod focus;
pub mod focus_trap;
pub mod input;
pub mod keyboard;
pub mod roving;

pub use focus::{FocusCallbacks, FocusRequest};
pub use focus_trap::{FocusTrap, FocusTrapOptions};
pub use input::InputEvent;
pub use keyboard::{KeyHandler, KeyState, KeyboardEvent, Modifiers};
pub use roving::{RovingFocusGroup, RovingOptions, ITEM_ROLES};
