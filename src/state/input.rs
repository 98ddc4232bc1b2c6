//! Input Module - terminal event conversion and polling.
//!
//! Bridges crossterm's event stream to the keyboard module. The
//! interpreter itself never touches stdin; hosts either call
//! [`poll_event`]/[`read_event`] from their own loop or let the
//! pipeline's `run` do it.

use std::time::Duration;

use crossterm::event::{
    poll, read, Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers,
};

use super::keyboard::{KeyState, KeyboardEvent, Modifiers};

// =============================================================================
// Input Event Enum
// =============================================================================

/// Unified event type at the input boundary.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard event (press, repeat, release).
    Key(KeyboardEvent),
    /// Terminal resize (new width, height); left to the host renderer.
    Resize(u16, u16),
    /// No event or an unhandled event type.
    None,
}

// =============================================================================
// Key Event Conversion
// =============================================================================

/// Convert a crossterm KeyEvent to our KeyboardEvent.
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    };

    let state = match event.kind {
        crossterm::event::KeyEventKind::Press => KeyState::Press,
        crossterm::event::KeyEventKind::Repeat => KeyState::Repeat,
        crossterm::event::KeyEventKind::Release => KeyState::Release,
    };

    // BackTab arrives as its own key code; normalize to Shift+Tab.
    let mut modifiers = convert_modifiers(event.modifiers);
    if event.code == KeyCode::BackTab {
        modifiers.shift = true;
    }

    KeyboardEvent {
        key,
        modifiers,
        state,
    }
}

/// Convert crossterm KeyModifiers to our Modifiers.
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: false, // Not exposed by crossterm
    }
}

// =============================================================================
// Event Polling
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event arrived within the timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<InputEvent> {
    match read()? {
        CrosstermEvent::Key(key) => Ok(InputEvent::Key(convert_key_event(key))),
        CrosstermEvent::Resize(w, h) => Ok(InputEvent::Resize(w, h)),
        _ => Ok(InputEvent::None),
    }
}

// =============================================================================
// Event Routing
// =============================================================================

/// Route an event into the interpreter.
/// Returns true if any handler consumed it.
pub fn route_event(event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => super::keyboard::route_key_event(key),
        InputEvent::Resize(_, _) | InputEvent::None => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
