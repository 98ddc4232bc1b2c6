//! Mount API - interpreter lifecycle.
//!
//! This module is the entry point for running a specification as an
//! application: resolve the spec, mount the view tree, install the
//! global key handlers (sequential Tab navigation, Ctrl+C shutdown),
//! and drive the event loop.
//!
//! # Example
//!
//! ```ignore
//! use blueprint_tui::pipeline::mount;
//!
//! let handle = mount::mount(&spec, &ctx);
//!
//! // Option 1: blocking event loop
//! mount::run(&handle)?;
//!
//! // Option 2: tick manually in your own loop
//! while mount::tick(&handle)? {
//!     // Your logic here
//! }
//!
//! handle.unmount();
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::handlers::{ConditionTable, HandlerTable};
use crate::engine::registry::ComponentRegistry;
use crate::engine::resolver::{resolve, ResolveContext};
use crate::engine::tree;
use crate::spec::{ComponentSpec, UISpecification};
use crate::state::{focus, input, keyboard};
use crate::types::Diagnostic;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`] that owns the mounted application.
///
/// Holds the root index (absent when the root spec pruned itself), the
/// running flag, and the cleanups for the global key handlers.
pub struct MountHandle {
    root: Option<usize>,
    running: Arc<AtomicBool>,
    key_cleanups: Vec<Box<dyn FnOnce()>>,
}

impl MountHandle {
    /// The mounted root node, if the spec resolved to output.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the application (sets running to false).
    /// Use this to trigger graceful shutdown from custom code.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Tear everything down in order: stop, remove the global key
    /// handlers, unmount the view tree.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for cleanup in self.key_cleanups.drain(..) {
            cleanup();
        }
        if let Some(root) = self.root.take() {
            tree::remove_node(root);
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Mount
// =============================================================================

/// Resolve a specification and mount it as the running application.
///
/// Installs the global key handlers:
/// - **Tab** / **Shift+Tab**: sequential focus navigation (a capture
///   handler - an active focus trap - wins over these)
/// - **Ctrl+C**: graceful shutdown via the running flag
pub fn mount(spec: &ComponentSpec, ctx: &ResolveContext<'_>) -> MountHandle {
    let root = resolve(spec, ctx).map(tree::mount);
    let running = Arc::new(AtomicBool::new(true));

    let mut key_cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();

    let running_for_ctrl_c = running.clone();
    key_cleanups.push(Box::new(keyboard::on(move |event| {
        if event.modifiers.ctrl && event.key == "c" {
            running_for_ctrl_c.store(false, Ordering::SeqCst);
            true
        } else {
            false
        }
    })));

    key_cleanups.push(Box::new(keyboard::on(|event| {
        if event.key == "Tab" && event.modifiers.shift {
            focus::focus_previous();
            true
        } else {
            false
        }
    })));

    key_cleanups.push(Box::new(keyboard::on(|event| {
        if event.key == "Tab" && !event.modifiers.shift {
            focus::focus_next();
            true
        } else {
            false
        }
    })));

    MountHandle {
        root,
        running,
        key_cleanups,
    }
}

/// Mount a full document: builds the resolve context (including the
/// document's theme) and returns the handle together with any
/// diagnostics resolution recovered from.
pub fn mount_document(
    document: &UISpecification,
    registry: &ComponentRegistry,
    handlers: &HandlerTable,
    conditions: &ConditionTable,
) -> (MountHandle, Vec<Diagnostic>) {
    let mut ctx = ResolveContext::new(registry, handlers, conditions);
    if let Some(theme) = &document.theme {
        ctx = ctx.with_theme(theme);
    }
    let handle = mount(&document.root, &ctx);
    (handle, ctx.take_diagnostics())
}

// =============================================================================
// Event Loop
// =============================================================================

/// One event-loop iteration: poll input, route it, flush deferred
/// focus moves. Returns false once the application stopped.
pub fn tick(handle: &MountHandle) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    if let Some(event) = input::poll_event(Duration::from_millis(16))? {
        input::route_event(event);
    }
    focus::flush_deferred();

    Ok(handle.is_running())
}

/// Blocking event loop: tick until stopped.
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle)? {}
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
