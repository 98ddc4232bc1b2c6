//! Pipeline - application lifecycle around the interpreter.

pub mod mount;

pub use mount::{mount, mount_document, run, tick, MountHandle};
