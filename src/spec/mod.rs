//! Specification Model - the serializable UI description.
//!
//! A UI is described as data: a tree of typed [`ComponentSpec`] nodes
//! that round-trips through JSON without loss. Specs carry no functions;
//! event handlers and visibility conditions are *names* resolved against
//! host-supplied tables at resolve time.

pub mod model;
pub mod parser;

pub use model::{A11ySpec, ComponentSpec, SpecChild, SpecChildren, UISpecification, VisibleWhen};
pub use parser::{parse_document, parse_spec, spec_from_value, validate_spec, ValidationIssue};
