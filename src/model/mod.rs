//! # Host Object Model
//!
//! Read-only snapshot of the host's node tree: values, composites, nodes, sockets
//! and links. Everything here is an input; nothing is mutated during a pass.

pub mod tree;
pub mod value;

pub use tree::*;
pub use value::*;
