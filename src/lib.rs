//! # Node Tree Source Compiler
//!
//! Turns a host node tree (a node-based visual program, its attributes and
//! embedded sub-structures) into a reconstruction script: statements that, replayed
//! against an empty host, recreate the tree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nodetree_source::compile_snapshot_json;
//!
//! let json = std::fs::read_to_string("material.json")?;
//! let output = compile_snapshot_json(&json)?;
//! for diagnostic in &output.diagnostics {
//!     eprintln!("skipped {}: {}", diagnostic.expression, diagnostic.message);
//! }
//! std::fs::write("material.py", output.source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **Node tree linearizer** - ports, nodes (recursing into groups), frame parents,
//!   then links, each tree under a depth-scoped alias
//! - **Converter registry** - picks a converter per value: literal, attribute walk,
//!   lookup by name, guarded load, or recreate-in-place
//! - **Attribute walker** - guarded assignments for every eligible attribute, with
//!   excluded, preordered and complex attribute policies
//! - **Scalar encoder** - literal text for numbers, strings, sets, tuples, matrices
//!
//! Values that cannot be rendered are reported as [`Diagnostic`]s and omitted;
//! they never abort the pass.

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod model;

// Re-export the main compilation API
pub use compiler::{
    clear_source,
    compile_node_tree,
    compile_node_tree_with_options,
    compile_snapshot_json,
    ScriptOutput,
    Snapshot,
};

pub use codegen::{AttributePolicy, ConverterRegistry};
pub use config::CompileOptions;
pub use error::{Diagnostic, SourceError};
pub use model::{
    Attributes, Composite, Field, InterfaceSocket, Link, Node, NodeTree, PortOwner, Socket,
    TupleKind, Value,
};
