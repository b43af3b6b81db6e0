//! # Script Generation
//!
//! Converters from host values and node trees to reconstruction statements.

mod collection;
mod context;
mod elements;
mod emitter;
mod node_handlers;
mod node_tree;
mod reference;
mod registry;
pub mod scalar;
mod target;
mod walker;

pub use context::ConvertContext;
pub use emitter::CodeEmitter;
pub use node_handlers::{node_policy, node_target};
pub use node_tree::clear_source;
pub use reference::Namespace;
pub use registry::{ConverterKind, ConverterRegistry, SlotKind};
pub use target::{ElementSlot, TargetExpr};
pub use walker::{eligible_attributes, AttributePolicy};
