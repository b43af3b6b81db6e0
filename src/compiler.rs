//! # Node Tree Compiler
//!
//! Main entry points for turning node trees into reconstruction scripts.

use crate::codegen::{self, AttributePolicy, ConvertContext, ConverterRegistry};
use crate::config::CompileOptions;
use crate::error::{Diagnostic, SourceError};
use crate::model::{NodeTree, PortOwner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generated script plus everything that could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptOutput {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// JSON snapshot accepted by [`compile_snapshot_json`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub options: CompileOptions,
    /// Extra composite types and how to walk them
    #[serde(default)]
    pub custom_types: BTreeMap<String, AttributePolicy>,
    pub node_tree: NodeTree,
}

/// Compile a node tree to its reconstruction script
///
/// The tree is addressed as `node_tree0` and its top-level ports are created from
/// its own interface.
///
/// # Examples
///
/// ```rust
/// use nodetree_source::{compile_node_tree, Node, NodeTree};
///
/// let mut tree = NodeTree::new("Material", "ShaderNodeTree");
/// tree.add_node(Node::new("Value", "ShaderNodeValue"));
///
/// let output = compile_node_tree(&tree);
/// assert!(output.source.contains("node_tree0.nodes.new('ShaderNodeValue')"));
/// ```
pub fn compile_node_tree(tree: &NodeTree) -> ScriptOutput {
    compile_node_tree_with_options(
        tree,
        tree,
        0,
        &CompileOptions::default(),
        &ConverterRegistry::new(),
    )
}

/// Compile a node tree with an explicit port owner, nesting depth, options and
/// converter registrations
///
/// # Arguments
///
/// * `tree` - The tree to linearize
/// * `owner` - Source of top-level port names and types
/// * `depth` - Nesting depth; selects the `node_tree<depth>` alias and indentation
/// * `options` - Host API shape and layout
/// * `registry` - Converters, including custom composite registrations
pub fn compile_node_tree_with_options(
    tree: &NodeTree,
    owner: &dyn PortOwner,
    depth: usize,
    options: &CompileOptions,
    registry: &ConverterRegistry,
) -> ScriptOutput {
    tracing::info!("[NTS] Starting node tree compilation");
    tracing::info!(
        "[NTS] Tree: {} ({} nodes, {} links)",
        tree.name,
        tree.nodes.len(),
        tree.links.len()
    );

    tracing::info!("[NTS] Phase 1: Linearizing node tree...");
    let mut context = ConvertContext::new(options, registry);
    let body = context.linearize_tree(tree, owner, depth);

    tracing::info!("[NTS] Phase 2: Assembling script...");
    let source = body.finish();
    let diagnostics = context.into_diagnostics();

    if !diagnostics.is_empty() {
        tracing::warn!("[NTS] {} value(s) could not be converted", diagnostics.len());
    }
    tracing::info!("[NTS] Script generation complete ({} bytes)", source.len());

    ScriptOutput { source, diagnostics }
}

/// Compile a JSON [`Snapshot`]
///
/// # Returns
///
/// * `Ok(ScriptOutput)` - The script and any per-value diagnostics
/// * `Err(SourceError::Snapshot)` - The snapshot could not be parsed
pub fn compile_snapshot_json(json: &str) -> Result<ScriptOutput, SourceError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;

    let mut registry = ConverterRegistry::new();
    for (type_name, policy) in snapshot.custom_types {
        registry.register(type_name, policy);
    }
    tracing::info!("[NTS] Loaded snapshot of '{}'", snapshot.node_tree.name);

    Ok(compile_node_tree_with_options(
        &snapshot.node_tree,
        &snapshot.node_tree,
        0,
        &snapshot.options,
        &registry,
    ))
}

/// Statement removing every node from `tree_expr`
pub fn clear_source(tree_expr: &str) -> String {
    codegen::clear_source(tree_expr, &CompileOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Composite, Field, Node, Value};

    #[test]
    fn test_compile_collects_diagnostics() {
        let mut tree = NodeTree::new("Material", "ShaderNodeTree");
        tree.add_node(
            Node::new("Custom", "ShaderNodeCustom")
                .with_field(Field::new("gadget", Composite::new("Gadget").into_value()))
                .with_field(Field::new("width", Value::Float(140.0))),
        );

        let output = compile_node_tree(&tree);
        assert!(output.source.contains("node_tree0.nodes[0].width = 140.0"));
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].expression, "node_tree0.nodes[0].gadget");
    }

    #[test]
    fn test_compile_at_depth() {
        let mut tree = NodeTree::new("Group", "ShaderNodeTree");
        tree.add_node(Node::new("Value", "ShaderNodeValue"));

        let output = compile_node_tree_with_options(
            &tree,
            &tree,
            2,
            &CompileOptions::default(),
            &ConverterRegistry::new(),
        );
        assert!(output.source.contains("        node_tree2.nodes.new('ShaderNodeValue')"));
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(
            compile_snapshot_json("{\"node_tree\": 3}"),
            Err(SourceError::Snapshot(_))
        ));
    }

    #[test]
    fn test_clear_source_default_indent() {
        let code = clear_source("bpy.data.materials['M'].node_tree");
        assert!(code.contains("    bpy.data.materials['M'].node_tree.nodes.remove(node)"));
    }
}
