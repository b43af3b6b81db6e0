//! # Node Converter
//!
//! Creates one node and sets its attributes and socket values:
//!
//! ```text
//! node_tree0.nodes.new('ShaderNodeMath')
//! node_tree0.nodes[2].name = 'Math'
//! if hasattr(node_tree0.nodes[2], 'operation'):
//!     node_tree0.nodes[2].operation = 'MULTIPLY'
//! if len(node_tree0.nodes[2].inputs) > 0:
//!     if hasattr(node_tree0.nodes[2].inputs[0], 'default_value'):
//!         node_tree0.nodes[2].inputs[0].default_value = 0.5
//! ```
//!
//! A node is addressed by its position in the owning tree's node list, so the same
//! node resolves to the same expression in the node, parent and link passes.

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::reference::Namespace;
use crate::codegen::registry::ConverterKind;
use crate::codegen::scalar::quote;
use crate::codegen::target::TargetExpr;
use crate::codegen::walker::AttributePolicy;
use crate::error::SourceError;
use crate::model::{Node, Socket};

/// Attribute handling shared by all nodes
pub fn node_policy() -> AttributePolicy {
    AttributePolicy::new()
        // name is always set explicitly, parent in its own pass once frames exist
        .exclude([
            "name",
            "type",
            "select",
            "dimensions",
            "internal_links",
            "width_hidden",
            "parent",
            "node_tree",
            "inputs",
            "outputs",
        ])
        .preorder(["data_type", "mode"])
        .complex([
            "color_ramp",
            "mapping",
            "image_user",
            "format",
            "file_slots",
            "layer_slots",
            "texture_mapping",
            "color_mapping",
        ])
}

/// Address of node `index` in the tree aliased by `tree`
pub fn node_target(tree: &TargetExpr, index: usize) -> TargetExpr {
    tree.attr("nodes").index(index)
}

impl ConvertContext<'_> {
    pub fn convert_node(
        &mut self,
        node: &Node,
        tree: &TargetExpr,
        index: usize,
        depth: usize,
    ) -> CodeEmitter {
        let target = node_target(tree, index);
        let mut out = self.emitter();

        tracing::debug!("[NTS] node {} '{}' ({})", target, node.name, node.bl_idname);

        out.line(depth, format!("{}.nodes.new({})", tree, quote(&node.bl_idname)));
        out.line(depth, target.attr("name").assign(&quote(&node.name)));

        if let Some(group) = &node.node_tree {
            out.line(depth, format!("if hasattr({}, 'node_tree'):", target));
            out.line(
                depth + 1,
                target
                    .attr("node_tree")
                    .assign(&self.lookup_expr(Namespace::NodeGroups, &group.name)),
            );
        }

        out.append(self.convert_complex(node, &node_policy(), &target, depth));
        out.append(self.convert_sockets(&node.inputs, &target.attr("inputs"), depth));
        out.append(self.convert_sockets(&node.outputs, &target.attr("outputs"), depth));
        out
    }

    /// Socket values, each behind a socket-count guard
    fn convert_sockets(
        &mut self,
        sockets: &[Socket],
        collection: &TargetExpr,
        depth: usize,
    ) -> CodeEmitter {
        let mut out = self.emitter();

        for (index, socket) in sockets.iter().enumerate() {
            let target = collection.index(index);
            let policy = match self.registry.resolve(&socket.bl_idname) {
                Some(ConverterKind::Complex(policy)) => policy,
                _ => {
                    let error = SourceError::UnknownType {
                        attribute: socket.identifier.clone(),
                        type_name: socket.bl_idname.clone(),
                    };
                    self.report(
                        &socket.identifier,
                        &socket.bl_idname,
                        &socket.name,
                        &target,
                        &error,
                    );
                    continue;
                }
            };

            let fragment = self.convert_complex(socket, &policy, &target, depth + 1);
            if fragment.is_empty() {
                continue;
            }
            out.line(depth, format!("if len({}) > {}:", collection, index));
            out.append(fragment);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::registry::ConverterRegistry;
    use crate::config::CompileOptions;
    use crate::model::{Composite, Field, NodeTree, Value};

    fn math_node() -> Node {
        Node::new("Math", "ShaderNodeMath")
            .with_field(Field::new("operation", Value::str("MULTIPLY")))
            .with_field(Field::new("data_type", Value::str("FLOAT")))
            .with_field(Field::new("location", Value::vector(&[10.0, 20.0])))
            .with_field(Field::readonly("dimensions", Value::vector(&[140.0, 100.0])))
            .with_field(Field::new("select", Value::Bool(true)))
            .with_input(
                Socket::new("NodeSocketFloat", "Value")
                    .with_field(Field::new("default_value", Value::Float(0.5))),
            )
            .with_input(
                Socket::new("NodeSocketFloat", "Value")
                    .with_identifier("Value_001")
                    .with_field(Field::new("default_value", Value::Float(2.0))),
            )
            .with_output(Socket::new("NodeSocketFloat", "Value"))
    }

    #[test]
    fn test_node_creation_and_attributes() {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);

        let code = ctx
            .convert_node(&math_node(), &TargetExpr::new("node_tree0", 0), 2, 0)
            .finish();
        let lines: Vec<&str> = code.lines().collect();

        assert_eq!(lines[0], "node_tree0.nodes.new('ShaderNodeMath')");
        assert_eq!(lines[1], "node_tree0.nodes[2].name = 'Math'");
        // mode selectors first
        assert_eq!(lines[2], "if hasattr(node_tree0.nodes[2], 'data_type'):");
        assert!(code.contains("    node_tree0.nodes[2].operation = 'MULTIPLY'"));
        assert!(code.contains("    node_tree0.nodes[2].location = (10.0, 20.0)"));
        assert!(!code.contains("dimensions"));
        assert!(!code.contains("select"));
        assert!(code.contains(
            "if len(node_tree0.nodes[2].inputs) > 1:\n    if hasattr(node_tree0.nodes[2].inputs[1], 'default_value'):\n        node_tree0.nodes[2].inputs[1].default_value = 2.0"
        ));
        // output socket carries nothing to set
        assert!(!code.contains("outputs"));
    }

    #[test]
    fn test_group_node_references_tree() {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);

        let inner = NodeTree::new("Bumps", "ShaderNodeTree");
        let node = Node::group("Group", "ShaderNodeGroup", inner);
        let code = ctx.convert_node(&node, &TargetExpr::new("node_tree1", 1), 0, 1).finish();
        assert!(code.contains(
            "    if hasattr(node_tree1.nodes[0], 'node_tree'):\n        node_tree1.nodes[0].node_tree = bpy.data.node_groups.get('Bumps')"
        ));
    }

    #[test]
    fn test_node_with_color_ramp() {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);

        let ramp = Composite::new("ColorRamp").with_field(Field::readonly(
            "elements",
            Value::Collection(vec![Composite::new("ColorRampElement")
                .with_field(Field::new("position", Value::Float(0.25)))
                .into_value()]),
        ));
        let node = Node::new("Ramp", "ShaderNodeValToRGB")
            .with_field(Field::readonly("color_ramp", ramp.into_value()));
        let code = ctx.convert_node(&node, &TargetExpr::new("node_tree0", 0), 0, 0).finish();

        assert!(code.contains("if hasattr(node_tree0.nodes[0], 'color_ramp'):"));
        assert!(code.contains("    if hasattr(node_tree0.nodes[0].color_ramp, 'elements'):"));
        assert!(code.contains("        if 0 >= len(node_tree0.nodes[0].color_ramp.elements):"));
        assert!(code.contains("            node_tree0.nodes[0].color_ramp.elements.new(0.25)"));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_invalid_attribute_name_not_emitted() {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);

        let node = Node::new("N", "ShaderNodeValue")
            .with_field(Field::new("my prop", Value::Int(1)))
            .with_field(Field::new("label", Value::str("Kept")));
        let code = ctx.convert_node(&node, &TargetExpr::new("node_tree0", 0), 0, 0).finish();

        assert!(!code.contains("my prop"));
        assert!(code.contains("    node_tree0.nodes[0].label = 'Kept'"));
    }

    #[test]
    fn test_unknown_socket_type_reported() {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);

        let node = Node::new("Custom", "CustomNode").with_input(
            Socket::new("CustomSocket", "In")
                .with_field(Field::new("default_value", Value::Int(1))),
        );
        let code = ctx.convert_node(&node, &TargetExpr::new("node_tree0", 0), 0, 0).finish();
        assert!(!code.contains("inputs"));
        assert_eq!(ctx.diagnostics()[0].type_name, "CustomSocket");
    }
}
