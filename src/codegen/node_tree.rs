//! # Node Tree Linearizer
//!
//! Turns a node tree into statements in creation order:
//!
//! 1. declared inputs, then outputs
//! 2. nodes, recursing into group trees before their container node
//! 3. frame parents, once every node of the tree exists
//! 4. links, once every socket collection has its final shape
//!
//! Each tree is addressed by a depth-scoped alias (`node_tree0`, `node_tree1`, ...)
//! so nested groups never collide with their ancestors. A group tree is only
//! populated when it did not already exist on the replay host:
//!
//! ```text
//! node_tree1 = bpy.data.node_groups.get('Bumps')
//! if not node_tree1:
//!     node_tree1 = bpy.data.node_groups.new('Bumps', 'ShaderNodeTree')
//!     ...nested tree at depth 1...
//! node_tree0.nodes.new('ShaderNodeGroup')
//! ```

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::node_handlers::node_target;
use crate::codegen::reference::Namespace;
use crate::codegen::scalar::quote;
use crate::codegen::target::TargetExpr;
use crate::config::CompileOptions;
use crate::error::SourceError;
use crate::model::{Attributes, Link, Node, NodeTree, PortOwner, PortSpec};
use std::collections::HashSet;

/// Link endpoints as (node, socket) positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ResolvedLink {
    from_node: usize,
    from_socket: usize,
    to_node: usize,
    to_socket: usize,
}

fn resolve_link(tree: &NodeTree, link: &Link) -> Result<ResolvedLink, SourceError> {
    let (from_node, from) = tree
        .node(&link.from_node)
        .ok_or_else(|| SourceError::NodeNotFound(link.from_node.clone()))?;
    let (to_node, to) = tree
        .node(&link.to_node)
        .ok_or_else(|| SourceError::NodeNotFound(link.to_node.clone()))?;

    let from_socket = from
        .output_index(&link.from_socket)
        .ok_or_else(|| SourceError::SocketNotFound {
            node: link.from_node.clone(),
            socket: link.from_socket.clone(),
        })?;
    let to_socket = to
        .input_index(&link.to_socket)
        .ok_or_else(|| SourceError::SocketNotFound {
            node: link.to_node.clone(),
            socket: link.to_socket.clone(),
        })?;

    Ok(ResolvedLink {
        from_node,
        from_socket,
        to_node,
        to_socket,
    })
}

/// Statement removing every node from `tree_expr`, for callers wanting a clean slate
pub fn clear_source(tree_expr: &str, options: &CompileOptions) -> String {
    let mut out = CodeEmitter::new(options.indent.clone());
    out.line(0, format!("for node in list({}.nodes):", tree_expr));
    out.line(1, format!("{}.nodes.remove(node)", tree_expr));
    out.finish()
}

impl ConvertContext<'_> {
    /// Linearize `tree` at `depth`, creating top-level ports from `owner`'s view
    pub fn linearize_tree(
        &mut self,
        tree: &NodeTree,
        owner: &dyn PortOwner,
        depth: usize,
    ) -> CodeEmitter {
        let alias = TargetExpr::new(self.options.tree_alias(depth), depth);
        let mut out = self.emitter();

        tracing::debug!(
            "[NTS] tree '{}' as {} ({} nodes, {} links)",
            tree.name,
            alias,
            tree.nodes.len(),
            tree.links.len()
        );

        if !tree.inputs.is_empty() {
            self.section(&mut out, depth, "INPUTS");
            self.emit_ports(&mut out, &alias.attr("inputs"), &owner.input_ports(), depth);
        }
        if !tree.outputs.is_empty() {
            self.section(&mut out, depth, "OUTPUTS");
            self.emit_ports(&mut out, &alias.attr("outputs"), &owner.output_ports(), depth);
        }

        if !tree.nodes.is_empty() {
            self.section(&mut out, depth, "NODES");
            for (index, node) in tree.nodes.iter().enumerate() {
                if let Some(group) = &node.node_tree {
                    out.append(self.linearize_group(node, group, depth));
                }
                out.append(self.convert_node(node, &alias, index, depth));
                out.blank();
            }
        }

        let parents = self.convert_parents(tree, &alias, depth);
        if !parents.is_empty() {
            self.section(&mut out, depth, "PARENTS");
            out.append(parents);
        }

        if !tree.links.is_empty() {
            self.section(&mut out, depth, "LINKS");
            out.append(self.convert_links(tree, &alias, depth));
        }

        out
    }

    fn section(&self, out: &mut CodeEmitter, depth: usize, title: &str) {
        if self.options.section_comments {
            out.line(depth, format!("# {}", title));
        }
    }

    fn emit_ports(
        &self,
        out: &mut CodeEmitter,
        ports: &TargetExpr,
        specs: &[PortSpec<'_>],
        depth: usize,
    ) {
        for spec in specs {
            out.line(
                depth,
                format!("{}.new({}, {})", ports, quote(spec.bl_idname), quote(spec.name)),
            );
        }
    }

    /// Look up or create the group's tree, populating it only when newly created
    fn linearize_group(&mut self, container: &Node, group: &NodeTree, depth: usize) -> CodeEmitter {
        let nested = self.options.tree_alias(depth + 1);
        let groups = Namespace::NodeGroups.collection(self.options);
        let mut out = self.emitter();

        let lookup = self.lookup_expr(Namespace::NodeGroups, &group.name);
        out.line(depth, format!("{} = {}", nested, lookup));
        out.line(depth, format!("if not {}:", nested));
        out.line(
            depth + 1,
            format!(
                "{} = {}.new({}, {})",
                nested,
                groups,
                quote(&group.name),
                quote(&group.bl_idname)
            ),
        );
        out.append(self.linearize_tree(group, container, depth + 1));
        out
    }

    fn convert_parents(
        &mut self,
        tree: &NodeTree,
        alias: &TargetExpr,
        depth: usize,
    ) -> CodeEmitter {
        let mut out = self.emitter();
        for (index, node) in tree.nodes.iter().enumerate() {
            let Some(parent) = node.field("parent") else {
                continue;
            };
            let node_expr = node_target(alias, index);
            let target = node_expr.attr("parent");
            let Some(fragment) = self.convert("parent", parent, &target, depth + 1) else {
                continue;
            };
            if fragment.is_empty() {
                continue;
            }
            out.line(depth, format!("if hasattr({}, 'parent'):", node_expr));
            out.append(fragment);
        }
        out
    }

    fn convert_links(&mut self, tree: &NodeTree, alias: &TargetExpr, depth: usize) -> CodeEmitter {
        let mut out = self.emitter();
        let mut seen = HashSet::new();

        for link in &tree.links {
            let resolved = match resolve_link(tree, link) {
                Ok(resolved) => resolved,
                Err(error) => {
                    let endpoints = format!(
                        "{}:{} -> {}:{}",
                        link.from_node, link.from_socket, link.to_node, link.to_socket
                    );
                    self.report("links", "NodeLink", &endpoints, &alias.attr("links"), &error);
                    continue;
                }
            };
            if !seen.insert(resolved) {
                tracing::debug!(
                    "[NTS] duplicate link {}:{} -> {}:{} dropped",
                    link.from_node,
                    link.from_socket,
                    link.to_node,
                    link.to_socket
                );
                continue;
            }

            out.line(
                depth,
                format!(
                    "{}.links.new({}.outputs[{}], {}.inputs[{}])",
                    alias,
                    node_target(alias, resolved.from_node),
                    resolved.from_socket,
                    node_target(alias, resolved.to_node),
                    resolved.to_socket
                ),
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::registry::ConverterRegistry;
    use crate::model::{Composite, Field, InterfaceSocket, Socket, Value};

    fn linearize(tree: &NodeTree) -> (String, usize) {
        let options = CompileOptions::default();
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);
        let code = ctx.linearize_tree(tree, tree, 0).finish();
        (code, ctx.diagnostics().len())
    }

    fn two_node_tree() -> NodeTree {
        let mut tree = NodeTree::new("Material", "ShaderNodeTree");
        tree.add_node(
            Node::new("A", "ShaderNodeSeparateXYZ")
                .with_output(Socket::new("NodeSocketFloat", "X"))
                .with_output(Socket::new("NodeSocketFloat", "Y")),
        );
        tree.add_node(
            Node::new("B", "ShaderNodeMath")
                .with_input(Socket::new("NodeSocketFloat", "Value"))
                .with_input(Socket::new("NodeSocketFloat", "Value").with_identifier("Value_001")),
        );
        tree.add_link(Link::new("A", "Y", "B", "Value"));
        tree
    }

    fn line_of(code: &str, needle: &str) -> usize {
        code.lines()
            .position(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("'{needle}' not in:\n{code}"))
    }

    #[test]
    fn test_two_nodes_and_link() {
        let (code, diagnostics) = linearize(&two_node_tree());
        assert_eq!(diagnostics, 0);

        let a = line_of(&code, "node_tree0.nodes.new('ShaderNodeSeparateXYZ')");
        let b = line_of(&code, "node_tree0.nodes.new('ShaderNodeMath')");
        let link = line_of(
            &code,
            "node_tree0.links.new(node_tree0.nodes[0].outputs[1], node_tree0.nodes[1].inputs[0])",
        );
        assert!(a < b && b < link);
        assert!(code.contains("# NODES"));
        assert!(code.contains("# LINKS"));
        assert!(!code.contains("# INPUTS"));
    }

    #[test]
    fn test_links_after_all_nodes() {
        let mut tree = two_node_tree();
        tree.add_node(
            Node::new("C", "ShaderNodeOutputMaterial")
                .with_input(Socket::new("NodeSocketShader", "Surface")),
        );
        tree.add_node(
            Node::new("D", "ShaderNodeValue").with_output(Socket::new("NodeSocketFloat", "Value")),
        );
        tree.add_link(Link::new("D", "Value", "B", "Value_001"));

        let (code, _) = linearize(&tree);
        let lines: Vec<&str> = code.lines().collect();
        let last_node = lines
            .iter()
            .rposition(|line| line.contains(".nodes.new("))
            .unwrap();
        let first_link = line_of(&code, ".links.new(");
        assert!(last_node < first_link);
        assert!(code.contains("node_tree0.nodes[3].outputs[0], node_tree0.nodes[1].inputs[1]"));
    }

    #[test]
    fn test_link_socket_index_matches_scan() {
        let tree = two_node_tree();
        for link in &tree.links {
            let resolved = resolve_link(&tree, link).unwrap();
            let from = &tree.nodes[resolved.from_node];
            let scanned = from
                .outputs
                .iter()
                .enumerate()
                .find(|(_, socket)| socket.identifier == link.from_socket)
                .map(|(i, _)| i);
            assert_eq!(Some(resolved.from_socket), scanned);

            let to = &tree.nodes[resolved.to_node];
            let scanned = to.inputs.iter().position(|socket| socket.identifier == link.to_socket);
            assert_eq!(Some(resolved.to_socket), scanned);
        }
    }

    #[test]
    fn test_duplicate_links_first_wins() {
        let mut tree = two_node_tree();
        tree.add_link(Link::new("A", "Y", "B", "Value"));
        let (code, diagnostics) = linearize(&tree);
        assert_eq!(code.matches(".links.new(").count(), 1);
        assert_eq!(diagnostics, 0);
    }

    #[test]
    fn test_unresolvable_link_reported() {
        let mut tree = two_node_tree();
        tree.add_link(Link::new("A", "Z", "B", "Value"));
        tree.add_link(Link::new("Ghost", "X", "B", "Value"));
        let (code, diagnostics) = linearize(&tree);
        assert_eq!(code.matches(".links.new(").count(), 1);
        assert_eq!(diagnostics, 2);
    }

    #[test]
    fn test_group_order() {
        let mut inner = NodeTree::new("Bumps", "ShaderNodeTree");
        inner.inputs.push(InterfaceSocket::new("NodeSocketInterfaceFloat", "Strength"));
        inner.add_node(
            Node::new("Group Input", "NodeGroupInput")
                .with_output(Socket::new("NodeSocketFloat", "Strength")),
        );

        let mut tree = NodeTree::new("Material", "ShaderNodeTree");
        tree.add_node(
            Node::group("Group", "ShaderNodeGroup", inner)
                .with_input(Socket::new("NodeSocketFloatFactor", "Amount"))
                .with_field(Field::new("width", Value::Float(180.0))),
        );
        let (code, diagnostics) = linearize(&tree);
        assert_eq!(diagnostics, 0);

        let lookup = line_of(&code, "node_tree1 = bpy.data.node_groups.get('Bumps')");
        let create = line_of(&code, "if not node_tree1:");
        let created = line_of(
            &code,
            "    node_tree1 = bpy.data.node_groups.new('Bumps', 'ShaderNodeTree')",
        );
        // ports come from the container's renamed view
        let port = line_of(&code, "    node_tree1.inputs.new('NodeSocketFloatFactor', 'Amount')");
        let nested = line_of(&code, "    node_tree1.nodes.new('NodeGroupInput')");
        let container = line_of(&code, "node_tree0.nodes.new('ShaderNodeGroup')");
        let attrs = line_of(&code, "node_tree0.nodes[0].width = 180.0");

        assert!(lookup < create && create < created && created < port);
        assert!(port < nested && nested < container && container < attrs);
        assert!(code.lines().nth(container).unwrap().starts_with("node_tree0"));
    }

    #[test]
    fn test_nested_groups_use_depth_aliases() {
        let mut innermost = NodeTree::new("Leaf", "ShaderNodeTree");
        innermost.add_node(Node::new("Value", "ShaderNodeValue"));
        let mut middle = NodeTree::new("Branch", "ShaderNodeTree");
        middle.add_node(Node::group("Leaf Group", "ShaderNodeGroup", innermost));
        let mut root = NodeTree::new("Root", "ShaderNodeTree");
        root.add_node(Node::group("Branch Group", "ShaderNodeGroup", middle));

        let (code, _) = linearize(&root);
        assert!(code.contains("node_tree1 = bpy.data.node_groups.get('Branch')"));
        assert!(code.contains("    node_tree2 = bpy.data.node_groups.get('Leaf')"));
        assert!(code.lines().any(|line| line == "        node_tree2.nodes.new('ShaderNodeValue')"));
        assert!(code.contains("    node_tree1.nodes.new('ShaderNodeGroup')"));
    }

    #[test]
    fn test_frame_parents_after_nodes() {
        let mut tree = NodeTree::new("Material", "ShaderNodeTree");
        tree.add_node(
            Node::new("Math", "ShaderNodeMath").with_field(Field::new(
                "parent",
                Composite::named("NodeFrame", "Frame").into_value(),
            )),
        );
        tree.add_node(Node::new("Frame", "NodeFrame"));

        let (code, _) = linearize(&tree);
        let frame = line_of(&code, "node_tree0.nodes.new('NodeFrame')");
        let guard = line_of(&code, "if hasattr(node_tree0.nodes[0], 'parent'):");
        let parent = line_of(
            &code,
            "    node_tree0.nodes[0].parent = node_tree0.nodes.get('Frame')",
        );
        assert!(frame < guard && guard + 1 == parent);
        assert!(code.contains("# PARENTS"));
    }

    #[test]
    fn test_section_comments_optional() {
        let options = CompileOptions {
            section_comments: false,
            ..CompileOptions::default()
        };
        let registry = ConverterRegistry::new();
        let mut ctx = ConvertContext::new(&options, &registry);
        let tree = two_node_tree();
        let code = ctx.linearize_tree(&tree, &tree, 0).finish();
        assert!(!code.contains('#'));
    }

    #[test]
    fn test_clear_source() {
        assert_eq!(
            clear_source("node_tree0", &CompileOptions::default()),
            "for node in list(node_tree0.nodes):\n    node_tree0.nodes.remove(node)\n"
        );
    }
}
