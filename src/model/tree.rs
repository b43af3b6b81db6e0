//! Node trees, nodes, sockets and links as supplied by the host.

use crate::model::value::{Attributes, Field};
use serde::{Deserialize, Serialize};

/// A declared top-level port of a node tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSocket {
    pub bl_idname: String,
    pub name: String,
}

impl InterfaceSocket {
    pub fn new(bl_idname: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bl_idname: bl_idname.into(),
            name: name.into(),
        }
    }
}

/// An input or output socket of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    /// Unique within the node's input (or output) list
    pub identifier: String,
    pub name: String,
    pub bl_idname: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Socket {
    pub fn new(bl_idname: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            identifier: name.clone(),
            name,
            bl_idname: bl_idname.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

impl Attributes for Socket {
    fn type_name(&self) -> &str {
        &self.bl_idname
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A vertex of the node tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Host node category, e.g. `GROUP`, `FRAME`, `MATH`
    #[serde(rename = "type", default)]
    pub node_type: String,
    pub bl_idname: String,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    /// Nested tree of a group container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_tree: Option<Box<NodeTree>>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Node {
    pub fn new(name: impl Into<String>, bl_idname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: String::new(),
            bl_idname: bl_idname.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            node_tree: None,
            fields: Vec::new(),
        }
    }

    /// Create a group container referencing `tree`
    pub fn group(name: impl Into<String>, bl_idname: impl Into<String>, tree: NodeTree) -> Self {
        let mut node = Self::new(name, bl_idname);
        node.node_type = "GROUP".to_string();
        node.node_tree = Some(Box::new(tree));
        node
    }

    pub fn with_input(mut self, socket: Socket) -> Self {
        self.inputs.push(socket);
        self
    }

    pub fn with_output(mut self, socket: Socket) -> Self {
        self.outputs.push(socket);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_group(&self) -> bool {
        self.node_tree.is_some()
    }

    /// Position of the input socket with `identifier`
    pub fn input_index(&self, identifier: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.identifier == identifier)
    }

    /// Position of the output socket with `identifier`
    pub fn output_index(&self, identifier: &str) -> Option<usize> {
        self.outputs.iter().position(|s| s.identifier == identifier)
    }
}

impl Attributes for Node {
    fn type_name(&self) -> &str {
        &self.bl_idname
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A connection from one node's output socket to another node's input socket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

impl Link {
    pub fn new(
        from_node: impl Into<String>,
        from_socket: impl Into<String>,
        to_node: impl Into<String>,
        to_socket: impl Into<String>,
    ) -> Self {
        Self {
            from_node: from_node.into(),
            from_socket: from_socket.into(),
            to_node: to_node.into(),
            to_socket: to_socket.into(),
        }
    }
}

/// A node tree: ordered nodes, ordered links and declared ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    pub name: String,
    /// Tree kind, e.g. `ShaderNodeTree`
    pub bl_idname: String,
    #[serde(default)]
    pub inputs: Vec<InterfaceSocket>,
    #[serde(default)]
    pub outputs: Vec<InterfaceSocket>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl NodeTree {
    pub fn new(name: impl Into<String>, bl_idname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bl_idname: bl_idname.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Position and node with `name`
    pub fn node(&self, name: &str) -> Option<(usize, &Node)> {
        self.nodes.iter().enumerate().find(|(_, node)| node.name == name)
    }
}

/// Port names and types a tree's top-level ports are created from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec<'a> {
    pub bl_idname: &'a str,
    pub name: &'a str,
}

/// The owner of a tree invocation. Its view of the ports may be filtered or renamed
/// compared to the tree's own declaration, so port statements read from it.
pub trait PortOwner {
    fn input_ports(&self) -> Vec<PortSpec<'_>>;

    fn output_ports(&self) -> Vec<PortSpec<'_>>;
}

impl PortOwner for NodeTree {
    fn input_ports(&self) -> Vec<PortSpec<'_>> {
        interface_ports(&self.inputs)
    }

    fn output_ports(&self) -> Vec<PortSpec<'_>> {
        interface_ports(&self.outputs)
    }
}

impl PortOwner for Node {
    fn input_ports(&self) -> Vec<PortSpec<'_>> {
        socket_ports(&self.inputs)
    }

    fn output_ports(&self) -> Vec<PortSpec<'_>> {
        socket_ports(&self.outputs)
    }
}

fn interface_ports(ports: &[InterfaceSocket]) -> Vec<PortSpec<'_>> {
    ports
        .iter()
        .map(|p| PortSpec {
            bl_idname: &p.bl_idname,
            name: &p.name,
        })
        .collect()
}

fn socket_ports(sockets: &[Socket]) -> Vec<PortSpec<'_>> {
    sockets
        .iter()
        .map(|s| PortSpec {
            bl_idname: &s.bl_idname,
            name: &s.name,
        })
        .collect()
}
