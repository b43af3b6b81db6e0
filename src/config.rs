//! Compile options.

use serde::{Deserialize, Serialize};

/// Knobs for the generated script's host API shape and layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// One indentation unit
    pub indent: String,
    /// Prefix of the depth-scoped tree aliases (`node_tree0`, `node_tree1`, ...)
    pub tree_alias: String,
    /// Host-global data namespace
    pub data_root: String,
    /// Object whose particle systems are looked up
    pub context_object: String,
    /// Variable holding the external asset directory at replay time
    pub external_dir: String,
    /// Emit `# NODES`-style section comments
    pub section_comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            tree_alias: "node_tree".to_string(),
            data_root: "bpy.data".to_string(),
            context_object: "bpy.context.active_object".to_string(),
            external_dir: "external_items_dir".to_string(),
            section_comments: true,
        }
    }
}

impl CompileOptions {
    /// Alias of the tree linearized at `depth`
    pub fn tree_alias(&self, depth: usize) -> String {
        format!("{}{}", self.tree_alias, depth)
    }
}
