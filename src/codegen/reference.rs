//! # Reference Resolution
//!
//! External entities live in host-global namespaces and are identified by a stable
//! name. They are never recursed into: only the name is used, either for a plain
//! lookup or for a guarded load from the external asset directory:
//!
//! ```text
//! if 'wood.png' not in bpy.data.images:
//!     if os.path.exists(os.path.join(external_items_dir, 'wood.png')):
//!         bpy.data.images.load(os.path.join(external_items_dir, 'wood.png'))
//! node_tree0.nodes[1].image = bpy.data.images.get('wood.png')
//! ```
//!
//! The `not in` guard makes replaying against a host that already has the entity a
//! no-op. No file I/O happens here; existence is checked by the replayed script.

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::scalar::quote;
use crate::codegen::target::TargetExpr;
use crate::codegen::walker::AttributePolicy;
use crate::config::CompileOptions;
use crate::error::SourceError;
use crate::model::{Attributes, Composite};

/// Host-global entity namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Scenes,
    Objects,
    Texts,
    NodeGroups,
    /// Particle systems of the active object
    ParticleSystems,
    Images,
    CacheFiles,
    Textures,
}

impl Namespace {
    /// Collection expression of this namespace
    pub fn collection(&self, options: &CompileOptions) -> String {
        let data = match self {
            Self::ParticleSystems => return format!("{}.particle_systems", options.context_object),
            Self::Scenes => "scenes",
            Self::Objects => "objects",
            Self::Texts => "texts",
            Self::NodeGroups => "node_groups",
            Self::Images => "images",
            Self::CacheFiles => "cache_files",
            Self::Textures => "textures",
        };
        format!("{}.{}", options.data_root, data)
    }

    /// Statement loading `path` into this namespace at replay time
    fn load_call(&self, options: &CompileOptions, path: &str) -> Option<String> {
        match self {
            Self::Images => Some(format!("{}.load({})", self.collection(options), path)),
            Self::CacheFiles => Some(format!("bpy.ops.cachefile.open(filepath={})", path)),
            _ => None,
        }
    }
}

/// Stable name of an external entity
fn entity_name(entity: &Composite) -> Result<&str, SourceError> {
    entity
        .name
        .as_deref()
        .or_else(|| entity.field("name").and_then(|v| v.as_str()))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SourceError::MissingName {
            type_name: entity.type_name.clone(),
        })
}

impl ConvertContext<'_> {
    /// `<namespace>.get('name')`
    pub fn lookup_expr(&self, namespace: Namespace, name: &str) -> String {
        format!("{}.get({})", namespace.collection(self.options), quote(name))
    }

    pub(crate) fn convert_lookup(
        &mut self,
        namespace: Namespace,
        entity: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let name = entity_name(entity)?;
        let mut out = self.emitter();
        out.line(depth, target.assign(&self.lookup_expr(namespace, name)));
        Ok(out)
    }

    pub(crate) fn convert_guarded_load(
        &mut self,
        namespace: Namespace,
        entity: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let name = entity_name(entity)?;
        let path = format!("os.path.join({}, {})", self.options.external_dir, quote(name));
        let mut out = self.emitter();

        if let Some(load) = namespace.load_call(self.options, &path) {
            let collection = namespace.collection(self.options);
            out.line(depth, format!("if {} not in {}:", quote(name), collection));
            out.line(depth + 1, format!("if os.path.exists({}):", path));
            out.line(depth + 2, load);
        }
        out.line(depth, target.assign(&self.lookup_expr(namespace, name)));
        Ok(out)
    }

    /// Textures are recreated by name and populated only when newly created
    pub(crate) fn convert_texture(
        &mut self,
        texture: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let name = entity_name(texture)?;
        let texture_type = texture
            .field("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SourceError::MissingField {
                type_name: texture.type_name.clone(),
                field: "type".to_string(),
            })?;

        let alias = format!("texture{}", depth);
        let textures = Namespace::Textures.collection(self.options);
        let mut out = self.emitter();
        out.line(depth, format!("{} = {}", alias, self.lookup_expr(Namespace::Textures, name)));
        out.line(depth, format!("if not {}:", alias));
        out.line(
            depth + 1,
            format!(
                "{} = {}.new(name={}, type={})",
                alias,
                textures,
                quote(name),
                quote(texture_type)
            ),
        );

        let policy = AttributePolicy::new()
            .exclude(["name", "type"])
            .preorder(["use_color_ramp"])
            .complex(["color_ramp"]);
        let texture_target = TargetExpr::new(alias.clone(), target.scope());
        let body = self.convert_complex(texture, &policy, &texture_target, depth + 1);
        out.append(body);

        out.line(depth, target.assign(&alias));
        Ok(out)
    }

    /// Frames are sibling nodes; the tree alias comes from the target's scope
    pub(crate) fn convert_frame_reference(
        &mut self,
        frame: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let name = entity_name(frame)?;
        let nodes = format!("{}.nodes", self.options.tree_alias(target.scope()));
        let mut out = self.emitter();
        out.line(depth, target.assign(&format!("{}.get({})", nodes, quote(name))));
        Ok(out)
    }
}
