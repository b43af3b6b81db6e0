//! # Converter Registry
//!
//! Maps a runtime value to the converter that renders it. Dispatch order:
//!
//! 1. tuples and matrices → tuple literal
//! 2. booleans, numbers, sets → scalar literal
//! 3. strings → escaped literal
//! 4. collections → one fragment per element
//! 5. objects → built-in converter for the exact type name, then custom registrations
//! 6. anything else → unknown-type diagnostic, attribute omitted
//!
//! Built-in kinds form a closed set ([`ConverterKind`]); hosts with rarely-seen
//! composite types extend the registry with [`ConverterRegistry::register`].

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::reference::Namespace;
use crate::codegen::scalar;
use crate::codegen::target::TargetExpr;
use crate::codegen::walker::AttributePolicy;
use crate::error::SourceError;
use crate::model::{Composite, Value};
use std::collections::HashMap;

/// Collection-element kinds whose first slot always exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    File,
    Layer,
}

/// How an object of a given type name is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterKind {
    /// `target = <namespace>.get(name)`
    Lookup(Namespace),
    /// Load from the external directory when absent, then look up
    GuardedLoad(Namespace),
    /// Recreated by name and populated when absent
    Texture,
    /// Walk attributes with a policy
    Complex(AttributePolicy),
    CurveMapPoint,
    ColorRampElement,
    OutputSlot(SlotKind),
    CurveProfile,
    /// Sibling frame node, looked up by name in the enclosing tree
    NodeFrame,
}

const TEXTURE_TYPES: &[&str] = &[
    "ImageTexture",
    "BlendTexture",
    "CloudsTexture",
    "DistortedNoiseTexture",
    "MagicTexture",
    "MarbleTexture",
    "MusgraveTexture",
    "NoiseTexture",
    "StucciTexture",
    "VoronoiTexture",
    "WoodTexture",
];

const NODE_TREE_TYPES: &[&str] = &[
    "ShaderNodeTree",
    "CompositorNodeTree",
    "GeometryNodeTree",
    "TextureNodeTree",
];

impl ConverterKind {
    /// Built-in converter for `type_name`
    pub fn builtin(type_name: &str) -> Option<Self> {
        let kind = match type_name {
            "Scene" => Self::Lookup(Namespace::Scenes),
            "Object" => Self::Lookup(Namespace::Objects),
            "Text" => Self::Lookup(Namespace::Texts),
            "ParticleSystem" => Self::Lookup(Namespace::ParticleSystems),
            name if NODE_TREE_TYPES.contains(&name) => Self::Lookup(Namespace::NodeGroups),
            "Image" => Self::GuardedLoad(Namespace::Images),
            "CacheFile" => Self::GuardedLoad(Namespace::CacheFiles),
            name if TEXTURE_TYPES.contains(&name) => Self::Texture,
            "NodeFrame" => Self::NodeFrame,
            "CurveMapping" => Self::Complex(AttributePolicy::new().complex(["curves"])),
            "CurveMap" => Self::Complex(AttributePolicy::new().complex(["points"])),
            "CurveMapPoint" => Self::CurveMapPoint,
            "CurveProfile" => Self::CurveProfile,
            "CurveProfilePoint" | "ImageUser" | "TexMapping" => {
                Self::Complex(AttributePolicy::new())
            }
            "ColorMapping" => Self::Complex(AttributePolicy::new().complex(["color_ramp"])),
            "ColorRamp" => Self::Complex(AttributePolicy::new().complex(["elements"])),
            "ColorRampElement" => Self::ColorRampElement,
            "ImageFormatSettings" => {
                Self::Complex(AttributePolicy::new().preorder(["file_format"]))
            }
            "NodeOutputFileSlotFile" => Self::OutputSlot(SlotKind::File),
            "NodeOutputFileSlotLayer" => Self::OutputSlot(SlotKind::Layer),
            name if name.starts_with("NodeSocket") => {
                Self::Complex(AttributePolicy::new().exclude(["type"]))
            }
            _ => return None,
        };
        Some(kind)
    }
}

/// Built-in converters plus host-specific composite registrations
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    custom: HashMap<String, AttributePolicy>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk objects of `type_name` with `policy`. Built-in kinds take precedence.
    pub fn register(&mut self, type_name: impl Into<String>, policy: AttributePolicy) -> &mut Self {
        let type_name = type_name.into();
        if ConverterKind::builtin(&type_name).is_some() {
            tracing::debug!("[NTS] '{}' is built in; registration ignored", type_name);
            return self;
        }
        self.custom.insert(type_name, policy);
        self
    }

    pub fn resolve(&self, type_name: &str) -> Option<ConverterKind> {
        ConverterKind::builtin(type_name).or_else(|| {
            self.custom
                .get(type_name)
                .map(|policy| ConverterKind::Complex(policy.clone()))
        })
    }
}

impl ConvertContext<'_> {
    /// Render `value` at `target`. `None` means the attribute is omitted.
    pub fn convert(
        &mut self,
        attribute: &str,
        value: &Value,
        target: &TargetExpr,
        depth: usize,
    ) -> Option<CodeEmitter> {
        let result = match value {
            Value::None => return None,
            Value::Collection(items) => Ok(self.convert_collection(items, target, depth)),
            Value::Object(composite) => self.convert_object(attribute, composite, target, depth),
            literal => match scalar::encode(literal, target) {
                Some(line) => {
                    let mut out = self.emitter();
                    out.line(depth, line);
                    Ok(out)
                }
                None => Err(SourceError::UnknownType {
                    attribute: attribute.to_string(),
                    type_name: literal.type_name().to_string(),
                }),
            },
        };

        match result {
            Ok(fragment) => Some(fragment),
            Err(error) => {
                self.report(attribute, value.type_name(), &value.describe(), target, &error);
                None
            }
        }
    }

    fn convert_object(
        &mut self,
        attribute: &str,
        composite: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let kind = self.registry.resolve(&composite.type_name).ok_or_else(|| {
            SourceError::UnknownType {
                attribute: attribute.to_string(),
                type_name: composite.type_name.clone(),
            }
        })?;

        match kind {
            ConverterKind::Lookup(namespace) => {
                self.convert_lookup(namespace, composite, target, depth)
            }
            ConverterKind::GuardedLoad(namespace) => {
                self.convert_guarded_load(namespace, composite, target, depth)
            }
            ConverterKind::Texture => self.convert_texture(composite, target, depth),
            ConverterKind::Complex(policy) => {
                Ok(self.convert_complex(composite, &policy, target, depth))
            }
            ConverterKind::CurveMapPoint => self.convert_curve_point(composite, target, depth),
            ConverterKind::ColorRampElement => self.convert_ramp_element(composite, target, depth),
            ConverterKind::OutputSlot(slot) => {
                self.convert_output_slot(slot, composite, target, depth)
            }
            ConverterKind::CurveProfile => self.convert_curve_profile(composite, target, depth),
            ConverterKind::NodeFrame => self.convert_frame_reference(composite, target, depth),
        }
    }
}
