//! # Attribute Walker
//!
//! Generic converter for composite values. Selects the attributes to emit and
//! dispatches each one back through the registry:
//!
//! ```text
//! if hasattr(node_tree0.nodes[2], 'operation'):
//!     node_tree0.nodes[2].operation = 'MULTIPLY'
//! ```
//!
//! The `hasattr` guard keeps every assignment individually skippable when the
//! replay host lacks the attribute.

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::scalar;
use crate::codegen::target::TargetExpr;
use crate::model::{Attributes, Field};
use serde::{Deserialize, Serialize};

/// Per-type attribute handling
///
/// - `excluded`: never emitted
/// - `preordered`: emitted before everything else, because setting them changes
///   which other attributes exist (mode selectors)
/// - `complex`: reported read-only by the host but still recursed into, since their
///   own nested fields are writable (curve mappings, color ramps)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributePolicy {
    pub excluded: Vec<String>,
    pub preordered: Vec<String>,
    pub complex: Vec<String>,
}

impl AttributePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn preorder<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preordered.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn complex<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.complex.extend(names.into_iter().map(Into::into));
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|n| n == name)
    }

    fn is_preordered(&self, name: &str) -> bool {
        self.preordered.iter().any(|n| n == name)
    }

    fn is_complex(&self, name: &str) -> bool {
        self.complex.iter().any(|n| n == name)
    }
}

/// Internal and host-framework names are skipped, except the type identifier
fn is_public(name: &str) -> bool {
    !name.starts_with("__") && (!name.starts_with("bl_") || name == "bl_idname")
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the only names usable after a `.` in a target path
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Fields of `value` to emit, preordered ones first, host order within each group
pub fn eligible_attributes<'v>(
    value: &'v dyn Attributes,
    policy: &AttributePolicy,
) -> Vec<&'v Field> {
    let (mut preordered, remaining): (Vec<&Field>, Vec<&Field>) = value
        .fields()
        .iter()
        .filter(|field| {
            if !is_identifier(&field.name) {
                tracing::debug!("[NTS] attribute '{}' is not an identifier; skipped", field.name);
                return false;
            }
            is_public(&field.name)
                && !field.value.is_blank()
                && !policy.is_excluded(&field.name)
                && (!field.readonly || policy.is_complex(&field.name))
        })
        .partition(|field| policy.is_preordered(&field.name));

    preordered.extend(remaining);
    preordered
}

impl ConvertContext<'_> {
    /// Guarded statements for every eligible attribute of `value`
    pub fn convert_complex(
        &mut self,
        value: &dyn Attributes,
        policy: &AttributePolicy,
        target: &TargetExpr,
        depth: usize,
    ) -> CodeEmitter {
        let mut out = self.emitter();

        for field in eligible_attributes(value, policy) {
            let field_target = target.attr(&field.name);
            let fragment = self.convert(&field.name, &field.value, &field_target, depth + 1);
            let Some(fragment) = fragment else {
                continue;
            };
            if fragment.is_empty() {
                continue;
            }
            out.line(depth, format!("if hasattr({}, {}):", target, scalar::quote(&field.name)));
            out.append(fragment);
        }

        out
    }
}
