//! # Recreate-in-place Elements
//!
//! Collection members that must be created before their attributes can be set,
//! because the destination collection may hold fewer elements than the source:
//!
//! ```text
//! if 2 >= len(node_tree0.nodes[4].color_ramp.elements):
//!     node_tree0.nodes[4].color_ramp.elements.new(0.75)
//! if hasattr(node_tree0.nodes[4].color_ramp.elements[2], 'color'):
//!     ...
//! ```
//!
//! The length guard makes replay idempotent once the destination is populated.
//! The element position comes from the target's [`ElementSlot`], never from the
//! expression text.

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::registry::SlotKind;
use crate::codegen::scalar::{format_float, quote};
use crate::codegen::target::{ElementSlot, TargetExpr};
use crate::codegen::walker::AttributePolicy;
use crate::error::SourceError;
use crate::model::{Attributes, Composite, Value};

fn element_slot<'t>(
    element: &Composite,
    target: &'t TargetExpr,
) -> Result<&'t ElementSlot, SourceError> {
    target.element().ok_or_else(|| SourceError::NotAnElement {
        type_name: element.type_name.clone(),
        expression: target.as_str().to_string(),
    })
}

fn missing_field(element: &Composite, field: &str) -> SourceError {
    SourceError::MissingField {
        type_name: element.type_name.clone(),
        field: field.to_string(),
    }
}

/// `if i >= len(coll):` / `coll.new(args)`
fn existence_guard(out: &mut CodeEmitter, slot: &ElementSlot, args: &str, depth: usize) {
    out.line(depth, format!("if {} >= len({}):", slot.index, slot.collection));
    out.line(depth + 1, format!("{}.new({})", slot.collection, args));
}

impl ConvertContext<'_> {
    pub(crate) fn convert_curve_point(
        &mut self,
        point: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let slot = element_slot(point, target)?;
        let location = match point.field("location") {
            Some(Value::Tuple { items, .. }) => match (items.first(), items.get(1)) {
                (Some(x), Some(y)) => x.as_f64().zip(y.as_f64()),
                _ => None,
            },
            _ => None,
        };
        let (x, y) = location.ok_or_else(|| missing_field(point, "location"))?;

        let mut out = self.emitter();
        let args = format!("{}, {}", format_float(x), format_float(y));
        existence_guard(&mut out, slot, &args, depth);
        out.append(self.convert_complex(point, &AttributePolicy::new(), target, depth));
        Ok(out)
    }

    pub(crate) fn convert_ramp_element(
        &mut self,
        element: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let slot = element_slot(element, target)?;
        let position = element
            .field("position")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing_field(element, "position"))?;

        let mut out = self.emitter();
        existence_guard(&mut out, slot, &format_float(position), depth);
        out.append(self.convert_complex(element, &AttributePolicy::new(), target, depth));
        Ok(out)
    }

    /// File-output slots: the first slot exists by construction
    pub(crate) fn convert_output_slot(
        &mut self,
        kind: SlotKind,
        element: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let slot = element_slot(element, target)?;
        let (key, policy) = match kind {
            SlotKind::File => ("path", AttributePolicy::new().complex(["format"])),
            SlotKind::Layer => ("name", AttributePolicy::new()),
        };

        let mut out = self.emitter();
        if slot.index > 0 {
            let label = element
                .field(key)
                .and_then(Value::as_str)
                .unwrap_or(element.type_name.as_str());
            existence_guard(&mut out, slot, &quote(label), depth);
        }
        out.append(self.convert_complex(element, &policy, target, depth));
        Ok(out)
    }

    /// Profiles start with their two end points; the rest are added up to the
    /// source count before the points are walked
    pub(crate) fn convert_curve_profile(
        &mut self,
        profile: &Composite,
        target: &TargetExpr,
        depth: usize,
    ) -> Result<CodeEmitter, SourceError> {
        let count = match profile.field("points") {
            Some(Value::Collection(points)) => points.len(),
            _ => return Err(missing_field(profile, "points")),
        };

        let mut out = self.emitter();
        if count > 2 {
            let points = target.attr("points");
            out.line(depth, format!("for i in range(len({}), {}):", points, count));
            out.line(depth + 1, format!("{}.add(x=0.0, y=0.0)", points));
        }
        let policy = AttributePolicy::new().complex(["points"]);
        out.append(self.convert_complex(profile, &policy, target, depth));
        Ok(out)
    }
}
