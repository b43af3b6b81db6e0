//! Ordered collections: one fragment per element, addressed by position.

use crate::codegen::context::ConvertContext;
use crate::codegen::emitter::CodeEmitter;
use crate::codegen::target::TargetExpr;
use crate::model::Value;

impl ConvertContext<'_> {
    pub fn convert_collection(
        &mut self,
        items: &[Value],
        target: &TargetExpr,
        depth: usize,
    ) -> CodeEmitter {
        let mut out = self.emitter();
        for (index, item) in items.iter().enumerate() {
            let item_target = target.index(index);
            let attribute = format!("[{}]", index);
            if let Some(fragment) = self.convert(&attribute, item, &item_target, depth) {
                out.append(fragment);
            }
        }
        out
    }
}
