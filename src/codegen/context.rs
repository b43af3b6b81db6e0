//! Per-pass conversion state.

use crate::codegen::emitter::CodeEmitter;
use crate::codegen::registry::ConverterRegistry;
use crate::codegen::target::TargetExpr;
use crate::config::CompileOptions;
use crate::error::{Diagnostic, SourceError};

/// State of one serialization pass.
///
/// Converters are spread across the `codegen` modules as `impl` blocks on this type;
/// the only mutable state is the diagnostics list, the script itself is returned as
/// [`CodeEmitter`] fragments.
pub struct ConvertContext<'a> {
    pub(crate) options: &'a CompileOptions,
    pub(crate) registry: &'a ConverterRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ConvertContext<'a> {
    pub fn new(options: &'a CompileOptions, registry: &'a ConverterRegistry) -> Self {
        Self {
            options,
            registry,
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        self.options
    }

    /// Fresh fragment using the configured indentation unit
    pub fn emitter(&self) -> CodeEmitter {
        CodeEmitter::new(self.options.indent.clone())
    }

    /// Record an unresolvable value and keep going
    pub fn report(
        &mut self,
        attribute: &str,
        type_name: &str,
        value: &str,
        target: &TargetExpr,
        error: &SourceError,
    ) {
        tracing::warn!(
            "[NTS] {} (attribute '{}', type '{}', value {}, at '{}')",
            error,
            attribute,
            type_name,
            value,
            target
        );
        self.diagnostics.push(Diagnostic::new(
            attribute,
            type_name,
            value,
            target.as_str(),
            error,
        ));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
