//! # Errors and Diagnostics
//!
//! Converter failures are local to one attribute, node socket or link. They are
//! turned into [`Diagnostic`]s and the offending statement is omitted; only a
//! malformed snapshot fails a whole call.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("undefined type '{type_name}' for attribute '{attribute}'")]
    UnknownType { attribute: String, type_name: String },

    #[error("'{type_name}' at '{expression}' is not addressed as a collection element")]
    NotAnElement { type_name: String, expression: String },

    #[error("'{type_name}' has no field '{field}'")]
    MissingField { type_name: String, field: String },

    #[error("'{type_name}' is an external entity without a name")]
    MissingName { type_name: String },

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("socket '{socket}' not found on node '{node}'")]
    SocketNotFound { node: String, socket: String },

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// An unresolvable value, reported instead of being written into the script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub attribute: String,
    pub type_name: String,
    /// Rendering of the offending value
    pub value: String,
    /// Enclosing target expression
    pub expression: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        attribute: &str,
        type_name: &str,
        value: &str,
        expression: &str,
        error: &SourceError,
    ) -> Self {
        Self {
            attribute: attribute.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
            expression: expression.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_message() {
        let error = SourceError::UnknownType {
            attribute: "mystery".to_string(),
            type_name: "Widget".to_string(),
        };
        let diagnostic =
            Diagnostic::new("mystery", "Widget", "Widget 'Knob'", "node_tree0.nodes[0]", &error);
        assert_eq!(diagnostic.message, "undefined type 'Widget' for attribute 'mystery'");
        assert_eq!(diagnostic.value, "Widget 'Knob'");
        assert_eq!(diagnostic.expression, "node_tree0.nodes[0]");
    }

    #[test]
    fn test_snapshot_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let error: SourceError = parse.unwrap_err().into();
        assert!(error.to_string().starts_with("invalid snapshot"));
    }
}
