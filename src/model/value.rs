//! # Host Values
//!
//! The closed set of runtime values a node tree snapshot can carry, plus the
//! [`Attributes`] seam the attribute walker reflects over.

use serde::{Deserialize, Serialize};

/// Fixed-size tuple flavours the host exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleKind {
    Vector,
    Color,
    Euler,
    Quaternion,
    /// Plain property array (`bpy_prop_array`)
    PropArray,
}

impl TupleKind {
    /// Host type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Vector => "Vector",
            Self::Color => "Color",
            Self::Euler => "Euler",
            Self::Quaternion => "Quaternion",
            Self::PropArray => "bpy_prop_array",
        }
    }
}

/// A runtime value read from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Enum-flag set of identifiers
    Set(Vec<String>),
    Tuple { kind: TupleKind, items: Vec<Value> },
    Matrix(Vec<Vec<f64>>),
    Collection(Vec<Value>),
    Object(Composite),
}

impl Value {
    /// Host type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Set(_) => "set",
            Value::Tuple { kind, .. } => kind.type_name(),
            Value::Matrix(_) => "Matrix",
            Value::Collection(_) => "bpy_prop_collection",
            Value::Object(composite) => &composite.type_name,
        }
    }

    /// Shorthand for a vector tuple of floats
    pub fn vector(items: &[f64]) -> Self {
        Self::float_tuple(TupleKind::Vector, items)
    }

    /// Shorthand for a color tuple of floats
    pub fn color(items: &[f64]) -> Self {
        Self::float_tuple(TupleKind::Color, items)
    }

    pub fn float_tuple(kind: TupleKind, items: &[f64]) -> Self {
        Value::Tuple {
            kind,
            items: items.iter().copied().map(Value::Float).collect(),
        }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// Empty strings and `None` are never emitted
    pub fn is_blank(&self) -> bool {
        match self {
            Value::None => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Short rendering for diagnostics: an object's name, or the value itself
    pub fn describe(&self) -> String {
        match self {
            Value::Object(composite) => match &composite.name {
                Some(name) => format!("{} '{}'", composite.type_name, name),
                None => format!("<{}>", composite.type_name),
            },
            Value::Collection(items) => format!("[{} item(s)]", items.len()),
            other => format!("{:?}", other),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One attribute of a composite as the host reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub readonly: bool,
    pub value: Value,
}

impl Field {
    /// Create a writable field
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            readonly: false,
            value,
        }
    }

    /// Create a field the host reports as read-only
    pub fn readonly(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            readonly: true,
            value,
        }
    }
}

/// A value with named attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub type_name: String,
    /// Stable name in a host-global namespace, for external entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Composite {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            fields: Vec::new(),
        }
    }

    /// Create a named external entity (image, scene, node group, ...)
    pub fn named(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self)
    }
}

/// Anything the attribute walker can reflect over
pub trait Attributes {
    fn type_name(&self) -> &str;

    fn fields(&self) -> &[Field];

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields()
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

impl Attributes for Composite {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_values() {
        let image = Composite::named("Image", "wood.png").into_value();
        assert_eq!(image.describe(), "Image 'wood.png'");
        assert_eq!(Composite::new("Gadget").into_value().describe(), "<Gadget>");
        assert_eq!(Value::Int(3).describe(), "Int(3)");
        assert_eq!(Value::Collection(vec![Value::None]).describe(), "[1 item(s)]");
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::vector(&[0.0, 1.0]).type_name(), "Vector");
        assert_eq!(Value::Collection(Vec::new()).type_name(), "bpy_prop_collection");
        assert_eq!(Composite::new("ColorRamp").into_value().type_name(), "ColorRamp");
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::None.is_blank());
        assert!(Value::str("").is_blank());
        assert!(!Value::str("x").is_blank());
        assert!(!Value::Int(0).is_blank());
    }

    #[test]
    fn test_snapshot_value_json() {
        let json =
            r#"{"kind":"tuple","value":{"kind":"color","items":[{"kind":"float","value":1.0}]}}"#;
        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value, Value::color(&[1.0]));

        let field: Field = serde_json::from_str(r#"{"name":"x","value":{"kind":"none"}}"#).unwrap();
        assert!(!field.readonly);
        assert_eq!(field.value, Value::None);
    }
}
