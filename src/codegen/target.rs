//! # Target Expressions
//!
//! The destination-side address of a value. A target grows by `.attr` or
//! `[index]`; indexing records the owning collection and the integer position so
//! element converters never have to parse generated text back.

use std::fmt;

/// Owning collection and position of an indexed target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSlot {
    pub collection: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetExpr {
    expr: String,
    element: Option<ElementSlot>,
    /// Nesting depth of the tree this expression hangs off
    scope: usize,
}

impl TargetExpr {
    pub fn new(expr: impl Into<String>, scope: usize) -> Self {
        Self {
            expr: expr.into(),
            element: None,
            scope,
        }
    }

    /// Target with no left-hand side; converters emit bare expressions
    pub fn none() -> Self {
        Self::default()
    }

    pub fn attr(&self, name: &str) -> Self {
        Self {
            expr: format!("{}.{}", self.expr, name),
            element: None,
            scope: self.scope,
        }
    }

    pub fn index(&self, index: usize) -> Self {
        Self {
            expr: format!("{}[{}]", self.expr, index),
            element: Some(ElementSlot {
                collection: self.expr.clone(),
                index,
            }),
            scope: self.scope,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    pub fn element(&self) -> Option<&ElementSlot> {
        self.element.as_ref()
    }

    pub fn scope(&self) -> usize {
        self.scope
    }

    /// `expr = rhs`, or just `rhs` for an empty target
    pub fn assign(&self, rhs: &str) -> String {
        if self.expr.is_empty() {
            rhs.to_string()
        } else {
            format!("{} = {}", self.expr, rhs)
        }
    }
}

impl fmt::Display for TargetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_growth() {
        let target = TargetExpr::new("node_tree0", 0).attr("nodes").index(3).attr("color_ramp");
        assert_eq!(target.as_str(), "node_tree0.nodes[3].color_ramp");
        assert!(target.element().is_none());
    }

    #[test]
    fn test_element_slot_any_width() {
        let target = TargetExpr::new("ramp", 1).attr("elements").index(12);
        let slot = target.element().unwrap();
        assert_eq!(slot.collection, "ramp.elements");
        assert_eq!(slot.index, 12);
        assert_eq!(target.scope(), 1);
    }

    #[test]
    fn test_assign() {
        assert_eq!(TargetExpr::new("x.color", 0).assign("(1.0,)"), "x.color = (1.0,)");
        assert_eq!(TargetExpr::none().assign("True"), "True");
    }
}
