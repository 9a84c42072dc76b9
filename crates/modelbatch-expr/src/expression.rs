//! Class expression values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ExprError;

// ============================================================================
// Expression structures
// ============================================================================

/// A normalized class expression, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClassExpression {
    /// A named class, e.g. `GO:0008150`.
    Class {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Existential restriction: `property some filler`.
    Svf {
        property: Property,
        filler: Box<ClassExpression>,
    },
    Intersection {
        expressions: Vec<ClassExpression>,
    },
    Union {
        expressions: Vec<ClassExpression>,
    },
    Complement {
        filler: Box<ClassExpression>,
    },
}

/// An object property reference inside a restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "property")]
pub struct Property {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Property {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }
}

impl ClassExpression {
    pub fn class(id: impl Into<String>) -> Self {
        ClassExpression::Class {
            id: id.into(),
            label: None,
        }
    }

    pub fn labeled_class(id: impl Into<String>, label: impl Into<String>) -> Self {
        ClassExpression::Class {
            id: id.into(),
            label: Some(label.into()),
        }
    }

    pub fn some_values_from(property: Property, filler: ClassExpression) -> Self {
        ClassExpression::Svf {
            property,
            filler: Box::new(filler),
        }
    }

    /// Build a set expression of the given kind.
    pub fn set(kind: SetKind, expressions: Vec<ClassExpression>) -> Self {
        match kind {
            SetKind::Intersection => ClassExpression::Intersection { expressions },
            SetKind::Union => ClassExpression::Union { expressions },
        }
    }

    pub fn complement(filler: ClassExpression) -> Self {
        ClassExpression::Complement {
            filler: Box::new(filler),
        }
    }

    /// The class id when this is a plain named class.
    pub fn class_id(&self) -> Option<&str> {
        match self {
            ClassExpression::Class { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Every named class id referenced anywhere in the expression, in
    /// depth-first order.
    pub fn referenced_classes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_classes(&mut out);
        out
    }

    fn collect_classes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ClassExpression::Class { id, .. } => out.push(id),
            ClassExpression::Svf { filler, .. } | ClassExpression::Complement { filler } => {
                filler.collect_classes(out)
            }
            ClassExpression::Intersection { expressions }
            | ClassExpression::Union { expressions } => {
                for e in expressions {
                    e.collect_classes(out);
                }
            }
        }
    }
}

/// Manchester-style rendering, used in log lines.
impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassExpression::Class { id, .. } => write!(f, "{}", id),
            ClassExpression::Svf { property, filler } => {
                write!(f, "({} some {})", property.id, filler)
            }
            ClassExpression::Intersection { expressions } => write_joined(f, expressions, "and"),
            ClassExpression::Union { expressions } => write_joined(f, expressions, "or"),
            ClassExpression::Complement { filler } => write!(f, "(not {})", filler),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[ClassExpression], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

// ============================================================================
// Set kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    Intersection,
    Union,
}

impl SetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetKind::Intersection => "intersection",
            SetKind::Union => "union",
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetKind {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intersection" => Ok(SetKind::Intersection),
            "union" => Ok(SetKind::Union),
            other => Err(ExprError::UnknownSetKind(other.to_string())),
        }
    }
}

// ============================================================================
// Caller input
// ============================================================================

/// What a caller may hand to the adapter: a bare class id or an
/// already-built expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionInput {
    Id(String),
    Expression(ClassExpression),
}

impl From<&str> for ExpressionInput {
    fn from(id: &str) -> Self {
        ExpressionInput::Id(id.to_string())
    }
}

impl From<String> for ExpressionInput {
    fn from(id: String) -> Self {
        ExpressionInput::Id(id)
    }
}

impl From<&String> for ExpressionInput {
    fn from(id: &String) -> Self {
        ExpressionInput::Id(id.clone())
    }
}

impl From<ClassExpression> for ExpressionInput {
    fn from(expr: ClassExpression) -> Self {
        ExpressionInput::Expression(expr)
    }
}

impl From<&ClassExpression> for ExpressionInput {
    fn from(expr: &ClassExpression) -> Self {
        ExpressionInput::Expression(expr.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_wire_shape() {
        let json = serde_json::to_value(ClassExpression::class("GO:0008150")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "class", "id": "GO:0008150"})
        );
    }

    #[test]
    fn test_svf_wire_shape() {
        let expr = ClassExpression::some_values_from(
            Property::new("BFO:0000050"),
            ClassExpression::class("GO:0005634"),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "svf",
                "property": {"type": "property", "id": "BFO:0000050"},
                "filler": {"type": "class", "id": "GO:0005634"}
            })
        );
    }

    #[test]
    fn test_union_parses_back() {
        let text = r#"{"type":"union","expressions":[{"type":"class","id":"A"},{"type":"class","id":"B"}]}"#;
        let expr: ClassExpression = serde_json::from_str(text).unwrap();
        assert_eq!(
            expr,
            ClassExpression::set(
                SetKind::Union,
                vec![ClassExpression::class("A"), ClassExpression::class("B")]
            )
        );
    }

    #[test]
    fn test_display_is_manchester_like() {
        let expr = ClassExpression::set(
            SetKind::Intersection,
            vec![
                ClassExpression::class("GO:1"),
                ClassExpression::some_values_from(
                    Property::new("RO:2"),
                    ClassExpression::class("GO:3"),
                ),
            ],
        );
        assert_eq!(expr.to_string(), "(GO:1 and (RO:2 some GO:3))");
        assert_eq!(expr.referenced_classes(), vec!["GO:1", "GO:3"]);
    }

    #[test]
    fn test_set_kind_from_str() {
        assert_eq!("union".parse::<SetKind>().unwrap(), SetKind::Union);
        assert_eq!(
            "xor".parse::<SetKind>(),
            Err(ExprError::UnknownSetKind("xor".to_string()))
        );
    }
}
