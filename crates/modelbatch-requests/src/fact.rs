//! Fact triples: the identity of an edge.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{BatchError, Result};

/// An edge identified by `(subject, object, predicate)`. All three fields
/// are always present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactTriple {
    subject: String,
    object: String,
    predicate: String,
}

impl FactTriple {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        predicate: impl Into<String>,
    ) -> Result<Self> {
        let (subject, object, predicate): (String, String, String) =
            (subject.into(), object.into(), predicate.into());
        from_parts(
            Some(subject.as_str()),
            Some(object.as_str()),
            Some(predicate.as_str()),
        )
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// `[subject, object, predicate]`
    pub fn to_array(&self) -> [String; 3] {
        [
            self.subject.clone(),
            self.object.clone(),
            self.predicate.clone(),
        ]
    }
}

impl fmt::Display for FactTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.subject, self.predicate, self.object)
    }
}

fn present(part: Option<&str>) -> Option<&str> {
    part.filter(|s| !s.is_empty())
}

fn from_parts(subject: Option<&str>, object: Option<&str>, predicate: Option<&str>) -> Result<FactTriple> {
    match (present(subject), present(object), present(predicate)) {
        (Some(s), Some(o), Some(p)) => Ok(FactTriple {
            subject: s.to_string(),
            object: o.to_string(),
            predicate: p.to_string(),
        }),
        _ => Err(BatchError::malformed_fact(format_args!(
            "[{:?}, {:?}, {:?}]",
            subject, object, predicate
        ))),
    }
}

fn from_slice<S: AsRef<str>>(parts: &[Option<S>]) -> Result<FactTriple> {
    if parts.len() != 3 {
        return Err(BatchError::malformed_fact(format_args!(
            "expected 3 fields, got {}",
            parts.len()
        )));
    }
    from_parts(field(&parts[0]), field(&parts[1]), field(&parts[2]))
}

fn field<S: AsRef<str>>(part: &Option<S>) -> Option<&str> {
    part.as_ref().map(|s| s.as_ref())
}

// ============================================================================
// Conversion from caller input
// ============================================================================

/// Anything that may describe a fact triple. Conversion fails with
/// `InvalidArgument` when a field is missing.
pub trait IntoFactTriple {
    fn into_fact_triple(self) -> Result<FactTriple>;
}

impl IntoFactTriple for FactTriple {
    fn into_fact_triple(self) -> Result<FactTriple> {
        Ok(self)
    }
}

impl IntoFactTriple for &FactTriple {
    fn into_fact_triple(self) -> Result<FactTriple> {
        Ok(self.clone())
    }
}

impl<S: AsRef<str>> IntoFactTriple for (S, S, S) {
    fn into_fact_triple(self) -> Result<FactTriple> {
        from_parts(
            Some(self.0.as_ref()),
            Some(self.1.as_ref()),
            Some(self.2.as_ref()),
        )
    }
}

impl<S: AsRef<str>> IntoFactTriple for [Option<S>; 3] {
    fn into_fact_triple(self) -> Result<FactTriple> {
        from_slice(&self)
    }
}

impl<S: AsRef<str>> IntoFactTriple for &[Option<S>] {
    fn into_fact_triple(self) -> Result<FactTriple> {
        from_slice(self)
    }
}

impl<S: AsRef<str>> IntoFactTriple for Vec<Option<S>> {
    fn into_fact_triple(self) -> Result<FactTriple> {
        from_slice(&self)
    }
}

/// A JSON array of three strings.
impl IntoFactTriple for &Value {
    fn into_fact_triple(self) -> Result<FactTriple> {
        match self {
            Value::Array(items) => {
                let parts: Vec<Option<&str>> = items.iter().map(Value::as_str).collect();
                from_slice(&parts)
            }
            other => Err(BatchError::malformed_fact(format_args!(
                "expected a 3-element list, got {}",
                other
            ))),
        }
    }
}

impl IntoFactTriple for Value {
    fn into_fact_triple(self) -> Result<FactTriple> {
        (&self).into_fact_triple()
    }
}
