//! Annotation pairs and the values callers attach to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BatchError, Result};

/// One `{key, value}` entry of a request's `values` argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationPair {
    pub key: String,
    pub value: String,
}

impl AnnotationPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Values for one annotation key: each becomes its own pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValues {
    Single(String),
    Many(Vec<String>),
}

impl AnnotationValues {
    pub fn len(&self) -> usize {
        match self {
            AnnotationValues::Single(_) => 1,
            AnnotationValues::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            AnnotationValues::Single(value) => vec![value],
            AnnotationValues::Many(values) => values,
        }
    }
}

impl From<&str> for AnnotationValues {
    fn from(value: &str) -> Self {
        AnnotationValues::Single(value.to_string())
    }
}

impl From<String> for AnnotationValues {
    fn from(value: String) -> Self {
        AnnotationValues::Single(value)
    }
}

impl From<&String> for AnnotationValues {
    fn from(value: &String) -> Self {
        AnnotationValues::Single(value.clone())
    }
}

impl From<Vec<String>> for AnnotationValues {
    fn from(values: Vec<String>) -> Self {
        AnnotationValues::Many(values)
    }
}

impl From<Vec<&str>> for AnnotationValues {
    fn from(values: Vec<&str>) -> Self {
        AnnotationValues::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for AnnotationValues {
    fn from(values: &[&str]) -> Self {
        AnnotationValues::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<&[String]> for AnnotationValues {
    fn from(values: &[String]) -> Self {
        AnnotationValues::Many(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for AnnotationValues {
    fn from(values: [&str; N]) -> Self {
        AnnotationValues::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Untyped input: a string or a list of strings, nothing else.
impl TryFrom<Value> for AnnotationValues {
    type Error = BatchError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(AnnotationValues::Single(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(BatchError::InvalidArgument(format!(
                        "annotation value must be a string, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(AnnotationValues::Many),
            other => Err(BatchError::InvalidArgument(format!(
                "annotation values must be a string or a list of strings, got {}",
                other
            ))),
        }
    }
}
