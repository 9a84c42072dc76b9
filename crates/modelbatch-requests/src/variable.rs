//! Deferred identifiers for entities the service has not created yet.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

// ============================================================================
// Id generation
// ============================================================================

/// Source of placeholder identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs. The process-wide default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

// ============================================================================
// Variable
// ============================================================================

/// A placeholder value plus whether a caller ever supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    value: String,
    explicit: bool,
}

impl Variable {
    /// Use `value` if given (marking it explicit), otherwise generate one.
    pub fn new(value: Option<String>, ids: &dyn IdGenerator) -> Self {
        match value {
            Some(value) => Self {
                value,
                explicit: true,
            },
            None => Self {
                value: ids.generate(),
                explicit: false,
            },
        }
    }

    /// A generated variable from the UUID source.
    pub fn fresh() -> Self {
        Self::new(None, &UuidIds)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Overwrite the value and mark it explicit.
    pub fn set(&mut self, value: impl Into<String>) -> &str {
        self.value = value.into();
        self.explicit = true;
        &self.value
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_variable_is_implicit() {
        let v = Variable::fresh();
        assert!(!v.is_explicit());
        assert!(Uuid::parse_str(v.value()).is_ok());
    }

    #[test]
    fn test_supplied_value_is_explicit() {
        let v = Variable::new(Some("gomodel:1/ind".to_string()), &UuidIds);
        assert!(v.is_explicit());
        assert_eq!(v.value(), "gomodel:1/ind");
    }

    #[test]
    fn test_set_marks_explicit() {
        let mut v = Variable::new(None, &SequentialIds::new("var"));
        assert_eq!(v.value(), "var-1");
        assert_eq!(v.set("abc"), "abc");
        assert!(v.is_explicit());
        assert_eq!(v.value(), "abc");
    }

    #[test]
    fn test_fresh_values_are_distinct() {
        assert_ne!(Variable::fresh().value(), Variable::fresh().value());
    }

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIds::new("x");
        assert_eq!(ids.generate(), "x-1");
        assert_eq!(ids.generate(), "x-2");
    }
}
