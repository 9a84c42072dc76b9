//! The class-expression adapter seam.

use crate::expression::{ClassExpression, ExpressionInput, Property, SetKind};

/// Converts caller input into normalized class expressions.
///
/// The request layer never builds expression structures itself; it hands
/// input to an adapter and embeds whatever comes back.
pub trait ClassExpressionAdapter: Send + Sync {
    /// Normalize a bare id or an existing expression.
    fn construct(&self, input: ExpressionInput) -> ClassExpression;

    /// `property some input`.
    fn as_some_values_from(&self, input: ExpressionInput, property_id: &str) -> ClassExpression;

    /// An intersection or union over the normalized inputs.
    fn as_set(&self, kind: SetKind, inputs: Vec<ExpressionInput>) -> ClassExpression;
}

/// Default normalization.
///
/// A bare id becomes a named class, an expression passes through untouched,
/// and a one-member set collapses to its member.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAdapter;

impl StandardAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ClassExpressionAdapter for StandardAdapter {
    fn construct(&self, input: ExpressionInput) -> ClassExpression {
        match input {
            ExpressionInput::Id(id) => ClassExpression::class(id),
            ExpressionInput::Expression(expr) => expr,
        }
    }

    fn as_some_values_from(&self, input: ExpressionInput, property_id: &str) -> ClassExpression {
        ClassExpression::some_values_from(Property::new(property_id), self.construct(input))
    }

    fn as_set(&self, kind: SetKind, inputs: Vec<ExpressionInput>) -> ClassExpression {
        let mut members: Vec<ClassExpression> =
            inputs.into_iter().map(|i| self.construct(i)).collect();
        if members.len() == 1 {
            return members.remove(0);
        }
        ClassExpression::set(kind, members)
    }
}
