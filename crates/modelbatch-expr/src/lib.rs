//! Class expressions for model-graph requests (boundary adapter).
//!
//! Requests against the graph-editing service carry type constraints as
//! normalized class-expression structures. This crate owns:
//!
//! - [`ClassExpression`]: the structure-printable value embedded verbatim
//!   into a request's `expressions` argument.
//! - [`ClassExpressionAdapter`]: the seam the request layer calls through
//!   (`construct`, `as_some_values_from`, `as_set`).
//! - [`StandardAdapter`]: the default normalization rules.
//!
//! ```text
//!   "GO:0008150"  ──construct──►  {"type":"class","id":"GO:0008150"}
//!
//!   ("GO:0005634", "BFO:0000050")
//!                 ──svf──►  {"type":"svf",
//!                            "property":{"type":"property","id":"BFO:0000050"},
//!                            "filler":{"type":"class","id":"GO:0005634"}}
//! ```

pub mod adapter;
pub mod expression;

pub use adapter::{ClassExpressionAdapter, StandardAdapter};
pub use expression::{ClassExpression, ExpressionInput, Property, SetKind};

/// Errors raised while interpreting caller-supplied expression input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("unknown set kind: {0} (expected intersection or union)")]
    UnknownSetKind(String),
}
