//! modelbatch requests: ordered request batches for the model graph-editing
//! service.
//!
//! Callers never talk to the service one operation at a time. They build a
//! [`RequestSet`], an append-only list of declarative requests, and submit
//! its serialized form once:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         REQUEST BATCH FLOW                           │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  caller ──► macro builder ──► Request(s) ──► RequestSet (ordered)    │
//! │               (add_fact,        │                 │                  │
//! │                add_evidence,    │ Variable        │ intention        │
//! │                ...)             │ placeholders    │ query ► action   │
//! │                                 ▼                 ▼                  │
//! │                          structure()  ──►  {token, intention,        │
//! │                                             requests: [...]}         │
//! │                          callable()   ──►  requests as one           │
//! │                                             percent-encoded string   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Ordered**: requests serialize in append order; nothing is removed or
//!   reordered.
//! - **Forward references**: an individual created in the batch gets a
//!   placeholder id that later requests in the same batch can use.
//! - **Monotonic intention**: once a write-shaped request is added, the
//!   batch stays `action`.
//! - **Fail fast**: malformed triples, unknown operations and missing
//!   evidence targets are rejected by the call that receives them.

pub mod annotation;
pub mod config;
pub mod error;
pub mod fact;
pub mod request;
pub mod request_set;
pub mod variable;
pub mod wire;

pub use annotation::{AnnotationPair, AnnotationValues};
pub use config::{BatchConfig, ModelSeed};
pub use error::{BatchError, Result};
pub use fact::{FactTriple, IntoFactTriple};
pub use request::{Argument, Entity, Operation, Request, RequestPayload};
pub use request_set::{Intention, IntoTargetRef, RequestSet, TargetRef, Toggle};
pub use variable::{IdGenerator, SequentialIds, UuidIds, Variable};
pub use wire::{decode_requests, encode_requests, BatchPayload, CallablePayload};

pub use modelbatch_expr::{
    ClassExpression, ClassExpressionAdapter, ExpressionInput, Property, SetKind, StandardAdapter,
};
