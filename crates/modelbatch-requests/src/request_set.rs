//! The ordered request batch and its macro builders.
//!
//! ```text
//!   add_individual("GO:0008150")           ─► individual/add      (assign v-1)
//!   add_evidence_to_last_individual(..)    ─► individual/add      (assign v-2, source=..)
//!                                             individual/add-annotation
//!                                                 individual=v-1, evidence=v-2
//!   structure()                            ─► {token, intention, requests:[..]}
//! ```
//!
//! Requests are appended in call order and never reordered; the service runs
//! them in that order, which is what lets later requests name earlier
//! placeholders.

use modelbatch_expr::{ClassExpressionAdapter, ExpressionInput, StandardAdapter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::annotation::AnnotationValues;
use crate::config::{BatchConfig, ModelSeed};
use crate::error::{BatchError, Result};
use crate::fact::{FactTriple, IntoFactTriple};
use crate::request::{keys, Argument, Entity, Operation, Request};
use crate::variable::{IdGenerator, SequentialIds, UuidIds};
use crate::wire::{BatchPayload, CallablePayload};

pub const EVIDENCE_KEY: &str = "evidence";
pub const SOURCE_KEY: &str = "source";
pub const EXPORT_FORMAT_KEY: &str = "format";
pub const IMPORT_MODEL_KEY: &str = "importModel";

// ============================================================================
// Intention
// ============================================================================

/// Batch-level side-effect flag. Ordered: `Query < Action`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Intention {
    #[default]
    Query,
    Action,
}

impl Intention {
    /// Intention after appending a request with `hint`. No hint means a
    /// custom request, treated as an action.
    pub fn elevate(self, hint: Option<Intention>) -> Intention {
        match hint {
            Some(Intention::Query) => self,
            Some(Intention::Action) | None => Intention::Action,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intention::Query => "query",
            Intention::Action => "action",
        }
    }
}

impl fmt::Display for Intention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intention {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "query" => Ok(Intention::Query),
            "action" => Ok(Intention::Action),
            other => Err(BatchError::InvalidArgument(format!(
                "unknown intention: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Targets
// ============================================================================

/// Add or remove, for the type and annotation toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Add,
    Remove,
}

impl Toggle {
    fn type_operation(self) -> Operation {
        match self {
            Toggle::Add => Operation::AddType,
            Toggle::Remove => Operation::RemoveType,
        }
    }

    fn annotation_operation(self) -> Operation {
        match self {
            Toggle::Add => Operation::AddAnnotation,
            Toggle::Remove => Operation::RemoveAnnotation,
        }
    }
}

impl FromStr for Toggle {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Toggle::Add),
            "remove" => Ok(Toggle::Remove),
            other => Err(BatchError::InvalidOperation(format!(
                "expected add or remove, got {}",
                other
            ))),
        }
    }
}

/// An existing individual or fact that something is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Individual(String),
    Fact(FactTriple),
}

/// Caller input naming a [`TargetRef`]: a string is an individual id, a
/// three-member list is a fact.
pub trait IntoTargetRef {
    fn into_target_ref(self) -> Result<TargetRef>;
}

fn missing_target() -> BatchError {
    BatchError::InvalidArgument("no target given".to_string())
}

impl IntoTargetRef for TargetRef {
    fn into_target_ref(self) -> Result<TargetRef> {
        match self {
            TargetRef::Individual(id) if id.is_empty() => Err(missing_target()),
            other => Ok(other),
        }
    }
}

impl IntoTargetRef for FactTriple {
    fn into_target_ref(self) -> Result<TargetRef> {
        Ok(TargetRef::Fact(self))
    }
}

impl IntoTargetRef for &str {
    fn into_target_ref(self) -> Result<TargetRef> {
        TargetRef::Individual(self.to_string()).into_target_ref()
    }
}

impl IntoTargetRef for String {
    fn into_target_ref(self) -> Result<TargetRef> {
        TargetRef::Individual(self).into_target_ref()
    }
}

impl IntoTargetRef for &String {
    fn into_target_ref(self) -> Result<TargetRef> {
        self.as_str().into_target_ref()
    }
}

impl<T: IntoTargetRef> IntoTargetRef for Option<T> {
    fn into_target_ref(self) -> Result<TargetRef> {
        self.ok_or_else(missing_target)?.into_target_ref()
    }
}

impl IntoTargetRef for Value {
    fn into_target_ref(self) -> Result<TargetRef> {
        match self {
            Value::Null => Err(missing_target()),
            Value::String(id) => id.into_target_ref(),
            list @ Value::Array(_) => Ok(TargetRef::Fact(list.into_fact_triple()?)),
            other => Err(BatchError::InvalidArgument(format!(
                "target must be an individual id or a fact triple, got {}",
                other
            ))),
        }
    }
}

/// What an annotation request is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AnnotationTarget {
    Model,
    Individual(String),
    Fact(FactTriple),
}

impl AnnotationTarget {
    /// An individual target; the id must be non-empty.
    fn individual(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(BatchError::InvalidArgument(
                "individual annotation target needs an individual id".to_string(),
            ));
        }
        Ok(AnnotationTarget::Individual(id))
    }

    /// Resolve a target kind (`model`, `individual`, `edge`) and the
    /// identifier it needs.
    fn resolve(kind: &str, identifier: Option<Value>) -> Result<Self> {
        match kind {
            "model" => Ok(AnnotationTarget::Model),
            "individual" => match identifier {
                Some(Value::String(id)) => AnnotationTarget::individual(id),
                other => Err(BatchError::InvalidArgument(format!(
                    "individual annotation target needs an individual id, got {:?}",
                    other
                ))),
            },
            "edge" => {
                let triple = identifier.unwrap_or(Value::Null).into_fact_triple()?;
                Ok(AnnotationTarget::Fact(triple))
            }
            other => Err(BatchError::InvalidOperation(format!(
                "unknown annotation target: {}",
                other
            ))),
        }
    }

    fn entity(&self) -> Entity {
        match self {
            AnnotationTarget::Model => Entity::Model,
            AnnotationTarget::Individual(_) => Entity::Individual,
            AnnotationTarget::Fact(_) => Entity::Edge,
        }
    }
}

// ============================================================================
// Request set
// ============================================================================

/// An ordered, append-only batch of requests.
pub struct RequestSet {
    token: Option<String>,
    model_id: Option<String>,
    intention: Intention,
    requests: Vec<Request>,
    adapter: Arc<dyn ClassExpressionAdapter>,
    ids: Arc<dyn IdGenerator>,
}

impl fmt::Debug for RequestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSet")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("model_id", &self.model_id)
            .field("intention", &self.intention)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl Default for RequestSet {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl RequestSet {
    pub fn new(token: Option<String>, model_id: Option<String>) -> Self {
        Self {
            token,
            model_id,
            intention: Intention::Query,
            requests: Vec::new(),
            adapter: Arc::new(StandardAdapter),
            ids: Arc::new(UuidIds),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        let set = Self::new(config.token.clone(), config.model_id.clone());
        match &config.id_prefix {
            Some(prefix) => set.with_id_generator(Arc::new(SequentialIds::new(prefix.clone()))),
            None => set,
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ClassExpressionAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn intention(&self) -> Intention {
        self.intention
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// A blank request sharing this set's adapter and id source.
    pub fn request(&self, entity: Entity, operation: Operation) -> Request {
        Request::with_parts(entity, operation, self.adapter.clone(), self.ids.as_ref())
    }

    fn scoped(&self, entity: Entity, operation: Operation, model_id: Option<&str>) -> Request {
        let mut req = self.request(entity, operation);
        if let Some(model_id) = model_id {
            req.set_model(model_id);
        }
        req
    }

    /// Append a request. A `Query` hint never lowers an elevated batch;
    /// any other hint, or none, elevates it to `Action`.
    pub fn add(&mut self, request: Request, hint: Option<Intention>) -> &mut Self {
        let before = self.intention;
        self.intention = before.elevate(hint);
        if before != self.intention {
            tracing::debug!(from = %before, to = %self.intention, "batch intention elevated");
        }
        tracing::debug!(
            entity = %request.entity(),
            operation = %request.operation(),
            position = self.requests.len(),
            "request appended"
        );
        self.requests.push(request);
        self
    }

    // ------------------------------------------------------------------------
    // Backward lookup
    // ------------------------------------------------------------------------

    fn nth_latest(&self, entity: Entity, skip: usize) -> Option<&Request> {
        self.requests
            .iter()
            .rev()
            .filter(|r| r.entity() == entity)
            .nth(skip)
    }

    /// Individual id of the most recent `individual` request, after
    /// skipping `skip` of them.
    pub fn last_individual_id(&self, skip: usize) -> Option<String> {
        self.nth_latest(Entity::Individual, skip)
            .map(|r| r.individual().to_string())
    }

    /// Triple of the most recent `edge` request, after skipping `skip` of
    /// them.
    pub fn last_fact_triple(&self, skip: usize) -> Option<FactTriple> {
        self.nth_latest(Entity::Edge, skip).and_then(Request::fact)
    }

    // ------------------------------------------------------------------------
    // Individuals
    // ------------------------------------------------------------------------

    /// Create an individual of `class_expr`; returns its placeholder id.
    pub fn add_individual(
        &mut self,
        class_expr: impl Into<ExpressionInput>,
        model_id: Option<&str>,
    ) -> String {
        let mut req = self.scoped(Entity::Individual, Operation::Add, model_id);
        req.add_class_expression(class_expr);
        let id = req.individual().to_string();
        if let Some(expr) = req.expressions().last() {
            tracing::debug!(individual = %id, class = %expr, "individual placeholder bound");
        }
        self.add(req, Some(Intention::Action));
        id
    }

    pub fn remove_individual(&mut self, individual_id: &str, model_id: Option<&str>) -> &mut Self {
        let mut req = self.scoped(Entity::Individual, Operation::Remove, model_id);
        req.set_individual(individual_id);
        self.add(req, Some(Intention::Action))
    }

    fn op_type(
        &mut self,
        toggle: Toggle,
        class_expr: ExpressionInput,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> &mut Self {
        let mut req = self.scoped(Entity::Individual, toggle.type_operation(), model_id);
        req.set_individual(individual_id);
        req.add_class_expression(class_expr);
        if let Some(expr) = req.expressions().last() {
            tracing::debug!(individual = %individual_id, class = %expr, op = ?toggle, "type change");
        }
        self.add(req, Some(Intention::Action))
    }

    pub fn add_type_to_individual(
        &mut self,
        class_expr: impl Into<ExpressionInput>,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> &mut Self {
        self.op_type(Toggle::Add, class_expr.into(), individual_id, model_id)
    }

    pub fn remove_type_from_individual(
        &mut self,
        class_expr: impl Into<ExpressionInput>,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> &mut Self {
        self.op_type(Toggle::Remove, class_expr.into(), individual_id, model_id)
    }

    /// String-dispatched type toggle; `op` must be `add` or `remove`.
    pub fn toggle_type(
        &mut self,
        op: &str,
        class_expr: impl Into<ExpressionInput>,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let toggle: Toggle = op.parse()?;
        Ok(self.op_type(toggle, class_expr.into(), individual_id, model_id))
    }

    // ------------------------------------------------------------------------
    // Facts
    // ------------------------------------------------------------------------

    fn op_fact(&mut self, operation: Operation, triple: FactTriple, model_id: Option<&str>) -> &mut Self {
        let mut req = self.scoped(Entity::Edge, operation, model_id);
        req.set_fact(&triple);
        self.add(req, Some(Intention::Action))
    }

    pub fn add_fact(&mut self, triple: impl IntoFactTriple, model_id: Option<&str>) -> Result<&mut Self> {
        let triple = triple.into_fact_triple()?;
        Ok(self.op_fact(Operation::Add, triple, model_id))
    }

    pub fn remove_fact(
        &mut self,
        triple: impl IntoFactTriple,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let triple = triple.into_fact_triple()?;
        Ok(self.op_fact(Operation::Remove, triple, model_id))
    }

    // ------------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------------

    /// The single target resolver every annotation builder goes through.
    fn op_annotation(
        &mut self,
        toggle: Toggle,
        target: AnnotationTarget,
        key: &str,
        values: AnnotationValues,
        model_id: Option<&str>,
    ) -> &mut Self {
        let mut req = self.scoped(target.entity(), toggle.annotation_operation(), model_id);
        match &target {
            AnnotationTarget::Model => {}
            AnnotationTarget::Individual(id) => {
                req.set_individual(id.as_str());
            }
            AnnotationTarget::Fact(triple) => {
                req.set_fact(triple);
            }
        }
        req.add_annotation(key, values);
        self.add(req, Some(Intention::Action))
    }

    /// String-dispatched annotation toggle.
    ///
    /// `op` is `add` or `remove`; `target` is `model`, `individual` (with an
    /// id string) or `edge` (with a three-member list).
    pub fn toggle_annotation(
        &mut self,
        op: &str,
        target: &str,
        key: &str,
        values: impl Into<AnnotationValues>,
        identifier: Option<Value>,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let toggle: Toggle = op.parse()?;
        let target = AnnotationTarget::resolve(target, identifier)?;
        Ok(self.op_annotation(toggle, target, key, values.into(), model_id))
    }

    pub fn add_annotation_to_model(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        model_id: Option<&str>,
    ) -> &mut Self {
        self.op_annotation(Toggle::Add, AnnotationTarget::Model, key, values.into(), model_id)
    }

    pub fn remove_annotation_from_model(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        model_id: Option<&str>,
    ) -> &mut Self {
        self.op_annotation(Toggle::Remove, AnnotationTarget::Model, key, values.into(), model_id)
    }

    pub fn add_annotation_to_individual(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let target = AnnotationTarget::individual(individual_id)?;
        Ok(self.op_annotation(Toggle::Add, target, key, values.into(), model_id))
    }

    pub fn remove_annotation_from_individual(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        individual_id: &str,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let target = AnnotationTarget::individual(individual_id)?;
        Ok(self.op_annotation(Toggle::Remove, target, key, values.into(), model_id))
    }

    pub fn add_annotation_to_fact(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        triple: impl IntoFactTriple,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let target = AnnotationTarget::Fact(triple.into_fact_triple()?);
        Ok(self.op_annotation(Toggle::Add, target, key, values.into(), model_id))
    }

    pub fn remove_annotation_from_fact(
        &mut self,
        key: &str,
        values: impl Into<AnnotationValues>,
        triple: impl IntoFactTriple,
        model_id: Option<&str>,
    ) -> Result<&mut Self> {
        let target = AnnotationTarget::Fact(triple.into_fact_triple()?);
        Ok(self.op_annotation(Toggle::Remove, target, key, values.into(), model_id))
    }

    // ------------------------------------------------------------------------
    // Evidence
    // ------------------------------------------------------------------------

    /// Create a floating evidence individual typed `evidence_id`, cite
    /// `sources` on it, and point `target` at it with an `evidence`
    /// annotation. Returns the evidence individual's placeholder id.
    ///
    /// An individual target takes two requests (the sources ride on the
    /// creating request); a fact target takes three.
    pub fn add_evidence(
        &mut self,
        evidence_id: &str,
        sources: impl Into<AnnotationValues>,
        target: impl IntoTargetRef,
        model_id: Option<&str>,
    ) -> Result<String> {
        let target = target.into_target_ref()?;
        Ok(self.push_evidence(evidence_id, sources.into(), target, model_id))
    }

    fn push_evidence(
        &mut self,
        evidence_id: &str,
        sources: AnnotationValues,
        target: TargetRef,
        model_id: Option<&str>,
    ) -> String {
        let mut ev_req = self.scoped(Entity::Individual, Operation::Add, model_id);
        ev_req.add_class_expression(evidence_id);
        let ev_id = ev_req.individual().to_string();

        match target {
            TargetRef::Individual(individual_id) => {
                ev_req.add_annotation(SOURCE_KEY, sources);
                self.add(ev_req, Some(Intention::Action));
                self.op_annotation(
                    Toggle::Add,
                    AnnotationTarget::Individual(individual_id),
                    EVIDENCE_KEY,
                    AnnotationValues::Single(ev_id.clone()),
                    model_id,
                );
            }
            TargetRef::Fact(triple) => {
                self.add(ev_req, Some(Intention::Action));
                self.op_annotation(
                    Toggle::Add,
                    AnnotationTarget::Individual(ev_id.clone()),
                    SOURCE_KEY,
                    sources,
                    model_id,
                );
                self.op_annotation(
                    Toggle::Add,
                    AnnotationTarget::Fact(triple),
                    EVIDENCE_KEY,
                    AnnotationValues::Single(ev_id.clone()),
                    model_id,
                );
            }
        }
        ev_id
    }

    /// Removing evidence is removing its individual; the service cleans up
    /// whatever pointed at it.
    pub fn remove_evidence(&mut self, evidence_individual_id: &str, model_id: Option<&str>) -> &mut Self {
        self.remove_individual(evidence_individual_id, model_id)
    }

    /// [`add_evidence`](Self::add_evidence) against the latest individual
    /// request. `None` (and nothing appended) if there is none.
    pub fn add_evidence_to_last_individual(
        &mut self,
        evidence_id: &str,
        sources: impl Into<AnnotationValues>,
        model_id: Option<&str>,
    ) -> Option<String> {
        let individual_id = self.last_individual_id(0)?;
        Some(self.push_evidence(
            evidence_id,
            sources.into(),
            TargetRef::Individual(individual_id),
            model_id,
        ))
    }

    /// [`add_evidence`](Self::add_evidence) against the latest edge request.
    pub fn add_evidence_to_last_fact(
        &mut self,
        evidence_id: &str,
        sources: impl Into<AnnotationValues>,
        model_id: Option<&str>,
    ) -> Option<String> {
        let triple = self.last_fact_triple(0)?;
        Some(self.push_evidence(evidence_id, sources.into(), TargetRef::Fact(triple), model_id))
    }

    // ------------------------------------------------------------------------
    // Whole-model operations
    // ------------------------------------------------------------------------

    fn model_op(&mut self, entity: Entity, operation: Operation, model_id: Option<&str>, hint: Intention) -> &mut Self {
        let req = self.scoped(entity, operation, model_id);
        self.add(req, Some(hint))
    }

    pub fn undo_last_model_batch(&mut self, model_id: Option<&str>) -> &mut Self {
        self.model_op(Entity::Model, Operation::Undo, model_id, Intention::Action)
    }

    pub fn redo_last_model_batch(&mut self, model_id: Option<&str>) -> &mut Self {
        self.model_op(Entity::Model, Operation::Redo, model_id, Intention::Action)
    }

    pub fn get_meta(&mut self) -> &mut Self {
        self.model_op(Entity::Meta, Operation::Get, None, Intention::Query)
    }

    pub fn get_model(&mut self, model_id: Option<&str>) -> &mut Self {
        self.model_op(Entity::Model, Operation::Get, model_id, Intention::Query)
    }

    pub fn get_undo_redo(&mut self, model_id: Option<&str>) -> &mut Self {
        self.model_op(Entity::Model, Operation::GetUndoRedo, model_id, Intention::Query)
    }

    pub fn store_model(&mut self, model_id: Option<&str>) -> &mut Self {
        self.model_op(Entity::Model, Operation::Store, model_id, Intention::Action)
    }

    /// Create a new model, optionally seeded around a class and a species.
    pub fn add_model(&mut self, seed: &ModelSeed) -> &mut Self {
        let mut req = self.request(Entity::Model, Operation::Add);
        for (name, value) in seed.entries() {
            req.set_special(name, value);
        }
        self.add(req, Some(Intention::Action))
    }

    /// Ask for the model rendered in `format` (e.g. `gaf`).
    pub fn export_model(&mut self, format: &str, model_id: Option<&str>) -> &mut Self {
        let mut req = self.scoped(Entity::Model, Operation::Export, model_id);
        req.set_special(EXPORT_FORMAT_KEY, format);
        self.add(req, Some(Intention::Query))
    }

    /// Create a model from a serialized model document.
    pub fn import_model(&mut self, model_text: &str) -> &mut Self {
        let mut req = self.request(Entity::Model, Operation::Import);
        req.set_special(IMPORT_MODEL_KEY, model_text);
        self.add(req, Some(Intention::Action))
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// `{token, intention, requests}` in append order.
    ///
    /// Requests without a model id get the set's default one (if any) in
    /// their serialized arguments; the requests themselves are untouched.
    pub fn structure(&self) -> BatchPayload {
        let requests = self
            .requests
            .iter()
            .map(|req| {
                let mut payload = req.to_payload();
                if let (None, Some(model_id)) = (req.model(), &self.model_id) {
                    payload
                        .arguments
                        .insert(keys::MODEL_ID.to_string(), Argument::Text(model_id.clone()));
                }
                payload
            })
            .collect::<Vec<_>>();
        tracing::trace!(
            requests = requests.len(),
            intention = %self.intention,
            "structured request batch"
        );
        BatchPayload {
            token: self.token.clone(),
            intention: self.intention,
            requests,
        }
    }

    /// [`structure`](Self::structure) with the request list encoded as one
    /// transport string.
    pub fn callable(&self) -> Result<CallablePayload> {
        let callable = self.structure().into_callable()?;
        tracing::trace!(bytes = callable.requests.len(), "encoded request batch");
        Ok(callable)
    }
}
