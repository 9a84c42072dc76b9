//! A single operation against one entity kind.
//!
//! A [`Request`] owns a [`Variable`] standing in for the individual it
//! targets. When the caller never names that individual, the serialized
//! request asks the service to bind a real id to the placeholder
//! (`assign-to-variable`), so later requests in the same batch can refer to
//! it by the placeholder value.

use modelbatch_expr::{
    ClassExpression, ClassExpressionAdapter, ExpressionInput, SetKind, StandardAdapter,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::annotation::{AnnotationPair, AnnotationValues};
use crate::error::{BatchError, Result};
use crate::fact::FactTriple;
use crate::variable::{IdGenerator, UuidIds, Variable};

/// Argument keys with fixed meaning on the wire.
pub mod keys {
    pub const INDIVIDUAL: &str = "individual";
    pub const SUBJECT: &str = "subject";
    pub const OBJECT: &str = "object";
    pub const PREDICATE: &str = "predicate";
    pub const MODEL_ID: &str = "model-id";
    pub const VALUES: &str = "values";
    pub const EXPRESSIONS: &str = "expressions";
    pub const ASSIGN_TO_VARIABLE: &str = "assign-to-variable";
}

// ============================================================================
// Entity kinds and operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Model,
    Individual,
    Edge,
    Meta,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Model => "model",
            Entity::Individual => "individual",
            Entity::Edge => "edge",
            Entity::Meta => "meta",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "model" => Ok(Entity::Model),
            "individual" => Ok(Entity::Individual),
            "edge" => Ok(Entity::Edge),
            "meta" => Ok(Entity::Meta),
            other => Err(BatchError::InvalidArgument(format!(
                "unknown entity kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Add,
    Remove,
    AddType,
    RemoveType,
    AddAnnotation,
    RemoveAnnotation,
    Get,
    GetUndoRedo,
    Undo,
    Redo,
    Store,
    Export,
    Import,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::AddType => "add-type",
            Operation::RemoveType => "remove-type",
            Operation::AddAnnotation => "add-annotation",
            Operation::RemoveAnnotation => "remove-annotation",
            Operation::Get => "get",
            Operation::GetUndoRedo => "get-undo-redo",
            Operation::Undo => "undo",
            Operation::Redo => "redo",
            Operation::Store => "store",
            Operation::Export => "export",
            Operation::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s {
            "add" => Operation::Add,
            "remove" => Operation::Remove,
            "add-type" => Operation::AddType,
            "remove-type" => Operation::RemoveType,
            "add-annotation" => Operation::AddAnnotation,
            "remove-annotation" => Operation::RemoveAnnotation,
            "get" => Operation::Get,
            "get-undo-redo" => Operation::GetUndoRedo,
            "undo" => Operation::Undo,
            "redo" => Operation::Redo,
            "store" => Operation::Store,
            "export" => Operation::Export,
            "import" => Operation::Import,
            other => {
                return Err(BatchError::InvalidOperation(format!(
                    "unknown operation: {}",
                    other
                )))
            }
        };
        Ok(op)
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// One named argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Text(String),
    Annotations(Vec<AnnotationPair>),
    Expressions(Vec<ClassExpression>),
}

impl Argument {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Text(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Text(s)
    }
}

/// The serialized form of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub entity: Entity,
    pub operation: Operation,
    pub arguments: BTreeMap<String, Argument>,
}

// ============================================================================
// Request
// ============================================================================

pub struct Request {
    entity: Entity,
    operation: Operation,
    variable: Variable,
    arguments: BTreeMap<String, Argument>,
    special: BTreeMap<String, String>,
    adapter: Arc<dyn ClassExpressionAdapter>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("entity", &self.entity)
            .field("operation", &self.operation)
            .field("variable", &self.variable)
            .field("arguments", &self.arguments)
            .field("special", &self.special)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// A request using the standard adapter and UUID placeholders.
    pub fn new(entity: Entity, operation: Operation) -> Self {
        Self::with_parts(entity, operation, Arc::new(StandardAdapter), &UuidIds)
    }

    pub fn with_parts(
        entity: Entity,
        operation: Operation,
        adapter: Arc<dyn ClassExpressionAdapter>,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self {
            entity,
            operation,
            variable: Variable::new(None, ids),
            arguments: BTreeMap::new(),
            special: BTreeMap::new(),
            adapter,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn argument(&self, key: &str) -> Option<&Argument> {
        self.arguments.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Argument::as_text)
    }

    fn set_text(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.arguments
            .insert(key.to_string(), Argument::Text(value.into()));
        self
    }

    // ------------------------------------------------------------------------
    // Special arguments
    // ------------------------------------------------------------------------

    /// A bypass argument, kept apart from the generic map until
    /// serialization.
    pub fn special(&self, name: &str) -> Option<&str> {
        self.special.get(name).map(String::as_str)
    }

    pub fn set_special(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.special.insert(name.into(), value.into());
        self
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    /// The targeted individual: the caller's id, or the generated
    /// placeholder.
    pub fn individual(&self) -> &str {
        self.variable.value()
    }

    pub fn set_individual(&mut self, id: impl Into<String>) -> &str {
        let id = id.into();
        self.arguments
            .insert(keys::INDIVIDUAL.to_string(), Argument::Text(id.clone()));
        self.variable.set(id)
    }

    /// Whether [`set_individual`](Self::set_individual) was ever called.
    pub fn has_explicit_individual(&self) -> bool {
        self.variable.is_explicit()
    }

    pub fn subject(&self) -> Option<&str> {
        self.text(keys::SUBJECT)
    }

    pub fn set_subject(&mut self, id: impl Into<String>) -> &mut Self {
        self.set_text(keys::SUBJECT, id)
    }

    pub fn object(&self) -> Option<&str> {
        self.text(keys::OBJECT)
    }

    pub fn set_object(&mut self, id: impl Into<String>) -> &mut Self {
        self.set_text(keys::OBJECT, id)
    }

    pub fn predicate(&self) -> Option<&str> {
        self.text(keys::PREDICATE)
    }

    pub fn set_predicate(&mut self, id: impl Into<String>) -> &mut Self {
        self.set_text(keys::PREDICATE, id)
    }

    pub fn model(&self) -> Option<&str> {
        self.text(keys::MODEL_ID)
    }

    pub fn set_model(&mut self, id: impl Into<String>) -> &mut Self {
        self.set_text(keys::MODEL_ID, id)
    }

    pub fn set_fact(&mut self, triple: &FactTriple) -> &mut Self {
        self.set_subject(triple.subject())
            .set_object(triple.object())
            .set_predicate(triple.predicate())
    }

    /// The triple this request names, if all three fields are set.
    pub fn fact(&self) -> Option<FactTriple> {
        match (self.subject(), self.object(), self.predicate()) {
            (Some(s), Some(o), Some(p)) => FactTriple::new(s, o, p).ok(),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------------

    /// Append one `{key, value}` pair per value; returns the total number of
    /// pairs on this request.
    pub fn add_annotation(&mut self, key: &str, values: impl Into<AnnotationValues>) -> usize {
        let values = values.into();
        if values.is_empty() {
            return self.annotations().len();
        }
        let pairs = values
            .into_vec()
            .into_iter()
            .map(|value| AnnotationPair::new(key, value));
        match self
            .arguments
            .entry(keys::VALUES.to_string())
            .or_insert_with(|| Argument::Annotations(Vec::new()))
        {
            Argument::Annotations(existing) => {
                existing.extend(pairs);
                existing.len()
            }
            slot => {
                let pairs: Vec<AnnotationPair> = pairs.collect();
                let total = pairs.len();
                *slot = Argument::Annotations(pairs);
                total
            }
        }
    }

    pub fn annotations(&self) -> &[AnnotationPair] {
        match self.arguments.get(keys::VALUES) {
            Some(Argument::Annotations(pairs)) => pairs,
            _ => &[],
        }
    }

    // ------------------------------------------------------------------------
    // Class expressions
    // ------------------------------------------------------------------------

    fn push_expression(&mut self, expr: ClassExpression) -> usize {
        match self
            .arguments
            .entry(keys::EXPRESSIONS.to_string())
            .or_insert_with(|| Argument::Expressions(Vec::new()))
        {
            Argument::Expressions(existing) => {
                existing.push(expr);
                existing.len()
            }
            slot => {
                *slot = Argument::Expressions(vec![expr]);
                1
            }
        }
    }

    pub fn add_class_expression(&mut self, input: impl Into<ExpressionInput>) -> usize {
        let expr = self.adapter.construct(input.into());
        self.push_expression(expr)
    }

    pub fn add_svf_expression(
        &mut self,
        input: impl Into<ExpressionInput>,
        property_id: &str,
    ) -> usize {
        let expr = self.adapter.as_some_values_from(input.into(), property_id);
        self.push_expression(expr)
    }

    pub fn add_set_class_expression<I, E>(&mut self, kind: SetKind, inputs: I) -> usize
    where
        I: IntoIterator<Item = E>,
        E: Into<ExpressionInput>,
    {
        let inputs = inputs.into_iter().map(Into::into).collect();
        let expr = self.adapter.as_set(kind, inputs);
        self.push_expression(expr)
    }

    /// [`add_set_class_expression`](Self::add_set_class_expression) with the
    /// set kind given by name (`intersection` or `union`).
    pub fn add_named_set_class_expression<I, E>(&mut self, kind: &str, inputs: I) -> Result<usize>
    where
        I: IntoIterator<Item = E>,
        E: Into<ExpressionInput>,
    {
        let kind: SetKind = kind.parse()?;
        Ok(self.add_set_class_expression(kind, inputs))
    }

    pub fn expressions(&self) -> &[ClassExpression] {
        match self.arguments.get(keys::EXPRESSIONS) {
            Some(Argument::Expressions(exprs)) => exprs,
            _ => &[],
        }
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// `{entity, operation, arguments}` with special arguments merged in.
    ///
    /// An `individual` request whose individual was never named carries
    /// `assign-to-variable` set to its placeholder.
    pub fn to_payload(&self) -> RequestPayload {
        let mut arguments = self.arguments.clone();
        for (name, value) in &self.special {
            arguments.insert(name.clone(), Argument::Text(value.clone()));
        }
        if self.entity == Entity::Individual && !self.variable.is_explicit() {
            arguments.insert(
                keys::ASSIGN_TO_VARIABLE.to_string(),
                Argument::Text(self.variable.value().to_string()),
            );
        }
        RequestPayload {
            entity: self.entity,
            operation: self.operation,
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::SequentialIds;

    fn individual_add() -> Request {
        Request::with_parts(
            Entity::Individual,
            Operation::Add,
            Arc::new(StandardAdapter),
            &SequentialIds::new("v"),
        )
    }

    #[test]
    fn test_implicit_individual_assigns_variable() {
        let mut req = individual_add();
        req.add_class_expression("GO:0008150");
        let payload = req.to_payload();
        assert_eq!(
            payload.arguments.get(keys::ASSIGN_TO_VARIABLE),
            Some(&Argument::Text("v-1".into()))
        );
        assert!(payload.arguments.get(keys::INDIVIDUAL).is_none());
        assert_eq!(req.individual(), "v-1");
    }

    #[test]
    fn test_explicit_individual_has_no_assignment() {
        let mut req = individual_add();
        assert_eq!(req.set_individual("gomodel:1/i1"), "gomodel:1/i1");
        let payload = req.to_payload();
        assert!(payload.arguments.get(keys::ASSIGN_TO_VARIABLE).is_none());
        assert_eq!(
            payload.arguments.get(keys::INDIVIDUAL),
            Some(&Argument::Text("gomodel:1/i1".into()))
        );
    }

    #[test]
    fn test_non_individual_never_assigns() {
        let req = Request::new(Entity::Edge, Operation::Add);
        assert!(req
            .to_payload()
            .arguments
            .get(keys::ASSIGN_TO_VARIABLE)
            .is_none());
    }

    #[test]
    fn test_annotations_accumulate() {
        let mut req = Request::new(Entity::Model, Operation::AddAnnotation);
        assert!(req.annotations().is_empty());
        assert_eq!(req.add_annotation("title", "a model"), 1);
        assert_eq!(req.add_annotation("contributor", ["o1", "o2"]), 3);
        assert_eq!(
            req.annotations()[2],
            AnnotationPair::new("contributor", "o2")
        );
        assert_eq!(req.add_annotation("empty", Vec::<String>::new()), 3);
    }

    #[test]
    fn test_expressions_accumulate() {
        let mut req = individual_add();
        assert_eq!(req.add_class_expression("GO:1"), 1);
        assert_eq!(req.add_svf_expression("GO:2", "BFO:0000050"), 2);
        assert_eq!(
            req.add_set_class_expression(SetKind::Union, ["GO:3", "GO:4"]),
            3
        );
        assert_eq!(req.expressions().len(), 3);
        assert_eq!(req.expressions()[0], ClassExpression::class("GO:1"));
    }

    #[test]
    fn test_named_set_kind() {
        let mut req = individual_add();
        assert_eq!(
            req.add_named_set_class_expression("union", ["GO:1", "GO:2"])
                .unwrap(),
            1
        );
        assert!(matches!(req.expressions()[0], ClassExpression::Union { .. }));

        let err = req
            .add_named_set_class_expression("xor", ["GO:3", "GO:4"])
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("unknown set kind: xor"));
        assert_eq!(req.expressions().len(), 1);
    }

    #[test]
    fn test_argument_shapes_decode() {
        use serde_json::json;
        let text: Argument = serde_json::from_value(json!("gomodel:1")).unwrap();
        assert_eq!(text, Argument::Text("gomodel:1".into()));
        let pairs: Argument =
            serde_json::from_value(json!([{"key": "title", "value": "t"}])).unwrap();
        assert_eq!(
            pairs,
            Argument::Annotations(vec![AnnotationPair::new("title", "t")])
        );
        let exprs: Argument =
            serde_json::from_value(json!([{"type": "class", "id": "GO:1"}])).unwrap();
        assert_eq!(
            exprs,
            Argument::Expressions(vec![ClassExpression::class("GO:1")])
        );
    }

    #[test]
    fn test_fact_accessors() {
        let mut req = Request::new(Entity::Edge, Operation::Add);
        assert!(req.fact().is_none());
        let triple = FactTriple::new("i1", "i2", "RO:0002333").unwrap();
        req.set_fact(&triple);
        assert_eq!(req.subject(), Some("i1"));
        assert_eq!(req.object(), Some("i2"));
        assert_eq!(req.predicate(), Some("RO:0002333"));
        assert_eq!(req.fact(), Some(triple));
    }

    #[test]
    fn test_special_arguments_merge_at_serialization() {
        let mut req = Request::new(Entity::Model, Operation::Add);
        req.set_special("taxon-id", "NCBITaxon:9606");
        assert_eq!(req.special("taxon-id"), Some("NCBITaxon:9606"));
        assert!(req.argument("taxon-id").is_none());
        assert_eq!(
            req.to_payload().arguments.get("taxon-id"),
            Some(&Argument::Text("NCBITaxon:9606".into()))
        );
    }

    #[test]
    fn test_operation_wire_names() {
        assert_eq!(
            serde_json::to_value(Operation::GetUndoRedo).unwrap(),
            serde_json::json!("get-undo-redo")
        );
        assert_eq!("remove-type".parse::<Operation>().unwrap(), Operation::RemoveType);
        assert!("frobnicate"
            .parse::<Operation>()
            .unwrap_err()
            .is_invalid_operation());
        assert_eq!("edge".parse::<Entity>().unwrap(), Entity::Edge);
    }
}
