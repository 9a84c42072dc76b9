//! Integration tests across the modelbatch crates
//!
//! These tests verify end-to-end batch construction:
//! - Expression adapter → Request → RequestSet → wire payload
//! - Configuration → RequestSet
//! - Transport encoding → decoding
//!
//! Run with: cargo test --test integration_tests

use modelbatch_expr::{
    ClassExpression, ClassExpressionAdapter, ExpressionInput, Property, SetKind, StandardAdapter,
};
use modelbatch_requests::request::keys;
use modelbatch_requests::{
    Argument, BatchConfig, Entity, Intention, ModelSeed, Operation, RequestSet, SequentialIds,
};
use std::collections::HashMap;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// A labelling adapter
// ============================================================================

/// Attaches known labels to named classes; otherwise defers to the
/// standard rules.
struct LabellingAdapter {
    labels: HashMap<String, String>,
}

impl LabellingAdapter {
    fn label(&self, expr: ClassExpression) -> ClassExpression {
        match expr {
            ClassExpression::Class { id, label: None } => match self.labels.get(&id) {
                Some(label) => ClassExpression::labeled_class(id, label.clone()),
                None => ClassExpression::class(id),
            },
            other => other,
        }
    }
}

impl ClassExpressionAdapter for LabellingAdapter {
    fn construct(&self, input: ExpressionInput) -> ClassExpression {
        self.label(StandardAdapter.construct(input))
    }

    fn as_some_values_from(&self, input: ExpressionInput, property_id: &str) -> ClassExpression {
        ClassExpression::some_values_from(Property::new(property_id), self.construct(input))
    }

    fn as_set(&self, kind: SetKind, inputs: Vec<ExpressionInput>) -> ClassExpression {
        let members = inputs.into_iter().map(|i| self.construct(i)).collect();
        ClassExpression::set(kind, members)
    }
}

#[test]
fn test_injected_adapter_shapes_expressions() {
    init_tracing();
    let mut labels = HashMap::new();
    labels.insert("GO:0004672".to_string(), "protein kinase activity".to_string());
    let adapter = Arc::new(LabellingAdapter { labels });

    let mut rs = RequestSet::new(None, Some("gomodel:0001".to_string())).with_adapter(adapter);
    rs.add_individual("GO:0004672", None);

    let exprs = rs.requests()[0].expressions();
    assert_eq!(
        exprs[0],
        ClassExpression::labeled_class("GO:0004672", "protein kinase activity")
    );
}

#[test]
fn test_custom_request_with_svf_and_set_expressions() {
    let mut rs = RequestSet::default();
    let mut req = rs.request(Entity::Individual, Operation::Add);
    req.add_svf_expression("GO:0005634", "BFO:0000050");
    req.add_set_class_expression(SetKind::Intersection, ["GO:0003674", "GO:0008150"]);
    let id = req.individual().to_string();
    rs.add(req, None);

    assert_eq!(rs.intention(), Intention::Action);
    assert_eq!(rs.last_individual_id(0), Some(id));
    let payload = rs.structure();
    match payload.requests[0].arguments.get(keys::EXPRESSIONS) {
        Some(Argument::Expressions(exprs)) => {
            assert_eq!(exprs.len(), 2);
            assert!(matches!(exprs[0], ClassExpression::Svf { .. }));
            assert!(matches!(exprs[1], ClassExpression::Intersection { .. }));
        }
        other => panic!("expected expressions, got {:?}", other),
    }
}

// ============================================================================
// A realistic curation batch
// ============================================================================

#[test]
fn test_curation_batch_end_to_end() -> anyhow::Result<()> {
    init_tracing();
    let config = BatchConfig::from_json(
        r#"{"token": "abc123", "model_id": "gomodel:5fce9b7300001215", "id_prefix": "tmp"}"#,
    )?;
    let mut rs = RequestSet::from_config(&config);

    let activity = rs.add_individual("GO:0004672", None);
    let process = rs.add_individual("GO:0006468", None);
    rs.add_fact((activity.as_str(), process.as_str(), "BFO:0000050"), None)?;
    let ev = rs
        .add_evidence_to_last_fact("ECO:0000314", ["PMID:1", "PMID:2"], None)
        .expect("fact precedes evidence");
    rs.add_annotation_to_individual("comment", "reviewed", &activity, None)?
        .add_annotation_to_model("title", "kinase in phosphorylation", None)
        .store_model(None);

    // 2 individuals + fact + 3 evidence + 2 annotations + store
    assert_eq!(rs.len(), 9);
    assert_eq!(activity, "tmp-1");
    assert_eq!(process, "tmp-2");
    assert_eq!(ev, "tmp-3");

    let payload = rs.structure();
    assert_eq!(payload.token.as_deref(), Some("abc123"));
    assert_eq!(payload.intention, Intention::Action);
    for req in &payload.requests {
        assert_eq!(
            req.arguments.get(keys::MODEL_ID),
            Some(&Argument::Text("gomodel:5fce9b7300001215".into()))
        );
    }
    let assigned: Vec<&Argument> = payload
        .requests
        .iter()
        .filter_map(|r| r.arguments.get(keys::ASSIGN_TO_VARIABLE))
        .collect();
    assert_eq!(assigned.len(), 3);

    let callable = rs.callable()?;
    assert_eq!(callable.decode()?, payload.requests);
    Ok(())
}

#[test]
fn test_new_model_then_query() {
    let mut rs = RequestSet::new(Some("tok".into()), None)
        .with_id_generator(Arc::new(SequentialIds::new("n")));
    rs.add_model(
        &ModelSeed::new()
            .with_class("GO:0008150")
            .with_taxon("NCBITaxon:9606"),
    );
    rs.get_meta();
    let payload = rs.structure();
    assert_eq!(payload.intention, Intention::Action);
    let args = &payload.requests[0].arguments;
    assert_eq!(args.get("class-id"), Some(&Argument::Text("GO:0008150".into())));
    assert_eq!(args.get("taxon-id"), Some(&Argument::Text("NCBITaxon:9606".into())));
    assert_eq!(payload.requests[1].entity, Entity::Meta);
}

#[test]
fn test_read_only_batch_stays_query() {
    let mut rs = RequestSet::new(None, Some("gomodel:1".into()));
    rs.get_model(None).get_undo_redo(None).export_model("gaf", None);
    let payload = rs.structure();
    assert_eq!(payload.intention, Intention::Query);
    assert!(payload.token.is_none());
    assert_eq!(
        payload.requests[2].arguments.get("format"),
        Some(&Argument::Text("gaf".into()))
    );
}
