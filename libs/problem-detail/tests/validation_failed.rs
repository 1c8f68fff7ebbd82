//! End-to-end mapping of an unregistered validation exception.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::StatusCode;
use problem_detail::{
    Exception, ExceptionIdentity, ExceptionRegistry, Extensions, KnownTypes, MemorySink,
    NamingConvention, ProblemDetailBuilder, TransportContext,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("{} violations failed", .violations.len())]
struct ValidationFailedException {
    violations: BTreeMap<String, String>,
}

impl Exception for ValidationFailedException {
    fn extensions(&self) -> Extensions {
        let mut ext = Extensions::new();
        ext.insert("violations".to_string(), json!(self.violations));
        ext
    }
}

fn violations() -> BTreeMap<String, String> {
    [
        ("firstName", "must not be null"),
        ("lastName", "must not be empty"),
        ("born", "must be a past date"),
        ("address[0].street", "must not be null"),
        ("address[0].zipCode", "must be greater than 0"),
        ("address[0].city", "must not be null"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn unregistered_exception_builds_full_document() {
    let registry = Arc::new(ExceptionRegistry::default());
    let builder = ProblemDetailBuilder::new(registry.clone());

    let e = ValidationFailedException { violations: violations() };
    let p = builder.build(&e, &TransportContext::default());

    assert_eq!(p.type_uri, "urn:problem-type:validation-failed");
    assert_eq!(p.title, "Validation Failed");
    assert_eq!(p.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(p.detail.as_deref(), Some("6 violations failed"));
    assert_eq!(
        p.extension("violations").and_then(|v| v.get("firstName")),
        Some(&json!("must not be null"))
    );
    assert_eq!(p.extension("violations").and_then(|v| v.as_object()).map(|m| m.len()), Some(6));

    // the derived type is now resolvable
    assert_eq!(
        registry.resolve("urn:problem-type:validation-failed"),
        Some(ExceptionIdentity::of::<ValidationFailedException>())
    );
}

#[test]
fn wire_shape_is_flat() {
    let builder = ProblemDetailBuilder::new(Arc::new(ExceptionRegistry::default()));
    let e = ValidationFailedException { violations: violations() };
    let v = serde_json::to_value(builder.build(&e, &TransportContext::default())).unwrap();

    let obj = v.as_object().unwrap();
    assert_eq!(obj["type"], json!("urn:problem-type:validation-failed"));
    assert_eq!(obj["status"], json!(500));
    assert!(obj["instance"].as_str().unwrap().starts_with("urn:uuid:"));
    assert!(obj["violations"].is_object());
}

#[test]
fn incoming_type_maps_back_through_convention() {
    let types = Arc::new(KnownTypes::new());
    let id = types.register::<ValidationFailedException>();
    let namespace = id.name().trim_end_matches(id.simple_name()).to_string();

    let registry = Arc::new(ExceptionRegistry::new(
        NamingConvention::default().with_namespaces([namespace]),
    ));
    let builder = ProblemDetailBuilder::new(registry).with_universe(types);

    assert_eq!(builder.map_type("urn:problem-type:validation-failed"), Some(id));
    assert_eq!(builder.map_type("urn:problem-type:nothing-here"), None);
    assert_eq!(builder.map_type("not-a-urn"), None);
}

#[test]
fn logging_records_resolution() {
    let sink = MemorySink::new();
    let builder = ProblemDetailBuilder::new(Arc::new(ExceptionRegistry::default()))
        .with_sink(Arc::new(sink.clone()));
    let e = ValidationFailedException { violations: violations() };

    let resolved = builder.resolve(&e, &TransportContext::default());
    resolved.log();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identity, ExceptionIdentity::of::<ValidationFailedException>());
    assert_eq!(records[0].type_uri, "urn:problem-type:validation-failed");
    assert_eq!(records[0].instance, resolved.problem().instance);
}
