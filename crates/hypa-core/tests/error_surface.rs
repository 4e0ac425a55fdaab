use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::{Hyperedge, Incidence, Node};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("id", "e1")
        .with_context("reason", "example")
}

#[test]
fn validation_error_surface() {
    let err = HypaError::Validation(sample_info("incidence-shape", "bad incidence"));
    assert_eq!(err.code(), "incidence-shape");
    assert!(err.info().context.contains_key("id"));
}

#[test]
fn context_can_be_added_to_any_family() {
    let err = HypaError::Merge(ErrorInfo::new("conflict", "cannot merge")).with_context("edge", "e9");
    assert_eq!(err.info().context["edge"], "e9");
    let err = HypaError::Namespace(ErrorInfo::new("namespace-missing", "gone")).with_context("name", "a/b");
    assert_eq!(err.info().context["name"], "a/b");
}

#[test]
fn display_includes_code_context_and_hint() {
    let err = HypaError::Domain(
        ErrorInfo::new("invalid-direction-mode", "unknown mode")
            .with_context("mode", "sideways")
            .with_hint("use undirected, forward or backward"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("domain error: unknown mode (code: invalid-direction-mode)"));
    assert!(rendered.contains("mode=sideways"));
    assert!(rendered.contains("hint: use undirected"));
}

#[test]
fn errors_round_trip_through_json() {
    let err = HypaError::Hif(sample_info("strict-auto-create", "auto created"));
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Hif\""));
    let decoded: HypaError = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, err);
}

#[test]
fn out_of_range_confidence_fails_construction() {
    let edge = Hyperedge::new("e1", "link", vec![Incidence::node("a")]).unwrap();
    let err = edge.with_source("extractor", 1.5).unwrap_err();
    assert!(matches!(&err, HypaError::Validation(info) if info.code == "confidence-out-of-range"));
    assert_eq!(err.info().context["edge"], "e1");
}

#[test]
fn node_builders_keep_identity() {
    let node = Node::new("users", "table").unwrap().with_property("rows", 10);
    assert_eq!(node.id(), "users");
    assert_eq!(node.node_type(), "table");
    assert_eq!(node.properties()["rows"], serde_json::json!(10));
}
