use std::path::Path;

use qdyn_core::errors::{ErrorInfo, QdynError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("site", "3")
        .with_context("layer", "7")
}

#[test]
fn configuration_error_surface() {
    let err = QdynError::Configuration(sample_info("site-count", "need at least two sites"));
    assert_eq!(err.info().code, "site-count");
    assert!(err.info().context.contains_key("site"));
    assert!(err.to_string().starts_with("configuration error:"));
}

#[test]
fn invariant_error_surface() {
    let err = QdynError::Invariant(sample_info("slot-double-write", "slot already written"));
    assert_eq!(err.info().code, "slot-double-write");
    assert!(err.info().context.contains_key("layer"));
}

#[test]
fn corrupt_error_surface() {
    let err = QdynError::corrupt("marker-out-of-range", "marker 9 has no pattern");
    assert_eq!(err.info().code, "marker-out-of-range");
    assert!(err.info().context.is_empty());
}

#[test]
fn io_error_records_path_and_kind() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = QdynError::io("chain-read", Path::new("chain.bin"), &io);
    assert_eq!(err.info().context.get("path").map(String::as_str), Some("chain.bin"));
    assert_eq!(err.info().context.get("kind").map(String::as_str), Some("NotFound"));
}

#[test]
fn display_includes_context_and_hint() {
    let info = ErrorInfo::new("basis", "unknown basis 'x'")
        .with_context("value", "x")
        .with_hint("use 'fixed' or 'random'");
    let rendered = QdynError::Configuration(info).to_string();
    assert_eq!(
        rendered,
        "configuration error: unknown basis 'x' (code: basis) | context: [value=x] | hint: use 'fixed' or 'random'"
    );
}

#[test]
fn errors_round_trip_json() {
    let err = QdynError::Execution(sample_info("engine-exit", "engine exited with status 1"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Execution\""));
    let decoded: QdynError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
