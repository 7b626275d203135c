use super::*;
use crate::services::capture::{DEFAULT_MAX_IMAGE_BYTES, encode_image};
use crate::state::test_helpers::{MockReply, MockVision, RUST_LEAF_JSON};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn png() -> EncodedImage {
    encode_image(PNG_MAGIC, Some("image/png"), DEFAULT_MAX_IMAGE_BYTES).unwrap()
}

async fn run(mock: Arc<MockVision>, config: DiagnosisConfig) -> Result<AnalysisResult, DiagnosisError> {
    let llm: Arc<dyn VisionChat> = mock;
    analyze(&llm, &config, &png()).await
}

// =========================================================================
// build_request
// =========================================================================

#[test]
fn request_uses_detected_mime_by_default() {
    let req = build_request(&png(), &DiagnosisConfig::default());
    assert_eq!(req.image.mime_type, "image/png");
    assert_eq!(req.image.data, png().payload);
}

#[test]
fn request_legacy_label_is_always_jpeg() {
    let config = DiagnosisConfig { mime_label: MimeLabel::LegacyJpeg, ..DiagnosisConfig::default() };
    let req = build_request(&png(), &config);
    assert_eq!(req.image.mime_type, LEGACY_MIME_LABEL);
}

#[test]
fn request_prompt_asks_for_bengali_and_all_keys() {
    let req = build_request(&png(), &DiagnosisConfig::default());
    assert!(req.prompt.contains("Bengali"));
    for key in ["problemName", "description", "solution", "urgency"] {
        assert!(req.prompt.contains(key), "prompt should mention {key}");
    }
    assert_eq!(req.response_schema["required"].as_array().unwrap().len(), 4);
}

// =========================================================================
// decode_result
// =========================================================================

#[test]
fn decode_rust_leaf_scenario() {
    let result = decode_result(RUST_LEAF_JSON).unwrap();
    assert_eq!(result.problem_name, "পাতা মরিচা রোগ");
    assert_eq!(result.urgency, Urgency::High);
    assert!(result.solution.contains('\n'));
}

#[test]
fn decode_tolerates_surrounding_whitespace_and_extra_fields() {
    let text = r#"
        {"problemName":"a","description":"b","solution":"c","urgency":"Low","confidence":0.9}
    "#;
    let result = decode_result(text).unwrap();
    assert_eq!(result.urgency, Urgency::Low);
}

#[test]
fn decode_missing_each_field_is_schema_violation() {
    for missing in ["problemName", "description", "solution", "urgency"] {
        let mut value: serde_json::Value = serde_json::from_str(RUST_LEAF_JSON).unwrap();
        value.as_object_mut().unwrap().remove(missing);
        let err = decode_result(&value.to_string()).unwrap_err();
        assert!(
            matches!(err, DiagnosisError::SchemaViolation(SchemaViolation::MissingField(f)) if f == missing),
            "expected missing {missing}, got {err:?}"
        );
    }
}

#[test]
fn decode_non_string_field_is_schema_violation() {
    let text = r#"{"problemName":"a","description":"b","solution":["1. x"],"urgency":"Low"}"#;
    let err = decode_result(text).unwrap_err();
    assert!(matches!(err, DiagnosisError::SchemaViolation(SchemaViolation::NotAString("solution"))));
}

#[test]
fn decode_blank_field_is_schema_violation() {
    let text = r#"{"problemName":"   ","description":"b","solution":"c","urgency":"Low"}"#;
    let err = decode_result(text).unwrap_err();
    assert!(matches!(err, DiagnosisError::SchemaViolation(SchemaViolation::EmptyField("problemName"))));
}

#[test]
fn decode_unknown_urgency_is_schema_violation() {
    for bad in ["Critical", "high", " High", "উচ্চ"] {
        let text = serde_json::json!({
            "problemName": "a", "description": "b", "solution": "c", "urgency": bad
        })
        .to_string();
        let err = decode_result(&text).unwrap_err();
        assert!(
            matches!(&err, DiagnosisError::SchemaViolation(SchemaViolation::UnknownUrgency(u)) if u == bad),
            "expected unknown urgency for {bad:?}"
        );
    }
}

#[test]
fn decode_array_is_not_an_object() {
    let err = decode_result("[1,2,3]").unwrap_err();
    assert!(matches!(err, DiagnosisError::SchemaViolation(SchemaViolation::NotAnObject)));
}

#[test]
fn decode_non_json_is_malformed() {
    let err = decode_result("পাতা মরিচা রোগ").unwrap_err();
    assert!(matches!(err, DiagnosisError::MalformedResponse(_)));
    assert_eq!(err.error_code(), "E_MALFORMED_RESPONSE");
}

#[test]
fn urgency_literals_round_trip() {
    for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
        assert_eq!(Urgency::parse(urgency.as_str()), Some(urgency));
    }
}

// =========================================================================
// analyze
// =========================================================================

#[tokio::test]
async fn analyze_returns_validated_result() {
    let mock = MockVision::new(vec![MockReply::Text(RUST_LEAF_JSON.into())]);
    let result = run(Arc::clone(&mock), DiagnosisConfig::default()).await.unwrap();
    assert_eq!(result.urgency, Urgency::High);
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image.mime_type, "image/png");
    assert_eq!(requests[0].image.data, png().payload);
}

#[tokio::test]
async fn analyze_no_text_is_empty_response() {
    let err = run(MockVision::new(vec![MockReply::Empty]), DiagnosisConfig::default()).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::EmptyResponse));
}

#[tokio::test]
async fn analyze_whitespace_text_is_empty_response() {
    let err = run(MockVision::new(vec![MockReply::Text(" \n ".into())]), DiagnosisConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiagnosisError::EmptyResponse));
}

#[tokio::test]
async fn analyze_http_error_is_transport() {
    let mock = MockVision::new(vec![MockReply::Fail(LlmError::ApiResponse { status: 500, body: "boom".into() })]);
    let err = run(mock, DiagnosisConfig::default()).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::Transport(LlmError::ApiResponse { status: 500, .. })));
    assert_eq!(err.error_code(), "E_TRANSPORT");
}

#[tokio::test]
async fn analyze_client_timeout_is_timeout() {
    let mock = MockVision::new(vec![MockReply::Fail(LlmError::ApiTimeout("deadline".into()))]);
    let err = run(mock, DiagnosisConfig::default()).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::Timeout(_)));
}

#[tokio::test]
async fn analyze_bounded_wait_is_timeout() {
    let config = DiagnosisConfig { timeout: Duration::from_millis(20), ..DiagnosisConfig::default() };
    let err = run(MockVision::new(vec![MockReply::Hang]), config).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::Timeout(_)));
    assert_eq!(err.error_code(), "E_TIMEOUT");
}

#[tokio::test]
async fn analyze_failures_share_one_user_message() {
    let cases = [
        MockReply::Empty,
        MockReply::Text("not json".into()),
        MockReply::Text(r#"{"problemName":"a"}"#.into()),
        MockReply::Fail(LlmError::ApiRequest("dns".into())),
    ];
    for reply in cases {
        let err = run(MockVision::new(vec![reply]), DiagnosisConfig::default()).await.unwrap_err();
        assert_eq!(err.user_message(), locale::ANALYSIS_FAILED);
        assert!(err.retryable());
    }
}

#[test]
fn not_configured_has_distinct_message() {
    let err = DiagnosisError::NotConfigured;
    assert_eq!(err.user_message(), locale::ANALYSIS_UNAVAILABLE);
    assert!(!err.retryable());
}
