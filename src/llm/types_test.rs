use super::*;
use crate::error::ErrorCode;

// =============================================================================
// LlmError codes
// =============================================================================

#[test]
fn error_codes_are_distinct() {
    let errors = [
        LlmError::ConfigParse("x".into()),
        LlmError::MissingApiKey { var: "K".into() },
        LlmError::ApiRequest("x".into()),
        LlmError::ApiTimeout("x".into()),
        LlmError::ApiResponse { status: 400, body: String::new() },
        LlmError::ApiParse("x".into()),
        LlmError::HttpClientBuild("x".into()),
    ];
    let mut codes: Vec<&str> = errors.iter().map(|e| e.error_code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn server_errors_and_throttling_are_retryable() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(LlmError::ApiTimeout("slow".into()).retryable());
    assert!(!LlmError::ApiParse("bad".into()).retryable());
}

#[test]
fn missing_key_names_the_variable() {
    let err = LlmError::MissingApiKey { var: "GEMINI_API_KEY".into() };
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

// =============================================================================
// Wire shapes
// =============================================================================

#[test]
fn vision_response_default_has_no_text() {
    let resp = VisionResponse::default();
    assert!(resp.text.is_none());
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn inline_image_serde_round_trip() {
    let image = InlineImage { mime_type: "image/png".into(), data: "iVBORw0KGgo=".into() };
    let json = serde_json::to_string(&image).unwrap();
    let restored: InlineImage = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, image);
}
