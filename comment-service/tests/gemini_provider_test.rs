//! Wire-level tests for the Gemini provider against a local stand-in server.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Router,
};
use comment_service::models::{CommentRequest, CommentSource};
use comment_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use comment_service::services::providers::{GenerationParams, ProviderError, TextProvider};
use comment_service::services::CommentService;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Captured {
    uri: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct MockGemini {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn record(
    State(mock): State<MockGemini>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    mock.captured.lock().unwrap().push(Captured {
        uri: uri.to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    (mock.status, mock.reply.to_string())
}

/// Serve `reply` with `status` for every request; returns the API base URL
/// and the capture log.
async fn spawn_mock_gemini(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(MockGemini {
        status,
        reply,
        captured: captured.clone(),
    });

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1beta", addr), captured)
}

/// Upstream that accepts the request but answers only after `delay`.
async fn spawn_slow_gemini(delay: Duration) -> String {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        (StatusCode::OK, json!({ "candidates": [] }).to_string())
    });

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v1beta", addr)
}

fn provider_with_timeout(api_base: String, timeout: Duration) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        model: "gemini-1.5-flash".to_string(),
        api_base,
        timeout,
    })
    .unwrap()
}

fn provider(api_base: String) -> GeminiTextProvider {
    provider_with_timeout(api_base, Duration::from_secs(5))
}

#[tokio::test]
async fn sends_key_in_header_and_parses_text() {
    let (base, captured) = spawn_mock_gemini(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Şık ve kullanışlı.\n" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 20, "candidatesTokenCount": 6 }
        }),
    )
    .await;

    let response = provider(base)
        .generate("AIzaSyWireTest", "\"Kalem\" ürününü analiz et.", &GenerationParams::default())
        .await
        .unwrap();

    assert_eq!(response.text, "Şık ve kullanışlı.\n");
    assert_eq!(response.input_tokens, 20);
    assert_eq!(response.output_tokens, 6);

    let calls = captured.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].uri, "/v1beta/models/gemini-1.5-flash:generateContent");
    assert!(!calls[0].uri.contains("AIzaSyWireTest"));
    assert_eq!(calls[0].api_key.as_deref(), Some("AIzaSyWireTest"));
    assert_eq!(
        calls[0].body["contents"][0]["parts"][0]["text"],
        "\"Kalem\" ürününü analiz et."
    );
    assert_eq!(calls[0].body["generationConfig"]["candidateCount"], 1);
}

#[tokio::test]
async fn invalid_key_surfaces_google_message() {
    let (base, _) = spawn_mock_gemini(
        StatusCode::BAD_REQUEST,
        json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        }),
    )
    .await;

    let err = provider(base)
        .generate("AIzaBad", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(message) => {
            assert!(message.starts_with("Gemini API error 400"));
            assert!(message.ends_with("API key not valid. Please pass a valid API key."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn quota_exhaustion_is_rate_limited() {
    let (base, _) = spawn_mock_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "code": 429, "message": "Resource exhausted" } }),
    )
    .await;

    let err = provider(base)
        .generate("AIzaQuota", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn empty_candidates_is_error() {
    let (base, _) = spawn_mock_gemini(StatusCode::OK, json!({ "candidates": [] })).await;

    let err = provider(base)
        .generate("AIzaEmpty", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn non_json_success_body_is_api_error() {
    let (base, _) = spawn_mock_gemini(StatusCode::OK, json!("not an object")).await;

    let err = provider(base)
        .generate("AIzaGarbage", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ApiError(_)));
}

#[tokio::test]
async fn header_unsafe_key_is_rejected_locally() {
    let (base, captured) = spawn_mock_gemini(StatusCode::OK, json!({})).await;

    let err = provider(base)
        .generate("AIza\nInjected", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidRequest(_)));
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn slow_upstream_times_out_as_network_error() {
    let base = spawn_slow_gemini(Duration::from_secs(3)).await;

    let err = provider_with_timeout(base, Duration::from_millis(300))
        .generate("AIzaSlow", "prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::NetworkError(message) => assert!(message.contains("timed out")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_upstream_yields_key_error_comment() {
    let base = spawn_slow_gemini(Duration::from_secs(3)).await;
    let service = CommentService::new(Arc::new(provider_with_timeout(
        base,
        Duration::from_millis(300),
    )));
    let request: CommentRequest =
        serde_json::from_value(json!({ "title": "Kalem", "apiKey": "AIzaSlow" })).unwrap();

    let response = service.comment(&request).await;

    assert!(response.success);
    assert_eq!(response.source, CommentSource::KeyError);
    assert_eq!(
        response.yorum,
        "API key hatası: Network error: request to Gemini API timed out"
    );
}
