use pretty_assertions::assert_eq;
use pulse_core::RateLimitAware;
use pulse_gemini::{GeminiClient, GenerateRequest, Provider, ProviderError};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::builder()
        .api_key("test-key")
        .model("test-model")
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn answer(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn grounded_structured_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "find posts" }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer(r#"[{"author":"Ferris"}]"#)))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("find posts")
        .schema(json!({ "type": "ARRAY" }))
        .grounded();
    let value = client(&server).generate(&request).await.unwrap();

    assert_eq!(value, json!([{ "author": "Ferris" }]));
}

#[tokio::test]
async fn plain_request_has_no_tools_or_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("{}")))
        .mount(&server)
        .await;

    client(&server)
        .generate(&GenerateRequest::new("hello"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
}

#[tokio::test]
async fn quota_errors_are_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "You exceeded your current quota.",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .generate(&GenerateRequest::new("x"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ProviderError::Status {
            status: 429,
            message: "RESOURCE_EXHAUSTED: You exceeded your current quota.".into(),
        }
    );
    assert!(error.is_rate_limited());
}

#[tokio::test]
async fn server_errors_are_not_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let error = client(&server)
        .generate(&GenerateRequest::new("x"))
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert!(!error.is_rate_limited());
}

#[tokio::test]
async fn empty_answer_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let value = client(&server)
        .generate(&GenerateRequest::new("x"))
        .await
        .unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn non_json_answer_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("Sorry, I can't help.")))
        .mount(&server)
        .await;

    let error = client(&server)
        .generate(&GenerateRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(error, ProviderError::Parse(_)));
}

#[tokio::test]
async fn missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();

    assert!(!client.has_credential());
    assert_eq!(
        client.generate(&GenerateRequest::new("x")).await,
        Err(ProviderError::MissingCredential)
    );
}
