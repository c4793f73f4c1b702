use chat_service::config::GeminiConfig;
use chat_service::services::gemini::GenerationError;
use chat_service::services::GeminiClient;
use secrecy::Secret;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: Secret::new("test-key".to_string()),
        api_base_url: server.uri(),
        model: "gemini-2.0-flash".to_string(),
    })
}

#[tokio::test]
async fn generates_a_completion_for_a_single_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Hi! How can I help you today?" }]
                    },
                    "finishReason": "STOP"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let completion = client.generate("hello").await.expect("generation succeeds");

    assert_eq!(completion, "Hi! How can I help you today?");
}

#[tokio::test]
async fn rate_limit_is_reported_as_its_own_kind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.generate("hello").await.expect_err("429 is an error");

    assert!(matches!(err, GenerationError::RateLimited));
}

#[tokio::test]
async fn api_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.generate("hello").await.expect_err("500 is an error");

    match err {
        GenerationError::Api(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("internal"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_candidates_is_an_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate("hello")
        .await
        .expect_err("no candidates is an error");

    assert!(matches!(err, GenerationError::EmptyCompletion));
}
