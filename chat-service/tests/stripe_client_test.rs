use chat_service::config::StripeConfig;
use chat_service::models::find_plan;
use chat_service::services::StripeClient;
use secrecy::Secret;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> StripeClient {
    StripeClient::new(
        StripeConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            api_base_url: server.uri(),
        },
        "sparkchat".to_string(),
    )
}

#[tokio::test]
async fn creates_checkout_session_and_returns_redirect_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains("unit_amount%5D=2000"))
        .and(body_string_contains("quantity%5D=1"))
        .and(body_string_contains("transactionId%5D=tx-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cs_test_abc",
            "object": "checkout.session",
            "url": "https://checkout.stripe.com/c/pay/cs_test_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let plan = find_plan("pro").unwrap();

    let session = client
        .create_checkout_session(plan, "tx-1", "https://app.example.com")
        .await
        .expect("session creation should succeed");

    assert_eq!(session.id, "cs_test_abc");
    assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_abc");
}

#[tokio::test]
async fn success_and_cancel_urls_derive_from_the_origin() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .and(body_string_contains("success_url=http%3A%2F%2Flocalhost%3A3000%2Fsuccess"))
        .and(body_string_contains("cancel_url=http%3A%2F%2Flocalhost%3A3000%2Fcancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cs_test_def",
            "url": "https://checkout.stripe.com/c/pay/cs_test_def"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let plan = find_plan("basic").unwrap();

    client
        .create_checkout_session(plan, "tx-2", "http://localhost:3000")
        .await
        .expect("session creation should succeed");
}

#[tokio::test]
async fn api_error_surfaces_the_stripe_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "type": "invalid_request_error",
                "message": "Invalid currency: must be a supported currency."
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let plan = find_plan("premium").unwrap();

    let err = client
        .create_checkout_session(plan, "tx-3", "https://app.example.com")
        .await
        .expect_err("a 400 should be an error");

    assert!(err.to_string().contains("Invalid currency"));
}

#[tokio::test]
async fn unconfigured_client_refuses_to_call_out() {
    let client = StripeClient::new(
        StripeConfig {
            secret_key: Secret::new(String::new()),
            api_base_url: "https://api.stripe.com/v1".to_string(),
        },
        "sparkchat".to_string(),
    );
    let plan = find_plan("basic").unwrap();

    let err = client
        .create_checkout_session(plan, "tx-4", "https://app.example.com")
        .await
        .expect_err("missing credentials should fail fast");

    assert!(err.to_string().contains("not configured"));
}
