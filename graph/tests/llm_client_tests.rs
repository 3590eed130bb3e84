use germplasm_config::LlmConfig;
use serde_json::json;
use wheat_graph::llm::{LlmError, OpenAiClient, TextGenerator};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: String, api_key: Option<&str>) -> LlmConfig {
    LlmConfig {
        base_url,
        api_key: api_key.map(str::to_string),
        model: "hunyuan-turbos-latest".to_string(),
        timeout_secs: 5,
        max_tokens: 256,
    }
}

#[tokio::test]
async fn test_complete_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "hunyuan-turbos-latest",
            "messages": [{"role": "user", "content": "京411的原产地？"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "MATCH (n) RETURN n"}}],
            "usage": {"total_tokens": 42},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(server.uri(), Some("test-key"))).unwrap();
    let text = client.complete("京411的原产地？").await.unwrap();

    assert_eq!(text, "MATCH (n) RETURN n");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(server.uri(), Some("bad"))).unwrap();
    let err = client.complete("q").await.unwrap_err();

    match err {
        LlmError::Api { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(server.uri(), Some("k"))).unwrap();
    assert!(matches!(
        client.complete("q").await.unwrap_err(),
        LlmError::EmptyResponse
    ));
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(server.uri(), None)).unwrap();
    assert!(matches!(
        client.complete("q").await.unwrap_err(),
        LlmError::MissingApiKey
    ));
}
