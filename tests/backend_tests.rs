//! HTTP client tests against a mock assistant service

use maya::backend::{ChatBackend, ChatRequest, HttpBackend, StepId};
use maya::config::BackendConfig;
use maya::ChatError;
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: server.uri(),
        timeout_secs: Some(5),
    })
    .expect("HTTP client")
}

fn text_request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        image: None,
    }
}

#[tokio::test]
async fn test_chat_reply_with_steps_and_source() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "What's the gold price?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "Gold is up 2% today.",
            "source": "web_search",
            "steps": [
                { "id": 1, "icon": "🔍", "status": "Searching the web" },
                { "id": "rank", "icon": "📊", "status": "Ranking results" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .chat(&text_request("What's the gold price?"))
        .await
        .unwrap();

    assert_eq!(reply.reply, "Gold is up 2% today.");
    assert_eq!(reply.source.as_deref(), Some("web_search"));
    assert_eq!(reply.steps.len(), 2);
    assert_eq!(reply.steps[0].id, StepId::Number(1));
    assert_eq!(reply.steps[1].id, StepId::Text("rank".into()));
    assert_eq!(reply.steps[1].status, "Ranking results");
}

#[tokio::test]
async fn test_chat_accepts_response_alias() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi there!"
        })))
        .mount(&server)
        .await;

    let reply = backend_for(&server).chat(&text_request("Hello")).await.unwrap();
    assert_eq!(reply.reply, "Hi there!");
    assert!(reply.source.is_none());
    assert!(reply.steps.is_empty());
}

#[tokio::test]
async fn test_chat_prefers_reply_over_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "from reply",
            "response": "from response"
        })))
        .mount(&server)
        .await;

    let reply = backend_for(&server).chat(&text_request("Hello")).await.unwrap();
    assert_eq!(reply.reply, "from reply");
}

#[tokio::test]
async fn test_chat_sends_image_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "", "image": "aGVsbG8=" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "A greeting." })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        message: String::new(),
        image: Some("aGVsbG8=".into()),
    };
    let reply = backend_for(&server).chat(&request).await.unwrap();
    assert_eq!(reply.reply, "A greeting.");
}

#[tokio::test]
async fn test_chat_server_error_is_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .chat(&text_request("Hello"))
        .await
        .unwrap_err();

    match err {
        ChatError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model crashed");
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_without_reply_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "source": "kb" })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .chat(&text_request("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[tokio::test]
async fn test_chat_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .chat(&text_request("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Suhash",
            "role": "Lead Developer",
            "tech": "Rust"
        })))
        .mount(&server)
        .await;

    let profile = backend_for(&server).fetch_profile().await.unwrap();
    assert_eq!(profile.name, "Suhash");
    assert_eq!(profile.role, "Lead Developer");
    assert_eq!(profile.tech, "Rust");
}

#[tokio::test]
async fn test_fetch_profile_defaults_missing_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Ada" })))
        .mount(&server)
        .await;

    let profile = backend_for(&server).fetch_profile().await.unwrap();
    assert_eq!(profile.name, "Ada");
    assert!(profile.role.is_empty());
    assert!(profile.tech.is_empty());
}

#[tokio::test]
async fn test_fetch_profile_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend_for(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, ChatError::Backend { status: 404, .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Reserve a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let backend = HttpBackend::new(&BackendConfig {
        base_url: format!("http://127.0.0.1:{}", port),
        timeout_secs: Some(5),
    })
    .unwrap();

    let err = backend.chat(&text_request("Hello")).await.unwrap_err();
    assert!(matches!(err, ChatError::Network(_)));
}
