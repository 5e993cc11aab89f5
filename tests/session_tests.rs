//! End-to-end tests: session controller, dispatch worker and HTTP client
//! against a mock assistant service

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use maya::backend::HttpBackend;
use maya::config::{BackendConfig, SessionConfig};
use maya::dispatch::{DispatchPipeline, DispatchTiming};
use maya::profile::ProfileState;
use maya::session::{SessionController, OFFLINE_NOTICE};
use maya::speech::{SpeechInputAdapter, SpeechOutputAdapter};
use maya::Role;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn connect(server: &MockServer, timing: DispatchTiming) -> SessionController {
    let backend = HttpBackend::new(&BackendConfig {
        base_url: server.uri(),
        timeout_secs: Some(5),
    })
    .expect("HTTP client");

    let pipeline = DispatchPipeline::new(Arc::new(backend), timing);
    let dispatch = pipeline.handle();
    pipeline.start_worker().expect("dispatch worker");

    SessionController::new(
        SessionConfig::default(),
        dispatch,
        SpeechInputAdapter::unavailable(),
        SpeechOutputAdapter::unavailable(),
    )
}

/// Poll the session like the UI would until `done` holds
async fn poll_until(session: &mut SessionController, done: impl Fn(&SessionController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        session.poll_events();
        if done(session) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for session");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn mount_reply(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hello_round_trip() {
    let server = MockServer::start().await;
    mount_reply(&server, json!({ "reply": "Hi there!" })).await;

    let mut session = connect(&server, DispatchTiming::default());
    session.update_draft_text("Hello");
    assert!(session.submit());
    assert!(session.is_busy());

    poll_until(&mut session, |s| !s.is_busy()).await;

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hi there!");
    assert!(session.steps().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_failure_appends_offline_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = connect(&server, DispatchTiming::default());
    session.update_draft_text("Hello");
    session.submit();

    poll_until(&mut session, |s| !s.is_busy()).await;

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, OFFLINE_NOTICE);

    // The session stays usable
    session.update_draft_text("Again");
    assert!(session.submit());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_greeting_precedes_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Suhash",
            "role": "Lead Developer"
        })))
        .mount(&server)
        .await;

    let mut session = connect(&server, DispatchTiming::default());
    session.initialize();
    poll_until(&mut session, |s| s.profile_state() == ProfileState::Loaded).await;

    let messages = session.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].content,
        "Hello Suhash, I'm Maya. How can I help you today?"
    );
    assert_eq!(session.profile().initial(), "S");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_profile_is_silent() {
    let server = MockServer::start().await;

    let mut session = connect(&server, DispatchTiming::default());
    session.initialize();
    poll_until(&mut session, |s| s.profile_state() == ProfileState::Unavailable).await;

    assert!(session.messages().is_empty());
    assert!(session.notice().is_none());
    assert_eq!(session.profile().name, "User");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_steps_visible_until_reply() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        json!({
            "reply": "Gold is up 2% today.",
            "source": "web_search",
            "steps": [
                { "id": 1, "icon": "🔍", "status": "Searching the web" },
                { "id": 2, "icon": "📊", "status": "Comparing prices" }
            ]
        }),
    )
    .await;

    let timing = DispatchTiming {
        reply_delay: Duration::from_millis(300),
        step_reveal_interval: Duration::from_millis(100),
    };
    let mut session = connect(&server, timing);
    session.update_draft_text("What's the gold price?");
    session.submit();

    poll_until(&mut session, |s| !s.steps().is_empty()).await;
    assert!(session.is_busy());
    assert_eq!(session.steps().len(), 2);
    assert_eq!(session.steps()[0].status, "Searching the web");

    poll_until(&mut session, |s| !s.is_busy()).await;
    assert!(session.steps().is_empty());

    let reply = session.transcript().last().unwrap();
    assert_eq!(reply.content, "Gold is up 2% today.");
    assert_eq!(reply.source.as_deref(), Some("web_search"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_image_attachment_is_encoded() {
    let server = MockServer::start().await;
    mount_reply(&server, json!({ "reply": "A photo of a cat." })).await;

    let bytes: Vec<u8> = (0..50 * 1024).map(|i| (i % 251) as u8).collect();
    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .unwrap();
    file.write_all(&bytes).unwrap();

    let mut session = connect(&server, DispatchTiming::default());
    assert!(session.attach_file(file.path()));
    assert!(session.submit());

    let user_turn = session.messages()[0].clone();
    assert_eq!(user_turn.content, "");
    assert_eq!(
        user_turn.image.as_ref().map(|i| i.mime_type.as_str()),
        Some("image/jpeg")
    );
    assert!(session.attachment().is_none());

    poll_until(&mut session, |s| !s.is_busy()).await;
    assert_eq!(session.messages()[1].content, "A photo of a cat.");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["message"], "");
    let image = body["image"].as_str().unwrap();
    assert!(!image.is_empty());
    assert_eq!(BASE64_STANDARD.decode(image).unwrap(), bytes);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreadable_attachment_restores_draft() {
    let server = MockServer::start().await;
    mount_reply(&server, json!({ "reply": "unused" })).await;

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.png");

    let mut session = connect(&server, DispatchTiming::default());
    assert!(session.attach_file(&missing));
    session.update_draft_text("what is this?");
    session.submit();

    poll_until(&mut session, |s| !s.is_busy()).await;

    assert_eq!(session.draft().text, "what is this?");
    assert_eq!(
        session.attachment().map(|a| a.path().to_path_buf()),
        Some(missing)
    );
    assert!(session.notice().is_some());
    assert_eq!(session.messages().len(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}
