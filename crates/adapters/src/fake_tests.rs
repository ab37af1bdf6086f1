use super::*;
use crate::client::{RunCallbacks, RunOptions};
use parking_lot::Mutex as PMutex;
use tenazas_core::{ApprovalMode, ModelTier};

fn options(prompt: &str, callbacks: RunCallbacks) -> RunOptions {
    RunOptions {
        cancel: None,
        native_session_id: None,
        prompt: prompt.to_string(),
        workspace: std::path::PathBuf::from("/tmp"),
        approval_mode: ApprovalMode::AutoEdit,
        yolo: false,
        model_tier: ModelTier::Unset,
        budget_usd: None,
        callbacks,
    }
}

#[tokio::test]
async fn scripted_response_is_streamed_through_on_chunk() {
    let fake = FakeAgentClient::new();
    fake.push_response("hello there");

    let received = Arc::new(PMutex::new(String::new()));
    let sink = Arc::clone(&received);
    let mut callbacks = RunCallbacks::default();
    callbacks.on_chunk = Some(Arc::new(move |text: &str| sink.lock().push_str(text)));

    let result = fake.run(options("hi", callbacks)).await.unwrap();
    assert_eq!(result, "hello there");
    assert_eq!(*received.lock(), "hello there");
}

#[tokio::test]
async fn scripted_error_surfaces_as_protocol_error() {
    let fake = FakeAgentClient::new();
    fake.push_error("boom");
    let err = fake.run(options("hi", RunCallbacks::default())).await.unwrap_err();
    assert!(matches!(err, AgentClientError::Protocol(m) if m == "boom"));
}

#[tokio::test]
async fn announces_session_id_only_for_fresh_conversations() {
    let fake = FakeAgentClient::new();
    fake.set_announced_session_id("native-123");
    fake.push_response("ok");

    let seen = Arc::new(PMutex::new(None));
    let sink = Arc::clone(&seen);
    let mut callbacks = RunCallbacks::default();
    callbacks.on_session_id = Some(Arc::new(move |id: &str| *sink.lock() = Some(id.to_string())));

    fake.run(options("hi", callbacks)).await.unwrap();
    assert_eq!(*seen.lock(), Some("native-123".to_string()));
}

#[tokio::test]
async fn resumed_conversation_does_not_re_announce_session_id() {
    let fake = FakeAgentClient::new();
    fake.set_announced_session_id("native-123");
    fake.push_response("ok");

    let seen = Arc::new(PMutex::new(None));
    let sink = Arc::clone(&seen);
    let mut callbacks = RunCallbacks::default();
    callbacks.on_session_id = Some(Arc::new(move |id: &str| *sink.lock() = Some(id.to_string())));

    let mut opts = options("hi", callbacks);
    opts.native_session_id = Some("existing".to_string());
    fake.run(opts).await.unwrap();
    assert_eq!(*seen.lock(), None);
}

#[tokio::test]
async fn records_every_call() {
    let fake = FakeAgentClient::new();
    fake.push_response("a");
    fake.push_response("b");
    fake.run(options("first", RunCallbacks::default())).await.unwrap();
    fake.run(options("second", RunCallbacks::default())).await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].prompt, "first");
    assert_eq!(calls[1].prompt, "second");
}
