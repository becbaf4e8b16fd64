use super::config::*;
use super::message::*;
use super::session::*;
use super::store::*;
use chrono::{TimeZone, Utc};

#[test]
fn test_user_message_creation() {
    let msg = ChatMessage::new_user("session-1".into(), "Hello world".into());
    assert_eq!(msg.sender, Sender::User);
    assert_eq!(msg.session_id, "session-1");
    assert_eq!(msg.content, "Hello world");
    assert!(!msg.id.is_empty());
}

#[test]
fn test_assistant_placeholder_is_empty() {
    let msg = ChatMessage::new_assistant("session-1".into());
    assert_eq!(msg.sender, Sender::Assistant);
    assert!(msg.content.is_empty());
}

#[test]
fn test_sender_serialization() {
    let json = serde_json::to_string(&Sender::Assistant).unwrap();
    assert_eq!(json, "\"assistant\"");

    let deserialized: Sender = serde_json::from_str("\"user\"").unwrap();
    assert_eq!(deserialized, Sender::User);
}

#[test]
fn test_message_wire_field_names() {
    let json = r#"{
        "message_id": "m1",
        "session_id": "s1",
        "content": "hi",
        "sender": "user",
        "timestamp": "2025-03-01T12:00:00Z"
    }"#;
    let msg: ChatMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.id, "m1");
    assert_eq!(msg.sender, Sender::User);
}

#[test]
fn test_session_creation() {
    let session = ChatSession::new("Test session".into());
    assert!(!session.id.is_empty());
    assert_eq!(session.title, "Test session");
    assert!(session.updated_at.is_some());
}

#[test]
fn test_last_activity_falls_back_to_created_at() {
    let created = Utc.timestamp_opt(1000, 0).unwrap();
    let session = ChatSession {
        id: "s1".into(),
        title: "t".into(),
        created_at: created,
        updated_at: None,
    };
    assert_eq!(session.last_activity(), created);

    let mut touched = session.clone();
    touched.touch();
    assert!(touched.last_activity() > created);
}

#[test]
fn test_session_wire_omits_updated_at() {
    let json = r#"{
        "session_id": "s1",
        "title": "untitled",
        "created_at": "2025-03-01T12:00:00Z"
    }"#;
    let session: ChatSession = serde_json::from_str(json).unwrap();
    assert_eq!(session.id, "s1");
    assert!(session.updated_at.is_none());
}

#[test]
fn test_config_defaults() {
    let config = ChatConfig::default();
    assert_eq!(config.base_url, "http://localhost:8000");
    assert!(config.api_token.is_none());
    assert!(!config.debug);
    assert!(!config.has_token());
}

#[test]
fn test_config_has_token() {
    let mut config = ChatConfig::default();
    config.api_token = Some("abc".into());
    assert!(config.has_token());

    config.api_token = Some("".into());
    assert!(!config.has_token());
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"base_url": "https://chat.example.com", "api_token": "tok"}"#,
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.base_url, "https://chat.example.com");
    assert_eq!(config.api_token.as_deref(), Some("tok"));
    assert!(!config.debug);
}

#[test]
fn test_config_file_rejects_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(load_config_file(&path).is_err());
}

#[test]
fn test_store_message_content_replacement() {
    let store = MemoryStore::new();
    let msg = ChatMessage::new_assistant("s1".into());
    let id = msg.id.clone();
    store.add_message(msg);

    store.set_message_content(&id, "partial".into());
    store.set_message_content(&id, "partial, then full".into());

    assert_eq!(store.messages()[0].content, "partial, then full");
}

#[test]
fn test_store_ignores_unknown_message_id() {
    let store = MemoryStore::new();
    store.set_message_content("nope", "ghost".into());
    assert!(store.messages().is_empty());
}

#[test]
fn test_store_generation_monotonic() {
    let store = MemoryStore::new();
    let first = store.begin_stream_generation();
    let second = store.begin_stream_generation();
    assert!(second > first);
    assert_eq!(store.stream_generation(), second);
}

#[test]
fn test_store_observer_sees_publishes() {
    use std::sync::{Arc, Mutex};

    let store = MemoryStore::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.set_content_observer(Box::new(move |_, content| {
        sink.lock().unwrap().push(content.to_string());
    }));

    let msg = ChatMessage::new_assistant("s1".into());
    let id = msg.id.clone();
    store.add_message(msg);
    store.set_message_content(&id, "a".into());
    store.set_message_content(&id, "ab".into());

    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "ab".to_string()]);
}
