use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::core::message::ChatMessage;
use crate::core::session::ChatSession;

/// Shared view state for the chat surface. The session manager and the
/// streaming path only talk to this trait, never to a concrete store.
///
/// All mutation happens from one task at a time, so implementations only
/// need interior mutability, not a locking protocol.
pub trait SessionStore: Send + Sync {
    fn current_session(&self) -> Option<String>;
    fn set_current_session(&self, id: Option<String>);

    fn sessions(&self) -> Vec<ChatSession>;
    fn set_sessions(&self, sessions: Vec<ChatSession>);
    fn add_session(&self, session: ChatSession);
    fn remove_session(&self, id: &str);

    fn messages(&self) -> Vec<ChatMessage>;
    fn set_messages(&self, messages: Vec<ChatMessage>);
    fn add_message(&self, message: ChatMessage);
    /// Replace a message's content wholesale. Unknown ids are ignored:
    /// the message may belong to a list that was swapped out underneath
    /// an abandoned stream.
    fn set_message_content(&self, id: &str, content: String);
    fn clear_messages(&self);

    fn title(&self) -> String;
    fn set_title(&self, title: String);

    fn is_streaming(&self) -> bool;
    fn set_streaming(&self, streaming: bool);

    fn is_loading(&self) -> bool;
    fn set_loading(&self, loading: bool);

    /// Current stream generation. A stream captures the value returned by
    /// `begin_stream_generation` at start and suppresses publishes once the
    /// store has moved on to a newer generation.
    fn stream_generation(&self) -> u64;
    fn begin_stream_generation(&self) -> u64;
}

pub type ContentObserver = Box<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Default)]
struct StoreState {
    current_session: Option<String>,
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
    title: String,
    streaming: bool,
    loading: bool,
}

/// In-process store implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    generation: AtomicU64,
    observer: RwLock<Option<ContentObserver>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with (message id, full content) on every
    /// content publish. The CLI uses this to render deltas as they arrive.
    pub fn set_content_observer(&self, observer: ContentObserver) {
        *self.observer.write().unwrap() = Some(observer);
    }
}

impl SessionStore for MemoryStore {
    fn current_session(&self) -> Option<String> {
        self.state.read().unwrap().current_session.clone()
    }

    fn set_current_session(&self, id: Option<String>) {
        self.state.write().unwrap().current_session = id;
    }

    fn sessions(&self) -> Vec<ChatSession> {
        self.state.read().unwrap().sessions.clone()
    }

    fn set_sessions(&self, sessions: Vec<ChatSession>) {
        self.state.write().unwrap().sessions = sessions;
    }

    fn add_session(&self, session: ChatSession) {
        self.state.write().unwrap().sessions.push(session);
    }

    fn remove_session(&self, id: &str) {
        self.state.write().unwrap().sessions.retain(|s| s.id != id);
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().unwrap().messages.clone()
    }

    fn set_messages(&self, messages: Vec<ChatMessage>) {
        self.state.write().unwrap().messages = messages;
    }

    fn add_message(&self, message: ChatMessage) {
        self.state.write().unwrap().messages.push(message);
    }

    fn set_message_content(&self, id: &str, content: String) {
        {
            let mut state = self.state.write().unwrap();
            match state.messages.iter_mut().find(|m| m.id == id) {
                Some(msg) => msg.content = content.clone(),
                None => return,
            }
        }
        if let Some(observer) = self.observer.read().unwrap().as_ref() {
            observer(id, &content);
        }
    }

    fn clear_messages(&self) {
        self.state.write().unwrap().messages.clear();
    }

    fn title(&self) -> String {
        self.state.read().unwrap().title.clone()
    }

    fn set_title(&self, title: String) {
        self.state.write().unwrap().title = title;
    }

    fn is_streaming(&self) -> bool {
        self.state.read().unwrap().streaming
    }

    fn set_streaming(&self, streaming: bool) {
        self.state.write().unwrap().streaming = streaming;
    }

    fn is_loading(&self) -> bool {
        self.state.read().unwrap().loading
    }

    fn set_loading(&self, loading: bool) {
        self.state.write().unwrap().loading = loading;
    }

    fn stream_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn begin_stream_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}
