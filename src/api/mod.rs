mod backend;
mod codec;

pub use backend::HttpBackend;
pub use codec::{split_fragments, Utf8StreamDecoder};


use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;

use crate::core::config::ChatConfig;
use crate::core::error::{ApiError, StreamError};
use crate::core::message::ChatMessage;
use crate::core::session::ChatSession;

#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// One delimiter-separated unit of decoded text.
    Fragment { text: String },
    /// Terminal read failure; no further events follow.
    Error { error: StreamError },
}

pub type ChatEventStream = Pin<Box<dyn futures_core::Stream<Item = StreamEvent> + Send>>;

/// Everything the session backend exposes. The manager only depends on
/// this trait so tests can swap in a scripted backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn create_session(&self) -> Result<ChatSession, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, ApiError>;

    async fn chat_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ApiError>;

    /// Returns the title as stored by the backend.
    async fn update_title(&self, session_id: &str, title: &str) -> Result<String, ApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;

    /// Open a streaming chat response. Fragments arrive already decoded,
    /// split, and trimmed.
    async fn stream_chat(&self, session_id: &str, msg: &str)
        -> Result<ChatEventStream, StreamError>;
}

pub fn create_backend(config: &ChatConfig) -> Arc<dyn ChatBackend> {
    Arc::new(HttpBackend::new(
        config.base_url.clone(),
        config.api_token.clone(),
    ))
}
