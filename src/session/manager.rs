use std::sync::{Arc, Mutex};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::api::{ChatBackend, StreamEvent};
use crate::core::error::{ChatError, StreamError};
use crate::core::message::ChatMessage;
use crate::core::session::ChatSession;
use crate::core::store::SessionStore;

/// Fixed user-visible text written into an assistant message when its
/// stream fails for any reason.
pub const STREAM_ERROR_TEXT: &str = "[Error streaming response]";

const NEW_SESSION_TITLE: &str = "New session";

/// Orchestrates session CRUD and streamed assistant replies against the
/// backend, publishing every state change into the shared store.
pub struct SessionManager {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn SessionStore>,
    /// Cancel handle for the in-flight stream, if one is running.
    /// Replaced at stream start, fired on session switch.
    cancel: Mutex<Option<CancellationToken>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            cancel: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Stream an assistant reply for `text` into the current session.
    ///
    /// Side-effecting only: an empty assistant message is published up
    /// front, then its content is replaced with the full accumulated text
    /// after every fragment. All failures are logged and surfaced as
    /// [`STREAM_ERROR_TEXT`] on the message; nothing propagates to the
    /// caller. The streaming flag is cleared on every path unless a newer
    /// stream or selection has taken over in the meantime.
    pub async fn stream_message(&self, session_id: &str, text: &str) {
        let assistant = ChatMessage::new_assistant(session_id.to_string());
        let assistant_id = assistant.id.clone();
        self.store.add_message(assistant);

        self.store.set_streaming(true);
        let generation = self.store.begin_stream_generation();

        let cancel = CancellationToken::new();
        *self.cancel.lock().unwrap() = Some(cancel.clone());

        if let Err(e) = self
            .run_stream(&assistant_id, text, generation, &cancel)
            .await
        {
            tracing::error!(error = %e, "streaming response failed");
            self.store
                .set_message_content(&assistant_id, STREAM_ERROR_TEXT.to_string());
        }

        // a superseded stream must not clear the flag a newer one set
        if self.store.stream_generation() == generation {
            self.store.set_streaming(false);
        }
    }

    async fn run_stream(
        &self,
        assistant_id: &str,
        text: &str,
        generation: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StreamError> {
        let session_id = self
            .store
            .current_session()
            .ok_or(StreamError::MissingSession)?;

        let mut stream = self.backend.stream_chat(&session_id, text).await?;

        let mut full_text = String::new();
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = stream.next() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match event {
                StreamEvent::Fragment { text } => {
                    full_text.push_str(&text);
                    // publish the whole accumulator, not the delta, unless a
                    // newer stream or selection has superseded this one
                    if self.store.stream_generation() == generation {
                        self.store
                            .set_message_content(assistant_id, full_text.clone());
                    }
                }
                StreamEvent::Error { error } => return Err(error),
            }
        }

        Ok(())
    }

    /// Create a session, select it, and reset the view.
    pub async fn create_session(&self) -> Result<String, ChatError> {
        self.store.set_loading(true);
        let result = async {
            let session = self.backend.create_session().await?;
            let id = session.id.clone();

            self.store.add_session(session);
            self.store.set_current_session(Some(id.clone()));
            self.store.set_title(NEW_SESSION_TITLE.into());
            self.store.clear_messages();

            tracing::info!(session_id = %id, "created session");
            Ok::<_, ChatError>(id)
        }
        .await;
        self.store.set_loading(false);

        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to create session");
        }
        result
    }

    /// Rename a session on the backend and patch the local list.
    pub async fn rename_session(&self, session_id: &str, title: &str) -> Result<(), ChatError> {
        self.store.set_loading(true);
        let result = async {
            if self.store.current_session().is_none() {
                return Err(ChatError::NoActiveSession);
            }

            let new_title = self.backend.update_title(session_id, title).await?;
            self.store.set_title(new_title.clone());

            let sessions: Vec<ChatSession> = self
                .store
                .sessions()
                .into_iter()
                .map(|mut s| {
                    if s.id == session_id {
                        s.title = new_title.clone();
                        s.touch();
                    }
                    s
                })
                .collect();
            self.store.set_sessions(sessions);

            tracing::info!(session_id, title = %new_title, "renamed session");
            Ok(())
        }
        .await;
        self.store.set_loading(false);

        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to rename session");
        }
        result
    }

    /// Fetch one session's history and make it current.
    pub async fn load_history(&self, session_id: &str) -> Result<(), ChatError> {
        self.store.set_loading(true);
        let result = async {
            let history = self.backend.chat_history(session_id).await?;
            self.store.set_current_session(Some(session_id.to_string()));
            self.store.set_messages(history);

            if let Some(session) = self.store.sessions().iter().find(|s| s.id == session_id) {
                self.store.set_title(session.title.clone());
            }

            tracing::debug!(session_id, "loaded history");
            Ok(())
        }
        .await;
        self.store.set_loading(false);

        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to load history");
        }
        result
    }

    /// Delete a session. If it was current, fall back to the most
    /// recently active remaining session, or clear the view entirely.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ChatError> {
        self.store.set_loading(true);
        let result = async {
            self.backend.delete_session(session_id).await?;
            self.store.remove_session(session_id);

            if self.store.current_session().as_deref() == Some(session_id) {
                let remaining = self.store.sessions();
                match remaining.iter().max_by_key(|s| s.last_activity()) {
                    Some(latest) => {
                        let latest_id = latest.id.clone();
                        self.load_history(&latest_id).await?;
                    }
                    None => {
                        self.store.set_current_session(None);
                        self.store.clear_messages();
                        self.store.set_title(String::new());
                    }
                }
            }

            tracing::info!(session_id, "deleted session");
            Ok(())
        }
        .await;
        self.store.set_loading(false);

        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to delete session");
        }
        result
    }

    /// Refresh the session list. Auto-selects the most recently active
    /// session when nothing is selected yet. Never fails: any error
    /// degrades to an empty list.
    pub async fn refresh_sessions(&self) {
        self.store.set_loading(true);
        let result = async {
            let sessions = self.backend.list_sessions().await?;
            let count = sessions.len();
            self.store.set_sessions(sessions);

            if self.store.current_session().is_none() {
                let latest = self
                    .store
                    .sessions()
                    .into_iter()
                    .max_by_key(|s| s.last_activity());
                if let Some(latest) = latest {
                    self.load_history(&latest.id).await?;
                }
            }

            tracing::debug!(count, "refreshed sessions");
            Ok::<_, ChatError>(())
        }
        .await;
        self.store.set_loading(false);

        if let Err(e) = result {
            tracing::error!(error = %e, "failed to refresh sessions, clearing list");
            self.store.set_sessions(Vec::new());
        }
    }

    /// Switch to another session. Selecting the current session is a
    /// no-op. Any in-flight stream is cancelled and its pending publishes
    /// invalidated before the new history loads.
    pub async fn select_session(&self, session_id: &str) -> Result<(), ChatError> {
        if self.store.current_session().as_deref() == Some(session_id) {
            tracing::debug!(session_id, "session already selected");
            return Ok(());
        }

        if let Some(cancel) = self.cancel.lock().unwrap().take() {
            cancel.cancel();
        }
        self.store.begin_stream_generation();
        self.store.set_streaming(false);

        self.load_history(session_id).await
    }
}
