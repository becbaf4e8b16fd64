use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::api::codec::{split_fragments, Utf8StreamDecoder};
use crate::api::{ChatBackend, ChatEventStream, StreamEvent};
use crate::core::error::{ApiError, StreamError};
use crate::core::message::ChatMessage;
use crate::core::session::ChatSession;

/// reqwest-backed client for the session backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Deserialize)]
struct TitleResponse {
    title: String,
}

impl HttpBackend {
    pub fn new(base_url: String, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.api_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        Self::check(resp).await
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn create_session(&self) -> Result<ChatSession, ApiError> {
        let resp = self.send(self.request(Method::POST, "/sessions")).await?;
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, ApiError> {
        let resp = self.send(self.request(Method::GET, "/sessions")).await?;
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn chat_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let resp = self
            .send(self.request(Method::GET, &format!("/sessions/{session_id}/history")))
            .await?;
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn update_title(&self, session_id: &str, title: &str) -> Result<String, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/sessions/{session_id}/title"))
            .json(&serde_json::json!({ "title": title }));
        let resp = self.send(req).await?;
        let body: TitleResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.title)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/sessions/{session_id}")))
            .await?;
        Ok(())
    }

    async fn stream_chat(
        &self,
        session_id: &str,
        msg: &str,
    ) -> Result<ChatEventStream, StreamError> {
        let resp = self
            .request(Method::POST, "/sessions/simple-stream")
            .json(&serde_json::json!({ "session_id": session_id, "msg": msg }))
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "stream request rejected");
            return Err(StreamError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            use tokio_stream::StreamExt;

            let mut byte_stream = Box::pin(byte_stream);
            let mut decoder = Utf8StreamDecoder::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield StreamEvent::Error {
                            error: StreamError::Read(e.to_string()),
                        };
                        break;
                    }
                };

                let text = decoder.decode(&chunk);
                for fragment in split_fragments(&text) {
                    yield StreamEvent::Fragment { text: fragment };
                }
            }

            if decoder.has_pending() {
                tracing::warn!("stream ended mid-character, dropping partial bytes");
            }
        };

        Ok(Box::pin(stream))
    }
}
