// src/backend/http.rs — reqwest implementation of the chat backend contract

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;

use super::decode::Utf8StreamDecoder;
use super::types::{
    EmergencyBody, HistoryResponse, NewSessionResponse, SendMessageBody, UploadFile,
};
use super::{ChatBackend, TextStream, EMPTY_HISTORY_TEXT, HISTORY_NOTICE_ID, MISSING_HISTORY_TEXT};
use crate::chat::types::{ChatMode, Message, Sender};
use crate::infra::errors::BotifyError;

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client whose connection setup is bounded. Response bodies are not.
    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, BotifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| BotifyError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as one path
    /// segment.
    fn url(&self, segments: &[&str]) -> Result<url::Url, BotifyError> {
        let mut url = url::Url::parse(&self.base_url).map_err(|e| {
            BotifyError::Config(format!("invalid backend URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BotifyError::Config(format!("backend URL {} cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn network(e: reqwest::Error) -> BotifyError {
    BotifyError::Network(e.to_string())
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn create_session(&self) -> Result<String, BotifyError> {
        let response = self
            .client
            .post(self.url(&["chat", "new"])?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;
        let parsed: NewSessionResponse = serde_json::from_str(&body)
            .map_err(|e| BotifyError::Protocol(format!("new session (HTTP {status}): {e}")))?;

        if parsed.uuid.trim().is_empty() {
            return Err(BotifyError::Protocol("new session: empty uuid".into()));
        }
        Ok(parsed.uuid)
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BotifyError> {
        let response = self
            .client
            .get(self.url(&["chat", session_id])?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Failed to fetch history for {}: HTTP {}", session_id, status);
            return Ok(vec![Message::new(
                HISTORY_NOTICE_ID,
                MISSING_HISTORY_TEXT,
                Sender::Bot,
            )]);
        }

        let body = response.text().await.map_err(network)?;
        let history: HistoryResponse = serde_json::from_str(&body)
            .map_err(|e| BotifyError::Protocol(format!("history for {session_id}: {e}")))?;

        match history.into_messages() {
            Some(messages) => Ok(messages),
            None => {
                tracing::warn!("No messages found for chat session {}", session_id);
                Ok(vec![Message::new(
                    HISTORY_NOTICE_ID,
                    EMPTY_HISTORY_TEXT,
                    Sender::Bot,
                )])
            }
        }
    }

    async fn send_message(
        &self,
        session_id: &str,
        text: &str,
        mode: ChatMode,
    ) -> Result<TextStream, BotifyError> {
        let response = self
            .client
            .post(self.url(&["chat", session_id, "message"])?)
            .json(&SendMessageBody {
                message: text,
                mode,
            })
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(BotifyError::Network(format!(
                "send message failed: HTTP {}",
                response.status()
            )));
        }

        // Plain-text body, read as it arrives.
        let byte_stream = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = Utf8StreamDecoder::new();
            let mut byte_stream = std::pin::pin!(byte_stream);
            let mut failed = false;

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        yield Err(BotifyError::Network(format!("Stream read error: {}", e)));
                        failed = true;
                        break;
                    }
                };

                let text = decoder.decode(&bytes);
                if !text.is_empty() {
                    yield Ok(text);
                }
            }

            if !failed {
                let tail = decoder.finish();
                if !tail.is_empty() {
                    yield Ok(tail);
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn upload_document(
        &self,
        session_id: &str,
        file: &UploadFile,
    ) -> Result<bool, BotifyError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                BotifyError::Other(anyhow::anyhow!(
                    "invalid content type '{}': {}",
                    file.content_type,
                    e
                ))
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(&["chat", session_id, "upload"])?)
            .multipart(form)
            .send()
            .await
            .map_err(network)?;

        Ok(response.status().is_success())
    }

    async fn trigger_emergency(&self, location: Option<&str>) -> Result<bool, BotifyError> {
        let response = self
            .client
            .post(self.url(&["emergency", "trigger"])?)
            .json(&EmergencyBody::sos(location))
            .send()
            .await
            .map_err(network)?;

        Ok(response.status().is_success())
    }
}
