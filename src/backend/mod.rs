// src/backend/mod.rs — Chat backend client layer

pub mod decode;
pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::UploadFile;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::chat::types::{ChatMode, Message};
use crate::infra::errors::BotifyError;

/// Text fragments of a streamed reply, in arrival order. Ends with the body.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, BotifyError>> + Send>>;

/// Shown when a session exists but the backend holds no transcript for it.
pub const EMPTY_HISTORY_TEXT: &str =
    "No messages found for this chat session, how can I help you?";

/// Shown when the history request is answered with a non-success status.
pub const MISSING_HISTORY_TEXT: &str =
    "No messages found for this chat session, try creating a new chat";

pub const HISTORY_NOTICE_ID: &str = "init-1";

/// Operations the chat store needs from the backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Mint a new session id.
    async fn create_session(&self) -> Result<String, BotifyError>;

    /// Transcript of a session. A missing transcript or a non-success status
    /// yields a single synthetic bot notice instead of an error.
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BotifyError>;

    async fn send_message(
        &self,
        session_id: &str,
        text: &str,
        mode: ChatMode,
    ) -> Result<TextStream, BotifyError>;

    /// Returns whether the backend accepted the document.
    async fn upload_document(
        &self,
        session_id: &str,
        file: &UploadFile,
    ) -> Result<bool, BotifyError>;

    /// Returns whether the alert was accepted. Transport failures are errors.
    async fn trigger_emergency(&self, location: Option<&str>) -> Result<bool, BotifyError>;
}
