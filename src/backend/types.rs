// src/backend/types.rs — Wire types for the chat backend HTTP contract

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chat::types::{ChatMode, Message, MessageState, Sender};
use crate::infra::errors::BotifyError;

/// `POST /chat/new` response.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionResponse {
    pub uuid: String,
}

/// `GET /chat/{id}` response. `messages` may be absent. Entries are kept raw
/// so one unreadable entry does not cost the rest of the transcript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Option<Vec<serde_json::Value>>,
}

impl HistoryResponse {
    /// Decoded transcript, or `None` when the backend sent no `messages`.
    pub fn into_messages(self) -> Option<Vec<Message>> {
        let entries = self.messages?;
        Some(
            entries
                .into_iter()
                .filter_map(|raw| match serde_json::from_value::<WireMessage>(raw) {
                    Ok(wire) => Some(wire.into_message()),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable history entry: {}", e);
                        None
                    }
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub timestamp: serde_json::Value,
}

impl WireMessage {
    pub fn into_message(self) -> Message {
        let id = match self.id {
            Some(WireId::Text(s)) => s,
            Some(WireId::Number(n)) => n.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let timestamp = parse_timestamp(&self.timestamp).unwrap_or_else(|| {
            tracing::warn!("Unreadable timestamp {} on message {}", self.timestamp, id);
            Utc::now()
        });
        let sender = match self.sender.as_deref() {
            Some("user") => Sender::User,
            Some("bot") | Some("assistant") => Sender::Bot,
            other => {
                tracing::warn!("Unknown sender {:?} on message {}, shown as bot", other, id);
                Sender::Bot
            }
        };
        Message {
            id,
            text: self.text.unwrap_or_default(),
            sender,
            timestamp,
            state: MessageState::Complete,
        }
    }
}

/// Accepts RFC 3339, naive ISO-8601 (taken as UTC) or epoch milliseconds.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        serde_json::Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(ms).single()
        }
        _ => None,
    }
}

/// `POST /chat/{id}/message` body.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageBody<'a> {
    pub message: &'a str,
    pub mode: ChatMode,
}

/// `POST /emergency/trigger` body.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyBody<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub location: &'a str,
}

impl<'a> EmergencyBody<'a> {
    pub fn sos(location: Option<&'a str>) -> Self {
        Self {
            kind: "sos",
            location: location.unwrap_or("Unknown"),
        }
    }
}

pub const PDF_MIME: &str = "application/pdf";

/// A document picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_MIME
    }

    /// Read a file from disk, accepting only PDFs (by extension or `%PDF-` header).
    pub fn pdf_from_path(path: &Path) -> Result<Self, BotifyError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)?;

        let has_pdf_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !has_pdf_ext && !bytes.starts_with(b"%PDF-") {
            return Err(BotifyError::UnsupportedFile { name });
        }

        Ok(Self::new(name, PDF_MIME, bytes))
    }
}
