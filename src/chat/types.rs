// src/chat/types.rs — Chat domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

/// Lifecycle of a message's text. Only streamed bot replies are ever `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    /// Placeholder whose text is still being streamed in.
    Pending,
    #[default]
    Complete,
    /// The stream failed or was cancelled; the text is whatever arrived.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub state: MessageState,
}

impl Message {
    pub fn new(id: impl Into<String>, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            state: MessageState::Complete,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), text, Sender::Bot)
    }

    /// Empty bot message that a streamed reply fills in.
    pub fn placeholder() -> Self {
        Self {
            state: MessageState::Pending,
            ..Self::bot("")
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == MessageState::Pending
    }
}

/// Backend behavior selector sent with every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChatMode {
    #[default]
    #[serde(rename = "general")]
    General,
    #[serde(rename = "medgamma")]
    MedGamma,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::General => "general",
            ChatMode::MedGamma => "medgamma",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ChatMode::General => ChatMode::MedGamma,
            ChatMode::MedGamma => ChatMode::General,
        }
    }

    pub fn is_med_gamma(&self) -> bool {
        *self == ChatMode::MedGamma
    }

    /// Header title for the chat view.
    pub fn title(&self) -> &'static str {
        match self {
            ChatMode::General => "Chat Assistant",
            ChatMode::MedGamma => "MedGamma Health",
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
