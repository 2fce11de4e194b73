// src/chat/events.rs — State updates published by the chat store

use super::types::{ChatMode, Message, MessageState};

/// One observable state change. Every streamed chunk produces its own
/// `MessageUpdated`; updates are never batched.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    LoadingChanged(bool),
    UploadingChanged(bool),
    /// The whole transcript was replaced (session switch, history load, new chat).
    MessagesReplaced(Vec<Message>),
    MessageAppended(Message),
    /// A streamed bot message's text now reads `text` (the full accumulated value).
    MessageUpdated { id: String, text: String },
    MessageFinished { id: String, state: MessageState },
    SessionChanged(String),
    SessionsChanged(Vec<String>),
    ModeChanged(ChatMode),
    Notice(Notice),
}

/// User-facing alerts. Everything else is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SosSent,
    SosFailed,
    UnsupportedFile,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::SosSent => "SOS Alert Sent! Emergency contacts have been notified.",
            Notice::SosFailed => "Failed to send SOS. Please call emergency services directly.",
            Notice::UnsupportedFile => "Please upload a PDF file.",
        }
    }
}

/// Callback receiving every store event.
pub type Observer = Box<dyn Fn(&StoreEvent) + Send>;
