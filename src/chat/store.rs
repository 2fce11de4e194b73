// src/chat/store.rs — Chat session store
//
// Single owner of the conversation state. Every mutating operation takes
// `&mut self`, so operations run one at a time: a second send cannot start
// until the first one's stream has ended.

use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::events::{Notice, Observer, StoreEvent};
use super::types::{ChatMode, Message, MessageState, Sender};
use crate::backend::{ChatBackend, UploadFile};
use crate::storage::SessionStorage;

pub const NEW_CHAT_GREETING: &str =
    "Hello! New chat started. How can I help you regarding analysis or general questions?";
pub const NEW_CHAT_GREETING_ID: &str = "new-1";

/// Snapshot of everything the chat view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub current_session: Option<String>,
    /// Newest first.
    pub known_sessions: Vec<String>,
    pub is_loading: bool,
    pub is_uploading: bool,
    pub mode: ChatMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Loading,
    Ready,
}

pub struct ChatStore {
    state: ChatState,
    initialized: bool,
    backend: Arc<dyn ChatBackend>,
    storage: Box<dyn SessionStorage>,
    observer: Option<Observer>,
}

impl ChatStore {
    /// Build a store, restoring the current session and the known list from storage.
    pub fn new(backend: Arc<dyn ChatBackend>, storage: Box<dyn SessionStorage>) -> Self {
        let state = ChatState {
            current_session: storage.current_session(),
            known_sessions: storage.known_sessions(),
            ..ChatState::default()
        };
        Self {
            state,
            initialized: false,
            backend,
            storage,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl Fn(&StoreEvent) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn current_session(&self) -> Option<&str> {
        self.state.current_session.as_deref()
    }

    pub fn known_sessions(&self) -> &[String] {
        &self.state.known_sessions
    }

    pub fn mode(&self) -> ChatMode {
        self.state.mode
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn is_uploading(&self) -> bool {
        self.state.is_uploading
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    pub fn phase(&self) -> StorePhase {
        if self.state.is_loading {
            StorePhase::Loading
        } else if self.initialized {
            StorePhase::Ready
        } else {
            StorePhase::Uninitialized
        }
    }

    /// Load the current session, creating one when none is known.
    ///
    /// History is only fetched while the transcript is empty. Failures are
    /// logged and leave the transcript as it was.
    pub async fn initialize(&mut self) {
        let Some(session_id) = self.state.current_session.clone() else {
            self.create_new_chat().await;
            return;
        };

        if self.state.messages.is_empty() {
            self.set_loading(true);
            match self.backend.fetch_history(&session_id).await {
                Ok(messages) => {
                    tracing::debug!(
                        "Loaded {} message(s) for session {}",
                        messages.len(),
                        session_id
                    );
                    self.replace_messages(messages);
                }
                Err(e) => tracing::error!("Failed to fetch history: {}", e),
            }
            self.initialized = true;
            self.set_loading(false);
        } else {
            self.initialized = true;
        }
    }

    /// Ask the backend for a new session and make it current.
    ///
    /// On failure nothing but the loading flag changes.
    pub async fn create_new_chat(&mut self) {
        self.set_loading(true);

        match self.backend.create_session().await {
            Ok(session_id) => {
                let mut known = Vec::with_capacity(self.state.known_sessions.len() + 1);
                known.push(session_id.clone());
                known.extend(self.state.known_sessions.iter().cloned());

                if let Err(e) = self.storage.set_known_sessions(&known) {
                    tracing::warn!("Could not persist saved chats: {}", e);
                }
                if let Err(e) = self.storage.set_current_session(&session_id) {
                    tracing::warn!("Could not persist current chat: {}", e);
                }

                self.set_session(session_id.clone());
                self.state.known_sessions = known;
                self.emit(StoreEvent::SessionsChanged(self.state.known_sessions.clone()));
                self.replace_messages(vec![Message::new(
                    NEW_CHAT_GREETING_ID,
                    NEW_CHAT_GREETING,
                    Sender::Bot,
                )]);
                tracing::info!("New chat created with id {}", session_id);
            }
            Err(e) => tracing::error!("Failed to create new chat: {}", e),
        }

        self.initialized = true;
        self.set_loading(false);
    }

    /// Make `session_id` current and load its transcript.
    ///
    /// The old transcript is cleared before the fetch starts.
    pub async fn switch_chat(&mut self, session_id: &str) {
        if let Err(e) = self.storage.set_current_session(session_id) {
            tracing::warn!("Could not persist current chat: {}", e);
        }
        self.set_session(session_id.to_string());
        self.replace_messages(Vec::new());
        self.initialize().await;
    }

    /// Send `text` and stream the reply into a bot placeholder.
    pub async fn send_message(&mut self, text: &str) {
        self.send_message_cancellable(text, &CancellationToken::new())
            .await;
    }

    /// Like [`send_message`](Self::send_message), but stops reading the reply
    /// once `cancel` fires. The placeholder keeps whatever text had arrived.
    pub async fn send_message_cancellable(&mut self, text: &str, cancel: &CancellationToken) {
        if text.trim().is_empty() {
            return;
        }

        let placeholder = Message::placeholder();
        let bot_id = placeholder.id.clone();
        self.append_message(Message::user(text));
        self.append_message(placeholder);

        let Some(session_id) = self.state.current_session.clone() else {
            tracing::error!("Failed to send message: no current chat session");
            self.finish_message(&bot_id, MessageState::Interrupted);
            return;
        };

        let mut stream = match self
            .backend
            .send_message(&session_id, text, self.state.mode)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to send message: {}", e);
                self.finish_message(&bot_id, MessageState::Interrupted);
                return;
            }
        };

        let mut bot_text = String::new();
        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Reply cancelled after {} byte(s)", bot_text.len());
                    break MessageState::Interrupted;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    bot_text.push_str(&chunk);
                    self.update_message_text(&bot_id, &bot_text);
                }
                Some(Err(e)) => {
                    tracing::error!("Failed to send message: {}", e);
                    break MessageState::Interrupted;
                }
                None => break MessageState::Complete,
            }
        };

        self.finish_message(&bot_id, outcome);
    }

    /// Upload a document to the current session. Returns whether the
    /// confirmation message was appended.
    pub async fn upload_pdf(&mut self, file: &UploadFile) -> bool {
        self.set_uploading(true);

        let Some(session_id) = self.state.current_session.clone() else {
            tracing::error!("Failed to upload PDF: no current chat session");
            self.set_uploading(false);
            return false;
        };

        let uploaded = match self.backend.upload_document(&session_id, file).await {
            Ok(true) => {
                tracing::info!("Uploaded {} to session {}", file.name, session_id);
                self.append_message(Message::bot(format!(
                    "PDF \"{}\" uploaded successfully. You can now ask questions about it.",
                    file.name
                )));
                true
            }
            Ok(false) => {
                tracing::error!("Upload of {} was rejected", file.name);
                false
            }
            Err(e) => {
                tracing::error!("Failed to upload PDF: {}", e);
                false
            }
        };

        self.set_uploading(false);
        uploaded
    }

    pub fn toggle_med_gamma(&mut self) {
        self.state.mode = self.state.mode.toggled();
        self.emit(StoreEvent::ModeChanged(self.state.mode));
    }

    /// Send an SOS alert once. The outcome is always announced to the user.
    pub async fn trigger_emergency(&mut self, location: Option<&str>) -> bool {
        tracing::warn!("Triggering emergency alert");

        let sent = match self.backend.trigger_emergency(location).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::error!("Emergency trigger was rejected by the backend");
                false
            }
            Err(e) => {
                tracing::error!("Emergency trigger failed: {}", e);
                false
            }
        };

        let notice = if sent {
            Notice::SosSent
        } else {
            Notice::SosFailed
        };
        self.emit(StoreEvent::Notice(notice));
        sent
    }

    // ─── State mutation helpers ─────────────────────────────────

    fn emit(&self, event: StoreEvent) {
        if let Some(ref observer) = self.observer {
            observer(&event);
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
        self.emit(StoreEvent::LoadingChanged(loading));
    }

    fn set_uploading(&mut self, uploading: bool) {
        self.state.is_uploading = uploading;
        self.emit(StoreEvent::UploadingChanged(uploading));
    }

    fn set_session(&mut self, session_id: String) {
        self.state.current_session = Some(session_id.clone());
        self.emit(StoreEvent::SessionChanged(session_id));
    }

    fn replace_messages(&mut self, messages: Vec<Message>) {
        self.state.messages = messages;
        self.emit(StoreEvent::MessagesReplaced(self.state.messages.clone()));
    }

    fn append_message(&mut self, message: Message) {
        self.emit(StoreEvent::MessageAppended(message.clone()));
        self.state.messages.push(message);
    }

    fn update_message_text(&mut self, id: &str, text: &str) {
        if let Some(m) = self.state.messages.iter_mut().find(|m| m.id == id) {
            m.text = text.to_string();
            self.emit(StoreEvent::MessageUpdated {
                id: id.to_string(),
                text: text.to_string(),
            });
        }
    }

    fn finish_message(&mut self, id: &str, state: MessageState) {
        if let Some(m) = self.state.messages.iter_mut().find(|m| m.id == id) {
            m.state = state;
            self.emit(StoreEvent::MessageFinished {
                id: id.to_string(),
                state,
            });
        }
    }
}
