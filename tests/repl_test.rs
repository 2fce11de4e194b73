// tests/repl_test.rs — Integration test: Ctrl-C handling in the chat REPL

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};

use botify::backend::{ChatBackend, TextStream, UploadFile};
use botify::chat::{ChatMode, ChatStore, Message, MessageState, Sender};
use botify::cli::chat::{chat_loop, header_line, Interrupts};
use botify::infra::errors::BotifyError;
use botify::storage::{MemoryStorage, CURRENT_SESSION_KEY};

/// Streams one chunk, then stalls until the reader gives up.
struct StallingBackend {
    first_chunk_read: Arc<Notify>,
}

#[async_trait]
impl ChatBackend for StallingBackend {
    async fn create_session(&self) -> Result<String, BotifyError> {
        Ok("fresh".into())
    }

    async fn fetch_history(&self, _session_id: &str) -> Result<Vec<Message>, BotifyError> {
        Ok(Vec::new())
    }

    async fn send_message(
        &self,
        _session_id: &str,
        _text: &str,
        _mode: ChatMode,
    ) -> Result<TextStream, BotifyError> {
        let first_chunk_read = self.first_chunk_read.clone();
        Ok(Box::pin(async_stream::stream! {
            yield Ok("Drink ".to_string());
            first_chunk_read.notify_one();
            std::future::pending::<()>().await;
        }))
    }

    async fn upload_document(
        &self,
        _session_id: &str,
        _file: &UploadFile,
    ) -> Result<bool, BotifyError> {
        Ok(true)
    }

    async fn trigger_emergency(&self, _location: Option<&str>) -> Result<bool, BotifyError> {
        Ok(true)
    }
}

fn make_store(first_chunk_read: Arc<Notify>) -> ChatStore {
    let storage = MemoryStorage::new().with_item(CURRENT_SESSION_KEY, "s1");
    ChatStore::new(
        Arc::new(StallingBackend { first_chunk_read }),
        Box::new(storage),
    )
}

/// Lines typed at the prompt, fed from the test.
fn scripted_lines() -> (
    mpsc::UnboundedSender<String>,
    impl FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = Option<String>>>>,
) {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let rx = Arc::new(Mutex::new(rx));
    let next_line = move || {
        let rx = rx.clone();
        Box::pin(async move { rx.lock().await.recv().await })
            as std::pin::Pin<Box<dyn std::future::Future<Output = Option<String>>>>
    };
    (tx, next_line)
}

#[tokio::test]
async fn test_ctrl_c_at_prompt_ends_chat() {
    let mut store = make_store(Arc::new(Notify::new()));
    let (_lines, next_line) = scripted_lines();
    let (presses, mut interrupts) = Interrupts::channel();

    presses.send(()).unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        chat_loop(&mut store, next_line, &mut interrupts),
    )
    .await
    .expect("chat should end on Ctrl-C");

    assert!(store.messages().is_empty());
}

#[tokio::test]
async fn test_first_ctrl_c_stops_reply_second_ends_chat() {
    let started = Arc::new(Notify::new());
    let mut store = make_store(started.clone());
    let (lines, next_line) = scripted_lines();
    let (presses, mut interrupts) = Interrupts::channel();

    let driver = async {
        lines.send("I feel dizzy".to_string()).unwrap();
        started.notified().await;
        // Stops the stalled reply.
        presses.send(()).unwrap();
        // Back at the prompt: leaves.
        presses.send(()).unwrap();
    };

    let ((), ()) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(chat_loop(&mut store, next_line, &mut interrupts), driver) },
    )
    .await
    .expect("chat should end on the second Ctrl-C");

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].text, "Drink ");
    assert_eq!(messages[1].state, MessageState::Interrupted);
}

#[tokio::test]
async fn test_slash_quit_ends_chat_without_interrupts() {
    let mut store = make_store(Arc::new(Notify::new()));
    let (lines, next_line) = scripted_lines();
    let (_presses, mut interrupts) = Interrupts::channel();

    lines.send("/health".to_string()).unwrap();
    lines.send("/quit".to_string()).unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        chat_loop(&mut store, next_line, &mut interrupts),
    )
    .await
    .expect("chat should end on /quit");

    assert_eq!(store.mode(), ChatMode::MedGamma);
}

#[tokio::test]
async fn test_header_reports_status_after_loading() {
    let mut store = make_store(Arc::new(Notify::new()));
    let (lines, next_line) = scripted_lines();
    let (_presses, mut interrupts) = Interrupts::channel();

    lines.send("/quit".to_string()).unwrap();
    chat_loop(&mut store, next_line, &mut interrupts).await;

    assert!(!store.is_loading());
    let header = header_line(&store);
    assert!(header.starts_with("botify v"), "got {header}");
    assert!(header.ends_with("| Chat Assistant | Online"), "got {header}");
}
