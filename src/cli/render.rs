// src/cli/render.rs — Terminal renderer for chat store events
//
// Conversation text goes to stdout; status lines and alerts go to stderr.

use std::io::Write;
use std::sync::Mutex;

use crate::chat::{Message, MessageState, Sender, StoreEvent};

const USER_PREFIX: &str = "you> ";
const BOT_PREFIX: &str = "bot> ";

/// Sidebar label for a session: `Chat` plus the first 8 characters of its id.
pub fn chat_label(session_id: &str) -> String {
    let short: String = session_id.chars().take(8).collect();
    format!("Chat {short}")
}

pub fn format_message(message: &Message) -> String {
    let prefix = match message.sender {
        Sender::User => USER_PREFIX,
        Sender::Bot => BOT_PREFIX,
    };
    format!("{}{}", prefix, message.text)
}

/// The streamed reply currently being printed: its id and how many bytes of
/// its text are already on screen.
#[derive(Debug, Default)]
struct LiveReply {
    id: Option<String>,
    printed: usize,
}

impl LiveReply {
    /// Portion of `text` not yet printed for message `id`.
    fn unseen<'a>(&mut self, id: &str, text: &'a str) -> Option<&'a str> {
        if self.id.as_deref() != Some(id) {
            return None;
        }
        if text.len() < self.printed || !text.is_char_boundary(self.printed) {
            return None;
        }
        let delta = &text[self.printed..];
        self.printed = text.len();
        Some(delta)
    }
}

/// Build a store observer that draws the chat view on the terminal.
pub fn terminal_renderer() -> impl Fn(&StoreEvent) + Send + 'static {
    let live = Mutex::new(LiveReply::default());

    move |event: &StoreEvent| {
        let mut stdout = std::io::stdout();
        match event {
            StoreEvent::LoadingChanged(true) => eprintln!("[status] Connecting..."),
            StoreEvent::LoadingChanged(false) => eprintln!("[status] Online"),
            StoreEvent::UploadingChanged(true) => eprintln!("[upload] Uploading..."),
            StoreEvent::UploadingChanged(false) => {}
            StoreEvent::MessagesReplaced(messages) => {
                for m in messages {
                    println!("{}", format_message(m));
                }
            }
            StoreEvent::MessageAppended(m) => match (m.sender, m.state) {
                (Sender::Bot, MessageState::Pending) => {
                    print!("{BOT_PREFIX}");
                    let _ = stdout.flush();
                    if let Ok(mut live) = live.lock() {
                        live.id = Some(m.id.clone());
                        live.printed = 0;
                    }
                }
                // The user just typed it.
                (Sender::User, _) => {}
                _ => println!("{}", format_message(m)),
            },
            StoreEvent::MessageUpdated { id, text } => {
                if let Ok(mut live) = live.lock() {
                    if let Some(delta) = live.unseen(id, text) {
                        print!("{delta}");
                        let _ = stdout.flush();
                    }
                }
            }
            StoreEvent::MessageFinished { id, state } => {
                if let Ok(mut live) = live.lock() {
                    if live.id.as_deref() == Some(id.as_str()) {
                        println!();
                        *live = LiveReply::default();
                    }
                }
                if *state == MessageState::Interrupted {
                    eprintln!("[reply interrupted]");
                }
            }
            StoreEvent::SessionChanged(id) => eprintln!("[chat] {}", chat_label(id)),
            StoreEvent::SessionsChanged(_) => {}
            StoreEvent::ModeChanged(mode) => eprintln!("[mode] {}", mode.title()),
            StoreEvent::Notice(notice) => eprintln!("[alert] {}", notice.text()),
        }
    }
}
