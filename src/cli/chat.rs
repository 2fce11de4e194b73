// src/cli/chat.rs — Interactive chat view (REPL)

use std::future::Future;
use std::path::Path;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::commands::{confirm_sos, pick_pdf, print_sessions, resolve_session};
use super::render::chat_label;
use crate::backend::UploadFile;
use crate::chat::ChatStore;

/// View-local state that is not part of the store.
#[derive(Default)]
struct ChatView {
    /// PDF picked with /attach, uploaded with the next submit.
    attachment: Option<UploadFile>,
}

/// Ctrl-C presses, delivered one at a time.
///
/// A single listener lives for the whole session. While a reply streams a
/// press cancels it; at any other point it ends the chat.
pub struct Interrupts {
    rx: mpsc::UnboundedReceiver<()>,
    watcher: Option<JoinHandle<()>>,
}

impl Interrupts {
    /// Listen for SIGINT until dropped.
    pub fn ctrl_c() -> Self {
        let (tx, mut interrupts) = Self::channel();
        interrupts.watcher = Some(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        }));
        interrupts
    }

    /// Interrupts fed by hand, e.g. from tests.
    pub fn channel() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx, watcher: None })
    }

    /// Next press. Pending forever once the source is gone.
    pub async fn recv(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for Interrupts {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Reads stdin lines on a helper thread, one line per request, so prompts
/// such as the SOS confirmation can use the terminal in between.
struct LineReader {
    requests: std::sync::mpsc::Sender<oneshot::Sender<Option<String>>>,
}

impl LineReader {
    fn spawn() -> Self {
        let (requests, rx) = std::sync::mpsc::channel::<oneshot::Sender<Option<String>>>();
        std::thread::spawn(move || {
            for reply in rx {
                if reply.send(read_input()).is_err() {
                    break;
                }
            }
        });
        Self { requests }
    }

    async fn next_line(&self) -> Option<String> {
        let (tx, rx) = oneshot::channel();
        self.requests.send(tx).ok()?;
        rx.await.ok().flatten()
    }
}

/// Run the interactive chat REPL.
pub async fn run_chat(mut store: ChatStore) -> anyhow::Result<()> {
    let reader = LineReader::spawn();
    let mut interrupts = Interrupts::ctrl_c();
    chat_loop(&mut store, || reader.next_line(), &mut interrupts).await;
    Ok(())
}

/// The REPL proper. Ends on EOF, `/quit`, or Ctrl-C outside a streaming reply.
pub async fn chat_loop<F, Fut>(
    store: &mut ChatStore,
    mut next_line: F,
    interrupts: &mut Interrupts,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<String>>,
{
    tokio::select! {
        _ = store.initialize() => {}
        _ = interrupts.recv() => return,
    }
    print_header(store);
    eprintln!("Type a message, /help for commands, /quit to leave.\n");

    let mut view = ChatView::default();

    loop {
        let input = tokio::select! {
            line = next_line() => line,
            _ = interrupts.recv() => {
                eprintln!();
                break;
            }
        };
        let Some(input) = input else { break };

        let line = input.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();

        // Handle quit
        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        // Handle slash commands
        if trimmed.starts_with('/') {
            tokio::select! {
                _ = handle_slash_command(trimmed, store, &mut view) => continue,
                _ = interrupts.recv() => break,
            }
        }

        if !submit(line, store, &mut view, interrupts).await {
            break;
        }
    }
}

/// Upload the pending attachment (if any), then send the text (if any).
/// Returns false when the user interrupted outside the streaming reply.
async fn submit(
    text: &str,
    store: &mut ChatStore,
    view: &mut ChatView,
    interrupts: &mut Interrupts,
) -> bool {
    if text.trim().is_empty() && view.attachment.is_none() {
        return true;
    }

    if let Some(file) = view.attachment.take() {
        tokio::select! {
            _ = store.upload_pdf(&file) => {}
            _ = interrupts.recv() => return false,
        }
    }

    if !text.trim().is_empty() {
        send_interruptible(store, text, interrupts).await;
    }
    true
}

/// Send `text`; a Ctrl-C while the reply streams stops it.
pub async fn send_interruptible(
    store: &mut ChatStore,
    text: &str,
    interrupts: &mut Interrupts,
) {
    let cancel = CancellationToken::new();
    let send = store.send_message_cancellable(text, &cancel);
    tokio::pin!(send);

    loop {
        tokio::select! {
            biased;
            _ = &mut send => break,
            _ = interrupts.recv() => cancel.cancel(),
        }
    }
}

fn print_header(store: &ChatStore) {
    eprintln!("{}", header_line(store));
}

/// `botify v<version> | <mode title> | <status>`.
pub fn header_line(store: &ChatStore) -> String {
    let status = if store.is_loading() {
        "Connecting..."
    } else {
        "Online"
    };
    format!(
        "botify v{} | {} | {}",
        env!("CARGO_PKG_VERSION"),
        store.mode().title(),
        status,
    )
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

async fn handle_slash_command(input: &str, store: &mut ChatStore, view: &mut ChatView) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/status" => {
            print_header(store);
            match store.current_session() {
                Some(id) => eprintln!("  Session: {} ({})", chat_label(id), id),
                None => eprintln!("  Session: none"),
            }
            eprintln!("  Mode: {}", store.mode());
            eprintln!("  Messages: {}", store.messages().len());
            eprintln!("  Saved chats: {}", store.known_sessions().len());
            if let Some(ref file) = view.attachment {
                eprintln!("  Attached: {}", file.name);
            }
        }

        "/new" => {
            store.create_new_chat().await;
        }

        "/chats" => {
            print_sessions(store.known_sessions(), store.current_session());
        }

        "/switch" => {
            if arg.is_empty() {
                eprintln!("  Usage: /switch <id or prefix>");
            } else {
                let id = resolve_session(store.known_sessions(), arg);
                store.switch_chat(&id).await;
            }
        }

        "/attach" => {
            if arg.is_empty() {
                eprintln!("  Usage: /attach <file.pdf>");
            } else if let Some(file) = pick_pdf(Path::new(arg)) {
                eprintln!("  Attached {} (sent with your next message)", file.name);
                view.attachment = Some(file);
            }
        }

        "/detach" => match view.attachment.take() {
            Some(file) => eprintln!("  Removed {}", file.name),
            None => eprintln!("  Nothing attached."),
        },

        "/health" => {
            store.toggle_med_gamma();
        }

        "/sos" => {
            if !store.mode().is_med_gamma() {
                eprintln!("  SOS is available in health mode. Use /health first.");
            } else if confirm_sos() {
                let location = if arg.is_empty() { None } else { Some(arg) };
                store.trigger_emergency(location).await;
            } else {
                eprintln!("  SOS cancelled.");
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /status              Show session status");
            eprintln!("  /new                 Start a new chat");
            eprintln!("  /chats               List saved chats");
            eprintln!("  /switch <id>         Switch to a saved chat (prefix ok)");
            eprintln!("  /attach <file.pdf>   Attach a PDF to your next message");
            eprintln!("  /detach              Remove the attachment");
            eprintln!("  /health              Toggle health mode");
            eprintln!("  /sos [location]      Emergency alert (health mode only)");
            eprintln!("  /help                Show this help");
            eprintln!("  /quit, quit, exit    Leave (Ctrl-C stops a streaming reply)");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}
