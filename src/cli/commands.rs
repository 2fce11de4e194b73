// src/cli/commands.rs — One-shot subcommands (new, chats, switch, send, upload, sos)

use std::path::Path;

use super::chat::{send_interruptible, Interrupts};
use super::render::chat_label;
use crate::backend::UploadFile;
use crate::chat::{ChatMode, ChatStore, MessageState, Notice};
use crate::infra::errors::BotifyError;

/// Resolve user input to a session id: exact match, then a unique prefix of a
/// saved session. Anything else is taken literally.
pub fn resolve_session(known: &[String], input: &str) -> String {
    if known.iter().any(|id| id == input) {
        return input.to_string();
    }
    let mut matches = known.iter().filter(|id| id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(only), None) => only.clone(),
        _ => input.to_string(),
    }
}

/// Sidebar: saved chats, newest first, the current one marked.
pub fn print_sessions(known: &[String], current: Option<&str>) {
    println!("History");
    if known.is_empty() {
        println!("  No history yet");
        return;
    }
    for id in known {
        let marker = if Some(id.as_str()) == current { "*" } else { " " };
        println!("  {} {}  Saved Session  ({})", marker, chat_label(id), id);
    }
}

/// Ask before sending an SOS. Any prompt failure counts as "no".
pub fn confirm_sos() -> bool {
    inquire::Confirm::new("ARE YOU SURE? This will trigger an EMERGENCY ALERT.")
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}

/// Read a file picked for upload; non-PDFs are refused before any request.
pub fn pick_pdf(path: &Path) -> Option<UploadFile> {
    match UploadFile::pdf_from_path(path) {
        Ok(file) => Some(file),
        Err(BotifyError::UnsupportedFile { .. }) => {
            eprintln!("[alert] {}", Notice::UnsupportedFile.text());
            None
        }
        Err(e) => {
            eprintln!("[error] {}: {}", path.display(), e);
            None
        }
    }
}

async fn ensure_session(store: &mut ChatStore) -> anyhow::Result<()> {
    if store.current_session().is_none() {
        store.create_new_chat().await;
    }
    if store.current_session().is_none() {
        anyhow::bail!("Could not start a chat session (is the backend running?)");
    }
    Ok(())
}

pub async fn run_new(mut store: ChatStore) -> anyhow::Result<()> {
    let before = store.current_session().map(str::to_string);
    store.create_new_chat().await;
    match store.current_session() {
        Some(id) if Some(id) != before.as_deref() => {
            println!("{id}");
            Ok(())
        }
        _ => anyhow::bail!("Failed to create a new chat"),
    }
}

pub fn run_chats(store: &ChatStore) -> anyhow::Result<()> {
    print_sessions(store.known_sessions(), store.current_session());
    Ok(())
}

pub async fn run_switch(mut store: ChatStore, input: &str) -> anyhow::Result<()> {
    let id = resolve_session(store.known_sessions(), input);
    store.switch_chat(&id).await;
    Ok(())
}

pub async fn run_send(mut store: ChatStore, text: &str, health: bool) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to send");
    }
    ensure_session(&mut store).await?;
    if health && store.mode() != ChatMode::MedGamma {
        store.toggle_med_gamma();
    }

    let mut interrupts = Interrupts::ctrl_c();
    send_interruptible(&mut store, text, &mut interrupts).await;

    match store.messages().last() {
        Some(reply) if reply.state == MessageState::Complete => Ok(()),
        _ => anyhow::bail!("No complete reply received"),
    }
}

pub async fn run_upload(mut store: ChatStore, path: &Path) -> anyhow::Result<()> {
    let Some(file) = pick_pdf(path) else {
        anyhow::bail!("Nothing uploaded");
    };
    ensure_session(&mut store).await?;
    if !store.upload_pdf(&file).await {
        anyhow::bail!("Upload of {} failed", file.name);
    }
    Ok(())
}

pub async fn run_sos(
    mut store: ChatStore,
    location: Option<&str>,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    if !skip_confirm && !confirm_sos() {
        eprintln!("SOS cancelled.");
        return Ok(());
    }
    if !store.trigger_emergency(location).await {
        anyhow::bail!("SOS was not delivered");
    }
    Ok(())
}
