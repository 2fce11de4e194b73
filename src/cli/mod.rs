// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod commands;
pub mod home;
pub mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "botify", about = "Chat with the Botify assistant", version)]
pub struct Cli {
    /// Backend base URL (overrides BOTIFY_BACKEND_URL and config.toml)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Keep sessions in memory only (nothing is saved)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the welcome screen
    Home,
    /// Interactive chat (default)
    Chat,
    /// Start a new chat and make it current
    New,
    /// List saved chats, newest first
    Chats,
    /// Make a saved chat current and print its transcript
    Switch {
        /// Session id, or a unique prefix of a saved one
        id: String,
    },
    /// Send one message and stream the reply to stdout
    Send {
        /// Use health mode for this message
        #[arg(long)]
        health: bool,
        /// Message text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Upload a PDF to the current chat
    Upload {
        /// Path to the PDF
        path: PathBuf,
    },
    /// Send an emergency SOS alert
    Sos {
        /// Where you are (defaults to "Unknown")
        #[arg(long)]
        location: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
