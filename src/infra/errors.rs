// src/infra/errors.rs — Error types for Botify

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotifyError {
    // Backend errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected backend response: {0}")]
    Protocol(String),

    // User errors
    #[error("'{name}' is not a PDF file")]
    UnsupportedFile { name: String },

    // Infra
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotifyError {
    pub fn is_network(&self) -> bool {
        matches!(self, BotifyError::Network(_))
    }
}
