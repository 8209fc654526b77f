//! Error types for readaloud

use std::io;
use thiserror::Error;

/// Main error type for readaloud
///
/// The speech variants keep the taxonomy the selector needs for recovery:
/// a missing engine is terminal, synthesis/network/permission faults are
/// retried against the remaining providers, and only exhaustion of the
/// whole provider table reaches the caller.
#[derive(Error, Debug)]
pub enum ReadAloudError {
    #[error("Speech engine unavailable: {0}")]
    CapabilityAbsent(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Speech backend network error: {0}")]
    Network(String),

    #[error("Speech not permitted: {0}")]
    NotAllowed(String),

    #[error("All speech providers exhausted: {0}")]
    Exhausted(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for readaloud operations
pub type Result<T> = std::result::Result<T, ReadAloudError>;

impl From<String> for ReadAloudError {
    fn from(s: String) -> Self {
        ReadAloudError::Other(s)
    }
}

impl From<&str> for ReadAloudError {
    fn from(s: &str) -> Self {
        ReadAloudError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ReadAloudError {
    fn from(e: serde_json::Error) -> Self {
        ReadAloudError::Store(format!("JSON error: {}", e))
    }
}
