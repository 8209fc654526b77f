//! Clipboard integration
//!
//! The last-resort speech provider copies the text for the user to paste
//! into an external reading service. Access goes through [`ClipboardSink`]
//! so tests run without a display server.

use crate::{ReadAloudError, Result};
use arboard::Clipboard;
use log::debug;
use std::sync::{Arc, Mutex};

/// Write-side clipboard capability
pub trait ClipboardSink {
    /// Whether the clipboard can be opened on this host
    fn probe(&mut self) -> bool;

    /// Copy text to the clipboard
    fn copy_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via arboard
#[derive(Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    fn probe(&mut self) -> bool {
        Clipboard::new().is_ok()
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        debug!("Copying {} chars to clipboard", text.len());

        let mut clipboard = Clipboard::new()
            .map_err(|e| ReadAloudError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

        clipboard
            .set_text(text)
            .map_err(|e| ReadAloudError::Clipboard(format!("Failed to copy to clipboard: {}", e)))?;

        Ok(())
    }
}

/// In-memory clipboard for tests and headless hosts
///
/// Clones share the same backing buffer, so a test can keep a handle
/// while the provider owns the sink.
#[derive(Clone)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Vec<String>>>,
    available: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(Mutex::new(Vec::new())),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            contents: Arc::new(Mutex::new(Vec::new())),
            available: false,
        }
    }

    pub fn contents(&self) -> Vec<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn probe(&mut self) -> bool {
        self.available
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        if !self.available {
            return Err(ReadAloudError::Clipboard("clipboard unavailable".to_string()));
        }
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }
}
