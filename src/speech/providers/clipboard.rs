//! Clipboard fallback provider
//!
//! The universal last resort: copies the text to the clipboard and
//! points the user at an external reading service. Produces no audio, so
//! it acknowledges and ends each "utterance" immediately and attaches a
//! disclosure the selector surfaces through the guidance callback.

use super::SpeechProvider;
use crate::clipboard::ClipboardSink;
use crate::host::{EngineEvent, UtteranceRequest};
use crate::platform;
use crate::speech::guidance::Guidance;
use crate::speech::Voice;
use crate::Result;
use log::{debug, info};
use std::collections::VecDeque;

pub struct ClipboardProvider {
    sink: Box<dyn ClipboardSink>,
    reader_url: String,
    events: VecDeque<EngineEvent>,
}

impl ClipboardProvider {
    pub fn new(sink: Box<dyn ClipboardSink>, reader_url: String) -> Self {
        Self {
            sink,
            reader_url,
            events: VecDeque::new(),
        }
    }
}

impl SpeechProvider for ClipboardProvider {
    fn id(&self) -> &'static str {
        "clipboard"
    }

    fn probe(&mut self) -> bool {
        if self.sink.probe() {
            info!("✓ Clipboard fallback usable");
            return true;
        }
        if platform::is_headless() {
            debug!("Clipboard probe failed in a headless session");
        }
        info!("✗ Clipboard unavailable");
        false
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        self.sink.copy_text(&request.text)?;
        info!(
            "Copied {} chars for external reading at {}",
            request.text.len(),
            self.reader_url
        );

        // No audio to wait for: acknowledge and finish immediately
        self.events.push_back(EngineEvent::Started);
        self.events.push_back(EngineEvent::Ended);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.events.clear();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn voices(&mut self) -> Vec<Voice> {
        Vec::new()
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }

    fn guidance(&self) -> Option<Guidance> {
        Some(Guidance::copied_text(&self.reader_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;

    fn request(text: &str) -> UtteranceRequest {
        UtteranceRequest {
            text: text.to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }

    #[test]
    fn test_speak_copies_and_completes() {
        let clipboard = MemoryClipboard::new();
        let mut provider = ClipboardProvider::new(
            Box::new(clipboard.clone()),
            "https://example.org/read".to_string(),
        );

        assert!(provider.probe());
        provider.speak(&request("Hello world")).unwrap();

        assert_eq!(clipboard.contents(), vec!["Hello world".to_string()]);
        assert_eq!(provider.take_event(), Some(EngineEvent::Started));
        assert_eq!(provider.take_event(), Some(EngineEvent::Ended));
        assert_eq!(provider.take_event(), None);
    }

    #[test]
    fn test_probe_fails_without_clipboard() {
        let mut provider = ClipboardProvider::new(
            Box::new(MemoryClipboard::unavailable()),
            "https://example.org/read".to_string(),
        );
        assert!(!provider.probe());
    }

    #[test]
    fn test_guidance_links_external_reader() {
        let provider = ClipboardProvider::new(
            Box::new(MemoryClipboard::new()),
            "https://example.org/read".to_string(),
        );
        let guidance = provider.guidance().unwrap();
        assert_eq!(
            guidance.actions[0].url.as_deref(),
            Some("https://example.org/read")
        );
    }
}
