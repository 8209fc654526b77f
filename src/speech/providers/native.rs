//! Native engine provider
//!
//! Wraps the shared host engine handle. Usable even when the voice list
//! never populates: speaking with no voice set falls back to the engine
//! default, which is the degraded-but-working path on bare installs.

use super::SpeechProvider;
use crate::host::{EngineEvent, SpeechHost, UtteranceRequest};
use crate::speech::voice::VoiceInventory;
use crate::speech::{SpeechSettings, Voice};
use crate::Result;
use log::{debug, info};
use std::sync::Arc;

pub struct NativeProvider {
    host: Arc<dyn SpeechHost>,
    inventory: VoiceInventory,

    /// Voice list cached by the first load; a legitimately empty list
    /// is cached too, so a voiceless engine is not re-polled on every
    /// utterance
    voices: Option<Vec<Voice>>,
}

impl NativeProvider {
    pub fn new(host: Arc<dyn SpeechHost>, settings: &SpeechSettings) -> Self {
        let inventory = VoiceInventory::new(Arc::clone(&host))
            .with_policy(settings.voice_load)
            .with_priming(settings.prime_on_empty);
        Self {
            host,
            inventory,
            voices: None,
        }
    }

    fn load_voices(&mut self) -> Vec<Voice> {
        match self.voices {
            Some(ref voices) => voices.clone(),
            None => {
                let voices = self.inventory.load();
                self.voices = Some(voices.clone());
                voices
            }
        }
    }
}

impl SpeechProvider for NativeProvider {
    fn id(&self) -> &'static str {
        "native"
    }

    fn probe(&mut self) -> bool {
        if !self.host.available() {
            info!("✗ Native engine absent on this host");
            return false;
        }

        let voices = self.load_voices();
        if voices.is_empty() {
            // Still usable: the engine default voice carries the session
            debug!("Native engine has no enumerable voices; relying on engine default");
        }

        // Liveness: the engine must accept a silent utterance
        let alive = self.host.speak(&UtteranceRequest::priming()).is_ok();
        if alive {
            let _ = self.host.cancel();
        }

        // Drop any events the probe itself produced
        while self.host.take_event().is_some() {}

        if alive {
            info!("✓ Native engine usable ({} voices)", voices.len());
        } else {
            info!("✗ Native engine rejected the probe utterance");
        }
        alive
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        self.host.speak(request)
    }

    fn stop(&mut self) -> Result<()> {
        self.host.cancel()
    }

    fn pause(&mut self) -> Result<()> {
        self.host.pause()
    }

    fn resume(&mut self) -> Result<()> {
        self.host.resume()
    }

    fn voices(&mut self) -> Vec<Voice> {
        self.load_voices()
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        self.host.take_event()
    }
}
