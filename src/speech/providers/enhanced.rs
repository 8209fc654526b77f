//! Premium-voice native provider
//!
//! The same host engine as the plain native provider, but its probe only
//! passes when the ranker finds a premium-quality voice. Sits below the
//! plain native provider in the table: it is the failover target that
//! retries a failed utterance with an explicitly chosen high-quality
//! voice instead of whatever the engine defaulted to.

use super::SpeechProvider;
use crate::host::{EngineEvent, SpeechHost, UtteranceRequest};
use crate::platform::Platform;
use crate::speech::voice::VoiceInventory;
use crate::speech::{ranker, SpeechSettings, Voice};
use crate::Result;
use log::{debug, info};
use std::sync::Arc;

pub struct EnhancedNativeProvider {
    host: Arc<dyn SpeechHost>,
    inventory: VoiceInventory,
    platform: Platform,

    /// Ranked voices cached by the first load, best first; cached even
    /// when empty so a voiceless engine is not re-polled per utterance
    ranked: Option<Vec<Voice>>,
}

impl EnhancedNativeProvider {
    pub fn new(host: Arc<dyn SpeechHost>, platform: Platform, settings: &SpeechSettings) -> Self {
        let inventory = VoiceInventory::new(Arc::clone(&host))
            .with_policy(settings.voice_load)
            .with_priming(settings.prime_on_empty);
        Self {
            host,
            inventory,
            platform,
            ranked: None,
        }
    }

    fn load_ranked(&mut self) -> Vec<Voice> {
        match self.ranked {
            Some(ref ranked) => ranked.clone(),
            None => {
                let voices = self.inventory.load();

                // Drop any events the inventory's priming utterance produced
                while self.host.take_event().is_some() {}

                let ranked = ranker::rank(&voices, self.platform);
                self.ranked = Some(ranked.clone());
                ranked
            }
        }
    }

    /// Best premium voice found, if any
    pub fn top_voice(&self) -> Option<&Voice> {
        self.ranked
            .as_ref()
            .and_then(|ranked| ranked.first())
            .filter(|voice| ranker::is_premium(voice, self.platform))
    }
}

impl SpeechProvider for EnhancedNativeProvider {
    fn id(&self) -> &'static str {
        "native-enhanced"
    }

    fn probe(&mut self) -> bool {
        if !self.host.available() {
            info!("✗ Native engine absent on this host");
            return false;
        }

        // Requires voices: an empty inventory fails this probe even
        // though the plain native provider would accept it
        let ranked = self.load_ranked();
        if ranked.is_empty() {
            info!("✗ Enhanced native probe failed: no voices enumerated");
            return false;
        }

        match self.top_voice() {
            Some(best) => {
                info!(
                    "✓ Enhanced native engine usable (best voice: {})",
                    best.name
                );
                true
            }
            None => {
                info!(
                    "✗ Enhanced native probe failed: no premium voice among {}",
                    ranked.len()
                );
                false
            }
        }
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        // Substitute the premium pick when the caller left the voice open
        if request.voice.is_none() {
            self.load_ranked();
            if let Some(best) = self.top_voice().cloned() {
                debug!("Enhanced provider selecting voice {}", best.name);
                let mut upgraded = request.clone();
                upgraded.voice = Some(best);
                return self.host.speak(&upgraded);
            }
        }
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
        self.load_ranked()
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        self.host.take_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeSpeechHost;

    fn settings() -> SpeechSettings {
        SpeechSettings::fast_for_tests()
    }

    #[test]
    fn test_probe_requires_voices() {
        let host = Arc::new(FakeSpeechHost::new());
        let mut provider =
            EnhancedNativeProvider::new(host, Platform::MacOs, &settings());
        assert!(!provider.probe());
    }

    #[test]
    fn test_probe_requires_premium_quality() {
        let host = Arc::new(FakeSpeechHost::with_voices(vec![Voice::new(
            "eSpeak English",
            "en",
        )]));
        let mut provider =
            EnhancedNativeProvider::new(host, Platform::Linux, &settings());
        assert!(!provider.probe());
    }

    #[test]
    fn test_speak_fills_in_premium_voice() {
        let host = Arc::new(FakeSpeechHost::with_voices(vec![
            Voice::new("Fred", "en-US"),
            Voice::new("Samantha", "en-US"),
        ]));
        let mut provider = EnhancedNativeProvider::new(
            Arc::clone(&host) as Arc<dyn SpeechHost>,
            Platform::MacOs,
            &settings(),
        );
        assert!(provider.probe());

        let request = UtteranceRequest {
            text: "Hello".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        };
        provider.speak(&request).unwrap();

        let spoken = host.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(
            spoken[0].voice.as_ref().map(|v| v.name.as_str()),
            Some("Samantha")
        );
    }
}
