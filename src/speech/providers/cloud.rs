//! Hosted cloud speech provider
//!
//! Delegates to a remote speech backend the embedder supplies as a
//! second [`SpeechHost`]. The crate itself carries no network stack;
//! without an injected backend the probe simply reports unusable and the
//! selector moves on.

use super::SpeechProvider;
use crate::host::{EngineEvent, SpeechHost, UtteranceRequest};
use crate::speech::Voice;
use crate::{ReadAloudError, Result};
use log::{debug, info, warn};
use std::sync::Arc;

pub struct CloudProvider {
    remote: Option<Arc<dyn SpeechHost>>,
}

impl CloudProvider {
    pub fn new(remote: Option<Arc<dyn SpeechHost>>) -> Self {
        Self { remote }
    }

    fn remote(&self) -> Result<&Arc<dyn SpeechHost>> {
        self.remote.as_ref().ok_or_else(|| {
            ReadAloudError::Network("no hosted speech backend configured".to_string())
        })
    }
}

impl SpeechProvider for CloudProvider {
    fn id(&self) -> &'static str {
        "cloud"
    }

    fn probe(&mut self) -> bool {
        let remote = match self.remote {
            Some(ref remote) => remote,
            None => {
                debug!("✗ No hosted speech backend configured");
                return false;
            }
        };

        if !remote.available() {
            info!("✗ Hosted speech backend unreachable");
            return false;
        }

        info!("✓ Hosted speech backend usable");
        true
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        self.remote()?.speak(request)
    }

    fn stop(&mut self) -> Result<()> {
        self.remote()?.cancel()
    }

    fn pause(&mut self) -> Result<()> {
        self.remote()?.pause()
    }

    fn resume(&mut self) -> Result<()> {
        self.remote()?.resume()
    }

    fn voices(&mut self) -> Vec<Voice> {
        let remote = match self.remote {
            Some(ref remote) => remote,
            None => return Vec::new(),
        };
        match remote.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Hosted backend voice enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        self.remote.as_ref().and_then(|remote| remote.take_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeSpeechHost;

    #[test]
    fn test_probe_fails_without_backend() {
        let mut provider = CloudProvider::new(None);
        assert!(!provider.probe());
        assert!(provider.voices().is_empty());
        assert!(provider.take_event().is_none());
    }

    #[test]
    fn test_probe_fails_when_unreachable() {
        let mut provider = CloudProvider::new(Some(Arc::new(FakeSpeechHost::unavailable())));
        assert!(!provider.probe());
    }

    #[test]
    fn test_delegates_to_injected_backend() {
        let remote = Arc::new(FakeSpeechHost::with_voices(vec![Voice::new(
            "Cloud Neural Voice",
            "en-US",
        )]));
        let mut provider = CloudProvider::new(Some(Arc::clone(&remote) as Arc<dyn SpeechHost>));
        assert!(provider.probe());
        assert_eq!(provider.voices().len(), 1);

        let request = UtteranceRequest {
            text: "Hello".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        };
        provider.speak(&request).unwrap();
        assert_eq!(remote.spoken().len(), 1);
    }
}
