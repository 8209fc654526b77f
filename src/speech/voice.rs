//! Voice model and inventory loading
//!
//! The host engine populates its voice list lazily and asynchronously,
//! with no reliable ready signal on all platforms. The inventory wraps
//! that unreliability: read, prime, poll, and eventually hand back
//! whatever showed up. An empty list is a valid terminal result, not an
//! error.

use crate::host::{SpeechHost, UtteranceRequest};
use crate::retry::{poll_until, RetryPolicy};
use log::{debug, warn};
use std::sync::Arc;

/// A named, language-tagged speaking profile exposed by the host engine
///
/// Immutable from the application's perspective; only the *set* of voices
/// is unstable.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// Display name, e.g. "Samantha" or "Microsoft Zira"
    pub name: String,

    /// BCP-47-like language tag, e.g. "en-US"
    pub language: String,

    /// Synthesized on-device rather than streamed
    pub is_local: bool,

    /// The engine's own default voice
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            is_local: false,
            is_default: false,
        }
    }
}

/// Loads the host voice list, tolerating lazy population
pub struct VoiceInventory {
    host: Arc<dyn SpeechHost>,

    /// Attempt cap and delay for the polling phase
    policy: RetryPolicy,

    /// Issue a zero-volume utterance when the first read is empty
    ///
    /// Some engines only populate their list after the first speak call.
    prime_on_empty: bool,
}

impl VoiceInventory {
    pub fn new(host: Arc<dyn SpeechHost>) -> Self {
        Self {
            host,
            policy: RetryPolicy::default(),
            prime_on_empty: true,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_priming(mut self, prime_on_empty: bool) -> Self {
        self.prime_on_empty = prime_on_empty;
        self
    }

    /// Load the voice list, possibly empty
    ///
    /// Never fails: callers treat an empty result as "this provider is
    /// unusable" where voices are required, not as an exception. Hosts
    /// with a voices-changed notification are covered by the polling
    /// phase, which re-reads the list on every attempt.
    pub fn load(&self) -> Vec<Voice> {
        // Immediate read; the common case on desktop engines
        match self.host.voices() {
            Ok(voices) if !voices.is_empty() => {
                debug!("Voice list ready immediately: {} voices", voices.len());
                return voices;
            }
            Ok(_) => debug!("Voice list empty on first read"),
            Err(e) => {
                warn!("Voice enumeration failed: {}", e);
                return Vec::new();
            }
        }

        if self.prime_on_empty {
            self.prime();
        }

        let found = poll_until(&self.policy, |_| match self.host.voices() {
            Ok(voices) if !voices.is_empty() => Some(voices),
            Ok(_) => None,
            Err(e) => {
                warn!("Voice enumeration failed while polling: {}", e);
                Some(Vec::new())
            }
        });

        match found {
            Some(voices) => {
                debug!("Voice list settled at {} voices", voices.len());
                voices
            }
            None => {
                warn!(
                    "Voice list still empty after {} attempts, giving up",
                    self.policy.max_attempts
                );
                Vec::new()
            }
        }
    }

    /// Coax lazy engine initialization with a silent no-op utterance
    fn prime(&self) {
        debug!("Priming speech engine with zero-volume utterance");
        let request = UtteranceRequest::priming();
        if let Err(e) = self.host.speak(&request) {
            debug!("Priming utterance rejected: {}", e);
            return;
        }
        let _ = self.host.cancel();
    }
}
