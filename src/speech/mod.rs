//! Speech orchestration system

pub mod guidance;
pub mod providers;
pub mod ranker;
pub mod selector;
pub mod session;
pub mod voice;

pub use guidance::{Guidance, GuidanceAction};
pub use selector::SpeechSelector;
pub use session::{SpeakOptions, Status, WordTimer};
pub use voice::{Voice, VoiceInventory};

use crate::retry::RetryPolicy;
use crate::speech::guidance::DEFAULT_READER_URL;
use crate::speech::session::DEFAULT_PER_CHAR_MS;
use std::time::Duration;

/// Engine-mechanics tunables shared by the selector and the providers
///
/// Playback defaults (rate, pitch, volume, preferred voice) travel in
/// [`SpeakOptions`]; this struct carries the plumbing knobs.
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    /// Estimated speaking time per character for word-timing simulation
    pub per_char_ms: u64,

    /// Bounded wait for the engine's speech-start acknowledgment
    pub start_timeout: Duration,

    /// Attempt cap and delay for voice-list polling
    pub voice_load: RetryPolicy,

    /// Issue a zero-volume utterance when the first voice read is empty
    pub prime_on_empty: bool,

    /// External reading service linked from guidance
    pub reader_url: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            per_char_ms: DEFAULT_PER_CHAR_MS,
            start_timeout: Duration::from_secs(5),
            voice_load: RetryPolicy::default(),
            prime_on_empty: true,
            reader_url: DEFAULT_READER_URL.to_string(),
        }
    }
}

impl SpeechSettings {
    /// Settings with minimal waits, for test drivers
    pub fn fast_for_tests() -> Self {
        Self {
            per_char_ms: 1,
            start_timeout: Duration::from_millis(50),
            voice_load: RetryPolicy::new(2, Duration::from_millis(1)),
            prime_on_empty: true,
            reader_url: DEFAULT_READER_URL.to_string(),
        }
    }
}
