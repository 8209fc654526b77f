//! Native speech host using the tts crate
//!
//! Adapts the platform speech service (Speech Dispatcher on Linux,
//! AVFoundation on macOS/iOS, the SAPI family on Windows) to the
//! [`SpeechHost`] trait. Engine lifecycle callbacks are collected into an
//! internal queue and drained by the pumping thread through `take_event`.

use super::{EngineEvent, EngineFault, SpeechHost, UtteranceRequest};
use crate::speech::Voice;
use crate::{ReadAloudError, Result};
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tts::Tts as TtsCrate;

/// Native speech engine behind the shared host handle
pub struct NativeHost {
    /// The tts crate's engine instance
    tts: Mutex<TtsCrate>,

    /// Lifecycle events queued by engine callbacks
    events: Arc<Mutex<VecDeque<EngineEvent>>>,

    /// Whether utterance callbacks could be registered
    ///
    /// Engines without them get a synthetic Started on speak and a
    /// polled or immediate Ended.
    callbacks_wired: bool,

    /// A synthetic Ended is still owed for the current utterance
    synthetic_end_pending: Mutex<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Callbacks only push into a queue; a poisoned lock still holds
    // consistent data
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl NativeHost {
    /// Initialize the platform speech engine
    pub fn create() -> Result<Self> {
        debug!("Creating native speech host");

        let mut tts = TtsCrate::default().map_err(|e| {
            ReadAloudError::CapabilityAbsent(format!("Failed to initialize TTS: {}", e))
        })?;

        let events: Arc<Mutex<VecDeque<EngineEvent>>> = Arc::new(Mutex::new(VecDeque::new()));
        let callbacks_wired = Self::wire_callbacks(&mut tts, &events);

        debug!(
            "Native speech host created (utterance callbacks: {})",
            callbacks_wired
        );

        Ok(Self {
            tts: Mutex::new(tts),
            events,
            callbacks_wired,
            synthetic_end_pending: Mutex::new(false),
        })
    }

    /// Register begin/end/stop callbacks where the engine supports them
    fn wire_callbacks(tts: &mut TtsCrate, events: &Arc<Mutex<VecDeque<EngineEvent>>>) -> bool {
        let features = tts.supported_features();
        if !features.utterance_callbacks {
            warn!("Engine does not report utterance callbacks; end-of-speech will be estimated");
            return false;
        }

        let queue = Arc::clone(events);
        let begin = tts.on_utterance_begin(Some(Box::new(move |_| {
            lock(&queue).push_back(EngineEvent::Started);
        })));

        let queue = Arc::clone(events);
        let end = tts.on_utterance_end(Some(Box::new(move |_| {
            lock(&queue).push_back(EngineEvent::Ended);
        })));

        let queue = Arc::clone(events);
        let stop = tts.on_utterance_stop(Some(Box::new(move |_| {
            lock(&queue).push_back(EngineEvent::Faulted(EngineFault::Canceled));
        })));

        match (begin, end, stop) {
            (Ok(()), Ok(()), Ok(())) => true,
            _ => {
                warn!("Failed to register utterance callbacks; end-of-speech will be estimated");
                false
            }
        }
    }

    /// Map normalized rate (0.1-10.0, 1.0 normal) into the engine's range
    fn convert_rate(tts: &TtsCrate, rate: f32) -> f32 {
        let normal = tts.normal_rate();
        if rate >= 1.0 {
            let max = tts.max_rate();
            (normal + (max - normal) * ((rate - 1.0) / 9.0)).min(max)
        } else {
            let min = tts.min_rate();
            (min + (normal - min) * ((rate - 0.1) / 0.9)).max(min)
        }
    }

    /// Map normalized pitch (0.0-2.0, 1.0 normal) into the engine's range
    fn convert_pitch(tts: &TtsCrate, pitch: f32) -> f32 {
        let normal = tts.normal_pitch();
        if pitch >= 1.0 {
            let max = tts.max_pitch();
            (normal + (max - normal) * (pitch - 1.0)).min(max)
        } else {
            let min = tts.min_pitch();
            (min + (normal - min) * pitch).max(min)
        }
    }

    /// Map normalized volume (0.0-1.0) into the engine's range
    fn convert_volume(tts: &TtsCrate, volume: f32) -> f32 {
        let min = tts.min_volume();
        let max = tts.max_volume();
        min + (max - min) * volume
    }

    fn apply_parameters(tts: &mut TtsCrate, request: &UtteranceRequest) -> Result<()> {
        let features = tts.supported_features();

        if features.rate {
            let rate = Self::convert_rate(tts, request.rate);
            tts.set_rate(rate)
                .map_err(|e| ReadAloudError::Synthesis(format!("Failed to set rate: {}", e)))?;
        } else {
            warn!("Rate control not supported on this platform");
        }

        if features.pitch {
            let pitch = Self::convert_pitch(tts, request.pitch);
            tts.set_pitch(pitch)
                .map_err(|e| ReadAloudError::Synthesis(format!("Failed to set pitch: {}", e)))?;
        } else {
            warn!("Pitch control not supported on this platform");
        }

        if features.volume {
            let volume = Self::convert_volume(tts, request.volume);
            tts.set_volume(volume)
                .map_err(|e| ReadAloudError::Synthesis(format!("Failed to set volume: {}", e)))?;
        } else {
            warn!("Volume control not supported on this platform");
        }

        if let Some(ref voice) = request.voice {
            Self::apply_voice(tts, voice);
        }

        Ok(())
    }

    /// Select a voice by name, leaving the engine default on any miss
    fn apply_voice(tts: &mut TtsCrate, voice: &Voice) {
        if !tts.supported_features().voice {
            warn!("Voice selection not supported on this platform");
            return;
        }

        let engine_voices = match tts.voices() {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to enumerate voices for selection: {}", e);
                return;
            }
        };

        match engine_voices.iter().find(|v| v.name() == voice.name) {
            Some(found) => {
                debug!("Selecting voice {:?}", found.name());
                if let Err(e) = tts.set_voice(found) {
                    warn!("Failed to set voice {}: {}", voice.name, e);
                }
            }
            None => warn!("Voice {} not present in engine catalog", voice.name),
        }
    }
}

impl SpeechHost for NativeHost {
    fn available(&self) -> bool {
        true
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        let tts = lock(&self.tts);
        let engine_voices = tts
            .voices()
            .map_err(|e| ReadAloudError::Synthesis(format!("Failed to get voices: {}", e)))?;

        Ok(engine_voices
            .iter()
            .map(|v| Voice {
                name: v.name(),
                language: v.language().to_string(),
                // Platform engine voices synthesize on-device
                is_local: true,
                is_default: false,
            })
            .collect())
    }

    fn speak(&self, request: &UtteranceRequest) -> Result<()> {
        let mut tts = lock(&self.tts);
        Self::apply_parameters(&mut tts, request)?;

        debug!("Speaking {} chars", request.text.chars().count());
        tts.speak(request.text.as_str(), true)
            .map_err(|e| ReadAloudError::Synthesis(format!("Speak failed: {}", e)))?;

        if !self.callbacks_wired {
            let mut events = lock(&self.events);
            events.push_back(EngineEvent::Started);
            *lock(&self.synthetic_end_pending) = true;
        }

        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        debug!("Canceling speech");
        *lock(&self.synthetic_end_pending) = false;

        let mut tts = lock(&self.tts);
        if !tts.supported_features().stop {
            warn!("Stop not supported on this platform");
            return Ok(());
        }
        tts.stop()
            .map_err(|e| ReadAloudError::Synthesis(format!("Cancel failed: {}", e)))?;
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        // The tts crate exposes no pause primitive; callers keep the
        // session state and surface the limitation
        Err(ReadAloudError::Other(
            "pause not supported by the native engine".to_string(),
        ))
    }

    fn resume(&self) -> Result<()> {
        Err(ReadAloudError::Other(
            "resume not supported by the native engine".to_string(),
        ))
    }

    fn take_event(&self) -> Option<EngineEvent> {
        if let Some(event) = lock(&self.events).pop_front() {
            return Some(event);
        }

        // Without callbacks the end of speech is inferred from
        // is_speaking, or assumed immediately where even that is missing
        let mut pending = lock(&self.synthetic_end_pending);
        if *pending {
            let mut tts = lock(&self.tts);
            let done = if tts.supported_features().is_speaking {
                !tts.is_speaking().unwrap_or(false)
            } else {
                true
            };
            if done {
                *pending = false;
                return Some(EngineEvent::Ended);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_native_host() {
        // May fail without speech-dispatcher or in CI without audio
        match NativeHost::create() {
            Ok(host) => {
                println!("✓ Native speech host initialized");
                let _ = host.voices();
            }
            Err(e) => println!("⚠ Host initialization failed (may be expected in CI): {}", e),
        }
    }

    #[test]
    fn test_speak_and_cancel() {
        if let Ok(host) = NativeHost::create() {
            let request = UtteranceRequest {
                text: "Integration test".to_string(),
                rate: 1.0,
                pitch: 1.0,
                volume: 1.0,
                voice: None,
            };
            assert!(host.speak(&request).is_ok(), "Should speak without error");
            assert!(host.cancel().is_ok(), "Should cancel without error");
        } else {
            println!("⚠ Skipping speak test (TTS not available)");
        }
    }
}
