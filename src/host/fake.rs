//! Scripted in-memory speech host
//!
//! Stands in for the platform engine in tests and headless environments:
//! records every utterance, serves a scripted voice list, and lets the
//! driver queue lifecycle events by hand. By default a successful `speak`
//! queues its own `Started` acknowledgment, which is how cooperative
//! engines behave.

use super::{EngineEvent, SpeechHost, UtteranceRequest};
use crate::speech::Voice;
use crate::{ReadAloudError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
struct FakeInner {
    available: bool,
    voices: Vec<Voice>,
    /// Voice list revealed only after this many enumeration calls
    voices_hidden_for: u32,
    voice_reads: u32,
    events: VecDeque<EngineEvent>,
    spoken: Vec<UtteranceRequest>,
    speak_failures: VecDeque<ReadAloudError>,
    cancel_count: u32,
    pause_count: u32,
    resume_count: u32,
    auto_ack: bool,
    auto_end: bool,
}

pub struct FakeSpeechHost {
    inner: Mutex<FakeInner>,
}

impl FakeSpeechHost {
    /// Available engine with an empty voice list
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FakeInner {
                available: true,
                auto_ack: true,
                ..FakeInner::default()
            }),
        }
    }

    /// Available engine with the given voices
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let host = Self::new();
        host.set_voices(voices);
        host
    }

    /// Host with no speech capability at all
    pub fn unavailable() -> Self {
        Self {
            inner: Mutex::new(FakeInner {
                available: false,
                ..FakeInner::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeInner> {
        // Single-threaded test driver; a poisoned lock means a test
        // already panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_voices(&self, voices: Vec<Voice>) {
        self.lock().voices = voices;
    }

    /// Hide the voice list until it has been enumerated `reads` times,
    /// imitating lazy population
    pub fn set_voices_after(&self, reads: u32, voices: Vec<Voice>) {
        let mut inner = self.lock();
        inner.voices = voices;
        inner.voices_hidden_for = inner.voice_reads + reads;
    }

    /// Suppress the automatic `Started` acknowledgment on speak
    pub fn set_auto_ack(&self, auto_ack: bool) {
        self.lock().auto_ack = auto_ack;
    }

    /// Also queue `Ended` right after the acknowledgment
    pub fn set_auto_end(&self, auto_end: bool) {
        self.lock().auto_end = auto_end;
    }

    /// Fail the next speak call with a synthesis fault
    pub fn fail_next_speak(&self, message: &str) {
        self.lock()
            .speak_failures
            .push_back(ReadAloudError::Synthesis(message.to_string()));
    }

    pub fn push_event(&self, event: EngineEvent) {
        self.lock().events.push_back(event);
    }

    pub fn spoken(&self) -> Vec<UtteranceRequest> {
        self.lock().spoken.clone()
    }

    pub fn cancel_count(&self) -> u32 {
        self.lock().cancel_count
    }

    pub fn pause_count(&self) -> u32 {
        self.lock().pause_count
    }

    pub fn resume_count(&self) -> u32 {
        self.lock().resume_count
    }
}

impl Default for FakeSpeechHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechHost for FakeSpeechHost {
    fn available(&self) -> bool {
        self.lock().available
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(ReadAloudError::CapabilityAbsent(
                "no speech engine on this host".to_string(),
            ));
        }
        inner.voice_reads += 1;
        if inner.voice_reads <= inner.voices_hidden_for {
            return Ok(Vec::new());
        }
        Ok(inner.voices.clone())
    }

    fn speak(&self, request: &UtteranceRequest) -> Result<()> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(ReadAloudError::CapabilityAbsent(
                "no speech engine on this host".to_string(),
            ));
        }
        if let Some(failure) = inner.speak_failures.pop_front() {
            return Err(failure);
        }
        inner.spoken.push(request.clone());
        if inner.auto_ack {
            inner.events.push_back(EngineEvent::Started);
            if inner.auto_end {
                inner.events.push_back(EngineEvent::Ended);
            }
        }
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.lock().cancel_count += 1;
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.pause_count += 1;
        inner.events.push_back(EngineEvent::Paused);
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.resume_count += 1;
        inner.events.push_back(EngineEvent::Resumed);
        Ok(())
    }

    fn take_event(&self) -> Option<EngineEvent> {
        self.lock().events.pop_front()
    }
}
