//! Provider selection and playback orchestration
//!
//! Walks the registered provider table in priority order, commits to the
//! first liveness probe that passes, and drives one speech session at a
//! time through it. Mid-flight faults fail over to the remaining
//! providers; total failure surfaces platform-tailored guidance instead
//! of going silent.
//!
//! The selector is poll-driven: the embedder pumps
//! [`poll`](SpeechSelector::poll) and all callbacks fire on the pumping
//! thread.

use crate::host::{EngineEvent, EngineFault, UtteranceRequest};
use crate::platform::Platform;
use crate::retry::{poll_until, RetryPolicy};
use crate::speech::guidance::Guidance;
use crate::speech::providers::ProviderEntry;
use crate::speech::session::{Session, SpeakOptions, Status, WordTimer};
use crate::speech::{ranker, SpeechSettings, Voice};
use crate::{ReadAloudError, Result};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

type StatusCallback = Box<dyn FnMut(Status)>;
type WordCallback = Box<dyn FnMut(&str, usize)>;
type SuccessCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&ReadAloudError)>;
type GuidanceCallback = Box<dyn FnMut(&Guidance)>;

/// Selection lifecycle
///
/// `Active` is the only state `speak` may be called from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorState {
    Uninitialized,
    Probing,
    Active(usize),
    Exhausted,
}

pub struct SpeechSelector {
    /// Provider table, ascending priority
    entries: Vec<ProviderEntry>,
    state: SelectorState,
    platform: Platform,
    settings: SpeechSettings,

    /// The single session; a new speak replaces it
    session: Option<Session>,

    /// Total-failure guidance fires at most once per selector
    guidance_presented: bool,

    on_status_change: Option<StatusCallback>,
    on_word: Option<WordCallback>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    on_guidance: Option<GuidanceCallback>,
}

impl SpeechSelector {
    pub fn new(mut entries: Vec<ProviderEntry>, platform: Platform, settings: SpeechSettings) -> Self {
        entries.sort_by_key(|entry| entry.priority);
        Self {
            entries,
            state: SelectorState::Uninitialized,
            platform,
            settings,
            session: None,
            guidance_presented: false,
            on_status_change: None,
            on_word: None,
            on_success: None,
            on_error: None,
            on_guidance: None,
        }
    }

    /// Status transitions: Idle → Speaking → Paused/Ended/Errored
    pub fn set_on_status_change(&mut self, callback: impl FnMut(Status) + 'static) {
        self.on_status_change = Some(Box::new(callback));
    }

    /// Simulated word-start events for highlighting sync
    pub fn set_on_word(&mut self, callback: impl FnMut(&str, usize) + 'static) {
        self.on_word = Some(Box::new(callback));
    }

    /// Fires when a session reaches its natural end
    pub fn set_on_success(&mut self, callback: impl FnMut() + 'static) {
        self.on_success = Some(Box::new(callback));
    }

    pub fn set_on_error(&mut self, callback: impl FnMut(&ReadAloudError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Structured remediation disclosures
    pub fn set_on_guidance(&mut self, callback: impl FnMut(&Guidance) + 'static) {
        self.on_guidance = Some(Box::new(callback));
    }

    /// Probe providers in priority order and commit to the first success
    ///
    /// Returns false when every probe fails; in that case the guidance
    /// callback has been invoked with platform-tailored remediation.
    pub fn initialize(&mut self) -> bool {
        info!("Probing {} speech providers", self.entries.len());
        self.state = SelectorState::Probing;

        for idx in 0..self.entries.len() {
            let id = self.entries[idx].provider.id();
            debug!("Probing provider '{}'", id);
            if self.entries[idx].provider.probe() {
                info!("Active speech provider: '{}'", id);
                self.state = SelectorState::Active(idx);
                return true;
            }
        }

        warn!("No usable speech provider on this host");
        self.state = SelectorState::Exhausted;
        self.present_no_speech_guidance();
        false
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SelectorState::Active(_))
    }

    /// Identifier of the provider the current session runs on
    pub fn active_provider_id(&self) -> Option<&'static str> {
        match self.state {
            SelectorState::Active(idx) => Some(self.entries[idx].provider.id()),
            _ => None,
        }
    }

    /// Start speaking `text`, replacing any session in flight
    ///
    /// Returns once the engine acknowledged speech start; completion
    /// arrives through the status-change callback. Parameters are
    /// clamped, never rejected.
    pub fn speak(&mut self, text: &str, options: &SpeakOptions) -> Result<()> {
        let active_idx = match self.state {
            SelectorState::Active(idx) => idx,
            SelectorState::Uninitialized | SelectorState::Probing => {
                return Err(ReadAloudError::Other(
                    "speech selector not initialized".to_string(),
                ))
            }
            SelectorState::Exhausted => {
                return Err(ReadAloudError::Exhausted(
                    "no usable speech provider".to_string(),
                ))
            }
        };

        // Last caller wins: cancel whatever is in flight first, so the
        // engine never overlaps audio
        self.cancel_session_silently(active_idx);

        let options = options.clamped();
        let voice = self.resolve_voice(active_idx, &options);
        let request = UtteranceRequest {
            text: text.to_string(),
            rate: options.rate,
            pitch: options.pitch,
            volume: options.volume,
            voice,
        };
        self.session = Some(Session::new(text, request, self.settings.per_char_ms));

        match self.drive_attempts(active_idx) {
            Ok(idx) => {
                self.state = SelectorState::Active(idx);
                self.emit_status(Status::Speaking);
                let guidance = self.entries[idx].provider.guidance();
                if let Some(guidance) = guidance {
                    self.emit_guidance(&guidance);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(session) = self.session.as_mut() {
                    session.timer.cancel();
                    session.status = Status::Errored;
                }
                self.emit_status(Status::Errored);
                self.emit_error(&e);
                self.present_no_speech_guidance();
                Err(e)
            }
        }
    }

    /// Pause playback; no-op unless speaking
    pub fn pause(&mut self) -> Result<()> {
        let idx = match self.state {
            SelectorState::Active(idx) => idx,
            _ => return Ok(()),
        };
        if self.status() != Status::Speaking {
            return Ok(());
        }

        if let Err(e) = self.entries[idx].provider.pause() {
            warn!("Pause failed: {}", e);
            return Err(e);
        }

        let now = Instant::now();
        if let Some(session) = self.session.as_mut() {
            session.timer.pause(now);
            session.status = Status::Paused;
        }
        self.emit_status(Status::Paused);
        Ok(())
    }

    /// Resume paused playback; no-op unless paused
    pub fn resume(&mut self) -> Result<()> {
        let idx = match self.state {
            SelectorState::Active(idx) => idx,
            _ => return Ok(()),
        };
        if self.status() != Status::Paused {
            return Ok(());
        }

        if let Err(e) = self.entries[idx].provider.resume() {
            warn!("Resume failed: {}", e);
            return Err(e);
        }

        let now = Instant::now();
        if let Some(session) = self.session.as_mut() {
            session.timer.resume(now);
            session.status = Status::Speaking;
        }
        self.emit_status(Status::Speaking);
        Ok(())
    }

    /// Stop playback and clear the session
    ///
    /// Idempotent: with nothing playing this is a no-op and no callback
    /// fires. The word timer is cleared, so no word callback fires after
    /// stop either.
    pub fn stop(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }

        if let SelectorState::Active(idx) = self.state {
            if let Err(e) = self.entries[idx].provider.stop() {
                warn!("Stop failed: {}", e);
            }
            while self.entries[idx].provider.take_event().is_some() {}
        }

        self.session = None;
        self.emit_status(Status::Idle);
        Ok(())
    }

    /// Voices of the active provider, possibly empty
    pub fn voices(&mut self) -> Vec<Voice> {
        match self.state {
            SelectorState::Active(idx) => self.entries[idx].provider.voices(),
            _ => Vec::new(),
        }
    }

    /// Status of the current session, Idle when none exists
    pub fn status(&self) -> Status {
        self.session
            .as_ref()
            .map(|session| session.status)
            .unwrap_or(Status::Idle)
    }

    /// Pump engine events and fire due word callbacks
    ///
    /// Call from the embedding event loop; all callbacks fire here or
    /// inside `speak`. A mid-flight fault that exhausts the remaining
    /// providers is returned as well as surfaced through the callbacks.
    pub fn poll(&mut self) -> Result<()> {
        let idx = match self.state {
            SelectorState::Active(idx) => idx,
            _ => return Ok(()),
        };
        if self.session.is_none() {
            return Ok(());
        }

        let mut events = Vec::new();
        while let Some(event) = self.entries[idx].provider.take_event() {
            events.push(event);
        }

        for event in events {
            match event {
                // The start ack was consumed in speak; duplicates are noise
                EngineEvent::Started => {}
                EngineEvent::Ended => self.finish(Status::Ended),
                EngineEvent::Paused => {
                    if self.status() == Status::Speaking {
                        let now = Instant::now();
                        if let Some(session) = self.session.as_mut() {
                            session.timer.pause(now);
                            session.status = Status::Paused;
                        }
                        self.emit_status(Status::Paused);
                    }
                }
                EngineEvent::Resumed => {
                    if self.status() == Status::Paused {
                        let now = Instant::now();
                        if let Some(session) = self.session.as_mut() {
                            session.timer.resume(now);
                            session.status = Status::Speaking;
                        }
                        self.emit_status(Status::Speaking);
                    }
                }
                EngineEvent::Faulted(fault) if fault.is_benign() => {
                    debug!("Benign engine interruption, not surfaced");
                }
                EngineEvent::Faulted(fault) => return self.recover_midflight(fault),
            }
        }

        self.fire_due_words();
        Ok(())
    }

    /// Wait hint for the embedding poll loop
    pub fn time_until_next_event(&self) -> Option<Duration> {
        let session = self.session.as_ref()?;
        if session.status != Status::Speaking {
            return None;
        }
        session.timer.next_due(Instant::now())
    }

    /// Voice precedence: explicit caller choice present in the
    /// inventory, then the ranker's top pick, then the engine default
    fn resolve_voice(&mut self, idx: usize, options: &SpeakOptions) -> Option<Voice> {
        let voices = self.entries[idx].provider.voices();

        if let Some(ref name) = options.voice {
            match voices
                .iter()
                .find(|voice| voice.name.eq_ignore_ascii_case(name))
            {
                Some(voice) => return Some(voice.clone()),
                None => warn!("Requested voice '{}' not in inventory, falling back", name),
            }
        }

        ranker::rank(&voices, self.platform).into_iter().next()
    }

    /// Try the request on the active provider, then on each remaining
    /// lower-priority provider not yet tried for this session
    fn drive_attempts(&mut self, start_idx: usize) -> Result<usize> {
        let request = match self.session.as_ref() {
            Some(session) => session.request.clone(),
            None => return Err(ReadAloudError::Other("no session to play".to_string())),
        };

        for idx in start_idx..self.entries.len() {
            let already_tried = self
                .session
                .as_ref()
                .map(|session| session.tried.contains(&idx))
                .unwrap_or(false);
            if already_tried {
                continue;
            }
            if let Some(session) = self.session.as_mut() {
                session.tried.push(idx);
            }

            let id = self.entries[idx].provider.id();
            debug!("Attempting playback with provider '{}'", id);

            if let Err(e) = self.entries[idx].provider.speak(&request) {
                warn!("Provider '{}' rejected utterance: {}", id, e);
                continue;
            }

            if self.await_start_ack(idx) {
                let per_char_ms = self.settings.per_char_ms;
                if let Some(session) = self.session.as_mut() {
                    // Fresh timer: a failover retry restarts the words
                    session.timer =
                        WordTimer::new(&session.text, session.request.rate, per_char_ms);
                    session.mark_started(Instant::now());
                }
                return Ok(idx);
            }

            warn!("Provider '{}' did not acknowledge speech start", id);
            let _ = self.entries[idx].provider.stop();
            while self.entries[idx].provider.take_event().is_some() {}
        }

        Err(ReadAloudError::Exhausted(
            "every remaining speech provider failed this utterance".to_string(),
        ))
    }

    /// Bounded wait for the engine's speech-start acknowledgment
    fn await_start_ack(&mut self, idx: usize) -> bool {
        let policy = RetryPolicy::spanning(self.settings.start_timeout, Duration::from_millis(10));
        let provider = &mut self.entries[idx].provider;

        poll_until(&policy, |_| {
            while let Some(event) = provider.take_event() {
                match event {
                    EngineEvent::Started => return Some(true),
                    EngineEvent::Faulted(fault) if !fault.is_benign() => {
                        warn!("Engine fault before speech start: {:?}", fault);
                        return Some(false);
                    }
                    // Stale events from the cancelled predecessor
                    _ => {}
                }
            }
            None
        })
        .unwrap_or(false)
    }

    /// Retry the in-flight request on the remaining providers
    fn recover_midflight(&mut self, fault: EngineFault) -> Result<()> {
        warn!("Mid-utterance engine fault: {:?}", fault);
        let start_idx = match self.state {
            SelectorState::Active(idx) => idx,
            _ => return Ok(()),
        };

        match self.drive_attempts(start_idx) {
            Ok(idx) => {
                info!(
                    "Recovered playback on provider '{}'",
                    self.entries[idx].provider.id()
                );
                self.state = SelectorState::Active(idx);
                let guidance = self.entries[idx].provider.guidance();
                if let Some(guidance) = guidance {
                    self.emit_guidance(&guidance);
                }
                Ok(())
            }
            Err(exhausted) => {
                if let Some(session) = self.session.as_mut() {
                    session.timer.cancel();
                    session.status = Status::Errored;
                }
                self.emit_status(Status::Errored);
                // Surface the underlying fault distinctly, then the
                // exhaustion to the caller
                let fault_error = ReadAloudError::from(fault);
                self.emit_error(&fault_error);
                self.present_no_speech_guidance();
                Err(exhausted)
            }
        }
    }

    fn fire_due_words(&mut self) {
        let now = Instant::now();
        loop {
            let due = match self.session.as_mut() {
                Some(session) if session.status == Status::Speaking => {
                    session.timer.pop_due(now)
                }
                _ => None,
            };
            let (index, word) = match due {
                Some(word) => word,
                None => break,
            };
            if let Some(callback) = self.on_word.as_mut() {
                callback(&word, index);
            }
        }
    }

    /// Cancel the in-flight session without emitting callbacks
    fn cancel_session_silently(&mut self, idx: usize) {
        if self.session.take().is_none() {
            return;
        }
        if let Err(e) = self.entries[idx].provider.stop() {
            warn!("Cancel of previous session failed: {}", e);
        }
        // Stale events must not leak into the next session
        while self.entries[idx].provider.take_event().is_some() {}
    }

    fn finish(&mut self, status: Status) {
        if let Some(session) = self.session.as_mut() {
            session.timer.cancel();
            session.status = status;
        }
        self.emit_status(status);
        if status == Status::Ended {
            if let Some(callback) = self.on_success.as_mut() {
                callback();
            }
        }
    }

    fn present_no_speech_guidance(&mut self) {
        if self.guidance_presented {
            return;
        }
        self.guidance_presented = true;
        warn!("Presenting no-speech guidance for {}", self.platform);
        let guidance = Guidance::no_speech(self.platform, &self.settings.reader_url);
        self.emit_guidance(&guidance);
    }

    fn emit_status(&mut self, status: Status) {
        if let Some(callback) = self.on_status_change.as_mut() {
            callback(status);
        }
    }

    fn emit_error(&mut self, error: &ReadAloudError) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(error);
        }
    }

    fn emit_guidance(&mut self, guidance: &Guidance) {
        if let Some(callback) = self.on_guidance.as_mut() {
            callback(guidance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeSpeechHost;
    use crate::host::SpeechHost;
    use crate::speech::providers::{native::NativeProvider, ProviderEntry};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn selector_over(host: Arc<FakeSpeechHost>) -> SpeechSelector {
        let settings = SpeechSettings::fast_for_tests();
        let provider = NativeProvider::new(host as Arc<dyn SpeechHost>, &settings);
        SpeechSelector::new(
            vec![ProviderEntry::new(10, Box::new(provider))],
            Platform::Linux,
            settings,
        )
    }

    #[test]
    fn test_speak_before_initialize_is_an_error() {
        let mut selector = selector_over(Arc::new(FakeSpeechHost::new()));
        let result = selector.speak("hello", &SpeakOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_initialize_exhausted_presents_guidance_once() {
        let host = Arc::new(FakeSpeechHost::unavailable());
        let mut selector = selector_over(host);

        let presented = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&presented);
        selector.set_on_guidance(move |_| *seen.borrow_mut() += 1);

        assert!(!selector.initialize());
        assert_eq!(*presented.borrow(), 1);

        // Speaking from the exhausted state errors without re-presenting
        assert!(selector.speak("hello", &SpeakOptions::default()).is_err());
        assert_eq!(*presented.borrow(), 1);
    }

    #[test]
    fn test_stop_without_session_fires_no_callbacks() {
        let host = Arc::new(FakeSpeechHost::new());
        let mut selector = selector_over(host);
        assert!(selector.initialize());

        let fired = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&fired);
        selector.set_on_status_change(move |_| *seen.borrow_mut() += 1);

        assert!(selector.stop().is_ok());
        assert!(selector.stop().is_ok());
        assert_eq!(*fired.borrow(), 0);
        assert_eq!(selector.status(), Status::Idle);
    }

    #[test]
    fn test_status_tracks_session() {
        let host = Arc::new(FakeSpeechHost::new());
        let mut selector = selector_over(Arc::clone(&host));
        assert!(selector.initialize());
        assert_eq!(selector.status(), Status::Idle);

        selector.speak("Hello world", &SpeakOptions::default()).unwrap();
        assert_eq!(selector.status(), Status::Speaking);

        host.push_event(EngineEvent::Ended);
        selector.poll().unwrap();
        assert_eq!(selector.status(), Status::Ended);
    }
}
