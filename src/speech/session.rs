//! Speech session state and word-timing simulation
//!
//! One session per utterance: created on speak, replaced by the next
//! speak or an explicit stop. The word timer is an estimate, not a
//! measurement. The host engine exposes no real per-word boundary
//! events, so timing is derived from text length and a per-character
//! duration constant and will drift from the actual audio on
//! variable-rate or punctuation-heavy text.

use crate::host::UtteranceRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

/// Rate accepted by the engine (1.0 is normal speed)
pub const RATE_RANGE: (f32, f32) = (0.1, 10.0);

/// Pitch accepted by the engine (1.0 is normal pitch)
pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);

/// Volume accepted by the engine
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default estimated speaking time per character, in milliseconds
///
/// An empirical constant, tunable through `[timing] per_char_ms` in the
/// config file; it does not generalize across languages or voices
/// without recalibration.
pub const DEFAULT_PER_CHAR_MS: u64 = 60;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Playback status of a session, surfaced through `on_status_change`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Speaking,
    Paused,
    Ended,
    Errored,
}

/// Caller-supplied playback options, before clamping
///
/// The voice is a name to be resolved against the active provider's
/// inventory; an unknown name falls back down the selection precedence.
#[derive(Debug, Clone)]
pub struct SpeakOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<String>,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            voice: None,
        }
    }
}

impl SpeakOptions {
    /// Clamp every parameter into its engine range
    ///
    /// Non-finite input coerces to the documented default instead of
    /// rejecting: one malformed parameter must not silently kill the
    /// whole utterance.
    pub fn clamped(&self) -> Self {
        Self {
            rate: clamp_param(self.rate, RATE_RANGE, DEFAULT_RATE),
            pitch: clamp_param(self.pitch, PITCH_RANGE, DEFAULT_PITCH),
            volume: clamp_param(self.volume, VOLUME_RANGE, DEFAULT_VOLUME),
            voice: self.voice.clone(),
        }
    }
}

fn clamp_param(value: f32, range: (f32, f32), default: f32) -> f32 {
    if !value.is_finite() {
        return default;
    }
    value.clamp(range.0, range.1)
}

/// Split text into the words the timer will announce
pub fn split_words(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Simulated per-word timing for highlighting sync
///
/// Total utterance duration is estimated as characters × per-character
/// duration ÷ rate, divided evenly across the words; word `i` falls due
/// at start + i × interval. Fires each word exactly once, in order, and
/// nothing after `cancel`.
pub struct WordTimer {
    words: Vec<String>,
    next: usize,
    interval: Duration,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
}

impl WordTimer {
    pub fn new(text: &str, rate: f32, per_char_ms: u64) -> Self {
        let words = split_words(text);

        let rate = if rate.is_finite() && rate > 0.0 {
            rate as f64
        } else {
            DEFAULT_RATE as f64
        };
        let chars = text.chars().count() as f64;
        let total_ms = chars * per_char_ms as f64 / rate;
        let interval = if words.is_empty() {
            Duration::ZERO
        } else {
            Duration::from_millis((total_ms / words.len() as f64) as u64)
        };

        Self {
            words,
            next: 0,
            interval,
            started_at: None,
            paused_at: None,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Arm the timer at the moment the engine acknowledged speech start
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// All words announced, or the timer cancelled
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.words.len()
    }

    /// Take the next word if its simulated start time has passed
    pub fn pop_due(&mut self, now: Instant) -> Option<(usize, String)> {
        let started_at = self.started_at?;
        if self.paused_at.is_some() || self.is_exhausted() {
            return None;
        }

        let due_at = started_at + self.interval * self.next as u32;
        if now < due_at {
            return None;
        }

        let index = self.next;
        self.next += 1;
        Some((index, self.words[index].clone()))
    }

    /// Freeze the schedule while the engine is paused
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Shift the schedule forward by the paused span
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            if let Some(started_at) = self.started_at {
                self.started_at = Some(started_at + now.duration_since(paused_at));
            }
        }
    }

    /// Drop all remaining words; nothing fires after this
    pub fn cancel(&mut self) {
        self.next = self.words.len();
    }

    /// Time until the next word falls due, for poll-loop wait hints
    pub fn next_due(&self, now: Instant) -> Option<Duration> {
        let started_at = self.started_at?;
        if self.paused_at.is_some() || self.is_exhausted() {
            return None;
        }
        let due_at = started_at + self.interval * self.next as u32;
        Some(due_at.saturating_duration_since(now))
    }
}

/// One utterance in flight
pub struct Session {
    pub text: String,
    pub request: UtteranceRequest,
    pub status: Status,
    pub timer: WordTimer,

    /// Provider indices already tried for this speak request
    pub(crate) tried: Vec<usize>,
}

impl Session {
    pub fn new(text: &str, request: UtteranceRequest, per_char_ms: u64) -> Self {
        Self {
            text: text.to_string(),
            timer: WordTimer::new(text, request.rate, per_char_ms),
            request,
            status: Status::Idle,
            tried: Vec::new(),
        }
    }

    /// Engine acknowledged speech start
    pub fn mark_started(&mut self, now: Instant) {
        self.status = Status::Speaking;
        self.timer.start(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_bounds() {
        let options = SpeakOptions {
            rate: 99.0,
            pitch: -3.0,
            volume: 1.7,
            voice: None,
        };
        let clamped = options.clamped();
        assert_eq!(clamped.rate, RATE_RANGE.1);
        assert_eq!(clamped.pitch, PITCH_RANGE.0);
        assert_eq!(clamped.volume, VOLUME_RANGE.1);
    }

    #[test]
    fn test_nan_coerces_to_default() {
        let options = SpeakOptions {
            rate: f32::NAN,
            pitch: f32::INFINITY,
            volume: f32::NEG_INFINITY,
            voice: None,
        };
        let clamped = options.clamped();
        assert_eq!(clamped.rate, DEFAULT_RATE);
        assert_eq!(clamped.pitch, DEFAULT_PITCH);
        assert_eq!(clamped.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_valid_values_pass_through() {
        let options = SpeakOptions {
            rate: 1.5,
            pitch: 0.8,
            volume: 0.4,
            voice: Some("Samantha".to_string()),
        };
        let clamped = options.clamped();
        assert_eq!(clamped.rate, 1.5);
        assert_eq!(clamped.pitch, 0.8);
        assert_eq!(clamped.volume, 0.4);
        assert_eq!(clamped.voice.as_deref(), Some("Samantha"));
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("Hello world"), vec!["Hello", "world"]);
        assert_eq!(split_words("  spaced\tout\ntext  "), vec!["spaced", "out", "text"]);
        assert!(split_words("   ").is_empty());
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_timer_fires_each_word_once_in_order() {
        let mut timer = WordTimer::new("one two three", 1.0, 10);
        let start = Instant::now();
        timer.start(start);

        // Far enough in the future that every word is due
        let later = start + Duration::from_secs(60);
        let mut fired = Vec::new();
        while let Some((index, word)) = timer.pop_due(later) {
            fired.push((index, word));
        }

        assert_eq!(
            fired,
            vec![
                (0, "one".to_string()),
                (1, "two".to_string()),
                (2, "three".to_string()),
            ]
        );
        assert!(timer.is_exhausted());
        assert!(timer.pop_due(later).is_none());
    }

    #[test]
    fn test_timer_first_word_due_at_start() {
        let mut timer = WordTimer::new("Hello world", 1.0, 60);
        let start = Instant::now();
        timer.start(start);

        assert_eq!(timer.pop_due(start).map(|(i, _)| i), Some(0));
        // Second word waits for its interval
        assert!(timer.pop_due(start).is_none());
    }

    #[test]
    fn test_timer_nothing_before_start() {
        let mut timer = WordTimer::new("Hello world", 1.0, 60);
        assert!(timer.pop_due(Instant::now()).is_none());
    }

    #[test]
    fn test_timer_cancel_drops_remaining_words() {
        let mut timer = WordTimer::new("one two three", 1.0, 10);
        let start = Instant::now();
        timer.start(start);

        assert!(timer.pop_due(start + Duration::from_secs(60)).is_some());
        timer.cancel();
        assert!(timer.pop_due(start + Duration::from_secs(120)).is_none());
        assert!(timer.is_exhausted());
    }

    #[test]
    fn test_timer_pause_freezes_and_resume_shifts() {
        let mut timer = WordTimer::new("one two", 1.0, 1000);
        let start = Instant::now();
        timer.start(start);

        // First word out immediately
        assert!(timer.pop_due(start).is_some());

        timer.pause(start + Duration::from_millis(100));
        // Long past the original schedule, but paused
        assert!(timer.pop_due(start + Duration::from_secs(60)).is_none());

        // A 60s pause pushes the second word 60s out: it was due 3.5s
        // after start, so it now falls due 63.5s after start
        timer.resume(start + Duration::from_secs(60) + Duration::from_millis(100));
        assert!(timer.pop_due(start + Duration::from_secs(61)).is_none());
        assert!(timer.pop_due(start + Duration::from_secs(64)).is_some());
    }

    #[test]
    fn test_timer_empty_text() {
        let mut timer = WordTimer::new("", 1.0, 60);
        timer.start(Instant::now());
        assert!(timer.is_exhausted());
        assert!(timer.pop_due(Instant::now() + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_timer_rate_scales_interval() {
        let slow = WordTimer::new("one two three four", 0.5, 60);
        let fast = WordTimer::new("one two three four", 2.0, 60);
        assert!(slow.interval > fast.interval);
    }

    #[test]
    fn test_timer_garbage_rate_falls_back() {
        let timer = WordTimer::new("one two", f32::NAN, 60);
        let baseline = WordTimer::new("one two", 1.0, 60);
        assert_eq!(timer.interval, baseline.interval);
    }

    #[test]
    fn test_session_mark_started() {
        let request = UtteranceRequest {
            text: "Hello world".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        };
        let mut session = Session::new("Hello world", request, 60);
        assert_eq!(session.status, Status::Idle);

        session.mark_started(Instant::now());
        assert_eq!(session.status, Status::Speaking);
        assert!(session.timer.is_started());
        assert_eq!(session.timer.word_count(), 2);
    }
}
