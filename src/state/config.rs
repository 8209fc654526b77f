//! Configuration management
//!
//! Global user defaults live in an INI file in the home directory:
//! playback parameters, the word-timing constant, voice-loading retry
//! caps, and the external reader link. Per-document state lives in the
//! document store, not here.

use crate::retry::RetryPolicy;
use crate::speech::guidance::DEFAULT_READER_URL;
use crate::speech::session::DEFAULT_PER_CHAR_MS;
use crate::speech::{SpeakOptions, SpeechSettings};
use crate::{ReadAloudError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.readaloud.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| ReadAloudError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| ReadAloudError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| ReadAloudError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.readaloud.cfg)
    fn config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".readaloud.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("rate", "1.0")
            .set("pitch", "1.0")
            .set("volume", "1.0")
            .set("voice", "");

        ini.with_section(Some("timing"))
            .set("per_char_ms", DEFAULT_PER_CHAR_MS.to_string())
            .set("start_timeout_ms", "5000");

        ini.with_section(Some("voices"))
            .set("load_attempts", "50")
            .set("load_delay_ms", "100")
            .set("prime_on_empty", "true");

        ini.with_section(Some("guidance"))
            .set("reader_url", DEFAULT_READER_URL);

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Speech-specific configuration getters

    /// Default playback rate (1.0 is normal speed)
    pub fn rate(&self) -> f32 {
        self.get_float("speech", "rate", 1.0)
    }

    /// Default playback pitch (1.0 is normal pitch)
    pub fn pitch(&self) -> f32 {
        self.get_float("speech", "pitch", 1.0)
    }

    /// Default playback volume
    pub fn volume(&self) -> f32 {
        self.get_float("speech", "volume", 1.0)
    }

    /// Preferred voice name, if the user set one
    pub fn voice(&self) -> Option<String> {
        let name = self.get_string("speech", "voice", "");
        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Estimated speaking time per character, in milliseconds
    ///
    /// The word-timing constant; empirical, and tunable here.
    pub fn per_char_ms(&self) -> u64 {
        self.get_int("timing", "per_char_ms", DEFAULT_PER_CHAR_MS as i64)
            .max(1) as u64
    }

    /// Bounded wait for the speech-start acknowledgment
    pub fn start_timeout(&self) -> Duration {
        let ms = self.get_int("timing", "start_timeout_ms", 5000).max(10) as u64;
        Duration::from_millis(ms)
    }

    /// Voice-list polling policy
    pub fn voice_load_policy(&self) -> RetryPolicy {
        let attempts = self.get_int("voices", "load_attempts", 50).clamp(1, 1000) as u32;
        let delay_ms = self.get_int("voices", "load_delay_ms", 100).clamp(1, 10_000) as u64;
        RetryPolicy::new(attempts, Duration::from_millis(delay_ms))
    }

    /// Whether an empty first voice read triggers a priming utterance
    pub fn prime_on_empty(&self) -> bool {
        self.get_bool("voices", "prime_on_empty", true)
    }

    /// External reading service linked from guidance
    pub fn reader_url(&self) -> String {
        self.get_string("guidance", "reader_url", DEFAULT_READER_URL)
    }

    /// Default playback options from the configured values
    pub fn speak_options(&self) -> SpeakOptions {
        SpeakOptions {
            rate: self.rate(),
            pitch: self.pitch(),
            volume: self.volume(),
            voice: self.voice(),
        }
        .clamped()
    }

    /// Engine-mechanics settings from the configured values
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            per_char_ms: self.per_char_ms(),
            start_timeout: self.start_timeout(),
            voice_load: self.voice_load_policy(),
            prime_on_empty: self.prime_on_empty(),
            reader_url: self.reader_url(),
        }
    }
}
