//! Per-document reading state
//!
//! A small key-value record per document, keyed by its URL: the
//! last-read page and any playback overrides the user made while
//! reading it. Stored as one JSON file in the home directory. Lookups of
//! unrecognized URLs return nothing; unknown fields in stored records
//! are tolerated.

use crate::speech::SpeakOptions;
use crate::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Saved state for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Last page the user was reading
    #[serde(default)]
    pub last_page: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Per-document records, loaded eagerly and saved explicitly
pub struct DocumentStore {
    path: PathBuf,
    records: HashMap<String, DocumentRecord>,
}

impl DocumentStore {
    /// Open the store at its default location (~/.readaloud/documents.json)
    pub fn open() -> Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open_at(home.join(".readaloud").join("documents.json"))
    }

    /// Open a store at an explicit path
    ///
    /// A missing file starts an empty store; an unreadable one is
    /// treated the same after a warning, since this is a cache of
    /// reading positions, not user data worth refusing to start over.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening document store at {:?}", path);

        let records = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(e) => {
                    warn!("Discarding unreadable document store: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self { path, records })
    }

    /// Save all records to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving {} document records to {:?}", self.records.len(), self.path);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Record for a document URL, if one was ever saved
    pub fn record(&self, url: &str) -> Option<&DocumentRecord> {
        self.records.get(url)
    }

    /// Remember the last-read page for a document
    pub fn set_last_page(&mut self, url: &str, page: u32) {
        self.records.entry(url.to_string()).or_default().last_page = page;
    }

    /// Update (or create) a document's record in place
    pub fn update<F>(&mut self, url: &str, apply: F)
    where
        F: FnOnce(&mut DocumentRecord),
    {
        apply(self.records.entry(url.to_string()).or_default());
    }

    /// Forget a document entirely
    pub fn remove(&mut self, url: &str) {
        self.records.remove(url);
    }

    /// Playback options for a document: its overrides on top of defaults
    pub fn speak_options_for(&self, url: &str, defaults: &SpeakOptions) -> SpeakOptions {
        let mut options = defaults.clone();
        if let Some(record) = self.records.get(url) {
            if let Some(rate) = record.rate {
                options.rate = rate;
            }
            if let Some(pitch) = record.pitch {
                options.pitch = pitch;
            }
            if let Some(volume) = record.volume {
                options.volume = volume;
            }
            if let Some(ref voice) = record.voice {
                options.voice = Some(voice.clone());
            }
        }
        options.clamped()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
