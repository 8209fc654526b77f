//! Speech providers
//!
//! Each provider is a self-contained speech backend candidate with its
//! own liveness probe and playback operations. The selector walks them
//! in priority order and commits to the first probe that passes, so new
//! backends register here as one table row, not a new manager variant.

pub mod clipboard;
pub mod cloud;
pub mod enhanced;
pub mod native;

use crate::clipboard::ClipboardSink;
use crate::host::{EngineEvent, SpeechHost, UtteranceRequest};
use crate::platform::Platform;
use crate::speech::guidance::Guidance;
use crate::speech::{SpeechSettings, Voice};
use crate::Result;
use std::sync::Arc;

/// One speech backend candidate
pub trait SpeechProvider {
    /// Stable identifier used in logs and status output
    fn id(&self) -> &'static str;

    /// Liveness probe: is this backend usable right now?
    ///
    /// Bounded internally; a probe must decide, not hang. Probes may
    /// cache what they learn (e.g. the voice list) for later calls.
    fn probe(&mut self) -> bool;

    /// Start speaking, interrupting any current utterance
    fn speak(&mut self, request: &UtteranceRequest) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    /// Voices this backend can speak with; possibly empty
    fn voices(&mut self) -> Vec<Voice>;

    /// Drain the next lifecycle event from the backend
    fn take_event(&mut self) -> Option<EngineEvent>;

    /// Disclosure to surface when this backend handles a speak request
    ///
    /// Only the degraded last-resort backend uses this; audio-producing
    /// backends stay silent.
    fn guidance(&self) -> Option<Guidance> {
        None
    }
}

/// Priority-ordered registry row; lower priority probes first
pub struct ProviderEntry {
    pub priority: u8,
    pub provider: Box<dyn SpeechProvider>,
}

impl ProviderEntry {
    pub fn new(priority: u8, provider: Box<dyn SpeechProvider>) -> Self {
        Self { priority, provider }
    }
}

/// Build the default provider table
///
/// Priority order: hosted cloud backend (when the embedder supplies
/// one), the native engine, the native engine restricted to premium
/// voices, then the clipboard fallback.
pub fn default_providers(
    host: Arc<dyn SpeechHost>,
    cloud_host: Option<Arc<dyn SpeechHost>>,
    clipboard_sink: Box<dyn ClipboardSink>,
    platform: Platform,
    settings: &SpeechSettings,
) -> Vec<ProviderEntry> {
    let mut entries = vec![
        ProviderEntry::new(10, Box::new(cloud::CloudProvider::new(cloud_host))),
        ProviderEntry::new(
            20,
            Box::new(native::NativeProvider::new(Arc::clone(&host), settings)),
        ),
        ProviderEntry::new(
            30,
            Box::new(enhanced::EnhancedNativeProvider::new(
                host, platform, settings,
            )),
        ),
        ProviderEntry::new(
            40,
            Box::new(clipboard::ClipboardProvider::new(
                clipboard_sink,
                settings.reader_url.clone(),
            )),
        ),
    ];
    entries.sort_by_key(|entry| entry.priority);
    entries
}
