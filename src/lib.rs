//! readaloud - multi-provider text-to-speech orchestration
//!
//! Drives read-aloud playback for document readers: probes a prioritized
//! table of speech providers, ranks voices by heuristic quality, streams
//! simulated per-word timing callbacks for synchronized highlighting,
//! and turns total speech failure into actionable platform-specific
//! guidance instead of silence.

pub mod clipboard;
pub mod error;
pub mod host;
pub mod platform;
pub mod retry;
pub mod speech;
pub mod state;

pub use error::{ReadAloudError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "readaloud";
