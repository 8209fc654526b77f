//! Failure guidance
//!
//! A speech stack that cannot speak must never fail silently. These
//! values carry platform-tailored remediation (installing a voice pack
//! means something different on every OS) and always include the one
//! path that needs no installation: copy the text and read it in an
//! external service. Rendering is the embedder's concern; this module
//! only builds the structured value.

use crate::platform::Platform;

/// Default external reading service offered as the universal fallback
pub const DEFAULT_READER_URL: &str = "https://ttsreader.com/player/";

/// One remediation step the user can take
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceAction {
    pub label: String,
    pub detail: String,
    pub url: Option<String>,
}

/// Structured, dismissible failure disclosure
#[derive(Debug, Clone, PartialEq)]
pub struct Guidance {
    pub title: String,
    pub body: String,
    pub actions: Vec<GuidanceAction>,
}

impl Guidance {
    /// Guidance for total provider failure on the given platform
    pub fn no_speech(platform: Platform, reader_url: &str) -> Self {
        let mut actions = platform_actions(platform);
        actions.push(external_reader_action(reader_url));

        Self {
            title: "Audio is not available".to_string(),
            body: format!(
                "No speech engine could be started on {}. \
                 The steps below restore read-aloud, or use the external \
                 reader which works without installing anything.",
                platform
            ),
            actions,
        }
    }

    /// Disclosure shown when the clipboard fallback handled a speak request
    pub fn copied_text(reader_url: &str) -> Self {
        Self {
            title: "Text copied".to_string(),
            body: "The text was copied to your clipboard. Paste it into the \
                   external reader to listen."
                .to_string(),
            actions: vec![external_reader_action(reader_url)],
        }
    }
}

fn external_reader_action(reader_url: &str) -> GuidanceAction {
    GuidanceAction {
        label: "Open external reader".to_string(),
        detail: "Paste the copied text into a web-based reading service".to_string(),
        url: Some(reader_url.to_string()),
    }
}

fn platform_actions(platform: Platform) -> Vec<GuidanceAction> {
    match platform {
        Platform::Windows => vec![GuidanceAction {
            label: "Install a Windows voice".to_string(),
            detail: "Settings > Time & Language > Speech > Manage voices > Add voices"
                .to_string(),
            url: None,
        }],
        Platform::MacOs => vec![GuidanceAction {
            label: "Enable macOS speech".to_string(),
            detail: "System Settings > Accessibility > Spoken Content > System Voice"
                .to_string(),
            url: None,
        }],
        Platform::Ios => vec![GuidanceAction {
            label: "Enable iOS speech".to_string(),
            detail: "Settings > Accessibility > Spoken Content > Voices".to_string(),
            url: None,
        }],
        Platform::Android => vec![GuidanceAction {
            label: "Install Google Text-to-Speech".to_string(),
            detail: "Settings > Accessibility > Text-to-speech output, or install the \
                     Speech Recognition & Synthesis app"
                .to_string(),
            url: None,
        }],
        Platform::Linux => vec![GuidanceAction {
            label: "Install a speech engine".to_string(),
            detail: "Install speech-dispatcher (e.g. sudo apt install speech-dispatcher \
                     espeak-ng) and restart the application"
                .to_string(),
            url: None,
        }],
        Platform::Unknown => vec![GuidanceAction {
            label: "Check system speech settings".to_string(),
            detail: "Enable text-to-speech in your operating system's accessibility \
                     settings"
                .to_string(),
            url: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_keeps_the_no_install_path() {
        for platform in [
            Platform::Windows,
            Platform::MacOs,
            Platform::Linux,
            Platform::Android,
            Platform::Ios,
            Platform::Unknown,
        ] {
            let guidance = Guidance::no_speech(platform, DEFAULT_READER_URL);
            assert!(!guidance.actions.is_empty());
            assert!(
                guidance
                    .actions
                    .iter()
                    .any(|a| a.url.as_deref() == Some(DEFAULT_READER_URL)),
                "missing external reader action on {}",
                platform
            );
        }
    }

    #[test]
    fn test_remediation_is_platform_specific() {
        let windows = Guidance::no_speech(Platform::Windows, DEFAULT_READER_URL);
        let linux = Guidance::no_speech(Platform::Linux, DEFAULT_READER_URL);
        assert_ne!(windows.actions[0].detail, linux.actions[0].detail);
        assert!(windows.body.contains("Windows"));
    }

    #[test]
    fn test_copied_text_links_the_reader() {
        let guidance = Guidance::copied_text("https://example.org/read");
        assert_eq!(
            guidance.actions[0].url.as_deref(),
            Some("https://example.org/read")
        );
    }
}
