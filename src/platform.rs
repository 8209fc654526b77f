//! Platform detection utilities
//!
//! Voice catalogs and remediation steps differ per host platform, so both
//! the voice ranker and the guidance presenter key off this detection.

use std::fmt;

/// Host platform family
///
/// Desktop and mobile ecosystems expose disjoint voice catalogs, and the
/// fix for a missing speech engine is different on each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    Unknown,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Detect the platform this process is running on
pub fn detect() -> Platform {
    from_descriptor(std::env::consts::OS)
}

/// Classify a platform from an environment descriptor string
///
/// Accepts `std::env::consts::OS` values as well as the looser identifier
/// strings embedders may carry around (user-agent fragments, config values).
pub fn from_descriptor(descriptor: &str) -> Platform {
    let lower = descriptor.to_lowercase();

    // Mobile names first: "android" contains no desktop marker, but
    // user-agent style descriptors mention both ("Linux; Android 14").
    if lower.contains("android") {
        return Platform::Android;
    }
    if lower.contains("ios") || lower.contains("iphone") || lower.contains("ipad") {
        return Platform::Ios;
    }
    if lower.contains("windows") {
        return Platform::Windows;
    }
    if lower.contains("macos") || lower.contains("mac os") || lower.contains("darwin") {
        return Platform::MacOs;
    }
    if lower.contains("linux") {
        return Platform::Linux;
    }

    Platform::Unknown
}

/// Detect a headless session (no display server)
///
/// Clipboard access is expected to fail here, which changes how the
/// last-resort provider's probe result should be read.
pub fn is_headless() -> bool {
    if !cfg!(target_os = "linux") {
        return false;
    }
    std::env::var_os("DISPLAY").is_none() && std::env::var_os("WAYLAND_DISPLAY").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_does_not_panic() {
        // The actual result depends on the build target
        let _ = detect();
        let _ = is_headless();
    }

    #[test]
    fn test_from_descriptor() {
        assert_eq!(from_descriptor("linux"), Platform::Linux);
        assert_eq!(from_descriptor("macos"), Platform::MacOs);
        assert_eq!(from_descriptor("windows"), Platform::Windows);
        assert_eq!(from_descriptor("android"), Platform::Android);
        assert_eq!(from_descriptor("ios"), Platform::Ios);
        assert_eq!(from_descriptor("plan9"), Platform::Unknown);
    }

    #[test]
    fn test_mobile_wins_over_embedded_desktop_marker() {
        // Android user agents carry "Linux" as well
        assert_eq!(from_descriptor("Linux; Android 14"), Platform::Android);
        assert_eq!(from_descriptor("iPhone OS 17"), Platform::Ios);
    }
}
