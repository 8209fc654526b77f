//! Voice quality ranking
//!
//! Host engines expose no quality metadata, so the only available signal
//! is the voice name itself: a curated table of known high-quality names
//! per platform, generic tier markers, language preference, and penalties
//! for known synthetic-sounding engines. Platform detection narrows which
//! name table applies, since desktop and mobile catalogs are disjoint.

use crate::platform::Platform;
use crate::speech::Voice;
use once_cell::sync::Lazy;
use regex::Regex;

/// Score at or above which a voice counts as premium quality
///
/// Reached by a curated-name match, or by a tier marker combined with a
/// preferred language. Engine defaults on bare installs stay below it.
pub const PREMIUM_THRESHOLD: i32 = 50;

/// Known high-quality voices on Apple platforms
const APPLE_VOICES: &[(&str, i32)] = &[
    ("samantha", 90),
    ("ava", 88),
    ("alex", 85),
    ("allison", 80),
    ("susan", 78),
    ("zoe", 76),
    ("evan", 72),
    ("karen", 70),
    ("daniel", 68),
    ("moira", 66),
    ("tessa", 64),
    ("fiona", 62),
];

/// Known high-quality voices on Windows
const WINDOWS_VOICES: &[(&str, i32)] = &[
    ("aria", 90),
    ("jenny", 88),
    ("guy", 80),
    ("zira", 78),
    ("hazel", 74),
    ("susan", 72),
    ("david", 70),
    ("mark", 68),
    ("catherine", 64),
];

/// Known high-quality voices on Android
const ANDROID_VOICES: &[(&str, i32)] = &[
    ("google us english", 90),
    ("google uk english female", 85),
    ("google uk english male", 83),
    ("google english", 75),
    ("samsung", 60),
];

/// Linux desktop catalogs are engine-generated names; nothing curated
const LINUX_VOICES: &[(&str, i32)] = &[];

/// Neutral table for unknown platforms: the strongest names from each
/// ecosystem at reduced weight
const NEUTRAL_VOICES: &[(&str, i32)] = &[
    ("samantha", 70),
    ("alex", 65),
    ("aria", 70),
    ("zira", 60),
    ("google us english", 70),
    ("google uk english", 65),
];

/// Generic quality markers vendors attach to their better voices
const TIER_MARKERS: &[(&str, i32)] = &[
    ("neural", 30),
    ("premium", 30),
    ("wavenet", 28),
    ("enhanced", 25),
    ("natural", 25),
];

/// Markers of known-low-quality synthetic voices
const PENALTY_MARKERS: &[(&str, i32)] = &[
    ("espeak", -50),
    ("robot", -40),
    ("eloquence", -30),
    ("compact", -20),
];

/// English language tags, matched leniently ("en", "en-US", "en_GB")
static ENGLISH_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^en([-_]|$)").unwrap()
});

/// Rank voices best first
///
/// Stable on ties: voices with equal scores keep their enumeration
/// order. Empty input yields empty output.
pub fn rank(voices: &[Voice], platform: Platform) -> Vec<Voice> {
    let mut ranked: Vec<Voice> = voices.to_vec();
    ranked.sort_by_key(|voice| std::cmp::Reverse(score(voice, platform)));
    ranked
}

/// Additive quality score for one voice
pub fn score(voice: &Voice, platform: Platform) -> i32 {
    let name = voice.name.to_lowercase();
    let mut total = 0;

    for (marker, points) in platform_table(platform) {
        if name.contains(marker) {
            total += points;
        }
    }

    for (marker, points) in TIER_MARKERS {
        if name.contains(marker) {
            total += points;
        }
    }

    for (marker, points) in PENALTY_MARKERS {
        if name.contains(marker) {
            total += points;
        }
    }

    total += language_score(&voice.language);

    if voice.is_local {
        total += 5;
    }
    if voice.is_default {
        total += 5;
    }

    total
}

/// Whether a voice clears the premium-quality bar
pub fn is_premium(voice: &Voice, platform: Platform) -> bool {
    score(voice, platform) >= PREMIUM_THRESHOLD
}

fn platform_table(platform: Platform) -> &'static [(&'static str, i32)] {
    match platform {
        Platform::MacOs | Platform::Ios => APPLE_VOICES,
        Platform::Windows => WINDOWS_VOICES,
        Platform::Android => ANDROID_VOICES,
        Platform::Linux => LINUX_VOICES,
        Platform::Unknown => NEUTRAL_VOICES,
    }
}

/// Language preference: en-US, then en-GB, then any English
fn language_score(language: &str) -> i32 {
    let lower = language.to_lowercase().replace('_', "-");
    if lower == "en-us" {
        20
    } else if lower == "en-gb" {
        15
    } else if ENGLISH_TAG.is_match(&lower) {
        10
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, language: &str) -> Voice {
        Voice::new(name, language)
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let ranked = rank(&[], Platform::MacOs);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_known_name_beats_generic() {
        let voices = vec![
            voice("eSpeak English", "en"),
            voice("Samantha", "en-US"),
            voice("Fred", "en-US"),
        ];
        let ranked = rank(&voices, Platform::MacOs);
        assert_eq!(ranked[0].name, "Samantha");
        assert_eq!(ranked[2].name, "eSpeak English");
    }

    #[test]
    fn test_tier_markers_add_up() {
        let plain = voice("Some Voice", "en-US");
        let neural = voice("Some Voice Neural", "en-US");
        assert!(score(&neural, Platform::Linux) > score(&plain, Platform::Linux));
    }

    #[test]
    fn test_language_preference_order() {
        let us = voice("Anna", "en-US");
        let gb = voice("Anna", "en-GB");
        let au = voice("Anna", "en-AU");
        let fr = voice("Anna", "fr-FR");
        assert!(score(&us, Platform::Unknown) > score(&gb, Platform::Unknown));
        assert!(score(&gb, Platform::Unknown) > score(&au, Platform::Unknown));
        assert!(score(&au, Platform::Unknown) > score(&fr, Platform::Unknown));
    }

    #[test]
    fn test_bare_en_and_underscore_tags_count_as_english() {
        assert_eq!(language_score("en"), 10);
        assert_eq!(language_score("en_GB"), 15);
        assert_eq!(language_score("english"), 0);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let voices = vec![
            voice("Voice One", "de-DE"),
            voice("Voice Two", "de-DE"),
            voice("Voice Three", "de-DE"),
        ];
        let ranked = rank(&voices, Platform::Linux);
        let names: Vec<&str> = ranked.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Voice One", "Voice Two", "Voice Three"]);
    }

    #[test]
    fn test_local_and_default_bonuses() {
        let mut preferred = voice("Anna", "de-DE");
        preferred.is_local = true;
        preferred.is_default = true;
        let plain = voice("Anna", "de-DE");
        assert_eq!(
            score(&preferred, Platform::Linux),
            score(&plain, Platform::Linux) + 10
        );
    }

    #[test]
    fn test_premium_threshold() {
        assert!(is_premium(&voice("Samantha", "en-US"), Platform::MacOs));
        assert!(is_premium(&voice("Cloud Neural Voice", "en-US"), Platform::Linux));
        assert!(!is_premium(&voice("eSpeak English (America)", "en-US"), Platform::Linux));
        assert!(!is_premium(&voice("Anna", "de-DE"), Platform::Linux));
    }

    #[test]
    fn test_unknown_platform_uses_neutral_table() {
        let ranked = rank(
            &[voice("Nobody", "en-US"), voice("Aria Online", "en-US")],
            Platform::Unknown,
        );
        assert_eq!(ranked[0].name, "Aria Online");
    }
}
