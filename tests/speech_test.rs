//! Integration tests against the real platform speech engine
//!
//! These verify the native host adapter and the default provider table
//! on whatever engine the build machine has. Headless CI usually has
//! none, so every test tolerates an unavailable engine and reports
//! instead of failing.

use readaloud::clipboard::MemoryClipboard;
use readaloud::host::native::NativeHost;
use readaloud::host::{SpeechHost, UtteranceRequest};
use readaloud::platform;
use readaloud::speech::providers::default_providers;
use readaloud::speech::{SpeechSelector, SpeechSettings};
use std::sync::Arc;

#[test]
fn test_create_native_host() {
    match NativeHost::create() {
        Ok(host) => {
            println!("✓ Native speech host initialized");
            match host.voices() {
                Ok(voices) => println!("  {} voices enumerated", voices.len()),
                Err(e) => println!("  voice enumeration failed: {}", e),
            }
        }
        Err(e) => {
            // Acceptable in headless environments
            println!("⚠ Host initialization failed (may be expected in CI): {}", e);
        }
    }
}

#[test]
fn test_native_speak_operations() {
    let host = match NativeHost::create() {
        Ok(host) => host,
        Err(_) => {
            println!("⚠ Skipping speak test (TTS not available)");
            return;
        }
    };

    let request = UtteranceRequest {
        text: "Integration test".to_string(),
        rate: 1.0,
        pitch: 1.0,
        volume: 1.0,
        voice: None,
    };
    assert!(host.speak(&request).is_ok(), "Should speak without error");

    // Empty-ish and unicode text must not error either
    let unicode = UtteranceRequest {
        text: "Accents: café naïve 世界".to_string(),
        ..request
    };
    assert!(host.speak(&unicode).is_ok(), "Should handle unicode");

    assert!(host.cancel().is_ok(), "Should cancel without error");
}

#[test]
fn test_default_provider_table_initializes_or_guides() {
    // On any machine this either finds a working provider or reports
    // exactly one guidance disclosure; it must never hang or panic
    let detected = platform::detect();
    let settings = SpeechSettings::fast_for_tests();

    let host: Arc<dyn SpeechHost> = match NativeHost::create() {
        Ok(host) => Arc::new(host),
        Err(_) => Arc::new(readaloud::host::fake::FakeSpeechHost::unavailable()),
    };

    let providers = default_providers(
        host,
        None,
        Box::new(MemoryClipboard::new()),
        detected,
        &settings,
    );
    assert_eq!(providers.len(), 4);

    let mut selector = SpeechSelector::new(providers, detected, settings);
    let usable = selector.initialize();
    println!(
        "Provider selection on {}: usable={} active={:?}",
        detected,
        usable,
        selector.active_provider_id()
    );

    if usable {
        // The clipboard row is always registered, so with a working
        // memory clipboard selection can only fail if probing broke
        assert!(selector.active_provider_id().is_some());
    }
}
