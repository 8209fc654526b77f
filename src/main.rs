//! readaloud main entry point
//!
//! Small demonstration driver for the library: speaks text from the
//! command line, a file, or stdin, echoing word and status events while
//! pumping the selector's poll loop.

use anyhow::{bail, Context};
use log::{error, info, warn};
use readaloud::clipboard::SystemClipboard;
use readaloud::host::fake::FakeSpeechHost;
use readaloud::host::native::NativeHost;
use readaloud::host::SpeechHost;
use readaloud::platform;
use readaloud::speech::providers::default_providers;
use readaloud::speech::{SpeechSelector, Status};
use readaloud::state::Config;
use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::process;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to readaloud.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("readaloud.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open readaloud.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "readaloud version {} starting (debug mode, logging to readaloud.log)",
            readaloud::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Remaining arguments are the text, or --file <path>
    let args: Vec<String> = std::env::args()
        .skip(1)
        .filter(|arg| arg != "--debug" && arg != "-d")
        .collect();

    let text = gather_text(&args)?;
    if text.trim().is_empty() {
        bail!("nothing to speak; pass text, --file <path>, or pipe stdin");
    }

    let config = Config::load().context("loading configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let detected = platform::detect();
    let settings = config.speech_settings();

    // A host without a working engine still gets the clipboard fallback,
    // so engine initialization failure is not fatal here
    let host: Arc<dyn SpeechHost> = match NativeHost::create() {
        Ok(host) => Arc::new(host),
        Err(e) => {
            warn!("Native speech engine unavailable: {}", e);
            Arc::new(FakeSpeechHost::unavailable())
        }
    };

    let providers = default_providers(
        host,
        None,
        Box::new(SystemClipboard::new()),
        detected,
        &settings,
    );
    let mut selector = SpeechSelector::new(providers, detected, settings);

    let status = Rc::new(RefCell::new(Status::Idle));
    let seen = Rc::clone(&status);
    selector.set_on_status_change(move |new_status| {
        info!("Status: {:?}", new_status);
        *seen.borrow_mut() = new_status;
    });

    selector.set_on_word(|word, _index| {
        // Follow-along echo of the simulated word timing
        print!("{} ", word);
        let _ = io::stdout().flush();
    });

    selector.set_on_error(|e| eprintln!("Speech error: {}", e));

    selector.set_on_guidance(|guidance| {
        eprintln!("\n{}", guidance.title);
        eprintln!("{}", guidance.body);
        for action in &guidance.actions {
            match &action.url {
                Some(url) => eprintln!("  - {}: {} ({})", action.label, action.detail, url),
                None => eprintln!("  - {}: {}", action.label, action.detail),
            }
        }
    });

    if !selector.initialize() {
        bail!("no usable speech provider on this host");
    }
    info!(
        "Speaking {} chars via provider '{}'",
        text.chars().count(),
        selector.active_provider_id().unwrap_or("?")
    );

    selector.speak(&text, &config.speak_options())?;

    // Generous upper bound on the whole utterance, so a host that never
    // reports the end cannot hang the process
    let estimate_ms = text.chars().count() as u64 * config.per_char_ms();
    let deadline = std::time::Instant::now()
        + Duration::from_millis(estimate_ms.saturating_mul(4))
        + Duration::from_secs(30);

    // Pump until the session ends
    loop {
        selector.poll()?;
        match *status.borrow() {
            Status::Ended | Status::Errored => break,
            _ => {}
        }
        if std::time::Instant::now() > deadline {
            warn!("Timed out waiting for end of speech");
            let _ = selector.stop();
            break;
        }
        let wait = selector
            .time_until_next_event()
            .unwrap_or(Duration::from_millis(20))
            .clamp(Duration::from_millis(1), Duration::from_millis(50));
        std::thread::sleep(wait);
    }

    println!();
    Ok(())
}

/// Collect the text to speak from args, a file, or stdin
fn gather_text(args: &[String]) -> anyhow::Result<String> {
    if args.first().map(String::as_str) == Some("--file") {
        let path = args
            .get(1)
            .context("--file requires a path argument")?;
        return std::fs::read_to_string(path).with_context(|| format!("reading {}", path));
    }

    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("reading stdin")?;
    Ok(text)
}
