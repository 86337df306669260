//! # Ink Demo
//!
//! Replays recorded contact frames through the pointer normalizer.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ink_core::{ContentBlock, EventClock, PointerInputNormalizer, SessionState, SessionStore};
use ink_demo::{crash, document_ref, replay, resolve_input, CliArgs, DemoConfig, DemoEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,ink_core=debug,ink_demo=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output. Logs go to stderr; stdout carries events.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ink_core=debug,ink_demo=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = DemoConfig::from(args);

    crash::install(config.crash_dir());

    tracing::info!("Starting ink demo");
    run(&config)?;
    tracing::info!("Ink demo exited");
    Ok(())
}

fn run(config: &DemoConfig) -> anyhow::Result<()> {
    let store = SessionStore::in_dir(&config.data_dir);
    let mut session = store.load().unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to load session state from {}: {e}",
            store.path().display()
        );
        SessionState::default()
    });

    let input = resolve_input(config, &session)?;
    let input_mode = config.input_mode.unwrap_or(session.input_mode);

    let frames = replay::load_frames_from_path(&input)
        .with_context(|| format!("Failed to load recording {}", input.display()))?;
    tracing::info!(
        "Loaded {} frames from {} (input mode {input_mode})",
        frames.len(),
        input.display()
    );

    let engine = Arc::new(DemoEngine::new(
        config.viewport,
        config.content,
        config.scroll_allowed,
    ));
    // The recording's own clock stands in for device uptime.
    let uptime_now = frames.first().map_or(0, |f| f.event_time_ms);
    let normalizer = PointerInputNormalizer::with_clock(
        Arc::clone(&engine),
        Some(Arc::clone(&engine)),
        EventClock::capture(uptime_now),
    )
    .with_input_mode(input_mode);
    normalizer.set_listener(|x: f32, y: f32, block: Option<&ContentBlock>| match block {
        Some(block) => tracing::info!("Long press at ({x}, {y}) on block {}", block.id),
        None => tracing::info!("Long press at ({x}, {y})"),
    });

    let summary = replay::run(&normalizer, &frames);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in engine.take_records() {
        serde_json::to_writer(&mut out, &record).context("Failed to write event")?;
        writeln!(out).context("Failed to write event")?;
    }
    out.flush().context("Failed to flush output")?;

    tracing::info!(
        frames = summary.frames,
        consumed = summary.consumed,
        rejected = summary.rejected,
        deferred_gestures = summary.deferred_gestures,
        invalidations = engine.invalidation_count(),
        "Replay finished"
    );

    session.input_mode = normalizer.input_mode();
    session.last_document = Some(document_ref(&input)?);
    store
        .store(&session)
        .with_context(|| format!("Failed to store session to {}", store.path().display()))?;
    Ok(())
}
