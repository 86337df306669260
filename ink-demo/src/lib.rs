//! # Ink Demo
//!
//! Demo host for the ink pointer normalizer.
//!
//! Replays a recording of raw contact frames (JSON lines) through
//! [`ink_core::PointerInputNormalizer`] against an in-memory engine and prints
//! every delivered pointer event as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ink-demo -- --input demos/strokes.jsonl --input-mode auto
//! ```
//!
//! ## Resuming the last session:
//!
//! ```bash
//! cargo run -p ink-demo
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DemoConfig` - Viewport, content size, data directory and input selection
//! - `DemoEngine` - In-memory engine implementing the consumer traits
//! - `replay` - Recording loader and frame pump
//! - `crash` - Crash report panic hook

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod crash;
mod engine;
pub mod replay;

pub use engine::{DemoEngine, EngineRecord, ROOT_BLOCK_ID};

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ink_core::{DocumentRef, InputModePolicy, SessionState};

/// Command-line arguments for ink-demo.
#[derive(Debug, Clone, Parser)]
#[command(name = "ink-demo")]
#[command(about = "Replay recorded contact frames through the ink pointer normalizer")]
#[command(version)]
pub struct CliArgs {
    /// Recording to replay (JSON lines of contact frames). Defaults to the last one replayed.
    #[arg(long, env = "INK_INPUT")]
    pub input: Option<PathBuf>,

    /// Input mode: auto, force-pen, force-touch or none. Defaults to the saved mode.
    #[arg(long, env = "INK_INPUT_MODE")]
    pub input_mode: Option<InputModePolicy>,

    /// Directory for session state and crash reports
    #[arg(long, env = "INK_DATA_DIR", default_value = ".ink-demo")]
    pub data_dir: PathBuf,

    /// Viewport size in pixels, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_size)]
    pub viewport: (f32, f32),

    /// Content size in pixels, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x4000", value_parser = parse_size)]
    pub content: (f32, f32),

    /// Disallow panning the view with touch
    #[arg(long)]
    pub no_scroll: bool,
}

/// Demo host configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Recording to replay.
    pub input: Option<PathBuf>,
    /// Input mode override.
    pub input_mode: Option<InputModePolicy>,
    /// Directory for session state and crash reports.
    pub data_dir: PathBuf,
    /// Viewport size in pixels.
    pub viewport: (f32, f32),
    /// Content size in pixels.
    pub content: (f32, f32),
    /// Whether touch panning is allowed.
    pub scroll_allowed: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoConfig {
    /// Create a new demo configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: None,
            input_mode: None,
            data_dir: PathBuf::from(".ink-demo"),
            viewport: (1280.0, 720.0),
            content: (1280.0, 4000.0),
            scroll_allowed: true,
        }
    }

    /// Directory crash reports are written to.
    #[must_use]
    pub fn crash_dir(&self) -> PathBuf {
        self.data_dir.join("crashes")
    }
}

impl From<CliArgs> for DemoConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            input: args.input,
            input_mode: args.input_mode,
            data_dir: args.data_dir,
            viewport: args.viewport,
            content: args.content,
            scroll_allowed: !args.no_scroll,
        }
    }
}

/// Pick the recording to replay: the one given on the command line, else the
/// last one recorded in `session`.
///
/// # Errors
///
/// Returns an error if neither is available.
pub fn resolve_input(config: &DemoConfig, session: &SessionState) -> anyhow::Result<PathBuf> {
    match (&config.input, &session.last_document) {
        (Some(path), _) => Ok(path.clone()),
        (None, Some(last)) => {
            tracing::info!("Resuming last recording: {}", last.file_name);
            Ok(PathBuf::from(&last.file_name))
        }
        (None, None) => anyhow::bail!("No recording given and no previous session to resume"),
    }
}

/// Reference to a recording that resolves from any working directory.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or is not valid UTF-8.
pub fn document_ref(path: &Path) -> anyhow::Result<DocumentRef> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let file_name = absolute
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", absolute.display()))?;
    Ok(DocumentRef::new(file_name, 0))
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid dimension {v:?}"))
    };
    Ok((parse(w)?, parse(h)?))
}
