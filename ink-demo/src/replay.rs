//! Replay of recorded contact frames.
//!
//! Recordings are JSON lines: one [`RawContactFrame`] per line, blank lines
//! ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ink_core::{PointerConsumer, PointerInputNormalizer, RawContactFrame, RenderTarget};
use thiserror::Error;

/// Errors that can occur while loading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recording could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid frame.
    #[error("Invalid frame on line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Frames delivered to the normalizer.
    pub frames: usize,
    /// Frames reported as consumed.
    pub consumed: usize,
    /// Frames reported as not consumed.
    pub rejected: usize,
    /// Gestures fired between frames.
    pub deferred_gestures: usize,
}

/// Parse a recording from a reader.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] on read failure and [`ReplayError::Parse`] with
/// the offending line number on malformed input.
pub fn load_frames(reader: impl BufRead) -> Result<Vec<RawContactFrame>, ReplayError> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Parse a recording file.
///
/// # Errors
///
/// See [`load_frames`].
pub fn load_frames_from_path(path: &Path) -> Result<Vec<RawContactFrame>, ReplayError> {
    let file = File::open(path)?;
    load_frames(BufReader::new(file))
}

/// Feed every frame through the normalizer in order.
///
/// After each frame, overdue gestures are fired at that frame's time so a
/// touch long press is not lost when the following frames are pen-only.
pub fn run<C, R>(
    normalizer: &PointerInputNormalizer<C, R>,
    frames: &[RawContactFrame],
) -> ReplaySummary
where
    C: PointerConsumer,
    R: RenderTarget,
{
    let mut summary = ReplaySummary::default();
    for frame in frames {
        summary.frames += 1;
        if normalizer.on_touch(frame) {
            summary.consumed += 1;
        } else {
            summary.rejected += 1;
            tracing::debug!(action = ?frame.action, t = frame.event_time_ms, "frame not consumed");
        }
        if normalizer.poll_gestures(frame.event_time_ms) {
            summary.deferred_gestures += 1;
        }
    }
    summary
}
