//! Crash diagnostics.
//!
//! A panic is turned into a readable report: the panic message up front,
//! location and backtrace below. Reports are logged and written to a
//! directory the user can inspect, then the process exits with
//! [`CRASH_EXIT_CODE`]. Ordinary errors are not crashes and never get here.

use std::any::Any;
use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};

use ink_core::clock::wall_clock_ms;

/// Exit code used after a crash report has been produced.
pub const CRASH_EXIT_CODE: i32 = 10;

/// A rendered crash report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashReport {
    /// Panic message.
    pub message: String,
    /// Full details: location, message, backtrace.
    pub details: String,
}

impl CrashReport {
    /// Build a report from a panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send), location: Option<String>) -> Self {
        let message = panic_message(payload);
        let location = location
            .map(|location| format!("panicked at {location}\n"))
            .unwrap_or_default();
        let details = format!("{location}{message}\n\n{}", Backtrace::force_capture());
        Self { message, details }
    }

    /// The report as written to disk.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\n\n{}\n", self.message, self.details)
    }

    /// Write the report to a new file in `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("crash-{}.txt", wall_clock_ms()));
        std::fs::write(&path, self.render())?;
        Ok(path)
    }

    /// Log the report, write it to `dir`, and terminate the process.
    pub fn emit_and_exit(&self, dir: &Path) -> ! {
        tracing::error!("{}", self.message);
        match self.write_to(dir) {
            Ok(path) => eprintln!("ink-demo crashed: {}\nreport: {}", self.message, path.display()),
            Err(e) => {
                tracing::warn!("Failed to write crash report to {}: {e}", dir.display());
                eprintln!("ink-demo crashed: {}\n\n{}", self.message, self.details);
            }
        }
        std::process::exit(CRASH_EXIT_CODE);
    }
}

/// Route panics to a crash report in `report_dir`.
pub fn install(report_dir: PathBuf) {
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(ToString::to_string);
        CrashReport::from_panic(info.payload(), location).emit_and_exit(&report_dir);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
