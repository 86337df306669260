//! Persisted session state.
//!
//! Remembers which document was open last and which input mode was active, so
//! a host can restore both on the next launch. State is stored as a small
//! JSON file; a missing file means a fresh session.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::InkResult;
use crate::policy::InputModePolicy;

/// Default file name of the session state file.
pub const SESSION_FILE_NAME: &str = "session.json";

/// A document and the part within it that was open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Path of the document as the host stored it. Hosts that resume from
    /// another working directory store an absolute path.
    pub file_name: String,
    /// Index of the open part within the document.
    #[serde(default)]
    pub part_index: usize,
}

impl DocumentRef {
    /// Create a new document reference.
    #[must_use]
    pub fn new(file_name: impl Into<String>, part_index: usize) -> Self {
        Self {
            file_name: file_name.into(),
            part_index,
        }
    }
}

/// State restored across launches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Input mode in effect when the session was saved.
    #[serde(default)]
    pub input_mode: InputModePolicy,
    /// Last opened document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_document: Option<DocumentRef>,
}

/// Loads and stores [`SessionState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for [`SESSION_FILE_NAME`] inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(SESSION_FILE_NAME))
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state.
    ///
    /// A state file that has never been written yields the default state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::InkError::Io`] if the file exists but cannot be read and
    /// [`crate::InkError::Serialization`] if it cannot be parsed.
    pub fn load(&self) -> InkResult<SessionState> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No session state at {}", self.path.display());
                return Ok(SessionState::default());
            }
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded session state from {}", self.path.display());
        Ok(state)
    }

    /// Write the state, replacing any previous file.
    ///
    /// The parent directory is created if needed and the file is replaced
    /// atomically via a sibling temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::InkError::Io`] if the directory or file cannot be
    /// written.
    pub fn store(&self, state: &SessionState) -> InkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("Stored session state to {}", self.path.display());
        Ok(())
    }
}
