//! Raw platform input frames.
//!
//! A [`RawContactFrame`] mirrors one multi-touch notification from the
//! platform: an action, the boot-relative time it happened, and every contact
//! that is currently active. Move-class frames may carry coalesced samples
//! recorded between the previous frame and this one.

use serde::{Deserialize, Serialize};

use crate::error::{InkError, InkResult};

/// Hardware tool reported for a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    /// Active or passive stylus tip.
    Stylus,
    /// Finger.
    Finger,
    /// Mouse or trackpad.
    Mouse,
    /// Stylus eraser end.
    Eraser,
    /// Tool type not reported.
    #[default]
    Unknown,
}

/// Action carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FrameAction {
    /// First contact of a gesture went down.
    Down,
    /// Last contact of a gesture went up.
    Up,
    /// An additional contact went down; `index` locates it in `contacts`.
    PointerDown {
        /// Index of the affected contact.
        index: usize,
    },
    /// A contact went up while others remain; `index` locates it in `contacts`.
    PointerUp {
        /// Index of the affected contact.
        index: usize,
    },
    /// One or more contacts moved.
    Move,
    /// The platform aborted the gesture.
    Cancel,
    /// Any other platform action (hover, scroll wheel, ...).
    Other,
}

/// A coalesced sub-frame sample of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    /// X position in view coordinates.
    pub x: f32,
    /// Y position in view coordinates.
    pub y: f32,
    /// Pressure.
    pub pressure: f32,
    /// Boot-relative sample time in milliseconds.
    pub event_time_ms: i64,
}

/// One contact point within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Pointer identifier, stable while the contact is down.
    pub id: i32,
    /// Hardware tool type.
    #[serde(default)]
    pub tool_type: ToolType,
    /// Current X position.
    pub x: f32,
    /// Current Y position.
    pub y: f32,
    /// Current pressure.
    #[serde(default = "default_pressure")]
    pub pressure: f32,
    /// Coalesced samples, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoricalSample>,
}

const fn default_pressure() -> f32 {
    1.0
}

impl Contact {
    /// Create a contact with no coalesced history.
    #[must_use]
    pub fn new(id: i32, tool_type: ToolType, x: f32, y: f32, pressure: f32) -> Self {
        Self {
            id,
            tool_type,
            x,
            y,
            pressure,
            history: Vec::new(),
        }
    }

    /// Attach coalesced samples (oldest first).
    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoricalSample>) -> Self {
        self.history = history;
        self
    }

    /// Whether the contact carries coalesced samples.
    #[must_use]
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}

/// A single platform input notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawContactFrame {
    /// Action of this frame.
    pub action: FrameAction,
    /// Boot-relative time of this frame in milliseconds.
    pub event_time_ms: i64,
    /// Boot-relative time of the primary down that started the gesture.
    /// Absent means the gesture started with this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_time_ms: Option<i64>,
    /// All currently active contacts.
    pub contacts: Vec<Contact>,
}

impl RawContactFrame {
    /// Create a new frame.
    #[must_use]
    pub fn new(action: FrameAction, event_time_ms: i64, contacts: Vec<Contact>) -> Self {
        Self {
            action,
            event_time_ms,
            down_time_ms: None,
            contacts,
        }
    }

    /// Set the gesture down time.
    #[must_use]
    pub fn with_down_time(mut self, down_time_ms: i64) -> Self {
        self.down_time_ms = Some(down_time_ms);
        self
    }

    /// Gesture down time, falling back to this frame's time when unset.
    #[must_use]
    pub fn gesture_down_time_ms(&self) -> i64 {
        self.down_time_ms.unwrap_or(self.event_time_ms)
    }

    /// Whether this action affects exactly one contact of a multi-contact frame.
    #[must_use]
    pub const fn is_pointer_index_action(&self) -> bool {
        matches!(
            self.action,
            FrameAction::PointerDown { .. } | FrameAction::PointerUp { .. }
        )
    }

    /// Index of the affected contact for pointer-index actions.
    #[must_use]
    pub const fn pointer_index(&self) -> Option<usize> {
        match self.action {
            FrameAction::PointerDown { index } | FrameAction::PointerUp { index } => Some(index),
            _ => None,
        }
    }

    /// The first contact of the frame.
    #[must_use]
    pub fn primary_contact(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    /// Check structural consistency.
    ///
    /// # Errors
    ///
    /// Returns [`InkError::InvalidFrame`] when the frame has no contacts or a
    /// pointer-index action points outside `contacts`.
    pub fn validate(&self) -> InkResult<()> {
        if self.contacts.is_empty() {
            return Err(InkError::InvalidFrame("frame has no contacts".to_string()));
        }
        if let Some(index) = self.pointer_index() {
            if index >= self.contacts.len() {
                return Err(InkError::InvalidFrame(format!(
                    "pointer index {index} out of range for {} contacts",
                    self.contacts.len()
                )));
            }
        }
        Ok(())
    }
}
