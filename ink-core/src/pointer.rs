//! Normalized pointer events delivered to the ink engine.

use serde::{Deserialize, Serialize};

/// Logical input device classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    /// Stylus input, captured as ink strokes.
    Pen,
    /// Finger or mouse input, used for gestures and manipulation.
    Touch,
}

/// Lifecycle stage of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventType {
    /// Pointer made contact.
    Down,
    /// Pointer moved while in contact.
    Move,
    /// Pointer lifted.
    Up,
    /// Pointer stream aborted by the platform.
    Cancel,
}

/// A single normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Lifecycle stage.
    pub event_type: PointerEventType,
    /// X position in view coordinates.
    pub x: f32,
    /// Y position in view coordinates.
    pub y: f32,
    /// Absolute wall-clock timestamp in milliseconds.
    pub t: i64,
    /// Contact pressure as reported by the platform.
    pub pressure: f32,
    /// Logical device classification.
    pub pointer_type: PointerType,
    /// Stable identifier of the contact.
    pub pointer_id: i32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(
        event_type: PointerEventType,
        x: f32,
        y: f32,
        t: i64,
        pressure: f32,
        pointer_type: PointerType,
        pointer_id: i32,
    ) -> Self {
        Self {
            event_type,
            x,
            y,
            t,
            pressure,
            pointer_type,
            pointer_id,
        }
    }

    /// Create a move event.
    #[must_use]
    pub const fn moved(
        x: f32,
        y: f32,
        t: i64,
        pressure: f32,
        pointer_type: PointerType,
        pointer_id: i32,
    ) -> Self {
        Self::new(
            PointerEventType::Move,
            x,
            y,
            t,
            pressure,
            pointer_type,
            pointer_id,
        )
    }
}
