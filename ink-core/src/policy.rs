//! Input mode policy: how hardware tool types map to logical pointer types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InkError;
use crate::event::ToolType;
use crate::pointer::PointerType;

/// Session-wide policy for classifying contacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputModePolicy {
    /// Classify from the hardware tool type.
    #[default]
    Auto,
    /// Every contact is a pen.
    ForcePen,
    /// Every contact is touch.
    ForceTouch,
    /// No forced mode; classifies like [`InputModePolicy::Auto`].
    None,
}

impl InputModePolicy {
    /// Resolve the logical pointer type of a contact.
    ///
    /// Returns `None` when the tool type cannot be classified; the contact is
    /// then skipped.
    #[must_use]
    pub const fn resolve(self, tool_type: ToolType) -> Option<PointerType> {
        match self {
            Self::ForcePen => Some(PointerType::Pen),
            Self::ForceTouch => Some(PointerType::Touch),
            Self::Auto | Self::None => match tool_type {
                ToolType::Stylus => Some(PointerType::Pen),
                ToolType::Finger | ToolType::Mouse => Some(PointerType::Touch),
                ToolType::Eraser | ToolType::Unknown => None,
            },
        }
    }

    /// Legacy integer code, as stored in saved instance state.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::None => -1,
            Self::ForcePen => 0,
            Self::ForceTouch => 1,
            Self::Auto => 2,
        }
    }

    /// Parse a legacy integer code.
    ///
    /// # Errors
    ///
    /// Returns [`InkError::UnknownInputMode`] for codes outside `-1..=2`.
    pub fn from_code(code: i32) -> Result<Self, InkError> {
        match code {
            -1 => Ok(Self::None),
            0 => Ok(Self::ForcePen),
            1 => Ok(Self::ForceTouch),
            2 => Ok(Self::Auto),
            other => Err(InkError::UnknownInputMode(other.to_string())),
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ForcePen => "force-pen",
            Self::ForceTouch => "force-touch",
            Self::None => "none",
        }
    }
}

impl fmt::Display for InputModePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputModePolicy {
    type Err = InkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(Self::Auto),
            "force-pen" | "pen" => Ok(Self::ForcePen),
            "force-touch" | "touch" => Ok(Self::ForceTouch),
            "none" => Ok(Self::None),
            _ => Err(InkError::UnknownInputMode(s.to_string())),
        }
    }
}
