//! # Ink Core
//!
//! Pointer input normalization for digital ink engines.
//!
//! Platform multi-touch frames go in; pointer lifecycle events tagged as pen
//! or touch come out, ready for a stroke-consuming engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  ink-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Raw Input       │  Normalizer              │
//! │  - Contact frame │  - Tool classification   │
//! │  - Coalesced     │  - Per-contact dispatch  │
//! │    samples       │  - History batching      │
//! ├─────────────────────────────────────────────┤
//! │  Gestures        │  Session                 │
//! │  - Scroll / pan  │  - Input mode            │
//! │  - Long press    │  - Last document         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod consumer;
pub mod error;
pub mod event;
pub mod gesture;
pub mod normalizer;
pub mod pointer;
pub mod policy;
pub mod session;

pub use clock::EventClock;
pub use consumer::{
    ContentBlock, LayerKind, LongPressListener, PointerConsumer, RenderTarget, ViewOffset,
};
pub use error::{InkError, InkResult};
pub use event::{Contact, FrameAction, HistoricalSample, RawContactFrame, ToolType};
pub use gesture::{Gesture, GestureConfig, GestureDetector};
pub use normalizer::{PointerInputNormalizer, SharedLongPressListener};
pub use pointer::{PointerEvent, PointerEventType, PointerType};
pub use policy::InputModePolicy;
pub use session::{DocumentRef, SessionState, SessionStore};

/// Ink core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
