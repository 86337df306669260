//! Capability traits implemented by the ink engine and its host view.
//!
//! The normalizer never owns engine state. It drives a [`PointerConsumer`],
//! asks a [`RenderTarget`] to redraw after panning, and notifies an optional
//! [`LongPressListener`]. All calls are synchronous on the dispatching thread.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pointer::{PointerEvent, PointerType};

/// Opaque reference to an engine-managed content block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Engine identifier of the block.
    pub id: String,
    /// Engine block type (e.g. `"Text"`, `"Drawing"`).
    pub block_type: String,
}

impl ContentBlock {
    /// Create a new block reference.
    #[must_use]
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
        }
    }
}

/// Render offset of the view into the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOffset {
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
}

impl ViewOffset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Render layers a target can refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Page background and guides.
    Background,
    /// Committed content.
    Model,
    /// Transient content such as selections.
    Temporary,
    /// Ink being captured.
    Capture,
}

impl LayerKind {
    /// Every layer.
    pub const ALL: [Self; 4] = [Self::Background, Self::Model, Self::Temporary, Self::Capture];
}

/// The stroke-consuming engine.
pub trait PointerConsumer {
    /// A pointer made contact.
    fn pointer_down(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32);

    /// A pointer moved.
    fn pointer_move(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32);

    /// A pointer lifted.
    fn pointer_up(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32);

    /// The pointer stream was aborted.
    fn pointer_cancel(&self, id: i32);

    /// A batch of events. When `historical` is set the events were coalesced by
    /// the platform and should be applied as a fast-forward.
    fn pointer_events(&self, events: &[PointerEvent], historical: bool);

    /// Whether panning the view is currently allowed.
    fn is_scroll_allowed(&self) -> bool;

    /// Content block at the given view coordinates.
    fn hit_block(&self, x: f32, y: f32) -> Option<ContentBlock>;

    /// Current render offset.
    fn view_offset(&self) -> ViewOffset;

    /// Clamp a requested offset to valid bounds.
    fn clamp_view_offset(&self, offset: ViewOffset) -> ViewOffset;

    /// Apply a new render offset.
    fn set_view_offset(&self, offset: ViewOffset);
}

/// The surface that displays engine output.
pub trait RenderTarget {
    /// Request a redraw of the given layers.
    fn invalidate(&self, layers: &[LayerKind]);
}

/// Receives long-press notifications on touch contacts.
pub trait LongPressListener: Send + Sync {
    /// A long press happened at `(x, y)` over `block`, if any.
    fn on_long_press(&self, x: f32, y: f32, block: Option<&ContentBlock>);
}

impl<F> LongPressListener for F
where
    F: Fn(f32, f32, Option<&ContentBlock>) + Send + Sync,
{
    fn on_long_press(&self, x: f32, y: f32, block: Option<&ContentBlock>) {
        self(x, y, block);
    }
}

macro_rules! forward_pointer_consumer {
    ($($wrapper:ty),*) => {$(
        impl<T: PointerConsumer + ?Sized> PointerConsumer for $wrapper {
            fn pointer_down(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
                (**self).pointer_down(x, y, t, pressure, kind, id);
            }
            fn pointer_move(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
                (**self).pointer_move(x, y, t, pressure, kind, id);
            }
            fn pointer_up(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
                (**self).pointer_up(x, y, t, pressure, kind, id);
            }
            fn pointer_cancel(&self, id: i32) {
                (**self).pointer_cancel(id);
            }
            fn pointer_events(&self, events: &[PointerEvent], historical: bool) {
                (**self).pointer_events(events, historical);
            }
            fn is_scroll_allowed(&self) -> bool {
                (**self).is_scroll_allowed()
            }
            fn hit_block(&self, x: f32, y: f32) -> Option<ContentBlock> {
                (**self).hit_block(x, y)
            }
            fn view_offset(&self) -> ViewOffset {
                (**self).view_offset()
            }
            fn clamp_view_offset(&self, offset: ViewOffset) -> ViewOffset {
                (**self).clamp_view_offset(offset)
            }
            fn set_view_offset(&self, offset: ViewOffset) {
                (**self).set_view_offset(offset);
            }
        }

        impl<T: RenderTarget + ?Sized> RenderTarget for $wrapper {
            fn invalidate(&self, layers: &[LayerKind]) {
                (**self).invalidate(layers);
            }
        }
    )*};
}

forward_pointer_consumer!(&T, Arc<T>, Box<T>);
