//! In-memory stand-in for the ink engine.
//!
//! Records everything the normalizer delivers and keeps a view offset clamped
//! to the content bounds. The whole content area is a single text block.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use ink_core::{
    ContentBlock, LayerKind, PointerConsumer, PointerEvent, PointerEventType, PointerType,
    RenderTarget, ViewOffset,
};
use serde::{Deserialize, Serialize};

/// Identifier of the single content block.
pub const ROOT_BLOCK_ID: &str = "root";

/// One delivery recorded by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EngineRecord {
    /// A pointer event, either immediate or part of a coalesced batch.
    Pointer {
        /// The event.
        #[serde(flatten)]
        event: PointerEvent,
        /// Whether it arrived in a historical batch.
        historical: bool,
    },
    /// A pointer cancellation.
    Cancel {
        /// The cancelled pointer.
        pointer_id: i32,
    },
}

/// In-memory engine used by the demo host.
#[derive(Debug)]
pub struct DemoEngine {
    viewport: (f32, f32),
    content: (f32, f32),
    scroll_allowed: bool,
    offset: Mutex<ViewOffset>,
    records: Mutex<Vec<EngineRecord>>,
    invalidations: AtomicUsize,
}

impl DemoEngine {
    /// Create an engine showing `content` through a `viewport`.
    #[must_use]
    pub fn new(viewport: (f32, f32), content: (f32, f32), scroll_allowed: bool) -> Self {
        Self {
            viewport,
            content,
            scroll_allowed,
            offset: Mutex::new(ViewOffset::default()),
            records: Mutex::new(Vec::new()),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// Remove and return everything recorded so far.
    pub fn take_records(&self) -> Vec<EngineRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of redraw requests received.
    #[must_use]
    pub fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::Relaxed)
    }

    fn record(&self, record: EngineRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    #[allow(clippy::too_many_arguments)]
    fn immediate(
        &self,
        event_type: PointerEventType,
        x: f32,
        y: f32,
        t: i64,
        pressure: f32,
        kind: PointerType,
        id: i32,
    ) {
        self.record(EngineRecord::Pointer {
            event: PointerEvent::new(event_type, x, y, t, pressure, kind, id),
            historical: false,
        });
    }
}

impl PointerConsumer for DemoEngine {
    fn pointer_down(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
        self.immediate(PointerEventType::Down, x, y, t, pressure, kind, id);
    }

    fn pointer_move(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
        self.immediate(PointerEventType::Move, x, y, t, pressure, kind, id);
    }

    fn pointer_up(&self, x: f32, y: f32, t: i64, pressure: f32, kind: PointerType, id: i32) {
        self.immediate(PointerEventType::Up, x, y, t, pressure, kind, id);
    }

    fn pointer_cancel(&self, id: i32) {
        self.record(EngineRecord::Cancel { pointer_id: id });
    }

    fn pointer_events(&self, events: &[PointerEvent], historical: bool) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.extend(events.iter().map(|event| EngineRecord::Pointer {
            event: *event,
            historical,
        }));
    }

    fn is_scroll_allowed(&self) -> bool {
        self.scroll_allowed
    }

    fn hit_block(&self, x: f32, y: f32) -> Option<ContentBlock> {
        let offset = self.view_offset();
        let (cx, cy) = (x + offset.x, y + offset.y);
        let inside = (0.0..self.content.0).contains(&cx) && (0.0..self.content.1).contains(&cy);
        inside.then(|| ContentBlock::new(ROOT_BLOCK_ID, "Text"))
    }

    fn view_offset(&self) -> ViewOffset {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clamp_view_offset(&self, offset: ViewOffset) -> ViewOffset {
        let max_x = (self.content.0 - self.viewport.0).max(0.0);
        let max_y = (self.content.1 - self.viewport.1).max(0.0);
        ViewOffset::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    fn set_view_offset(&self, offset: ViewOffset) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) = offset;
    }
}

impl RenderTarget for DemoEngine {
    fn invalidate(&self, layers: &[LayerKind]) {
        tracing::trace!(?layers, "invalidate");
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }
}
