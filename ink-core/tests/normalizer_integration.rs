//! Pointer Normalizer Integration Tests
//!
//! Tests the complete frame-to-pointer-event flow including:
//! - Tool classification under each input mode
//! - Coalesced history batching for move and up
//! - Multi-contact dispatch
//! - Gesture side channel (pan, long press)
//! - Pointer lifecycle over a recorded stream

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ink_core::{
    Contact, ContentBlock, EventClock, FrameAction, HistoricalSample, InputModePolicy, LayerKind,
    PointerConsumer, PointerEvent, PointerEventType, PointerInputNormalizer, PointerType,
    RawContactFrame, RenderTarget, ToolType, ViewOffset,
};
use proptest::prelude::*;

const OFFSET_MS: i64 = 1_700_000_000_000;

/// One call received by the engine.
#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Single(PointerEvent),
    Cancel(i32),
    Batch(Vec<PointerEvent>, bool),
}

/// Engine double that records every call.
#[derive(Debug, Default)]
struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    scroll_allowed: bool,
    offset: Mutex<ViewOffset>,
    requested_offsets: Mutex<Vec<ViewOffset>>,
    max_offset: Option<ViewOffset>,
}

impl RecordingEngine {
    fn with_scroll(offset: ViewOffset) -> Self {
        Self {
            scroll_allowed: true,
            offset: Mutex::new(offset),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Every event in delivery order, batches flattened.
    fn events(&self) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        for call in self.calls() {
            match call {
                EngineCall::Single(e) => out.push(e),
                EngineCall::Batch(events, _) => out.extend(events),
                EngineCall::Cancel(id) => out.push(PointerEvent::new(
                    PointerEventType::Cancel,
                    0.0,
                    0.0,
                    0,
                    0.0,
                    PointerType::Touch,
                    id,
                )),
            }
        }
        out
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    #[allow(clippy::too_many_arguments)]
    fn single(&self, kind: PointerEventType, x: f32, y: f32, t: i64, p: f32, k: PointerType, id: i32) {
        self.record(EngineCall::Single(PointerEvent::new(kind, x, y, t, p, k, id)));
    }
}

impl PointerConsumer for RecordingEngine {
    fn pointer_down(&self, x: f32, y: f32, t: i64, p: f32, k: PointerType, id: i32) {
        self.single(PointerEventType::Down, x, y, t, p, k, id);
    }

    fn pointer_move(&self, x: f32, y: f32, t: i64, p: f32, k: PointerType, id: i32) {
        self.single(PointerEventType::Move, x, y, t, p, k, id);
    }

    fn pointer_up(&self, x: f32, y: f32, t: i64, p: f32, k: PointerType, id: i32) {
        self.single(PointerEventType::Up, x, y, t, p, k, id);
    }

    fn pointer_cancel(&self, id: i32) {
        self.record(EngineCall::Cancel(id));
    }

    fn pointer_events(&self, events: &[PointerEvent], historical: bool) {
        self.record(EngineCall::Batch(events.to_vec(), historical));
    }

    fn is_scroll_allowed(&self) -> bool {
        self.scroll_allowed
    }

    fn hit_block(&self, x: f32, y: f32) -> Option<ContentBlock> {
        (x >= 0.0 && y >= 0.0).then(|| ContentBlock::new("block-1", "Text"))
    }

    fn view_offset(&self) -> ViewOffset {
        *self.offset.lock().expect("offset lock")
    }

    fn clamp_view_offset(&self, offset: ViewOffset) -> ViewOffset {
        self.requested_offsets
            .lock()
            .expect("requested lock")
            .push(offset);
        match self.max_offset {
            Some(max) => ViewOffset::new(offset.x.clamp(0.0, max.x), offset.y.clamp(0.0, max.y)),
            None => offset,
        }
    }

    fn set_view_offset(&self, offset: ViewOffset) {
        *self.offset.lock().expect("offset lock") = offset;
    }
}

/// Render target double that counts invalidations.
#[derive(Debug, Default)]
struct CountingView {
    invalidations: Mutex<Vec<Vec<LayerKind>>>,
}

impl CountingView {
    fn count(&self) -> usize {
        self.invalidations.lock().expect("view lock").len()
    }
}

impl RenderTarget for CountingView {
    fn invalidate(&self, layers: &[LayerKind]) {
        self.invalidations
            .lock()
            .expect("view lock")
            .push(layers.to_vec());
    }
}

type Normalizer<'a> = PointerInputNormalizer<&'a RecordingEngine, Arc<CountingView>>;

fn normalizer(engine: &RecordingEngine) -> (Normalizer<'_>, Arc<CountingView>) {
    let view = Arc::new(CountingView::default());
    let normalizer = PointerInputNormalizer::with_clock(
        Arc::clone(&view),
        Some(engine),
        EventClock::from_offset(OFFSET_MS),
    );
    (normalizer, view)
}

/// Create a frame with a single contact.
fn single(action: FrameAction, t: i64, id: i32, tool: ToolType, x: f32, y: f32) -> RawContactFrame {
    RawContactFrame::new(action, t, vec![Contact::new(id, tool, x, y, 0.6)]).with_down_time(0)
}

/// Create `n` coalesced samples ending just before `t`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn history(n: usize, t: i64) -> Vec<HistoricalSample> {
    (0..n)
        .map(|i| HistoricalSample {
            x: 100.0 + i as f32,
            y: 200.0 + i as f32,
            pressure: 0.1 * (i as f32 + 1.0),
            event_time_ms: t - (n - i) as i64,
        })
        .collect()
}

fn tool_strategy() -> impl Strategy<Value = ToolType> {
    prop_oneof![
        Just(ToolType::Stylus),
        Just(ToolType::Finger),
        Just(ToolType::Mouse),
        Just(ToolType::Eraser),
        Just(ToolType::Unknown),
    ]
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_stylus_down_under_auto_is_single_pen_down() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let consumed = normalizer.on_touch(&single(FrameAction::Down, 40, 3, ToolType::Stylus, 5.0, 6.0));

    assert!(consumed);
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Single(PointerEvent::new(
            PointerEventType::Down,
            5.0,
            6.0,
            OFFSET_MS + 40,
            0.6,
            PointerType::Pen,
            3,
        ))]
    );
}

#[test]
fn test_finger_move_with_history_batches_and_feeds_gestures() {
    let engine = RecordingEngine::with_scroll(ViewOffset::new(500.0, 500.0));
    let (normalizer, view) = normalizer(&engine);

    assert!(normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Finger, 0.0, 0.0)));

    let mut frame = single(FrameAction::Move, 20, 1, ToolType::Finger, 60.0, 40.0);
    frame.contacts[0] = frame.contacts[0].clone().with_history(history(3, 20));
    assert!(normalizer.on_touch(&frame));

    let calls = engine.calls();
    let EngineCall::Batch(events, historical) = &calls[1] else {
        panic!("Expected batch, got {:?}", calls[1]);
    };
    assert!(*historical);
    assert_eq!(events.len(), 4);
    assert!(events
        .iter()
        .all(|e| e.event_type == PointerEventType::Move && e.pointer_type == PointerType::Touch));

    // The gesture recognizer saw the frame and panned the view.
    assert_eq!(engine.view_offset(), ViewOffset::new(440.0, 460.0));
    assert_eq!(view.count(), 1);
}

#[test]
fn test_eraser_down_under_auto_is_rejected() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let consumed = normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Eraser, 0.0, 0.0));

    assert!(!consumed);
    assert!(engine.calls().is_empty());
}

// ============================================================================
// Batching Tests
// ============================================================================

#[test]
fn test_up_with_history_flushes_then_ups_at_current_position() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let mut frame = single(FrameAction::Up, 30, 9, ToolType::Stylus, 7.0, 8.0);
    frame.contacts[0] = frame.contacts[0].clone().with_history(history(2, 30));
    assert!(normalizer.on_touch(&frame));

    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        EngineCall::Batch(events, true) => {
            assert_eq!(events.len(), 2);
            assert!(events.iter().all(|e| (e.x - 7.0).abs() > f32::EPSILON));
        }
        other => panic!("Expected historical batch, got {other:?}"),
    }
    assert_eq!(
        calls[1],
        EngineCall::Single(PointerEvent::new(
            PointerEventType::Up,
            7.0,
            8.0,
            OFFSET_MS + 30,
            0.6,
            PointerType::Pen,
            9,
        ))
    );
}

#[test]
fn test_move_without_history_is_immediate() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    assert!(normalizer.on_touch(&single(FrameAction::Move, 30, 9, ToolType::Stylus, 7.0, 8.0)));

    assert!(matches!(
        engine.calls().as_slice(),
        [EngineCall::Single(e)] if e.event_type == PointerEventType::Move
    ));
}

#[test]
fn test_cancel_ignores_position_fields() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let mut frame = single(FrameAction::Cancel, 30, 11, ToolType::Stylus, 999.0, -1.0);
    frame.contacts[0] = frame.contacts[0].clone().with_history(history(4, 30));
    assert!(normalizer.on_touch(&frame));

    assert_eq!(engine.calls(), vec![EngineCall::Cancel(11)]);
}

// ============================================================================
// Multi-Contact Tests
// ============================================================================

#[test]
fn test_two_finger_stream_terminates_every_pointer() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let a = |x| Contact::new(0, ToolType::Stylus, x, 0.0, 1.0);
    let b = |x| Contact::new(1, ToolType::Finger, x, 50.0, 1.0);
    let frames = vec![
        RawContactFrame::new(FrameAction::Down, 0, vec![a(0.0)]),
        RawContactFrame::new(FrameAction::PointerDown { index: 1 }, 10, vec![a(1.0), b(0.0)]),
        RawContactFrame::new(FrameAction::Move, 20, vec![a(2.0), b(1.0)]),
        RawContactFrame::new(FrameAction::PointerUp { index: 0 }, 30, vec![a(3.0), b(2.0)]),
        RawContactFrame::new(FrameAction::Move, 40, vec![b(3.0)]),
        RawContactFrame::new(FrameAction::Up, 50, vec![b(4.0)]),
    ];
    for frame in &frames {
        assert!(normalizer.on_touch(frame));
    }

    let mut open: HashMap<i32, usize> = HashMap::new();
    let mut terminals: HashMap<i32, usize> = HashMap::new();
    for event in engine.events() {
        match event.event_type {
            PointerEventType::Down => *open.entry(event.pointer_id).or_default() += 1,
            PointerEventType::Up | PointerEventType::Cancel => {
                *terminals.entry(event.pointer_id).or_default() += 1;
            }
            PointerEventType::Move => {}
        }
    }
    assert_eq!(open, HashMap::from([(0, 1), (1, 1)]));
    assert_eq!(terminals, open);

    let types: HashMap<i32, PointerType> = engine
        .events()
        .iter()
        .map(|e| (e.pointer_id, e.pointer_type))
        .collect();
    assert_eq!(types[&0], PointerType::Pen);
    assert_eq!(types[&1], PointerType::Touch);
}

#[test]
fn test_cancel_frame_cancels_every_contact() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    let frame = RawContactFrame::new(
        FrameAction::Cancel,
        10,
        vec![
            Contact::new(4, ToolType::Stylus, 0.0, 0.0, 1.0),
            Contact::new(5, ToolType::Finger, 0.0, 0.0, 1.0),
        ],
    );
    assert!(normalizer.on_touch(&frame));
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Cancel(4), EngineCall::Cancel(5)]
    );
}

// ============================================================================
// Gesture Side Channel Tests
// ============================================================================

#[test]
fn test_pan_requests_old_minus_delta_then_clamps() {
    let engine = RecordingEngine {
        max_offset: Some(ViewOffset::new(1_000.0, 1_000.0)),
        ..RecordingEngine::with_scroll(ViewOffset::new(10.0, 300.0))
    };
    let (normalizer, view) = normalizer(&engine);

    normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Finger, 100.0, 100.0));
    normalizer.on_touch(&single(FrameAction::Move, 16, 1, ToolType::Finger, 150.0, 80.0));

    let requested = engine.requested_offsets.lock().expect("requested lock").clone();
    assert_eq!(requested, vec![ViewOffset::new(-40.0, 320.0)]);
    assert_eq!(engine.view_offset(), ViewOffset::new(0.0, 320.0));
    assert_eq!(view.count(), 1);
    assert_eq!(
        view.invalidations.lock().expect("view lock")[0],
        LayerKind::ALL.to_vec()
    );
}

#[test]
fn test_pan_disallowed_changes_nothing() {
    let engine = RecordingEngine {
        offset: Mutex::new(ViewOffset::new(10.0, 10.0)),
        ..RecordingEngine::default()
    };
    let (normalizer, view) = normalizer(&engine);

    normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Finger, 100.0, 100.0));
    normalizer.on_touch(&single(FrameAction::Move, 16, 1, ToolType::Finger, 150.0, 80.0));

    assert_eq!(engine.view_offset(), ViewOffset::new(10.0, 10.0));
    assert!(engine.requested_offsets.lock().expect("requested lock").is_empty());
    assert_eq!(view.count(), 0);
}

#[test]
fn test_pen_strokes_never_pan() {
    let engine = RecordingEngine::with_scroll(ViewOffset::default());
    let (normalizer, view) = normalizer(&engine);

    normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Stylus, 100.0, 100.0));
    normalizer.on_touch(&single(FrameAction::Move, 16, 1, ToolType::Stylus, 300.0, 300.0));

    assert_eq!(engine.view_offset(), ViewOffset::default());
    assert_eq!(view.count(), 0);
}

#[test]
fn test_long_press_hit_tests_press_position() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);
    let presses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&presses);
    normalizer.set_listener(move |x: f32, y: f32, block: Option<&ContentBlock>| {
        sink.lock()
            .expect("presses lock")
            .push((x, y, block.map(|b| b.id.clone())));
    });

    normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Finger, 12.0, 34.0));
    // Slight jitter inside the slop does not cancel the press.
    normalizer.on_touch(&single(FrameAction::Move, 300, 1, ToolType::Finger, 13.0, 34.0));
    normalizer.on_touch(&single(FrameAction::Move, 650, 1, ToolType::Finger, 13.0, 35.0));

    assert_eq!(
        presses.lock().expect("presses lock").as_slice(),
        &[(12.0, 34.0, Some("block-1".to_string()))]
    );
}

#[test]
fn test_cleared_listener_is_not_called() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);
    let presses = Arc::new(Mutex::new(0_u32));
    let sink = Arc::clone(&presses);
    normalizer.set_listener(move |_: f32, _: f32, _: Option<&ContentBlock>| {
        *sink.lock().expect("presses lock") += 1;
    });
    normalizer.clear_listener();

    normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Finger, 12.0, 34.0));
    normalizer.poll_gestures(1_000);

    assert_eq!(*presses.lock().expect("presses lock"), 0);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_input_mode_set_from_another_thread() {
    let engine = RecordingEngine::default();
    let (normalizer, _) = normalizer(&engine);

    std::thread::scope(|scope| {
        scope.spawn(|| normalizer.set_input_mode(InputModePolicy::ForcePen));
    });

    assert_eq!(normalizer.input_mode(), InputModePolicy::ForcePen);
    assert!(normalizer.on_touch(&single(FrameAction::Down, 0, 1, ToolType::Eraser, 0.0, 0.0)));
    assert!(matches!(
        engine.calls().as_slice(),
        [EngineCall::Single(e)] if e.pointer_type == PointerType::Pen
    ));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_classification_follows_policy(tool in tool_strategy()) {
        for (mode, expected) in [
            (InputModePolicy::ForcePen, Some(PointerType::Pen)),
            (InputModePolicy::ForceTouch, Some(PointerType::Touch)),
        ] {
            prop_assert_eq!(mode.resolve(tool), expected);
        }
        if tool == ToolType::Stylus {
            prop_assert_eq!(InputModePolicy::Auto.resolve(tool), Some(PointerType::Pen));
        }
    }

    #[test]
    fn prop_move_emits_history_plus_current(n in 1_usize..32) {
        let engine = RecordingEngine::default();
        let (normalizer, _) = normalizer(&engine);
        let mut frame = single(FrameAction::Move, 1_000, 2, ToolType::Stylus, -1.0, -1.0);
        frame.contacts[0] = frame.contacts[0].clone().with_history(history(n, 1_000));

        prop_assert!(normalizer.on_touch(&frame));
        let calls = engine.calls();
        prop_assert_eq!(calls.len(), 1);
        let EngineCall::Batch(events, true) = &calls[0] else {
            return Err(TestCaseError::fail("expected historical batch"));
        };
        prop_assert_eq!(events.len(), n + 1);
        prop_assert!(events.windows(2).all(|w| w[0].t < w[1].t));
        let last = events[n];
        prop_assert_eq!((last.x, last.y, last.t), (-1.0, -1.0, OFFSET_MS + 1_000));
    }

    #[test]
    fn prop_up_emits_history_then_up(n in 0_usize..32) {
        let engine = RecordingEngine::default();
        let (normalizer, _) = normalizer(&engine);
        let mut frame = single(FrameAction::Up, 1_000, 2, ToolType::Stylus, -1.0, -1.0);
        frame.contacts[0] = frame.contacts[0].clone().with_history(history(n, 1_000));

        prop_assert!(normalizer.on_touch(&frame));
        let events = engine.events();
        prop_assert_eq!(events.len(), n + 1);
        prop_assert!(events[..n].iter().all(|e| e.event_type == PointerEventType::Move));
        prop_assert_eq!(events[n].event_type, PointerEventType::Up);
        prop_assert_eq!((events[n].x, events[n].y), (-1.0, -1.0));
    }

    #[test]
    fn prop_cancel_is_single_id_only(
        x in -1_000.0_f32..1_000.0,
        y in -1_000.0_f32..1_000.0,
        id in 0_i32..64,
        tool in tool_strategy(),
    ) {
        let engine = RecordingEngine::default();
        let (normalizer, _) = normalizer(&engine);
        let consumed = normalizer
            .with_input_mode(InputModePolicy::ForcePen)
            .on_touch(&single(FrameAction::Cancel, 5, id, tool, x, y));
        prop_assert!(consumed);
        prop_assert_eq!(engine.calls(), vec![EngineCall::Cancel(id)]);
    }
}
