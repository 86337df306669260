//! # Pointer Input Normalizer
//!
//! Translates platform multi-touch frames into the ink engine's pointer
//! lifecycle vocabulary.
//!
//! ```text
//! RawContactFrame ──► per-contact dispatch ──► classify (policy + tool)
//!                                                  │
//!                          Touch ──► GestureDetector ──► scroll / long press
//!                                                  │
//!                                                  ▼
//!                      pointer_down / pointer_move / pointer_events / pointer_up / pointer_cancel
//! ```
//!
//! Pointer-index actions (a contact joining or leaving an active gesture) are
//! dispatched for the affected contact only. Every other action is dispatched
//! for each active contact, and the frame is consumed if any contact was.

use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::EventClock;
use crate::consumer::{LayerKind, LongPressListener, PointerConsumer, RenderTarget, ViewOffset};
use crate::event::{Contact, FrameAction, RawContactFrame};
use crate::gesture::{Gesture, GestureConfig, GestureDetector};
use crate::policy::InputModePolicy;
use crate::pointer::{PointerEvent, PointerType};

/// Shared handle to a long-press listener.
pub type SharedLongPressListener = Arc<dyn LongPressListener>;

/// Normalizes raw contact frames into pointer events for a [`PointerConsumer`].
///
/// All methods take `&self`. The input mode and listener may be changed from
/// any thread; each frame is processed against one snapshot of the input mode.
///
/// # Example
///
/// ```
/// use ink_core::{EventClock, PointerInputNormalizer, RawContactFrame};
/// # use ink_core::{ContentBlock, LayerKind, PointerConsumer, PointerEvent, PointerType, RenderTarget, ViewOffset};
/// # struct Engine;
/// # impl PointerConsumer for Engine {
/// #     fn pointer_down(&self, _: f32, _: f32, _: i64, _: f32, _: PointerType, _: i32) {}
/// #     fn pointer_move(&self, _: f32, _: f32, _: i64, _: f32, _: PointerType, _: i32) {}
/// #     fn pointer_up(&self, _: f32, _: f32, _: i64, _: f32, _: PointerType, _: i32) {}
/// #     fn pointer_cancel(&self, _: i32) {}
/// #     fn pointer_events(&self, _: &[PointerEvent], _: bool) {}
/// #     fn is_scroll_allowed(&self) -> bool { false }
/// #     fn hit_block(&self, _: f32, _: f32) -> Option<ContentBlock> { None }
/// #     fn view_offset(&self) -> ViewOffset { ViewOffset::default() }
/// #     fn clamp_view_offset(&self, o: ViewOffset) -> ViewOffset { o }
/// #     fn set_view_offset(&self, _: ViewOffset) {}
/// # }
/// # struct View;
/// # impl RenderTarget for View { fn invalidate(&self, _: &[LayerKind]) {} }
///
/// let normalizer = PointerInputNormalizer::with_clock(View, Some(Engine), EventClock::from_offset(0));
/// let frame: RawContactFrame = serde_json::from_str(
///     r#"{"action":{"kind":"down"},"event_time_ms":10,
///         "contacts":[{"id":0,"tool_type":"stylus","x":1.0,"y":2.0}]}"#,
/// ).unwrap();
/// assert!(normalizer.on_touch(&frame));
/// ```
pub struct PointerInputNormalizer<C, R> {
    render_target: R,
    consumer: Option<C>,
    clock: EventClock,
    input_mode: Mutex<InputModePolicy>,
    listener: Mutex<Option<SharedLongPressListener>>,
    gestures: Mutex<GestureDetector>,
}

impl<C, R> std::fmt::Debug for PointerInputNormalizer<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerInputNormalizer")
            .field("attached", &self.consumer.is_some())
            .field("clock", &self.clock)
            .field("input_mode", &self.input_mode())
            .finish_non_exhaustive()
    }
}

impl<C, R> PointerInputNormalizer<C, R> {
    /// Create a normalizer, sampling the clock offset now.
    ///
    /// `uptime_now_ms` is the current reading of the monotonic clock that
    /// stamps incoming frames. The input mode starts as
    /// [`InputModePolicy::Auto`].
    #[must_use]
    pub fn new(render_target: R, consumer: Option<C>, uptime_now_ms: i64) -> Self {
        Self::with_clock(render_target, consumer, EventClock::capture(uptime_now_ms))
    }

    /// Create a normalizer with an explicit clock.
    #[must_use]
    pub fn with_clock(render_target: R, consumer: Option<C>, clock: EventClock) -> Self {
        Self {
            render_target,
            consumer,
            clock,
            input_mode: Mutex::new(InputModePolicy::default()),
            listener: Mutex::new(None),
            gestures: Mutex::new(GestureDetector::new()),
        }
    }

    /// Set the initial input mode.
    #[must_use]
    pub fn with_input_mode(self, mode: InputModePolicy) -> Self {
        self.set_input_mode(mode);
        self
    }

    /// Replace the gesture recognizer configuration.
    #[must_use]
    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.gestures = Mutex::new(GestureDetector::with_config(config));
        self
    }

    /// Current input mode.
    #[must_use]
    pub fn input_mode(&self) -> InputModePolicy {
        *self
            .input_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the input mode. Takes effect from the next frame.
    pub fn set_input_mode(&self, mode: InputModePolicy) {
        *self
            .input_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = mode;
        tracing::debug!(%mode, "input mode changed");
    }

    /// Install the long-press listener, replacing any previous one.
    pub fn set_listener(&self, listener: impl LongPressListener + 'static) {
        self.set_shared_listener(Some(Arc::new(listener)));
    }

    /// Install or clear a shared long-press listener.
    pub fn set_shared_listener(&self, listener: Option<SharedLongPressListener>) {
        *self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = listener;
    }

    /// Remove the long-press listener.
    pub fn clear_listener(&self) {
        self.set_shared_listener(None);
    }

    fn listener(&self) -> Option<SharedLongPressListener> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The timestamp alignment clock.
    #[must_use]
    pub const fn clock(&self) -> EventClock {
        self.clock
    }

    /// The attached consumer, if any.
    #[must_use]
    pub const fn consumer(&self) -> Option<&C> {
        self.consumer.as_ref()
    }

    /// The render target.
    #[must_use]
    pub const fn render_target(&self) -> &R {
        &self.render_target
    }
}

impl<C: PointerConsumer, R: RenderTarget> PointerInputNormalizer<C, R> {
    /// Process one raw frame. Returns whether it was consumed.
    pub fn on_touch(&self, frame: &RawContactFrame) -> bool {
        let Some(consumer) = self.consumer.as_ref() else {
            return false;
        };

        if let Err(e) = frame.validate() {
            tracing::debug!("Dropping frame: {e}");
            return false;
        }

        let mode = self.input_mode();

        if let Some(index) = frame.pointer_index() {
            return self.handle_contact(consumer, frame, mode, index);
        }

        let mut consumed = false;
        for index in 0..frame.contacts.len() {
            consumed |= self.handle_contact(consumer, frame, mode, index);
        }
        consumed
    }

    /// Fire overdue show-press and long-press gestures at `now_uptime_ms`.
    ///
    /// Returns whether any fired gesture was handled.
    pub fn poll_gestures(&self, now_uptime_ms: i64) -> bool {
        let Some(consumer) = self.consumer.as_ref() else {
            return false;
        };
        let gestures = self
            .gestures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .poll(now_uptime_ms);
        let mut handled = false;
        for gesture in gestures {
            handled |= self.on_gesture(consumer, gesture);
        }
        handled
    }

    fn handle_contact(
        &self,
        consumer: &C,
        frame: &RawContactFrame,
        mode: InputModePolicy,
        index: usize,
    ) -> bool {
        let contact = &frame.contacts[index];

        let Some(pointer_type) = mode.resolve(contact.tool_type) else {
            tracing::debug!(
                pointer_id = contact.id,
                tool = ?contact.tool_type,
                "unsupported tool type"
            );
            return false;
        };

        if pointer_type == PointerType::Touch {
            let gestures = self
                .gestures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .process(frame);
            for gesture in gestures {
                self.on_gesture(consumer, gesture);
            }
        }

        let t = self.clock.absolute(frame.event_time_ms);
        let id = contact.id;

        match frame.action {
            FrameAction::Down | FrameAction::PointerDown { .. } => {
                tracing::trace!(id, x = contact.x, y = contact.y, "pointer down");
                consumer.pointer_down(contact.x, contact.y, t, contact.pressure, pointer_type, id);
                true
            }
            FrameAction::Move => {
                if contact.has_history() {
                    let mut events = self.historical_moves(contact, pointer_type);
                    events.push(PointerEvent::moved(
                        contact.x,
                        contact.y,
                        t,
                        contact.pressure,
                        pointer_type,
                        id,
                    ));
                    tracing::trace!(id, count = events.len(), "pointer move batch");
                    consumer.pointer_events(&events, true);
                } else {
                    consumer.pointer_move(
                        contact.x,
                        contact.y,
                        t,
                        contact.pressure,
                        pointer_type,
                        id,
                    );
                }
                true
            }
            FrameAction::Up | FrameAction::PointerUp { .. } => {
                // The final position travels with the up event, not the batch.
                if contact.has_history() {
                    let events = self.historical_moves(contact, pointer_type);
                    tracing::trace!(id, count = events.len(), "pointer move batch before up");
                    consumer.pointer_events(&events, true);
                }
                tracing::trace!(id, x = contact.x, y = contact.y, "pointer up");
                consumer.pointer_up(contact.x, contact.y, t, contact.pressure, pointer_type, id);
                true
            }
            FrameAction::Cancel => {
                tracing::trace!(id, "pointer cancel");
                consumer.pointer_cancel(id);
                true
            }
            FrameAction::Other => false,
        }
    }

    fn historical_moves(&self, contact: &Contact, pointer_type: PointerType) -> Vec<PointerEvent> {
        contact
            .history
            .iter()
            .map(|sample| {
                PointerEvent::moved(
                    sample.x,
                    sample.y,
                    self.clock.absolute(sample.event_time_ms),
                    sample.pressure,
                    pointer_type,
                    contact.id,
                )
            })
            .collect()
    }

    fn on_gesture(&self, consumer: &C, gesture: Gesture) -> bool {
        match gesture {
            Gesture::LongPress { x, y } => {
                if let Some(listener) = self.listener() {
                    let block = consumer.hit_block(x, y);
                    tracing::debug!(x, y, block = ?block.as_ref().map(|b| &b.id), "long press");
                    listener.on_long_press(x, y, block.as_ref());
                }
                true
            }
            Gesture::Scroll {
                delta_x, delta_y, ..
            } => self.on_scroll(consumer, delta_x, delta_y),
            Gesture::Down { .. }
            | Gesture::ShowPress { .. }
            | Gesture::SingleTapUp { .. }
            | Gesture::Fling { .. } => false,
        }
    }

    fn on_scroll(&self, consumer: &C, delta_x: f32, delta_y: f32) -> bool {
        if !consumer.is_scroll_allowed() {
            return false;
        }
        let old = consumer.view_offset();
        let requested = ViewOffset::new(old.x - delta_x, old.y - delta_y);
        let clamped = consumer.clamp_view_offset(requested);
        consumer.set_view_offset(clamped);
        self.render_target.invalidate(&LayerKind::ALL);
        tracing::trace!(x = clamped.x, y = clamped.y, "view offset");
        true
    }
}
