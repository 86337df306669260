//! # Gesture Recognition
//!
//! Single-finger gesture recognizer for touch-classified input.
//!
//! The detector consumes whole [`RawContactFrame`]s and reports
//! [`Gesture`]s: down, show-press, single-tap-up, long-press, scroll and
//! fling. There are no timer threads. Show-press and long-press deadlines are
//! checked against the timestamp of each incoming frame, and the owner may call
//! [`GestureDetector::poll`] between frames to fire overdue deadlines.
//!
//! ```text
//! Down ──► (tap_timeout) ShowPress ──► (long_press_timeout) LongPress
//!   │                                        │
//!   ├── focus leaves slop ──► Scroll* ──► Up ──► Fling (fast enough)
//!   └── Up inside slop, no long press ──► SingleTapUp
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::event::{FrameAction, RawContactFrame};

/// Maximum number of velocity samples retained.
const MAX_VELOCITY_SAMPLES: usize = 20;

/// Configuration for gesture recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Distance the focus may travel before a tap becomes a scroll (pixels).
    pub touch_slop: f32,
    /// Delay before a press is shown (milliseconds).
    pub tap_timeout_ms: i64,
    /// Delay before a stationary press becomes a long press (milliseconds).
    pub long_press_timeout_ms: i64,
    /// Minimum release velocity for a fling (pixels per second).
    pub min_fling_velocity: f32,
    /// Maximum reported fling velocity (pixels per second).
    pub max_fling_velocity: f32,
    /// Window of recent samples used to estimate velocity (milliseconds).
    pub velocity_window_ms: i64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            tap_timeout_ms: 100,
            long_press_timeout_ms: 500,
            min_fling_velocity: 50.0,
            max_fling_velocity: 8_000.0,
            velocity_window_ms: 100,
        }
    }
}

/// Gestures recognized from touch input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "data")]
#[allow(missing_docs)] // Enum variant fields documented at variant level
pub enum Gesture {
    /// A gesture started at the given point.
    Down { x: f32, y: f32 },

    /// The press has been held long enough to show feedback.
    ShowPress { x: f32, y: f32 },

    /// A tap was released without moving or long-pressing.
    SingleTapUp { x: f32, y: f32 },

    /// The press was held in place past the long-press timeout.
    /// Coordinates are those of the initial down.
    LongPress { x: f32, y: f32 },

    /// The focus moved. `delta_x`/`delta_y` are the focus movement since the
    /// previous scroll report (current minus previous).
    Scroll {
        start_x: f32,
        start_y: f32,
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
    },

    /// The gesture ended with the focus moving fast (pixels per second).
    Fling {
        start_x: f32,
        start_y: f32,
        velocity_x: f32,
        velocity_y: f32,
    },
}

#[derive(Debug, Clone)]
struct Tracking {
    down_x: f32,
    down_y: f32,
    down_time_ms: i64,
    focus_down_x: f32,
    focus_down_y: f32,
    last_focus_x: f32,
    last_focus_y: f32,
    always_in_tap_region: bool,
    show_press_pending: bool,
    long_press_pending: bool,
    in_long_press: bool,
    samples: VecDeque<(i64, f32, f32)>,
}

/// Single-finger gesture recognizer.
#[derive(Debug, Default)]
pub struct GestureDetector {
    config: GestureConfig,
    tracking: Option<Tracking>,
}

impl GestureDetector {
    /// Create a detector with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    /// Create a detector with custom configuration.
    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            tracking: None,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// Whether the current gesture has become a long press.
    #[must_use]
    pub fn in_long_press(&self) -> bool {
        self.tracking.as_ref().is_some_and(|t| t.in_long_press)
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.tracking = None;
    }

    /// Fire show-press and long-press deadlines that are due at `now_ms`.
    pub fn poll(&mut self, now_ms: i64) -> Vec<Gesture> {
        let mut out = Vec::new();
        self.fire_due(now_ms, &mut out);
        out
    }

    /// Feed one frame and collect the gestures it completes.
    pub fn process(&mut self, frame: &RawContactFrame) -> Vec<Gesture> {
        let mut out = Vec::new();
        if frame.contacts.is_empty() {
            return out;
        }

        if frame.action != FrameAction::Down {
            self.fire_due(frame.event_time_ms, &mut out);
        }

        let (focus_x, focus_y) = focus(frame);

        match frame.action {
            FrameAction::Down => {
                let mut tracking = Tracking {
                    down_x: focus_x,
                    down_y: focus_y,
                    down_time_ms: frame.gesture_down_time_ms(),
                    focus_down_x: focus_x,
                    focus_down_y: focus_y,
                    last_focus_x: focus_x,
                    last_focus_y: focus_y,
                    always_in_tap_region: true,
                    show_press_pending: true,
                    long_press_pending: true,
                    in_long_press: false,
                    samples: VecDeque::new(),
                };
                record_samples(&mut tracking, frame, focus_x, focus_y);
                self.tracking = Some(tracking);
                out.push(Gesture::Down {
                    x: focus_x,
                    y: focus_y,
                });
            }
            FrameAction::PointerDown { .. } | FrameAction::PointerUp { .. } => {
                if let Some(tracking) = self.tracking.as_mut() {
                    tracking.focus_down_x = focus_x;
                    tracking.focus_down_y = focus_y;
                    tracking.last_focus_x = focus_x;
                    tracking.last_focus_y = focus_y;
                    tracking.samples.clear();
                    if matches!(frame.action, FrameAction::PointerDown { .. }) {
                        // A second finger rules out taps and long presses.
                        tracking.always_in_tap_region = false;
                        tracking.show_press_pending = false;
                        tracking.long_press_pending = false;
                        tracking.in_long_press = false;
                    }
                }
            }
            FrameAction::Move => {
                if let Some(gesture) = self.on_move(frame, focus_x, focus_y) {
                    out.push(gesture);
                }
            }
            FrameAction::Up => {
                if let Some(gesture) = self.on_up(frame, focus_x, focus_y) {
                    out.push(gesture);
                }
                self.tracking = None;
            }
            FrameAction::Cancel => {
                self.tracking = None;
            }
            FrameAction::Other => {}
        }

        out
    }

    fn on_move(&mut self, frame: &RawContactFrame, focus_x: f32, focus_y: f32) -> Option<Gesture> {
        let slop = self.config.touch_slop;
        let tracking = self.tracking.as_mut()?;
        record_samples(tracking, frame, focus_x, focus_y);

        if tracking.in_long_press {
            return None;
        }

        let delta_x = focus_x - tracking.last_focus_x;
        let delta_y = focus_y - tracking.last_focus_y;

        if tracking.always_in_tap_region {
            let dx = focus_x - tracking.focus_down_x;
            let dy = focus_y - tracking.focus_down_y;
            if dx * dx + dy * dy <= slop * slop {
                return None;
            }
            tracking.always_in_tap_region = false;
            tracking.show_press_pending = false;
            tracking.long_press_pending = false;
        } else if delta_x.abs() < 1.0 && delta_y.abs() < 1.0 {
            return None;
        }

        tracking.last_focus_x = focus_x;
        tracking.last_focus_y = focus_y;
        Some(Gesture::Scroll {
            start_x: tracking.down_x,
            start_y: tracking.down_y,
            x: focus_x,
            y: focus_y,
            delta_x,
            delta_y,
        })
    }

    fn on_up(&mut self, frame: &RawContactFrame, focus_x: f32, focus_y: f32) -> Option<Gesture> {
        let config = &self.config;
        let tracking = self.tracking.as_mut()?;

        if tracking.in_long_press {
            return None;
        }
        if tracking.always_in_tap_region {
            return Some(Gesture::SingleTapUp {
                x: focus_x,
                y: focus_y,
            });
        }

        record_samples(tracking, frame, focus_x, focus_y);
        let (velocity_x, velocity_y) = velocity(&tracking.samples, config.velocity_window_ms);
        let velocity_x = velocity_x.clamp(-config.max_fling_velocity, config.max_fling_velocity);
        let velocity_y = velocity_y.clamp(-config.max_fling_velocity, config.max_fling_velocity);

        if velocity_x.abs() > config.min_fling_velocity
            || velocity_y.abs() > config.min_fling_velocity
        {
            Some(Gesture::Fling {
                start_x: tracking.down_x,
                start_y: tracking.down_y,
                velocity_x,
                velocity_y,
            })
        } else {
            None
        }
    }

    fn fire_due(&mut self, now_ms: i64, out: &mut Vec<Gesture>) {
        let config = &self.config;
        let Some(tracking) = self.tracking.as_mut() else {
            return;
        };

        if tracking.show_press_pending && now_ms >= tracking.down_time_ms + config.tap_timeout_ms
        {
            tracking.show_press_pending = false;
            out.push(Gesture::ShowPress {
                x: tracking.down_x,
                y: tracking.down_y,
            });
        }

        if tracking.long_press_pending
            && now_ms >= tracking.down_time_ms + config.long_press_timeout_ms
        {
            tracking.long_press_pending = false;
            tracking.in_long_press = true;
            tracing::trace!(x = tracking.down_x, y = tracking.down_y, "long press");
            out.push(Gesture::LongPress {
                x: tracking.down_x,
                y: tracking.down_y,
            });
        }
    }
}

/// Mean position of the contacts that remain down after this frame.
#[allow(clippy::cast_precision_loss)]
fn focus(frame: &RawContactFrame) -> (f32, f32) {
    let skip = match frame.action {
        FrameAction::PointerUp { index } => Some(index),
        _ => None,
    };
    let (mut sum_x, mut sum_y, mut count) = (0.0_f32, 0.0_f32, 0_usize);
    for (index, contact) in frame.contacts.iter().enumerate() {
        if Some(index) == skip {
            continue;
        }
        sum_x += contact.x;
        sum_y += contact.y;
        count += 1;
    }
    if count == 0 {
        return frame
            .primary_contact()
            .map_or((0.0, 0.0), |c| (c.x, c.y));
    }
    (sum_x / count as f32, sum_y / count as f32)
}

fn record_samples(tracking: &mut Tracking, frame: &RawContactFrame, focus_x: f32, focus_y: f32) {
    if let [contact] = frame.contacts.as_slice() {
        for sample in &contact.history {
            tracking
                .samples
                .push_back((sample.event_time_ms, sample.x, sample.y));
        }
    }
    tracking
        .samples
        .push_back((frame.event_time_ms, focus_x, focus_y));
    while tracking.samples.len() > MAX_VELOCITY_SAMPLES {
        tracking.samples.pop_front();
    }
}

/// Velocity in pixels per second over samples within `window_ms` of the newest.
#[allow(clippy::cast_precision_loss)]
fn velocity(samples: &VecDeque<(i64, f32, f32)>, window_ms: i64) -> (f32, f32) {
    let Some(&(last_t, last_x, last_y)) = samples.back() else {
        return (0.0, 0.0);
    };
    let Some(&(first_t, first_x, first_y)) = samples
        .iter()
        .find(|(t, _, _)| last_t - *t <= window_ms)
    else {
        return (0.0, 0.0);
    };
    let dt = last_t - first_t;
    if dt <= 0 {
        return (0.0, 0.0);
    }
    let seconds = dt as f32 / 1000.0;
    ((last_x - first_x) / seconds, (last_y - first_y) / seconds)
}
