//! Pointer gesture recognizer.
//!
//! Per press: `Idle -> Pressed -> (Dragging)`. A press resolves to a click on
//! early release or when the dwell timer fires while still `Pressed`; once the
//! pointer moves further than the drag threshold the press is a drag and
//! resolves on release. Leaving the surface aborts the press silently.
//! Hover queries are emitted on move, at most one per throttle interval.

use std::time::{Duration, Instant};

use crate::config::InputSection;
use crate::sched::Deadline;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Click(Point),
    Drag { start: Point, end: Point },
    Hover(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pressed,
    Dragging,
}

#[derive(Debug, Clone)]
pub struct GestureConfig {
    pub drag_threshold: f64,
    pub click_dwell: Duration,
    pub hover_throttle: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&InputSection::default())
    }
}

impl From<&InputSection> for GestureConfig {
    fn from(s: &InputSection) -> Self {
        Self {
            drag_threshold: s.drag_threshold_px,
            click_dwell: Duration::from_millis(s.click_dwell_ms),
            hover_throttle: Duration::from_millis(s.hover_throttle_ms),
        }
    }
}

/// Live record of the active press. Exists only between down and up/leave.
#[derive(Debug, Clone)]
struct GestureState {
    id: u64,
    start: Point,
    dragging: bool,
    down_at: Instant,
}

#[derive(Debug)]
pub struct GestureRecognizer {
    cfg: GestureConfig,
    press: Option<GestureState>,
    next_press_id: u64,
    /// Payload is the id of the press that armed it.
    dwell: Deadline<u64>,
    last_hover: Option<Instant>,
}

impl GestureRecognizer {
    pub fn new(cfg: GestureConfig) -> Self {
        Self {
            cfg,
            press: None,
            next_press_id: 1,
            dwell: Deadline::new(),
            last_hover: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.press {
            None => Phase::Idle,
            Some(s) if s.dragging => Phase::Dragging,
            Some(_) => Phase::Pressed,
        }
    }

    /// Start a fresh press. Any previous press is abandoned and its dwell
    /// timer superseded.
    pub fn pointer_down(&mut self, at: Point, now: Instant) {
        let id = self.next_press_id;
        self.next_press_id += 1;
        self.press = Some(GestureState {
            id,
            start: at,
            dragging: false,
            down_at: now,
        });
        self.dwell.arm_after(now, self.cfg.click_dwell, id);
    }

    /// Track movement. Returns a hover gesture when the throttle allows one.
    pub fn pointer_move(&mut self, at: Point, now: Instant) -> Option<Gesture> {
        if let Some(press) = self.press.as_mut() {
            if !press.dragging && press.start.distance(at) > self.cfg.drag_threshold {
                press.dragging = true;
                self.dwell.cancel();
                tracing::trace!(press = press.id, "press became a drag");
            }
        }

        let throttled = self
            .last_hover
            .is_some_and(|t| now.saturating_duration_since(t) <= self.cfg.hover_throttle);
        if throttled {
            return None;
        }
        self.last_hover = Some(now);
        Some(Gesture::Hover(at))
    }

    /// Resolve the press on release.
    pub fn pointer_up(&mut self, at: Point, now: Instant) -> Option<Gesture> {
        let press = self.press.take()?;
        self.dwell.cancel();
        if press.dragging {
            Some(Gesture::Drag {
                start: press.start,
                end: at,
            })
        } else {
            tracing::trace!(
                press = press.id,
                held_ms = now.saturating_duration_since(press.down_at).as_millis() as u64,
                "released before dwell"
            );
            Some(Gesture::Click(press.start))
        }
    }

    /// Pointer left the surface: abort without emitting anything.
    pub fn pointer_leave(&mut self) {
        if let Some(press) = self.press.take() {
            tracing::trace!(press = press.id, "press aborted by leave");
        }
        self.dwell.cancel();
    }

    /// When the dwell timer wants to be polled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dwell.at()
    }

    /// Fire the dwell timer if due. Emits a click only if the press that
    /// armed it is still the active one and never became a drag.
    pub fn on_tick(&mut self, now: Instant) -> Option<Gesture> {
        let id = self.dwell.take_due(now)?;
        match &self.press {
            Some(press) if press.id == id && !press.dragging => {
                let start = press.start;
                self.press = None;
                Some(Gesture::Click(start))
            }
            _ => None,
        }
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
