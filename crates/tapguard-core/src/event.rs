//! Input events delivered by the host and the activation handed back to it.

use crate::{Point, TargetId};
use serde::{Deserialize, Serialize};

/// Phase of a single-finger touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A touch event as delivered by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub point: Point,
    /// Monotonic, non-decreasing timestamp in milliseconds.
    pub time_ms: u64,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f64, y: f64, time_ms: u64) -> Self {
        Self {
            phase,
            point: Point::new(x, y),
            time_ms,
        }
    }

    pub fn start(x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(TouchPhase::Start, x, y, time_ms)
    }

    pub fn moved(x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(TouchPhase::Move, x, y, time_ms)
    }

    pub fn end(x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(TouchPhase::End, x, y, time_ms)
    }

    pub fn cancel(time_ms: u64) -> Self {
        Self::new(TouchPhase::Cancel, 0.0, 0.0, time_ms)
    }
}

/// A native click event, either genuine (desktop) or a platform echo of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub point: Point,
    pub time_ms: u64,
}

impl ClickEvent {
    pub fn new(x: f64, y: f64, time_ms: u64) -> Self {
        Self {
            point: Point::new(x, y),
            time_ms,
        }
    }
}

/// Where an activation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationSource {
    /// A recognized touchstart..touchend tap.
    Tap,
    /// A native click delivered straight to the element (non-touch path).
    Click,
}

/// The single logical "user performed this action" event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub target: TargetId,
    /// Release coordinates for taps, click coordinates otherwise.
    pub point: Point,
    pub time_ms: u64,
    pub source: ActivationSource,
}
