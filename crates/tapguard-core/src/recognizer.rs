//! Per-element tap recognition.
//!
//! State machine (one per bound element):
//!
//! ```text
//! Idle --touchstart (enabled)--> Pressed
//! Pressed --touchmove beyond tolerance | touchcancel--> Idle (no activation)
//! Pressed --touchend--> Idle (activation iff enabled, short, and close)
//! ```
//!
//! The pressed visual is switched on exactly once on entering `Pressed` and
//! off exactly once on leaving it.

use crate::{
    Activation, ActivationHandler, ActivationSource, ClickEvent, DisabledPredicate, Point,
    PressedVisual, SuppressorHandle, TapConfig, TapError, TapResult, TargetId, TouchEvent,
    TouchPhase,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A live touch sequence, from an accepted touchstart to its end or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapSession {
    pub start_point: Point,
    pub start_time_ms: u64,
}

/// Why a touchend did not activate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    Disabled,
    HeldTooLong { held_ms: u64 },
    MovedTooFar { distance_px: f64 },
}

/// Result of feeding one touch event to a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TapOutcome {
    /// No live session (or a touchstart on a disabled target); nothing changed.
    Ignored,
    /// Session started, pressed visual on.
    Pressed,
    /// Touchmove within tolerance; session still live.
    Tracking,
    /// Session dropped by movement or touchcancel.
    Cancelled,
    /// Touchend that did not qualify as a tap.
    Rejected(Rejection),
    /// Tap recognized and delivered.
    Activated(Activation),
}

/// Turns touchstart..touchend on one element into at most one activation.
pub struct TapRecognizer {
    target: TargetId,
    config: TapConfig,
    suppressor: SuppressorHandle,
    handler: Box<dyn ActivationHandler>,
    session: Option<TapSession>,
}

impl TapRecognizer {
    pub fn new(
        target: TargetId,
        config: TapConfig,
        suppressor: SuppressorHandle,
        handler: Box<dyn ActivationHandler>,
    ) -> Self {
        Self {
            target,
            config,
            suppressor,
            handler,
            session: None,
        }
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn session(&self) -> Option<&TapSession> {
        self.session.as_ref()
    }

    pub fn is_pressed(&self) -> bool {
        self.session.is_some()
    }

    /// Feed one touch event.
    pub fn handle_touch(
        &mut self,
        event: &TouchEvent,
        disabled: &dyn DisabledPredicate,
        visual: &mut dyn PressedVisual,
    ) -> TapResult<TapOutcome> {
        match event.phase {
            TouchPhase::Start => self.touch_start(event, disabled, visual),
            TouchPhase::Move => self.touch_move(event, visual),
            TouchPhase::End => self.touch_end(event, disabled, visual),
            TouchPhase::Cancel => self.cancel(visual),
        }
    }

    fn touch_start(
        &mut self,
        event: &TouchEvent,
        disabled: &dyn DisabledPredicate,
        visual: &mut dyn PressedVisual,
    ) -> TapResult<TapOutcome> {
        // A second touchstart replaces the live session.
        let replaced = self.session.take().is_some();
        if replaced {
            debug!(element = %self.target, "Touch session replaced");
        }

        if disabled.is_disabled(self.target) {
            debug!(element = %self.target, "Touchstart on disabled target ignored");
            if replaced {
                self.set_visual(visual, false)?;
                return Ok(TapOutcome::Cancelled);
            }
            return Ok(TapOutcome::Ignored);
        }

        // Session first: a failing visual must not lose the new press.
        self.session = Some(TapSession {
            start_point: event.point,
            start_time_ms: event.time_ms,
        });
        debug!(
            element = %self.target,
            x = event.point.x,
            y = event.point.y,
            time_ms = event.time_ms,
            "Pressed"
        );
        let cleared = if replaced {
            self.set_visual(visual, false)
        } else {
            Ok(())
        };
        let pressed = self.set_visual(visual, true);
        cleared?;
        pressed?;
        Ok(TapOutcome::Pressed)
    }

    fn touch_move(
        &mut self,
        event: &TouchEvent,
        visual: &mut dyn PressedVisual,
    ) -> TapResult<TapOutcome> {
        let Some(session) = self.session else {
            return Ok(TapOutcome::Ignored);
        };

        let distance = session.start_point.distance_to(event.point);
        if distance <= self.config.move_tolerance_px {
            return Ok(TapOutcome::Tracking);
        }

        debug!(element = %self.target, distance, "Moved beyond tolerance, session cancelled");
        self.session = None;
        self.set_visual(visual, false)?;
        Ok(TapOutcome::Cancelled)
    }

    fn touch_end(
        &mut self,
        event: &TouchEvent,
        disabled: &dyn DisabledPredicate,
        visual: &mut dyn PressedVisual,
    ) -> TapResult<TapOutcome> {
        let Some(session) = self.session.take() else {
            return Ok(TapOutcome::Ignored);
        };

        let held_ms = event.time_ms.saturating_sub(session.start_time_ms);
        let distance_px = session.start_point.distance_to(event.point);

        // Disabled state may have changed while the finger was down.
        let rejection = if disabled.is_disabled(self.target) {
            Some(Rejection::Disabled)
        } else if held_ms > self.config.max_hold_duration_ms {
            Some(Rejection::HeldTooLong { held_ms })
        } else if distance_px.is_nan() || distance_px > self.config.move_tolerance_px {
            Some(Rejection::MovedTooFar { distance_px })
        } else {
            None
        };

        if let Some(rejection) = rejection {
            debug!(element = %self.target, ?rejection, "Touchend rejected");
            self.set_visual(visual, false)?;
            return Ok(TapOutcome::Rejected(rejection));
        }

        // Bookkeeping first: a failing callback must not skip the bust entry.
        self.suppressor.register(event.point, event.time_ms);

        let activation = Activation {
            target: self.target,
            point: event.point,
            time_ms: event.time_ms,
            source: ActivationSource::Tap,
        };
        debug!(
            element = %self.target,
            x = event.point.x,
            y = event.point.y,
            held_ms,
            "Tap activated"
        );

        let cleared = self.set_visual(visual, false);
        let delivered = self.deliver(&activation);
        cleared?;
        delivered?;
        Ok(TapOutcome::Activated(activation))
    }

    /// Drop the live session, if any (touchcancel, unbind).
    pub fn cancel(&mut self, visual: &mut dyn PressedVisual) -> TapResult<TapOutcome> {
        if self.session.take().is_none() {
            return Ok(TapOutcome::Ignored);
        }
        debug!(element = %self.target, "Touch session cancelled");
        self.set_visual(visual, false)?;
        Ok(TapOutcome::Cancelled)
    }

    /// Click delivered straight to the element: the non-touch activation path.
    ///
    /// Touch state is not consulted and no bust entry is created.
    pub fn handle_click(
        &mut self,
        event: &ClickEvent,
        disabled: &dyn DisabledPredicate,
    ) -> TapResult<Option<Activation>> {
        if disabled.is_disabled(self.target) {
            debug!(element = %self.target, "Click on disabled target ignored");
            return Ok(None);
        }

        let activation = Activation {
            target: self.target,
            point: event.point,
            time_ms: event.time_ms,
            source: ActivationSource::Click,
        };
        debug!(element = %self.target, x = event.point.x, y = event.point.y, "Click activated");
        self.deliver(&activation)?;
        Ok(Some(activation))
    }

    fn deliver(&mut self, activation: &Activation) -> TapResult<()> {
        self.handler
            .activate(self.target, activation)
            .map_err(|source| TapError::Activation {
                target: self.target,
                source,
            })
    }

    fn set_visual(&self, visual: &mut dyn PressedVisual, pressed: bool) -> TapResult<()> {
        visual
            .set_pressed(self.target, pressed)
            .map_err(|source| TapError::Visual {
                target: self.target,
                pressed,
                source,
            })
    }
}

impl std::fmt::Debug for TapRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapRecognizer")
            .field("target", &self.target)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
