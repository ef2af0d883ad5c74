//! Event router: the glue between the host's input dispatch, the per-element
//! recognizers and the shared clickbuster.
//!
//! Every native click passes through the suppressor before any element sees
//! it; touches go straight to the bound element's recognizer.

use crate::{
    Activation, ActivationHandler, ClickEvent, DisabledPredicate, FocusControl, PressedVisual,
    SuppressorHandle, TapConfig, TapError, TapOutcome, TapRecognizer, TapResult, TargetId,
    TouchEvent,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Result of routing a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "routed", rename_all = "snake_case")]
pub enum TouchOutcome {
    /// No recognizer is bound to the target.
    Unbound,
    Handled(TapOutcome),
}

/// Result of routing a native click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Ghost click of an earlier tap; nothing downstream saw it.
    Suppressed,
    /// Click reached a bound element and activated it.
    Activated(Activation),
    /// Click reached a bound element that is disabled.
    Disabled,
    /// Click passed through to an element with no recognizer.
    Unhandled,
}

struct BoundTarget {
    recognizer: TapRecognizer,
    listeners: Vec<Box<dyn ActivationHandler>>,
}

/// Owns the collaborators, the bound recognizers and the shared suppressor.
pub struct TapSurface {
    config: TapConfig,
    suppressor: SuppressorHandle,
    disabled: Box<dyn DisabledPredicate>,
    visual: Box<dyn PressedVisual>,
    focus: Box<dyn FocusControl>,
    targets: HashMap<TargetId, BoundTarget>,
    last_sweep_ms: Option<u64>,
}

impl TapSurface {
    pub fn new(
        config: TapConfig,
        disabled: Box<dyn DisabledPredicate>,
        visual: Box<dyn PressedVisual>,
        focus: Box<dyn FocusControl>,
    ) -> Self {
        let suppressor = SuppressorHandle::from_config(&config);
        Self {
            config,
            suppressor,
            disabled,
            visual,
            focus,
            targets: HashMap::new(),
            last_sweep_ms: None,
        }
    }

    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Clone of the shared registry handle.
    pub fn suppressor(&self) -> SuppressorHandle {
        self.suppressor.clone()
    }

    /// Attach a recognizer to `target`, delivering activations to `handler`.
    pub fn bind(&mut self, target: TargetId, handler: Box<dyn ActivationHandler>) -> TapResult<()> {
        if self.targets.contains_key(&target) {
            return Err(TapError::AlreadyBound(target));
        }
        let recognizer = TapRecognizer::new(
            target,
            self.config.clone(),
            self.suppressor.clone(),
            handler,
        );
        self.targets.insert(
            target,
            BoundTarget {
                recognizer,
                listeners: Vec::new(),
            },
        );
        info!(element = %target, "Target bound");
        Ok(())
    }

    /// Detach `target`, cancelling any live session.
    pub fn unbind(&mut self, target: TargetId) -> TapResult<()> {
        let mut bound = self.targets.remove(&target).ok_or(TapError::NotBound(target))?;
        bound.recognizer.cancel(self.visual.as_mut())?;
        info!(element = %target, "Target unbound");
        Ok(())
    }

    /// Extra listener observing every activation of `target`, whether it came
    /// from a tap or a direct click. Busted clicks never reach it.
    pub fn add_click_listener(
        &mut self,
        target: TargetId,
        listener: Box<dyn ActivationHandler>,
    ) -> TapResult<()> {
        let bound = self
            .targets
            .get_mut(&target)
            .ok_or(TapError::NotBound(target))?;
        bound.listeners.push(listener);
        Ok(())
    }

    pub fn is_bound(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    pub fn is_pressed(&self, target: TargetId) -> bool {
        self.targets
            .get(&target)
            .is_some_and(|bound| bound.recognizer.is_pressed())
    }

    pub fn dispatch_touch(&mut self, target: TargetId, event: &TouchEvent) -> TapResult<TouchOutcome> {
        let Some(bound) = self.targets.get_mut(&target) else {
            debug!(element = %target, phase = ?event.phase, "Touch on unbound target");
            return Ok(TouchOutcome::Unbound);
        };

        let outcome =
            bound
                .recognizer
                .handle_touch(event, self.disabled.as_ref(), self.visual.as_mut())?;
        if let TapOutcome::Activated(activation) = &outcome {
            notify(target, &mut bound.listeners, activation)?;
        }
        Ok(TouchOutcome::Handled(outcome))
    }

    pub fn dispatch_click(&mut self, target: TargetId, event: &ClickEvent) -> TapResult<ClickOutcome> {
        if self.suppressor.intercept(event.point, event.time_ms) {
            self.focus.blur_if_focusable(target);
            return Ok(ClickOutcome::Suppressed);
        }

        let Some(bound) = self.targets.get_mut(&target) else {
            return Ok(ClickOutcome::Unhandled);
        };

        match bound.recognizer.handle_click(event, self.disabled.as_ref())? {
            Some(activation) => {
                notify(target, &mut bound.listeners, &activation)?;
                Ok(ClickOutcome::Activated(activation))
            }
            None => Ok(ClickOutcome::Disabled),
        }
    }

    /// Periodic housekeeping; purges expired bust entries at most once per
    /// sweep interval. Returns the number purged.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let due = match self.last_sweep_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.sweep_interval_ms,
            None => true,
        };
        if !due {
            return 0;
        }
        self.last_sweep_ms = Some(now_ms);
        self.suppressor.sweep(now_ms)
    }
}

fn notify(
    target: TargetId,
    listeners: &mut [Box<dyn ActivationHandler>],
    activation: &Activation,
) -> TapResult<()> {
    let mut first_error = None;
    for listener in listeners.iter_mut() {
        if let Err(source) = listener.activate(target, activation) {
            first_error.get_or_insert(TapError::Activation { target, source });
        }
    }
    first_error.map_or(Ok(()), Err)
}

impl std::fmt::Debug for TapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapSurface")
            .field("config", &self.config)
            .field("suppressor", &self.suppressor)
            .field("targets", &self.targets.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{recording_handler, shared_log, RecordingFocus, RecordingVisual, SharedLog, Switch};
    use crate::{ActivationSource, Rejection};

    const A: TargetId = TargetId(1);
    const B: TargetId = TargetId(2);

    fn surface(log: &SharedLog, switch: &Switch) -> TapSurface {
        let mut surface = TapSurface::new(
            TapConfig::default(),
            Box::new(switch.predicate()),
            Box::new(RecordingVisual(log.clone())),
            Box::new(RecordingFocus(log.clone())),
        );
        surface.bind(A, recording_handler(log)).unwrap();
        surface.bind(B, recording_handler(log)).unwrap();
        surface
    }

    fn tap(surface: &mut TapSurface, target: TargetId, x: f64, y: f64, start: u64, end: u64) -> TouchOutcome {
        surface.dispatch_touch(target, &TouchEvent::start(x, y, start)).unwrap();
        surface.dispatch_touch(target, &TouchEvent::end(x, y, end)).unwrap()
    }

    #[test]
    fn test_ghost_click_busted_then_late_click_passes() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        assert_eq!(log.borrow().activations_for(A), 1);

        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 100)).unwrap();
        assert_eq!(out, ClickOutcome::Suppressed);
        assert_eq!(log.borrow().activations_for(A), 1);
        assert_eq!(log.borrow().blurred, vec![A]);

        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 2700)).unwrap();
        assert!(matches!(out, ClickOutcome::Activated(_)));
        assert_eq!(log.borrow().activations_for(A), 2);
    }

    #[test]
    fn test_click_after_window_not_busted() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 2700)).unwrap();
        assert!(matches!(out, ClickOutcome::Activated(_)));
        assert_eq!(log.borrow().activations_for(A), 2);
    }

    #[test]
    fn test_busted_even_when_element_replaced() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        // The tap swapped A for B at the same spot; the echo lands on B.
        let out = surface.dispatch_click(B, &ClickEvent::new(10.0, 10.0, 100)).unwrap();
        assert_eq!(out, ClickOutcome::Suppressed);
        assert_eq!(log.borrow().activations_for(A), 1);
        assert_eq!(log.borrow().activations_for(B), 0);
    }

    #[test]
    fn test_distant_clicks_not_busted() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        assert_eq!(log.borrow().activations_for(A), 1);

        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 90)).unwrap();
        assert_eq!(out, ClickOutcome::Suppressed);
        assert_eq!(log.borrow().blurred, vec![A]);
        assert_eq!(log.borrow().activations_for(A), 1);

        tap(&mut surface, A, 10.0, 10.0, 100, 130);
        assert_eq!(log.borrow().activations_for(A), 2);

        tap(&mut surface, B, 100.0, 120.0, 150, 150);
        let out = surface.dispatch_click(B, &ClickEvent::new(100.0, 120.0, 150)).unwrap();
        assert_eq!(out, ClickOutcome::Suppressed);
        assert_eq!(log.borrow().activations_for(B), 1);

        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 200)).unwrap();
        assert_eq!(out, ClickOutcome::Suppressed);
        assert_eq!(log.borrow().activations_for(A), 2);
        assert_eq!(log.borrow().activations_for(B), 1);
    }

    #[test]
    fn test_sibling_plain_click_passes() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        for time in [51, 60, 500, 3000] {
            let out = surface.dispatch_click(B, &ClickEvent::new(100.0, 120.0, time)).unwrap();
            assert!(matches!(out, ClickOutcome::Activated(_)));
        }
        assert_eq!(log.borrow().activations_for(B), 4);
    }

    #[test]
    fn test_desktop_click_activates() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        let out = surface.dispatch_click(A, &ClickEvent::new(30.0, 40.0, 5)).unwrap();
        let ClickOutcome::Activated(activation) = out else {
            panic!("expected activation, got {out:?}");
        };
        assert_eq!(activation.source, ActivationSource::Click);
        assert!(surface.suppressor().is_empty());
    }

    #[test]
    fn test_disabled_targets() {
        let log = shared_log();
        let switch = Switch::default();
        switch.set(true);
        let mut surface = surface(&log, &switch);

        let out = tap(&mut surface, A, 10.0, 10.0, 0, 10);
        assert_eq!(out, TouchOutcome::Handled(TapOutcome::Ignored));
        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 20)).unwrap();
        assert_eq!(out, ClickOutcome::Disabled);
        assert!(log.borrow().activations.is_empty());

        switch.set(false);
        surface.dispatch_touch(A, &TouchEvent::start(10.0, 10.0, 100)).unwrap();
        switch.set(true);
        let out = surface.dispatch_touch(A, &TouchEvent::end(10.0, 10.0, 120)).unwrap();
        assert_eq!(out, TouchOutcome::Handled(TapOutcome::Rejected(Rejection::Disabled)));
        assert!(log.borrow().activations.is_empty());
    }

    #[test]
    fn test_listeners_see_taps_but_not_ghosts() {
        let log = shared_log();
        let listener_log = shared_log();
        let mut surface = surface(&log, &Switch::default());
        surface.add_click_listener(A, recording_handler(&listener_log)).unwrap();

        tap(&mut surface, A, 10.0, 10.0, 10, 50);
        assert_eq!(listener_log.borrow().activations.len(), 1);

        surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 100)).unwrap();
        assert_eq!(listener_log.borrow().activations.len(), 1);
    }

    #[test]
    fn test_pressed_visual_follows_session() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        surface.dispatch_touch(A, &TouchEvent::start(10.0, 10.0, 0)).unwrap();
        assert!(surface.is_pressed(A));
        assert_eq!(log.borrow().visual, vec![(A, true)]);

        surface.dispatch_touch(A, &TouchEvent::end(10.0, 10.0, 30)).unwrap();
        assert!(!surface.is_pressed(A));
        assert_eq!(log.borrow().visual, vec![(A, true), (A, false)]);
    }

    #[test]
    fn test_bind_and_unbind() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        assert!(matches!(
            surface.bind(A, recording_handler(&log)),
            Err(TapError::AlreadyBound(A))
        ));

        surface.dispatch_touch(A, &TouchEvent::start(10.0, 10.0, 0)).unwrap();
        surface.unbind(A).unwrap();
        assert!(!surface.is_bound(A));
        assert_eq!(log.borrow().visual, vec![(A, true), (A, false)]);

        let out = surface.dispatch_touch(A, &TouchEvent::end(10.0, 10.0, 10)).unwrap();
        assert_eq!(out, TouchOutcome::Unbound);
        let out = surface.dispatch_click(A, &ClickEvent::new(10.0, 10.0, 20)).unwrap();
        assert_eq!(out, ClickOutcome::Unhandled);
        assert!(matches!(surface.unbind(A), Err(TapError::NotBound(A))));
    }

    #[test]
    fn test_tick_sweeps_on_interval() {
        let log = shared_log();
        let mut surface = surface(&log, &Switch::default());

        tap(&mut surface, A, 10.0, 10.0, 0, 10);
        tap(&mut surface, B, 100.0, 120.0, 2000, 2010);
        assert_eq!(surface.suppressor().len(), 2);

        assert_eq!(surface.tick(2000), 0);
        // Within the sweep interval: skipped even though A's entry has expired.
        assert_eq!(surface.tick(2600), 0);
        assert_eq!(surface.tick(3000), 1);
        assert_eq!(surface.suppressor().len(), 1);
        assert_eq!(surface.tick(5000), 1);
        assert!(surface.suppressor().is_empty());
    }

    #[test]
    fn test_outcome_serializes() {
        let value = serde_json::to_value(ClickOutcome::Suppressed).unwrap();
        assert_eq!(value, serde_json::json!({ "outcome": "suppressed" }));
    }
}
