//! Replay engine: feeds a scene's events through a [`TapSurface`].

use crate::scene::{HostState, Scene, SceneEvent, SceneHost};
use anyhow::Context;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tapguard_core::{
    Activation, AncestorDisabled, ClickEvent, ClickOutcome, TapConfig, TapSurface, TargetId,
    TouchEvent, TouchOutcome, TouchPhase,
};
use tracing::{debug, info};

/// What the core decided for one scene event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Touch(TouchOutcome),
    Click(ClickOutcome),
    Swept { purged: usize },
    StateChanged { element: u64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub event: SceneEvent,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Activations per bound target.
    pub activations: BTreeMap<u64, usize>,
    pub blurred: usize,
    pub press_transitions: usize,
    pub pending_bust_entries: usize,
    pub pressed_at_end: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub summary: ReplaySummary,
}

pub struct Replayer {
    scene: Scene,
    host: SceneHost,
    surface: TapSurface,
}

impl Replayer {
    pub fn new(scene: Scene, config: TapConfig) -> anyhow::Result<Self> {
        scene.validate()?;
        config.validate()?;

        let host = SceneHost(Rc::new(RefCell::new(HostState::from_scene(&scene))));
        let mut surface = TapSurface::new(
            config,
            Box::new(AncestorDisabled::new(host.clone())),
            Box::new(host.clone()),
            Box::new(host.clone()),
        );

        for spec in scene.targets.iter().filter(|spec| spec.bound) {
            let id = spec.id;
            let state = host.clone();
            state.0.borrow_mut().activations.insert(id, 0);
            surface.bind(
                TargetId(id),
                Box::new(move |target: TargetId, event: &Activation| -> anyhow::Result<()> {
                    *state.0.borrow_mut().activations.entry(id).or_insert(0) += 1;
                    info!(element = %target, source = ?event.source, x = event.point.x, y = event.point.y, "Activation");
                    Ok(())
                }),
            )?;
        }

        Ok(Self {
            scene,
            host,
            surface,
        })
    }

    /// Replay every event in order and summarize.
    pub fn run(mut self) -> anyhow::Result<ReplayReport> {
        let events = std::mem::take(&mut self.scene.events);
        let mut steps = Vec::with_capacity(events.len());

        for (index, event) in events.into_iter().enumerate() {
            let outcome = self
                .step(&event)
                .with_context(|| format!("event #{index} ({event:?}) failed"))?;
            debug!(index, ?outcome, "Replayed event");
            steps.push(StepRecord {
                index,
                event,
                outcome,
            });
        }

        let state = self.host.0.borrow();
        let summary = ReplaySummary {
            activations: state.activations.clone(),
            blurred: state.blurred,
            press_transitions: state.press_transitions,
            pending_bust_entries: self.surface.suppressor().len(),
            pressed_at_end: state.any_pressed(),
        };
        info!(events = steps.len(), "Replay finished");

        Ok(ReplayReport { steps, summary })
    }

    fn step(&mut self, event: &SceneEvent) -> anyhow::Result<StepOutcome> {
        let outcome = match *event {
            SceneEvent::TouchStart { target, x, y, time } => {
                self.touch(target, TouchEvent::new(TouchPhase::Start, x, y, time))?
            }
            SceneEvent::TouchMove { target, x, y, time } => {
                self.touch(target, TouchEvent::new(TouchPhase::Move, x, y, time))?
            }
            SceneEvent::TouchEnd { target, x, y, time } => {
                self.touch(target, TouchEvent::new(TouchPhase::End, x, y, time))?
            }
            SceneEvent::TouchCancel { target, time } => {
                self.touch(target, TouchEvent::cancel(time))?
            }
            SceneEvent::Click { target, x, y, time } => StepOutcome::Click(
                self.surface
                    .dispatch_click(TargetId(target), &ClickEvent::new(x, y, time))?,
            ),
            SceneEvent::SetBinding { target, binding } => {
                self.host.0.borrow_mut().set_binding(TargetId(target), binding);
                StepOutcome::StateChanged { element: target }
            }
            SceneEvent::SetDisabled { target, disabled } => {
                self.host.0.borrow_mut().set_disabled(TargetId(target), disabled);
                StepOutcome::StateChanged { element: target }
            }
            SceneEvent::Tick { time } => StepOutcome::Swept {
                purged: self.surface.tick(time),
            },
        };
        Ok(outcome)
    }

    fn touch(&mut self, target: u64, event: TouchEvent) -> anyhow::Result<StepOutcome> {
        let outcome = self.surface.dispatch_touch(TargetId(target), &event)?;
        Ok(StepOutcome::Touch(outcome))
    }
}
