//! Recording collaborators for unit tests.

use crate::{Activation, ActivationHandler, FocusControl, PressedVisual, TargetId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Log {
    pub visual: Vec<(TargetId, bool)>,
    pub activations: Vec<Activation>,
    pub blurred: Vec<TargetId>,
}

impl Log {
    pub fn activations_for(&self, target: TargetId) -> usize {
        self.activations.iter().filter(|a| a.target == target).count()
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

pub fn shared_log() -> SharedLog {
    Rc::new(RefCell::new(Log::default()))
}

pub struct RecordingVisual(pub SharedLog);

impl PressedVisual for RecordingVisual {
    fn set_pressed(&mut self, target: TargetId, pressed: bool) -> anyhow::Result<()> {
        self.0.borrow_mut().visual.push((target, pressed));
        Ok(())
    }
}

/// Records every call, then fails whenever `pressed == fail_on`.
pub struct FailingVisual {
    pub log: SharedLog,
    pub fail_on: bool,
}

impl PressedVisual for FailingVisual {
    fn set_pressed(&mut self, target: TargetId, pressed: bool) -> anyhow::Result<()> {
        self.log.borrow_mut().visual.push((target, pressed));
        if pressed == self.fail_on {
            anyhow::bail!("visual exploded");
        }
        Ok(())
    }
}

pub struct RecordingFocus(pub SharedLog);

impl FocusControl for RecordingFocus {
    fn blur_if_focusable(&mut self, target: TargetId) {
        self.0.borrow_mut().blurred.push(target);
    }
}

pub fn recording_handler(log: &SharedLog) -> Box<dyn ActivationHandler> {
    let log = log.clone();
    Box::new(move |_target: TargetId, event: &Activation| -> anyhow::Result<()> {
        log.borrow_mut().activations.push(*event);
        Ok(())
    })
}

pub fn failing_handler(log: &SharedLog) -> Box<dyn ActivationHandler> {
    let log = log.clone();
    Box::new(move |_target: TargetId, event: &Activation| -> anyhow::Result<()> {
        log.borrow_mut().activations.push(*event);
        anyhow::bail!("handler exploded")
    })
}

/// Flip-able disabled state shared with a predicate closure.
#[derive(Clone, Default)]
pub struct Switch(Rc<Cell<bool>>);

impl Switch {
    pub fn set(&self, disabled: bool) {
        self.0.set(disabled);
    }

    pub fn predicate(&self) -> impl Fn(TargetId) -> bool {
        let flag = self.0.clone();
        move |_| flag.get()
    }
}
