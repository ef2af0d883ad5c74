//! Scene files: element tree + event trace, and the in-memory host that
//! plays the collaborator roles for tapguard-core during a replay.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tapguard_core::{ElementTree, FocusControl, PressedVisual, TargetId};

/// A bound enabled/disabled expression on an element, written as
/// `{ disabled: bool }` or `{ enabled: bool }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Binding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Binding {
    pub fn disabled(disabled: bool) -> Self {
        Self {
            disabled: Some(disabled),
            enabled: None,
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            disabled: None,
            enabled: Some(enabled),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false) || self.enabled == Some(false)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.disabled.is_some() == self.enabled.is_some() {
            bail!("binding must set exactly one of `disabled` or `enabled`");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub id: u64,
    #[serde(default)]
    pub parent: Option<u64>,
    /// Native disabled attribute.
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub binding: Option<Binding>,
    #[serde(default)]
    pub focusable: bool,
    /// Whether a tap recognizer is attached. Unbound elements still receive clicks.
    #[serde(default = "default_bound")]
    pub bound: bool,
}

fn default_bound() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneEvent {
    TouchStart { target: u64, x: f64, y: f64, time: u64 },
    TouchMove { target: u64, x: f64, y: f64, time: u64 },
    TouchEnd { target: u64, x: f64, y: f64, time: u64 },
    TouchCancel { target: u64, time: u64 },
    Click { target: u64, x: f64, y: f64, time: u64 },
    SetBinding { target: u64, binding: Option<Binding> },
    SetDisabled { target: u64, disabled: bool },
    Tick { time: u64 },
}

impl SceneEvent {
    pub fn target(&self) -> Option<u64> {
        match self {
            SceneEvent::TouchStart { target, .. }
            | SceneEvent::TouchMove { target, .. }
            | SceneEvent::TouchEnd { target, .. }
            | SceneEvent::TouchCancel { target, .. }
            | SceneEvent::Click { target, .. }
            | SceneEvent::SetBinding { target, .. }
            | SceneEvent::SetDisabled { target, .. } => Some(*target),
            SceneEvent::Tick { .. } => None,
        }
    }

    pub fn time(&self) -> Option<u64> {
        match self {
            SceneEvent::TouchStart { time, .. }
            | SceneEvent::TouchMove { time, .. }
            | SceneEvent::TouchEnd { time, .. }
            | SceneEvent::TouchCancel { time, .. }
            | SceneEvent::Click { time, .. }
            | SceneEvent::Tick { time } => Some(*time),
            SceneEvent::SetBinding { .. } | SceneEvent::SetDisabled { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

impl Scene {
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let scene: Scene = serde_yaml::from_str(content).context("invalid scene YAML")?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reject dangling references and time going backwards.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut ids = HashMap::new();
        for spec in &self.targets {
            if ids.insert(spec.id, spec).is_some() {
                bail!("duplicate target id {}", spec.id);
            }
        }
        for spec in &self.targets {
            if let Some(binding) = &spec.binding {
                binding
                    .check()
                    .with_context(|| format!("target {} has an invalid binding", spec.id))?;
            }
            if let Some(parent) = spec.parent {
                if !ids.contains_key(&parent) {
                    bail!("target {} has unknown parent {}", spec.id, parent);
                }
            }
        }

        for spec in &self.targets {
            let mut current = spec.parent;
            let mut depth = 0;
            while let Some(id) = current {
                depth += 1;
                if depth > self.targets.len() {
                    bail!("target {} has a cyclic parent chain", spec.id);
                }
                current = ids.get(&id).and_then(|parent| parent.parent);
            }
        }

        let mut last_time = 0;
        for (index, event) in self.events.iter().enumerate() {
            if let Some(target) = event.target() {
                if !ids.contains_key(&target) {
                    bail!("event #{index} refers to unknown target {target}");
                }
            }
            if let SceneEvent::SetBinding {
                binding: Some(binding),
                ..
            } = event
            {
                binding
                    .check()
                    .with_context(|| format!("event #{index} has an invalid binding"))?;
            }
            if let Some(time) = event.time() {
                if time < last_time {
                    bail!("event #{index} goes back in time ({time} < {last_time})");
                }
                last_time = time;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ElementState {
    parent: Option<TargetId>,
    disabled: bool,
    binding: Option<Binding>,
    focusable: bool,
    pressed: bool,
}

/// Mutable host state observed by the core through [`SceneHost`].
#[derive(Debug, Default)]
pub(crate) struct HostState {
    elements: HashMap<TargetId, ElementState>,
    pub(crate) activations: BTreeMap<u64, usize>,
    pub(crate) blurred: usize,
    pub(crate) press_transitions: usize,
}

impl HostState {
    pub(crate) fn from_scene(scene: &Scene) -> Self {
        let elements = scene
            .targets
            .iter()
            .map(|spec| {
                (
                    TargetId(spec.id),
                    ElementState {
                        parent: spec.parent.map(TargetId),
                        disabled: spec.disabled,
                        binding: spec.binding,
                        focusable: spec.focusable,
                        pressed: false,
                    },
                )
            })
            .collect();
        Self {
            elements,
            ..Self::default()
        }
    }

    pub(crate) fn set_binding(&mut self, target: TargetId, binding: Option<Binding>) {
        if let Some(element) = self.elements.get_mut(&target) {
            element.binding = binding;
        }
    }

    pub(crate) fn set_disabled(&mut self, target: TargetId, disabled: bool) {
        if let Some(element) = self.elements.get_mut(&target) {
            element.disabled = disabled;
        }
    }

    pub(crate) fn any_pressed(&self) -> bool {
        self.elements.values().any(|e| e.pressed)
    }
}

/// Cheap clonable view of [`HostState`] handed to the core as collaborators.
#[derive(Debug, Clone, Default)]
pub(crate) struct SceneHost(pub(crate) Rc<RefCell<HostState>>);

impl ElementTree for SceneHost {
    fn parent(&self, target: TargetId) -> Option<TargetId> {
        self.0.borrow().elements.get(&target).and_then(|e| e.parent)
    }

    fn natively_disabled(&self, target: TargetId) -> bool {
        self.0.borrow().elements.get(&target).is_some_and(|e| e.disabled)
    }

    fn bound_disabled(&self, target: TargetId) -> Option<bool> {
        self.0
            .borrow()
            .elements
            .get(&target)
            .and_then(|e| e.binding)
            .map(|b| b.is_disabled())
    }
}

impl PressedVisual for SceneHost {
    fn set_pressed(&mut self, target: TargetId, pressed: bool) -> anyhow::Result<()> {
        let mut state = self.0.borrow_mut();
        let element = state
            .elements
            .get_mut(&target)
            .with_context(|| format!("unknown element {target}"))?;
        element.pressed = pressed;
        state.press_transitions += 1;
        Ok(())
    }
}

impl FocusControl for SceneHost {
    fn blur_if_focusable(&mut self, target: TargetId) {
        let mut state = self.0.borrow_mut();
        if state.elements.get(&target).is_some_and(|e| e.focusable) {
            state.blurred += 1;
            tracing::debug!(element = %target, "Blurred");
        }
    }
}
