//! Collaborator traits implemented by the host UI layer.
//!
//! The core never reads element state itself: disabled-ness, the pressed
//! visual, focus and the activation callback all live behind these seams.

use crate::Activation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an interactive element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Answers whether a target currently refuses activation.
///
/// Re-evaluated on demand; implementations must not cache across calls.
pub trait DisabledPredicate {
    fn is_disabled(&self, target: TargetId) -> bool;
}

impl<F> DisabledPredicate for F
where
    F: Fn(TargetId) -> bool,
{
    fn is_disabled(&self, target: TargetId) -> bool {
        self(target)
    }
}

/// Minimal view of the host's element tree needed to resolve disabled state.
pub trait ElementTree {
    fn parent(&self, target: TargetId) -> Option<TargetId>;

    /// Native disabled semantics for the element kind (e.g. a `disabled` attribute).
    fn natively_disabled(&self, target: TargetId) -> bool;

    /// State of a bound enabled/disabled expression, if the target has one.
    /// An "enabled = false" binding reports `Some(true)`.
    fn bound_disabled(&self, target: TargetId) -> Option<bool>;
}

/// Disabled if the target or any ancestor is natively disabled, or the
/// target's own binding says so.
#[derive(Debug, Clone)]
pub struct AncestorDisabled<T> {
    tree: T,
}

impl<T: ElementTree> AncestorDisabled<T> {
    pub fn new(tree: T) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }
}

impl<T: ElementTree> DisabledPredicate for AncestorDisabled<T> {
    fn is_disabled(&self, target: TargetId) -> bool {
        if self.tree.bound_disabled(target).unwrap_or(false) {
            return true;
        }
        let mut current = Some(target);
        while let Some(id) = current {
            if self.tree.natively_disabled(id) {
                return true;
            }
            current = self.tree.parent(id);
        }
        false
    }
}

/// Toggles the "pressed" presentation of a target.
pub trait PressedVisual {
    fn set_pressed(&mut self, target: TargetId, pressed: bool) -> anyhow::Result<()>;
}

/// Host without a pressed presentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisual;

impl PressedVisual for NoopVisual {
    fn set_pressed(&mut self, _target: TargetId, _pressed: bool) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Receives activations (and, for click listeners, every click reaching the element).
pub trait ActivationHandler {
    fn activate(&mut self, target: TargetId, event: &Activation) -> anyhow::Result<()>;
}

impl<F> ActivationHandler for F
where
    F: FnMut(TargetId, &Activation) -> anyhow::Result<()>,
{
    fn activate(&mut self, target: TargetId, event: &Activation) -> anyhow::Result<()> {
        self(target, event)
    }
}

/// Drops input focus from a busted click's target so no soft keyboard opens.
pub trait FocusControl {
    fn blur_if_focusable(&mut self, target: TargetId);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFocus;

impl FocusControl for NoopFocus {
    fn blur_if_focusable(&mut self, _target: TargetId) {}
}
