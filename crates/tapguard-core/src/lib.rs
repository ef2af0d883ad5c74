//! tapguard-core: tap recognition + ghost-click suppression.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! The host binds elements, resolves disabled state, renders the pressed
//! visual and receives activations through the traits in [`host`]; this
//! crate only decides *whether* a physical touch/click sequence is one
//! logical activation.
//!
//! ## Module Structure
//!
//! - `geometry` - points and distance checks
//! - `event` - touch/click input and the synthesized activation
//! - `config` - tolerances and windows, loadable from YAML
//! - `error` - error taxonomy
//! - `host` - collaborator traits (disabled predicate, visual, activation, focus)
//! - `recognizer` - per-element tap state machine
//! - `clickbuster` - process-wide ghost-click registry
//! - `surface` - event router tying recognizers to the shared registry

mod clickbuster;
mod config;
mod error;
mod event;
mod geometry;
mod host;
mod recognizer;
mod surface;

#[cfg(test)]
mod fakes;

pub use clickbuster::{BustEntry, GhostClickSuppressor, SuppressorHandle};
pub use config::TapConfig;
pub use error::{TapError, TapResult};
pub use event::{Activation, ActivationSource, ClickEvent, TouchEvent, TouchPhase};
pub use geometry::Point;
pub use host::{
    ActivationHandler, AncestorDisabled, DisabledPredicate, ElementTree, FocusControl, NoopFocus,
    NoopVisual, PressedVisual, TargetId,
};
pub use recognizer::{Rejection, TapOutcome, TapRecognizer, TapSession};
pub use surface::{ClickOutcome, TapSurface, TouchOutcome};
