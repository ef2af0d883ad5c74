//! tapguard-replay: drive recorded touch/click traces through tapguard-core.
//!
//! A scene is a small element tree plus an ordered event trace. Replaying it
//! reports, per event, what the recognizers and the clickbuster decided.

pub mod config;
pub mod logging;
mod replay;
mod scene;

pub use replay::{ReplayReport, ReplaySummary, Replayer, StepOutcome, StepRecord};
pub use scene::{Binding, Scene, SceneEvent, TargetSpec};
