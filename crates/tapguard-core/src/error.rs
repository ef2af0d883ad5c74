//! Error types for tapguard-core.
//!
//! Disqualified taps and unmatched clicks are normal outcomes, not errors.
//! What remains is collaborator failure, binding misuse and configuration.

use crate::TargetId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapError {
    #[error("activation handler failed for target {target}: {source}")]
    Activation {
        target: TargetId,
        #[source]
        source: anyhow::Error,
    },
    #[error("pressed visual update ({pressed}) failed for target {target}: {source}")]
    Visual {
        target: TargetId,
        pressed: bool,
        #[source]
        source: anyhow::Error,
    },
    #[error("target {0} is already bound")]
    AlreadyBound(TargetId),
    #[error("target {0} is not bound")]
    NotBound(TargetId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type TapResult<T> = Result<T, TapError>;
