use std::io;

use thiserror::Error;

use crate::physics::attractor::BodyId;

// ---------------------------------------------------------------------------
// Acceleration provider errors
// ---------------------------------------------------------------------------

/// Failure of a provider to bind or to produce an acceleration.
///
/// `Ok(acceleration)` is the only result that may be integrated. Neither variant
/// is ever collapsed into a zero vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Configuration that can never produce a meaningful acceleration.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// A declared capability that has not been built yet.
    #[error("{0} is not supported yet")]
    Unsupported(&'static str),
}

impl ProviderError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ProviderError::InvalidConfig(reason.into())
    }
}

// ---------------------------------------------------------------------------
// Simulator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("acceleration for body {body} failed: {source}")]
    Provider {
        body: BodyId,
        #[source]
        source: ProviderError,
    },

    #[error("body {0} is not part of this simulation")]
    UnknownBody(BodyId),

    #[error("body {0} is already part of this simulation")]
    DuplicateBody(BodyId),

    #[error("attractor {0} is not part of this simulation")]
    UnknownAttractor(BodyId),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while turning a scenario description into a running world.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("anchor {0} does not name a simulated body")]
    UnknownAnchor(BodyId),
}
