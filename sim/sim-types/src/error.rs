//! Error types for simulation operations.

use thiserror::Error;

/// Errors that can occur while configuring or running a contact model.
///
/// Every variant is a configuration or lifecycle error. Geometric edge cases
/// inside the force law (coincident particles, zero shear) are handled by
/// explicit branches and never surface here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A model parameter is malformed or out of range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value (as given).
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Wrong number of settings for the pair style.
    #[error("expected {expected} settings, got {actual}")]
    SettingsCount {
        /// Number of settings required.
        expected: usize,
        /// Number of settings supplied.
        actual: usize,
    },

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A collaborator does not provide a capability the model requires.
    #[error("missing capability: {capability}")]
    MissingCapability {
        /// What is missing.
        capability: String,
    },

    /// A particle type range does not fit the number of types.
    #[error("invalid type range `{range}` for {ntypes} particle types")]
    InvalidTypeRange {
        /// The range expression.
        range: String,
        /// Number of particle types in the system.
        ntypes: usize,
    },

    /// Particle index out of range for the store.
    #[error("particle index {index} out of range (len {len})")]
    InvalidParticleIndex {
        /// The offending index.
        index: usize,
        /// Number of particles (owned + ghost).
        len: usize,
    },

    /// An operation was requested in the wrong lifecycle phase.
    #[error("lifecycle error: {reason}")]
    Lifecycle {
        /// What went wrong.
        reason: String,
    },

    /// Restart data could not be written or read.
    #[error("restart error: {reason}")]
    Restart {
        /// Description of the failure.
        reason: String,
    },
}

impl SimError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a missing capability error.
    #[must_use]
    pub fn missing_capability(capability: impl Into<String>) -> Self {
        Self::MissingCapability {
            capability: capability.into(),
        }
    }

    /// Create a lifecycle error.
    #[must_use]
    pub fn lifecycle(reason: impl Into<String>) -> Self {
        Self::Lifecycle {
            reason: reason.into(),
        }
    }

    /// Create a restart error.
    #[must_use]
    pub fn restart(reason: impl Into<String>) -> Self {
        Self::Restart {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration-time error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::SettingsCount { .. }
                | Self::InvalidTimestep(_)
                | Self::InvalidConfig { .. }
                | Self::MissingCapability { .. }
                | Self::InvalidTypeRange { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::invalid_parameter("kn", -1.0, "must be non-negative");
        let msg = err.to_string();
        assert!(msg.contains("kn"));
        assert!(msg.contains("-1"));

        let err = SimError::SettingsCount {
            expected: 9,
            actual: 4,
        };
        assert!(err.to_string().contains('9'));

        let err = SimError::missing_capability("ghost velocity");
        assert!(err.to_string().contains("ghost velocity"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(SimError::invalid_config("bad").is_config_error());
        assert!(SimError::InvalidTimestep(0.0).is_config_error());
        assert!(!SimError::lifecycle("too early").is_config_error());
        assert!(!SimError::restart("truncated").is_config_error());
    }
}
