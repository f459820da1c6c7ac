//! Configuration types for simulation.
//!
//! Settings that the surrounding simulation owns and the contact model only
//! reads: timestep, the force-accumulation convention across workers, and
//! which per-particle fields are replicated onto ghosts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed timestep for integration (seconds).
    pub timestep: f64,
    /// When set, forces on ghost neighbors are accumulated locally and
    /// reduced back to their owners by the communication layer.
    pub newton_pair: bool,
    /// Whether ghost replicas carry velocities (required by granular models).
    pub ghost_velocity: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0e-4,
            newton_pair: true,
            ghost_velocity: true,
        }
    }
}

impl SimulationConfig {
    /// Create a new simulation config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Set the newton-pair convention.
    #[must_use]
    pub fn newton_pair(mut self, enabled: bool) -> Self {
        self.newton_pair = enabled;
        self
    }

    /// Set whether ghosts carry velocities.
    #[must_use]
    pub fn ghost_velocity(mut self, enabled: bool) -> Self {
        self.ghost_velocity = enabled;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::SimError::InvalidTimestep(self.timestep));
        }
        Ok(())
    }
}

/// Where the simulation is in time, handed to the contact model every step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepContext {
    /// Integer step counter, 0 on the first step of the run.
    pub step: u64,
    /// Timestep for this step (seconds).
    pub dt: f64,
    /// Whether the neighbor list was rebuilt before this step.
    pub neighbors_rebuilt: bool,
}

impl StepContext {
    /// The first step of a run; neighbor lists are always fresh.
    #[must_use]
    pub fn first(dt: f64) -> Self {
        Self {
            step: 0,
            dt,
            neighbors_rebuilt: true,
        }
    }

    /// The following step, reusing the current neighbor list.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            step: self.step + 1,
            neighbors_rebuilt: false,
            ..self
        }
    }

    /// Mark the neighbor list as rebuilt for this step.
    #[must_use]
    pub fn rebuilt(mut self) -> Self {
        self.neighbors_rebuilt = true;
        self
    }
}
