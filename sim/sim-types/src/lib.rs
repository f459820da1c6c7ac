//! Core types for granular contact simulation.
//!
//! This crate provides the foundational types shared by contact models and
//! the simulation around them:
//!
//! - [`Particle`] / [`ParticleSystem`] - Spherical particles, owned and ghost
//! - [`ParticleTag`] - Stable particle identity
//! - [`SimulationConfig`] / [`StepContext`] - Timestep and per-step context
//! - [`SimError`] - Configuration and lifecycle errors
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no force law and no
//! integration; contact models read kinematics from them and accumulate
//! into the force and torque fields.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Example
//!
//! ```
//! use sim_types::{Particle, ParticleSystem};
//! use nalgebra::Point3;
//!
//! let system = ParticleSystem::new(vec![
//!     Particle::new(1, Point3::origin(), 0.5, 1.0),
//!     Particle::new(2, Point3::new(0.9, 0.0, 0.0), 0.5, 1.0),
//! ]);
//!
//! assert_eq!(system.local_count(), 2);
//! assert!(system.validate().is_ok());
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod error;
mod particle;

pub use config::{SimulationConfig, StepContext};
pub use error::SimError;
pub use particle::{Particle, ParticleSystem, ParticleTag};

// Re-export math types for convenience
pub use nalgebra::{Point3, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
