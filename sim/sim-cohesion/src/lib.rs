//! Cohesive granular contact model for discrete element simulation.
//!
//! This crate provides a linear spring-dashpot contact law between spherical
//! particles, extended with adhesive bonds that form once at the start of a
//! run and fail irreversibly in tension or in shear:
//!
//! - **Bonding**: pairs within an enlarged distance at formation time start
//!   bonded, with their overlap at that moment as the force-free reference
//! - **Tension**: a bonded pair pulled apart past its tensile limit breaks
//! - **Shear**: the tangential force is capped by Coulomb friction plus a
//!   cohesive term while bonded; reaching the cap breaks the bond
//! - **History**: tangential displacement persists per pair across steps and
//!   neighbor-list rebuilds, keyed by stable particle tags
//!
//! # Contact Model
//!
//! ```text
//! D     = (r_i + r_j - |delta|) - initial_gap
//! F_n   = kn * D - m_eff * gamma_n * v_n
//! F_t   = -(kt * shear + m_eff * gamma_t * v_t)
//! |F_t| <= mu * |F_n| + pi * r_min * c        (bonded)
//! |F_t| <= mu * |F_n|                          (unbonded)
//! ```
//!
//! A bond fails in tension when `-D >= pi * r_min * t / kn`.
//!
//! # Example
//!
//! ```
//! use sim_cohesion::{
//!     CohesivePairStyle, CohesiveParams, NeighborList, RigidBodyMasses, SerialComm,
//! };
//! use sim_types::{Particle, ParticleSystem, SimulationConfig, StepContext};
//! use nalgebra::Point3;
//!
//! let params = CohesiveParams::default().with_enlarge_factor(1.2);
//! let mut style = CohesivePairStyle::new(params, 1)?;
//! style.coeff("*", "*")?;
//!
//! let mut system = ParticleSystem::new(vec![
//!     Particle::new(1, Point3::origin(), 1.0, 1.0),
//!     Particle::new(2, Point3::new(1.95, 0.0, 0.0), 1.0, 1.0),
//! ]);
//! let config = SimulationConfig::with_timestep(1e-4);
//! style.init_style(&config, &system, &mut SerialComm)?;
//!
//! let neighbors = NeighborList::brute_force(&system, 0.5);
//! let bonds = style.initialize_bonds(&system, &neighbors)?;
//! assert_eq!(bonds.bonded, 1);
//!
//! let no_bodies: Option<&dyn RigidBodyMasses> = None;
//! let ctx = StepContext::first(config.timestep);
//! let report = style.compute(&ctx, &mut system, &neighbors, no_bodies, &mut SerialComm)?;
//! assert_eq!(report.active_contacts, 1);
//!
//! // Bonded at rest: the recorded overlap is the reference, so no force.
//! assert!(system.particles()[0].force.norm() < 1e-9);
//! # Ok::<(), sim_types::SimError>(())
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Particle
//! storage and cross-worker communication are collaborator traits
//! ([`ParticleStore`], [`Communicator`]), so the model runs unchanged in a
//! serial test harness or inside a domain-decomposed simulation.

#![doc(html_root_url = "https://docs.rs/sim-cohesion/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod bonds;
mod history;
mod mass;
mod model;
mod neighbor;
mod pair_style;
mod params;
mod probe;
#[cfg(feature = "serde")]
mod restart;
mod store;
mod types;

pub use bonds::{bond_record, form_bonds, BondReport};
pub use history::{BondState, ContactHistory, ContactRecord, PairKey};
pub use mass::{effective_mass, ContactMass, RigidBodyMasses, RigidMassCache};
pub use model::{CohesiveContactModel, PairForce, PairKinematics, PairOutcome, StepReport};
pub use neighbor::NeighborList;
pub use pair_style::CohesivePairStyle;
pub use params::{CohesiveParams, MAX_FRICTION_COEFFICIENT, SETTINGS_COUNT};
pub use probe::PairProbe;
#[cfg(feature = "serde")]
pub use restart::RestartState;
pub use store::{Communicator, ParticleStore, SerialComm};
pub use types::{parse_type_range, CutoffTable, TypePairTable};

// Re-export types needed to drive the model
pub use sim_types::{ParticleTag, Result, SimError, Vector3};
