//! Spherical particle state.
//!
//! A [`ParticleSystem`] holds the particles a worker owns followed by the
//! read-only ghost replicas of nearby particles owned elsewhere. Local
//! indices are transient; [`ParticleTag`] is the stable identity.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SimError};

/// Stable, simulation-wide identifier of a particle.
///
/// Unlike the local index, a tag survives re-decomposition and migration,
/// so it is the key for anything that must persist across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleTag(pub u64);

impl ParticleTag {
    /// Create a new particle tag.
    #[must_use]
    pub const fn new(tag: u64) -> Self {
        Self(tag)
    }

    /// Get the raw tag value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for ParticleTag {
    fn from(tag: u64) -> Self {
        Self(tag)
    }
}

impl std::fmt::Display for ParticleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Particle({})", self.0)
    }
}

/// A single spherical particle.
///
/// `force` and `torque` are accumulators: contact models add into them and
/// the integrator clears them between steps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    /// Stable identity.
    pub tag: ParticleTag,
    /// Particle type, `1..=ntypes`.
    pub kind: usize,
    /// Center position.
    pub position: Point3<f64>,
    /// Linear velocity.
    pub velocity: Vector3<f64>,
    /// Angular velocity.
    pub angular_velocity: Vector3<f64>,
    /// Sphere radius.
    pub radius: f64,
    /// Mass.
    pub mass: f64,
    /// Frozen particles act as fixed anchors of infinite mass.
    pub frozen: bool,
    /// Accumulated force.
    pub force: Vector3<f64>,
    /// Accumulated torque.
    pub torque: Vector3<f64>,
}

impl Particle {
    /// Create a particle at rest with type 1.
    #[must_use]
    pub fn new(tag: u64, position: Point3<f64>, radius: f64, mass: f64) -> Self {
        Self {
            tag: ParticleTag(tag),
            kind: 1,
            position,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            radius,
            mass,
            frozen: false,
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        }
    }

    /// Set the particle type.
    #[must_use]
    pub fn with_kind(mut self, kind: usize) -> Self {
        self.kind = kind;
        self
    }

    /// Set the linear velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the angular velocity.
    #[must_use]
    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Mark the particle as frozen.
    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Zero the force and torque accumulators.
    pub fn clear_accumulators(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }

    /// Check the attributes every granular model needs.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::invalid_config(format!(
                "{} has invalid radius {}",
                self.tag, self.radius
            )));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::invalid_config(format!(
                "{} has invalid mass {}",
                self.tag, self.mass
            )));
        }
        if self.kind == 0 {
            return Err(SimError::invalid_config(format!(
                "{} has type 0 (types start at 1)",
                self.tag
            )));
        }
        Ok(())
    }
}

/// Particles visible to one worker: owned particles first, then ghosts.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    local_count: usize,
    ntypes: usize,
}

impl ParticleSystem {
    /// Create a system where every particle is owned.
    #[must_use]
    pub fn new(particles: Vec<Particle>) -> Self {
        let local_count = particles.len();
        let ntypes = particles.iter().map(|p| p.kind).max().unwrap_or(0);
        Self {
            particles,
            local_count,
            ntypes,
        }
    }

    /// Create a system from owned particles followed by ghost replicas.
    #[must_use]
    pub fn with_ghosts(owned: Vec<Particle>, ghosts: Vec<Particle>) -> Self {
        let local_count = owned.len();
        let mut particles = owned;
        particles.extend(ghosts);
        let ntypes = particles.iter().map(|p| p.kind).max().unwrap_or(0);
        Self {
            particles,
            local_count,
            ntypes,
        }
    }

    /// Declare the number of particle types (at least the largest type present).
    #[must_use]
    pub fn with_ntypes(mut self, ntypes: usize) -> Self {
        self.ntypes = self.ntypes.max(ntypes);
        self
    }

    /// Number of particle types.
    #[must_use]
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    /// Number of owned particles.
    #[must_use]
    pub fn local_count(&self) -> usize {
        self.local_count
    }

    /// Number of particles including ghosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check if the system holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Check whether a local index refers to an owned particle.
    #[must_use]
    pub fn is_local(&self, index: usize) -> bool {
        index < self.local_count
    }

    /// Get a particle by local index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Get a mutable particle by local index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// All particles, owned first.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to all particles.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Owned particles only.
    #[must_use]
    pub fn owned(&self) -> &[Particle] {
        &self.particles[..self.local_count]
    }

    /// Find the local index of a tag.
    #[must_use]
    pub fn index_of(&self, tag: ParticleTag) -> Option<usize> {
        self.particles.iter().position(|p| p.tag == tag)
    }

    /// Zero every force and torque accumulator.
    pub fn clear_accumulators(&mut self) {
        for p in &mut self.particles {
            p.clear_accumulators();
        }
    }

    /// Validate all particles.
    pub fn validate(&self) -> Result<()> {
        self.particles.iter().try_for_each(Particle::validate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_ordering_and_display() {
        assert!(ParticleTag::new(1) < ParticleTag::new(2));
        assert_eq!(ParticleTag::from(7).raw(), 7);
        assert_eq!(ParticleTag::new(3).to_string(), "Particle(3)");
    }

    #[test]
    fn test_system_with_ghosts() {
        let owned = vec![Particle::new(1, Point3::origin(), 0.5, 1.0)];
        let ghosts = vec![Particle::new(2, Point3::new(1.0, 0.0, 0.0), 0.5, 1.0).with_kind(2)];
        let system = ParticleSystem::with_ghosts(owned, ghosts);

        assert_eq!(system.len(), 2);
        assert_eq!(system.local_count(), 1);
        assert_eq!(system.ntypes(), 2);
        assert!(system.is_local(0));
        assert!(!system.is_local(1));
        assert_eq!(system.index_of(ParticleTag::new(2)), Some(1));
    }

    #[test]
    fn test_validate_rejects_missing_attributes() {
        let bad_radius = Particle::new(1, Point3::origin(), 0.0, 1.0);
        assert!(bad_radius.validate().is_err());

        let bad_mass = Particle::new(1, Point3::origin(), 1.0, f64::NAN);
        assert!(bad_mass.validate().is_err());

        let bad_kind = Particle::new(1, Point3::origin(), 1.0, 1.0).with_kind(0);
        assert!(bad_kind.validate().is_err());

        let ok = ParticleSystem::new(vec![Particle::new(1, Point3::origin(), 1.0, 1.0)]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_clear_accumulators() {
        let mut system = ParticleSystem::new(vec![Particle::new(1, Point3::origin(), 1.0, 1.0)]);
        system.get_mut(0).unwrap().force = Vector3::new(1.0, 2.0, 3.0);
        system.clear_accumulators();
        assert_eq!(system.get(0).unwrap().force, Vector3::zeros());
    }
}
