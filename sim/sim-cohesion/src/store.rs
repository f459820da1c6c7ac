//! Collaborator interfaces: particle storage and cross-worker communication.
//!
//! The contact model never owns particles. It reads kinematics through
//! [`ParticleStore`] by local index (owned particles first, then ghosts) and
//! accumulates forces and torques back through the same trait.

use nalgebra::Vector3;
use sim_types::{ParticleSystem, ParticleTag};

/// Random access to particle state by local index.
pub trait ParticleStore {
    /// Number of owned particles. Indices below this are owned.
    fn local_count(&self) -> usize;

    /// Number of particles including ghosts.
    fn total_count(&self) -> usize;

    /// Number of particle types.
    fn type_count(&self) -> usize;

    /// Stable tag of the particle at `index`.
    fn tag(&self, index: usize) -> ParticleTag;

    /// Particle type, `1..=type_count()`.
    fn kind(&self, index: usize) -> usize;

    /// Center position.
    fn position(&self, index: usize) -> Vector3<f64>;

    /// Linear velocity.
    fn velocity(&self, index: usize) -> Vector3<f64>;

    /// Angular velocity.
    fn angular_velocity(&self, index: usize) -> Vector3<f64>;

    /// Radius.
    fn radius(&self, index: usize) -> f64;

    /// Mass.
    fn mass(&self, index: usize) -> f64;

    /// Whether the particle belongs to the frozen group.
    fn is_frozen(&self, index: usize) -> bool;

    /// Add into the force accumulator.
    fn add_force(&mut self, index: usize, force: Vector3<f64>);

    /// Add into the torque accumulator.
    fn add_torque(&mut self, index: usize, torque: Vector3<f64>);
}

impl ParticleStore for ParticleSystem {
    fn local_count(&self) -> usize {
        ParticleSystem::local_count(self)
    }

    fn total_count(&self) -> usize {
        self.len()
    }

    fn type_count(&self) -> usize {
        self.ntypes()
    }

    fn tag(&self, index: usize) -> ParticleTag {
        self.particles()[index].tag
    }

    fn kind(&self, index: usize) -> usize {
        self.particles()[index].kind
    }

    fn position(&self, index: usize) -> Vector3<f64> {
        self.particles()[index].position.coords
    }

    fn velocity(&self, index: usize) -> Vector3<f64> {
        self.particles()[index].velocity
    }

    fn angular_velocity(&self, index: usize) -> Vector3<f64> {
        self.particles()[index].angular_velocity
    }

    fn radius(&self, index: usize) -> f64 {
        self.particles()[index].radius
    }

    fn mass(&self, index: usize) -> f64 {
        self.particles()[index].mass
    }

    fn is_frozen(&self, index: usize) -> bool {
        self.particles()[index].frozen
    }

    fn add_force(&mut self, index: usize, force: Vector3<f64>) {
        self.particles_mut()[index].force += force;
    }

    fn add_torque(&mut self, index: usize, torque: Vector3<f64>) {
        self.particles_mut()[index].torque += torque;
    }
}

/// Cross-worker communication used by the contact model.
///
/// Implementations wrap whatever transport the simulation uses. Both calls
/// are collective: every worker must make them in the same order.
pub trait Communicator {
    /// Copy owned per-particle values onto their ghost replicas.
    ///
    /// `values` is indexed like the particle store: owned entries are
    /// sources, ghost entries are overwritten.
    fn forward(&mut self, values: &mut [f64], local_count: usize);

    /// Element-wise maximum across all workers, in place.
    fn all_reduce_max(&mut self, values: &mut [f64]);
}

/// Communicator for a single worker with no remote ghosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn forward(&mut self, _values: &mut [f64], _local_count: usize) {}

    fn all_reduce_max(&mut self, _values: &mut [f64]) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use sim_types::Particle;

    #[test]
    fn test_particle_system_store() {
        let mut system = ParticleSystem::with_ghosts(
            vec![Particle::new(10, Point3::new(1.0, 2.0, 3.0), 0.5, 2.0)],
            vec![Particle::new(11, Point3::origin(), 0.25, 1.0).frozen()],
        );

        assert_eq!(ParticleStore::local_count(&system), 1);
        assert_eq!(system.total_count(), 2);
        assert_eq!(system.tag(1), ParticleTag::new(11));
        assert_eq!(system.position(0), Vector3::new(1.0, 2.0, 3.0));
        assert!(system.is_frozen(1));

        system.add_force(0, Vector3::x());
        system.add_force(0, Vector3::x());
        system.add_torque(1, Vector3::z());
        assert_eq!(system.get(0).unwrap().force, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(system.get(1).unwrap().torque, Vector3::z());
    }

    #[test]
    fn test_serial_comm_is_identity() {
        let mut values = vec![1.0, 2.0, 3.0];
        let mut comm = SerialComm;
        comm.forward(&mut values, 1);
        comm.all_reduce_max(&mut values);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
