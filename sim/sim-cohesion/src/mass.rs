//! Effective mass of a contact pair.
//!
//! Damping terms scale with the reduced two-body mass. Particles that are
//! part of a rigid body contribute the body's total mass instead of their
//! own, and frozen particles are immovable anchors, so the effective mass
//! of a pair with one frozen member is simply the other member's mass.

use tracing::debug;

use crate::store::{Communicator, ParticleStore};

/// Mass of one side of a contact, after overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMass {
    /// Particle mass.
    pub mass: f64,
    /// Total mass of the rigid body the particle belongs to, if any.
    pub rigid_mass: Option<f64>,
    /// Whether the particle is frozen.
    pub frozen: bool,
}

impl ContactMass {
    /// A free particle of the given mass.
    #[must_use]
    pub fn free(mass: f64) -> Self {
        Self {
            mass,
            rigid_mass: None,
            frozen: false,
        }
    }

    /// Mass used in the reduced-mass formula.
    #[must_use]
    pub fn resolved(&self) -> f64 {
        match self.rigid_mass {
            Some(m) if m > 0.0 => m,
            _ => self.mass,
        }
    }
}

/// Reduced mass of a pair.
///
/// ```text
/// m_eff = m_i * m_j / (m_i + m_j)
/// ```
///
/// If `j` is frozen the result is `m_i`; otherwise if `i` is frozen it is
/// `m_j`.
#[must_use]
pub fn effective_mass(i: &ContactMass, j: &ContactMass) -> f64 {
    let mi = i.resolved();
    let mj = j.resolved();
    if j.frozen {
        mi
    } else if i.frozen {
        mj
    } else {
        mi * mj / (mi + mj)
    }
}

/// Supplies the total mass of the rigid body each owned particle belongs to.
pub trait RigidBodyMasses {
    /// Rigid-body mass of the owned particle at `index`, or `None` if the
    /// particle is not part of a rigid body.
    fn body_mass(&self, index: usize) -> Option<f64>;
}

/// Per-particle rigid-body masses for owned and ghost particles.
///
/// Refreshed whenever the neighbor list is rebuilt: owned entries come from
/// the [`RigidBodyMasses`] provider and are then forwarded to ghosts.
/// Entries of zero mean "not in a rigid body".
#[derive(Debug, Clone, Default)]
pub struct RigidMassCache {
    masses: Vec<f64>,
}

impl RigidMassCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute owned entries and forward them to ghosts.
    pub fn refresh<S, R, C>(&mut self, store: &S, provider: &R, comm: &mut C)
    where
        S: ParticleStore + ?Sized,
        R: RigidBodyMasses + ?Sized,
        C: Communicator + ?Sized,
    {
        let nlocal = store.local_count();
        let total = store.total_count();
        if self.masses.len() < total {
            self.masses.resize(total, 0.0);
        }
        for i in 0..nlocal {
            self.masses[i] = provider.body_mass(i).filter(|m| *m > 0.0).unwrap_or(0.0);
        }
        comm.forward(&mut self.masses[..total], nlocal);
        debug!(owned = nlocal, total, "Refreshed rigid-body masses");
    }

    /// Rigid-body mass of the particle at `index`, if it belongs to one.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.masses.get(index).copied().filter(|m| *m > 0.0)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Check if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Heap footprint in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.masses.capacity() * std::mem::size_of::<f64>()
    }
}

/// Resolve the [`ContactMass`] of a particle from the store and the cache.
pub(crate) fn contact_mass<S: ParticleStore + ?Sized>(
    store: &S,
    rigid: Option<&RigidMassCache>,
    index: usize,
) -> ContactMass {
    ContactMass {
        mass: store.mass(index),
        rigid_mass: rigid.and_then(|cache| cache.get(index)),
        frozen: store.is_frozen(index),
    }
}
