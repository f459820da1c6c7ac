//! Cohesive contact force evaluation.
//!
//! Every step, each neighbor pair goes through the same sequence:
//!
//! 1. **Activity.** An unbonded pair farther apart than the sum of radii,
//!    or with negative virtual overlap, is out of contact: its shear
//!    history is cleared and it exerts no force. A bonded pair whose
//!    virtual separation reaches the tensile limit breaks in tension.
//! 2. **Normal force.** Linear spring on the virtual overlap plus normal
//!    velocity damping:
//!
//!    ```text
//!    ccel = kn * D / r - m_eff * gamma_n * (v . delta) / r^2
//!    ```
//!
//! 3. **Shear history.** The tangential displacement integrates the
//!    relative tangential velocity at the contact point (including spin)
//!    and is projected back into the current tangent plane.
//! 4. **Friction and cohesion.** The tangential force is capped at
//!    `mu * |ccel * r|`, plus `pi * r_min * c` while bonded. Reaching the cap
//!    breaks a bond in shear; the stored history is rescaled so the next
//!    step continues from the capped state.
//!
//! `D` is the virtual overlap: geometric overlap minus the overlap recorded
//! when the bond formed. For unbonded pairs it is the plain overlap.

use nalgebra::Vector3;
use sim_types::{Result, SimError};
use tracing::{debug, warn};

use crate::history::{ContactHistory, ContactRecord, PairKey};
use crate::mass::{contact_mass, effective_mass, RigidMassCache};
use crate::neighbor::NeighborList;
use crate::params::CohesiveParams;
use crate::store::ParticleStore;

/// Kinematic state of a pair `(i, j)` at the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairKinematics {
    /// Separation vector `x_i - x_j`.
    pub delta: Vector3<f64>,
    /// Relative velocity `v_i - v_j`.
    pub relative_velocity: Vector3<f64>,
    /// Angular velocity of `i`.
    pub angular_velocity_i: Vector3<f64>,
    /// Angular velocity of `j`.
    pub angular_velocity_j: Vector3<f64>,
    /// Radius of `i`.
    pub radius_i: f64,
    /// Radius of `j`.
    pub radius_j: f64,
    /// Effective mass of the pair.
    pub effective_mass: f64,
}

impl PairKinematics {
    /// Two particles at rest, separated by `delta`.
    #[must_use]
    pub fn at_rest(
        delta: Vector3<f64>,
        radius_i: f64,
        radius_j: f64,
        effective_mass: f64,
    ) -> Self {
        Self {
            delta,
            relative_velocity: Vector3::zeros(),
            angular_velocity_i: Vector3::zeros(),
            angular_velocity_j: Vector3::zeros(),
            radius_i,
            radius_j,
            effective_mass,
        }
    }

    /// Set the relative velocity.
    #[must_use]
    pub fn with_relative_velocity(mut self, relative_velocity: Vector3<f64>) -> Self {
        self.relative_velocity = relative_velocity;
        self
    }

    /// Set both angular velocities.
    #[must_use]
    pub fn with_spin(mut self, omega_i: Vector3<f64>, omega_j: Vector3<f64>) -> Self {
        self.angular_velocity_i = omega_i;
        self.angular_velocity_j = omega_j;
        self
    }

    /// The same pair seen from `j`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            delta: -self.delta,
            relative_velocity: -self.relative_velocity,
            angular_velocity_i: self.angular_velocity_j,
            angular_velocity_j: self.angular_velocity_i,
            radius_i: self.radius_j,
            radius_j: self.radius_i,
            effective_mass: self.effective_mass,
        }
    }

    /// Center distance.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.delta.norm()
    }
}

/// Forces and torques produced by one active contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairForce {
    /// Total force on `i`; `j` receives the negation.
    pub force: Vector3<f64>,
    /// Torque on `i`.
    pub torque_i: Vector3<f64>,
    /// Torque on `j`.
    pub torque_j: Vector3<f64>,
    /// Tangential part of `force`, after capping.
    pub tangential: Vector3<f64>,
    /// Signed normal force magnitude `ccel * r` (positive is repulsive).
    pub normal_magnitude: f64,
    /// Tangential force cap used this step.
    pub tangential_limit: f64,
    /// Virtual overlap `D`.
    pub virtual_overlap: f64,
    /// Whether the tangential force reached the cap.
    pub sliding: bool,
    /// Whether a bond failed in shear this step.
    pub shear_failure: bool,
    /// Whether the pair lost contact this step (shear failure past the
    /// sum of radii); the force is then zero.
    pub separated: bool,
}

/// Result of evaluating one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Out of contact; no force.
    Separated,
    /// The bond failed in tension this step; no force.
    TensileFailure {
        /// Virtual overlap at failure (negative).
        virtual_overlap: f64,
    },
    /// Centers coincide so the contact normal is undefined; no force.
    Coincident,
    /// Contact force computed.
    Contact(PairForce),
}

impl PairOutcome {
    /// The computed force, if any.
    #[must_use]
    pub fn force(&self) -> Option<&PairForce> {
        match self {
            Self::Contact(force) => Some(force),
            _ => None,
        }
    }
}

/// Counters for one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Pairs visited.
    pub pairs_evaluated: usize,
    /// Pairs that produced a contact force.
    pub active_contacts: usize,
    /// Bonds broken in tension.
    pub tensile_failures: usize,
    /// Bonds broken in shear.
    pub shear_failures: usize,
    /// Shear failures where the pair was already fully separated.
    pub separations: usize,
    /// Pairs skipped because their centers coincide.
    pub coincident: usize,
}

/// The cohesive contact model.
///
/// # Example
///
/// ```
/// use sim_cohesion::{CohesiveContactModel, CohesiveParams, ContactRecord, PairKinematics};
/// use nalgebra::Vector3;
///
/// let model = CohesiveContactModel::new(CohesiveParams::default());
///
/// // Two unit spheres overlapping by 0.01 along x, at rest.
/// let pair = PairKinematics::at_rest(Vector3::new(1.99, 0.0, 0.0), 1.0, 1.0, 0.5);
/// let mut record = ContactRecord::default();
///
/// let outcome = model.evaluate_pair(&pair, &mut record, false, 1e-4);
/// let force = outcome.force().unwrap();
///
/// // Repulsive: pushes i (at +x) further along +x.
/// assert!(force.force.x > 0.0);
/// assert!(record.touching);
/// ```
#[derive(Debug, Clone)]
pub struct CohesiveContactModel {
    params: CohesiveParams,
}

impl CohesiveContactModel {
    /// Create a model with the given parameters.
    #[must_use]
    pub fn new(params: CohesiveParams) -> Self {
        Self { params }
    }

    /// Model parameters.
    #[must_use]
    pub fn params(&self) -> &CohesiveParams {
        &self.params
    }

    /// Evaluate one pair and update its record.
    ///
    /// `flipped` tells whether `i` is the higher-tagged particle of the pair
    /// (see [`PairKey::oriented`]); the stored shear is read and written in
    /// the canonical orientation.
    ///
    /// When the tangential force is capped, the stored shear is rescaled so
    /// that re-evaluating at the same tangential velocity with no further
    /// displacement reproduces the capped force. The viscous share
    /// `m_eff * gamma_t * v_t` is folded into that history, so a pair that
    /// comes to rest afterwards sees the capped force shifted by it.
    #[must_use]
    #[allow(clippy::similar_names)]
    pub fn evaluate_pair(
        &self,
        pair: &PairKinematics,
        record: &mut ContactRecord,
        flipped: bool,
        dt: f64,
    ) -> PairOutcome {
        let p = &self.params;
        let delta = pair.delta;
        let rsq = delta.norm_squared();
        let r = rsq.sqrt();
        let radsum = pair.radius_i + pair.radius_j;
        let radmin = pair.radius_i.min(pair.radius_j);

        if !record.is_cohesive() && r > radsum {
            record.lose_contact();
            return PairOutcome::Separated;
        }

        let overlap = (radsum - r) - record.initial_gap;
        if overlap < 0.0 {
            if !record.is_cohesive() {
                record.lose_contact();
                return PairOutcome::Separated;
            }
            if overlap.abs() >= record.tensile_limit {
                record.lose_contact();
                record.break_tensile();
                return PairOutcome::TensileFailure {
                    virtual_overlap: overlap,
                };
            }
        }

        if rsq < f64::MIN_POSITIVE {
            record.touching = true;
            return PairOutcome::Coincident;
        }

        let rinv = 1.0 / r;
        let rsqinv = 1.0 / rsq;
        let meff = pair.effective_mass;
        let gamma_t = p.effective_tangential_damping();
        let kt = p.tangential_stiffness;

        // Relative velocity split into normal and tangential parts.
        let v_rel = pair.relative_velocity;
        let vnnr = v_rel.dot(&delta);
        let vt = v_rel - delta * (vnnr * rsqinv);

        // Spin contribution, normalized by the current distance.
        let wr = (pair.angular_velocity_i * pair.radius_i
            + pair.angular_velocity_j * pair.radius_j)
            * rinv;

        let damp = meff * p.normal_damping * vnnr * rsqinv;
        let ccel = p.normal_stiffness * overlap * rinv - damp;

        // Relative tangential velocity at the contact point.
        let vtr = vt + delta.cross(&wr);

        let mut shear = record.shear_for(flipped) + vtr * dt;
        let shrmag = shear.norm();

        // Project the history into the current tangent plane.
        let rsht = shear.dot(&delta) * rsqinv;
        shear -= delta * rsht;

        let mut fs = -(shear * kt + vtr * (meff * gamma_t));

        let cohesive = record.is_cohesive();
        let limit = if cohesive {
            p.friction_coefficient * (ccel * r).abs() + p.max_shear_force(radmin)
        } else {
            p.friction_coefficient * (ccel * r).abs()
        };

        let fs_mag = fs.norm();
        let sliding = fs_mag >= limit;
        if sliding {
            if shrmag > 0.0 && fs_mag > 0.0 {
                let ratio = limit / fs_mag;
                if kt > 0.0 {
                    let damped = vtr * (meff * gamma_t / kt);
                    shear = (shear + damped) * ratio - damped;
                } else {
                    shear *= ratio;
                }
                fs *= ratio;
            } else {
                fs = Vector3::zeros();
            }
        }
        record.set_shear_for(shear, flipped);
        record.touching = true;

        let mut normal = delta * ccel;
        let shear_failure = sliding && cohesive;
        let mut separated = false;
        if shear_failure {
            record.break_shear();
            if rsq > radsum * radsum {
                // Bond gone and no geometric contact left.
                record.lose_contact();
                fs = Vector3::zeros();
                normal = Vector3::zeros();
                separated = true;
            }
        }

        let tor = delta.cross(&fs) * rinv;
        PairOutcome::Contact(PairForce {
            force: normal + fs,
            torque_i: -tor * pair.radius_i,
            torque_j: -tor * pair.radius_j,
            tangential: fs,
            normal_magnitude: ccel * r,
            tangential_limit: limit,
            virtual_overlap: overlap,
            sliding,
            shear_failure,
            separated,
        })
    }

    /// Gather the kinematics of pair `(i, j)` from the store.
    pub fn kinematics<S: ParticleStore + ?Sized>(
        &self,
        store: &S,
        rigid: Option<&RigidMassCache>,
        i: usize,
        j: usize,
    ) -> PairKinematics {
        let mi = contact_mass(store, rigid, i);
        let mj = contact_mass(store, rigid, j);
        PairKinematics {
            delta: store.position(i) - store.position(j),
            relative_velocity: store.velocity(i) - store.velocity(j),
            angular_velocity_i: store.angular_velocity(i),
            angular_velocity_j: store.angular_velocity(j),
            radius_i: store.radius(i),
            radius_j: store.radius(j),
            effective_mass: effective_mass(&mi, &mj),
        }
    }

    /// Evaluate every pair of `neighbors` and accumulate forces and torques.
    ///
    /// Forces on `j` are applied when `newton_pair` is set or `j` is owned;
    /// otherwise the owner of `j` accounts for them.
    pub fn compute<S: ParticleStore + ?Sized>(
        &self,
        store: &mut S,
        neighbors: &NeighborList,
        history: &mut ContactHistory,
        rigid: Option<&RigidMassCache>,
        dt: f64,
        newton_pair: bool,
    ) -> Result<StepReport> {
        let total = store.total_count();
        if let Some(index) = neighbors
            .pairs()
            .flat_map(|(i, j)| [i, j])
            .find(|&index| index >= total)
        {
            return Err(SimError::InvalidParticleIndex { index, len: total });
        }

        let nlocal = store.local_count();
        let mut report = StepReport::default();

        for (i, js) in neighbors.iter() {
            let tag_i = store.tag(i);
            for &j in js {
                let tag_j = store.tag(j);
                let (key, flipped) = PairKey::oriented(tag_i, tag_j);
                let pair = self.kinematics(&*store, rigid, i, j);
                let outcome = self.evaluate_pair(&pair, history.record_mut(key), flipped, dt);
                report.pairs_evaluated += 1;

                match outcome {
                    PairOutcome::Separated => {}
                    PairOutcome::TensileFailure { virtual_overlap } => {
                        report.tensile_failures += 1;
                        debug!(pair = %key, virtual_overlap, "Bond failed in tension");
                    }
                    PairOutcome::Coincident => {
                        report.coincident += 1;
                        warn!(pair = %key, "Coincident particle centers, contact skipped");
                    }
                    PairOutcome::Contact(f) => {
                        report.active_contacts += 1;
                        if f.shear_failure {
                            report.shear_failures += 1;
                            if f.separated {
                                report.separations += 1;
                            }
                            debug!(
                                pair = %key,
                                tangential_limit = f.tangential_limit,
                                separated = f.separated,
                                "Bond failed in shear"
                            );
                        }
                        store.add_force(i, f.force);
                        store.add_torque(i, f.torque_i);
                        if newton_pair || j < nlocal {
                            store.add_force(j, -f.force);
                            store.add_torque(j, f.torque_j);
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::history::BondState;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const DT: f64 = 1e-4;

    fn params() -> CohesiveParams {
        CohesiveParams::default()
            .with_normal_stiffness(1.0e4)
            .with_tangential_stiffness(2.0e3)
            .with_damping(0.0, 0.0)
            .with_friction(0.5)
            .with_tensile_strength(10.0)
            .with_cohesive_shear_strength(1.0)
    }

    fn model() -> CohesiveContactModel {
        CohesiveContactModel::new(params())
    }

    fn pair_at(distance: f64) -> PairKinematics {
        PairKinematics::at_rest(Vector3::new(distance, 0.0, 0.0), 1.0, 1.0, 0.5)
    }

    #[test]
    fn test_unbonded_separated_pair_has_no_force() {
        let mut record = ContactRecord {
            touching: true,
            ..ContactRecord::default()
        };
        record.set_shear_for(Vector3::y(), false);

        let outcome = model().evaluate_pair(&pair_at(2.1), &mut record, false, DT);

        assert_eq!(outcome, PairOutcome::Separated);
        assert!(!record.touching);
        assert_eq!(record.shear(), Vector3::zeros());
    }

    #[test]
    fn test_hookean_normal_force() {
        let mut record = ContactRecord::default();
        let outcome = model().evaluate_pair(&pair_at(1.99), &mut record, false, DT);
        let f = outcome.force().unwrap();

        // F = kn * D along the separation direction.
        assert_relative_eq!(f.force.x, 1.0e4 * 0.01, epsilon = 1e-9);
        assert_relative_eq!(f.force.y, 0.0);
        assert_relative_eq!(f.normal_magnitude, 100.0, epsilon = 1e-9);
        assert!(record.touching);
    }

    #[test]
    fn test_normal_damping_opposes_approach() {
        let p = params().with_damping(10.0, 0.0);
        let m = CohesiveContactModel::new(p);
        let approaching = pair_at(1.99).with_relative_velocity(Vector3::new(-1.0, 0.0, 0.0));

        let f = *m
            .evaluate_pair(&approaching, &mut ContactRecord::default(), false, DT)
            .force()
            .unwrap();
        let rest = *m
            .evaluate_pair(&pair_at(1.99), &mut ContactRecord::default(), false, DT)
            .force()
            .unwrap();

        // meff * gamma_n * |v| extra repulsion.
        assert_relative_eq!(f.force.x - rest.force.x, 0.5 * 10.0 * 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bonded_pair_at_formation_is_force_free() {
        let mut record = ContactRecord::bonded(0.05, 1.0);
        let outcome = model().evaluate_pair(&pair_at(1.95), &mut record, false, DT);
        let f = outcome.force().unwrap();
        assert_relative_eq!(f.force.norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(f.virtual_overlap, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bonded_pair_pulls_back_when_stretched() {
        let limit = params().tensile_limit(1.0);
        let mut record = ContactRecord::bonded(0.05, limit);

        // Stretch by half the tensile limit.
        let outcome = model().evaluate_pair(&pair_at(1.95 + 0.5 * limit), &mut record, false, DT);
        let f = outcome.force().unwrap();

        assert!(f.force.x < 0.0, "bond should be attractive");
        assert!(record.is_cohesive());
    }

    #[test]
    fn test_tensile_failure() {
        let limit = params().tensile_limit(1.0);
        assert_relative_eq!(limit, PI * 10.0 / 1.0e4);
        let mut record = ContactRecord::bonded(0.05, limit);
        record.touching = true;

        let outcome = model().evaluate_pair(&pair_at(1.95 + 1.01 * limit), &mut record, false, DT);

        assert!(matches!(outcome, PairOutcome::TensileFailure { .. }));
        assert_eq!(record.bond, BondState::BrokenTensile);
        assert_eq!(record.tensile_break_count, 1);
        assert!(!record.touching);

        // Afterwards it is plain contact: still overlapping, so repulsive.
        let distance = 1.95 + 1.01 * limit;
        let again = model().evaluate_pair(&pair_at(distance), &mut record, false, DT);
        let f = again.force().unwrap();
        assert_relative_eq!(f.force.x, 1.0e4 * (2.0 - distance), epsilon = 1e-9);
        assert!(record.touching);
        assert_eq!(record.tensile_break_count, 1);
    }

    #[test]
    fn test_broken_pair_repels_by_plain_overlap() {
        // Bonded across a gap, then broken in shear: the formation gap no
        // longer shifts the overlap.
        let mut record = ContactRecord::bonded(-0.1, 0.002);
        record.break_shear();

        let outcome = model().evaluate_pair(&pair_at(1.98), &mut record, false, DT);
        let f = outcome.force().unwrap();
        assert_relative_eq!(f.virtual_overlap, 0.02, epsilon = 1e-12);
        assert_relative_eq!(f.force.x, 1.0e4 * 0.02, epsilon = 1e-9);

        // At exactly touching distance there is nothing to push against.
        let touching = model().evaluate_pair(&pair_at(2.0), &mut record, false, DT);
        assert_relative_eq!(touching.force().unwrap().force.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shear_history_accumulates_in_tangent_plane() {
        let sliding = pair_at(1.99).with_relative_velocity(Vector3::new(0.3, 0.2, 0.0));
        let mut record = ContactRecord::default();
        let _ = model().evaluate_pair(&sliding, &mut record, false, DT);

        let shear = record.shear();
        assert_relative_eq!(shear.x, 0.0, epsilon = 1e-15);
        assert_relative_eq!(shear.y, 0.2 * DT, epsilon = 1e-15);
    }

    #[test]
    fn test_spin_contributes_to_tangential_velocity() {
        // Both particles spinning about z in the same sense: surfaces slide
        // past each other along y.
        let spinning = pair_at(1.99).with_spin(Vector3::z(), Vector3::z());
        let mut record = ContactRecord::default();
        let outcome = model().evaluate_pair(&spinning, &mut record, false, DT);
        let f = outcome.force().unwrap();

        // wr = (1 + 1) / 1.99 * z, vtr = delta x wr = -1.99 * wr_z * y = -2 y
        assert_relative_eq!(record.shear().y, -2.0 * DT, epsilon = 1e-12);
        assert!(f.tangential.y > 0.0);
        // Each torque uses its own radius.
        assert_relative_eq!(f.torque_i, f.torque_j, epsilon = 1e-12);
        assert!(f.torque_i.z < 0.0);
    }

    #[test]
    fn test_friction_cap_rescales_history() {
        let mut record = ContactRecord::default();
        record.set_shear_for(Vector3::new(0.0, 1.0, 0.0), false);
        record.touching = true;

        let outcome = model().evaluate_pair(&pair_at(1.99), &mut record, false, DT);
        let f = outcome.force().unwrap();

        assert!(f.sliding);
        assert_relative_eq!(f.tangential.norm(), 0.5 * 100.0, epsilon = 1e-9);
        // Undamped: stored history reproduces the capped force.
        assert_relative_eq!(record.shear().y * 2.0e3, 50.0, epsilon = 1e-9);
        assert!(!f.shear_failure);
    }

    #[test]
    fn test_zero_history_at_cap_gives_zero_tangential_force() {
        // Frictionless, unbonded: cap is zero, history empty.
        let m = CohesiveContactModel::new(params().with_friction(0.0));
        let mut record = ContactRecord::default();
        let outcome = m.evaluate_pair(&pair_at(1.99), &mut record, false, DT);
        let f = outcome.force().unwrap();
        assert!(f.sliding);
        assert_eq!(f.tangential, Vector3::zeros());
        assert!(f.force.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_shear_failure_while_overlapping() {
        let mut record = ContactRecord::bonded(0.0, 1.0);
        record.set_shear_for(Vector3::new(0.0, 1.0, 0.0), false);

        let outcome = model().evaluate_pair(&pair_at(1.99), &mut record, false, DT);
        let f = outcome.force().unwrap();

        assert!(f.shear_failure);
        assert_relative_eq!(f.tangential_limit, 0.5 * 100.0 + PI * 1.0, epsilon = 1e-9);
        assert_relative_eq!(f.tangential.norm(), f.tangential_limit, epsilon = 1e-9);
        assert_eq!(record.bond, BondState::BrokenShear);
        assert_eq!(record.shear_break_count, 1);
        assert!(record.touching);
    }

    #[test]
    fn test_shear_failure_while_separated_zeroes_force() {
        // Bonded across a gap: r > radsum but virtual overlap is positive.
        let mut record = ContactRecord::bonded(-0.1, 1.0);
        record.set_shear_for(Vector3::new(0.0, 1.0, 0.0), false);

        let outcome = model().evaluate_pair(&pair_at(2.05), &mut record, false, DT);
        let f = outcome.force().unwrap();

        assert!(f.shear_failure);
        assert!(f.separated);
        assert_eq!(f.force, Vector3::zeros());
        assert_eq!(f.torque_i, Vector3::zeros());
        assert!(!record.touching);
        assert_eq!(record.shear(), Vector3::zeros());

        // Next step: unbonded and apart.
        let next = model().evaluate_pair(&pair_at(2.05), &mut record, false, DT);
        assert_eq!(next, PairOutcome::Separated);
        assert_eq!(record.shear_break_count, 1);
    }

    #[test]
    fn test_coincident_centers() {
        let mut record = ContactRecord::default();
        let outcome = model().evaluate_pair(&pair_at(0.0), &mut record, false, DT);
        assert_eq!(outcome, PairOutcome::Coincident);
        assert!(record.touching);
    }

    #[test]
    fn test_reversed_traversal_is_antisymmetric() {
        let pair = PairKinematics::at_rest(Vector3::new(1.2, 0.7, -0.3), 0.8, 0.6, 0.4)
            .with_relative_velocity(Vector3::new(-0.2, 0.4, 0.1))
            .with_spin(Vector3::new(0.0, 1.0, 2.0), Vector3::new(-1.0, 0.5, 0.0));
        let m = CohesiveContactModel::new(params().with_damping(5.0, 2.0));

        let mut forward = ContactRecord::bonded(0.02, 1.0);
        let mut backward = forward;
        let f = *m.evaluate_pair(&pair, &mut forward, false, DT).force().unwrap();
        let b = *m
            .evaluate_pair(&pair.reversed(), &mut backward, true, DT)
            .force()
            .unwrap();

        assert_relative_eq!(f.force, -b.force, epsilon = 1e-12);
        assert_relative_eq!(f.torque_i, b.torque_j, epsilon = 1e-12);
        assert_relative_eq!(f.torque_j, b.torque_i, epsilon = 1e-12);
        assert_relative_eq!(forward.shear(), backward.shear(), epsilon = 1e-15);
        assert_eq!(forward.touching, backward.touching);
    }
}
