//! Property-based tests for the cohesive contact model.
//!
//! Run with: cargo test -p sim-cohesion -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::relative_eq;
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use sim_cohesion::{
    CohesiveContactModel, CohesiveParams, ContactHistory, ContactRecord, NeighborList, PairKey,
    PairKinematics,
};
use sim_types::{Particle, ParticleSystem, ParticleTag};

// =============================================================================
// Strategies
// =============================================================================

fn arb_vector(bound: f64) -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-bound..bound).prop_map(|[x, y, z]| Vector3::new(x, y, z))
}

/// Separation vector with length in `[0.5, 2.5)`, never degenerate.
fn arb_delta() -> impl Strategy<Value = Vector3<f64>> {
    (0.5..2.5f64, 0.0..std::f64::consts::PI, 0.0..std::f64::consts::TAU).prop_map(
        |(r, theta, phi)| {
            Vector3::new(
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            )
        },
    )
}

fn arb_params() -> impl Strategy<Value = CohesiveParams> {
    (
        1.0e3..1.0e5f64,
        0.0..50.0f64,
        0.0..1.0f64,
        0.0..200.0f64,
        0.0..200.0f64,
        1.0..1.3f64,
    )
        .prop_map(|(kn, gamma_n, mu, t, c, enlarge)| {
            CohesiveParams::default()
                .with_normal_stiffness(kn)
                .with_tangential_stiffness(kn * 2.0 / 7.0)
                .with_damping(gamma_n, 0.5 * gamma_n)
                .with_friction(mu)
                .with_tensile_strength(t)
                .with_cohesive_shear_strength(c)
                .with_enlarge_factor(enlarge)
        })
}

fn arb_record() -> impl Strategy<Value = ContactRecord> {
    (any::<bool>(), -0.2..0.2f64, 0.0..0.01f64, arb_vector(0.01)).prop_map(
        |(bonded, gap, limit, shear)| {
            let mut record = if bonded {
                ContactRecord::bonded(gap, limit)
            } else {
                ContactRecord::default()
            };
            record.set_shear_for(shear, false);
            record
        },
    )
}

fn two_particles(
    delta: Vector3<f64>,
    vel: Vector3<f64>,
    spin: (Vector3<f64>, Vector3<f64>),
) -> ParticleSystem {
    ParticleSystem::new(vec![
        Particle::new(1, Point3::from(delta), 0.9, 1.3)
            .with_velocity(vel)
            .with_angular_velocity(spin.0),
        Particle::new(2, Point3::origin(), 1.1, 0.7).with_angular_velocity(spin.1),
    ])
}

fn close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    relative_eq!(*a, *b, epsilon = 1e-10, max_relative = 1e-10)
}

// =============================================================================
// Property Tests: Symmetry
// =============================================================================

proptest! {
    /// Traversing a pair from either side yields the same record and
    /// equal-and-opposite forces.
    #[test]
    fn proptest_traversal_order_is_symmetric(
        params in arb_params(),
        delta in arb_delta(),
        vel in arb_vector(2.0),
        spin_a in arb_vector(5.0),
        spin_b in arb_vector(5.0),
        record in arb_record(),
    ) {
        let model = CohesiveContactModel::new(params);
        let key = PairKey::new(ParticleTag::new(1), ParticleTag::new(2));
        let mut results = Vec::new();

        for order in [(0, 1), (1, 0)] {
            let mut system = two_particles(delta, vel, (spin_a, spin_b));
            let mut history = ContactHistory::new();
            history.insert(key, record);
            let neighbors = NeighborList::from_pairs([order]);
            model
                .compute(&mut system, &neighbors, &mut history, None, 1e-3, true)
                .unwrap();
            let stored = *history.get(key.low(), key.high()).unwrap();
            results.push((system, stored));
        }

        let (forward, fwd_record) = &results[0];
        let (backward, bwd_record) = &results[1];
        for k in 0..2 {
            let a = &forward.particles()[k];
            let b = &backward.particles()[k];
            prop_assert!(close(&a.force, &b.force), "force {k}: {} vs {}", a.force, b.force);
            prop_assert!(close(&a.torque, &b.torque), "torque {k}: {} vs {}", a.torque, b.torque);
        }
        prop_assert!(close(&forward.particles()[0].force, &-forward.particles()[1].force));
        prop_assert_eq!(fwd_record.bond, bwd_record.bond);
        prop_assert_eq!(fwd_record.touching, bwd_record.touching);
        prop_assert!(close(&fwd_record.shear(), &bwd_record.shear()));
    }

    /// Each particle's torque scales with its own radius.
    #[test]
    fn proptest_torques_use_own_radius(
        delta in arb_delta(),
        vel in arb_vector(2.0),
        record in arb_record(),
    ) {
        let model = CohesiveContactModel::new(CohesiveParams::default());
        let pair = PairKinematics::at_rest(delta, 0.9, 1.1, 0.5).with_relative_velocity(vel);
        let mut record = record;
        if let Some(f) = model.evaluate_pair(&pair, &mut record, false, 1e-3).force() {
            prop_assert!(close(&(f.torque_i * 1.1), &(f.torque_j * 0.9)));
        }
    }
}

// =============================================================================
// Property Tests: Bond monotonicity
// =============================================================================

proptest! {
    /// A bond only ever goes from intact to broken, at most once.
    #[test]
    fn proptest_bond_breaks_at_most_once(
        params in arb_params(),
        steps in prop::collection::vec((1.7..2.4f64, arb_vector(3.0)), 1..60),
    ) {
        let model = CohesiveContactModel::new(params);
        let gap = 2.0 - 1.95;
        let mut record = ContactRecord::bonded(gap, params.tensile_limit(1.0));
        let mut was_cohesive = true;

        for (distance, vel) in steps {
            let pair = PairKinematics::at_rest(Vector3::new(distance, 0.0, 0.0), 1.0, 1.0, 0.5)
                .with_relative_velocity(vel);
            let _ = model.evaluate_pair(&pair, &mut record, false, 1e-3);

            prop_assert!(was_cohesive || !record.is_cohesive(), "bond re-formed");
            was_cohesive = record.is_cohesive();
        }

        prop_assert!(record.tensile_break_count + record.shear_break_count <= 1);
        prop_assert_eq!(record.bond.is_broken(), !record.is_cohesive());
    }

    /// Forces stay finite for any reachable state.
    #[test]
    fn proptest_forces_are_finite(
        params in arb_params(),
        delta in arb_delta(),
        vel in arb_vector(10.0),
        record in arb_record(),
    ) {
        let model = CohesiveContactModel::new(params);
        let pair = PairKinematics::at_rest(delta, 1.0, 1.0, 0.5).with_relative_velocity(vel);
        let mut record = record;
        if let Some(f) = model.evaluate_pair(&pair, &mut record, false, 1e-3).force() {
            prop_assert!(f.force.iter().all(|c| c.is_finite()));
            prop_assert!(f.tangential.norm() <= f.tangential_limit * (1.0 + 1e-9) + 1e-12);
        }
        prop_assert!(record.shear().iter().all(|c| c.is_finite()));
    }
}
