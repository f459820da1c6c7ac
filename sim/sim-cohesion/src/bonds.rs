//! One-time bond formation.
//!
//! At the start of a run every neighbor pair within the enlarged bonding
//! distance receives an adhesive bond. The overlap at that moment becomes
//! the pair's reference (`initial_gap`), so a bonded pair at rest exerts no
//! normal force, and the tensile limit is fixed from the smaller radius.

use tracing::info;

use crate::history::{ContactHistory, ContactRecord, PairKey};
use crate::neighbor::NeighborList;
use crate::params::CohesiveParams;
use crate::store::ParticleStore;

/// Outcome of bond formation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BondReport {
    /// Pairs that formed a bond.
    pub bonded: usize,
    /// Pairs left without a bond.
    pub unbonded: usize,
}

impl BondReport {
    /// Total pairs examined.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bonded + self.unbonded
    }
}

/// Decide the initial bond state of a single pair.
///
/// `distance` is the center distance at formation time.
#[must_use]
pub fn bond_record(
    params: &CohesiveParams,
    radius_i: f64,
    radius_j: f64,
    distance: f64,
) -> ContactRecord {
    if distance <= params.bond_distance(radius_i, radius_j) {
        let gap = radius_i + radius_j - distance;
        ContactRecord::bonded(gap, params.tensile_limit(radius_i.min(radius_j)))
    } else {
        ContactRecord::default()
    }
}

/// Form bonds for every pair in `neighbors`.
///
/// Records are keyed by particle tag and overwritten with the formation
/// decision, so this must run before any force evaluation of the run.
pub fn form_bonds<S: ParticleStore + ?Sized>(
    params: &CohesiveParams,
    store: &S,
    neighbors: &NeighborList,
    history: &mut ContactHistory,
) -> BondReport {
    let mut report = BondReport::default();

    for (i, j) in neighbors.pairs() {
        let distance = (store.position(i) - store.position(j)).norm();
        let record = bond_record(params, store.radius(i), store.radius(j), distance);
        if record.is_cohesive() {
            report.bonded += 1;
        } else {
            report.unbonded += 1;
        }
        history.insert(PairKey::new(store.tag(i), store.tag(j)), record);
    }

    info!(
        bonded = report.bonded,
        unbonded = report.unbonded,
        enlarge_factor = params.enlarge_factor,
        "Formed cohesive bonds"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::history::BondState;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use sim_types::{Particle, ParticleSystem, ParticleTag};
    use std::f64::consts::PI;

    fn params() -> CohesiveParams {
        CohesiveParams::default()
            .with_normal_stiffness(1.0e4)
            .with_tensile_strength(5.0)
            .with_enlarge_factor(1.2)
    }

    #[test]
    fn test_overlapping_pair_bonds() {
        let record = bond_record(&params(), 1.0, 1.0, 1.95);
        assert_eq!(record.bond, BondState::Bonded);
        assert_relative_eq!(record.initial_gap, 0.05, epsilon = 1e-12);
        assert_relative_eq!(record.tensile_limit, PI * 1.0 * 5.0 / 1.0e4);
        assert!(!record.touching);
    }

    #[test]
    fn test_gap_within_enlarged_distance_bonds_with_negative_gap() {
        // Enlarged distance = 2.0 + 0.2 * 1.0 = 2.2
        let record = bond_record(&params(), 1.0, 1.0, 2.1);
        assert!(record.is_cohesive());
        assert_relative_eq!(record.initial_gap, -0.1, epsilon = 1e-12);

        let edge = bond_record(&params(), 1.0, 1.0, 2.199);
        assert!(edge.is_cohesive());
    }

    #[test]
    fn test_distant_pair_does_not_bond() {
        let record = bond_record(&params(), 1.0, 1.0, 2.3);
        assert_eq!(record, ContactRecord::default());
        assert_eq!(record.tensile_limit, 0.0);
        assert_eq!(record.initial_gap, 0.0);
    }

    #[test]
    fn test_tensile_limit_uses_smaller_radius() {
        let record = bond_record(&params(), 1.0, 0.25, 1.2);
        assert_relative_eq!(record.tensile_limit, PI * 0.25 * 5.0 / 1.0e4);
    }

    #[test]
    fn test_form_bonds_keys_by_tag() {
        let system = ParticleSystem::new(vec![
            Particle::new(42, Point3::origin(), 1.0, 1.0),
            Particle::new(7, Point3::new(1.95, 0.0, 0.0), 1.0, 1.0),
            Particle::new(9, Point3::new(10.0, 0.0, 0.0), 1.0, 1.0),
        ]);
        let neighbors = NeighborList::from_pairs([(0, 1), (1, 2)]);
        let mut history = ContactHistory::new();

        let report = form_bonds(&params(), &system, &neighbors, &mut history);

        assert_eq!(report, BondReport { bonded: 1, unbonded: 1 });
        assert_eq!(report.total(), 2);
        let bonded = history.get(ParticleTag::new(7), ParticleTag::new(42)).unwrap();
        assert!(bonded.is_cohesive());
        let plain = history.get(ParticleTag::new(9), ParticleTag::new(7)).unwrap();
        assert_eq!(plain.bond, BondState::NeverBonded);
    }
}
