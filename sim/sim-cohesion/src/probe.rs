//! Read-only evaluation of a single pair.
//!
//! Runs the force law on a copy of the pair's record, so callers can inspect
//! what a contact would do without advancing its history.

use nalgebra::Vector3;

use crate::history::{BondState, ContactRecord};
use crate::model::{CohesiveContactModel, PairKinematics, PairOutcome};

/// What one pair would experience this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairProbe {
    /// Full outcome of the evaluation.
    pub outcome: PairOutcome,
    /// Signed normal force magnitude (positive is repulsive).
    pub normal_force: f64,
    /// Tangential force on `i`.
    pub tangential_force: Vector3<f64>,
    /// Tangential force cap.
    pub tangential_limit: f64,
    /// Virtual overlap.
    pub virtual_overlap: f64,
    /// Tensile limit stored for the pair.
    pub tensile_limit: f64,
    /// Bond state before the evaluation.
    pub bond_before: BondState,
    /// Bond state the evaluation would leave behind.
    pub bond_after: BondState,
}

impl PairProbe {
    /// Whether the pair would exert any force.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.outcome, PairOutcome::Contact(f) if !f.separated)
    }

    /// Whether the evaluation would break the bond.
    #[must_use]
    pub fn breaks_bond(&self) -> bool {
        self.bond_before.is_cohesive() && self.bond_after.is_broken()
    }
}

impl CohesiveContactModel {
    /// Evaluate a pair without touching its stored record.
    #[must_use]
    pub fn probe(
        &self,
        pair: &PairKinematics,
        record: &ContactRecord,
        flipped: bool,
        dt: f64,
    ) -> PairProbe {
        let mut scratch = *record;
        let outcome = self.evaluate_pair(pair, &mut scratch, flipped, dt);

        let (normal_force, tangential_force, tangential_limit, virtual_overlap) = match outcome {
            PairOutcome::Contact(f) => (
                f.normal_magnitude,
                f.tangential,
                f.tangential_limit,
                f.virtual_overlap,
            ),
            PairOutcome::TensileFailure { virtual_overlap } => {
                (0.0, Vector3::zeros(), 0.0, virtual_overlap)
            }
            PairOutcome::Separated | PairOutcome::Coincident => {
                let radsum = pair.radius_i + pair.radius_j;
                let overlap = radsum - pair.distance() - record.initial_gap;
                (0.0, Vector3::zeros(), 0.0, overlap)
            }
        };

        PairProbe {
            outcome,
            normal_force,
            tangential_force,
            tangential_limit,
            virtual_overlap,
            tensile_limit: record.tensile_limit,
            bond_before: record.bond,
            bond_after: scratch.bond,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::params::CohesiveParams;
    use approx::assert_relative_eq;

    fn model() -> CohesiveContactModel {
        CohesiveContactModel::new(
            CohesiveParams::default()
                .with_normal_stiffness(1.0e4)
                .with_damping(0.0, 0.0)
                .with_tensile_strength(10.0),
        )
    }

    #[test]
    fn test_probe_leaves_record_untouched() {
        let record = ContactRecord::default();
        let pair = PairKinematics::at_rest(Vector3::new(1.99, 0.0, 0.0), 1.0, 1.0, 0.5)
            .with_relative_velocity(Vector3::new(0.0, 1.0, 0.0));

        let probe = model().probe(&pair, &record, false, 1e-4);

        assert!(probe.is_active());
        assert_relative_eq!(probe.normal_force, 100.0, epsilon = 1e-9);
        assert_relative_eq!(probe.virtual_overlap, 0.01, epsilon = 1e-12);
        assert_eq!(record, ContactRecord::default());
    }

    #[test]
    fn test_probe_reports_pending_tensile_failure() {
        let m = model();
        let limit = m.params().tensile_limit(1.0);
        let record = ContactRecord::bonded(0.0, limit);
        let pair = PairKinematics::at_rest(Vector3::new(2.0 + 2.0 * limit, 0.0, 0.0), 1.0, 1.0, 0.5);

        let probe = m.probe(&pair, &record, false, 1e-4);

        assert!(!probe.is_active());
        assert!(probe.breaks_bond());
        assert_eq!(probe.bond_after, BondState::BrokenTensile);
        assert_relative_eq!(probe.tensile_limit, limit);
        assert!(record.is_cohesive());
    }

    #[test]
    fn test_probe_separated_pair() {
        let pair = PairKinematics::at_rest(Vector3::new(3.0, 0.0, 0.0), 1.0, 1.0, 0.5);
        let probe = model().probe(&pair, &ContactRecord::default(), false, 1e-4);
        assert_eq!(probe.outcome, PairOutcome::Separated);
        assert_relative_eq!(probe.virtual_overlap, -1.0);
        assert_eq!(probe.normal_force, 0.0);
    }
}
