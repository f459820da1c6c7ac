//! Per-type tables: configured type pairs and interaction cutoffs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sim_types::{Result, SimError};
use tracing::info;

use crate::store::{Communicator, ParticleStore};

/// Parse a type range expression into inclusive bounds within `1..=ntypes`.
///
/// Accepted forms: `*`, `n`, `n*`, `*n`, `m*n`.
pub fn parse_type_range(range: &str, ntypes: usize) -> Result<(usize, usize)> {
    let invalid = || SimError::InvalidTypeRange {
        range: range.to_string(),
        ntypes,
    };
    let parse = |text: &str, default: usize| -> Result<usize> {
        if text.is_empty() {
            Ok(default)
        } else {
            text.parse::<usize>().map_err(|_| invalid())
        }
    };

    let (lo, hi) = match range.split_once('*') {
        None => {
            let n = parse(range, 0)?;
            (n, n)
        }
        Some((lo, hi)) => (parse(lo, 1)?, parse(hi, ntypes)?),
    };

    if lo < 1 || hi > ntypes || lo > hi {
        return Err(invalid());
    }
    Ok((lo, hi))
}

/// Which unordered type pairs have been given coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypePairTable {
    ntypes: usize,
    configured: Vec<bool>,
}

impl TypePairTable {
    /// A table for `ntypes` types with nothing configured.
    #[must_use]
    pub fn new(ntypes: usize) -> Self {
        Self {
            ntypes,
            configured: vec![false; ntypes * ntypes],
        }
    }

    /// Number of particle types.
    #[must_use]
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    /// Mark every pair `i <= j` with `i` in `irange` and `j` in `jrange`.
    ///
    /// Returns the number of pairs marked; marking nothing is an error.
    pub fn assign(&mut self, irange: &str, jrange: &str) -> Result<usize> {
        let (ilo, ihi) = parse_type_range(irange, self.ntypes)?;
        let (jlo, jhi) = parse_type_range(jrange, self.ntypes)?;

        let mut count = 0;
        for i in ilo..=ihi {
            for j in jlo.max(i)..=jhi {
                self.set(i, j);
                count += 1;
            }
        }
        if count == 0 {
            return Err(SimError::invalid_config(format!(
                "type ranges `{irange}` x `{jrange}` select no pairs"
            )));
        }
        Ok(count)
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        (lo >= 1 && hi <= self.ntypes).then(|| (lo - 1) * self.ntypes + (hi - 1))
    }

    fn set(&mut self, i: usize, j: usize) {
        if let Some(k) = self.index(i, j) {
            self.configured[k] = true;
        }
    }

    /// Check that the flag matrix matches the type count.
    ///
    /// Tables built through [`TypePairTable::new`] always pass; decoded ones
    /// may not.
    pub fn validate(&self) -> Result<()> {
        if self.ntypes == 0 {
            return Err(SimError::invalid_config("type-pair table has no types"));
        }
        let expected = self.ntypes.checked_mul(self.ntypes);
        if expected != Some(self.configured.len()) {
            return Err(SimError::invalid_config(format!(
                "type-pair table for {} types has {} entries",
                self.ntypes,
                self.configured.len()
            )));
        }
        Ok(())
    }

    /// Whether the pair of types has coefficients (order-independent).
    #[must_use]
    pub fn is_configured(&self, i: usize, j: usize) -> bool {
        self.index(i, j)
            .and_then(|k| self.configured.get(k).copied())
            .unwrap_or(false)
    }

    /// Whether every type pair has coefficients.
    #[must_use]
    pub fn all_configured(&self) -> bool {
        (1..=self.ntypes).all(|i| (i..=self.ntypes).all(|j| self.is_configured(i, j)))
    }
}

/// Interaction cutoff per type pair.
///
/// Built from the largest radius of each type, split into dynamic and
/// frozen particles. Frozen/frozen pairs never interact, so they do not
/// contribute to the cutoff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutoffTable {
    max_dynamic: Vec<f64>,
    max_frozen: Vec<f64>,
}

impl CutoffTable {
    /// Collect per-type maximum radii over owned particles on every worker.
    ///
    /// `inserted_radii` lists `(type, radius)` for particles that will be
    /// inserted later in the run; they count as dynamic.
    pub fn build<S, C>(store: &S, inserted_radii: &[(usize, f64)], comm: &mut C) -> Self
    where
        S: ParticleStore + ?Sized,
        C: Communicator + ?Sized,
    {
        let ntypes = store.type_count();
        let mut max_dynamic = vec![0.0_f64; ntypes + 1];
        let mut max_frozen = vec![0.0_f64; ntypes + 1];

        for &(kind, radius) in inserted_radii {
            if let Some(slot) = max_dynamic.get_mut(kind) {
                *slot = slot.max(radius);
            }
        }
        for i in 0..store.local_count() {
            let kind = store.kind(i);
            let table = if store.is_frozen(i) {
                &mut max_frozen
            } else {
                &mut max_dynamic
            };
            if let Some(slot) = table.get_mut(kind) {
                *slot = slot.max(store.radius(i));
            }
        }

        comm.all_reduce_max(&mut max_dynamic);
        comm.all_reduce_max(&mut max_frozen);

        info!(ntypes, "Built granular cutoff table");
        Self {
            max_dynamic,
            max_frozen,
        }
    }

    /// Largest dynamic radius of a type.
    #[must_use]
    pub fn max_dynamic_radius(&self, kind: usize) -> f64 {
        self.max_dynamic.get(kind).copied().unwrap_or(0.0)
    }

    /// Largest frozen radius of a type.
    #[must_use]
    pub fn max_frozen_radius(&self, kind: usize) -> f64 {
        self.max_frozen.get(kind).copied().unwrap_or(0.0)
    }

    /// Interaction cutoff for types `i` and `j`.
    #[must_use]
    pub fn cutoff(&self, i: usize, j: usize) -> f64 {
        let dyn_dyn = self.max_dynamic_radius(i) + self.max_dynamic_radius(j);
        let frz_dyn = self.max_frozen_radius(i) + self.max_dynamic_radius(j);
        let dyn_frz = self.max_dynamic_radius(i) + self.max_frozen_radius(j);
        dyn_dyn.max(frz_dyn).max(dyn_frz)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::store::SerialComm;
    use nalgebra::Point3;
    use sim_types::{Particle, ParticleSystem};

    #[test]
    fn test_parse_type_range_forms() {
        assert_eq!(parse_type_range("*", 4).unwrap(), (1, 4));
        assert_eq!(parse_type_range("2", 4).unwrap(), (2, 2));
        assert_eq!(parse_type_range("2*", 4).unwrap(), (2, 4));
        assert_eq!(parse_type_range("*3", 4).unwrap(), (1, 3));
        assert_eq!(parse_type_range("2*3", 4).unwrap(), (2, 3));
    }

    #[test]
    fn test_parse_type_range_rejects() {
        assert!(parse_type_range("0", 4).is_err());
        assert!(parse_type_range("5", 4).is_err());
        assert!(parse_type_range("3*2", 4).is_err());
        assert!(parse_type_range("a", 4).is_err());
        assert!(parse_type_range("*", 0).is_err());
    }

    #[test]
    fn test_assign_upper_triangle() {
        let mut table = TypePairTable::new(3);
        assert_eq!(table.assign("*", "*").unwrap(), 6);
        assert!(table.all_configured());
        assert!(table.is_configured(3, 1));
    }

    #[test]
    fn test_assign_partial_and_empty() {
        let mut table = TypePairTable::new(3);
        assert_eq!(table.assign("1", "2*3").unwrap(), 2);
        assert!(table.is_configured(2, 1));
        assert!(!table.is_configured(2, 2));
        assert!(!table.all_configured());

        // i = 3, j in 1..=2: j < i only, nothing selected.
        assert!(table.assign("3", "1*2").is_err());
    }

    #[test]
    fn test_validate_flag_matrix_size() {
        assert!(TypePairTable::new(3).validate().is_ok());
        assert!(TypePairTable::new(0).validate().is_err());

        let short = TypePairTable {
            ntypes: 3,
            configured: vec![true],
        };
        assert!(short.validate().is_err());
        // Lookups past the stored flags read as unconfigured.
        assert!(!short.is_configured(1, 2));
        assert!(!short.all_configured());
    }

    #[test]
    fn test_cutoff_excludes_frozen_pairs() {
        let system = ParticleSystem::new(vec![
            Particle::new(1, Point3::origin(), 0.5, 1.0),
            Particle::new(2, Point3::origin(), 0.3, 1.0).with_kind(2),
            Particle::new(3, Point3::origin(), 2.0, 1.0).with_kind(2).frozen(),
        ]);

        let table = CutoffTable::build(&system, &[], &mut SerialComm);

        assert_eq!(table.max_dynamic_radius(2), 0.3);
        assert_eq!(table.max_frozen_radius(2), 2.0);
        assert_eq!(table.cutoff(1, 1), 1.0);
        // Frozen type-2 particle against dynamic type-1 particle.
        assert_eq!(table.cutoff(2, 1), 2.5);
        assert_eq!(table.cutoff(1, 2), 2.5);
        // Frozen/frozen would be 4.0 but does not count.
        assert_eq!(table.cutoff(2, 2), 2.3);
    }

    #[test]
    fn test_cutoff_includes_inserted_particles() {
        let system = ParticleSystem::new(vec![Particle::new(1, Point3::origin(), 0.5, 1.0)]);
        let table = CutoffTable::build(&system, &[(1, 0.8)], &mut SerialComm);
        assert_eq!(table.cutoff(1, 1), 1.6);
    }
}
