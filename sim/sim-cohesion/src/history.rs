//! Persistent per-contact history.
//!
//! One [`ContactRecord`] exists per unordered particle pair, keyed by the
//! pair's stable tags. The record outlives neighbor-list rebuilds and local
//! renumbering, so bond state decided once at formation time stays attached
//! to the right pair.
//!
//! # Orientation
//!
//! The shear displacement is a vector, and its sign depends on which
//! particle plays "i". Records store it in the frame where the particle with
//! the lower tag is "i"; [`PairKey::oriented`] reports whether a traversal
//! sees the pair flipped so callers can read and write through
//! [`ContactRecord::shear_for`] / [`ContactRecord::set_shear_for`]. Either
//! traversal order therefore reads and writes the same record.

use hashbrown::HashMap;
use nalgebra::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sim_types::ParticleTag;

/// Unordered pair of particle tags, normalized so `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairKey {
    low: ParticleTag,
    high: ParticleTag,
}

impl PairKey {
    /// Create a key for the pair (order-independent).
    #[must_use]
    pub fn new(a: ParticleTag, b: ParticleTag) -> Self {
        Self::oriented(a, b).0
    }

    /// Create a key and report whether `(i, j)` is the reverse of the
    /// canonical `(low, high)` order.
    #[must_use]
    pub fn oriented(i: ParticleTag, j: ParticleTag) -> (Self, bool) {
        if i <= j {
            (Self { low: i, high: j }, false)
        } else {
            (Self { low: j, high: i }, true)
        }
    }

    /// The lower tag.
    #[must_use]
    pub fn low(&self) -> ParticleTag {
        self.low
    }

    /// The higher tag.
    #[must_use]
    pub fn high(&self) -> ParticleTag {
        self.high
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.low.raw(), self.high.raw())
    }
}

/// Bond state of a contact pair.
///
/// `Bonded` is only ever entered at formation time. The broken states are
/// terminal and behave identically afterwards: plain frictional contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BondState {
    /// The pair was not within bonding distance at formation time.
    #[default]
    NeverBonded,
    /// An intact adhesive bond.
    Bonded,
    /// The bond failed because the pair separated too far.
    BrokenTensile,
    /// The bond failed because tangential demand exceeded the limit.
    BrokenShear,
}

impl BondState {
    /// Whether the pair currently carries cohesion.
    #[must_use]
    pub fn is_cohesive(self) -> bool {
        matches!(self, Self::Bonded)
    }

    /// Whether the pair had a bond that has since failed.
    #[must_use]
    pub fn is_broken(self) -> bool {
        matches!(self, Self::BrokenTensile | Self::BrokenShear)
    }
}

/// Contact history of one particle pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactRecord {
    /// Whether the pair exerted contact force on its last evaluation.
    pub touching: bool,
    /// Accumulated tangential elastic displacement, canonical orientation.
    pub(crate) shear: Vector3<f64>,
    /// Bond state.
    pub bond: BondState,
    /// Overlap measured at bond formation (negative if bonded across a gap).
    /// Zero for pairs that never bonded or whose bond broke.
    pub initial_gap: f64,
    /// Loss of virtual overlap the bond tolerates before failing in tension.
    pub tensile_limit: f64,
    /// Number of shear failures recorded for this pair.
    pub shear_break_count: u32,
    /// Number of tensile failures recorded for this pair.
    pub tensile_break_count: u32,
}

impl ContactRecord {
    /// A record for a pair that formed a bond.
    #[must_use]
    pub fn bonded(initial_gap: f64, tensile_limit: f64) -> Self {
        Self {
            bond: BondState::Bonded,
            initial_gap,
            tensile_limit: tensile_limit.max(0.0),
            ..Self::default()
        }
    }

    /// Whether the pair currently carries cohesion.
    #[must_use]
    pub fn is_cohesive(&self) -> bool {
        self.bond.is_cohesive()
    }

    /// Shear displacement in canonical orientation.
    #[must_use]
    pub fn shear(&self) -> Vector3<f64> {
        self.shear
    }

    /// Shear displacement as seen by a traversal with the given orientation.
    #[must_use]
    pub fn shear_for(&self, flipped: bool) -> Vector3<f64> {
        if flipped {
            -self.shear
        } else {
            self.shear
        }
    }

    /// Store a shear displacement seen by a traversal with the given orientation.
    pub fn set_shear_for(&mut self, shear: Vector3<f64>, flipped: bool) {
        self.shear = if flipped { -shear } else { shear };
    }

    /// Drop contact: not touching, no shear history.
    pub fn lose_contact(&mut self) {
        self.touching = false;
        self.shear = Vector3::zeros();
    }

    /// Record a tensile failure. No-op unless the pair is bonded.
    pub fn break_tensile(&mut self) {
        if self.bond.is_cohesive() {
            self.bond = BondState::BrokenTensile;
            self.tensile_break_count += 1;
            self.release_bond();
        }
    }

    /// Record a shear failure. No-op unless the pair is bonded.
    pub fn break_shear(&mut self) {
        if self.bond.is_cohesive() {
            self.bond = BondState::BrokenShear;
            self.shear_break_count += 1;
            self.release_bond();
        }
    }

    /// A broken pair is plain frictional contact measured from touching.
    fn release_bond(&mut self) {
        self.initial_gap = 0.0;
        self.tensile_limit = 0.0;
    }
}

/// Store of contact records keyed by unordered particle pair.
#[derive(Debug, Clone, Default)]
pub struct ContactHistory {
    records: HashMap<PairKey, ContactRecord>,
}

impl ContactHistory {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record of a pair.
    #[must_use]
    pub fn get(&self, a: ParticleTag, b: ParticleTag) -> Option<&ContactRecord> {
        self.records.get(&PairKey::new(a, b))
    }

    /// Exclusive access to the record of a pair, created in the zero state
    /// when the pair has no history yet.
    pub fn record_mut(&mut self, key: PairKey) -> &mut ContactRecord {
        self.records.entry(key).or_default()
    }

    /// Replace the record of a pair.
    pub fn insert(&mut self, key: PairKey, record: ContactRecord) {
        self.records.insert(key, record);
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &ContactRecord)> {
        self.records.iter()
    }

    /// Forget pairs that are no longer neighbors.
    ///
    /// Unbonded pairs outside `active` are removed, so a new neighbor
    /// relation starts from the zero state. Bonded pairs keep their bond
    /// data but lose their contact and shear state.
    pub fn retain_neighbors(&mut self, active: &hashbrown::HashSet<PairKey>) {
        self.records.retain(|key, record| {
            if active.contains(key) {
                return true;
            }
            if record.is_cohesive() {
                record.lose_contact();
                return true;
            }
            false
        });
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of pairs with an intact bond.
    #[must_use]
    pub fn bonded_count(&self) -> usize {
        self.records.values().filter(|r| r.is_cohesive()).count()
    }

    /// Number of pairs currently touching.
    #[must_use]
    pub fn touching_count(&self) -> usize {
        self.records.values().filter(|r| r.touching).count()
    }

    /// Total tensile failures over all pairs.
    #[must_use]
    pub fn total_tensile_breaks(&self) -> u64 {
        self.records
            .values()
            .map(|r| u64::from(r.tensile_break_count))
            .sum()
    }

    /// Total shear failures over all pairs.
    #[must_use]
    pub fn total_shear_breaks(&self) -> u64 {
        self.records
            .values()
            .map(|r| u64::from(r.shear_break_count))
            .sum()
    }

    /// Approximate heap footprint in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.records.capacity()
            * (std::mem::size_of::<PairKey>() + std::mem::size_of::<ContactRecord>())
    }
}
