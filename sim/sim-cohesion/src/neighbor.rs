//! Neighbor lists.
//!
//! A half list: each unordered pair appears at most once, under the owned
//! particle that "owns" the interaction. Spatial binning belongs to the
//! simulation; [`NeighborList::brute_force`] exists for small systems and
//! tests.

use hashbrown::HashSet;

use crate::history::PairKey;
use crate::store::ParticleStore;

/// Per owned particle, the local indices of its neighbors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborList {
    entries: Vec<(usize, Vec<usize>)>,
}

impl NeighborList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from explicit `(i, j)` pairs, grouped by `i` in first-seen order.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut list = Self::new();
        for (i, j) in pairs {
            list.push(i, j);
        }
        list
    }

    /// Build a size-based half list by checking every pair.
    ///
    /// Two particles are neighbors when their distance is below the sum of
    /// their radii plus `skin`. Owned/owned pairs are listed once, under the
    /// lower index; owned/ghost pairs are listed under the owned particle.
    #[must_use]
    pub fn brute_force<S: ParticleStore + ?Sized>(store: &S, skin: f64) -> Self {
        let nlocal = store.local_count();
        let total = store.total_count();
        let mut list = Self::new();
        for i in 0..nlocal {
            let xi = store.position(i);
            let ri = store.radius(i);
            let mut neighbors = Vec::new();
            for j in (i + 1)..total {
                let reach = ri + store.radius(j) + skin;
                if (xi - store.position(j)).norm_squared() < reach * reach {
                    neighbors.push(j);
                }
            }
            list.entries.push((i, neighbors));
        }
        list
    }

    /// Append `j` to the neighbors of `i`.
    pub fn push(&mut self, i: usize, j: usize) {
        match self.entries.iter_mut().find(|(owner, _)| *owner == i) {
            Some((_, neighbors)) => neighbors.push(j),
            None => self.entries.push((i, vec![j])),
        }
    }

    /// Owned particles with their neighbor lists, in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.entries.iter().map(|(i, js)| (*i, js.as_slice()))
    }

    /// Every `(i, j)` pair in traversal order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .flat_map(|(i, js)| js.iter().map(move |j| (*i, *j)))
    }

    /// Number of listed pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.entries.iter().map(|(_, js)| js.len()).sum()
    }

    /// Check if no pairs are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }

    /// Tag-keyed pairs of the list, for pruning contact history.
    #[must_use]
    pub fn pair_keys<S: ParticleStore + ?Sized>(&self, store: &S) -> HashSet<PairKey> {
        self.pairs()
            .map(|(i, j)| PairKey::new(store.tag(i), store.tag(j)))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use sim_types::{Particle, ParticleSystem, ParticleTag};

    fn line(n: u64, spacing: f64) -> ParticleSystem {
        ParticleSystem::new(
            (0..n)
                .map(|k| Particle::new(k + 1, Point3::new(k as f64 * spacing, 0.0, 0.0), 0.5, 1.0))
                .collect(),
        )
    }

    #[test]
    fn test_brute_force_half_list() {
        let system = line(4, 0.9);
        let list = NeighborList::brute_force(&system, 0.0);

        // Only adjacent spheres overlap.
        let pairs: Vec<_> = list.pairs().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(list.pair_count(), 3);
    }

    #[test]
    fn test_skin_extends_reach() {
        let system = line(3, 1.05);
        assert!(NeighborList::brute_force(&system, 0.0).is_empty());
        assert_eq!(NeighborList::brute_force(&system, 0.1).pair_count(), 2);
    }

    #[test]
    fn test_owned_ghost_pairs_listed_once() {
        let system = ParticleSystem::with_ghosts(
            vec![Particle::new(1, Point3::origin(), 0.5, 1.0)],
            vec![Particle::new(2, Point3::new(0.9, 0.0, 0.0), 0.5, 1.0)],
        );
        let list = NeighborList::brute_force(&system, 0.0);
        assert_eq!(list.pairs().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn test_from_pairs_and_keys() {
        let system = line(3, 0.9);
        let list = NeighborList::from_pairs([(0, 1), (1, 2), (0, 2)]);
        let grouped: Vec<_> = list.iter().map(|(i, js)| (i, js.to_vec())).collect();
        assert_eq!(grouped, vec![(0, vec![1, 2]), (1, vec![2])]);

        let keys = list.pair_keys(&system);
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&PairKey::new(ParticleTag::new(3), ParticleTag::new(1))));
    }
}
