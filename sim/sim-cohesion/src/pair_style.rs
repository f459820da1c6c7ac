//! Pair-style lifecycle around the cohesive contact model.
//!
//! The surrounding simulation drives a [`CohesivePairStyle`] through fixed
//! phases:
//!
//! 1. construction from parameters (or the nine textual settings),
//! 2. [`coeff`](CohesivePairStyle::coeff) for every type pair,
//! 3. [`init_style`](CohesivePairStyle::init_style) once the particles exist,
//! 4. [`initialize_bonds`](CohesivePairStyle::initialize_bonds) with the first
//!    neighbor list,
//! 5. [`compute`](CohesivePairStyle::compute) every step.
//!
//! Calling a phase out of order is a [`SimError::Lifecycle`] error.

use std::fmt;

use sim_types::{Result, SimError, SimulationConfig, StepContext};
use tracing::{debug, info};

use crate::bonds::{form_bonds, BondReport};
use crate::history::{ContactHistory, PairKey};
use crate::mass::{RigidBodyMasses, RigidMassCache};
use crate::model::{CohesiveContactModel, StepReport};
use crate::neighbor::NeighborList;
use crate::params::CohesiveParams;
use crate::probe::PairProbe;
use crate::store::{Communicator, ParticleStore};
use crate::types::{CutoffTable, TypePairTable};

/// The cohesive granular pair style.
#[derive(Clone)]
pub struct CohesivePairStyle {
    model: CohesiveContactModel,
    type_pairs: TypePairTable,
    cutoffs: CutoffTable,
    history: ContactHistory,
    rigid: RigidMassCache,
    rigid_active: bool,
    inserted_radii: Vec<(usize, f64)>,
    timestep: Option<f64>,
    newton_pair: bool,
    bonds_formed: bool,
}

impl fmt::Debug for CohesivePairStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohesivePairStyle")
            .field("params", self.model.params())
            .field("ntypes", &self.type_pairs.ntypes())
            .field("contacts", &self.history.len())
            .field("timestep", &self.timestep)
            .field("bonds_formed", &self.bonds_formed)
            .finish_non_exhaustive()
    }
}

impl CohesivePairStyle {
    /// Create a style for `ntypes` particle types.
    pub fn new(params: CohesiveParams, ntypes: usize) -> Result<Self> {
        params.validate()?;
        if ntypes == 0 {
            return Err(SimError::invalid_config("at least one particle type is required"));
        }
        Ok(Self {
            model: CohesiveContactModel::new(params),
            type_pairs: TypePairTable::new(ntypes),
            cutoffs: CutoffTable::default(),
            history: ContactHistory::new(),
            rigid: RigidMassCache::new(),
            rigid_active: false,
            inserted_radii: Vec::new(),
            timestep: None,
            newton_pair: true,
            bonds_formed: false,
        })
    }

    /// Create a style from the nine ordered textual settings.
    pub fn from_settings<S: AsRef<str>>(args: &[S], ntypes: usize) -> Result<Self> {
        Self::new(CohesiveParams::from_settings(args)?, ntypes)
    }

    /// Declare particles of type `kind` and the given radius that will be
    /// inserted later in the run, so the cutoff accounts for them.
    #[must_use]
    pub fn with_inserted_radius(mut self, kind: usize, radius: f64) -> Self {
        self.inserted_radii.push((kind, radius));
        self
    }

    /// Mark the type pairs selected by two range expressions as configured.
    pub fn coeff(&mut self, irange: &str, jrange: &str) -> Result<usize> {
        let count = self.type_pairs.assign(irange, jrange)?;
        debug!(irange, jrange, count, "Configured type pairs");
        Ok(count)
    }

    /// Check the run setup and capture what the style needs from it.
    ///
    /// Requires ghost velocities, every type pair configured, and valid
    /// particle radii and masses. Builds the cutoff table.
    pub fn init_style<S, C>(
        &mut self,
        config: &SimulationConfig,
        store: &S,
        comm: &mut C,
    ) -> Result<()>
    where
        S: ParticleStore + ?Sized,
        C: Communicator + ?Sized,
    {
        config.validate()?;
        if !config.ghost_velocity {
            return Err(SimError::missing_capability(
                "ghost particles must carry velocities",
            ));
        }
        if store.type_count() != self.type_pairs.ntypes() {
            return Err(SimError::invalid_config(format!(
                "style has {} particle types, store has {}",
                self.type_pairs.ntypes(),
                store.type_count()
            )));
        }
        if !self.type_pairs.all_configured() {
            return Err(SimError::invalid_config("not all pair coefficients are set"));
        }
        validate_particles(store)?;

        self.timestep = Some(config.timestep);
        self.newton_pair = config.newton_pair;
        self.cutoffs = CutoffTable::build(store, &self.inserted_radii, comm);

        info!(
            timestep = config.timestep,
            newton_pair = config.newton_pair,
            particles = store.local_count(),
            "Initialized cohesive pair style"
        );
        Ok(())
    }

    /// Interaction cutoff of a type pair.
    pub fn init_one(&self, i: usize, j: usize) -> Result<f64> {
        if self.timestep.is_none() {
            return Err(SimError::lifecycle("init_one called before init_style"));
        }
        if !self.type_pairs.is_configured(i, j) {
            return Err(SimError::invalid_config(format!(
                "coefficients for types {i} and {j} are not set"
            )));
        }
        Ok(self.cutoffs.cutoff(i, j))
    }

    /// Pick up a changed timestep.
    pub fn reset_dt(&mut self, timestep: f64) -> Result<()> {
        if self.timestep.is_none() {
            return Err(SimError::lifecycle("reset_dt called before init_style"));
        }
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(SimError::InvalidTimestep(timestep));
        }
        self.timestep = Some(timestep);
        debug!(timestep, "Reset timestep");
        Ok(())
    }

    /// Form bonds for every pair of the first neighbor list of the run.
    ///
    /// Runs exactly once, after [`init_style`](Self::init_style) and before
    /// the first [`compute`](Self::compute).
    pub fn initialize_bonds<S: ParticleStore + ?Sized>(
        &mut self,
        store: &S,
        neighbors: &NeighborList,
    ) -> Result<BondReport> {
        if self.timestep.is_none() {
            return Err(SimError::lifecycle("bonds initialized before init_style"));
        }
        if self.bonds_formed {
            return Err(SimError::lifecycle("bonds already initialized for this run"));
        }
        check_indices(store, neighbors)?;
        let report = form_bonds(self.model.params(), store, neighbors, &mut self.history);
        self.bonds_formed = true;
        Ok(report)
    }

    /// Evaluate all pairs of one step and accumulate forces and torques.
    ///
    /// On steps where the neighbor list was rebuilt, the rigid-body mass
    /// cache is refreshed from `rigid` and history of pairs that left the
    /// list is pruned.
    pub fn compute<S, R, C>(
        &mut self,
        ctx: &StepContext,
        store: &mut S,
        neighbors: &NeighborList,
        rigid: Option<&R>,
        comm: &mut C,
    ) -> Result<StepReport>
    where
        S: ParticleStore + ?Sized,
        R: RigidBodyMasses + ?Sized,
        C: Communicator + ?Sized,
    {
        let dt = self
            .timestep
            .ok_or_else(|| SimError::lifecycle("compute called before init_style"))?;
        if !self.bonds_formed {
            return Err(SimError::lifecycle("compute called before bond initialization"));
        }
        if ctx.dt != dt {
            return Err(SimError::lifecycle(format!(
                "step timestep {} differs from {dt}; call reset_dt first",
                ctx.dt
            )));
        }

        if ctx.neighbors_rebuilt {
            check_indices(&*store, neighbors)?;
            match rigid {
                Some(provider) => {
                    self.rigid.refresh(&*store, provider, comm);
                    self.rigid_active = true;
                }
                None => self.rigid_active = false,
            }
            self.history.retain_neighbors(&neighbors.pair_keys(&*store));
        }

        let cache = self.rigid_active.then_some(&self.rigid);
        let report = self.model.compute(
            store,
            neighbors,
            &mut self.history,
            cache,
            dt,
            self.newton_pair,
        )?;

        debug!(
            step = ctx.step,
            pairs = report.pairs_evaluated,
            active = report.active_contacts,
            tensile_failures = report.tensile_failures,
            shear_failures = report.shear_failures,
            "Computed cohesive contacts"
        );
        Ok(report)
    }

    /// Evaluate pair `(i, j)` as the next step would, without changing state.
    pub fn single<S: ParticleStore + ?Sized>(
        &self,
        store: &S,
        i: usize,
        j: usize,
    ) -> Result<PairProbe> {
        let dt = self
            .timestep
            .ok_or_else(|| SimError::lifecycle("single called before init_style"))?;
        let len = store.total_count();
        if let Some(index) = [i, j].into_iter().find(|&index| index >= len) {
            return Err(SimError::InvalidParticleIndex { index, len });
        }

        let (key, flipped) = PairKey::oriented(store.tag(i), store.tag(j));
        let record = self
            .history
            .get(key.low(), key.high())
            .copied()
            .unwrap_or_default();
        let cache = self.rigid_active.then_some(&self.rigid);
        let pair = self.model.kinematics(store, cache, i, j);
        Ok(self.model.probe(&pair, &record, flipped, dt))
    }

    /// Model parameters.
    #[must_use]
    pub fn params(&self) -> &CohesiveParams {
        self.model.params()
    }

    /// The underlying contact model.
    #[must_use]
    pub fn model(&self) -> &CohesiveContactModel {
        &self.model
    }

    /// Configured type pairs.
    #[must_use]
    pub fn type_pairs(&self) -> &TypePairTable {
        &self.type_pairs
    }

    /// Contact history.
    #[must_use]
    pub fn history(&self) -> &ContactHistory {
        &self.history
    }

    /// Timestep captured by `init_style` or `reset_dt`.
    #[must_use]
    pub fn timestep(&self) -> Option<f64> {
        self.timestep
    }

    /// Whether bonds have been formed for this run.
    #[must_use]
    pub fn bonds_formed(&self) -> bool {
        self.bonds_formed
    }

    /// Approximate heap footprint in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.history.memory_usage() + self.rigid.memory_usage()
    }
}

#[cfg(feature = "serde")]
impl CohesivePairStyle {
    /// Snapshot of the persisted state.
    #[must_use]
    pub fn restart_state(&self) -> crate::restart::RestartState {
        crate::restart::RestartState {
            params: *self.model.params(),
            type_pairs: self.type_pairs.clone(),
        }
    }

    /// Rebuild a style from persisted state. Lifecycle starts over.
    pub fn from_restart(state: crate::restart::RestartState) -> Result<Self> {
        state.type_pairs.validate()?;
        let mut style = Self::new(state.params, state.type_pairs.ntypes())?;
        style.type_pairs = state.type_pairs;
        Ok(style)
    }

    /// Write the persisted state as JSON.
    pub fn write_restart<W: std::io::Write>(&self, writer: W) -> Result<()> {
        self.restart_state().write_to(writer)
    }

    /// Read a style from JSON written by [`write_restart`](Self::write_restart).
    pub fn read_restart<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::from_restart(crate::restart::RestartState::read_from(reader)?)
    }
}

fn validate_particles<S: ParticleStore + ?Sized>(store: &S) -> Result<()> {
    for i in 0..store.local_count() {
        let radius = store.radius(i);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::invalid_parameter(
                "radius",
                radius,
                format!("{} must have a positive radius", store.tag(i)),
            ));
        }
        let mass = store.mass(i);
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::invalid_parameter(
                "mass",
                mass,
                format!("{} must have a positive mass", store.tag(i)),
            ));
        }
    }
    Ok(())
}

fn check_indices<S: ParticleStore + ?Sized>(store: &S, neighbors: &NeighborList) -> Result<()> {
    let len = store.total_count();
    match neighbors
        .pairs()
        .flat_map(|(i, j)| [i, j])
        .find(|&index| index >= len)
    {
        Some(index) => Err(SimError::InvalidParticleIndex { index, len }),
        None => Ok(()),
    }
}
