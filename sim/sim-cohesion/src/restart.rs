//! Restart persistence.
//!
//! The model parameters and the configured type-pair table are written as
//! JSON. Contact history is a runtime cache and is not persisted; bonds are
//! formed again at the start of the restarted run.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use sim_types::{Result, SimError};
use tracing::info;

use crate::params::CohesiveParams;
use crate::types::TypePairTable;

/// Everything the pair style needs to resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartState {
    /// Model parameters.
    pub params: CohesiveParams,
    /// Configured type pairs.
    pub type_pairs: TypePairTable,
}

impl RestartState {
    /// Write the state to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(|e| SimError::restart(e.to_string()))?;
        info!(ntypes = self.type_pairs.ntypes(), "Wrote cohesive restart state");
        Ok(())
    }

    /// Read a state previously written by [`RestartState::write_to`].
    ///
    /// The parameters and the type-pair table are validated after decoding.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let state: Self =
            serde_json::from_reader(reader).map_err(|e| SimError::restart(e.to_string()))?;
        state.params.validate()?;
        state
            .type_pairs
            .validate()
            .map_err(|e| SimError::restart(e.to_string()))?;
        info!(ntypes = state.type_pairs.ntypes(), "Read cohesive restart state");
        Ok(state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_round_trip() {
        let mut type_pairs = TypePairTable::new(2);
        type_pairs.assign("1", "*").unwrap();
        let state = RestartState {
            params: CohesiveParams::default()
                .with_normal_stiffness(3.0e5)
                .with_enlarge_factor(1.1),
            type_pairs,
        };

        let mut buffer = Vec::new();
        state.write_to(&mut buffer).unwrap();
        let restored = RestartState::read_from(buffer.as_slice()).unwrap();

        assert_eq!(restored, state);
        assert!(restored.type_pairs.is_configured(2, 1));
        assert!(!restored.type_pairs.is_configured(2, 2));
    }

    #[test]
    fn test_mismatched_type_table_is_rejected() {
        let state = RestartState {
            params: CohesiveParams::default(),
            type_pairs: TypePairTable::new(3),
        };
        let mut value = serde_json::to_value(&state).unwrap();
        value["type_pairs"]["configured"] = serde_json::json!([true]);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = RestartState::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SimError::Restart { .. }));

        value["type_pairs"]["ntypes"] = serde_json::json!(0);
        value["type_pairs"]["configured"] = serde_json::json!([]);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(RestartState::read_from(bytes.as_slice()).is_err());
    }

    #[test]
    fn test_truncated_restart_is_an_error() {
        let err = RestartState::read_from(&b"{\"params\":"[..]).unwrap_err();
        assert!(matches!(err, SimError::Restart { .. }));
    }
}
