//! Forward simplification rules

use crate::config::ProverEnv;
use crate::state::{SaturationState, SimplifyingInference, StateChange};
use tracing::debug;

/// Delete tautologies: clauses with complementary literals or a reflexive
/// positive equality.
pub struct TautologyRule;

impl TautologyRule {
    pub fn new() -> Self {
        TautologyRule
    }
}

impl Default for TautologyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingInference for TautologyRule {
    fn name(&self) -> &str {
        "TautologyDeletion"
    }

    fn simplify_forward(
        &self,
        clause_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
    ) -> Option<StateChange> {
        let clause = &state.clauses[clause_idx];
        if clause.is_tautology(&env.interner) {
            debug!("deleting tautology {}", clause.display(&env.interner));
            env.statistics.tautologies_deleted += 1;
            Some(StateChange::Simplify(
                clause_idx,
                None,
                self.name().into(),
                vec![],
            ))
        } else {
            None
        }
    }
}
