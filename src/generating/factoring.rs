//! Factoring inference rule.
//!
//! Merge two unifiable literals of the same polarity into one, applying the
//! unifier to the rest of the clause.

use crate::config::ProverEnv;
use crate::index::LiteralIndex;
use crate::logic::{unify_args, Clause, ClauseRole, Literal};
use crate::state::{GeneratingInference, SaturationState, StateChange};
use std::sync::Arc;
use tracing::debug;

pub struct Factoring;

impl Factoring {
    pub fn new() -> Self {
        Factoring
    }
}

impl Default for Factoring {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for Factoring {
    fn name(&self) -> &str {
        "Factoring"
    }

    fn generate(
        &mut self,
        given_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
        _index: &LiteralIndex,
    ) -> Vec<StateChange> {
        let given = &state.clauses[given_idx];
        let mut changes = Vec::new();

        for i in 0..given.literals.len() {
            for j in (i + 1)..given.literals.len() {
                let lit1 = &given.literals[i];
                let lit2 = &given.literals[j];
                if lit1.polarity != lit2.polarity || lit1.predicate != lit2.predicate {
                    continue;
                }
                let Ok(subst) = unify_args(&lit1.args, &lit2.args) else {
                    continue;
                };

                let mut literals: Vec<Literal> = Vec::with_capacity(given.literals.len() - 1);
                for (k, lit) in given.literals.iter().enumerate() {
                    if k == j {
                        continue;
                    }
                    let new_lit = lit.apply_substitution(&subst);
                    if !literals.contains(&new_lit) {
                        literals.push(new_lit);
                    }
                }

                let mut conclusion = Clause::with_role(literals, ClauseRole::Derived);
                conclusion.renumber_variables();
                debug!("factor: {}", conclusion.display(&env.interner));
                env.statistics.factorings += 1;
                changes.push(StateChange::Add(
                    Arc::new(conclusion),
                    self.name().into(),
                    vec![given_idx],
                ));
            }
        }

        changes
    }
}
