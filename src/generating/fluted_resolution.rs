//! Fluted binary resolution.
//!
//! Resolution restricted to eligible literals, where eligibility is
//! maximality in the fluted literal ordering (strict maximality is not
//! required). Candidates come from the literal index over the active set;
//! conclusions pass the passive container's weight/age admission screens
//! and, when enabled, an ordering aftercheck under the substitution.

use super::ordering::MaximalityMemo;
use crate::config::ProverEnv;
use crate::index::LiteralIndex;
use crate::logic::{
    offset_literal_variables, unify_args, Clause, ClauseRole, Literal, TermOrdering,
};
use crate::selection::literal_ordering;
use crate::state::{GeneratingInference, SaturationState, StateChange};
use std::sync::Arc;
use tracing::{debug, trace};

pub struct FlutedResolution {
    memo: MaximalityMemo,
}

impl FlutedResolution {
    pub fn new() -> Self {
        FlutedResolution {
            memo: MaximalityMemo::new(),
        }
    }

    fn is_eligible(&mut self, clause_id: usize, clause: &Clause, lit_idx: usize) -> bool {
        self.memo.is_maximal(clause_id, clause, lit_idx, false)
    }

    /// Resolve one eligible literal pair into a conclusion, or nothing when
    /// an admission screen or the aftercheck vetoes the inference.
    #[allow(clippy::too_many_arguments)]
    fn generate_clause(
        &mut self,
        query_cl: &Clause,
        query_idx: usize,
        query_lit_idx: usize,
        result_cl: &Clause,
        result_idx: usize,
        result_lit_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
    ) -> Option<Clause> {
        // Generation only uses active partners
        debug_assert!(state.processed.contains(&result_idx));

        let query_lit = &query_cl.literals[query_lit_idx];

        // Rename the result clause apart by offsetting its variables
        let offset = query_cl.max_variable().map_or(0, |m| m + 1);
        let renamed_result: Vec<Literal> = result_cl
            .literals
            .iter()
            .map(|lit| offset_literal_variables(lit, offset))
            .collect();

        let subst = match unify_args(&query_lit.args, &renamed_result[result_lit_idx].args) {
            Ok(subst) => subst,
            Err(_) => return None,
        };

        trace!(
            "resolving {} [{}] with {} [{}]",
            query_cl.display(&env.interner),
            query_lit_idx,
            result_cl.display(&env.interner),
            result_lit_idx
        );

        // Weight screen: when the age limit alone does not admit the clause
        // and weights are limited, track a lower bound while assembling and
        // bail out as soon as it can no longer fit.
        let age = state.current_iteration;
        let needs_weight_limit =
            !env.limits.fulfils_age_limit(age) && env.limits.weight_limited();
        let mut weight_lower_bound = 0usize;

        if needs_weight_limit {
            for (i, lit) in query_cl.literals.iter().enumerate() {
                if i != query_lit_idx {
                    weight_lower_bound += lit.weight();
                }
            }
            for (i, lit) in renamed_result.iter().enumerate() {
                if i != result_lit_idx {
                    weight_lower_bound += lit.weight();
                }
            }
            if !env.limits.fulfils_weight_limit(weight_lower_bound) {
                env.statistics.discarded_for_weight_limit += 1;
                return None;
            }
        }

        // The aftercheck only applies when more than one literal of the
        // premise is eligible: with a single eligible literal the
        // substituted conclusion cannot promote a side literal past it.
        let aftercheck = env.options.ordering_aftercheck;
        let query_lit_after = (aftercheck
            && self.memo.eligible_count(query_idx, query_cl) > 1)
            .then(|| query_lit.apply_substitution(&subst));
        let result_lit_after = (aftercheck
            && self.memo.eligible_count(result_idx, result_cl) > 1)
            .then(|| renamed_result[result_lit_idx].apply_substitution(&subst));

        let mut literals: Vec<Literal> =
            Vec::with_capacity(query_cl.len() + result_cl.len() - 2);

        for (i, curr) in query_cl.literals.iter().enumerate() {
            if i == query_lit_idx {
                continue;
            }
            let new_lit = curr.apply_substitution(&subst);
            if needs_weight_limit {
                weight_lower_bound += new_lit.weight();
                weight_lower_bound -= curr.weight();
                if !env.limits.fulfils_weight_limit(weight_lower_bound) {
                    env.statistics.discarded_for_weight_limit += 1;
                    return None;
                }
            }
            if let Some(after) = &query_lit_after {
                if self.is_eligible(query_idx, query_cl, i)
                    && self.aftercheck_blocks(&new_lit, after, env)
                {
                    return None;
                }
            }
            push_unless_duplicate(&mut literals, new_lit);
        }

        for (i, curr) in renamed_result.iter().enumerate() {
            if i == result_lit_idx {
                continue;
            }
            let new_lit = curr.apply_substitution(&subst);
            if needs_weight_limit {
                weight_lower_bound += new_lit.weight();
                weight_lower_bound -= curr.weight();
                if !env.limits.fulfils_weight_limit(weight_lower_bound) {
                    env.statistics.discarded_for_weight_limit += 1;
                    return None;
                }
            }
            if let Some(after) = &result_lit_after {
                if self.is_eligible(result_idx, result_cl, i)
                    && self.aftercheck_blocks(&new_lit, after, env)
                {
                    return None;
                }
            }
            push_unless_duplicate(&mut literals, new_lit);
        }

        env.statistics.resolutions += 1;

        let mut conclusion = Clause::with_role(literals, ClauseRole::Derived);
        conclusion.renumber_variables();
        debug!("resolvent: {}", conclusion.display(&env.interner));
        Some(conclusion)
    }

    /// A substituted side literal must not be greater than the substituted
    /// selected literal; for positively selected side literals, equality
    /// blocks as well (strict maximality for positive literals).
    fn aftercheck_blocks(
        &self,
        side_lit: &Literal,
        selected_after: &Literal,
        env: &mut ProverEnv,
    ) -> bool {
        let ordering = literal_ordering(side_lit, selected_after, &env.ordering);
        let blocked = ordering == TermOrdering::Greater
            || (side_lit.polarity && ordering == TermOrdering::Equal);
        if blocked {
            env.statistics.blocked_by_aftercheck += 1;
        }
        blocked
    }
}

impl Default for FlutedResolution {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for FlutedResolution {
    fn name(&self) -> &str {
        "Resolution"
    }

    fn generate(
        &mut self,
        given_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
        index: &LiteralIndex,
    ) -> Vec<StateChange> {
        let given = Arc::clone(&state.clauses[given_idx]);
        let mut changes = Vec::new();

        for (lit_idx, lit) in given.literals.iter().enumerate() {
            if !self.is_eligible(given_idx, &given, lit_idx) {
                continue;
            }

            let candidates: Vec<(usize, usize)> = index
                .candidates(lit.predicate.id, !lit.polarity)
                .to_vec();
            for (partner_idx, partner_lit_idx) in candidates {
                let partner = Arc::clone(&state.clauses[partner_idx]);
                if !self.is_eligible(partner_idx, &partner, partner_lit_idx) {
                    continue;
                }
                if let Some(conclusion) = self.generate_clause(
                    &given,
                    given_idx,
                    lit_idx,
                    &partner,
                    partner_idx,
                    partner_lit_idx,
                    state,
                    env,
                ) {
                    changes.push(StateChange::Add(
                        Arc::new(conclusion),
                        self.name().into(),
                        vec![given_idx, partner_idx],
                    ));
                }
            }
        }

        changes
    }
}

fn push_unless_duplicate(literals: &mut Vec<Literal>, lit: Literal) {
    if !literals.contains(&lit) {
        literals.push(lit);
    }
}

/// Convenience used by tests: resolve two clauses directly, outside the
/// saturation loop.
#[cfg(test)]
pub fn resolve_pair(
    clause1: &Clause,
    clause2: &Clause,
    env: &mut ProverEnv,
) -> Vec<Clause> {
    use crate::state::SaturationState;

    let mut state = SaturationState::new();
    let mut c1 = clause1.clone();
    c1.id = Some(0);
    let mut c2 = clause2.clone();
    c2.id = Some(1);
    state.clauses = vec![Arc::new(c1), Arc::new(c2)];
    state.processed.insert(0);
    state.processed.insert(1);

    let mut index = LiteralIndex::new();
    index.on_activate(0, &state.clauses[0]);
    index.on_activate(1, &state.clauses[1]);

    let mut rule = FlutedResolution::new();
    rule.generate(1, &state, env, &index)
        .into_iter()
        .filter_map(|change| match change {
            StateChange::Add(clause, _, _) => Some((*clause).clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProverConfig;
    use crate::logic::{Constant, FunctionSymbol, Interner, PredicateSymbol, Term};

    fn env_with(interner: Interner) -> ProverEnv {
        ProverEnv::new(interner, ProverConfig::default())
    }

    #[test]
    fn test_unit_resolution() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));

        // p(a) and ~p(X0) resolve to the empty clause
        let c1 = Clause::new(vec![Literal::positive(p, vec![a])]);
        let c2 = Clause::new(vec![Literal::negative(p, vec![Term::var(0)])]);

        let mut env = env_with(interner);
        let results = resolve_pair(&c1, &c2, &mut env);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_empty());
        assert_eq!(env.statistics.resolutions, 1);
    }

    #[test]
    fn test_resolution_applies_substitution_to_side_literals() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));
        let b = Term::Constant(Constant::new(interner.intern_constant("b")));

        // ~q(X0, X1) | p(X1)  with  q(a, b)  gives p(b); the eligible
        // literal of the first clause is ~q (higher arity)
        let c1 = Clause::new(vec![
            Literal::negative(q, vec![Term::var(0), Term::var(1)]),
            Literal::positive(p, vec![Term::var(1)]),
        ]);
        let c2 = Clause::new(vec![Literal::positive(q, vec![a.clone(), b.clone()])]);

        let mut env = env_with(interner);
        let results = resolve_pair(&c1, &c2, &mut env);
        assert_eq!(results.len(), 1);
        let lit = &results[0].literals[0];
        assert_eq!(lit.predicate, p);
        assert_eq!(lit.args[0], b);
    }

    #[test]
    fn test_non_maximal_literal_not_resolved() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);

        // In p(X0) | q(X0, X1), p is non-maximal (lower arity), so the
        // resolution against ~p(X0) is blocked by eligibility
        let c1 = Clause::new(vec![
            Literal::positive(p, vec![Term::var(0)]),
            Literal::positive(q, vec![Term::var(0), Term::var(1)]),
        ]);
        let c2 = Clause::new(vec![Literal::negative(p, vec![Term::var(0)])]);

        let mut env = env_with(interner);
        let results = resolve_pair(&c1, &c2, &mut env);
        assert!(results.is_empty());
        assert_eq!(env.statistics.resolutions, 0);
    }

    #[test]
    fn test_skolem_literal_is_the_resolution_site() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 2);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);
        let f = FunctionSymbol::new(interner.intern_function("f"), 1);

        // ~p(X0, f(X0)) is maximal over q(X0, X1) (functional rightmost),
        // so it resolves against p(X0, f(X0))
        let fx = Term::Function(f, vec![Term::var(0)]);
        let c1 = Clause::new(vec![
            Literal::negative(p, vec![Term::var(0), fx.clone()]),
            Literal::positive(q, vec![Term::var(0), Term::var(1)]),
        ]);
        let c2 = Clause::new(vec![Literal::positive(p, vec![Term::var(0), fx])]);

        let mut env = env_with(interner);
        let results = resolve_pair(&c1, &c2, &mut env);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].literals.len(), 1);
        assert_eq!(results[0].literals[0].predicate, q);
    }

    #[test]
    fn test_weight_limit_discards_inference() {
        use crate::state::SaturationState;

        let mut interner = Interner::new();
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);
        let r = PredicateSymbol::new(interner.intern_predicate("r"), 2);

        // ~q(X0, X1) | r(X0, X1) resolved with q(X0, X1) would give
        // r(X0, X1) of weight 3, above the limit of 1
        let c1 = Clause::new(vec![
            Literal::negative(q, vec![Term::var(0), Term::var(1)]),
            Literal::positive(r, vec![Term::var(0), Term::var(1)]),
        ]);
        let c2 = Clause::new(vec![Literal::positive(q, vec![Term::var(0), Term::var(1)])]);

        let mut env = ProverEnv::new(interner, ProverConfig::default());
        env.limits.age_limit = Some(2);
        env.limits.weight_limit = Some(1);

        let mut state = SaturationState::new();
        let mut stored1 = c1;
        stored1.id = Some(0);
        let mut stored2 = c2;
        stored2.id = Some(1);
        state.clauses = vec![Arc::new(stored1), Arc::new(stored2)];
        state.processed.insert(0);
        state.processed.insert(1);
        // Past the age limit, so the weight screen applies
        state.current_iteration = 5;

        let mut index = LiteralIndex::new();
        index.on_activate(0, &state.clauses[0]);
        index.on_activate(1, &state.clauses[1]);

        let mut rule = FlutedResolution::new();
        let changes = rule.generate(1, &state, &mut env, &index);
        assert!(changes.is_empty());
        assert_eq!(env.statistics.discarded_for_weight_limit, 1);
    }

    #[test]
    fn test_conclusion_variables_renumbered() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 2);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 1);

        // The surviving q literal lives in the renamed partner's variable
        // space; the conclusion must come out compacted from 0
        let c1 = Clause::new(vec![Literal::negative(p, vec![Term::var(0), Term::var(1)])]);
        let c2 = Clause::new(vec![
            Literal::positive(p, vec![Term::var(0), Term::var(1)]),
            Literal::positive(q, vec![Term::var(1)]),
        ]);

        let mut env = env_with(interner);
        let results = resolve_pair(&c1, &c2, &mut env);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].literals[0].args, vec![Term::var(0)]);
    }
}
