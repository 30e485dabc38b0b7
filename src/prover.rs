//! The given-clause saturation loop with the fluted pipeline hooks.
//!
//! In fluted mode the prover gates the input through the classifiers,
//! rewrites formula units with the definitional preprocessor, applies the
//! separation rule to every activated clause, and generates with fluted
//! resolution. Outside fluted mode the same loop runs with plain
//! clausification and the same generating rules.

use crate::config::{ProverConfig, ProverEnv, Statistics};
use crate::fluted::{is_in_fluted_fragment, separate, FlutedPreprocessor};
use crate::generating::{Factoring, FlutedResolution};
use crate::index::LiteralIndex;
use crate::logic::{CNFFormula, Clause, ClauseRole, Interner};
use crate::parser::{fof_to_cnf, FormulaRole, Problem};
use crate::selection::{AgeWeightQueue, ClauseQueue};
use crate::simplifying::TautologyRule;
use crate::state::{
    GeneratingInference, ProofResult, ProofStep, SaturationState, SimplifyingInference,
    StateChange,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Errors surfaced to the caller as values.
#[derive(Debug, Clone)]
pub enum ProverError {
    /// Fluted mode was requested but the problem is outside the fragment
    NotInFlutedFragment,
}

impl fmt::Display for ProverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProverError::NotInFlutedFragment => {
                write!(f, "the input problem is not in the fluted fragment")
            }
        }
    }
}

impl std::error::Error for ProverError {}

/// Per-problem saturation engine.
pub struct Prover {
    pub env: ProverEnv,
    pub state: SaturationState,
    index: LiteralIndex,
    queue: Box<dyn ClauseQueue>,
    generating: Vec<Box<dyn GeneratingInference>>,
    simplifying: Vec<Box<dyn SimplifyingInference>>,
    initial_clauses: Vec<Clause>,
    start_time: Option<Instant>,
}

impl Prover {
    /// Build a prover from a parsed problem.
    ///
    /// In fluted mode this runs the classification gate and the definitional
    /// preprocessor; a problem outside the fragment is rejected with a
    /// diagnostic error.
    pub fn from_problem(
        mut problem: Problem,
        config: ProverConfig,
        mut interner: Interner,
    ) -> Result<Self, ProverError> {
        let mut statistics = Statistics::default();

        let cnf = if config.fluted_mode {
            if !is_in_fluted_fragment(&problem.formulas, &problem.clauses, &interner) {
                return Err(ProverError::NotInFlutedFragment);
            }
            info!("problem is in the fluted fragment");
            let mut preprocessor = FlutedPreprocessor::new();
            preprocessor.preprocess(&mut problem, &mut interner, &mut statistics)
        } else {
            plain_clausify(&problem, &mut interner)
        };

        let mut env = ProverEnv::new(interner, config.clone());
        env.statistics = statistics;

        let queue = Box::new(AgeWeightQueue::new(config.age_probability));
        let generating: Vec<Box<dyn GeneratingInference>> = vec![
            Box::new(FlutedResolution::new()),
            Box::new(Factoring::new()),
        ];
        let simplifying: Vec<Box<dyn SimplifyingInference>> = vec![Box::new(TautologyRule::new())];

        Ok(Prover {
            env,
            state: SaturationState::new(),
            index: LiteralIndex::new(),
            queue,
            generating,
            simplifying,
            initial_clauses: cnf.clauses,
            start_time: None,
        })
    }

    /// Run saturation to completion.
    pub fn prove(&mut self) -> ProofResult {
        self.start_time = Some(Instant::now());
        if let Some(result) = self.init() {
            return result;
        }
        loop {
            if let Some(result) = self.step() {
                return result;
            }
        }
    }

    /// Extract the refutation from the event log.
    pub fn extract_proof(&self, clause_idx: usize) -> Vec<ProofStep> {
        self.state.extract_proof(clause_idx)
    }

    fn init(&mut self) -> Option<ProofResult> {
        let initial = std::mem::take(&mut self.initial_clauses);
        self.state.initial_clause_count = initial.len();
        for clause in initial {
            if let Some(result) =
                self.apply_change(StateChange::Add(Arc::new(clause), "Input".into(), vec![]))
            {
                return Some(result);
            }
        }
        None
    }

    /// One iteration: drain N through forward simplification, select and
    /// activate a given clause, separate it in fluted mode, and generate.
    pub fn step(&mut self) -> Option<ProofResult> {
        // === Process new clauses ===
        while let Some(&clause_idx) = self.state.new.last() {
            let mut forward_change = None;
            for rule in &self.simplifying {
                if let Some(change) =
                    rule.simplify_forward(clause_idx, &self.state, &mut self.env)
                {
                    forward_change = Some(change);
                    break;
                }
            }
            if let Some(change) = forward_change {
                if let Some(result) = self.apply_change(change) {
                    return Some(result);
                }
                continue;
            }
            if let Some(result) = self.apply_change(StateChange::Transfer(clause_idx)) {
                return Some(result);
            }
        }

        // === Saturation check ===
        if self.state.unprocessed.is_empty() {
            return Some(ProofResult::Saturated);
        }

        if let Some(start) = self.start_time {
            if start.elapsed() > self.env.options.timeout {
                return Some(ProofResult::ResourceLimit);
            }
        }

        // === Select and activate the given clause ===
        let given_idx = match self.queue.select() {
            Some(idx) => idx,
            None => return Some(ProofResult::Saturated),
        };
        debug!(
            "given clause {}: {}",
            given_idx,
            self.state.clauses[given_idx].display(&self.env.interner)
        );
        if let Some(result) = self.apply_change(StateChange::Activate(given_idx)) {
            return Some(result);
        }

        // === Separation ===
        // A separable clause is withdrawn and replaced by its two halves;
        // the halves re-enter through N and are never resolved as one.
        if self.env.options.fluted_mode {
            let given = Arc::clone(&self.state.clauses[given_idx]);
            let halves = separate(&given, &mut self.env.interner);
            if !halves.is_empty() {
                self.env.statistics.separations += 1;
                if let Some(result) = self.apply_change(StateChange::Simplify(
                    given_idx,
                    None,
                    "Separation".into(),
                    vec![given_idx],
                )) {
                    return Some(result);
                }
                for half in halves {
                    if let Some(result) = self.apply_change(StateChange::Add(
                        Arc::new(half),
                        "Separation".into(),
                        vec![given_idx],
                    )) {
                        return Some(result);
                    }
                }
                return None;
            }
        }

        // === Generate ===
        let mut rules = std::mem::take(&mut self.generating);
        let mut changes = Vec::new();
        for rule in &mut rules {
            changes.extend(rule.generate(given_idx, &self.state, &mut self.env, &self.index));
        }
        self.generating = rules;

        for change in changes {
            if let Some(result) = self.apply_change(change) {
                return Some(result);
            }
        }

        None
    }

    fn apply_change(&mut self, change: StateChange) -> Option<ProofResult> {
        match change {
            StateChange::Add(mut arc_clause, rule_name, premises) => {
                if arc_clause.literals.len() > self.env.options.max_clause_size {
                    return None;
                }

                let new_idx = self.state.clauses.len();
                {
                    let clause = Arc::get_mut(&mut arc_clause)
                        .expect("freshly created clause has a unique owner");
                    clause.id = Some(new_idx);
                    clause.age = self.state.current_iteration;
                    if rule_name != "Input" {
                        clause.role = ClauseRole::Derived;
                    }
                }

                let is_empty = arc_clause.is_empty();
                self.state.clauses.push(Arc::clone(&arc_clause));
                self.state.new.push(new_idx);
                self.state
                    .event_log
                    .push(StateChange::Add(arc_clause, rule_name, premises));

                if is_empty {
                    return Some(ProofResult::Proof {
                        empty_clause_idx: new_idx,
                    });
                }

                if self.env.options.max_clauses > 0
                    && self.state.clauses.len() >= self.env.options.max_clauses
                {
                    return Some(ProofResult::ResourceLimit);
                }
            }

            StateChange::Simplify(clause_idx, replacement, rule_name, premises) => {
                debug_assert!(replacement.is_none());
                if self.state.new.last() == Some(&clause_idx) {
                    self.state.new.pop();
                } else if self.state.unprocessed.shift_remove(&clause_idx) {
                    self.queue.on_remove(clause_idx);
                } else if self.state.processed.shift_remove(&clause_idx) {
                    self.index.on_delete(clause_idx);
                }
                self.state
                    .event_log
                    .push(StateChange::Simplify(clause_idx, replacement, rule_name, premises));
            }

            StateChange::Transfer(clause_idx) => {
                if self.state.new.last() == Some(&clause_idx) {
                    self.state.new.pop();
                }
                self.state.unprocessed.insert(clause_idx);
                self.queue
                    .on_transfer(clause_idx, &self.state.clauses[clause_idx]);
                self.state.event_log.push(StateChange::Transfer(clause_idx));
            }

            StateChange::Activate(clause_idx) => {
                self.state.unprocessed.shift_remove(&clause_idx);
                self.state.processed.insert(clause_idx);
                self.index
                    .on_activate(clause_idx, &self.state.clauses[clause_idx]);
                self.state.event_log.push(StateChange::Activate(clause_idx));

                self.state.current_iteration += 1;
                if self.env.options.max_iterations > 0
                    && self.state.current_iteration >= self.env.options.max_iterations
                {
                    return Some(ProofResult::ResourceLimit);
                }
            }
        }
        None
    }
}

/// Clausification without the definitional step, for non-fluted runs.
fn plain_clausify(problem: &Problem, interner: &mut Interner) -> CNFFormula {
    let mut cnf = CNFFormula::default();
    for unit in &problem.formulas {
        let role = match unit.role {
            FormulaRole::Definition => ClauseRole::Definition,
            FormulaRole::Hypothesis => ClauseRole::Hypothesis,
            FormulaRole::NegatedConjecture | FormulaRole::Conjecture => {
                ClauseRole::NegatedConjecture
            }
            FormulaRole::Axiom => ClauseRole::Axiom,
        };
        cnf.clauses
            .extend(fof_to_cnf(unit.formula.clone().flatten(), role, interner).clauses);
    }
    cnf.clauses.extend(problem.clauses.iter().cloned());
    cnf
}

/// Parse-free convenience entry: saturate a parsed problem.
pub fn saturate(
    problem: Problem,
    config: ProverConfig,
    interner: Interner,
) -> Result<(ProofResult, Prover), ProverError> {
    let mut prover = Prover::from_problem(problem, config, interner)?;
    let result = prover.prove();
    Ok((result, prover))
}
