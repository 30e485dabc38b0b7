//! Saturation state: clause storage, the three clause sets, the event log,
//! proof extraction, and the inference-rule traits.

use crate::config::ProverEnv;
use crate::index::LiteralIndex;
use crate::logic::Clause;
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Atomic operations on the proof state.
///
/// The clause sets are N (new, awaiting forward simplification), U
/// (unprocessed/passive, awaiting selection), and P (processed/active, used
/// for generating inferences).
#[derive(Debug, Clone, Serialize)]
pub enum StateChange {
    /// New clause added to N: (clause, rule name, premise indices)
    Add(Arc<Clause>, String, Vec<usize>),
    /// Clause removed, optionally replaced: (index, replacement, rule, premises)
    Simplify(usize, Option<Arc<Clause>>, String, Vec<usize>),
    /// Clause transferred from N to U
    Transfer(usize),
    /// Clause selected and transferred from U to P
    Activate(usize),
}

pub type EventLog = Vec<StateChange>;

/// Result of saturation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofResult {
    /// Empty clause derived
    Proof { empty_clause_idx: usize },
    /// Passive set exhausted without refutation
    Saturated,
    /// Clause, iteration, or time limit reached
    ResourceLimit,
}

/// A single step in an extracted proof.
#[derive(Debug, Clone)]
pub struct ProofStep {
    pub clause_idx: usize,
    pub rule_name: String,
    pub premises: Vec<usize>,
    pub conclusion: Arc<Clause>,
}

/// Lean data container for the given-clause algorithm.
pub struct SaturationState {
    /// Storage for all clauses, indexed by clause id
    pub clauses: Vec<Arc<Clause>>,
    /// Set P: processed/active clauses
    pub processed: IndexSet<usize>,
    /// Set U: unprocessed/passive clauses
    pub unprocessed: IndexSet<usize>,
    /// Set N: new clauses awaiting forward simplification
    pub new: Vec<usize>,
    /// Raw event log of all state changes
    pub event_log: EventLog,
    /// Current iteration, used as the age of new clauses
    pub current_iteration: usize,
    /// Number of input clauses
    pub initial_clause_count: usize,
}

impl SaturationState {
    pub fn new() -> Self {
        SaturationState {
            clauses: Vec::new(),
            processed: IndexSet::new(),
            unprocessed: IndexSet::new(),
            new: Vec::new(),
            event_log: Vec::new(),
            current_iteration: 0,
            initial_clause_count: 0,
        }
    }

    /// Extract a proof by backward traversal from the given clause index.
    pub fn extract_proof(&self, clause_idx: usize) -> Vec<ProofStep> {
        let mut derivations: HashMap<usize, (String, Vec<usize>)> = HashMap::new();
        for event in &self.event_log {
            match event {
                StateChange::Add(clause, rule_name, premises) => {
                    if let Some(idx) = clause.id {
                        derivations.insert(idx, (rule_name.clone(), premises.clone()));
                    }
                }
                StateChange::Simplify(_, Some(clause), rule_name, premises) => {
                    if let Some(idx) = clause.id {
                        derivations.insert(idx, (rule_name.clone(), premises.clone()));
                    }
                }
                _ => {}
            }
        }

        let mut in_proof = Vec::new();
        let mut visited = HashSet::new();
        let mut to_visit = vec![clause_idx];
        while let Some(idx) = to_visit.pop() {
            if !visited.insert(idx) {
                continue;
            }
            in_proof.push(idx);
            if let Some((_, premises)) = derivations.get(&idx) {
                to_visit.extend(premises.iter().copied());
            }
        }
        in_proof.sort_unstable();

        in_proof
            .into_iter()
            .map(|idx| {
                let (rule_name, premises) = derivations
                    .get(&idx)
                    .cloned()
                    .unwrap_or_else(|| ("Input".into(), vec![]));
                ProofStep {
                    clause_idx: idx,
                    rule_name,
                    premises,
                    conclusion: Arc::clone(&self.clauses[idx]),
                }
            })
            .collect()
    }
}

impl Default for SaturationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for generating inference rules.
///
/// Rules may keep state across calls (the fluted engine memoizes literal
/// maximality per clause), hence `&mut self`.
pub trait GeneratingInference {
    fn name(&self) -> &str;

    /// Generate inferences between the given clause and the active set.
    fn generate(
        &mut self,
        given_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
        index: &LiteralIndex,
    ) -> Vec<StateChange>;
}

/// Trait for forward simplification rules.
pub trait SimplifyingInference {
    fn name(&self) -> &str;

    /// Try to simplify or delete a clause in N.
    fn simplify_forward(
        &self,
        clause_idx: usize,
        state: &SaturationState,
        env: &mut ProverEnv,
    ) -> Option<StateChange>;
}
