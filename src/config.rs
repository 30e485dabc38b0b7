//! Prover configuration, statistics, and the shared environment.

use crate::logic::{Interner, KBO};
use crate::selection::PassiveLimits;
use serde::Serialize;
use std::time::Duration;

/// Configuration for one prover run.
#[derive(Debug, Clone)]
pub struct ProverConfig {
    /// Enable the fluted pipeline: classification gate, definitional
    /// preprocessing, separation at activation, and fluted resolution.
    pub fluted_mode: bool,
    /// Re-verify literal maximality under the substitution before emitting
    /// a resolvent.
    pub ordering_aftercheck: bool,
    /// Limit on stored clauses; 0 means no limit
    pub max_clauses: usize,
    /// Limit on activations; 0 means no limit
    pub max_iterations: usize,
    /// Conclusions with more literals than this are dropped
    pub max_clause_size: usize,
    pub timeout: Duration,
    /// Passive-container admission limits consulted by generating rules
    pub age_limit: Option<usize>,
    pub weight_limit: Option<usize>,
    /// Probability of selecting by age rather than weight
    pub age_probability: f64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            fluted_mode: false,
            ordering_aftercheck: true,
            max_clauses: 0,
            max_iterations: 0,
            max_clause_size: 100,
            timeout: Duration::from_secs(60),
            age_limit: None,
            weight_limit: None,
            age_probability: 0.5,
        }
    }
}

impl ProverConfig {
    pub fn passive_limits(&self) -> PassiveLimits {
        PassiveLimits {
            age_limit: self.age_limit,
            weight_limit: self.weight_limit,
        }
    }
}

/// Counters incremented throughout the pipeline.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Statistics {
    pub resolutions: usize,
    pub factorings: usize,
    pub separations: usize,
    pub definitions_introduced: usize,
    pub tautologies_deleted: usize,
    pub discarded_for_weight_limit: usize,
    pub blocked_by_aftercheck: usize,
}

/// The environment threaded through pipeline calls: signature, options,
/// statistics, the host term ordering, and the passive admission limits.
pub struct ProverEnv {
    pub interner: Interner,
    pub options: ProverConfig,
    pub statistics: Statistics,
    pub ordering: KBO,
    pub limits: PassiveLimits,
}

impl ProverEnv {
    pub fn new(interner: Interner, options: ProverConfig) -> Self {
        let limits = options.passive_limits();
        ProverEnv {
            interner,
            options,
            statistics: Statistics::default(),
            ordering: KBO::default(),
            limits,
        }
    }
}
