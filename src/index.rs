//! Literal index over activated clauses.
//!
//! Generating rules query complementary candidates by `(predicate,
//! polarity)` instead of scanning the whole active set. Every literal of an
//! activated clause is indexed; eligibility filtering happens inside the
//! rules themselves.

use crate::logic::{Clause, PredicateId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LiteralIndex {
    /// (predicate, polarity) -> (clause index, literal index) entries
    entries: HashMap<(PredicateId, bool), Vec<(usize, usize)>>,
}

impl LiteralIndex {
    pub fn new() -> Self {
        LiteralIndex::default()
    }

    /// Index an activated clause.
    pub fn on_activate(&mut self, clause_idx: usize, clause: &Clause) {
        for (lit_idx, lit) in clause.literals.iter().enumerate() {
            self.entries
                .entry((lit.predicate.id, lit.polarity))
                .or_default()
                .push((clause_idx, lit_idx));
        }
    }

    /// Drop all entries of a clause that left the active set.
    pub fn on_delete(&mut self, clause_idx: usize) {
        self.entries.retain(|_, entries| {
            entries.retain(|(ci, _)| *ci != clause_idx);
            !entries.is_empty()
        });
    }

    /// Candidate literal occurrences with the given predicate and polarity.
    pub fn candidates(&self, pred: PredicateId, polarity: bool) -> &[(usize, usize)] {
        self.entries
            .get(&(pred, polarity))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
