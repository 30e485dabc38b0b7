//! Running summary of a fluted pattern under validation.
//!
//! A `FlutedSeq` accumulates what a left-to-right walk over an argument list
//! has seen: the functional terms encountered at this level, the variable
//! tracker, and whether the sequence has been observed to reach variable 0
//! (completeness). Invalidity is not a field: walks return
//! `Option<FlutedSeq>` and `None` means the fluted discipline failed.

use super::evar::EVar;
use crate::logic::Term;

/// Fluted-sequence summary for one walk level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlutedSeq {
    terms: Vec<Term>,
    var: EVar,
    complete: bool,
}

impl FlutedSeq {
    pub fn new() -> Self {
        FlutedSeq {
            terms: Vec::new(),
            var: EVar::Unset,
            complete: false,
        }
    }

    pub fn var(&self) -> EVar {
        self.var
    }

    pub fn set_var(&mut self, var: EVar) {
        self.var = var;
    }

    pub fn set_ground(&mut self) {
        self.var = EVar::Ground;
    }

    pub fn is_var_set(&self) -> bool {
        self.var.is_set()
    }

    pub fn is_var_ground(&self) -> bool {
        self.var.is_ground()
    }

    /// Completeness is monotone: once the walk has seen variable 0 (or a
    /// ground anchor), it stays complete.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_complete(&mut self) {
        self.complete = true;
    }

    pub fn has_terms(&self) -> bool {
        !self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn set_terms(&mut self, terms: Vec<Term>) {
        self.terms = terms;
    }

    pub fn add_term(&mut self, term: Term) {
        self.terms.push(term);
    }

    /// The same functional child may not appear twice at one level.
    pub fn is_member(&self, term: &Term) -> bool {
        self.terms.contains(term)
    }

    /// Check that `other` continues this level's term list: some suffix of
    /// the recorded terms must be a prefix of `other`. This is the
    /// "all arguments share a common suffix of constants" invariant.
    pub fn extends_term_list(&self, other: &[Term]) -> bool {
        let mut rest = other;
        let mut found_first = false;
        for term in &self.terms {
            if rest.is_empty() {
                break;
            }
            if term == &rest[0] {
                found_first = true;
            }
            if found_first {
                if term != &rest[0] {
                    return false;
                }
                rest = &rest[1..];
            }
        }
        true
    }

    /// Elementwise comparison until one list runs out.
    pub fn one_prefix_of_other(&self, other: &[Term]) -> bool {
        self.terms
            .iter()
            .zip(other.iter())
            .all(|(a, b)| a == b)
    }
}
