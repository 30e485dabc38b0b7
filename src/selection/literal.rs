//! Literal selection strategies.
//!
//! Selection determines which literals of a clause are legal inference
//! sites. The fluted resolution engine applies its own maximality filter on
//! top, so in fluted mode the index is fed through `SelectAll`; the
//! KBO-maximal selector serves the generic resolution setup.

use crate::logic::{Clause, Literal, TermOrdering, KBO};
use std::collections::HashSet;

/// Trait for literal selection strategies
pub trait LiteralSelector: Send + Sync {
    /// Indices of the selected literals of a clause
    fn select(&self, clause: &Clause) -> HashSet<usize>;

    fn name(&self) -> &str;
}

/// Select all literals.
pub struct SelectAll;

impl LiteralSelector for SelectAll {
    fn select(&self, clause: &Clause) -> HashSet<usize> {
        (0..clause.literals.len()).collect()
    }

    fn name(&self) -> &str {
        "all"
    }
}

/// Select all KBO-maximal literals.
pub struct SelectMaximal {
    kbo: KBO,
}

impl SelectMaximal {
    pub fn new() -> Self {
        SelectMaximal {
            kbo: KBO::default(),
        }
    }
}

impl Default for SelectMaximal {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralSelector for SelectMaximal {
    fn select(&self, clause: &Clause) -> HashSet<usize> {
        let mut selected = HashSet::new();
        for i in 0..clause.literals.len() {
            let dominated = (0..clause.literals.len()).any(|j| {
                j != i && literal_greater(&clause.literals[j], &clause.literals[i], &self.kbo)
            });
            if !dominated {
                selected.insert(i);
            }
        }
        selected
    }

    fn name(&self) -> &str {
        "maximal"
    }
}

/// Compare two literals by their KBO-maximal argument terms, with
/// symbol-count weight as the tie-breaker.
pub fn literal_greater(lit1: &Literal, lit2: &Literal, kbo: &KBO) -> bool {
    let max1 = max_term(lit1, kbo);
    let max2 = max_term(lit2, kbo);

    match (max1, max2) {
        (Some(t1), Some(t2)) => match kbo.compare(t1, t2) {
            TermOrdering::Greater => true,
            TermOrdering::Less => false,
            _ => lit1.weight() > lit2.weight(),
        },
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => lit1.weight() > lit2.weight(),
    }
}

/// The KBO-like literal comparison consulted by the resolution engine's
/// ordering aftercheck.
pub fn literal_ordering(lit1: &Literal, lit2: &Literal, kbo: &KBO) -> TermOrdering {
    if lit1 == lit2 {
        TermOrdering::Equal
    } else if literal_greater(lit1, lit2, kbo) {
        TermOrdering::Greater
    } else if literal_greater(lit2, lit1, kbo) {
        TermOrdering::Less
    } else {
        TermOrdering::Incomparable
    }
}

fn max_term<'a>(lit: &'a Literal, kbo: &KBO) -> Option<&'a crate::logic::Term> {
    lit.args.iter().max_by(|a, b| match kbo.compare(a, b) {
        TermOrdering::Greater => std::cmp::Ordering::Greater,
        TermOrdering::Less => std::cmp::Ordering::Less,
        _ => std::cmp::Ordering::Equal,
    })
}
