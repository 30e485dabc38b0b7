//! Clauses and CNF formulas

use super::interner::Interner;
use super::literal::Literal;
use super::term::{Term, Variable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role of a clause in the proof (from TPTP or derived)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClauseRole {
    /// Axiom from the problem
    #[default]
    Axiom,
    /// Hypothesis
    Hypothesis,
    /// Definition introduced by preprocessing
    Definition,
    /// Negated conjecture (goal)
    NegatedConjecture,
    /// Derived clause (from inference)
    Derived,
}

impl ClauseRole {
    pub fn from_tptp_role(role: &str) -> Self {
        match role {
            "axiom" | "lemma" | "theorem" | "corollary" | "assumption" => ClauseRole::Axiom,
            "hypothesis" => ClauseRole::Hypothesis,
            "definition" => ClauseRole::Definition,
            // Conjectures are negated during clausification
            "negated_conjecture" | "conjecture" => ClauseRole::NegatedConjecture,
            _ => ClauseRole::Axiom,
        }
    }
}

/// A clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub literals: Vec<Literal>,
    pub id: Option<usize>,
    pub role: ClauseRole,
    /// Age: the saturation iteration at which the clause was created
    pub age: usize,
}

/// A CNF formula (conjunction of clauses)
#[derive(Debug, Clone, Default)]
pub struct CNFFormula {
    pub clauses: Vec<Clause>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Clause {
            literals,
            id: None,
            role: ClauseRole::default(),
            age: 0,
        }
    }

    pub fn with_role(literals: Vec<Literal>, role: ClauseRole) -> Self {
        Clause {
            literals,
            id: None,
            role,
            age: 0,
        }
    }

    /// Check if this clause is empty (contradiction)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn num_positive_literals(&self) -> usize {
        self.literals.iter().filter(|l| l.polarity).count()
    }

    /// Check if this clause is a tautology
    pub fn is_tautology(&self, interner: &Interner) -> bool {
        for i in 0..self.literals.len() {
            for j in (i + 1)..self.literals.len() {
                if self.literals[i].predicate == self.literals[j].predicate
                    && self.literals[i].args == self.literals[j].args
                    && self.literals[i].polarity != self.literals[j].polarity
                {
                    return true;
                }
            }
        }

        for lit in &self.literals {
            if lit.polarity && lit.is_equality(interner) {
                if let [ref t1, ref t2] = lit.args.as_slice() {
                    if t1 == t2 {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Symbol-count weight of the whole clause.
    pub fn weight(&self) -> usize {
        self.literals.iter().map(Literal::weight).sum()
    }

    /// Largest variable index occurring in the clause, if any.
    pub fn max_variable(&self) -> Option<u32> {
        self.literals
            .iter()
            .flat_map(|lit| lit.args.iter())
            .filter_map(Term::max_variable)
            .max()
    }

    /// Renumber variables order-preservingly onto `0..k`.
    ///
    /// Derived clauses come out of substitution application with arbitrary
    /// variable indices; compacting them keeps the fluted numeric discipline
    /// intact (the separator's anchor-at-zero test, completeness checks, and
    /// the FL walks all read indices arithmetically). Order preservation
    /// matters: first-occurrence renaming would scramble ascending runs.
    pub fn renumber_variables(&mut self) {
        let mut seen: BTreeSet<u32> = BTreeSet::new();
        for lit in &self.literals {
            for arg in &lit.args {
                collect_variable_indices(arg, &mut seen);
            }
        }

        // Already compact: nothing to rewrite.
        if seen
            .iter()
            .enumerate()
            .all(|(i, &v)| v == i as u32)
        {
            return;
        }

        let mapping: std::collections::HashMap<u32, u32> = seen
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i as u32))
            .collect();

        for lit in &mut self.literals {
            for arg in &mut lit.args {
                remap_variables(arg, &mapping);
            }
        }
    }

    /// Format this clause with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> ClauseDisplay<'a> {
        ClauseDisplay {
            clause: self,
            interner,
        }
    }
}

fn collect_variable_indices(term: &Term, seen: &mut BTreeSet<u32>) {
    match term {
        Term::Variable(v) => {
            seen.insert(v.0);
        }
        Term::Constant(_) => {}
        Term::Function(_, args) => {
            for arg in args {
                collect_variable_indices(arg, seen);
            }
        }
    }
}

fn remap_variables(term: &mut Term, mapping: &std::collections::HashMap<u32, u32>) {
    match term {
        Term::Variable(v) => {
            if let Some(&new) = mapping.get(&v.0) {
                *v = Variable(new);
            }
        }
        Term::Constant(_) => {}
        Term::Function(_, args) => {
            for arg in args {
                remap_variables(arg, mapping);
            }
        }
    }
}

/// Display wrapper for Clause that includes an interner for name resolution
pub struct ClauseDisplay<'a> {
    clause: &'a Clause,
    interner: &'a Interner,
}

impl fmt::Display for ClauseDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clause.is_empty() {
            write!(f, "$false")
        } else {
            for (i, lit) in self.clause.literals.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{}", lit.display(self.interner))?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "$false")
        } else {
            for (i, lit) in self.literals.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{}", lit)?;
            }
            Ok(())
        }
    }
}
