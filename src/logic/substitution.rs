//! Variable substitutions

use super::clause::Clause;
use super::literal::Literal;
use super::term::{Term, Variable};
use std::collections::HashMap;

/// A substitution mapping variables to terms
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    pub map: HashMap<Variable, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution {
            map: HashMap::new(),
        }
    }

    pub fn insert(&mut self, var: Variable, term: Term) {
        self.map.insert(var, term);
    }

    /// Add a mapping with eager propagation, keeping every binding fully
    /// substituted. Unification relies on this to produce idempotent MGUs.
    pub fn insert_normalized(&mut self, var: Variable, term: Term) {
        let normalized = term.apply_substitution(self);
        self.map.insert(var, normalized.clone());

        let single = Substitution {
            map: HashMap::from([(var, normalized)]),
        };
        for (v, bound) in self.map.clone() {
            if v != var {
                self.map.insert(v, bound.apply_substitution(&single));
            }
        }
    }

    /// Compose two substitutions: `self` applied first, then `other`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = Substitution::new();

        for (&var, term) in &self.map {
            result.insert(var, term.apply_substitution(other));
        }
        for (&var, term) in &other.map {
            if !self.map.contains_key(&var) {
                result.insert(var, term.clone());
            }
        }

        result
    }

    pub fn get(&self, var: Variable) -> Option<&Term> {
        self.map.get(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Term {
    /// Apply a substitution to this term
    pub fn apply_substitution(&self, subst: &Substitution) -> Term {
        match self {
            Term::Variable(v) => subst.map.get(v).cloned().unwrap_or_else(|| self.clone()),
            Term::Constant(_) => self.clone(),
            Term::Function(f, args) => Term::Function(
                *f,
                args.iter().map(|arg| arg.apply_substitution(subst)).collect(),
            ),
        }
    }
}

impl Literal {
    /// Apply a substitution to this literal
    pub fn apply_substitution(&self, subst: &Substitution) -> Literal {
        Literal {
            predicate: self.predicate,
            args: self
                .args
                .iter()
                .map(|arg| arg.apply_substitution(subst))
                .collect(),
            polarity: self.polarity,
        }
    }
}

impl Clause {
    /// Apply a substitution to this clause. The result carries no id.
    pub fn apply_substitution(&self, subst: &Substitution) -> Clause {
        Clause {
            literals: self
                .literals
                .iter()
                .map(|lit| lit.apply_substitution(subst))
                .collect(),
            id: None,
            role: self.role,
            age: self.age,
        }
    }
}
