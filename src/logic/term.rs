//! Terms in first-order logic.
//!
//! Variables are bare numeric indices. Within a clause the indices follow
//! the fluted convention: the outermost quantified variable is 0 and indices
//! grow inward, so a literal's arguments read left to right as an ascending
//! run with functional arguments to the right of the variables.

use super::interner::{ConstantId, FunctionId, Interner};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A variable, identified by its numeric index within the containing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(pub u32);

impl Variable {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A constant symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    pub id: ConstantId,
}

impl Constant {
    pub fn new(id: ConstantId) -> Self {
        Constant { id }
    }
}

/// A function symbol with arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub id: FunctionId,
    pub arity: u8,
}

impl FunctionSymbol {
    pub fn new(id: FunctionId, arity: u8) -> Self {
        FunctionSymbol { id, arity }
    }
}

/// A term in first-order logic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
    Function(FunctionSymbol, Vec<Term>),
}

impl Term {
    pub fn var(index: u32) -> Term {
        Term::Variable(Variable(index))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// True for constants and for functional terms without variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Function(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// The rightmost argument of a functional term, if any.
    ///
    /// The rightmost position carries the distinguished semantics of the
    /// fluted calculus: superterm chains and maximal-subterm comparisons
    /// descend through it.
    pub fn rightmost_arg(&self) -> Option<&Term> {
        match self {
            Term::Function(_, args) => args.last(),
            _ => None,
        }
    }

    /// Collect all variable indices in this term
    pub fn collect_variables(&self, vars: &mut std::collections::HashSet<Variable>) {
        match self {
            Term::Variable(v) => {
                vars.insert(*v);
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Largest variable index in this term, if any variable occurs.
    pub fn max_variable(&self) -> Option<u32> {
        match self {
            Term::Variable(v) => Some(v.0),
            Term::Constant(_) => None,
            Term::Function(_, args) => args.iter().filter_map(Term::max_variable).max(),
        }
    }

    /// Number of symbol occurrences (variables, constants, functions).
    pub fn symbol_count(&self) -> usize {
        match self {
            Term::Variable(_) | Term::Constant(_) => 1,
            Term::Function(_, args) => 1 + args.iter().map(Term::symbol_count).sum::<usize>(),
        }
    }

    /// Format this term with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

/// Display wrapper for Term that includes an interner for name resolution
pub struct TermDisplay<'a> {
    term: &'a Term,
    interner: &'a Interner,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Variable(v) => write!(f, "X{}", v.0),
            Term::Constant(c) => write!(f, "{}", self.interner.resolve_constant(c.id)),
            Term::Function(func, args) => {
                write!(f, "{}(", self.interner.resolve_function(func.id))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}

// Display implementations that show ids (for debugging without an interner)

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Constant(c) => write!(f, "{}", c.id),
            Term::Function(func, args) => {
                write!(f, "{}(", func.id)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rightmost_arg() {
        let mut interner = Interner::new();
        let f = FunctionSymbol::new(interner.intern_function("f"), 2);
        let t = Term::Function(f, vec![Term::var(0), Term::var(1)]);

        assert_eq!(t.rightmost_arg(), Some(&Term::var(1)));
        assert_eq!(Term::var(0).rightmost_arg(), None);
    }

    #[test]
    fn test_groundness_and_max_variable() {
        let mut interner = Interner::new();
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));
        let f = FunctionSymbol::new(interner.intern_function("f"), 2);

        let ground = Term::Function(f, vec![a.clone(), a.clone()]);
        assert!(ground.is_ground());
        assert_eq!(ground.max_variable(), None);

        let open = Term::Function(f, vec![Term::var(3), a]);
        assert!(!open.is_ground());
        assert_eq!(open.max_variable(), Some(3));
    }
}
