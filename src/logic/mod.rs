//! First-order logic representation and manipulation
//!
//! This module provides the fundamental types for representing FOL problems:
//! interned symbols, terms, literals, clauses, substitutions, unification,
//! and the host term ordering.

pub mod clause;
pub mod interner;
pub mod literal;
pub mod ordering;
pub mod substitution;
pub mod term;
pub mod unification;

pub use clause::{CNFFormula, Clause, ClauseDisplay, ClauseRole};
pub use interner::{ConstantId, FunctionId, Interner, PredicateId};
pub use literal::{Literal, LiteralDisplay, PredicateSymbol};
pub use ordering::{KBOConfig, Ordering as TermOrdering, KBO};
pub use substitution::Substitution;
pub use term::{Constant, FunctionSymbol, Term, TermDisplay, Variable};
pub use unification::{
    offset_literal_variables, offset_term_variables, unify, unify_args, UnificationError,
    UnificationResult,
};
