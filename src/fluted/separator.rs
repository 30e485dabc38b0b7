//! Clause separation.
//!
//! A fluted clause whose literals fall into two variable-range-disjoint
//! halves is replaced by two smaller clauses linked through a fresh name
//! predicate over the boundary variables. The lower half must anchor at
//! variable 0; the upper half keeps the higher rightmost variable.

use super::evar::EVar;
use crate::logic::{Clause, ClauseRole, Interner, Literal, PredicateSymbol, Term};
use tracing::debug;

/// Attempt to separate a clause.
///
/// Returns the two replacement clauses, or an empty vector when separation
/// does not apply (ground or functional literals, FL1 shape, overlapping
/// variable ranges). The caller withdraws the original clause only when two
/// clauses come back.
pub fn separate(clause: &Clause, interner: &mut Interner) -> Vec<Clause> {
    let mut lits = clause.literals.iter();
    let first = match lits.next() {
        Some(lit) => lit,
        None => return vec![],
    };

    // Ground literals have their variable set contained in every half
    if first.arity() == 0 {
        return vec![];
    }
    // FL2-shaped clauses are not separated
    if !first.all_args_are_variables() {
        return vec![];
    }

    let mut half_c: Vec<Literal> = vec![first.clone()];
    let mut half_d: Vec<Literal> = Vec::new();
    let mut c_first = EVar::Var(first.leftmost_var().expect("all-variable literal").0);
    let mut c_last = EVar::Var(first.rightmost_var().expect("all-variable literal").0);
    let mut d_first = EVar::Unset;
    let mut d_last = EVar::Unset;

    for lit in lits {
        if lit.arity() == 0 {
            return vec![];
        }
        if !lit.all_args_are_variables() {
            return vec![];
        }

        let curr_first = EVar::Var(lit.leftmost_var().expect("all-variable literal").0);
        let curr_last = EVar::Var(lit.rightmost_var().expect("all-variable literal").0);

        if curr_last == c_last {
            half_c.push(lit.clone());
            if c_first > curr_first {
                c_first = curr_first;
            }
        } else {
            if half_d.is_empty() {
                d_last = curr_last;
                d_first = curr_first;
            }
            if d_first > curr_first {
                d_first = curr_first;
            }
            half_d.push(lit.clone());
        }
    }

    // All literals share one rightmost variable: FL1, nothing to separate
    if !d_last.is_set() {
        debug!("not separating: FL1 shape");
        return vec![];
    }

    // D carries the higher rightmost variable
    if c_last > d_last {
        std::mem::swap(&mut half_c, &mut half_d);
        std::mem::swap(&mut c_first, &mut d_first);
        std::mem::swap(&mut c_last, &mut d_last);
    }

    // The lower half must anchor at variable 0
    if c_first != EVar::Var(0) {
        debug!("not separating: lower half does not anchor at variable 0");
        return vec![];
    }

    // If D also reaches variable 0 its variable set contains C's
    let boundary_first = d_first.index();
    let boundary_last = c_last.index();
    if boundary_first == 0 {
        debug!("not separating: one variable range contains the other");
        return vec![];
    }

    create_clauses(boundary_first, boundary_last, half_c, half_d, clause, interner)
}

/// Build the replacement pair joined by a fresh name predicate over the
/// boundary range (empty range yields a propositional name predicate).
fn create_clauses(
    boundary_first: u32,
    boundary_last: u32,
    mut half_c: Vec<Literal>,
    mut half_d: Vec<Literal>,
    original: &Clause,
    interner: &mut Interner,
) -> Vec<Clause> {
    let args: Vec<Term> = (boundary_first..=boundary_last).map(Term::var).collect();
    let pred = PredicateSymbol::new(interner.name_predicate(), args.len() as u8);

    half_c.push(Literal::negative(pred, args.clone()));
    half_d.push(Literal::positive(pred, args));

    let mut clause_c = Clause::with_role(half_c, ClauseRole::Derived);
    let mut clause_d = Clause::with_role(half_d, ClauseRole::Derived);
    clause_c.age = original.age;
    clause_d.age = original.age;

    debug!(
        "separated into {} and {}",
        clause_c.display(interner),
        clause_d.display(interner)
    );

    vec![clause_c, clause_d]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_problem;

    fn parse_clause(input: &str, interner: &mut Interner) -> Clause {
        let problem = parse_problem(input, interner).unwrap();
        problem.clauses.into_iter().next().unwrap()
    }

    #[test]
    fn test_fl1_clause_not_separated() {
        let mut interner = Interner::new();
        let clause = parse_clause("cnf(a, axiom, p(X, Y) | ~q(X, Y)).", &mut interner);
        assert!(separate(&clause, &mut interner).is_empty());
    }

    #[test]
    fn test_overlap_at_zero_not_separated() {
        let mut interner = Interner::new();
        // p rightmost X0, q covers X0..X1: both halves reach variable 0
        let clause = parse_clause("cnf(a, axiom, p(X) | q(X, Y)).", &mut interner);
        assert!(separate(&clause, &mut interner).is_empty());
    }

    #[test]
    fn test_functional_clause_not_separated() {
        let mut interner = Interner::new();
        let clause = parse_clause("cnf(a, axiom, p(X, f(X)) | q(X)).", &mut interner);
        assert!(separate(&clause, &mut interner).is_empty());
    }

    #[test]
    fn test_ground_literal_not_separated() {
        let mut interner = Interner::new();
        let clause = parse_clause("cnf(a, axiom, p | q(X, Y)).", &mut interner);
        assert!(separate(&clause, &mut interner).is_empty());
    }

    #[test]
    fn test_separation_over_shared_boundary() {
        let mut interner = Interner::new();
        // p covers X0..X1, q covers X1..X2: boundary variable X1
        let clause = parse_clause("cnf(a, axiom, p(X, Y) | q(Y, Z)).", &mut interner);
        let result = separate(&clause, &mut interner);
        assert_eq!(result.len(), 2);

        let (c, d) = (&result[0], &result[1]);
        // C keeps p plus the negative name literal, D keeps q plus the positive
        let c_name = c.literals.last().unwrap();
        let d_name = d.literals.last().unwrap();
        assert!(!c_name.polarity);
        assert!(d_name.polarity);
        assert_eq!(c_name.predicate, d_name.predicate);
        assert_eq!(c_name.args, d_name.args);
        assert_eq!(c_name.args, vec![Term::var(1)]);
        assert!(interner
            .resolve_predicate(c_name.predicate.id)
            .starts_with("sp"));

        // The halves share nothing but the name literal
        assert_eq!(c.literals.len(), 2);
        assert_eq!(d.literals.len(), 2);
    }

    #[test]
    fn test_disjoint_ranges_use_propositional_name() {
        let mut interner = Interner::new();
        // p covers X0 only, q covers X1..X2: boundary range 1..=0 is empty
        let clause = parse_clause("cnf(a, axiom, p(X) | q(Y, Z)).", &mut interner);
        let result = separate(&clause, &mut interner);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].literals.last().unwrap().arity(), 0);
    }

    #[test]
    fn test_separation_is_idempotent() {
        let mut interner = Interner::new();
        let clause = parse_clause("cnf(a, axiom, p(X, Y) | q(Y, Z)).", &mut interner);
        let result = separate(&clause, &mut interner);
        assert_eq!(result.len(), 2);

        for half in &result {
            assert!(
                separate(half, &mut interner).is_empty(),
                "separated half separated again: {}",
                half.display(&interner)
            );
        }
    }

    #[test]
    fn test_higher_half_carries_upper_range() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 2);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);

        // First literal q(X1,X2) has the higher rightmost variable, so the
        // halves are swapped before the anchor test
        let clause = Clause::new(vec![
            Literal::positive(q, vec![Term::var(1), Term::var(2)]),
            Literal::positive(p, vec![Term::var(0), Term::var(1)]),
        ]);
        let result = separate(&clause, &mut interner);
        assert_eq!(result.len(), 2);

        // The half holding the negative name literal is the one anchored at 0
        let anchored = &result[0];
        assert_eq!(anchored.literals[0].predicate, p);
        assert_eq!(anchored.literals[0].leftmost_var().map(|v| v.0), Some(0));
        assert!(!anchored.literals.last().unwrap().polarity);
    }
}
