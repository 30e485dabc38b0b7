//! First-order formula representation
//!
//! Full first-order formulas as they exist before clausification. Quantifiers
//! bind a vector of variables; the definitional preprocessor normalizes these
//! vectors into chains of single-variable quantifiers before axiomatizing.

use crate::logic::{PredicateSymbol, Term, Variable};
use std::collections::HashSet;
use std::fmt;

/// Quantifier kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

/// A first-order formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FOFFormula {
    True,
    False,
    /// Atomic formula: predicate applied to terms
    Atom(PredicateSymbol, Vec<Term>),
    Not(Box<FOFFormula>),
    And(Box<FOFFormula>, Box<FOFFormula>),
    Or(Box<FOFFormula>, Box<FOFFormula>),
    Implies(Box<FOFFormula>, Box<FOFFormula>),
    Iff(Box<FOFFormula>, Box<FOFFormula>),
    Xor(Box<FOFFormula>, Box<FOFFormula>),
    /// Quantified formula binding a non-empty vector of variables
    Quantified(Quantifier, Vec<Variable>, Box<FOFFormula>),
}

impl FOFFormula {
    /// Free variables in stable first-occurrence order.
    ///
    /// The definitional preprocessor builds replacement atoms over exactly
    /// this sequence, so the order must be deterministic.
    pub fn free_variables(&self) -> Vec<Variable> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_free(&mut HashSet::new(), &mut seen, &mut out);
        out
    }

    fn collect_free(
        &self,
        bound: &mut HashSet<Variable>,
        seen: &mut HashSet<Variable>,
        out: &mut Vec<Variable>,
    ) {
        match self {
            FOFFormula::True | FOFFormula::False => {}
            FOFFormula::Atom(_, args) => {
                for arg in args {
                    collect_free_in_term(arg, bound, seen, out);
                }
            }
            FOFFormula::Not(f) => f.collect_free(bound, seen, out),
            FOFFormula::And(f1, f2)
            | FOFFormula::Or(f1, f2)
            | FOFFormula::Implies(f1, f2)
            | FOFFormula::Iff(f1, f2)
            | FOFFormula::Xor(f1, f2) => {
                f1.collect_free(bound, seen, out);
                f2.collect_free(bound, seen, out);
            }
            FOFFormula::Quantified(_, vars, f) => {
                let newly: Vec<Variable> =
                    vars.iter().copied().filter(|v| bound.insert(*v)).collect();
                f.collect_free(bound, seen, out);
                for v in newly {
                    bound.remove(&v);
                }
            }
        }
    }

    /// Collect every variable bound by a quantifier anywhere in the formula.
    pub fn collect_bound_variables(&self, out: &mut HashSet<Variable>) {
        match self {
            FOFFormula::True | FOFFormula::False | FOFFormula::Atom(_, _) => {}
            FOFFormula::Not(f) => f.collect_bound_variables(out),
            FOFFormula::And(f1, f2)
            | FOFFormula::Or(f1, f2)
            | FOFFormula::Implies(f1, f2)
            | FOFFormula::Iff(f1, f2)
            | FOFFormula::Xor(f1, f2) => {
                f1.collect_bound_variables(out);
                f2.collect_bound_variables(out);
            }
            FOFFormula::Quantified(_, vars, f) => {
                out.extend(vars.iter().copied());
                f.collect_bound_variables(out);
            }
        }
    }

    /// Eliminate `$true`/`$false` subformulas.
    pub fn simplify_constants(self) -> FOFFormula {
        use FOFFormula::*;
        match self {
            True | False | Atom(_, _) => self,
            Not(f) => match f.simplify_constants() {
                True => False,
                False => True,
                g => Not(Box::new(g)),
            },
            And(f1, f2) => match (f1.simplify_constants(), f2.simplify_constants()) {
                (False, _) | (_, False) => False,
                (True, g) | (g, True) => g,
                (g1, g2) => And(Box::new(g1), Box::new(g2)),
            },
            Or(f1, f2) => match (f1.simplify_constants(), f2.simplify_constants()) {
                (True, _) | (_, True) => True,
                (False, g) | (g, False) => g,
                (g1, g2) => Or(Box::new(g1), Box::new(g2)),
            },
            Implies(f1, f2) => match (f1.simplify_constants(), f2.simplify_constants()) {
                (False, _) | (_, True) => True,
                (True, g) => g,
                (g, False) => Not(Box::new(g)),
                (g1, g2) => Implies(Box::new(g1), Box::new(g2)),
            },
            Iff(f1, f2) => match (f1.simplify_constants(), f2.simplify_constants()) {
                (True, g) | (g, True) => g,
                (False, g) | (g, False) => Not(Box::new(g)).simplify_constants(),
                (g1, g2) => Iff(Box::new(g1), Box::new(g2)),
            },
            Xor(f1, f2) => match (f1.simplify_constants(), f2.simplify_constants()) {
                (False, g) | (g, False) => g,
                (True, g) | (g, True) => Not(Box::new(g)).simplify_constants(),
                (g1, g2) => Xor(Box::new(g1), Box::new(g2)),
            },
            Quantified(q, vars, f) => match f.simplify_constants() {
                True => True,
                False => False,
                g => Quantified(q, vars, Box::new(g)),
            },
        }
    }

    /// Convert to negation normal form.
    pub fn to_nnf(self) -> FOFFormula {
        self.nnf(false)
    }

    fn nnf(self, negate: bool) -> FOFFormula {
        use FOFFormula::*;
        match (self, negate) {
            (True, false) | (False, true) => True,
            (True, true) | (False, false) => False,

            (Atom(p, args), false) => Atom(p, args),
            (Atom(p, args), true) => Not(Box::new(Atom(p, args))),

            (Not(f), neg) => f.nnf(!neg),

            (And(f1, f2), false) => And(Box::new(f1.nnf(false)), Box::new(f2.nnf(false))),
            // De Morgan: ~(A & B) = ~A | ~B
            (And(f1, f2), true) => Or(Box::new(f1.nnf(true)), Box::new(f2.nnf(true))),

            (Or(f1, f2), false) => Or(Box::new(f1.nnf(false)), Box::new(f2.nnf(false))),
            (Or(f1, f2), true) => And(Box::new(f1.nnf(true)), Box::new(f2.nnf(true))),

            // A => B = ~A | B
            (Implies(f1, f2), false) => Or(Box::new(f1.nnf(true)), Box::new(f2.nnf(false))),
            (Implies(f1, f2), true) => And(Box::new(f1.nnf(false)), Box::new(f2.nnf(true))),

            // A <=> B = (~A | B) & (A | ~B)
            (Iff(f1, f2), false) => And(
                Box::new(Or(
                    Box::new(f1.clone().nnf(true)),
                    Box::new(f2.clone().nnf(false)),
                )),
                Box::new(Or(Box::new(f1.nnf(false)), Box::new(f2.nnf(true)))),
            ),
            // ~(A <=> B) = (A & ~B) | (~A & B)
            (Iff(f1, f2), true) => Or(
                Box::new(And(
                    Box::new(f1.clone().nnf(false)),
                    Box::new(f2.clone().nnf(true)),
                )),
                Box::new(And(Box::new(f1.nnf(true)), Box::new(f2.nnf(false)))),
            ),

            (Xor(f1, f2), neg) => Iff(f1, f2).nnf(!neg),

            (Quantified(Quantifier::Forall, vars, f), false) => {
                Quantified(Quantifier::Forall, vars, Box::new(f.nnf(false)))
            }
            // ~(![X]: P) = ?[X]: ~P
            (Quantified(Quantifier::Forall, vars, f), true) => {
                Quantified(Quantifier::Exists, vars, Box::new(f.nnf(true)))
            }
            (Quantified(Quantifier::Exists, vars, f), false) => {
                Quantified(Quantifier::Exists, vars, Box::new(f.nnf(false)))
            }
            (Quantified(Quantifier::Exists, vars, f), true) => {
                Quantified(Quantifier::Forall, vars, Box::new(f.nnf(true)))
            }
        }
    }

    /// Merge directly nested quantifiers of the same kind into one vector.
    pub fn flatten(self) -> FOFFormula {
        use FOFFormula::*;
        match self {
            Quantified(q, mut vars, f) => match f.flatten() {
                Quantified(q2, vars2, g) if q2 == q => {
                    vars.extend(vars2);
                    Quantified(q, vars, g)
                }
                g => Quantified(q, vars, Box::new(g)),
            },
            Not(f) => Not(Box::new(f.flatten())),
            And(f1, f2) => And(Box::new(f1.flatten()), Box::new(f2.flatten())),
            Or(f1, f2) => Or(Box::new(f1.flatten()), Box::new(f2.flatten())),
            Implies(f1, f2) => Implies(Box::new(f1.flatten()), Box::new(f2.flatten())),
            Iff(f1, f2) => Iff(Box::new(f1.flatten()), Box::new(f2.flatten())),
            Xor(f1, f2) => Xor(Box::new(f1.flatten()), Box::new(f2.flatten())),
            other => other,
        }
    }
}

/// TPTP formula role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaRole {
    Axiom,
    Hypothesis,
    Definition,
    Conjecture,
    NegatedConjecture,
}

impl FormulaRole {
    pub fn from_tptp(role: &str) -> Self {
        match role {
            "hypothesis" => FormulaRole::Hypothesis,
            "definition" => FormulaRole::Definition,
            "conjecture" => FormulaRole::Conjecture,
            "negated_conjecture" => FormulaRole::NegatedConjecture,
            _ => FormulaRole::Axiom,
        }
    }
}

/// A named formula unit as it appears in the problem
#[derive(Debug, Clone)]
pub struct FormulaUnit {
    pub name: String,
    pub role: FormulaRole,
    pub formula: FOFFormula,
}

impl fmt::Display for FOFFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FOFFormula::True => write!(f, "$true"),
            FOFFormula::False => write!(f, "$false"),
            FOFFormula::Atom(p, args) => {
                write!(f, "{}", p.id)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            FOFFormula::Not(g) => write!(f, "~({})", g),
            FOFFormula::And(g1, g2) => write!(f, "({} & {})", g1, g2),
            FOFFormula::Or(g1, g2) => write!(f, "({} | {})", g1, g2),
            FOFFormula::Implies(g1, g2) => write!(f, "({} => {})", g1, g2),
            FOFFormula::Iff(g1, g2) => write!(f, "({} <=> {})", g1, g2),
            FOFFormula::Xor(g1, g2) => write!(f, "({} <~> {})", g1, g2),
            FOFFormula::Quantified(q, vars, g) => {
                write!(f, "{}[", if *q == Quantifier::Forall { "!" } else { "?" })?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]: ({})", g)
            }
        }
    }
}

fn collect_free_in_term(
    term: &Term,
    bound: &HashSet<Variable>,
    seen: &mut HashSet<Variable>,
    out: &mut Vec<Variable>,
) {
    match term {
        Term::Variable(v) => {
            if !bound.contains(v) && seen.insert(*v) {
                out.push(*v);
            }
        }
        Term::Constant(_) => {}
        Term::Function(_, args) => {
            for arg in args {
                collect_free_in_term(arg, bound, seen, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Interner;

    fn atom(interner: &mut Interner, name: &str, args: Vec<Term>) -> FOFFormula {
        let p = PredicateSymbol::new(interner.intern_predicate(name), args.len() as u8);
        FOFFormula::Atom(p, args)
    }

    #[test]
    fn test_nnf_de_morgan() {
        let mut interner = Interner::new();
        let p = atom(&mut interner, "p", vec![]);
        let q = atom(&mut interner, "q", vec![]);

        let formula = FOFFormula::Not(Box::new(FOFFormula::And(
            Box::new(p.clone()),
            Box::new(q.clone()),
        )));

        match formula.to_nnf() {
            FOFFormula::Or(f1, f2) => {
                assert!(matches!(*f1, FOFFormula::Not(_)));
                assert!(matches!(*f2, FOFFormula::Not(_)));
            }
            other => panic!("expected disjunction, got {}", other),
        }
    }

    #[test]
    fn test_nnf_pushes_through_quantifiers() {
        let mut interner = Interner::new();
        let p = atom(&mut interner, "p", vec![Term::var(0)]);

        // ~(![X0]: p(X0)) = ?[X0]: ~p(X0)
        let formula = FOFFormula::Not(Box::new(FOFFormula::Quantified(
            Quantifier::Forall,
            vec![Variable(0)],
            Box::new(p),
        )));

        match formula.to_nnf() {
            FOFFormula::Quantified(Quantifier::Exists, vars, body) => {
                assert_eq!(vars, vec![Variable(0)]);
                assert!(matches!(*body, FOFFormula::Not(_)));
            }
            other => panic!("expected existential, got {}", other),
        }
    }

    #[test]
    fn test_free_variables_order() {
        let mut interner = Interner::new();
        // p(X1, X0) & q(X2): free vars in first-occurrence order 1, 0, 2
        let p = atom(&mut interner, "p", vec![Term::var(1), Term::var(0)]);
        let q = atom(&mut interner, "q", vec![Term::var(2)]);
        let formula = FOFFormula::And(Box::new(p), Box::new(q));

        assert_eq!(
            formula.free_variables(),
            vec![Variable(1), Variable(0), Variable(2)]
        );
    }

    #[test]
    fn test_free_variables_respect_binding() {
        let mut interner = Interner::new();
        let p = atom(&mut interner, "p", vec![Term::var(0), Term::var(1)]);
        let formula =
            FOFFormula::Quantified(Quantifier::Forall, vec![Variable(1)], Box::new(p));

        assert_eq!(formula.free_variables(), vec![Variable(0)]);
    }

    #[test]
    fn test_simplify_constants() {
        let mut interner = Interner::new();
        let p = atom(&mut interner, "p", vec![]);

        let formula = FOFFormula::And(
            Box::new(FOFFormula::True),
            Box::new(FOFFormula::Or(
                Box::new(p.clone()),
                Box::new(FOFFormula::False),
            )),
        );
        assert_eq!(formula.simplify_constants(), p);
    }

    #[test]
    fn test_flatten_merges_quantifier_chains() {
        let mut interner = Interner::new();
        let p = atom(&mut interner, "p", vec![Term::var(0), Term::var(1)]);

        let formula = FOFFormula::Quantified(
            Quantifier::Forall,
            vec![Variable(0)],
            Box::new(FOFFormula::Quantified(
                Quantifier::Forall,
                vec![Variable(1)],
                Box::new(p),
            )),
        );

        match formula.flatten() {
            FOFFormula::Quantified(Quantifier::Forall, vars, _) => {
                assert_eq!(vars, vec![Variable(0), Variable(1)]);
            }
            other => panic!("expected merged quantifier, got {}", other),
        }
    }
}
