//! Conversion from first-order formulas to CNF
//!
//! The standard pipeline: negation normal form, skolemization of existential
//! quantifiers under the current universal scope, removal of universal
//! quantifiers, and distribution of disjunction over conjunction. Each
//! resulting clause has its variables compacted onto `0..k`.

use super::fof::{FOFFormula, Quantifier};
use crate::logic::{
    CNFFormula, Clause, ClauseRole, Constant, FunctionSymbol, Interner, Literal, Term, Variable,
};

/// Convert a formula to CNF with the given clause role.
pub fn fof_to_cnf(formula: FOFFormula, role: ClauseRole, interner: &mut Interner) -> CNFFormula {
    let mut converter = CNFConverter {
        universal_scope: Vec::new(),
        skolem_counter: 0,
        role,
    };

    let nnf = formula.simplify_constants().to_nnf();
    let skolemized = converter.skolemize(nnf, interner);
    let matrix = strip_universal_quantifiers(skolemized);
    let mut clauses = converter.distribute(matrix);

    for clause in &mut clauses {
        clause.renumber_variables();
    }

    CNFFormula { clauses }
}

struct CNFConverter {
    /// Universally quantified variables in scope, outermost first.
    /// Skolem terms for an existential take exactly these as arguments.
    universal_scope: Vec<Variable>,
    skolem_counter: usize,
    role: ClauseRole,
}

impl CNFConverter {
    /// A skolem name unused by any constant or function so far.
    /// Fresh per problem, not per unit: the interner is the arbiter.
    fn fresh_skolem_name(&mut self, interner: &Interner) -> String {
        loop {
            let name = format!("sk{}", self.skolem_counter);
            self.skolem_counter += 1;
            if interner.get_function(&name).is_none() && interner.get_constant(&name).is_none() {
                return name;
            }
        }
    }

    fn skolemize(&mut self, formula: FOFFormula, interner: &mut Interner) -> FOFFormula {
        use FOFFormula::*;
        match formula {
            True | False | Atom(_, _) | Not(_) => formula,

            And(f1, f2) => And(
                Box::new(self.skolemize(*f1, interner)),
                Box::new(self.skolemize(*f2, interner)),
            ),
            Or(f1, f2) => Or(
                Box::new(self.skolemize(*f1, interner)),
                Box::new(self.skolemize(*f2, interner)),
            ),

            Quantified(Quantifier::Forall, vars, f) => {
                let depth = self.universal_scope.len();
                self.universal_scope.extend(vars.iter().copied());
                let body = self.skolemize(*f, interner);
                self.universal_scope.truncate(depth);
                Quantified(Quantifier::Forall, vars, Box::new(body))
            }

            Quantified(Quantifier::Exists, vars, f) => {
                let mut body = *f;
                for var in vars {
                    let name = self.fresh_skolem_name(interner);
                    let skolem = if self.universal_scope.is_empty() {
                        Term::Constant(Constant::new(interner.intern_constant(&name)))
                    } else {
                        Term::Function(
                            FunctionSymbol::new(
                                interner.intern_function(&name),
                                self.universal_scope.len() as u8,
                            ),
                            self.universal_scope
                                .iter()
                                .map(|v| Term::Variable(*v))
                                .collect(),
                        )
                    };
                    body = substitute_in_formula(body, var, &skolem);
                }
                self.skolemize(body, interner)
            }

            Implies(_, _) | Iff(_, _) | Xor(_, _) => {
                unreachable!("complex connectives eliminated by NNF")
            }
        }
    }

    /// Distribute disjunction over conjunction, producing clauses.
    fn distribute(&self, formula: FOFFormula) -> Vec<Clause> {
        use FOFFormula::*;
        match formula {
            True => vec![],
            False => vec![Clause::with_role(vec![], self.role)],

            And(f1, f2) => {
                let mut clauses = self.distribute(*f1);
                clauses.extend(self.distribute(*f2));
                clauses
            }

            Or(f1, f2) => {
                let left = self.distribute(*f1);
                let right = self.distribute(*f2);
                // True on either side: no clause constraints from the disjunction
                if left.is_empty() || right.is_empty() {
                    return vec![];
                }
                let mut clauses = Vec::with_capacity(left.len() * right.len());
                for c1 in &left {
                    for c2 in &right {
                        let mut literals = c1.literals.clone();
                        literals.extend(c2.literals.clone());
                        clauses.push(Clause::with_role(literals, self.role));
                    }
                }
                clauses
            }

            Atom(p, args) => vec![Clause::with_role(
                vec![Literal::positive(p, args)],
                self.role,
            )],

            Not(inner) => match *inner {
                Atom(p, args) => vec![Clause::with_role(
                    vec![Literal::negative(p, args)],
                    self.role,
                )],
                other => unreachable!("negation of non-atom in NNF matrix: {}", other),
            },

            other => unreachable!("quantifier or complex connective in matrix: {}", other),
        }
    }
}

fn strip_universal_quantifiers(formula: FOFFormula) -> FOFFormula {
    use FOFFormula::*;
    match formula {
        Quantified(Quantifier::Forall, _, f) => strip_universal_quantifiers(*f),
        And(f1, f2) => And(
            Box::new(strip_universal_quantifiers(*f1)),
            Box::new(strip_universal_quantifiers(*f2)),
        ),
        Or(f1, f2) => Or(
            Box::new(strip_universal_quantifiers(*f1)),
            Box::new(strip_universal_quantifiers(*f2)),
        ),
        other => other,
    }
}

/// Replace a variable by a term throughout a formula.
///
/// Variable indices are unique per unit (the parser allocates a fresh index
/// for every binding), so capture cannot occur; a quantifier re-binding the
/// same index shadows it and stops the substitution.
fn substitute_in_formula(formula: FOFFormula, var: Variable, term: &Term) -> FOFFormula {
    use FOFFormula::*;
    match formula {
        True | False => formula,
        Atom(p, args) => Atom(
            p,
            args.into_iter()
                .map(|t| substitute_in_term(t, var, term))
                .collect(),
        ),
        Not(f) => Not(Box::new(substitute_in_formula(*f, var, term))),
        And(f1, f2) => And(
            Box::new(substitute_in_formula(*f1, var, term)),
            Box::new(substitute_in_formula(*f2, var, term)),
        ),
        Or(f1, f2) => Or(
            Box::new(substitute_in_formula(*f1, var, term)),
            Box::new(substitute_in_formula(*f2, var, term)),
        ),
        Implies(f1, f2) => Implies(
            Box::new(substitute_in_formula(*f1, var, term)),
            Box::new(substitute_in_formula(*f2, var, term)),
        ),
        Iff(f1, f2) => Iff(
            Box::new(substitute_in_formula(*f1, var, term)),
            Box::new(substitute_in_formula(*f2, var, term)),
        ),
        Xor(f1, f2) => Xor(
            Box::new(substitute_in_formula(*f1, var, term)),
            Box::new(substitute_in_formula(*f2, var, term)),
        ),
        Quantified(q, vars, f) => {
            if vars.contains(&var) {
                Quantified(q, vars, f)
            } else {
                Quantified(q, vars, Box::new(substitute_in_formula(*f, var, term)))
            }
        }
    }
}

fn substitute_in_term(t: Term, var: Variable, replacement: &Term) -> Term {
    match t {
        Term::Variable(v) if v == var => replacement.clone(),
        Term::Variable(_) | Term::Constant(_) => t,
        Term::Function(f, args) => Term::Function(
            f,
            args.into_iter()
                .map(|a| substitute_in_term(a, var, replacement))
                .collect(),
        ),
    }
}
