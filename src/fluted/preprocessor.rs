//! Definitional preprocessing for the fluted fragment.
//!
//! Every quantified subformula is renamed to a fresh `fl` predicate over its
//! free variables, with a defining axiom whose direction depends on the
//! polarity of the occurrence. Rewriting a fluted formula this way yields a
//! clause set that stays inside the fragment after skolemization, because
//! each definitional axiom strips exactly one quantifier level.

use crate::config::Statistics;
use crate::logic::{CNFFormula, ClauseRole, Interner, PredicateSymbol, Term};
use crate::parser::cnf::fof_to_cnf;
use crate::parser::{FOFFormula, FormulaRole, FormulaUnit, Problem, Quantifier};
use std::collections::HashMap;
use tracing::debug;

/// Sign context of a subformula occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    fn flip(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
            Polarity::Neutral => Polarity::Neutral,
        }
    }
}

/// Polarity-aware definitional rewriter.
///
/// The memo maps rewritten subformulas to their replacements, keyed by
/// structural content: formulas are owned tree values here, so content is
/// the only notion of identity available, and any two equal occurrences
/// share one definition. A representation with shared subformula nodes
/// would key this map by node identity instead and only merge occurrences
/// of the same node.
pub struct FlutedPreprocessor {
    memo: HashMap<FOFFormula, FOFFormula>,
}

impl FlutedPreprocessor {
    pub fn new() -> Self {
        FlutedPreprocessor {
            memo: HashMap::new(),
        }
    }

    /// Rewrite every formula unit of the problem, then clausify.
    ///
    /// Units already introduced as definitions pass through untouched, as
    /// does clausal input. The clausification pipeline is true/false
    /// simplification, NNF, quantifier flattening, skolemization, and
    /// distribution (the last three inside `fof_to_cnf`).
    pub fn preprocess(
        &mut self,
        problem: &mut Problem,
        interner: &mut Interner,
        stats: &mut Statistics,
    ) -> CNFFormula {
        let mut definitions: Vec<FormulaUnit> = Vec::new();

        for unit in &mut problem.formulas {
            if unit.role == FormulaRole::Definition {
                continue;
            }
            let simplified = unit.formula.clone().simplify_constants();
            debug!(unit = %unit.name, formula = %simplified, "rewriting unit");
            let rewritten = self.define(
                simplified,
                Polarity::Positive,
                interner,
                &mut definitions,
                stats,
            );
            debug!(unit = %unit.name, formula = %rewritten, "rewritten unit");
            unit.formula = rewritten;
        }

        problem.formulas.extend(definitions);

        let mut cnf = CNFFormula::default();
        for unit in &problem.formulas {
            let role = match unit.role {
                FormulaRole::Definition => ClauseRole::Definition,
                FormulaRole::Hypothesis => ClauseRole::Hypothesis,
                FormulaRole::NegatedConjecture | FormulaRole::Conjecture => {
                    ClauseRole::NegatedConjecture
                }
                FormulaRole::Axiom => ClauseRole::Axiom,
            };
            let flattened = unit.formula.clone().flatten();
            cnf.clauses
                .extend(fof_to_cnf(flattened, role, interner).clauses);
        }
        cnf.clauses.extend(problem.clauses.iter().cloned());
        cnf
    }

    /// Rewrite one subformula under the given polarity.
    pub fn define(
        &mut self,
        formula: FOFFormula,
        polarity: Polarity,
        interner: &mut Interner,
        definitions: &mut Vec<FormulaUnit>,
        stats: &mut Statistics,
    ) -> FOFFormula {
        if let Some(cached) = self.memo.get(&formula) {
            return cached.clone();
        }

        let result = match formula.clone() {
            FOFFormula::Quantified(q, vars, body) => {
                // Normalize the vector into a chain of single-variable
                // quantifiers; the recursion axiomatizes each level.
                let (outer_var, inner) = split_quantifier_chain(q, vars, *body);
                let defined_inner =
                    self.define(inner, polarity, interner, definitions, stats);
                let rebuilt = FOFFormula::Quantified(
                    q,
                    vec![outer_var],
                    Box::new(defined_inner),
                );
                self.axiomatize(rebuilt, polarity, interner, definitions, stats)
            }

            FOFFormula::Iff(f1, f2) => {
                let left = self.define(*f1, Polarity::Neutral, interner, definitions, stats);
                let right = self.define(*f2, Polarity::Neutral, interner, definitions, stats);
                FOFFormula::Iff(Box::new(left), Box::new(right))
            }
            FOFFormula::Xor(f1, f2) => {
                let left = self.define(*f1, Polarity::Neutral, interner, definitions, stats);
                let right = self.define(*f2, Polarity::Neutral, interner, definitions, stats);
                FOFFormula::Xor(Box::new(left), Box::new(right))
            }

            FOFFormula::Implies(f1, f2) => {
                let left = self.define(*f1, polarity.flip(), interner, definitions, stats);
                let right = self.define(*f2, polarity, interner, definitions, stats);
                FOFFormula::Implies(Box::new(left), Box::new(right))
            }

            FOFFormula::Not(f) => {
                let inner = self.define(*f, polarity.flip(), interner, definitions, stats);
                FOFFormula::Not(Box::new(inner))
            }

            FOFFormula::And(f1, f2) => {
                let left = self.define(*f1, polarity, interner, definitions, stats);
                let right = self.define(*f2, polarity, interner, definitions, stats);
                FOFFormula::And(Box::new(left), Box::new(right))
            }
            FOFFormula::Or(f1, f2) => {
                let left = self.define(*f1, polarity, interner, definitions, stats);
                let right = self.define(*f2, polarity, interner, definitions, stats);
                FOFFormula::Or(Box::new(left), Box::new(right))
            }

            // Atoms and logical constants are already in shape
            f @ (FOFFormula::Atom(_, _) | FOFFormula::True | FOFFormula::False) => f,
        };

        self.memo.insert(formula, result.clone());
        result
    }

    /// Replace a formula by a fresh predicate over its free variables and
    /// emit the defining axiom required by the polarity:
    /// positive asserts `fl(x) => phi`, negative `phi => fl(x)`, neutral both.
    fn axiomatize(
        &mut self,
        formula: FOFFormula,
        polarity: Polarity,
        interner: &mut Interner,
        definitions: &mut Vec<FormulaUnit>,
        stats: &mut Statistics,
    ) -> FOFFormula {
        let free = formula.free_variables();
        let pred = PredicateSymbol::new(interner.fresh_predicate("fl"), free.len() as u8);
        let atom = FOFFormula::Atom(pred, free.iter().map(|v| Term::Variable(*v)).collect());

        let defining = match polarity {
            Polarity::Positive => close_over(
                &free,
                FOFFormula::Implies(Box::new(atom.clone()), Box::new(formula)),
            ),
            Polarity::Negative => close_over(
                &free,
                FOFFormula::Implies(Box::new(formula), Box::new(atom.clone())),
            ),
            Polarity::Neutral => FOFFormula::And(
                Box::new(close_over(
                    &free,
                    FOFFormula::Implies(Box::new(atom.clone()), Box::new(formula.clone())),
                )),
                Box::new(close_over(
                    &free,
                    FOFFormula::Implies(Box::new(formula), Box::new(atom.clone())),
                )),
            ),
        };

        stats.definitions_introduced += 1;
        let name = format!("def_{}", interner.resolve_predicate(pred.id));
        debug!(definition = %defining, %name, "introducing definition");
        definitions.push(FormulaUnit {
            name,
            role: FormulaRole::Definition,
            formula: defining,
        });

        atom
    }
}

impl Default for FlutedPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `Q [v1..vn]: body` into its outermost variable and the remaining
/// single-variable chain `Q v2: ... Q vn: body`.
fn split_quantifier_chain(
    q: Quantifier,
    vars: Vec<crate::logic::Variable>,
    body: FOFFormula,
) -> (crate::logic::Variable, FOFFormula) {
    let mut iter = vars.into_iter();
    let outer = iter.next().expect("quantifier binds at least one variable");
    let rest: Vec<_> = iter.collect();
    if rest.is_empty() {
        (outer, body)
    } else {
        let mut inner = body;
        for var in rest.into_iter().rev() {
            inner = FOFFormula::Quantified(q, vec![var], Box::new(inner));
        }
        (outer, inner)
    }
}

fn close_over(free: &[crate::logic::Variable], formula: FOFFormula) -> FOFFormula {
    if free.is_empty() {
        formula
    } else {
        FOFFormula::Quantified(Quantifier::Forall, free.to_vec(), Box::new(formula))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Variable;
    use crate::parser::parse_problem;

    fn preprocess(input: &str) -> (Problem, CNFFormula, Interner, Statistics) {
        let mut interner = Interner::new();
        let mut problem = parse_problem(input, &mut interner).unwrap();
        let mut stats = Statistics::default();
        let mut preprocessor = FlutedPreprocessor::new();
        let cnf = preprocessor.preprocess(&mut problem, &mut interner, &mut stats);
        (problem, cnf, interner, stats)
    }

    #[test]
    fn test_atoms_are_fixed_points() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let atom = FOFFormula::Atom(p, vec![Term::var(0)]);

        let mut stats = Statistics::default();
        let mut definitions = Vec::new();
        let mut preprocessor = FlutedPreprocessor::new();
        let result = preprocessor.define(
            atom.clone(),
            Polarity::Positive,
            &mut interner,
            &mut definitions,
            &mut stats,
        );

        assert_eq!(result, atom);
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_quantifier_gets_definition() {
        let (problem, _, interner, stats) =
            preprocess("fof(a, axiom, ![X]: (p(X) | q(X))).");

        assert_eq!(stats.definitions_introduced, 1);
        let def = problem
            .formulas
            .iter()
            .find(|u| u.role == FormulaRole::Definition)
            .expect("definition unit");
        // Closed formula: the replacement atom is propositional fl0
        assert!(interner.get_predicate("fl0").is_some());
        match &def.formula {
            FOFFormula::Implies(lhs, _) => match lhs.as_ref() {
                FOFFormula::Atom(p, args) => {
                    assert_eq!(interner.resolve_predicate(p.id), "fl0");
                    assert!(args.is_empty());
                }
                other => panic!("expected fl0 atom, got {}", other),
            },
            other => panic!("expected implication, got {}", other),
        }
    }

    #[test]
    fn test_replacement_preserves_free_variables() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 2);
        // ?[X1]: p(X0, X1) has free variable X0
        let formula = FOFFormula::Quantified(
            Quantifier::Exists,
            vec![Variable(1)],
            Box::new(FOFFormula::Atom(p, vec![Term::var(0), Term::var(1)])),
        );

        let mut stats = Statistics::default();
        let mut definitions = Vec::new();
        let mut preprocessor = FlutedPreprocessor::new();
        let replacement = preprocessor.define(
            formula.clone(),
            Polarity::Positive,
            &mut interner,
            &mut definitions,
            &mut stats,
        );

        assert_eq!(replacement.free_variables(), formula.free_variables());
    }

    #[test]
    fn test_memo_reuses_definitions() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let quantified = FOFFormula::Quantified(
            Quantifier::Forall,
            vec![Variable(0)],
            Box::new(FOFFormula::Atom(p, vec![Term::var(0)])),
        );

        let mut stats = Statistics::default();
        let mut definitions = Vec::new();
        let mut preprocessor = FlutedPreprocessor::new();
        let first = preprocessor.define(
            quantified.clone(),
            Polarity::Positive,
            &mut interner,
            &mut definitions,
            &mut stats,
        );
        let second = preprocessor.define(
            quantified,
            Polarity::Positive,
            &mut interner,
            &mut definitions,
            &mut stats,
        );

        assert_eq!(first, second);
        assert_eq!(definitions.len(), 1);
    }

    #[test]
    fn test_nested_quantifiers_strip_one_level_each() {
        let (_, _, interner, stats) =
            preprocess("fof(a, axiom, ![X]: ![Y]: p(X, Y)).");

        // One definition per quantifier level
        assert_eq!(stats.definitions_introduced, 2);
        assert!(interner.get_predicate("fl0").is_some());
        assert!(interner.get_predicate("fl1").is_some());
    }

    #[test]
    fn test_negative_polarity_reverses_implication() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let quantified = FOFFormula::Quantified(
            Quantifier::Forall,
            vec![Variable(0)],
            Box::new(FOFFormula::Atom(p, vec![Term::var(0)])),
        );
        // ~(![X]: p(X)) puts the quantifier under negative polarity
        let formula = FOFFormula::Not(Box::new(quantified.clone()));

        let mut stats = Statistics::default();
        let mut definitions = Vec::new();
        let mut preprocessor = FlutedPreprocessor::new();
        preprocessor.define(
            formula,
            Polarity::Positive,
            &mut interner,
            &mut definitions,
            &mut stats,
        );

        assert_eq!(definitions.len(), 1);
        match &definitions[0].formula {
            FOFFormula::Implies(lhs, rhs) => {
                // phi => fl0: the fresh atom is on the right
                assert_eq!(lhs.as_ref(), &quantified);
                assert!(matches!(rhs.as_ref(), FOFFormula::Atom(_, _)));
            }
            other => panic!("expected implication, got {}", other),
        }
    }

    #[test]
    fn test_iff_children_get_both_directions() {
        let (problem, _, _, stats) = preprocess(
            "fof(a, axiom, (![X]: p(X)) <=> (![X]: q(X))).",
        );

        // Two quantified children under neutral polarity, each axiomatized
        // with both implications
        assert_eq!(stats.definitions_introduced, 2);
        for def in problem
            .formulas
            .iter()
            .filter(|u| u.role == FormulaRole::Definition)
        {
            assert!(matches!(def.formula, FOFFormula::And(_, _)));
        }
    }

    #[test]
    fn test_preprocessed_fluted_problem_stays_fluted() {
        let (_, cnf, interner, _) = preprocess(
            "fof(a, axiom, ![X]: (p(X) => ?[Y]: q(X, Y))).
             fof(b, axiom, ![X]: p(X)).",
        );

        let classifier = crate::fluted::classifier::ClauseClassifier::new(&interner);
        for clause in &cnf.clauses {
            assert!(
                classifier.is_fluted(clause),
                "clause escaped the fragment: {}",
                clause.display(&interner)
            );
        }
    }
}
