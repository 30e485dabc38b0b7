//! Fluted fragment classification.
//!
//! Two classifiers share the entry point: the formula classifier decides
//! membership before clausification by threading a stack of outer-quantified
//! variables through subformulas, and the clause classifier decides
//! membership of clausal input by dispatching every clause into one of the
//! structural sub-forms FL1, FL2, FL3.
//!
//! Clause-level checks read variable indices arithmetically: within a
//! clause, a fluted literal's arguments form a contiguous ascending run
//! ending at the clause's rightmost variable, with functional arguments to
//! the right of the variables. A run is "complete" when it reaches index 0.

use super::evar::EVar;
use super::sequence::FlutedSeq;
use crate::logic::{Clause, Interner, Literal, PredicateId, Term, Variable};
use crate::parser::{FOFFormula, FormulaUnit};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Decide fluted membership for a whole problem.
///
/// Formula units are checked by the formula classifier; clausal input by the
/// clause classifier. A problem is in the fragment iff every unit is.
pub fn is_in_fluted_fragment(
    formulas: &[FormulaUnit],
    clauses: &[Clause],
    interner: &Interner,
) -> bool {
    if !formulas.is_empty() {
        let mut classifier = FormulaClassifier::new(interner);
        if !classifier.classify_units(formulas) {
            return false;
        }
    }
    let classifier = ClauseClassifier::new(interner);
    clauses.iter().all(|c| classifier.is_fluted(c))
}

// =========================================================================
// Formula classifier
// =========================================================================

/// Classifies quantified formulas, before clausification.
pub struct FormulaClassifier<'a> {
    interner: &'a Interner,
    /// Canonical argument permutation recorded per predicate: every use of a
    /// predicate must align with the quantifier prefix the same way.
    permutations: HashMap<PredicateId, Vec<usize>>,
    /// Deepest outer-variable stack seen; diagnostic only.
    max_prefix_depth: usize,
}

impl<'a> FormulaClassifier<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        FormulaClassifier {
            interner,
            permutations: HashMap::new(),
            max_prefix_depth: 0,
        }
    }

    /// True iff every unit lies in the fluted fragment.
    pub fn classify_units(&mut self, units: &[FormulaUnit]) -> bool {
        for unit in units {
            debug!(unit = %unit.name, "classifying formula unit");
            if !self.is_fluted(&unit.formula, &[]) {
                debug!(unit = %unit.name, "unit is not fluted");
                return false;
            }
        }
        debug!(max_prefix_depth = self.max_prefix_depth, "formula classification done");
        true
    }

    fn is_fluted(&mut self, formula: &FOFFormula, outer: &[Variable]) -> bool {
        match formula {
            FOFFormula::Iff(f1, f2)
            | FOFFormula::Xor(f1, f2)
            | FOFFormula::Implies(f1, f2)
            | FOFFormula::And(f1, f2)
            | FOFFormula::Or(f1, f2) => {
                self.is_fluted(f1, outer) && self.is_fluted(f2, outer)
            }
            FOFFormula::Not(f) => self.is_fluted(f, outer),
            FOFFormula::Quantified(_, vars, body) => {
                let mut stack = outer.to_vec();
                stack.extend(extract_outer_variables(vars, body));
                self.is_fluted(body, &stack)
            }
            FOFFormula::Atom(pred, args) => self.is_flutable(pred.id, args, outer),
            FOFFormula::True | FOFFormula::False => true,
        }
    }

    /// Flutability of a literal under the outer-variable stack.
    ///
    /// Arguments are aligned right to left against the top of the stack. An
    /// argument that misses the expected variable may instead be satisfied
    /// by another argument position, recorded as a permutation slot; each
    /// predicate must use the same permutation throughout the problem.
    fn is_flutable(&mut self, pred: PredicateId, args: &[Term], outer: &[Variable]) -> bool {
        if outer.len() > self.max_prefix_depth {
            self.max_prefix_depth = outer.len();
        }

        if !args.iter().all(Term::is_variable) {
            debug!("not flutable: non-variable argument");
            return false;
        }
        if args.len() == 2 && self.interner.resolve_predicate(pred) == "=" {
            debug!("not flutable: equality");
            return false;
        }

        let arity = args.len();
        // Argument variables left to right; slots become -1 once consumed by
        // a permutation match.
        let mut slots: Vec<i64> = args
            .iter()
            .map(|t| match t {
                Term::Variable(v) => v.0 as i64,
                _ => unreachable!(),
            })
            .collect();

        let mut stack = outer.to_vec();
        let mut permutation = vec![0usize; arity];
        let mut remaining = arity;
        let mut out_pos = arity;

        while !stack.is_empty() && remaining > 0 {
            remaining -= 1;
            let term = slots[remaining];
            if term < 0 {
                continue;
            }
            out_pos -= 1;
            let var = stack.pop().expect("stack checked nonempty").0 as i64;
            if term == var {
                permutation[out_pos] = remaining;
            } else if let Some(pos) = slots[..remaining].iter().position(|&t| t == var) {
                slots[pos] = -1;
                permutation[out_pos] = pos;
                remaining += 1;
            } else {
                debug!("not flutable: hole in fluted sequence");
                return false;
            }
        }

        if remaining > 0 {
            debug!("not flutable: more variables than the quantifier prefix supplies");
            return false;
        }

        match self.permutations.get(&pred) {
            Some(previous) => {
                let same = previous == &permutation;
                if !same {
                    debug!(?previous, current = ?permutation, "not flutable: permutation mismatch");
                }
                same
            }
            None => {
                debug!(?permutation, "recording predicate permutation");
                self.permutations.insert(pred, permutation);
                true
            }
        }
    }
}

/// Variables bound by this quantifier that are not re-bound anywhere inside
/// the subformula: the "outer" layer contributed to the stack.
fn extract_outer_variables(vars: &[Variable], body: &FOFFormula) -> Vec<Variable> {
    let mut inner_bound = HashSet::new();
    body.collect_bound_variables(&mut inner_bound);
    vars.iter()
        .copied()
        .filter(|v| !inner_bound.contains(v))
        .collect()
}

// =========================================================================
// Clause classifier
// =========================================================================

/// Classifies clausal input into the FL1/FL2/FL3 sub-forms.
pub struct ClauseClassifier<'a> {
    interner: &'a Interner,
}

impl<'a> ClauseClassifier<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        ClauseClassifier { interner }
    }

    /// Dispatch on the first literal's shape, then verify the chosen
    /// sub-form over the whole clause.
    pub fn is_fluted(&self, clause: &Clause) -> bool {
        let mut lits = clause.literals.iter();
        let first = match lits.next() {
            Some(l) => l,
            None => return true,
        };

        if first.is_equality(self.interner) {
            debug!("clause rejected: equality literal");
            return false;
        }
        if !first.all_args_are_variables() {
            return self.is_fl2(clause);
        }

        let last_var = rightmost_evar(first);
        for lit in lits {
            if lit.is_equality(self.interner) {
                return false;
            }
            if !lit.all_args_are_variables() {
                return self.is_fl2(clause);
            }
            let var = rightmost_evar(lit);
            if last_var != var {
                if last_var.distance(var) == 1 {
                    return self.is_fl3(clause);
                }
                debug!("clause rejected: rightmost variables too far apart");
                return false;
            }
        }

        self.is_fl1(clause)
    }

    /// FL1: all literals purely variable, sharing one rightmost variable,
    /// each a contiguous ascending run.
    fn is_fl1(&self, clause: &Clause) -> bool {
        let mut seq = FlutedSeq::new();
        clause
            .literals
            .iter()
            .all(|lit| self.literal_fluted(lit, &mut seq))
    }

    /// Walk one all-variable literal against the clause-level sequence.
    fn literal_fluted(&self, literal: &Literal, seq: &mut FlutedSeq) -> bool {
        let vars: Vec<u32> = literal
            .args
            .iter()
            .map(|t| match t {
                Term::Variable(v) => v.0,
                _ => unreachable!("literal_fluted expects all-variable literals"),
            })
            .collect();

        let Some((&head, rest)) = vars.split_first() else {
            // Propositional literal: compatible only with a ground sequence
            if seq.is_var_set() {
                return seq.is_var_ground();
            }
            seq.set_ground();
            return true;
        };

        let mut last = EVar::Var(head);
        if head == 0 {
            seq.set_complete();
        }

        for &var in rest {
            last = last.succ();
            if last != EVar::Var(var) {
                debug!("literal rejected: variables not consecutive");
                return false;
            }
        }

        if !seq.is_var_set() {
            seq.set_var(last);
        }
        last == seq.var()
    }

    /// FL2: literals may carry functional arguments; functional literals are
    /// validated by the recursive walk and merged into one clause-level
    /// sequence.
    fn is_fl2(&self, clause: &Clause) -> bool {
        let mut local = FlutedSeq::new();

        for lit in &clause.literals {
            if lit.is_equality(self.interner) {
                return false;
            }
            if lit.all_args_are_variables() {
                if local.is_var_ground() && lit.arity() != 0 {
                    return false;
                }
                if !self.literal_fluted(lit, &mut local) {
                    return false;
                }
                continue;
            }

            let context = if local.is_var_set() {
                if local.is_var_ground() {
                    EVar::Ground
                } else {
                    local.var()
                }
            } else {
                EVar::Unset
            };

            let inner = match term_fluted(&lit.args, context) {
                Some(seq) => seq,
                None => return false,
            };

            if local.is_var_set()
                && (inner.is_var_ground() != local.is_var_ground()
                    || (!inner.is_var_ground() && inner.var() != local.var()))
            {
                return false;
            }

            if !local.is_var_set() {
                if inner.is_var_ground() {
                    local.set_ground();
                } else {
                    local.set_var(inner.var());
                }
            }

            if !local.has_terms() {
                local.set_terms(inner.terms().to_vec());
            } else if !local.one_prefix_of_other(inner.terms()) {
                debug!("clause rejected: term lists are not prefix-compatible");
                return false;
            }
        }

        true
    }

    /// FL3: all-variable literals whose rightmost variables take at most two
    /// adjacent values.
    fn is_fl3(&self, clause: &Clause) -> bool {
        let mut slot1 = EVar::Unset;
        let mut slot2 = EVar::Unset;

        for lit in &clause.literals {
            if lit.is_equality(self.interner) || !lit.all_args_are_variables() {
                debug!("clause rejected: functional or equality literal in FL3");
                return false;
            }

            let vars: Vec<u32> = lit
                .args
                .iter()
                .map(|t| match t {
                    Term::Variable(v) => v.0,
                    _ => unreachable!(),
                })
                .collect();

            let Some((&head, rest)) = vars.split_first() else {
                // Propositional literal: only admissible while the recorded
                // rightmost values do not exceed variable 0
                if (slot1.is_var() && slot1.index() != 0)
                    || (slot2.is_var() && slot2.index() != 0)
                {
                    return false;
                }
                if !slot1.is_set() {
                    slot1 = EVar::Ground;
                } else if slot1.is_var() && !slot2.is_set() {
                    slot1 = EVar::Ground;
                    slot2 = EVar::Var(0);
                }
                continue;
            };

            let mut last = EVar::Var(head);
            for &var in rest {
                last = last.succ();
                if last != EVar::Var(var) {
                    debug!("clause rejected: variables not consecutive");
                    return false;
                }
            }

            if !update_rightmost_slots(&mut slot1, &mut slot2, last) {
                return false;
            }
        }

        true
    }
}

/// Track the (at most two) rightmost-variable values of an FL3 clause.
///
/// The slots hold the lower and upper value once both are known. A new value
/// must equal one of them; while only the first is set, a value at distance
/// one settles both slots in order.
fn update_rightmost_slots(slot1: &mut EVar, slot2: &mut EVar, last: EVar) -> bool {
    if slot1.is_set() && slot2.is_set() {
        return last == *slot1 || last == *slot2;
    }
    if slot1.is_set() {
        if last == *slot1 {
            return true;
        }
        if slot1.distance(last) != 1 {
            debug!("rightmost variables too distant");
            return false;
        }
        if last > *slot1 {
            *slot2 = last;
        } else {
            *slot2 = *slot1;
            *slot1 = last;
        }
        return true;
    }
    *slot1 = last;
    true
}

fn rightmost_evar(lit: &Literal) -> EVar {
    match lit.rightmost_var() {
        Some(v) => EVar::Var(v.0),
        None => EVar::Ground,
    }
}

/// Fluted walk over a functional argument list, used both for literal
/// argument lists and for nested function arguments.
///
/// `context` is the highest variable allowed so far: variables at this level
/// must climb consecutively and must not pass it, and the first element may
/// not be a variable when the context is ground (nor a constant when the
/// context carries a variable). Functional children recurse; the first child
/// establishes the level's term list and every later child must continue it.
pub fn term_fluted(args: &[Term], context: EVar) -> Option<FlutedSeq> {
    if args.is_empty() {
        return None;
    }

    let mut v = context;
    let mut is_functional = false;
    let mut curr_var = EVar::Unset;
    let mut local = FlutedSeq::new();
    let mut idx = 0;

    match &args[0] {
        Term::Variable(x) => {
            curr_var = EVar::Var(x.0);
            idx = 1;
            if x.0 == 0 {
                local.set_complete();
            }
            if v.is_ground() {
                debug!("variable after a ground context");
                return None;
            }
            if v.is_set() && curr_var > v {
                debug!("first variable already above the context maximum");
                return None;
            }
        }
        first => {
            is_functional = true;
            if term_args(first).is_empty() {
                // Leading constant anchors a ground sequence
                if v.is_set() && !v.is_ground() {
                    debug!("constant met a variable context");
                    return None;
                }
                if !v.is_set() {
                    v = EVar::Ground;
                }
                local.add_term(first.clone());
                local.set_complete();
                idx = 1;
            }
            // A non-constant functional first argument is handled by the
            // main loop below.
        }
    }

    while idx < args.len() {
        match &args[idx] {
            Term::Variable(x) => {
                // Variables must precede functional children and climb by one
                if is_functional {
                    debug!("variable after a functional child");
                    return None;
                }
                curr_var = curr_var.succ();
                if curr_var != EVar::Var(x.0) {
                    debug!("variables out of order");
                    return None;
                }
                if v.is_set() && v > curr_var {
                    debug!("context maximum not reached");
                    return None;
                }
            }
            child => {
                is_functional = true;
                if !v.is_set() && curr_var.is_set() {
                    v = curr_var;
                }
                if (curr_var.is_set() && curr_var != v) || local.is_member(child) {
                    debug!("repeated child or variable mismatch at this level");
                    return None;
                }

                let inner = if term_args(child).is_empty() {
                    if v.is_ground() {
                        debug!("two distinct constants at one level");
                        return None;
                    }
                    let mut seq = FlutedSeq::new();
                    seq.set_ground();
                    seq.add_term(child.clone());
                    seq.set_complete();
                    seq
                } else {
                    term_fluted(term_args(child), v)?
                };

                if inner.is_complete() {
                    local.set_complete();
                }
                if !v.is_set() {
                    v = if inner.is_var_ground() {
                        EVar::Ground
                    } else {
                        inner.var()
                    };
                }

                if !local.has_terms() {
                    if curr_var.is_set() && inner.has_terms() {
                        debug!("variable run cannot precede an inherited term list");
                        return None;
                    }
                    local.set_terms(inner.terms().to_vec());
                } else {
                    if !local.extends_term_list(inner.terms()) {
                        return None;
                    }
                    local.add_term(child.clone());
                }
            }
        }
        idx += 1;
    }

    if !v.is_set() && curr_var.is_set() {
        local.set_var(curr_var);
    } else {
        local.set_var(v);
    }
    Some(local)
}

fn term_args(term: &Term) -> &[Term] {
    match term {
        Term::Function(_, args) => args,
        _ => &[],
    }
}
