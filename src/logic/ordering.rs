//! Knuth-Bendix term ordering.
//!
//! The host ordering: it drives the generic maximal-literal selector and the
//! ordering aftercheck of the fluted resolution engine. The fluted calculus
//! itself uses its own literal comparator (see `generating::ordering`).

use super::term::{Term, Variable};
use std::collections::HashMap;

/// Result of comparing two terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

/// Configuration for the Knuth-Bendix ordering.
///
/// Symbol weights default to 1 and precedences to 0; ties fall back to
/// symbol ids, which keeps the ordering total on ground terms.
#[derive(Debug, Clone)]
pub struct KBOConfig {
    pub function_weights: HashMap<super::interner::FunctionId, usize>,
    pub constant_weights: HashMap<super::interner::ConstantId, usize>,
    pub function_precedence: HashMap<super::interner::FunctionId, usize>,
    pub constant_precedence: HashMap<super::interner::ConstantId, usize>,
    /// Weight of variables (must be positive)
    pub variable_weight: usize,
}

impl Default for KBOConfig {
    fn default() -> Self {
        KBOConfig {
            function_weights: HashMap::new(),
            constant_weights: HashMap::new(),
            function_precedence: HashMap::new(),
            constant_precedence: HashMap::new(),
            variable_weight: 1,
        }
    }
}

/// Knuth-Bendix ordering implementation
pub struct KBO {
    config: KBOConfig,
}

impl KBO {
    pub fn new(config: KBOConfig) -> Self {
        KBO { config }
    }

    pub fn term_weight(&self, term: &Term) -> usize {
        match term {
            Term::Variable(_) => self.config.variable_weight,
            Term::Constant(c) => self.config.constant_weights.get(&c.id).copied().unwrap_or(1),
            Term::Function(f, args) => {
                let head = self.config.function_weights.get(&f.id).copied().unwrap_or(1);
                head + args.iter().map(|t| self.term_weight(t)).sum::<usize>()
            }
        }
    }

    fn count_variables(&self, term: &Term, counts: &mut HashMap<Variable, usize>) {
        match term {
            Term::Variable(v) => {
                *counts.entry(*v).or_insert(0) += 1;
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    self.count_variables(arg, counts);
                }
            }
        }
    }

    /// Compare two terms using KBO
    pub fn compare(&self, s: &Term, t: &Term) -> Ordering {
        if s == t {
            return Ordering::Equal;
        }

        let mut vars_s = HashMap::new();
        let mut vars_t = HashMap::new();
        self.count_variables(s, &mut vars_s);
        self.count_variables(t, &mut vars_t);

        // s > t requires #(x, s) >= #(x, t) for every variable x
        let s_covers_t = vars_t
            .iter()
            .all(|(v, n)| vars_s.get(v).copied().unwrap_or(0) >= *n);
        let t_covers_s = vars_s
            .iter()
            .all(|(v, n)| vars_t.get(v).copied().unwrap_or(0) >= *n);

        let weight_s = self.term_weight(s);
        let weight_t = self.term_weight(t);

        if weight_s > weight_t && s_covers_t {
            Ordering::Greater
        } else if weight_t > weight_s && t_covers_s {
            Ordering::Less
        } else if weight_s == weight_t {
            match (s_covers_t, t_covers_s) {
                (true, true) => self.compare_lex(s, t),
                (true, false) => match self.compare_lex(s, t) {
                    r @ (Ordering::Greater | Ordering::Equal) => r,
                    _ => Ordering::Incomparable,
                },
                (false, true) => match self.compare_lex(s, t) {
                    r @ (Ordering::Less | Ordering::Equal) => r,
                    _ => Ordering::Incomparable,
                },
                (false, false) => Ordering::Incomparable,
            }
        } else {
            Ordering::Incomparable
        }
    }

    /// Lexicographic comparison for equal-weight terms
    fn compare_lex(&self, s: &Term, t: &Term) -> Ordering {
        match (s, t) {
            (Term::Variable(v1), Term::Variable(v2)) => {
                if v1 == v2 {
                    Ordering::Equal
                } else if v1.0 > v2.0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Term::Variable(_), _) => Ordering::Less,
            (_, Term::Variable(_)) => Ordering::Greater,
            (Term::Constant(c1), Term::Constant(c2)) => {
                if c1.id == c2.id {
                    return Ordering::Equal;
                }
                let p1 = self.config.constant_precedence.get(&c1.id).copied().unwrap_or(0);
                let p2 = self.config.constant_precedence.get(&c2.id).copied().unwrap_or(0);
                if (p1, c1.id) > (p2, c2.id) {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Term::Function(f1, args1), Term::Function(f2, args2)) => {
                if f1.id != f2.id {
                    let p1 = self.config.function_precedence.get(&f1.id).copied().unwrap_or(0);
                    let p2 = self.config.function_precedence.get(&f2.id).copied().unwrap_or(0);
                    return if (p1, f1.id) > (p2, f2.id) {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    };
                }
                for (a1, a2) in args1.iter().zip(args2.iter()) {
                    match self.compare(a1, a2) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                Ordering::Equal
            }
            (Term::Function(_, _), Term::Constant(_)) => Ordering::Greater,
            (Term::Constant(_), Term::Function(_, _)) => Ordering::Less,
        }
    }
}

impl Default for KBO {
    fn default() -> Self {
        KBO::new(KBOConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;
    use crate::logic::term::{Constant, FunctionSymbol};

    #[test]
    fn test_term_weight() {
        let mut interner = Interner::new();
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));
        let f = FunctionSymbol::new(interner.intern_function("f"), 2);

        let kbo = KBO::default();
        assert_eq!(kbo.term_weight(&Term::var(0)), 1);
        assert_eq!(kbo.term_weight(&a), 1);

        let fa_x = Term::Function(f, vec![a, Term::var(0)]);
        assert_eq!(kbo.term_weight(&fa_x), 3);
    }

    #[test]
    fn test_subterm_property() {
        let mut interner = Interner::new();
        let f = FunctionSymbol::new(interner.intern_function("f"), 1);
        let fx = Term::Function(f, vec![Term::var(0)]);

        let kbo = KBO::default();
        assert_eq!(kbo.compare(&fx, &Term::var(0)), Ordering::Greater);
        assert_eq!(kbo.compare(&Term::var(0), &fx), Ordering::Less);
    }

    #[test]
    fn test_variable_condition() {
        let mut interner = Interner::new();
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));

        let kbo = KBO::default();
        // a vs X0: incomparable (no variable cover either way)
        assert_eq!(kbo.compare(&a, &Term::var(0)), Ordering::Incomparable);
        assert_eq!(
            kbo.compare(&Term::var(0), &Term::var(1)),
            Ordering::Incomparable
        );
    }

    #[test]
    fn test_precedence_tie_break() {
        let mut interner = Interner::new();
        let a = Term::Constant(Constant::new(interner.intern_constant("a")));
        let f = FunctionSymbol::new(interner.intern_function("f"), 1);
        let g = FunctionSymbol::new(interner.intern_function("g"), 1);

        let mut config = KBOConfig::default();
        config.function_precedence.insert(f.id, 2);
        config.function_precedence.insert(g.id, 1);
        let kbo = KBO::new(config);

        let fa = Term::Function(f, vec![a.clone()]);
        let ga = Term::Function(g, vec![a]);
        assert_eq!(kbo.compare(&fa, &ga), Ordering::Greater);
    }
}
