//! Most general unifier computation and premise renaming

use super::interner::{ConstantId, FunctionId};
use super::literal::Literal;
use super::substitution::Substitution;
use super::term::{Term, Variable};

/// Result of a unification attempt
pub type UnificationResult = Result<Substitution, UnificationError>;

/// Errors that can occur during unification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnificationError {
    /// Occurs check failed: variable occurs in the term it would bind to
    OccursCheck(Variable, Term),
    /// Function symbols don't match
    FunctionClash(FunctionId, FunctionId),
    /// Constant symbols don't match
    ConstantClash(ConstantId, ConstantId),
    /// A constant met a variable-free functional term, or arities differ
    StructureClash,
}

/// Unify two terms, returning a most general unifier if one exists
pub fn unify(term1: &Term, term2: &Term) -> UnificationResult {
    let mut subst = Substitution::new();
    unify_with_subst(term1, term2, &mut subst)?;
    Ok(subst)
}

/// Unify the argument lists of two complementary literals.
///
/// The caller has already checked predicate equality; this only runs the
/// pairwise term unification under one growing substitution.
pub fn unify_args(args1: &[Term], args2: &[Term]) -> UnificationResult {
    if args1.len() != args2.len() {
        return Err(UnificationError::StructureClash);
    }
    let mut subst = Substitution::new();
    for (a1, a2) in args1.iter().zip(args2.iter()) {
        unify_with_subst(a1, a2, &mut subst)?;
    }
    Ok(subst)
}

fn unify_with_subst(
    term1: &Term,
    term2: &Term,
    subst: &mut Substitution,
) -> Result<(), UnificationError> {
    let t1 = term1.apply_substitution(subst);
    let t2 = term2.apply_substitution(subst);

    match (&t1, &t2) {
        _ if t1 == t2 => Ok(()),

        (Term::Variable(v), t) | (t, Term::Variable(v)) => {
            if occurs_check(*v, t) {
                Err(UnificationError::OccursCheck(*v, t.clone()))
            } else {
                subst.insert_normalized(*v, t.clone());
                Ok(())
            }
        }

        (Term::Constant(c1), Term::Constant(c2)) => {
            Err(UnificationError::ConstantClash(c1.id, c2.id))
        }

        (Term::Function(f1, args1), Term::Function(f2, args2)) => {
            if f1.id != f2.id {
                return Err(UnificationError::FunctionClash(f1.id, f2.id));
            }
            if args1.len() != args2.len() {
                return Err(UnificationError::StructureClash);
            }
            for (arg1, arg2) in args1.iter().zip(args2.iter()) {
                unify_with_subst(arg1, arg2, subst)?;
            }
            Ok(())
        }

        (Term::Function(_, _), Term::Constant(_)) | (Term::Constant(_), Term::Function(_, _)) => {
            Err(UnificationError::StructureClash)
        }
    }
}

/// Check if a variable occurs in a term
fn occurs_check(var: Variable, term: &Term) -> bool {
    match term {
        Term::Variable(v) => *v == var,
        Term::Constant(_) => false,
        Term::Function(_, args) => args.iter().any(|arg| occurs_check(var, arg)),
    }
}

/// Shift every variable index in a term by `offset`.
///
/// Premises are renamed apart before unification by offsetting one side's
/// variables past the other's maximum. Variables here are numeric, so this
/// replaces the name-suffix renaming a string-based representation would use.
pub fn offset_term_variables(term: &Term, offset: u32) -> Term {
    match term {
        Term::Variable(v) => Term::Variable(Variable(v.0 + offset)),
        Term::Constant(_) => term.clone(),
        Term::Function(f, args) => Term::Function(
            *f,
            args.iter()
                .map(|arg| offset_term_variables(arg, offset))
                .collect(),
        ),
    }
}

/// Shift every variable index in a literal by `offset`.
pub fn offset_literal_variables(lit: &Literal, offset: u32) -> Literal {
    Literal {
        predicate: lit.predicate,
        args: lit
            .args
            .iter()
            .map(|arg| offset_term_variables(arg, offset))
            .collect(),
        polarity: lit.polarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;
    use crate::logic::term::{Constant, FunctionSymbol};

    struct TestContext {
        interner: Interner,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                interner: Interner::new(),
            }
        }

        fn const_(&mut self, name: &str) -> Term {
            let id = self.interner.intern_constant(name);
            Term::Constant(Constant::new(id))
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::Function(FunctionSymbol::new(id, args.len() as u8), args)
        }
    }

    #[test]
    fn test_unify_variable_with_constant() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");

        let result = unify(&Term::var(0), &a).unwrap();
        assert_eq!(result.get(Variable(0)), Some(&a));
    }

    #[test]
    fn test_unify_functions() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let t1 = ctx.func("f", vec![Term::var(0), Term::var(1)]);
        let a2 = ctx.const_("a");
        let b = ctx.const_("b");
        let t2 = ctx.func("f", vec![a2, b]);

        let result = unify(&t1, &t2).unwrap();
        assert_eq!(result.map.len(), 2);
        assert_eq!(Term::var(0).apply_substitution(&result), a);
    }

    #[test]
    fn test_occurs_check_rejects() {
        let mut ctx = TestContext::new();
        let fx = ctx.func("f", vec![Term::var(0)]);

        let result = unify(&Term::var(0), &fx);
        assert!(matches!(result, Err(UnificationError::OccursCheck(_, _))));
    }

    #[test]
    fn test_clash_errors() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        assert!(matches!(
            unify(&a, &b),
            Err(UnificationError::ConstantClash(_, _))
        ));

        let fa = ctx.func("f", vec![a.clone()]);
        let ga = ctx.func("g", vec![a.clone()]);
        assert!(matches!(
            unify(&fa, &ga),
            Err(UnificationError::FunctionClash(_, _))
        ));
    }

    #[test]
    fn test_offset_renaming() {
        let mut ctx = TestContext::new();
        let t = ctx.func("f", vec![Term::var(0), Term::var(2)]);
        let shifted = offset_term_variables(&t, 5);

        assert_eq!(shifted, ctx.func("f", vec![Term::var(5), Term::var(7)]));
    }
}
