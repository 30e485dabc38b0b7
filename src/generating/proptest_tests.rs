//! Property-based tests for the fluted literal ordering.

use super::ordering::{compare_literals, Comparison};
use crate::fluted::EVar;
use crate::logic::{Constant, FunctionSymbol, Interner, Literal, PredicateSymbol, Term};
use proptest::prelude::*;

/// Term description before interning
#[derive(Debug, Clone)]
enum TermDesc {
    Var(u8),
    Const(u8),
    Func(u8, Vec<TermDesc>),
}

fn arb_term_desc(max_depth: u32) -> BoxedStrategy<TermDesc> {
    if max_depth == 0 {
        prop_oneof![
            (0..3u8).prop_map(TermDesc::Var),
            (0..3u8).prop_map(TermDesc::Const),
        ]
        .boxed()
    } else {
        prop_oneof![
            2 => (0..3u8).prop_map(TermDesc::Var),
            2 => (0..3u8).prop_map(TermDesc::Const),
            3 => (0..2u8, proptest::collection::vec(arb_term_desc(max_depth - 1), 1..=2))
                .prop_map(|(f, args)| TermDesc::Func(f, args)),
        ]
        .boxed()
    }
}

#[derive(Debug, Clone)]
struct LiteralDesc {
    predicate: u8,
    polarity: bool,
    args: Vec<TermDesc>,
}

fn arb_literal_desc() -> impl Strategy<Value = LiteralDesc> {
    (
        0..3u8,
        any::<bool>(),
        proptest::collection::vec(arb_term_desc(2), 0..=3),
    )
        .prop_map(|(predicate, polarity, args)| LiteralDesc {
            predicate,
            polarity,
            args,
        })
}

fn build_term(desc: &TermDesc, interner: &mut Interner) -> Term {
    match desc {
        TermDesc::Var(i) => Term::var(*i as u32),
        TermDesc::Const(i) => {
            let id = interner.intern_constant(&format!("c{}", i));
            Term::Constant(Constant::new(id))
        }
        TermDesc::Func(f, args) => {
            let id = interner.intern_function(&format!("f{}", f));
            let built: Vec<Term> = args.iter().map(|a| build_term(a, interner)).collect();
            Term::Function(FunctionSymbol::new(id, built.len() as u8), built)
        }
    }
}

fn build_literal(desc: &LiteralDesc, interner: &mut Interner) -> Literal {
    let args: Vec<Term> = desc.args.iter().map(|a| build_term(a, interner)).collect();
    let pred = PredicateSymbol::new(
        interner.intern_predicate(&format!("p{}", desc.predicate)),
        args.len() as u8,
    );
    Literal {
        predicate: pred,
        args,
        polarity: desc.polarity,
    }
}

fn invert(c: Comparison) -> Comparison {
    match c {
        Comparison::Lesser => Comparison::Greater,
        Comparison::Greater => Comparison::Lesser,
        other => other,
    }
}

proptest! {
    /// Identity: every literal compares equal to itself
    #[test]
    fn comparator_identity(desc in arb_literal_desc()) {
        let mut interner = Interner::new();
        let lit = build_literal(&desc, &mut interner);
        prop_assert_eq!(compare_literals(&lit, &lit), Comparison::Equal);
    }

    /// Antisymmetry: swapping arguments inverts the verdict (incomparable
    /// and equal are symmetric)
    #[test]
    fn comparator_antisymmetry(d1 in arb_literal_desc(), d2 in arb_literal_desc()) {
        let mut interner = Interner::new();
        let l1 = build_literal(&d1, &mut interner);
        let l2 = build_literal(&d2, &mut interner);

        let forward = compare_literals(&l1, &l2);
        let backward = compare_literals(&l2, &l1);
        prop_assert_eq!(forward, invert(backward));
    }

    /// Ground literals are totally ordered: never incomparable
    #[test]
    fn comparator_total_on_ground(
        d1 in arb_literal_desc().prop_filter("ground", |d| is_ground_desc(&d.args)),
        d2 in arb_literal_desc().prop_filter("ground", |d| is_ground_desc(&d.args)),
    ) {
        let mut interner = Interner::new();
        let l1 = build_literal(&d1, &mut interner);
        let l2 = build_literal(&d2, &mut interner);
        prop_assert_ne!(compare_literals(&l1, &l2), Comparison::Incomparable);
    }

    /// EVar distance is symmetric and zero exactly on equal values
    #[test]
    fn evar_distance_symmetric(a in 0..20u32, b in 0..20u32) {
        let va = EVar::Var(a);
        let vb = EVar::Var(b);
        prop_assert_eq!(va.distance(vb), vb.distance(va));
        prop_assert_eq!(va.distance(vb) == 0, va == vb);
        prop_assert_eq!(EVar::Ground.distance(va), a + 1);
    }
}

fn is_ground_desc(args: &[TermDesc]) -> bool {
    args.iter().all(|t| match t {
        TermDesc::Var(_) => false,
        TermDesc::Const(_) => true,
        TermDesc::Func(_, inner) => is_ground_desc(inner),
    })
}
