//! End-to-end saturation tests through the prover.

use flutesat::state::StateChange;
use flutesat::{parse_problem, Interner, ProofResult, Prover, ProverConfig, ProverError};

fn run(input: &str, fluted: bool) -> (ProofResult, Prover) {
    let mut interner = Interner::new();
    let problem = parse_problem(input, &mut interner).unwrap();
    let config = ProverConfig {
        fluted_mode: fluted,
        max_clauses: 5000,
        ..ProverConfig::default()
    };
    let mut prover = Prover::from_problem(problem, config, interner).unwrap();
    let result = prover.prove();
    (result, prover)
}

#[test]
fn plain_mode_refutes_simple_problem() {
    let (result, prover) = run(
        "cnf(a, axiom, p(a)).
         cnf(b, axiom, ~p(X) | q(X)).
         cnf(goal, negated_conjecture, ~q(a)).",
        false,
    );

    match result {
        ProofResult::Proof { empty_clause_idx } => {
            let proof = prover.extract_proof(empty_clause_idx);
            assert!(proof.last().unwrap().conclusion.is_empty());
            // Input clauses plus at least one resolution step
            assert!(proof.len() >= 4);
        }
        other => panic!("expected proof, got {:?}", other),
    }
}

#[test]
fn plain_mode_saturates_satisfiable_problem() {
    let (result, _) = run(
        "cnf(a, axiom, p(a)).
         cnf(b, axiom, q(a)).",
        false,
    );
    assert_eq!(result, ProofResult::Saturated);
}

#[test]
fn fluted_mode_rejects_non_fluted_input() {
    let mut interner = Interner::new();
    let problem = parse_problem("cnf(a, axiom, p(X, Y) | q(Y, X)).", &mut interner).unwrap();
    let config = ProverConfig {
        fluted_mode: true,
        ..ProverConfig::default()
    };
    match Prover::from_problem(problem, config, interner) {
        Err(ProverError::NotInFlutedFragment) => {}
        Ok(_) => panic!("expected fragment rejection"),
    }
}

#[test]
fn fluted_mode_refutes_fluted_problem() {
    let (result, prover) = run(
        "fof(a, axiom, ![X]: (p(X) => q(X))).
         fof(b, axiom, ![X]: p(X)).
         fof(goal, conjecture, ![X]: q(X)).",
        true,
    );

    match result {
        ProofResult::Proof { empty_clause_idx } => {
            let proof = prover.extract_proof(empty_clause_idx);
            assert!(proof.last().unwrap().conclusion.is_empty());
            assert!(prover.env.statistics.definitions_introduced > 0);
            assert!(prover.env.statistics.resolutions > 0);
        }
        other => panic!("expected proof, got {:?}", other),
    }
}

#[test]
fn fluted_mode_saturates_satisfiable_fluted_problem() {
    let (result, _) = run("fof(a, axiom, ![X]: (p(X) => q(X))).", true);
    assert_eq!(result, ProofResult::Saturated);
}

#[test]
fn separation_fires_during_saturation() {
    let (result, prover) = run("cnf(a, axiom, p(X, Y) | q(Y, Z)).", true);

    // The FL3 clause is split at activation and the halves saturate
    assert_eq!(result, ProofResult::Saturated);
    assert_eq!(prover.env.statistics.separations, 1);

    // The event log records the withdrawal and the two replacement halves
    let separation_adds = prover
        .state
        .event_log
        .iter()
        .filter(|e| matches!(e, StateChange::Add(_, rule, _) if rule == "Separation"))
        .count();
    assert_eq!(separation_adds, 2);

    let withdrawn = prover
        .state
        .event_log
        .iter()
        .any(|e| matches!(e, StateChange::Simplify(_, None, rule, _) if rule == "Separation"));
    assert!(withdrawn);
}

#[test]
fn separated_halves_share_only_the_name_literal() {
    let (_, prover) = run("cnf(a, axiom, p(X, Y) | q(Y, Z)).", true);

    let halves: Vec<_> = prover
        .state
        .event_log
        .iter()
        .filter_map(|e| match e {
            StateChange::Add(clause, rule, _) if rule == "Separation" => Some(clause.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(halves.len(), 2);

    let name_lits: Vec<_> = halves
        .iter()
        .map(|c| c.literals.last().unwrap().clone())
        .collect();
    assert_eq!(name_lits[0].predicate, name_lits[1].predicate);
    assert_eq!(name_lits[0].args, name_lits[1].args);
    assert_ne!(name_lits[0].polarity, name_lits[1].polarity);

    // No other literal occurs in both halves
    for lit in &halves[0].literals[..halves[0].literals.len() - 1] {
        assert!(!halves[1].literals.contains(lit));
    }
}

#[test]
fn fluted_refutation_through_separation_and_resolution() {
    // The separated halves must still participate in the refutation:
    // p(X,Y) | q(Y,Z) is separated, and the remaining units contradict both
    // halves
    let (result, prover) = run(
        "cnf(a, axiom, p(X, Y) | q(Y, Z)).
         cnf(b, axiom, ~p(X, Y)).
         cnf(c, axiom, ~q(X, Y)).",
        true,
    );

    match result {
        ProofResult::Proof { .. } => {
            assert!(prover.env.statistics.separations >= 1);
            assert!(prover.env.statistics.resolutions >= 2);
        }
        other => panic!("expected proof, got {:?}", other),
    }
}

#[test]
fn resource_limit_respected() {
    let mut interner = Interner::new();
    let problem = parse_problem(
        "cnf(a, axiom, p(a)).
         cnf(b, axiom, q(a)).",
        &mut interner,
    )
    .unwrap();
    let config = ProverConfig {
        max_iterations: 1,
        ..ProverConfig::default()
    };
    let mut prover = Prover::from_problem(problem, config, interner).unwrap();
    assert_eq!(prover.prove(), ProofResult::ResourceLimit);
}

#[test]
fn tautologies_are_deleted_before_activation() {
    let (result, prover) = run(
        "cnf(t, axiom, p(X) | ~p(X)).
         cnf(a, axiom, q(a)).",
        false,
    );
    assert_eq!(result, ProofResult::Saturated);
    assert_eq!(prover.env.statistics.tautologies_deleted, 1);
}
