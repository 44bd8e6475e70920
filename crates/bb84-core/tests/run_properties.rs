//! Property-based tests for the run state machine.
//!
//! Arbitrary transition sequences must never break the session invariants:
//! array lengths track the round count, `current_round` stays bounded and
//! monotone, and comparison/key data only exists in the steps that own it.

use bb84_core::{Entropy, Mode, ProtocolRun, ScriptedEntropy, Speed, Step};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

/// One attempted transition, valid or not.
#[derive(Debug, Clone)]
enum Op {
    Prepare,
    BeginSending,
    StartRound(usize),
    Intercept(usize),
    Measure(usize),
    FinishSending,
    AbortSending,
    Compare(Vec<usize>),
    Key(f64),
    Reset,
}

/// Round indices are drawn raw and reduced modulo the run's round count in
/// [`apply`], so one strategy serves every round count.
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Prepare),
        2 => Just(Op::BeginSending),
        3 => (0usize..64).prop_map(Op::StartRound),
        2 => (0usize..64).prop_map(Op::Intercept),
        4 => (0usize..64).prop_map(Op::Measure),
        2 => Just(Op::FinishSending),
        1 => Just(Op::AbortSending),
        2 => proptest::collection::vec(0usize..64, 0..16).prop_map(Op::Compare),
        2 => (0.0f64..100.0).prop_map(Op::Key),
        1 => Just(Op::Reset),
    ]
}

fn apply(run: &mut ProtocolRun, op: Op) {
    let rounds = run.total_rounds();
    match op {
        Op::Prepare => {
            let mut entropy = ScriptedEntropy::new();
            let _ = run.prepare(entropy.random_qubits(rounds), entropy.random_bases(rounds));
        },
        Op::BeginSending => {
            let _ = run.begin_sending();
        },
        Op::StartRound(i) => {
            let _ = run.start_round(i % rounds);
        },
        Op::Intercept(i) => {
            let _ = run.record_interception(i % rounds);
        },
        Op::Measure(i) => {
            let _ = run.record_measurement(i % rounds, bb84_core::Bit::One);
        },
        Op::FinishSending => {
            let _ = run.finish_sending();
        },
        Op::AbortSending => {
            let _ = run.abort_sending();
        },
        Op::Compare(indices) => {
            let _ = run.store_comparison(indices);
        },
        Op::Key(percent) => {
            let _ = run.store_key(Some("0".into()), percent);
        },
        Op::Reset => run.reset(),
    }
}

fn check_invariants(run: &ProtocolRun) -> Result<(), TestCaseError> {
    let n = run.total_rounds();

    if run.step() == Step::Idle {
        prop_assert!(run.alice_qubits().is_empty());
        prop_assert!(run.bob_measurements().is_empty());
    } else {
        prop_assert_eq!(run.alice_qubits().len(), n);
        prop_assert_eq!(run.bob_bases().len(), n);
        prop_assert_eq!(run.bob_measurements().len(), n);
        prop_assert_eq!(run.eve_interceptions().len(), n);
    }

    prop_assert!(run.current_round() <= n);

    if !matches!(run.step(), Step::Comparing | Step::Complete) {
        prop_assert!(run.matching_indices().is_empty());
        prop_assert!(!run.bases_revealed());
    }
    if run.step() != Step::Complete {
        prop_assert!(run.shared_key().is_none());
    }
    if matches!(run.step(), Step::Measuring | Step::Comparing | Step::Complete) {
        prop_assert!(run.all_measured());
        prop_assert_eq!(run.current_round(), n);
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_under_arbitrary_transitions(
        rounds in 1usize..16,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let mut run = ProtocolRun::new(Mode::WithEve, rounds, Speed::Fast);
        check_invariants(&run)?;
        for op in ops {
            apply(&mut run, op);
            check_invariants(&run)?;
        }
    }

    #[test]
    fn prepare_postconditions(rounds in 1usize..64) {
        let mut entropy = ScriptedEntropy::new();
        let mut run = ProtocolRun::new(Mode::WithoutEve, rounds, Speed::Normal);
        prop_assert!(run.prepare(entropy.random_qubits(rounds), entropy.random_bases(rounds)));

        prop_assert_eq!(run.step(), Step::Prepared);
        prop_assert_eq!(run.alice_qubits().len(), rounds);
        prop_assert_eq!(run.bob_bases().len(), rounds);
        prop_assert_eq!(run.current_round(), 0);
        prop_assert!(run.bob_measurements().iter().all(Option::is_none));
    }

    #[test]
    fn reset_always_returns_to_idle(rounds in 1usize..16, measure_up_to in 0usize..16) {
        let mut entropy = ScriptedEntropy::new();
        let mut run = ProtocolRun::new(Mode::WithEve, rounds, Speed::Slow);
        prop_assert!(run.prepare(entropy.random_qubits(rounds), entropy.random_bases(rounds)));
        prop_assert!(run.begin_sending());
        for i in 0..measure_up_to.min(rounds) {
            prop_assert!(run.record_measurement(i, bb84_core::Bit::Zero));
        }

        run.reset();
        prop_assert_eq!(run.step(), Step::Idle);
        prop_assert_eq!(run.mode(), Mode::WithEve);
        prop_assert_eq!(run.speed(), Speed::Slow);
        prop_assert_eq!(run.total_rounds(), rounds);
        prop_assert!(run.bob_measurements().is_empty());
    }
}
