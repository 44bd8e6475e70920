//! End-to-end protocol flow tests against a deterministic backend.
//!
//! # Oracle Pattern
//!
//! A `SimDriver` replaces the HTTP backend with in-process quantum rules:
//! a measurement in the preparation basis returns the encoded bit, a
//! mismatched basis collapses to zero, and an intercepted qubit measured in
//! the matching basis comes back flipped (the worst case for Alice and
//! Bob). Tests end with oracle checks on the resulting run state and chat.

use std::{collections::VecDeque, convert::Infallible, time::Duration};

use bb84_app::{App, AppEvent, Driver, KeyInput, Runtime};
use bb84_client::{ApiError, types::FinalKeyResponse};
use bb84_core::{Basis, Bit, Mode, Qubit, ScriptedEntropy, Speed, Step};

/// Deterministic in-process stand-in for the remote backend.
#[derive(Default)]
struct SimDriver {
    alice: Vec<Qubit>,
    intercepted: Vec<usize>,
    bob: Vec<(usize, Basis, Bit)>,
    /// Events to surface from successive `pace` calls.
    pace_script: VecDeque<Vec<AppEvent>>,
    /// Round index at which `send_qubit` fails.
    fail_send_at: Option<usize>,
}

impl SimDriver {
    fn new() -> Self {
        Self::default()
    }

    fn with_pace_script(script: Vec<Vec<AppEvent>>) -> Self {
        Self { pace_script: script.into(), ..Self::default() }
    }

    fn failing_at(round: usize) -> Self {
        Self { fail_send_at: Some(round), ..Self::default() }
    }

    fn matched_indices(&self) -> Vec<usize> {
        self.bob
            .iter()
            .filter_map(|&(round, basis, _)| {
                let alice = self.alice.get(round)?;
                (alice.basis == basis).then_some(round)
            })
            .collect()
    }
}

impl Driver for SimDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Infallible> {
        Ok(None)
    }

    async fn pace(&mut self, _delay: Duration) -> Vec<AppEvent> {
        self.pace_script.pop_front().unwrap_or_default()
    }

    async fn reset_backend(&mut self) -> Result<(), ApiError> {
        self.alice.clear();
        self.intercepted.clear();
        self.bob.clear();
        Ok(())
    }

    async fn send_qubit(&mut self, qubit: &Qubit) -> Result<(), ApiError> {
        if self.fail_send_at == Some(self.alice.len()) {
            self.fail_send_at = None;
            return Err(ApiError::Network("connection reset".into()));
        }
        self.alice.push(*qubit);
        Ok(())
    }

    async fn eve_intercept(&mut self, round: usize) -> Result<(), ApiError> {
        self.intercepted.push(round);
        Ok(())
    }

    async fn bob_measure(&mut self, round: usize, basis: Basis) -> Result<Bit, ApiError> {
        let alice = self
            .alice
            .get(round)
            .copied()
            .ok_or_else(|| ApiError::Server { status: 400, detail: "no qubit sent".into() })?;
        let measured = if alice.basis != basis {
            Bit::Zero
        } else if self.intercepted.contains(&round) {
            alice.bit.flipped()
        } else {
            alice.bit
        };
        self.bob.push((round, basis, measured));
        Ok(measured)
    }

    async fn compare_bases(&mut self) -> Result<Vec<usize>, ApiError> {
        Ok(self.matched_indices())
    }

    async fn final_key(&mut self) -> Result<FinalKeyResponse, ApiError> {
        let matched = self.matched_indices();
        let errors = self
            .bob
            .iter()
            .filter(|&&(round, _, measured)| {
                matched.contains(&round)
                    && self.alice.get(round).is_some_and(|alice| alice.bit != measured)
            })
            .count();
        let error_rate = if matched.is_empty() {
            0.0
        } else {
            errors as f64 / matched.len() as f64 * 100.0
        };
        if error_rate > 25.0 {
            return Ok(FinalKeyResponse {
                shared_key: None,
                error_rate,
                msg: Some("Error rate too high, possible eavesdropping".into()),
            });
        }
        let key = matched
            .iter()
            .filter_map(|&round| self.alice.get(round))
            .map(|qubit| qubit.bit.to_string())
            .collect::<String>();
        Ok(FinalKeyResponse { shared_key: Some(key), error_rate, msg: None })
    }

    async fn fetch_overall_circuit(&mut self, _eve: bool) -> Result<String, ApiError> {
        Ok("bb84-circuit.png".into())
    }

    async fn health(&mut self) -> bool {
        true
    }

    fn render(&mut self, _app: &App) -> Result<(), Infallible> {
        Ok(())
    }

    fn stop(&mut self) {}
}

fn runtime(mode: Mode, rounds: usize, rate: f64, driver: SimDriver) -> Runtime<SimDriver> {
    let app = App::new(mode, rounds, Speed::Fast, rate, Box::new(ScriptedEntropy::new()));
    Runtime::new(driver, app)
}

async fn press(rt: &mut Runtime<SimDriver>, key: char) -> bool {
    match rt.feed(AppEvent::Key(KeyInput::Char(key))).await {
        Ok(quit) => quit,
        Err(never) => match never {},
    }
}

#[tokio::test]
async fn clean_run_yields_full_length_key() {
    let mut rt = runtime(Mode::WithoutEve, 6, 0.5, SimDriver::new());

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);
    assert!(!press(&mut rt, 'c').await);
    assert!(!press(&mut rt, 'g').await);

    let run = rt.app().run();
    assert_eq!(run.step(), Step::Complete);
    // Scripted entropy prepares every qubit and basis identically, so every
    // round survives sifting and no bit is disturbed.
    assert_eq!(run.matching_indices().len(), 6);
    assert!(matches!(run.shared_key(), Some(key) if key.len() == 6));
    assert!(run.error_rate().abs() < f64::EPSILON);
    assert!(run.is_secure());
    assert!(
        rt.app()
            .chat()
            .messages()
            .iter()
            .any(|m| m.text.contains("secure communication established"))
    );
}

#[tokio::test]
async fn full_interception_is_detected() {
    let mut rt = runtime(Mode::WithEve, 5, 1.0, SimDriver::new());

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);
    assert!(!press(&mut rt, 'c').await);
    assert!(!press(&mut rt, 'g').await);

    let run = rt.app().run();
    assert_eq!(run.step(), Step::Complete);
    assert_eq!(run.intercepted_rounds().len(), 5);
    // Every matched round was disturbed, so the backend aborts the key.
    assert!(run.shared_key().is_none());
    assert!(run.error_rate() > 0.2);
    assert!(!run.is_secure());
    assert!(
        rt.app()
            .chat()
            .messages()
            .iter()
            .any(|m| m.text.contains("possible eavesdropping"))
    );
}

#[tokio::test]
async fn skip_fast_forwards_into_comparison() {
    let driver = SimDriver::with_pace_script(vec![vec![AppEvent::Key(KeyInput::Char(' '))]]);
    let mut rt = runtime(Mode::WithoutEve, 8, 0.5, driver);

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);

    // Skip arrived during the first pause; the remaining rounds ran without
    // delays and completion chained straight into the comparison.
    assert_eq!(rt.app().run().step(), Step::Comparing);
    assert_eq!(rt.app().run().matching_indices().len(), 8);
    assert!(!rt.app().is_busy());
    assert!(!rt.app().skip_requested());
}

#[tokio::test]
async fn mid_send_failure_reverts_to_prepared() {
    let mut rt = runtime(Mode::WithoutEve, 4, 0.5, SimDriver::failing_at(2));

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);

    let run = rt.app().run();
    assert_eq!(run.step(), Step::Prepared);
    assert!(run.bob_measurements().iter().all(Option::is_none));
    assert!(run.intercepted_rounds().is_empty());
    assert!(rt.app().photons().photons().is_empty());
    assert!(matches!(rt.app().status_message(), Some(m) if m.contains("Unable to reach")));

    // The run is still usable: a retry goes through.
    assert!(!press(&mut rt, 's').await);
    assert_eq!(rt.app().run().step(), Step::Measuring);
}

#[tokio::test]
async fn first_round_runs_before_any_pacing_delay() {
    // A quit surfaced by the very first pause: if any delay were awaited
    // before round 0, nothing would have been sent or measured by now.
    let driver = SimDriver::with_pace_script(vec![vec![AppEvent::Key(KeyInput::Char('q'))]]);
    let mut rt = runtime(Mode::WithoutEve, 3, 0.5, driver);

    assert!(!press(&mut rt, 'p').await);
    assert!(press(&mut rt, 's').await);

    assert!(rt.app().run().bob_measurements().first().is_some_and(Option::is_some));
}

#[tokio::test]
async fn quit_key_interrupts_transmission() {
    let driver = SimDriver::with_pace_script(vec![
        Vec::new(),
        vec![AppEvent::Key(KeyInput::Char('q'))],
    ]);
    let mut rt = runtime(Mode::WithoutEve, 4, 0.5, driver);

    assert!(!press(&mut rt, 'p').await);
    assert!(press(&mut rt, 's').await);
}

#[tokio::test]
async fn circuit_fetch_after_completion() {
    let mut rt = runtime(Mode::WithoutEve, 3, 0.5, SimDriver::new());

    // Guarded off before the run completes.
    assert!(!press(&mut rt, 'v').await);
    assert!(rt.app().circuit_path().is_none());

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);
    assert!(!press(&mut rt, 'c').await);
    assert!(!press(&mut rt, 'g').await);
    assert!(!press(&mut rt, 'v').await);

    assert_eq!(rt.app().circuit_path(), Some("bb84-circuit.png"));
    assert!(
        rt.app()
            .chat()
            .messages()
            .iter()
            .any(|m| m.text.contains("Overall circuit saved"))
    );
}

#[tokio::test]
async fn reset_after_completion_allows_fresh_run() {
    let mut rt = runtime(Mode::WithoutEve, 3, 0.5, SimDriver::new());

    assert!(!press(&mut rt, 'p').await);
    assert!(!press(&mut rt, 's').await);
    assert!(!press(&mut rt, 'c').await);
    assert!(!press(&mut rt, 'g').await);
    assert!(!press(&mut rt, 'r').await);

    assert_eq!(rt.app().run().step(), Step::Idle);
    assert!(rt.app().run().shared_key().is_none());

    assert!(!press(&mut rt, 'p').await);
    assert_eq!(rt.app().run().step(), Step::Prepared);
}
