//! Protocol run state machine.
//!
//! [`ProtocolRun`] is the single session-scoped store for one BB84 run. All
//! mutation goes through explicit transition methods so the step invariants
//! are enforced in one place. Transitions whose guard is unmet return `false`
//! and leave the state untouched; a rejected transition indicates a wiring
//! bug in the caller, not a user-facing error, so there is nothing to report.
//!
//! Step order: `idle → prepared → sending → measuring → comparing →
//! complete`, with `reset` returning to `idle` from anywhere.

use std::time::Duration;

use crate::qubit::{Basis, Bit, Qubit};

/// Error-rate fraction above which a completed run is classified as
/// compromised.
pub const SECURITY_THRESHOLD: f64 = 0.11;

/// Protocol step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No run in progress.
    Idle,
    /// Qubits and bases generated, backend reset.
    Prepared,
    /// Per-round transmission loop in progress.
    Sending,
    /// All rounds measured, awaiting public basis comparison.
    Measuring,
    /// Matching indices received, awaiting key derivation.
    Comparing,
    /// Shared key and error rate received.
    Complete,
}

impl Step {
    /// Human-readable step name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Prepared => "prepared",
            Self::Sending => "sending",
            Self::Measuring => "measuring",
            Self::Comparing => "comparing",
            Self::Complete => "complete",
        }
    }
}

/// Simulation mode: whether Eve sits on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Clean channel.
    WithoutEve,
    /// Eve intercepts rounds probabilistically.
    WithEve,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::WithoutEve => Self::WithEve,
            Self::WithEve => Self::WithoutEve,
        }
    }
}

/// Animation pacing between transmission rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    /// 1.5 s between rounds.
    Slow,
    /// 1 s between rounds.
    Normal,
    /// 0.5 s between rounds.
    Fast,
}

impl Speed {
    /// Inter-round pacing delay.
    pub fn delay(self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(1500),
            Self::Normal => Duration::from_millis(1000),
            Self::Fast => Duration::from_millis(500),
        }
    }

    /// Next faster setting (saturating).
    pub fn faster(self) -> Self {
        match self {
            Self::Slow => Self::Normal,
            Self::Normal | Self::Fast => Self::Fast,
        }
    }

    /// Next slower setting (saturating).
    pub fn slower(self) -> Self {
        match self {
            Self::Fast => Self::Normal,
            Self::Normal | Self::Slow => Self::Slow,
        }
    }

    /// Human-readable setting name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }
}

/// State of one BB84 protocol run.
///
/// Owns every per-round array; `reset` preserves only the user's
/// mode/speed/round-count selections.
#[derive(Debug, Clone)]
pub struct ProtocolRun {
    mode: Mode,
    step: Step,
    current_round: usize,
    total_rounds: usize,
    alice_qubits: Vec<Qubit>,
    bob_bases: Vec<Basis>,
    bob_measurements: Vec<Option<Bit>>,
    eve_interceptions: Vec<bool>,
    matching_indices: Vec<usize>,
    shared_key: Option<String>,
    error_rate: f64,
    speed: Speed,
}

impl ProtocolRun {
    /// Create an idle run with the given settings.
    pub fn new(mode: Mode, total_rounds: usize, speed: Speed) -> Self {
        Self {
            mode,
            step: Step::Idle,
            current_round: 0,
            total_rounds,
            alice_qubits: Vec::new(),
            bob_bases: Vec::new(),
            bob_measurements: Vec::new(),
            eve_interceptions: Vec::new(),
            matching_indices: Vec::new(),
            shared_key: None,
            error_rate: 0.0,
            speed,
        }
    }

    /// Commit prepared qubits and bases: `idle → prepared`.
    ///
    /// Rejects length mismatches against `total_rounds`.
    pub fn prepare(&mut self, qubits: Vec<Qubit>, bases: Vec<Basis>) -> bool {
        if self.step != Step::Idle
            || qubits.len() != self.total_rounds
            || bases.len() != self.total_rounds
        {
            return false;
        }
        self.step = Step::Prepared;
        self.current_round = 0;
        self.alice_qubits = qubits;
        self.bob_bases = bases;
        self.bob_measurements = vec![None; self.total_rounds];
        self.eve_interceptions = vec![false; self.total_rounds];
        self.matching_indices = Vec::new();
        self.shared_key = None;
        self.error_rate = 0.0;
        true
    }

    /// Start the transmission loop: `prepared → sending`.
    pub fn begin_sending(&mut self) -> bool {
        if self.step != Step::Prepared {
            return false;
        }
        self.step = Step::Sending;
        self.current_round = 0;
        true
    }

    /// Mark `round` as the round currently on the wire.
    ///
    /// `current_round` is monotone within a run; going backwards is rejected.
    pub fn start_round(&mut self, round: usize) -> bool {
        if self.step != Step::Sending || round >= self.total_rounds || round < self.current_round {
            return false;
        }
        self.current_round = round;
        true
    }

    /// Record that Eve intercepted `round`.
    pub fn record_interception(&mut self, round: usize) -> bool {
        if self.step != Step::Sending || round >= self.total_rounds {
            return false;
        }
        self.eve_interceptions[round] = true;
        true
    }

    /// Record Bob's measurement for `round`.
    pub fn record_measurement(&mut self, round: usize, bit: Bit) -> bool {
        if self.step != Step::Sending || round >= self.total_rounds {
            return false;
        }
        self.bob_measurements[round] = Some(bit);
        true
    }

    /// Finish the transmission loop: `sending → measuring`.
    ///
    /// Requires every round to carry a measurement.
    pub fn finish_sending(&mut self) -> bool {
        if self.step != Step::Sending || !self.all_measured() {
            return false;
        }
        self.step = Step::Measuring;
        self.current_round = self.total_rounds;
        true
    }

    /// Abort a failed transmission: `sending → prepared`.
    ///
    /// Discards all per-round results so no partial round is committed.
    pub fn abort_sending(&mut self) -> bool {
        if self.step != Step::Sending {
            return false;
        }
        self.step = Step::Prepared;
        self.current_round = 0;
        self.bob_measurements = vec![None; self.total_rounds];
        self.eve_interceptions = vec![false; self.total_rounds];
        true
    }

    /// Store the backend's sifting result verbatim: `measuring → comparing`.
    pub fn store_comparison(&mut self, matching_indices: Vec<usize>) -> bool {
        if self.step != Step::Measuring {
            return false;
        }
        self.step = Step::Comparing;
        self.matching_indices = matching_indices;
        true
    }

    /// Store the final key result: `comparing → complete`.
    ///
    /// The backend reports the error rate as a percentage; it is stored as a
    /// fraction. `shared_key` is `None` when the backend aborted derivation.
    pub fn store_key(&mut self, shared_key: Option<String>, error_rate_percent: f64) -> bool {
        if self.step != Step::Comparing {
            return false;
        }
        self.step = Step::Complete;
        self.shared_key = shared_key;
        self.error_rate = error_rate_percent / 100.0;
        true
    }

    /// Return to `idle`, preserving mode, speed, and round count.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode, self.total_rounds, self.speed);
    }

    /// Change the mode. Only allowed while idle.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.step != Step::Idle {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Change the round count. Only allowed while idle.
    pub fn set_total_rounds(&mut self, total_rounds: usize) -> bool {
        if self.step != Step::Idle || total_rounds == 0 {
            return false;
        }
        self.total_rounds = total_rounds;
        true
    }

    /// Change the pacing speed. Allowed at any step.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    /// Current step.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current pacing speed.
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Round currently on the wire; `total_rounds` once transmission ended.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Number of rounds in this run.
    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// Alice's prepared qubits. Empty while idle.
    pub fn alice_qubits(&self) -> &[Qubit] {
        &self.alice_qubits
    }

    /// Bob's measurement bases. Empty while idle.
    pub fn bob_bases(&self) -> &[Basis] {
        &self.bob_bases
    }

    /// Bob's measurement per round; `None` until the round is measured.
    pub fn bob_measurements(&self) -> &[Option<Bit>] {
        &self.bob_measurements
    }

    /// Per-round interception flags.
    pub fn eve_interceptions(&self) -> &[bool] {
        &self.eve_interceptions
    }

    /// Indices of rounds Eve intercepted.
    pub fn intercepted_rounds(&self) -> Vec<usize> {
        self.eve_interceptions
            .iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect()
    }

    /// Sifted indices as reported by the backend. Empty before comparison.
    pub fn matching_indices(&self) -> &[usize] {
        &self.matching_indices
    }

    /// Derived shared key. `None` before completion or when aborted.
    pub fn shared_key(&self) -> Option<&str> {
        self.shared_key.as_deref()
    }

    /// Error rate as a fraction in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Every round has a measurement recorded.
    pub fn all_measured(&self) -> bool {
        !self.bob_measurements.is_empty() && self.bob_measurements.iter().all(Option::is_some)
    }

    /// Whether the public basis comparison has happened.
    ///
    /// Until then panels must not disclose whether Alice's and Bob's bases
    /// match; this is the single gate for that policy.
    pub fn bases_revealed(&self) -> bool {
        matches!(self.step, Step::Comparing | Step::Complete)
    }

    /// Whether Alice's and Bob's bases match at `round`.
    ///
    /// `None` until the bases are publicly revealed or when out of range.
    pub fn basis_match(&self, round: usize) -> Option<bool> {
        if !self.bases_revealed() {
            return None;
        }
        let alice = self.alice_qubits.get(round)?;
        let bob = self.bob_bases.get(round)?;
        Some(alice.basis == *bob)
    }

    /// Whether a completed run is classified as secure.
    pub fn is_secure(&self) -> bool {
        self.error_rate <= SECURITY_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Entropy, ScriptedEntropy};

    fn prepared_run(n: usize) -> ProtocolRun {
        let mut entropy = ScriptedEntropy::new();
        let mut run = ProtocolRun::new(Mode::WithoutEve, n, Speed::Normal);
        assert!(run.prepare(entropy.random_qubits(n), entropy.random_bases(n)));
        run
    }

    fn measured_run(n: usize) -> ProtocolRun {
        let mut run = prepared_run(n);
        assert!(run.begin_sending());
        for i in 0..n {
            assert!(run.start_round(i));
            assert!(run.record_measurement(i, Bit::Zero));
        }
        assert!(run.finish_sending());
        run
    }

    #[test]
    fn prepare_initializes_arrays() {
        let run = prepared_run(8);
        assert_eq!(run.step(), Step::Prepared);
        assert_eq!(run.alice_qubits().len(), 8);
        assert_eq!(run.bob_bases().len(), 8);
        assert_eq!(run.bob_measurements().len(), 8);
        assert!(run.bob_measurements().iter().all(Option::is_none));
    }

    #[test]
    fn prepare_rejects_wrong_lengths() {
        let mut entropy = ScriptedEntropy::new();
        let mut run = ProtocolRun::new(Mode::WithoutEve, 8, Speed::Normal);
        assert!(!run.prepare(entropy.random_qubits(4), entropy.random_bases(8)));
        assert_eq!(run.step(), Step::Idle);
    }

    #[test]
    fn prepare_requires_idle() {
        let mut run = prepared_run(4);
        let mut entropy = ScriptedEntropy::new();
        assert!(!run.prepare(entropy.random_qubits(4), entropy.random_bases(4)));
    }

    #[test]
    fn finish_sending_requires_all_measurements() {
        let mut run = prepared_run(4);
        assert!(run.begin_sending());
        assert!(run.record_measurement(0, Bit::One));
        assert!(!run.finish_sending());
        for i in 1..4 {
            assert!(run.record_measurement(i, Bit::Zero));
        }
        assert!(run.finish_sending());
        assert_eq!(run.step(), Step::Measuring);
        assert_eq!(run.current_round(), 4);
    }

    #[test]
    fn current_round_is_monotone() {
        let mut run = prepared_run(4);
        assert!(run.begin_sending());
        assert!(run.start_round(2));
        assert!(!run.start_round(1));
        assert_eq!(run.current_round(), 2);
    }

    #[test]
    fn abort_sending_discards_partial_rounds() {
        let mut run = prepared_run(4);
        assert!(run.begin_sending());
        assert!(run.start_round(0));
        assert!(run.record_interception(0));
        assert!(run.record_measurement(0, Bit::One));

        assert!(run.abort_sending());
        assert_eq!(run.step(), Step::Prepared);
        assert_eq!(run.current_round(), 0);
        assert!(run.bob_measurements().iter().all(Option::is_none));
        assert!(run.intercepted_rounds().is_empty());
    }

    #[test]
    fn comparison_is_stored_verbatim() {
        let mut run = measured_run(4);
        // Deliberately not the locally-computable match set: the backend's
        // answer is echoed, never recomputed.
        assert!(run.store_comparison(vec![3, 1]));
        assert_eq!(run.matching_indices(), &[3, 1]);
        assert_eq!(run.step(), Step::Comparing);
    }

    #[test]
    fn key_stores_fraction_and_classifies() {
        let mut run = measured_run(4);
        assert!(run.store_comparison(vec![0, 1]));
        assert!(run.store_key(Some("01".into()), 25.0));
        assert_eq!(run.step(), Step::Complete);
        assert!((run.error_rate() - 0.25).abs() < f64::EPSILON);
        assert!(!run.is_secure());
    }

    #[test]
    fn eleven_percent_is_still_secure() {
        let mut run = measured_run(4);
        assert!(run.store_comparison(vec![0]));
        assert!(run.store_key(Some("0".into()), 11.0));
        assert!(run.is_secure());
    }

    #[test]
    fn reset_preserves_settings_only() {
        let mut run = measured_run(8);
        run.set_speed(Speed::Fast);
        run.reset();

        assert_eq!(run.step(), Step::Idle);
        assert_eq!(run.mode(), Mode::WithoutEve);
        assert_eq!(run.speed(), Speed::Fast);
        assert_eq!(run.total_rounds(), 8);
        assert!(run.alice_qubits().is_empty());
        assert!(run.bob_bases().is_empty());
        assert!(run.bob_measurements().is_empty());
        assert!(run.matching_indices().is_empty());
        assert!(run.shared_key().is_none());
    }

    #[test]
    fn bases_hidden_until_comparison() {
        let mut run = measured_run(4);
        assert!(!run.bases_revealed());
        assert_eq!(run.basis_match(0), None);

        assert!(run.store_comparison(vec![0]));
        assert!(run.bases_revealed());
        assert!(run.basis_match(0).is_some());
        assert_eq!(run.basis_match(99), None);
    }

    #[test]
    fn settings_locked_outside_idle() {
        let mut run = prepared_run(4);
        assert!(!run.set_mode(Mode::WithEve));
        assert!(!run.set_total_rounds(16));
        run.reset();
        assert!(run.set_mode(Mode::WithEve));
        assert!(run.set_total_rounds(16));
        assert!(!run.set_total_rounds(0));
    }
}
