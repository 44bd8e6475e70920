//! Application state machine.
//!
//! This module defines the [`App`] state machine, which owns the whole
//! session: the protocol run, the chat log, the photon field, and the user's
//! settings. It is a pure state machine: it consumes [`crate::AppEvent`]
//! inputs and produces [`crate::AppAction`] instructions for the runtime to
//! execute. No I/O dependencies, fully testable in simulation.
//!
//! # Guards
//!
//! Every protocol operation checks its step precondition and whether a
//! remote operation is already in flight. A call whose guard is unmet
//! returns no actions: the controls are greyed out in the UI, so a rejected
//! call is a wiring bug, not a user error, and stays silent.

use bb84_core::{ChatLog, Entropy, Mode, PhotonField, ProtocolRun, Sender, Speed, Step};

use crate::{
    AppAction, AppEvent, KeyInput,
    action::RoundPlan,
    event::Operation,
    state::BackendHealth,
};

/// Step size for interception-rate adjustments.
const RATE_STEP: f64 = 0.1;

/// Force a probability into `[0, 1]`. NaN becomes 0.
fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }
}

/// Application state machine.
pub struct App {
    /// The live protocol run.
    run: ProtocolRun,
    /// Append-only narration log.
    chat: ChatLog,
    /// Photons currently crossing the channel.
    photons: PhotonField,
    /// Client-side randomness (seedable).
    entropy: Box<dyn Entropy>,
    /// Eve's per-round interception probability.
    interception_rate: f64,
    /// A remote operation is in flight; protocol controls are locked.
    busy: bool,
    /// Skip was requested mid-transmission.
    skip_requested: bool,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Last liveness probe result.
    backend_health: BackendHealth,
    /// Saved overall-circuit rendering, once fetched.
    circuit_path: Option<String>,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl App {
    /// Create a new App with the given settings and entropy source.
    pub fn new(
        mode: Mode,
        total_rounds: usize,
        speed: Speed,
        interception_rate: f64,
        entropy: Box<dyn Entropy>,
    ) -> Self {
        Self {
            run: ProtocolRun::new(mode, total_rounds, speed),
            chat: ChatLog::new(),
            photons: PhotonField::new(),
            entropy,
            interception_rate: sanitize_rate(interception_rate),
            busy: false,
            skip_requested: false,
            status_message: None,
            backend_health: BackendHealth::Unknown,
            circuit_path: None,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                let before = self.photons.photons().len();
                self.photons.prune();
                if self.photons.photons().len() == before {
                    vec![]
                } else {
                    vec![AppAction::Render]
                }
            },
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::HealthProbed { healthy } => {
                self.backend_health =
                    if healthy { BackendHealth::Healthy } else { BackendHealth::Unreachable };
                vec![AppAction::Render]
            },
            AppEvent::RunPrepared { qubits, bases } => self.on_prepared(qubits, bases),
            AppEvent::RoundSent { round } => self.on_round_sent(round),
            AppEvent::RoundIntercepted { round } => self.on_round_intercepted(round),
            AppEvent::RoundMeasured { round, measured } => self.on_round_measured(round, measured),
            AppEvent::TransmissionFinished => self.on_transmission_finished(),
            AppEvent::BasesCompared { matching_indices } => self.on_bases_compared(matching_indices),
            AppEvent::KeyGenerated { shared_key, error_rate_percent, msg } => {
                self.on_key_generated(shared_key, error_rate_percent, msg)
            },
            AppEvent::CircuitSaved { path } => {
                self.busy = false;
                self.chat.push(Sender::System, format!("Overall circuit saved to {path}"));
                self.circuit_path = Some(path);
                vec![AppAction::Render]
            },
            AppEvent::RemoteFailed { operation, error } => self.on_remote_failed(operation, &error),
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char('q') | KeyInput::Esc => self.quit(),
            KeyInput::Char('p') => self.prepare(),
            KeyInput::Char('s') => self.send(),
            KeyInput::Char('c') => self.compare_bases(),
            KeyInput::Char('g') | KeyInput::Enter => self.generate_key(),
            KeyInput::Char('r') => self.reset(),
            KeyInput::Char(' ') => self.skip_animation(),
            KeyInput::Char('m') => self.toggle_mode(),
            KeyInput::Char('v') => self.fetch_circuit(),
            KeyInput::Char('+' | '=') => self.adjust_rounds(1),
            KeyInput::Char('-') => self.adjust_rounds(-1),
            KeyInput::Up => self.adjust_rate(RATE_STEP),
            KeyInput::Down => self.adjust_rate(-RATE_STEP),
            KeyInput::Left => {
                self.run.set_speed(self.run.speed().slower());
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.run.set_speed(self.run.speed().faster());
                vec![AppAction::Render]
            },
            KeyInput::Char(_) => vec![],
        }
    }

    /// Generate a fresh run and ask the runtime to reset the backend.
    ///
    /// The generated qubits travel through the `Prepare` action and come
    /// back in `RunPrepared` so nothing is committed if the reset fails.
    pub fn prepare(&mut self) -> Vec<AppAction> {
        if self.busy || self.run.step() != Step::Idle {
            return vec![];
        }
        let n = self.run.total_rounds();
        let qubits = self.entropy.random_qubits(n);
        let bases = self.entropy.random_bases(n);
        self.busy = true;
        self.status_message = None;
        vec![AppAction::Prepare { qubits, bases }, AppAction::Render]
    }

    /// Start the transmission loop.
    ///
    /// Eve's interception decisions for the whole run are drawn here,
    /// client-side, before any remote call goes out.
    pub fn send(&mut self) -> Vec<AppAction> {
        if self.busy || self.run.step() != Step::Prepared {
            return vec![];
        }
        let with_eve = self.run.mode() == Mode::WithEve;
        let plan: Vec<RoundPlan> = self
            .run
            .alice_qubits()
            .iter()
            .zip(self.run.bob_bases())
            .enumerate()
            .map(|(round, (qubit, bob_basis))| RoundPlan {
                round,
                qubit: *qubit,
                bob_basis: *bob_basis,
                intercept: with_eve && self.entropy.chance(self.interception_rate),
            })
            .collect();

        if !self.run.begin_sending() {
            return vec![];
        }
        self.busy = true;
        self.skip_requested = false;
        vec![AppAction::Transmit { plan }, AppAction::Render]
    }

    /// Ask the backend for the sifted indices.
    pub fn compare_bases(&mut self) -> Vec<AppAction> {
        if self.busy || self.run.step() != Step::Measuring {
            return vec![];
        }
        self.busy = true;
        vec![AppAction::CompareBases, AppAction::Render]
    }

    /// Ask the backend for the final key.
    pub fn generate_key(&mut self) -> Vec<AppAction> {
        if self.busy || self.run.step() != Step::Comparing {
            return vec![];
        }
        self.busy = true;
        vec![AppAction::GenerateKey, AppAction::Render]
    }

    /// Clear all session state, preserving mode/speed/round-count.
    pub fn reset(&mut self) -> Vec<AppAction> {
        if self.busy {
            return vec![];
        }
        self.run.reset();
        self.chat.clear();
        self.photons.clear();
        self.skip_requested = false;
        self.status_message = None;
        self.circuit_path = None;
        self.chat.push(Sender::System, "Protocol reset - ready for new simulation");
        vec![AppAction::Render]
    }

    /// Truncate the remaining pacing delays and fast-forward to comparison.
    pub fn skip_animation(&mut self) -> Vec<AppAction> {
        if self.run.step() != Step::Sending {
            return vec![];
        }
        self.skip_requested = true;
        self.status_message = Some("Skipping animation".to_string());
        vec![AppAction::Render]
    }

    /// Toggle Eve on or off. Only while idle.
    pub fn toggle_mode(&mut self) -> Vec<AppAction> {
        if self.busy || !self.run.set_mode(self.run.mode().toggled()) {
            return vec![];
        }
        vec![AppAction::Render]
    }

    /// Fetch the overall circuit rendering. Only once complete.
    pub fn fetch_circuit(&mut self) -> Vec<AppAction> {
        if self.busy || self.run.step() != Step::Complete {
            return vec![];
        }
        self.busy = true;
        vec![
            AppAction::FetchOverallCircuit { eve: self.run.mode() == Mode::WithEve },
            AppAction::Render,
        ]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    fn adjust_rounds(&mut self, delta: isize) -> Vec<AppAction> {
        if self.busy {
            return vec![];
        }
        let n = self.run.total_rounds().saturating_add_signed(delta).max(1);
        if self.run.set_total_rounds(n) { vec![AppAction::Render] } else { vec![] }
    }

    fn adjust_rate(&mut self, delta: f64) -> Vec<AppAction> {
        self.interception_rate = sanitize_rate(self.interception_rate + delta);
        vec![AppAction::Render]
    }

    fn on_prepared(
        &mut self,
        qubits: Vec<bb84_core::Qubit>,
        bases: Vec<bb84_core::Basis>,
    ) -> Vec<AppAction> {
        self.busy = false;
        let n = self.run.total_rounds();
        if !self.run.prepare(qubits, bases) {
            tracing::warn!("prepare commit rejected by run state machine");
            return vec![AppAction::Render];
        }
        self.chat.clear();
        self.photons.clear();
        self.circuit_path = None;
        self.chat.push(Sender::System, format!("Prepared {n} random qubits with random bases"));
        self.chat.push(Sender::Alice, format!("Generated {n} qubits for transmission"));
        vec![AppAction::Render]
    }

    fn on_round_sent(&mut self, round: usize) -> Vec<AppAction> {
        if !self.run.start_round(round) {
            return vec![];
        }
        if let Some(qubit) = self.run.alice_qubits().get(round).copied() {
            self.photons.spawn(qubit.bit, qubit.basis, round);
            self.chat.push_round(
                Sender::Alice,
                format!("Sent bit {} in {} basis", qubit.bit, qubit.basis),
                round,
            );
        }
        vec![AppAction::Render]
    }

    fn on_round_intercepted(&mut self, round: usize) -> Vec<AppAction> {
        if !self.run.record_interception(round) {
            return vec![];
        }
        self.photons.mark_intercepted(round);
        self.chat.push_round(
            Sender::Eve,
            format!("Intercepted and measured qubit {}", round + 1),
            round,
        );
        vec![AppAction::Render]
    }

    fn on_round_measured(&mut self, round: usize, measured: bb84_core::Bit) -> Vec<AppAction> {
        if !self.run.record_measurement(round, measured) {
            return vec![];
        }
        if let Some(basis) = self.run.bob_bases().get(round) {
            self.chat.push_round(
                Sender::Bob,
                format!("Measured in {basis} basis -> {measured}"),
                round,
            );
        }
        // The photon's flight ends at Bob's detector.
        self.photons.mark_round_complete(round);
        vec![AppAction::Render]
    }

    fn on_transmission_finished(&mut self) -> Vec<AppAction> {
        self.busy = false;
        if !self.run.finish_sending() {
            tracing::warn!("transmission finished with unmeasured rounds");
            return vec![AppAction::Render];
        }
        self.chat.push(Sender::System, "All qubits transmitted and measured");
        if self.skip_requested {
            // Fast-forward lands the run in `comparing` without a pause.
            self.skip_requested = false;
            self.status_message = None;
            self.busy = true;
            return vec![AppAction::CompareBases, AppAction::Render];
        }
        vec![AppAction::Render]
    }

    fn on_bases_compared(&mut self, matching_indices: Vec<usize>) -> Vec<AppAction> {
        self.busy = false;
        let positions = matching_indices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let count = matching_indices.len();
        if !self.run.store_comparison(matching_indices) {
            tracing::warn!("comparison result arrived outside the measuring step");
            return vec![AppAction::Render];
        }
        self.chat.push(Sender::System, format!("Publicly compared bases: {count} matches found"));
        self.chat.push(Sender::Alice, format!("Keeping bits at positions: {positions}"));
        self.chat.push(Sender::Bob, format!("Keeping bits at positions: {positions}"));
        vec![AppAction::Render]
    }

    fn on_key_generated(
        &mut self,
        shared_key: Option<String>,
        error_rate_percent: f64,
        msg: Option<String>,
    ) -> Vec<AppAction> {
        self.busy = false;
        if !self.run.store_key(shared_key.clone(), error_rate_percent) {
            tracing::warn!("key result arrived outside the comparing step");
            return vec![AppAction::Render];
        }
        match shared_key {
            Some(key) => self.chat.push(Sender::System, format!("Shared key generated: {key}")),
            None => {
                let reason = msg.unwrap_or_else(|| "error rate too high".to_string());
                self.chat.push(Sender::System, format!("Key generation aborted: {reason}"));
            },
        }
        self.chat.push(Sender::System, format!("Error rate: {error_rate_percent:.1}%"));
        if self.run.is_secure() {
            self.chat.push(Sender::System, "Low error rate - secure communication established");
        } else {
            self.chat.push(Sender::System, "High error rate detected - possible eavesdropping!");
        }
        vec![AppAction::Render]
    }

    fn on_remote_failed(&mut self, operation: Operation, error: &bb84_client::ApiError) -> Vec<AppAction> {
        tracing::warn!(operation = operation.label(), error = %error, "remote call failed");
        self.busy = false;
        self.skip_requested = false;
        if operation == Operation::Send {
            // No partial round commit: drop everything back to prepared.
            self.run.abort_sending();
            self.photons.clear();
        }
        self.status_message =
            Some(format!("{} failed: {}", operation.label(), error.user_message()));
        vec![AppAction::Render]
    }

    /// The live protocol run.
    pub fn run(&self) -> &ProtocolRun {
        &self.run
    }

    /// The chat log.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Photons currently crossing the channel.
    pub fn photons(&self) -> &PhotonField {
        &self.photons
    }

    /// Eve's interception probability.
    pub fn interception_rate(&self) -> f64 {
        self.interception_rate
    }

    /// Whether a remote operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether skip was requested for the current transmission.
    pub fn skip_requested(&self) -> bool {
        self.skip_requested
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Last liveness probe result.
    pub fn backend_health(&self) -> BackendHealth {
        self.backend_health
    }

    /// Path of the saved overall-circuit rendering, if fetched.
    pub fn circuit_path(&self) -> Option<&str> {
        self.circuit_path.as_deref()
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
