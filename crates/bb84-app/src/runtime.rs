//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: protocol state machine
//! - [`Driver`]: platform-specific I/O and remote calls
//!
//! Actions returned by the App are executed here; their remote completions
//! are translated back into [`AppEvent`]s and fed to the App. Chained
//! actions go through a pending queue instead of recursion so the loop
//! stays a plain `while`.

use bb84_client::ApiError;

use crate::{App, AppAction, AppEvent, Driver, action::RoundPlan, event::Operation};

/// Generic runtime that orchestrates App and Driver.
pub struct Runtime<D>
where
    D: Driver,
{
    driver: D,
    app: App,
}

impl<D> Runtime<D>
where
    D: Driver,
{
    /// Create a new runtime with the given driver and application state.
    pub fn new(driver: D, app: App) -> Self {
        Self { driver, app }
    }

    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        if self.dispatch(vec![AppAction::ProbeHealth]).await? {
            self.driver.stop();
            return Ok(());
        }

        loop {
            if let Some(event) = self.driver.poll_event().await? {
                if self.feed(event).await? {
                    break;
                }
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Feed one event to the App and execute the resulting actions.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn feed(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let actions = self.app.handle(event);
        self.dispatch(actions).await
    }

    /// Execute actions, feeding remote completions back to the App.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn dispatch(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Prepare { qubits, bases } => {
                        let event = match self.driver.reset_backend().await {
                            Ok(()) => AppEvent::RunPrepared { qubits, bases },
                            Err(error) => {
                                AppEvent::RemoteFailed { operation: Operation::Prepare, error }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::Transmit { plan } => {
                        let leftovers = self.transmit(plan).await?;
                        pending_actions.extend(leftovers);
                    },
                    AppAction::CompareBases => {
                        let event = match self.driver.compare_bases().await {
                            Ok(matching_indices) => AppEvent::BasesCompared { matching_indices },
                            Err(error) => {
                                AppEvent::RemoteFailed { operation: Operation::Compare, error }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::GenerateKey => {
                        let event = match self.driver.final_key().await {
                            Ok(response) => AppEvent::KeyGenerated {
                                shared_key: response.shared_key,
                                error_rate_percent: response.error_rate,
                                msg: response.msg,
                            },
                            Err(error) => {
                                AppEvent::RemoteFailed { operation: Operation::GenerateKey, error }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::FetchOverallCircuit { eve } => {
                        let event = match self.driver.fetch_overall_circuit(eve).await {
                            Ok(path) => AppEvent::CircuitSaved { path },
                            Err(error) => {
                                AppEvent::RemoteFailed { operation: Operation::Visualize, error }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::ProbeHealth => {
                        let healthy = self.driver.health().await;
                        pending_actions.extend(self.app.handle(AppEvent::HealthProbed { healthy }));
                    },
                }
            }
        }
        Ok(false)
    }

    /// Run the sequential per-round transmission loop.
    ///
    /// Each round walks its qubit across the backend (Alice sends, Eve
    /// maybe intercepts, Bob measures), then pauses for the pacing delay —
    /// except after the last round, and not at all once skip is requested.
    /// Input arriving during the pauses is fed to the App so skip and quit
    /// stay live mid-transmission.
    ///
    /// Non-render actions produced along the way (the skip chain's
    /// `CompareBases`, a mid-flight `Quit`) are returned to the dispatch
    /// queue rather than executed recursively.
    async fn transmit(&mut self, plan: Vec<RoundPlan>) -> Result<Vec<AppAction>, D::Error> {
        let mut leftovers = Vec::new();
        let total = plan.len();

        for (i, step) in plan.into_iter().enumerate() {
            if let Err(error) = self.round_trip(&step).await {
                let actions = self
                    .app
                    .handle(AppEvent::RemoteFailed { operation: Operation::Send, error });
                self.apply_inline(actions, &mut leftovers)?;
                return Ok(leftovers);
            }

            let last = i + 1 == total;
            if !last && !self.app.skip_requested() {
                let delay = self.app.run().speed().delay();
                for event in self.driver.pace(delay).await {
                    let actions = self.app.handle(event);
                    self.apply_inline(actions, &mut leftovers)?;
                }
            }
            if leftovers.iter().any(|a| matches!(a, AppAction::Quit)) {
                return Ok(leftovers);
            }
        }

        let actions = self.app.handle(AppEvent::TransmissionFinished);
        self.apply_inline(actions, &mut leftovers)?;
        Ok(leftovers)
    }

    /// Walk one qubit across the channel: send, optional intercept, measure.
    async fn round_trip(&mut self, step: &RoundPlan) -> Result<(), ApiError> {
        self.driver.send_qubit(&step.qubit).await?;
        let actions = self.app.handle(AppEvent::RoundSent { round: step.round });
        self.render_only(actions);

        if step.intercept {
            self.driver.eve_intercept(step.round).await?;
            let actions = self.app.handle(AppEvent::RoundIntercepted { round: step.round });
            self.render_only(actions);
        }

        let measured = self.driver.bob_measure(step.round, step.bob_basis).await?;
        let actions = self.app.handle(AppEvent::RoundMeasured { round: step.round, measured });
        self.render_only(actions);
        Ok(())
    }

    /// Render inline; defer everything else to the dispatch queue.
    fn apply_inline(
        &mut self,
        actions: Vec<AppAction>,
        leftovers: &mut Vec<AppAction>,
    ) -> Result<(), D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                other => leftovers.push(other),
            }
        }
        Ok(())
    }

    /// Render inline, dropping render errors; mid-round events produce
    /// nothing else.
    fn render_only(&mut self, actions: Vec<AppAction>) {
        for action in actions {
            match action {
                AppAction::Render => {
                    if let Err(e) = self.driver.render(&self.app) {
                        tracing::warn!("failed to render: {e}");
                    }
                },
                other => {
                    tracing::warn!("unexpected mid-round action: {other:?}");
                },
            }
        }
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
