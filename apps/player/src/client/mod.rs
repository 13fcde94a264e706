//! The player-side game client.

mod poller;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{GameApi, HttpGameApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::protocol::{
    JoinRequest, JoinResponse, RoundId, RoundState, ScoreboardRow, SubmissionKind,
    SubmissionRequest,
};
use crate::session::Session;
use crate::ui::{StatusLine, UiState};
use poller::PollTask;

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The state was newer than anything applied so far and is now displayed.
    Applied(RoundState),
    /// A later poll was applied first; this response was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// The input was blank after trimming; nothing was sent.
    Skipped,
}

#[derive(Debug, Default)]
struct RoundTracker {
    current_round_id: Option<RoundId>,
    applied_seq: u64,
}

pub(crate) struct ClientInner {
    api: Arc<dyn GameApi>,
    poll_interval: Duration,
    session: RwLock<Option<Session>>,
    rounds: Mutex<RoundTracker>,
    next_seq: AtomicU64,
    ui: watch::Sender<UiState>,
    poller: Mutex<Option<PollTask>>,
}

/// One player's connection to a game server.
///
/// Cheap to clone; clones share the same session, round tracking, poll timer
/// and presentation model. Dropping the last clone stops polling.
#[derive(Clone)]
pub struct GameClient {
    inner: Arc<ClientInner>,
}

/// Builder for [`GameClient`] (used in both tests and main).
pub struct ClientBuilder {
    config: ClientConfig,
    api: Option<Arc<dyn GameApi>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            api: None,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `api` instead of an HTTP transport built from the config.
    pub fn with_api(mut self, api: Arc<dyn GameApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn build(self) -> Result<GameClient, ClientError> {
        if self.config.poll_interval.is_zero() {
            return Err(ClientError::config("poll interval must be greater than zero"));
        }
        let api = match self.api {
            Some(api) => api,
            None => Arc::new(HttpGameApi::new(self.config.clone())?),
        };
        let (ui, _) = watch::channel(UiState::default());

        Ok(GameClient {
            inner: Arc::new(ClientInner {
                api,
                poll_interval: self.config.poll_interval,
                session: RwLock::new(None),
                rounds: Mutex::new(RoundTracker::default()),
                next_seq: AtomicU64::new(0),
                ui,
                poller: Mutex::new(None),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.read().clone()
    }

    /// Round id from the most recently applied poll.
    pub fn current_round_id(&self) -> Option<RoundId> {
        self.inner.rounds.lock().current_round_id
    }

    /// Snapshot of the presentation model.
    pub fn ui(&self) -> UiState {
        self.inner.ui.borrow().clone()
    }

    /// Receiver that is notified whenever the presentation model changes.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.inner.ui.subscribe()
    }

    /// Replaces the text of the answer or guess input field.
    pub fn set_input(&self, kind: SubmissionKind, text: impl Into<String>) {
        let text = text.into();
        self.update_ui(|ui| *ui.input_mut(kind) = text);
    }

    fn update_ui(&self, change: impl FnOnce(&mut UiState)) {
        self.inner.ui.send_if_modified(|ui| {
            let before = ui.clone();
            change(ui);
            *ui != before
        });
    }

    /// Joins the game under `name` and starts polling.
    ///
    /// A blank name is rejected before any request is made. On failure the
    /// session is left as it was and polling is not started.
    pub async fn join(&self, name: &str) -> Result<Session, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            let err = ClientError::validation("Please enter a name");
            self.update_ui(|ui| ui.join_status = Some(StatusLine::error(err.user_message())));
            return Err(err);
        }

        info!(name, "joining game");
        let request = JoinRequest {
            name: name.to_string(),
        };
        let joined = self
            .inner
            .api
            .join(&request)
            .await
            .and_then(|response| session_from(response, name));

        match joined {
            Ok(session) => {
                info!(player_id = %session.log_id(), name = session.player_name(), "joined game");
                *self.inner.session.write() = Some(session.clone());
                self.update_ui(|ui| ui.show_game(session.player_name()));
                self.start_polling();
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "join failed");
                self.update_ui(|ui| ui.join_status = Some(StatusLine::error(err.user_message())));
                Err(err)
            }
        }
    }

    /// Starts the poll timer, replacing any timer already running.
    ///
    /// Polls once immediately and then at the configured interval until
    /// [`stop_polling`](Self::stop_polling) or the last clone is dropped.
    /// Must be called from within a Tokio runtime.
    pub fn start_polling(&self) {
        let mut slot = self.inner.poller.lock();
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        *slot = Some(PollTask::spawn(
            Arc::downgrade(&self.inner),
            self.inner.poll_interval,
        ));
        debug!(interval_ms = self.inner.poll_interval.as_millis() as u64, "polling started");
    }

    /// Stops the poll timer. No poll is issued or applied afterwards.
    pub fn stop_polling(&self) {
        if let Some(task) = self.inner.poller.lock().take() {
            task.stop();
            debug!("polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner.poller.lock().is_some()
    }

    /// Fetches the round state once and applies it unless a newer state
    /// already has been applied. A failed poll only raises the error
    /// indicator.
    pub async fn poll_state(&self) -> Result<PollOutcome, ClientError> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.inner.api.state().await;

        let mut rounds = self.inner.rounds.lock();
        if seq <= rounds.applied_seq {
            debug!(seq, applied = rounds.applied_seq, "discarding stale poll response");
            return result.map(|_| PollOutcome::Stale);
        }

        // Only a successful state moves the guard; a failure must not
        // shadow an older state that is still in flight.
        match result {
            Ok(state) => {
                rounds.applied_seq = seq;
                if rounds.current_round_id != Some(state.round_id) {
                    info!(round_id = state.round_id, phase = %state.phase, "round changed");
                }
                rounds.current_round_id = Some(state.round_id);
                self.update_ui(|ui| ui.apply_round(&state));
                Ok(PollOutcome::Applied(state))
            }
            Err(err) => {
                warn!(seq, error = %err, "poll failed");
                self.update_ui(|ui| ui.apply_poll_error(err.user_message()));
                Err(err)
            }
        }
    }

    pub async fn submit_answer(&self) -> Result<SubmitOutcome, ClientError> {
        self.submit(SubmissionKind::Answer).await
    }

    pub async fn submit_guess(&self) -> Result<SubmitOutcome, ClientError> {
        self.submit(SubmissionKind::Guess).await
    }

    /// Sends the current content of the answer or guess field.
    ///
    /// Blank input is ignored without feedback. On success the field is
    /// cleared; on failure it is kept so the player can resubmit.
    pub async fn submit(&self, kind: SubmissionKind) -> Result<SubmitOutcome, ClientError> {
        let value = self.inner.ui.borrow().input(kind).trim().to_string();
        if value.is_empty() {
            debug!(kind = kind.label(), "ignoring blank submission");
            return Ok(SubmitOutcome::Skipped);
        }

        let outcome = match self.submission(kind, value) {
            Ok(request) => self.inner.api.submit(&request).await.map(|_| request),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(request) => {
                info!(
                    kind = kind.label(),
                    round_id = request.round_id,
                    player_id = %crate::logging::RedactedId(&request.player_id),
                    "submission accepted"
                );
                self.update_ui(|ui| {
                    ui.input_mut(kind).clear();
                    ui.set_status(kind, StatusLine::success(format!("{} submitted", kind.label())));
                });
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(kind = kind.label(), error = %err, "submission failed");
                self.update_ui(|ui| ui.set_status(kind, StatusLine::error(err.user_message())));
                Err(err)
            }
        }
    }

    fn submission(
        &self,
        kind: SubmissionKind,
        value: String,
    ) -> Result<SubmissionRequest, ClientError> {
        let player_id = self
            .inner
            .session
            .read()
            .as_ref()
            .map(|s| s.player_id().to_string())
            .ok_or(ClientError::NotJoined)?;
        let round_id = self.current_round_id().ok_or(ClientError::NoRound)?;
        Ok(SubmissionRequest {
            kind,
            player_id,
            round_id,
            value,
        })
    }

    /// Fetches results for the current round and shows them pretty-printed.
    pub async fn fetch_results(&self) -> Result<Value, ClientError> {
        let fetched = match self.current_round_id() {
            Some(round_id) => self.inner.api.results(round_id).await,
            None => Err(ClientError::NoRound),
        };

        match fetched {
            Ok(payload) => {
                debug!(round_id = ?self.current_round_id(), "results fetched");
                let text = serde_json::to_string_pretty(&payload)
                    .unwrap_or_else(|_| payload.to_string());
                self.update_ui(|ui| ui.results_text = text);
                Ok(payload)
            }
            Err(err) => {
                warn!(error = %err, "results unavailable");
                let text = format!("Results not available yet: {}", err.user_message());
                self.update_ui(|ui| ui.results_text = text);
                Err(err)
            }
        }
    }

    /// Fetches the scoreboard and shows it with the local player marked.
    pub async fn fetch_scoreboard(&self) -> Result<Vec<ScoreboardRow>, ClientError> {
        let rows = self.inner.api.scoreboard().await.inspect_err(|err| {
            warn!(error = %err, "scoreboard unavailable");
        })?;
        let my_id = self.session().map(|s| s.player_id().to_string());
        self.update_ui(|ui| ui.set_scoreboard(&rows, my_id.as_deref()));
        Ok(rows)
    }

    /// Stops polling. Equivalent to tearing the page down.
    pub fn shutdown(&self) {
        self.stop_polling();
    }
}

fn session_from(response: JoinResponse, requested_name: &str) -> Result<Session, ClientError> {
    match response.player_id {
        Some(player_id) if !player_id.is_empty() => {
            let name = response
                .name
                .unwrap_or_else(|| requested_name.to_string());
            Ok(Session::new(player_id, name))
        }
        _ => Err(ClientError::malformed(
            200,
            "join response carried no player_id",
        )),
    }
}
