// In-memory GameApi driven by per-test scripts.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use majority_client::protocol::{
    Ack, JoinRequest, JoinResponse, RoundId, RoundState, ScoreboardRow, SubmissionRequest,
};
use majority_client::{ClientError, GameApi, Phase};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Join,
    State,
    Submit,
    Results,
    Scoreboard,
}

type Scripted<T> = VecDeque<(Duration, Result<T, ClientError>)>;

/// Scripted replies are consumed in call order; when a script runs dry the
/// endpoint falls back to its default reply.
#[derive(Default)]
pub struct ScriptedApi {
    joins: Mutex<Scripted<JoinResponse>>,
    states: Mutex<Scripted<RoundState>>,
    submits: Mutex<Scripted<Ack>>,
    results: Mutex<Scripted<Value>>,
    default_state: Mutex<Option<RoundState>>,
    scoreboard: Mutex<Vec<ScoreboardRow>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    submissions: Mutex<Vec<SubmissionRequest>>,
    result_rounds: Mutex<Vec<RoundId>>,
}

pub fn round(phase: Phase, round_id: RoundId, round_total: RoundId) -> RoundState {
    RoundState {
        phase,
        round_id,
        round_total,
        prompt: None,
        ends_at: None,
        players_connected: None,
        answers_received: None,
    }
}

pub fn joined(player_id: &str, name: &str) -> JoinResponse {
    JoinResponse {
        player_id: Some(player_id.to_string()),
        name: Some(name.to_string()),
    }
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_join(&self, reply: Result<JoinResponse, ClientError>) {
        self.joins.lock().push_back((Duration::ZERO, reply));
    }

    /// State returned whenever no scripted state reply is queued.
    pub fn set_state(&self, state: RoundState) {
        *self.default_state.lock() = Some(state);
    }

    pub fn push_state(&self, delay: Duration, reply: Result<RoundState, ClientError>) {
        self.states.lock().push_back((delay, reply));
    }

    pub fn push_submit(&self, reply: Result<Ack, ClientError>) {
        self.submits.lock().push_back((Duration::ZERO, reply));
    }

    pub fn push_results(&self, reply: Result<Value, ClientError>) {
        self.results.lock().push_back((Duration::ZERO, reply));
    }

    pub fn set_scoreboard(&self, rows: Vec<ScoreboardRow>) {
        *self.scoreboard.lock() = rows;
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn submissions(&self) -> Vec<SubmissionRequest> {
        self.submissions.lock().clone()
    }

    pub fn result_rounds(&self) -> Vec<RoundId> {
        self.result_rounds.lock().clone()
    }

    fn record(&self, endpoint: Endpoint) {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
    }
}

async fn play<T>(
    script: &Mutex<Scripted<T>>,
    fallback: impl FnOnce() -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let next = script.lock().pop_front();
    match next {
        Some((delay, reply)) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            reply
        }
        None => fallback(),
    }
}

#[async_trait]
impl GameApi for ScriptedApi {
    async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError> {
        self.record(Endpoint::Join);
        let name = request.name.clone();
        play(&self.joins, move || Ok(joined("p1", &name))).await
    }

    async fn state(&self) -> Result<RoundState, ClientError> {
        self.record(Endpoint::State);
        let fallback = self.default_state.lock().clone();
        play(&self.states, move || {
            fallback.ok_or_else(|| ClientError::transport("no state scripted"))
        })
        .await
    }

    async fn submit(&self, request: &SubmissionRequest) -> Result<Ack, ClientError> {
        self.record(Endpoint::Submit);
        self.submissions.lock().push(request.clone());
        play(&self.submits, || Ok(Ack::default())).await
    }

    async fn results(&self, round_id: RoundId) -> Result<Value, ClientError> {
        self.record(Endpoint::Results);
        self.result_rounds.lock().push(round_id);
        play(&self.results, || {
            Err(ClientError::Server {
                status: 409,
                message: "Results available only in RESULTS phase".to_string(),
                details: None,
            })
        })
        .await
    }

    async fn scoreboard(&self) -> Result<Vec<ScoreboardRow>, ClientError> {
        self.record(Endpoint::Scoreboard);
        Ok(self.scoreboard.lock().clone())
    }
}
