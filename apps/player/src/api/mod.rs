//! Transport seam between [`crate::GameClient`] and the game server.

pub mod http;
pub mod response;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::protocol::{
    Ack, JoinRequest, JoinResponse, RoundId, RoundState, ScoreboardRow, SubmissionRequest,
};

pub use http::HttpGameApi;

/// One call per server endpoint. Implementations never retry.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// `POST /api/join`
    async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError>;

    /// `GET /api/state`
    async fn state(&self) -> Result<RoundState, ClientError>;

    /// `POST /api/answer` or `POST /api/guess`, depending on `request.kind`.
    async fn submit(&self, request: &SubmissionRequest) -> Result<Ack, ClientError>;

    /// `GET /api/results?round_id=`; the payload is returned untouched.
    async fn results(&self, round_id: RoundId) -> Result<Value, ClientError>;

    /// `GET /api/scoreboard`
    async fn scoreboard(&self) -> Result<Vec<ScoreboardRow>, ClientError>;
}
