use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::phase::Phase;

pub type RoundId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

/// Body of a join response. Both fields are optional on the wire so that a
/// response without an id can be told apart from an unparseable one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Authoritative round state returned by `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: Phase,
    pub round_id: RoundId,
    pub round_total: RoundId,
    #[serde(default)]
    pub prompt: Option<String>,
    /// ISO-8601 deadline of a timed phase.
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub players_connected: Option<u32>,
    #[serde(default)]
    pub answers_received: Option<u32>,
}

/// Which of the two player submissions a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    Answer,
    Guess,
}

impl SubmissionKind {
    pub fn path(self) -> &'static str {
        match self {
            SubmissionKind::Answer => "/api/answer",
            SubmissionKind::Guess => "/api/guess",
        }
    }

    /// JSON field holding the submitted text.
    pub fn field(self) -> &'static str {
        match self {
            SubmissionKind::Answer => "answer",
            SubmissionKind::Guess => "guess",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionKind::Answer => "Answer",
            SubmissionKind::Guess => "Guess",
        }
    }
}

/// One answer or guess. Built per submit call and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub kind: SubmissionKind,
    pub player_id: String,
    pub round_id: RoundId,
    pub value: String,
}

impl Serialize for SubmissionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("SubmissionRequest", 3)?;
        body.serialize_field("player_id", &self.player_id)?;
        body.serialize_field("round_id", &self.round_id)?;
        body.serialize_field(self.kind.field(), &self.value)?;
        body.end()
    }
}

/// Acknowledgement of a submission. The server may send `{}` or
/// `{"ok": true, "round_id": n}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub round_id: Option<RoundId>,
}

/// Error body shape used by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl ErrorBody {
    /// `details` flattened to text; strings are used as-is, other JSON is encoded.
    pub fn details_text(&self) -> Option<String> {
        match &self.details {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardRow {
    pub player_id: String,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub answer: String,
    pub count: u32,
    pub pct: f64,
}

/// Typed reading of a results payload.
///
/// The client renders the raw payload; this view is only for summaries and
/// is built leniently so an unexpected payload never breaks rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResults {
    pub round_id: RoundId,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub breakdown: Vec<BreakdownEntry>,
    #[serde(default)]
    pub majority_answers: Vec<String>,
    #[serde(default)]
    pub total_answers: u32,
}

impl RoundResults {
    pub fn from_payload(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    /// One-line summary, e.g. `Majority: pizza (3 of 5 answers)`.
    pub fn summary(&self) -> String {
        if self.majority_answers.is_empty() {
            return "No answers this round".to_string();
        }
        let top = self
            .breakdown
            .first()
            .map(|entry| entry.count)
            .unwrap_or_default();
        format!(
            "Majority: {} ({} of {} answers)",
            self.majority_answers.join(", "),
            top,
            self.total_answers
        )
    }
}
