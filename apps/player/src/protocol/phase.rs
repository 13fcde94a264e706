use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-declared stage of the current round.
///
/// Only `Answer`, `Guess` and `Results` gate a player action. The server also
/// reports `LOBBY` before the first round and `EXPIRED` once a timed phase has
/// run out; anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Lobby,
    Answer,
    Guess,
    Results,
    Expired,
    Other(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Lobby => "LOBBY",
            Phase::Answer => "ANSWER",
            Phase::Guess => "GUESS",
            Phase::Results => "RESULTS",
            Phase::Expired => "EXPIRED",
            Phase::Other(raw) => raw,
        }
    }

    /// True for the three phases in which the player can act.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Phase::Answer | Phase::Guess | Phase::Results)
    }
}

impl From<String> for Phase {
    // Exact match; "answer" is not ANSWER.
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LOBBY" => Phase::Lobby,
            "ANSWER" => Phase::Answer,
            "GUESS" => Phase::Guess,
            "RESULTS" => Phase::Results,
            "EXPIRED" => Phase::Expired,
            _ => Phase::Other(raw),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
