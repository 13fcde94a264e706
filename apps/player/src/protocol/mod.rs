//! Wire types for the Majority Rules HTTP API.

pub mod messages;
pub mod phase;

pub use messages::{
    Ack, BreakdownEntry, ErrorBody, JoinRequest, JoinResponse, RoundId, RoundResults,
    RoundState, ScoreboardRow, SubmissionKind, SubmissionRequest,
};
pub use phase::Phase;
