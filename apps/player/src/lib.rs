#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod ui;

// Re-exports for public API
pub use api::{GameApi, HttpGameApi};
pub use client::{ClientBuilder, GameClient, PollOutcome, SubmitOutcome};
pub use config::{resolve_api_base, ClientConfig, TunnelHeader};
pub use error::{ClientError, ErrorKind};
pub use protocol::{Phase, RoundState, SubmissionKind};
pub use session::Session;
pub use ui::{Region, UiState, View};
