//! Client test support utilities
//!
//! This crate provides utilities specifically for client testing: unified
//! logging initialization and a fake game server that speaks the Majority
//! Rules HTTP API on a random local port.

pub mod fake_game;
pub mod fake_server;
pub mod logging;

pub use fake_game::FakeGame;
pub use fake_server::{FakeGameServer, FakeServerOptions, RecordedRequest};
