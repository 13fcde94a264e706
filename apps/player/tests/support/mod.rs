#![allow(dead_code)]

pub mod scripted_api;

use std::sync::Arc;
use std::time::Duration;

use majority_client::config::ClientConfig;
use majority_client::GameClient;

pub use scripted_api::{joined, round, Endpoint, ScriptedApi};

/// Client wired to `api` with the default 2000 ms poll interval.
pub fn client_with(api: &Arc<ScriptedApi>) -> GameClient {
    GameClient::builder()
        .with_api(api.clone())
        .build()
        .expect("client builds")
}

/// Client for a real server at `base_url`, polling every `interval`.
pub fn http_client(base_url: &str, interval: Duration) -> GameClient {
    let config = ClientConfig::for_origin(Some(base_url))
        .expect("valid base url")
        .with_poll_interval(interval)
        .with_request_timeout(Duration::from_secs(5));
    GameClient::builder()
        .with_config(config)
        .build()
        .expect("client builds")
}

/// Waits until the presentation model satisfies `pred`.
pub async fn wait_for_ui(
    client: &GameClient,
    timeout: Duration,
    pred: impl Fn(&majority_client::UiState) -> bool,
) -> majority_client::UiState {
    let mut rx = client.subscribe();
    let wait = async {
        loop {
            {
                let ui = rx.borrow_and_update();
                if pred(&ui) {
                    return ui.clone();
                }
            }
            if rx.changed().await.is_err() {
                panic!("ui channel closed");
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .expect("timed out waiting for ui state")
}
