use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::response::{interpret_ack, interpret_response};
use super::GameApi;
use crate::config::api::{TUNNEL_HEADER_NAME, TUNNEL_HEADER_VALUE};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::protocol::{
    Ack, JoinRequest, JoinResponse, RoundId, RoundState, ScoreboardRow, SubmissionRequest,
};

/// [`GameApi`] over HTTP/JSON with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    http: Client,
    config: ClientConfig,
}

impl HttpGameApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if config.sends_tunnel_header() {
            headers.insert(
                HeaderName::from_static(TUNNEL_HEADER_NAME),
                HeaderValue::from_static(TUNNEL_HEADER_VALUE),
            );
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::config(format!("Unable to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.config.endpoint(path)?;
        Ok(self.http.request(method, url))
    }

    /// Sends the request and returns status, content type and body text.
    async fn exchange(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<(u16, Option<String>, String), ClientError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        debug!(path, status, bytes = body.len(), "api response");
        Ok((status, content_type, body))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let (status, content_type, body) = self.exchange(path, request).await?;
        interpret_response(status, content_type.as_deref(), &body)
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError> {
        let path = "/api/join";
        let builder = self.request(Method::POST, path)?.json(request);
        self.send(path, builder).await
    }

    async fn state(&self) -> Result<RoundState, ClientError> {
        let path = "/api/state";
        let builder = self.request(Method::GET, path)?;
        self.send(path, builder).await
    }

    async fn submit(&self, request: &SubmissionRequest) -> Result<Ack, ClientError> {
        let path = request.kind.path();
        let builder = self.request(Method::POST, path)?.json(request);
        let (status, content_type, body) = self.exchange(path, builder).await?;
        interpret_ack(status, content_type.as_deref(), &body)
    }

    async fn results(&self, round_id: RoundId) -> Result<Value, ClientError> {
        let path = "/api/results";
        let builder = self
            .request(Method::GET, path)?
            .query(&[("round_id", round_id)]);
        self.send(path, builder).await
    }

    async fn scoreboard(&self) -> Result<Vec<ScoreboardRow>, ClientError> {
        let path = "/api/scoreboard";
        let builder = self.request(Method::GET, path)?;
        self.send(path, builder).await
    }
}
