use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

/// Address used when no hosting origin is known.
pub const FALLBACK_API_BASE: &str = "http://127.0.0.1:5001";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header that makes ngrok skip its browser warning page.
pub const TUNNEL_HEADER_NAME: &str = "ngrok-skip-browser-warning";
pub const TUNNEL_HEADER_VALUE: &str = "1";

const TUNNEL_HOST_SUFFIXES: [&str; 4] = [".ngrok-free.dev", ".ngrok-free.app", ".ngrok.io", ".ngrok.app"];

/// When to attach the tunnel header to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TunnelHeader {
    /// Only for hosts that belong to a known tunnelling proxy.
    #[default]
    Auto,
    Always,
    Never,
}

impl TunnelHeader {
    pub fn applies_to(self, url: &Url) -> bool {
        match self {
            TunnelHeader::Always => true,
            TunnelHeader::Never => false,
            TunnelHeader::Auto => is_tunnel_host(url),
        }
    }

    fn parse(raw: &str) -> Result<Self, ClientError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(TunnelHeader::Auto),
            "1" | "true" | "yes" | "always" => Ok(TunnelHeader::Always),
            "0" | "false" | "no" | "never" => Ok(TunnelHeader::Never),
            other => Err(ClientError::config(format!(
                "MAJORITY_TUNNEL_HEADER must be auto, true or false, but got: '{other}'"
            ))),
        }
    }
}

fn is_tunnel_host(url: &Url) -> bool {
    url.host_str()
        .map(|host| {
            TUNNEL_HOST_SUFFIXES
                .iter()
                .any(|suffix| host.ends_with(suffix))
        })
        .unwrap_or(false)
}

/// Connection settings for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: Url,
    pub tunnel_header: TunnelHeader,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            tunnel_header: TunnelHeader::Auto,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Config for the given hosting origin, falling back to [`FALLBACK_API_BASE`].
    pub fn for_origin(origin: Option<&str>) -> Result<Self, ClientError> {
        Ok(Self::new(resolve_api_base(origin)?))
    }

    /// Builds a config from `MAJORITY_*` environment variables.
    ///
    /// - `MAJORITY_API_BASE`: server origin (fallback when unset)
    /// - `MAJORITY_TUNNEL_HEADER`: `auto` (default), `true` or `false`
    /// - `MAJORITY_POLL_INTERVAL_MS`: poll period, default 2000
    /// - `MAJORITY_REQUEST_TIMEOUT_MS`: per-request timeout, default 10000
    pub fn from_env() -> Result<Self, ClientError> {
        let origin = env::var("MAJORITY_API_BASE").ok();
        let mut config = Self::for_origin(origin.as_deref())?;

        if let Ok(raw) = env::var("MAJORITY_TUNNEL_HEADER") {
            config.tunnel_header = TunnelHeader::parse(&raw)?;
        }
        if let Some(interval) = millis_var("MAJORITY_POLL_INTERVAL_MS")? {
            config.poll_interval = interval;
        }
        if let Some(timeout) = millis_var("MAJORITY_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = timeout;
        }
        Ok(config)
    }

    pub fn with_tunnel_header(mut self, tunnel_header: TunnelHeader) -> Self {
        self.tunnel_header = tunnel_header;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Whether requests to `api_base` carry the tunnel header.
    pub fn sends_tunnel_header(&self) -> bool {
        self.tunnel_header.applies_to(&self.api_base)
    }

    /// Absolute URL for an API path such as `/api/state`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.api_base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| ClientError::config(format!("Invalid endpoint '{path}': {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        // FALLBACK_API_BASE is a valid literal
        #[allow(clippy::expect_used)]
        let api_base = Url::parse(FALLBACK_API_BASE).expect("fallback api base parses");
        Self::new(api_base)
    }
}

/// Picks the API origin: the hosting origin when it is usable, otherwise the fallback.
///
/// An origin is unusable when absent, blank, or the literal `null` that
/// browsers report for `file:` pages.
pub fn resolve_api_base(origin: Option<&str>) -> Result<Url, ClientError> {
    let candidate = match origin.map(str::trim) {
        Some(origin) if !origin.is_empty() && origin != "null" => origin,
        _ => FALLBACK_API_BASE,
    };
    let url = Url::parse(candidate)
        .map_err(|e| ClientError::config(format!("Invalid API base '{candidate}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ClientError::config(format!(
            "API base must be http or https, but got scheme '{scheme}'"
        ))),
    }
}

fn millis_var(name: &str) -> Result<Option<Duration>, ClientError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ClientError::config(format!("{name} must be a number of milliseconds")))?;
    if millis == 0 {
        return Err(ClientError::config(format!("{name} must be greater than zero")));
    }
    Ok(Some(Duration::from_millis(millis)))
}
