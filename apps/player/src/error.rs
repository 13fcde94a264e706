use std::error::Error as StdError;

use thiserror::Error;

/// Hint attached to malformed bodies that look like an HTML page rather than JSON.
pub const INTERSTITIAL_HINT: &str =
    "the server answered with an HTML page; a tunnelling proxy may be showing its warning page \
     (check that the skip-warning header is enabled for this address)";

/// Broad failure categories, one per way a client operation can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally; no request was issued.
    LocalValidation,
    /// No response from the server.
    Transport,
    /// Non-success status with a JSON error body.
    Server,
    /// Response body was not the JSON we expected.
    Malformed,
    /// Client configuration is unusable.
    Config,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation error: {detail}")]
    Validation { detail: String },
    #[error("Not joined")]
    NotJoined,
    #[error("No round observed yet")]
    NoRound,
    #[error("Transport error: {detail}")]
    Transport {
        detail: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("Server error {status}: {message}")]
    Server {
        status: u16,
        message: String,
        details: Option<String>,
    },
    #[error("Malformed response ({status}): {detail}")]
    MalformedBody {
        status: u16,
        detail: String,
        hint: Option<&'static str>,
    },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl ClientError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
            source: None,
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn malformed(status: u16, detail: impl Into<String>) -> Self {
        Self::MalformedBody {
            status,
            detail: detail.into(),
            hint: None,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } | ClientError::NotJoined | ClientError::NoRound => {
                ErrorKind::LocalValidation
            }
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::MalformedBody { .. } => ErrorKind::Malformed,
            ClientError::Config { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } | ClientError::MalformedBody { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Text suitable for showing to the player.
    ///
    /// Server messages are passed through verbatim, with `details` appended
    /// when the server supplied them.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation { detail } => detail.clone(),
            ClientError::NotJoined => "Join the game first".to_string(),
            ClientError::NoRound => "Waiting for the round to start".to_string(),
            ClientError::Transport { .. } => {
                "Network error: could not reach the game server".to_string()
            }
            ClientError::Server {
                message,
                details: Some(details),
                ..
            } => format!("{message} ({details})"),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::MalformedBody {
                status,
                hint: Some(hint),
                ..
            } => format!("Unexpected response from server (HTTP {status}): {hint}"),
            ClientError::MalformedBody { status, .. } => {
                format!("Unexpected response from server (HTTP {status})")
            }
            ClientError::Config { detail } => format!("Configuration problem: {detail}"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        ClientError::Transport {
            detail,
            source: Some(Box::new(err)),
        }
    }
}
