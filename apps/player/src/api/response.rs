use serde::de::DeserializeOwned;

use crate::error::{ClientError, INTERSTITIAL_HINT};
use crate::protocol::{Ack, ErrorBody};

const SNIPPET_CHARS: usize = 60;

/// Turns a raw HTTP response into a typed payload or a [`ClientError`].
///
/// - 2xx with the expected JSON: `Ok(T)`
/// - non-2xx with `{"error": ...}`: [`ClientError::Server`]
/// - anything else, a blank body included: [`ClientError::MalformedBody`],
///   with a proxy hint when a 2xx body looks like an HTML page
pub fn interpret_response<T: DeserializeOwned>(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<T, ClientError> {
    if is_success(status) {
        return serde_json::from_str::<T>(body)
            .map_err(|e| malformed(status, content_type, body, &e));
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => Err(ClientError::Server {
            status,
            details: error_body.details_text(),
            message: error_body.error,
        }),
        Err(e) => Err(malformed(status, content_type, body, &e)),
    }
}

/// [`interpret_response`] for submissions, where a blank 2xx body is a valid
/// acknowledgement.
pub fn interpret_ack(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<Ack, ClientError> {
    if is_success(status) && body.trim().is_empty() {
        return Ok(Ack::default());
    }
    interpret_response(status, content_type, body)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn malformed(
    status: u16,
    content_type: Option<&str>,
    body: &str,
    err: &serde_json::Error,
) -> ClientError {
    let snippet: String = body.trim_start().chars().take(SNIPPET_CHARS).collect();
    // Interstitials are served with 200; an HTML 404 or 502 is just a broken proxy.
    let interstitial = is_success(status) && looks_like_html(content_type, body);
    ClientError::MalformedBody {
        status,
        detail: format!("{err}; body starts with {snippet:?}"),
        hint: interstitial.then_some(INTERSTITIAL_HINT),
    }
}

pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    let html_type = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);
    html_type || body.trim_start().starts_with('<')
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::{Ack, RoundState};

    #[test]
    fn success_body_decodes() {
        let state: RoundState = interpret_response(
            200,
            Some("application/json"),
            r#"{"phase":"ANSWER","round_id":1,"round_total":3,"prompt":"Why ___"}"#,
        )
        .unwrap();
        assert_eq!(state.round_id, 1);
        assert_eq!(state.prompt.as_deref(), Some("Why ___"));
    }

    #[test]
    fn blank_ack_is_accepted() {
        let ack = interpret_ack(204, None, "").unwrap();
        assert_eq!(ack, Ack::default());
        let ack = interpret_ack(200, Some("application/json"), r#"{"ok":true,"round_id":2}"#).unwrap();
        assert_eq!(ack.round_id, Some(2));
    }

    #[test]
    fn blank_payload_is_malformed() {
        let err = interpret_response::<Value>(200, Some("application/json"), "").unwrap_err();
        assert!(matches!(err, ClientError::MalformedBody { status: 200, hint: None, .. }));
        let err = interpret_response::<RoundState>(200, None, "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn blank_error_status_is_malformed() {
        let err = interpret_ack(500, None, "").unwrap_err();
        assert!(matches!(err, ClientError::MalformedBody { status: 500, .. }));
    }

    #[test]
    fn error_body_is_surfaced_verbatim() {
        let err = interpret_response::<Ack>(
            409,
            Some("application/json"),
            r#"{"error":"Already submitted an answer for this round"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.user_message(), "Already submitted an answer for this round");
    }

    #[test]
    fn html_interstitial_gets_hint() {
        let err = interpret_response::<Value>(
            200,
            Some("text/html; charset=utf-8"),
            "<!DOCTYPE html><html><body>You are about to visit</body></html>",
        )
        .unwrap_err();
        match err {
            ClientError::MalformedBody { status, hint, .. } => {
                assert_eq!(status, 200);
                assert_eq!(hint, Some(INTERSTITIAL_HINT));
            }
            other => panic!("expected malformed body, got {other:?}"),
        }
    }

    #[test]
    fn html_error_page_gets_no_interstitial_hint() {
        for status in [404, 502] {
            let err = interpret_response::<Value>(
                status,
                Some("text/html"),
                "<html><body><h1>Not Found</h1></body></html>",
            )
            .unwrap_err();
            assert!(matches!(err, ClientError::MalformedBody { hint: None, .. }));
            assert_eq!(
                err.user_message(),
                format!("Unexpected response from server (HTTP {status})")
            );
        }
    }

    #[test]
    fn non_json_error_is_malformed_without_hint() {
        let err = interpret_response::<Ack>(502, Some("text/plain"), "Bad Gateway").unwrap_err();
        match err {
            ClientError::MalformedBody { status, hint, detail } => {
                assert_eq!(status, 502);
                assert_eq!(hint, None);
                assert!(detail.contains("Bad Gateway"));
            }
            other => panic!("expected malformed body, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = interpret_response::<RoundState>(200, None, r#"{"phase":"ANSWER"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }
}
