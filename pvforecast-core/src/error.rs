use std::error::Error as StdError;

use thiserror::Error;

/// Maximum number of body bytes carried into an error message.
const MAX_BODY: usize = 200;

/// Errors returned by [`ForecastClient`](crate::ForecastClient).
///
/// A failed call never yields a partial result: the caller gets either the
/// whole forecast or exactly one of these.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A request option is outside the set the service accepts.
    /// Raised before any network I/O.
    #[error("Invalid {field} '{value}'. Should be {allowed}.")]
    InvalidParameter {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    /// No HTTP response was obtained (DNS, connect, timeout).
    #[error("Failed to reach server: {0}")]
    TransportUnreachable(String),

    /// The service answered, but not with a usable forecast.
    #[error("Failed to get data: {reason} - {body}")]
    RemoteRequestFailed {
        status: Option<u16>,
        reason: String,
        body: String,
    },
}

impl ForecastError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl ToString,
        allowed: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            field,
            value: value.to_string(),
            allowed,
        }
    }

    /// Build a transport error from a reqwest failure. The URL is dropped
    /// because it carries the API key in its query string.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::TransportUnreachable(error_chain(&err.without_url()))
    }

    pub(crate) fn remote(status: Option<u16>, reason: impl Into<String>, body: &str) -> Self {
        Self::RemoteRequestFailed {
            status,
            reason: reason.into(),
            body: truncate_body(body),
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    ///
    /// The client never retries on its own; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidParameter { .. } => false,
            Self::TransportUnreachable(_) => true,
            Self::RemoteRequestFailed { status, .. } => {
                matches!(status, Some(code) if (500..600).contains(code))
            }
        }
    }
}

/// Joins an error and all of its sources into one line.
fn error_chain(err: &dyn StdError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_BODY {
        let mut end = MAX_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
