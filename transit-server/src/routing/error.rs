//! Routing provider error types.

use std::fmt;

/// Errors from a routing provider.
///
/// Every variant is recoverable: callers fall back to straight-line
/// estimates rather than failing the request.
#[derive(Debug)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body was not the expected JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// Provider returned an error status code
    ApiError { status: u16, message: String },

    /// Provider answered but found no route (`code` other than `Ok`, or
    /// an empty route list)
    NoRoute { code: String },
}

impl RoutingError {
    /// Returns true if the request never got an answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RoutingError::Http(e) if e.is_timeout())
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Http(e) => write!(f, "HTTP error: {e}"),
            RoutingError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            RoutingError::ApiError { status, message } => {
                write!(f, "routing API error {status}: {message}")
            }
            RoutingError::NoRoute { code } => write!(f, "no route found (code {code})"),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Http(err)
    }
}
