//! Error types shared by the connector, transport and client.

use thiserror::Error;

/// Boxed error produced by applications and request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of the connector.
#[derive(Debug, Error)]
pub enum Error {
    /// The application failed while handling the request and
    /// exception propagation is enabled.
    #[error("application error: {0}")]
    Application(#[source] BoxError),

    /// The in-memory HTTP exchange failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] hyper::Error),

    /// The request could not be translated for the application.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Building a request or response failed.
    #[error(transparent)]
    Http(#[from] http::Error),
}

impl Error {
    /// Returns true if this error originated in the application.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application(_))
    }

    /// Consume the error and return the application's original error, if any.
    pub fn into_application(self) -> Option<BoxError> {
        match self {
            Error::Application(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_keeps_original() {
        let err = Error::Application("boom".into());
        assert!(err.is_application());
        assert_eq!(err.to_string(), "application error: boom");
        assert_eq!(err.into_application().unwrap().to_string(), "boom");
    }

    #[test]
    fn invalid_request_is_not_application() {
        let err = Error::InvalidRequest("bad path".into());
        assert!(!err.is_application());
        assert!(err.into_application().is_none());
    }
}
