//! Error types for osc-core
//!
//! A closed taxonomy: configuration mistakes, transport failures, authentication
//! failures and HTTP status failures are distinct variants so callers (and the
//! retry policy) can match on them instead of inspecting messages.

use std::fmt;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the object storage client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid arguments, unknown MIME format, filter outside search context
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, TLS or timeout failure before any HTTP response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The `/auth/v1.0` exchange itself failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The cluster answered with a non-2xx status
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Token persistence failure
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Malformed container listing body
    #[error("Failed to parse listing: {0}")]
    Listing(String),

    /// Local filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(e) => Some(e.status),
            _ => None,
        }
    }

    /// True for 401/403 responses, the shape of an expired or revoked token
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(HttpError {
                kind: HttpErrorKind::Unauthorized | HttpErrorKind::Forbidden,
                ..
            })
        )
    }

    /// True when sending the same request again could succeed
    ///
    /// Local errors (configuration, token store, filesystem, listing parse) are
    /// deterministic and never worth a second round trip.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Transport(_) | Error::Authentication(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Listing(e.to_string())
    }
}

/// Well-known HTTP failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    InternalServerError,
    NotImplemented,
    BadGateway,
    /// Any status without a dedicated kind
    Other,
}

impl HttpErrorKind {
    /// Map a status code to its kind
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => HttpErrorKind::BadRequest,
            401 => HttpErrorKind::Unauthorized,
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            405 => HttpErrorKind::MethodNotAllowed,
            406 => HttpErrorKind::NotAcceptable,
            407 => HttpErrorKind::ProxyAuthenticationRequired,
            408 => HttpErrorKind::RequestTimeout,
            409 => HttpErrorKind::Conflict,
            500 => HttpErrorKind::InternalServerError,
            501 => HttpErrorKind::NotImplemented,
            502 => HttpErrorKind::BadGateway,
            _ => HttpErrorKind::Other,
        }
    }

    /// Canned human-readable message
    pub fn reason(&self) -> &'static str {
        match self {
            HttpErrorKind::BadRequest => "Bad Request",
            HttpErrorKind::Unauthorized => "Unauthorized",
            HttpErrorKind::Forbidden => "Forbidden",
            HttpErrorKind::NotFound => "Not Found",
            HttpErrorKind::MethodNotAllowed => "Method Not Allowed",
            HttpErrorKind::NotAcceptable => "Not Acceptable",
            HttpErrorKind::ProxyAuthenticationRequired => "Proxy Authentication Required",
            HttpErrorKind::RequestTimeout => "Request Timeout",
            HttpErrorKind::Conflict => "Conflict",
            HttpErrorKind::InternalServerError => "Internal Server Error",
            HttpErrorKind::NotImplemented => "Not Implemented",
            HttpErrorKind::BadGateway => "Bad Gateway",
            HttpErrorKind::Other => "Unable to process your request",
        }
    }
}

/// A non-2xx response from the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: u16,
    /// What the client was doing, e.g. `Failed to retrieve "photos/cat.jpg".`
    pub context: Option<String>,
}

impl HttpError {
    pub fn new(status: u16) -> Self {
        Self {
            kind: HttpErrorKind::from_status(status),
            status,
            context: None,
        }
    }

    pub fn with_context(status: u16, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::new(status)
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{ctx} (HTTP {} {})", self.status, self.kind.reason()),
            None => write!(f, "HTTP {} {}", self.status, self.kind.reason()),
        }
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_status() {
        assert_eq!(HttpErrorKind::from_status(400), HttpErrorKind::BadRequest);
        assert_eq!(HttpErrorKind::from_status(401), HttpErrorKind::Unauthorized);
        assert_eq!(HttpErrorKind::from_status(407), HttpErrorKind::ProxyAuthenticationRequired);
        assert_eq!(HttpErrorKind::from_status(409), HttpErrorKind::Conflict);
        assert_eq!(HttpErrorKind::from_status(502), HttpErrorKind::BadGateway);
        assert_eq!(HttpErrorKind::from_status(418), HttpErrorKind::Other);
        assert_eq!(HttpErrorKind::from_status(503), HttpErrorKind::Other);
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::new(404);
        assert_eq!(err.to_string(), "HTTP 404 Not Found");

        let err = HttpError::with_context(500, "Failed to create container");
        assert_eq!(
            err.to_string(),
            "Failed to create container (HTTP 500 Internal Server Error)"
        );

        let err = HttpError::new(599);
        assert_eq!(err.to_string(), "HTTP 599 Unable to process your request");
    }

    #[test]
    fn test_auth_failure_shape() {
        assert!(Error::from(HttpError::new(401)).is_auth_failure());
        assert!(Error::from(HttpError::new(403)).is_auth_failure());
        assert!(!Error::from(HttpError::new(404)).is_auth_failure());
        assert!(!Error::Transport("reset".into()).is_auth_failure());
    }

    #[test]
    fn test_retryable() {
        assert!(Error::from(HttpError::new(500)).is_retryable());
        assert!(Error::Transport("timeout".into()).is_retryable());
        assert!(!Error::Config("bad mime".into()).is_retryable());
        assert!(!Error::TokenStore("disk full".into()).is_retryable());
        assert!(!Error::Listing("eof".into()).is_retryable());
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::from(HttpError::new(409)).status(), Some(409));
        assert_eq!(Error::Config("x".into()).status(), None);
    }
}
