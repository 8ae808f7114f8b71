//! Error types for Air API operations.
//!
//! Every operation in the SDK returns [`Error`]. Variants that mirror a failure reported
//! by the Air API carry the raw response text so callers can diagnose the problem.

use thiserror::Error;

/// Default message for an authorization failure.
pub const DEFAULT_AUTHORIZATION_MESSAGE: &str = "An error occurred when authorizing the Air API";

/// Default message for a 403 response.
pub const DEFAULT_FORBIDDEN_MESSAGE: &str =
    "Received 403 Forbidden. Please call AirApi.authorize().";

/// Main error type for Air operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Login succeeded at the transport level but no usable token was returned
    #[error("{0}")]
    Authorization(String),

    /// The API answered with 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    /// Status code or body shape did not match what the operation expected
    #[error("{message}")]
    UnexpectedResponse {
        /// HTTP status code, when a response was received
        status_code: Option<u16>,
        /// Full diagnostic message including the raw response text
        message: String,
    },

    /// A field of a deleted object was accessed
    #[error("{0} object has been deleted and should no longer be referenced")]
    ObjectDeleted(String),

    /// A payload field did not match its declared type
    #[error("{0}")]
    ModelAttribute(String),

    /// A write argument was missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource does not support the requested operation
    #[error("{0}")]
    NotSupported(String),

    /// Generic SDK precondition failure
    #[error("{0}")]
    Air(String),

    /// An argument had an unusable value
    #[error("{0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Could not connect to the API
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid UUID format
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// Specialized result type for Air operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds an [`Error::UnexpectedResponse`] from a status code and raw body text.
    #[must_use]
    pub fn unexpected_response(status_code: u16, text: impl std::fmt::Display) -> Self {
        Self::UnexpectedResponse {
            status_code: Some(status_code),
            message: format!(
                "Received an unexpected response from the Air API ({status_code}): {text}"
            ),
        }
    }

    /// Builds an [`Error::ObjectDeleted`] for the named model.
    #[must_use]
    pub fn object_deleted(model: impl Into<String>) -> Self {
        Self::ObjectDeleted(model.into())
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "AUTHORIZATION_ERROR",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            Self::ObjectDeleted(_) => "OBJECT_DELETED",
            Self::ModelAttribute(_) => "MODEL_ATTRIBUTE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotSupported(_) => "NOT_SUPPORTED",
            Self::Air(_) => "AIR_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidUuid(_) => "INVALID_UUID",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedResponse { status_code, .. } => *status_code,
            Self::Forbidden(_) => Some(403),
            _ => None,
        }
    }

    /// Returns true if the failure happened before any response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::ConnectionFailed(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::UnexpectedResponse {
            status_code: None,
            message: format!("Failed to decode Air API payload: {err}"),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Authorization("test".to_string()).error_code(),
            "AUTHORIZATION_ERROR"
        );
        assert_eq!(Error::Forbidden("test".to_string()).error_code(), "FORBIDDEN");
        assert_eq!(
            Error::unexpected_response(500, "boom").error_code(),
            "UNEXPECTED_RESPONSE"
        );
        assert_eq!(
            Error::ObjectDeleted("Node".to_string()).error_code(),
            "OBJECT_DELETED"
        );
        assert_eq!(
            Error::ModelAttribute("test".to_string()).error_code(),
            "MODEL_ATTRIBUTE_ERROR"
        );
        assert_eq!(
            Error::NotSupported("test".to_string()).error_code(),
            "NOT_SUPPORTED"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(Error::Io("test".to_string()).error_code(), "IO_ERROR");
    }

    #[test]
    fn test_unexpected_response_message() {
        let err = Error::unexpected_response(400, "bad things");
        assert_eq!(
            err.to_string(),
            "Received an unexpected response from the Air API (400): bad things"
        );
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_object_deleted_display() {
        let err = Error::object_deleted("Simulation");
        assert_eq!(
            err.to_string(),
            "Simulation object has been deleted and should no longer be referenced"
        );
    }

    #[test]
    fn test_forbidden_status_code() {
        let err = Error::Forbidden(DEFAULT_FORBIDDEN_MESSAGE.to_string());
        assert_eq!(err.status_code(), Some(403));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let air_err: Error = err.into();
        assert!(matches!(air_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_uuid_error() {
        let err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let air_err: Error = err.into();
        assert!(matches!(air_err, Error::InvalidUuid(_)));
        assert_eq!(air_err.error_code(), "INVALID_UUID");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let air_err: Error = err.into();
        assert!(matches!(
            air_err,
            Error::UnexpectedResponse {
                status_code: None,
                ..
            }
        ));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::Air("test".to_string());
        let err2 = Error::Air("test".to_string());
        let err3 = Error::Air("other".to_string());

        assert_eq!(err1, err2.clone());
        assert_ne!(err1, err3);
    }
}
