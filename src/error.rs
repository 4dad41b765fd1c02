//! Error types for this crate.

use std::error::Error as StdError;
use std::fmt;

pub use crate::data::{ApiError, ErrorId};

/// A boxed [`Error`](std::error::Error) trait object.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type commonly returned by functions in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by this crate.
///
/// Errors are categorized by [`ErrorKind`], and typically carry an underlying
/// `source` (a websocket error, a JSON error, an [`ApiError`] from the server,
/// etc) that can be inspected via [`find_source`](Self::find_source).
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

/// The category of an [`Error`].
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A mandatory configuration field was missing or empty.
    #[error("missing required configuration")]
    Configuration,
    /// The connection could not be established, was dropped, or is not open.
    #[error("websocket connection error")]
    Connection,
    /// The caller attempted to send an empty request.
    #[error("invalid request argument")]
    InvalidArgument,
    /// The server reply was missing an expected field or had an unexpected type.
    #[error("malformed or unexpected response")]
    Protocol,
    /// A request could not be serialized to JSON.
    #[error("JSON error")]
    Json,
    /// The server returned an `APIError` response.
    #[error("received APIError from server")]
    Api,
}

/// The expected and received message types of a mismatched response.
#[derive(thiserror::Error, Debug)]
#[error("received unexpected response (expected {expected}, received {received})")]
pub struct UnexpectedResponseError {
    /// The message type expected by the caller.
    pub expected: String,
    /// The message type found in the response.
    pub received: String,
}

impl Error {
    /// Creates a new [`Error`] with the given kind and no source.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Set this error's underlying `source`.
    pub fn with_source<E: Into<BoxError>>(mut self, source: E) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its source.
    pub fn into_source(self) -> Option<BoxError> {
        self.source
    }

    /// Returns the server [`ApiError`] in this error's source chain, if any.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        self.find_source::<ApiError>()
    }

    /// Returns `true` if this error was caused by a server `APIError` response.
    pub fn is_api_error(&self) -> bool {
        self.as_api_error().is_some()
    }

    /// Returns `true` if the server rejected a request for lack of authentication.
    pub fn is_unauthenticated_error(&self) -> bool {
        matches!(self.as_api_error(), Some(e) if e.is_unauthenticated())
    }

    /// Recurse through this error's `source` chain, returning the first matching error type.
    pub fn find_source<E: StdError + 'static>(&self) -> Option<&E> {
        let mut source = self.source();

        while let Some(e) = source {
            match e.downcast_ref::<E>() {
                Some(ref found) => return Some(found),
                None => source = e.source(),
            }
        }

        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref source) = self.source {
            write!(f, "{}: {}", self.kind, source)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorKind::Json).with_source(error)
    }
}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Self::new(ErrorKind::Api).with_source(error)
    }
}

impl From<UnexpectedResponseError> for Error {
    fn from(error: UnexpectedResponseError) -> Self {
        Self::new(ErrorKind::Protocol).with_source(error)
    }
}

#[cfg(feature = "tokio-tungstenite")]
impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::new(ErrorKind::Connection).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_in_source_chain() {
        let api_error = ApiError {
            error_id: ErrorId::REQUEST_REQUIRES_AUTHENTICATION,
            message: "not authenticated".to_owned(),
        };

        let error = Error::from(api_error);

        assert_eq!(error.kind(), &ErrorKind::Api);
        assert!(error.is_api_error());
        assert!(error.is_unauthenticated_error());
    }

    #[test]
    fn display_includes_source() {
        let error = Error::new(ErrorKind::Protocol).with_source(UnexpectedResponseError {
            expected: "AuthenticationTokenResponse".to_owned(),
            received: "APIError".to_owned(),
        });

        let text = error.to_string();
        assert!(text.starts_with("malformed or unexpected response"));
        assert!(text.contains("AuthenticationTokenResponse"));
    }
}
