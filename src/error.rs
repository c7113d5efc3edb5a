use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use http::StatusCode;

/// The kind of a [`WebhookError`].
///
/// Each kind corresponds to exactly one validation rule of [`register`](crate::register) or
/// [`event_notification`](crate::event_notification).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request used a method other than the one the operation expects.
    IncorrectMethod,
    /// `hub.mode` is missing or is not `subscribe`.
    InvalidHubMode,
    /// `hub.challenge` is missing or empty.
    InvalidHubChallenge,
    /// `hub.verify_token` is missing or empty.
    InvalidHubVerifyToken,
    /// `x-hub-signature-256` is missing, or the signature doesn't match the body.
    InvalidHubSignature,
    /// The event notification has no body.
    MissingBody,
}

/// A request that failed the webhook validation rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct WebhookError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

/// Error returned by [`event_notification`](crate::event_notification).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    /// The body is not a valid event notification.
    #[error("failed to deserialize the event notification")]
    Deserialize(#[source] serde_json::Error),
}

impl ErrorKind {
    /// The HTTP status code a receiver typically responds with.
    ///
    /// Note that a body failing [`verify_signature`] is better answered with
    /// `403 Forbidden`, which the kind alone cannot tell apart from a missing header.
    ///
    /// [`verify_signature`]: crate::EventNotificationOutcome::verify_signature
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::IncorrectMethod => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::InvalidHubMode
            | ErrorKind::InvalidHubChallenge
            | ErrorKind::InvalidHubVerifyToken
            | ErrorKind::InvalidHubSignature
            | ErrorKind::MissingBody => StatusCode::BAD_REQUEST,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::IncorrectMethod => "incorrect method",
            ErrorKind::InvalidHubMode => "invalid hub.mode",
            ErrorKind::InvalidHubChallenge => "invalid hub.challenge",
            ErrorKind::InvalidHubVerifyToken => "invalid hub.verify_token",
            ErrorKind::InvalidHubSignature => "invalid hub signature",
            ErrorKind::MissingBody => "missing body",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WebhookError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        WebhookError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ErrorKind> for WebhookError {
    fn from(kind: ErrorKind) -> Self {
        WebhookError::new(kind, kind.as_str())
    }
}

impl Error {
    /// Returns the kind of the validation failure, or `None` if the body failed to deserialize.
    pub fn kind(&self) -> Option<ErrorKind> {
        match *self {
            Error::Webhook(ref e) => Some(e.kind()),
            Error::Deserialize(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialize(e)
    }
}
