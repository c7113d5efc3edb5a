use subtle::ConstantTimeEq;

use crate::error::{ErrorKind, WebhookError};
use crate::request::IncomingRequest;

/// A validated subscription verification request.
///
/// Comparing [`verify_token`](Self::verify_token) against the token you configured for the app is
/// up to you. Respond with [`accept`](Self::accept) if it matches, [`reject`](Self::reject)
/// otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    verify_token: String,
    challenge: String,
}

/// Validates a subscription verification request (`GET` with `hub.mode=subscribe`).
///
/// The conditions are checked in the following order and the first one violated determines the
/// error:
///
/// 1. The method is `GET` (case-insensitive), or else [`ErrorKind::IncorrectMethod`].
/// 2. `hub.mode` is `subscribe`, or else [`ErrorKind::InvalidHubMode`].
/// 3. `hub.challenge` is non-empty, or else [`ErrorKind::InvalidHubChallenge`].
/// 4. `hub.verify_token` is non-empty, or else [`ErrorKind::InvalidHubVerifyToken`].
pub fn register(request: &IncomingRequest) -> Result<Registration, WebhookError> {
    if !request.method_is("GET") {
        return Err(WebhookError::new(
            ErrorKind::IncorrectMethod,
            "Webhook Registration Requests must use the GET request method",
        ));
    }

    if request.non_empty_query("hub.mode") != Some("subscribe") {
        return Err(WebhookError::new(
            ErrorKind::InvalidHubMode,
            "Webhook Registration Request must have query parameter: hub.mode=subscribe",
        ));
    }

    let challenge = request.non_empty_query("hub.challenge").ok_or_else(|| {
        WebhookError::new(
            ErrorKind::InvalidHubChallenge,
            "Webhook Registration Request must have query parameter: hub.challenge",
        )
    })?;

    let verify_token = request.non_empty_query("hub.verify_token").ok_or_else(|| {
        WebhookError::new(
            ErrorKind::InvalidHubVerifyToken,
            "Webhook Registration Request must have query parameter: hub.verify_token",
        )
    })?;

    Ok(Registration {
        verify_token: verify_token.to_owned(),
        challenge: challenge.to_owned(),
    })
}

impl Registration {
    pub fn verify_token(&self) -> &str {
        &self.verify_token
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Compares the received verify token with `expected` in constant time.
    pub fn verify_token_matches(&self, expected: &str) -> bool {
        self.verify_token
            .as_bytes()
            .ct_eq(expected.as_bytes())
            .into()
    }

    /// Body of the response confirming the subscription: the challenge, verbatim.
    pub fn accept(&self) -> &str {
        &self.challenge
    }

    /// Body of the response refusing the subscription.
    pub fn reject(&self) -> &'static str {
        ""
    }
}
