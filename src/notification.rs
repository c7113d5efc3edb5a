use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, WebhookError};
use crate::event::EventNotification;
use crate::request::IncomingRequest;
use crate::signature;
use crate::util::consts::HUB_SIGNATURE_256;

/// A validated and parsed event notification.
///
/// The signature is not verified until you call [`check_signature`](Self::check_signature) or
/// [`verify_signature`](Self::verify_signature) with the app secret. Until then, you must not
/// trust the content.
#[derive(Clone, Debug)]
pub struct EventNotificationOutcome<T = EventNotification> {
    event_notification: T,
    raw_body: Bytes,
    signature: String,
}

/// Validates an event notification request and parses its body as an [`EventNotification`].
///
/// The conditions are checked in the following order and the first one violated determines the
/// error:
///
/// 1. The method is `POST` (case-insensitive), or else [`ErrorKind::IncorrectMethod`].
/// 2. The `x-hub-signature-256` header is present, or else [`ErrorKind::InvalidHubSignature`].
/// 3. The body is non-empty, or else [`ErrorKind::MissingBody`].
///
/// A body that fails to parse results in [`Error::Deserialize`].
pub fn event_notification(request: &IncomingRequest) -> Result<EventNotificationOutcome, Error> {
    event_notification_as(request)
}

/// Like [`event_notification`], but parses the body as `T` instead.
pub fn event_notification_as<T: DeserializeOwned>(
    request: &IncomingRequest,
) -> Result<EventNotificationOutcome<T>, Error> {
    if !request.method_is("POST") {
        return Err(WebhookError::new(
            ErrorKind::IncorrectMethod,
            "Webhook Event Notification Request must use the POST request method",
        )
        .into());
    }

    let signature = request
        .get_header(HUB_SIGNATURE_256)
        .map(signature::strip_prefix)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            WebhookError::new(
                ErrorKind::InvalidHubSignature,
                "Webhook Event Notification Request must have header: x-hub-signature-256",
            )
        })?;

    let raw_body = request.non_empty_body().ok_or_else(|| {
        WebhookError::new(
            ErrorKind::MissingBody,
            "Webhook Event Notification Request must have a body",
        )
    })?;

    let event_notification = serde_json::from_slice(raw_body)?;

    Ok(EventNotificationOutcome {
        event_notification,
        raw_body: raw_body.clone(),
        signature: signature.to_owned(),
    })
}

impl<T> EventNotificationOutcome<T> {
    pub fn event_notification(&self) -> &T {
        &self.event_notification
    }

    pub fn into_event_notification(self) -> T {
        self.event_notification
    }

    /// The body exactly as received.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// The hex digest sent by the platform, without the `sha256=` prefix.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns whether the signature sent with the notification matches the raw body.
    pub fn check_signature(&self, app_secret: impl AsRef<[u8]>) -> bool {
        signature::signatures_match(&self.signature, &self.raw_body, app_secret)
    }

    /// Like [`check_signature`](Self::check_signature), but fails with
    /// [`ErrorKind::InvalidHubSignature`] if the signature doesn't match.
    pub fn verify_signature(&self, app_secret: impl AsRef<[u8]>) -> Result<(), WebhookError> {
        if self.check_signature(app_secret) {
            Ok(())
        } else {
            Err(WebhookError::new(
                ErrorKind::InvalidHubSignature,
                "Webhook Event Notification Signature doesn't match received body",
            ))
        }
    }

    /// Body of the response acknowledging the notification.
    pub fn accept(&self) -> &'static str {
        ""
    }
}
