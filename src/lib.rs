//! A receiver for the webhooks of the WhatsApp Cloud API.
//!
//! The platform calls a webhook endpoint in two ways:
//!
//! - a `GET` verification request when you configure the webhook, handled by [`register`],
//! - `POST` event notifications afterwards, handled by [`event_notification`].
//!
//! Both operations take an [`IncomingRequest`] so that they can be used from any HTTP stack.
//! [`Service`] and [`Listener`] put them together on top of `hyper`.

#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod listener;
pub mod notification;
pub mod registration;
pub mod request;
pub mod service;
pub mod signature;

mod util;

pub use error::{Error, ErrorKind, WebhookError};
pub use event::EventNotification;
pub use listener::Listener;
pub use notification::{event_notification, event_notification_as, EventNotificationOutcome};
pub use registration::{register, Registration};
pub use request::IncomingRequest;
pub use service::{Config, Service};
