use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{ready, Future};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{Request, Response, StatusCode};
use http_body::Body as HttpBody;
use hyper::Body;
use pin_project::pin_project;

use crate::error::ErrorKind;
use crate::event::EventNotification;
use crate::notification;
use crate::registration;
use crate::request::IncomingRequest;
use crate::util::consts::TEXT_PLAIN;
use crate::util::{CollectBody, CollectError};

/// Default value of [`Config::max_body_size`].
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Credentials of the app the webhook is registered for.
#[derive(Clone, Debug)]
pub struct Config {
    /// Token you entered when configuring the webhook in the App Dashboard.
    pub verify_token: String,
    /// App secret used to sign event notifications.
    pub app_secret: String,
    /// Requests with a larger body are rejected with `413 Payload Too Large`.
    pub max_body_size: usize,
}

/// A `tower_service::Service` answering both the verification requests and the event
/// notifications.
///
/// Notifications whose signature verifies are sent to the channel given to [`Service::new`].
#[derive(Clone)]
pub struct Service {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    tx: mpsc::UnboundedSender<EventNotification>,
}

#[pin_project]
pub struct ResponseFuture<B> {
    #[pin]
    body: CollectBody<B>,
    parts: Option<Parts>,
    inner: Arc<Inner>,
}

impl Config {
    pub fn new(verify_token: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Config {
            verify_token: verify_token.into(),
            app_secret: app_secret.into(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl Service {
    pub fn new(config: Config, tx: mpsc::UnboundedSender<EventNotification>) -> Self {
        Service {
            inner: Arc::new(Inner { config, tx }),
        }
    }
}

impl Inner {
    fn call(&self, parts: &Parts, body: Bytes) -> Response<Body> {
        let req = IncomingRequest::from_parts(parts, body);
        if req.method_is("GET") {
            self.register(&req)
        } else {
            self.event_notification(&req)
        }
    }

    fn register(&self, req: &IncomingRequest) -> Response<Body> {
        match registration::register(req) {
            Ok(reg) if reg.verify_token_matches(&self.config.verify_token) => {
                log::info!("Verified the webhook subscription");
                let mut res = Response::new(Body::from(reg.accept().to_owned()));
                res.headers_mut().insert(CONTENT_TYPE, TEXT_PLAIN);
                res
            }
            Ok(reg) => {
                log::debug!("Verification request: verify token mismatch");
                status(StatusCode::FORBIDDEN, reg.reject())
            }
            Err(e) => {
                log::debug!("Verification request: {}", e);
                status(e.kind().status_code(), "")
            }
        }
    }

    fn event_notification(&self, req: &IncomingRequest) -> Response<Body> {
        let outcome = match notification::event_notification(req) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::debug!("Event notification: {}", e);
                let code = e
                    .kind()
                    .map_or(StatusCode::BAD_REQUEST, ErrorKind::status_code);
                return status(code, "");
            }
        };

        if let Err(e) = outcome.verify_signature(&self.config.app_secret) {
            log::debug!("Event notification: {}", e);
            return status(StatusCode::FORBIDDEN, "");
        }

        let body = outcome.accept();
        if self
            .tx
            .unbounded_send(outcome.into_event_notification())
            .is_err()
        {
            log::debug!("Event notification: receiver has been dropped");
        }

        Response::new(Body::from(body))
    }
}

impl<B: HttpBody> Future for ResponseFuture<B> {
    type Output = Result<Response<Body>, Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.body.poll(cx));
        let parts = this.parts.take().expect("polled after completion");

        let res = match result {
            Ok(body) => this.inner.call(&parts, body),
            Err(e) => {
                log::debug!("{} {}: {}", parts.method, parts.uri.path(), e);
                match e {
                    CollectError::TooLarge(_) => status(StatusCode::PAYLOAD_TOO_LARGE, ""),
                    CollectError::Body(_) => status(StatusCode::BAD_REQUEST, ""),
                }
            }
        };

        Poll::Ready(Ok(res))
    }
}

impl<B: HttpBody> tower_service::Service<Request<B>> for Service {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = ResponseFuture<B>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        log::trace!("Service::call; req.uri()={:?}", req.uri());
        let (parts, body) = req.into_parts();
        ResponseFuture {
            body: CollectBody::new(body, self.inner.config.max_body_size),
            parts: Some(parts),
            inner: self.inner.clone(),
        }
    }
}

fn status(code: StatusCode, body: &'static str) -> Response<Body> {
    let mut res = Response::new(Body::from(body));
    *res.status_mut() = code;
    res
}
