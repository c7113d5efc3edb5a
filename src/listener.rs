use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::mpsc;
use futures::{FutureExt, Stream, StreamExt, TryStream, TryStreamExt};
use hyper::server::conn::Http;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Sleep;

use crate::event::EventNotification;
use crate::service::{Config, Service};

/// Time to wait before accepting again after `incoming` yields an error.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// A `Stream` of event notifications whose signature has been verified.
///
/// The listener serves HTTP connections accepted from `incoming` as it is polled, so you need to
/// keep polling it even if you aren't interested in the notifications.
pub struct Listener<I> {
    incoming: Option<I>,
    server: Http,
    rx: mpsc::UnboundedReceiver<EventNotification>,
    service: Service,
    backoff: Option<Pin<Box<Sleep>>>,
}

impl<I> Listener<I>
where
    I: TryStream + Unpin,
    I::Ok: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    I::Error: Display,
{
    pub fn new(incoming: I, config: Config) -> Self {
        let (tx, rx) = mpsc::unbounded();
        Listener {
            incoming: Some(incoming),
            server: Http::new(),
            rx,
            service: Service::new(config, tx),
            backoff: None,
        }
    }

    fn accept_all(&mut self, cx: &mut Context<'_>) {
        while let Some(incoming) = self.incoming.as_mut() {
            if let Some(backoff) = self.backoff.as_mut() {
                if backoff.poll_unpin(cx).is_pending() {
                    return;
                }
                self.backoff = None;
            }

            match incoming.try_poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(sock))) => {
                    let conn = self.server.serve_connection(sock, self.service.clone());
                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            log::debug!("Error while serving a connection: {}", e);
                        }
                    });
                }
                Poll::Ready(Some(Err(e))) => {
                    log::warn!("Failed to accept a connection: {}", e);
                    self.backoff = Some(Box::pin(tokio::time::sleep(ACCEPT_ERROR_BACKOFF)));
                }
                Poll::Ready(None) => {
                    log::debug!("No more incoming connections");
                    self.incoming = None;
                }
                Poll::Pending => break,
            }
        }
    }
}

impl<I> Stream for Listener<I>
where
    I: TryStream + Unpin,
    I::Ok: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    I::Error: Display,
{
    type Item = EventNotification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        log::trace!("Listener::poll_next");

        self.accept_all(cx);
        self.rx.poll_next_unpin(cx)
    }
}
