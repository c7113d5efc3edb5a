use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, BufMut, Bytes};
use futures::{ready, Future};
use http_body::Body;
use pin_project::pin_project;

/// Reads an HTTP body to the end, failing once it grows past `limit` bytes.
#[pin_project]
pub struct CollectBody<B> {
    #[pin]
    body: B,
    limit: usize,
    state: State,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError<E> {
    #[error("failed to read request body")]
    Body(#[source] E),
    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),
}

enum State {
    Init,
    Once(Bytes),
    Streaming(Vec<u8>),
}

impl State {
    fn len(&self) -> usize {
        match *self {
            State::Init => 0,
            State::Once(ref buf) => buf.len(),
            State::Streaming(ref buf) => buf.len(),
        }
    }
}

impl<B: Body> CollectBody<B> {
    pub fn new(body: B, limit: usize) -> Self {
        CollectBody {
            body,
            limit,
            state: State::Init,
        }
    }
}

impl<B: Body> Future for CollectBody<B> {
    type Output = Result<Bytes, CollectError<B::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if this.body.size_hint().lower() > *this.limit as u64 {
            return Poll::Ready(Err(CollectError::TooLarge(*this.limit)));
        }

        while let Some(data) = ready!(this.body.as_mut().poll_data(cx)) {
            let mut data = data.map_err(CollectError::Body)?;
            if this.state.len() + data.remaining() > *this.limit {
                *this.state = State::Init;
                return Poll::Ready(Err(CollectError::TooLarge(*this.limit)));
            }
            match *this.state {
                State::Init => *this.state = State::Once(data.copy_to_bytes(data.remaining())),
                State::Once(ref mut first) => {
                    let mut buf = Vec::with_capacity(first.remaining() + data.remaining());
                    buf.put(first);
                    buf.put(data);
                    *this.state = State::Streaming(buf);
                }
                State::Streaming(ref mut buf) => buf.put(data),
            }
        }

        match mem::replace(this.state, State::Init) {
            State::Init => Poll::Ready(Ok(Bytes::new())),
            State::Once(buf) => Poll::Ready(Ok(buf)),
            State::Streaming(buf) => Poll::Ready(Ok(buf.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::stream;
    use tokio_test::{assert_pending, assert_ready_err, assert_ready_ok};

    use super::*;

    fn chunked(chunks: Vec<&'static str>) -> hyper::Body {
        let chunks = chunks
            .into_iter()
            .map(|c| Ok::<_, Infallible>(Bytes::from_static(c.as_bytes())));
        hyper::Body::wrap_stream(stream::iter(chunks))
    }

    #[tokio::test]
    async fn concatenates_chunks() {
        let body = CollectBody::new(chunked(vec!["{\"object\":", "\"page\"", "}"]), 64);
        assert_eq!(body.await.unwrap(), "{\"object\":\"page\"}");

        let body = CollectBody::new(hyper::Body::from("single"), 64);
        assert_eq!(body.await.unwrap(), "single");

        let body = CollectBody::new(hyper::Body::empty(), 64);
        assert_eq!(body.await.unwrap(), "");
    }

    #[tokio::test]
    async fn too_large() {
        let body = CollectBody::new(hyper::Body::from("0123456789"), 9);
        assert!(matches!(body.await, Err(CollectError::TooLarge(9))));

        let body = CollectBody::new(chunked(vec!["01234", "56789"]), 9);
        assert!(matches!(body.await, Err(CollectError::TooLarge(9))));

        let body = CollectBody::new(chunked(vec!["01234", "56789"]), 10);
        assert_eq!(body.await.unwrap(), "0123456789");
    }

    #[tokio::test]
    async fn waits_for_the_end_of_body() {
        let (mut tx, body) = hyper::Body::channel();
        let mut task = tokio_test::task::spawn(CollectBody::new(body, 64));

        assert_pending!(task.poll());
        tx.send_data(Bytes::from_static(b"abc")).await.unwrap();
        assert!(task.is_woken());
        assert_pending!(task.poll());

        drop(tx);
        assert_eq!(assert_ready_ok!(task.poll()), "abc");
    }

    #[tokio::test]
    async fn body_error() {
        let (tx, body) = hyper::Body::channel();
        let mut task = tokio_test::task::spawn(CollectBody::new(body, 64));

        assert_pending!(task.poll());
        tx.abort();
        assert!(matches!(
            assert_ready_err!(task.poll()),
            CollectError::Body(_)
        ));
    }
}
