//! Request-body stream abstraction and the one place it gets read.
//!
//! A hyper request body can be consumed exactly once. Validation needs to
//! consume it, and the downstream handler usually wants it too. The deal:
//! [`read_payload`] collects the stream into [`Bytes`] and, when the
//! middleware is configured to preserve the payload, puts a buffered body
//! holding the same bytes back on the request. One read here never costs
//! downstream its read. This is a data-copy mechanism, not a concurrency
//! mechanism — the body is owned by the single in-flight request.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Frame, Incoming};

use crate::Request;

/// The request-body type the middleware operates on.
///
/// Three states, one per lifecycle stage:
///
/// - [`incoming`](PayloadBody::incoming) — a live hyper stream, not yet read
/// - [`buffered`](PayloadBody::buffered) — bytes already collected and
///   re-readable (what validation leaves behind in preserve mode, and what
///   tests construct directly)
/// - [`empty`](PayloadBody::empty) — exhausted; what a destructive read
///   leaves behind
pub enum PayloadBody {
    Incoming(Incoming),
    Buffered(Full<Bytes>),
    Empty,
}

impl PayloadBody {
    /// Wraps a hyper request body: `req.map(PayloadBody::incoming)`.
    pub fn incoming(body: Incoming) -> Self {
        Self::Incoming(body)
    }

    /// A re-readable body over already-collected bytes.
    pub fn buffered(bytes: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(bytes.into()))
    }

    /// An exhausted body. Collecting it yields zero bytes.
    pub fn empty() -> Self {
        Self::Empty
    }
}

impl Body for PayloadBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, hyper::Error>>> {
        // Every variant is Unpin, so the projection is a plain match.
        match self.get_mut() {
            Self::Incoming(inner) => Pin::new(inner).poll_frame(cx),
            Self::Buffered(inner) => Pin::new(inner)
                .poll_frame(cx)
                .map(|frame| frame.map(|result| result.map_err(|never| match never {}))),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Incoming(inner) => inner.is_end_stream(),
            Self::Buffered(inner) => inner.is_end_stream(),
            Self::Empty => true,
        }
    }
}

/// Consumes the request body into a single buffer.
///
/// With `preserve` set, the request gets an equivalent re-readable body
/// holding the same bytes (`Bytes` is refcounted — no second copy). Without
/// it, the request keeps an exhausted body and downstream reads yield
/// nothing — the documented trade-off for callers that never touch the raw
/// body again.
///
/// An absent or empty body collects to empty `Bytes`; distinguishing
/// "empty" from "missing-but-required" is the validator's call, not ours.
pub(crate) async fn read_payload(
    req: &mut Request,
    preserve: bool,
) -> Result<Bytes, hyper::Error> {
    let body = std::mem::replace(req.body_mut(), PayloadBody::Empty);
    let bytes = body.collect().await?.to_bytes();

    if preserve {
        *req.body_mut() = PayloadBody::buffered(bytes.clone());
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(body: PayloadBody) -> Request {
        http::Request::builder().body(body).unwrap()
    }

    #[tokio::test]
    async fn preserve_leaves_the_body_re_readable() {
        let mut req = request_with(PayloadBody::buffered(r#"{"name":"value"}"#));

        let read = read_payload(&mut req, true).await.unwrap();
        assert_eq!(read, Bytes::from(r#"{"name":"value"}"#));

        let second = req.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(second, read, "downstream read must see the exact same bytes");
    }

    #[tokio::test]
    async fn destructive_read_leaves_an_exhausted_body() {
        let mut req = request_with(PayloadBody::buffered(r#"{"name":"value"}"#));

        let read = read_payload(&mut req, false).await.unwrap();
        assert!(!read.is_empty());

        let second = req.into_body().collect().await.unwrap().to_bytes();
        assert!(second.is_empty(), "downstream read must yield zero bytes");
    }

    #[tokio::test]
    async fn empty_body_collects_to_empty_bytes() {
        let mut req = request_with(PayloadBody::empty());
        let read = read_payload(&mut req, true).await.unwrap();
        assert!(read.is_empty());
    }
}
