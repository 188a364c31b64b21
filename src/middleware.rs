//! The request interceptor.
//!
//! [`ValidationLayer`] derives the schema once from its configuration;
//! [`ValidationLayer::wrap`] puts that gate in front of a downstream
//! handler. Per request the handler either short-circuits with the fixed
//! rejection envelope or forwards the request with the validated bytes
//! attached — nothing else.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::config::Config;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::validator::BodyValidator;
use crate::{Request, Response};

/// Extensions key for the validated payload. Private, so the only way to
/// the value from outside the crate is [`validated_payload`].
#[derive(Clone)]
struct ValidatedPayload(Bytes);

/// Returns the raw bytes the middleware validated for this request.
///
/// `None` when body validation was skipped for this request (no reference
/// shape configured, validation disabled, or an absent optional body).
/// `Bytes` is refcounted — this is the same buffer the schema evaluated,
/// not a copy or a re-encoding.
pub fn validated_payload<B>(req: &http::Request<B>) -> Option<Bytes> {
    req.extensions()
        .get::<ValidatedPayload>()
        .map(|payload| payload.0.clone())
}

const REJECTION_CODE: &str = "body.validation.failure";

/// Field order is part of the wire contract: code first, then errors.
#[derive(Serialize)]
struct RejectionBody<'a> {
    code: &'static str,
    errors: &'a [String],
}

/// Builds the validation gate: one configuration, one derived schema,
/// shared by every handler it wraps.
///
/// ```rust
/// use torii::{Config, FieldKind, ReferenceShape, RequestValidationConfig, ValidationLayer};
/// # use http_body_util::Full;
/// # async fn create_user(_req: torii::Request) -> torii::Response {
/// #     http::Response::new(Full::new(bytes::Bytes::new()))
/// # }
///
/// let layer = ValidationLayer::new(
///     Config::builder()
///         .request_validation(
///             RequestValidationConfig::builder()
///                 .reference_shape(ReferenceShape::new().field("name", FieldKind::String))
///                 .build(),
///         )
///         .build(),
/// );
/// let create_user = layer.wrap(create_user);
/// ```
pub struct ValidationLayer {
    validator: Arc<BodyValidator>,
}

impl ValidationLayer {
    /// Freezes `config` and derives its schema. Derivation happens here and
    /// never again — not per request, not per wrapped handler.
    pub fn new(config: Config) -> Self {
        Self { validator: Arc::new(BodyValidator::new(config)) }
    }

    /// Puts the gate in front of `next`.
    pub fn wrap(&self, next: impl Handler) -> ValidationHandler {
        ValidationHandler {
            validator: Arc::clone(&self.validator),
            next: next.into_boxed_handler(),
        }
    }
}

/// A downstream handler guarded by body validation.
///
/// `Clone` is two `Arc` clones; instances are immutable and safe to call
/// concurrently — per-request state never leaves [`handle`](Self::handle).
#[derive(Clone)]
pub struct ValidationHandler {
    validator: Arc<BodyValidator>,
    next: BoxedHandler,
}

impl ValidationHandler {
    /// Processes one request: validate, then reject or forward.
    pub async fn handle(&self, mut req: Request) -> Response {
        let outcome = self.validator.validate(&mut req).await;

        if !outcome.is_valid {
            return rejection(&outcome.errors);
        }

        if let Some(payload) = outcome.validated_value {
            req.extensions_mut().insert(ValidatedPayload(payload));
        }
        self.next.call(req).await
    }
}

impl private::Sealed for ValidationHandler {}

/// Wrapped handlers are themselves handlers, so gates nest under other
/// middleware.
impl Handler for ValidationHandler {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl ErasedHandler for ValidationHandler {
    fn call(&self, req: Request) -> BoxFuture {
        let handler = self.clone();
        Box::pin(async move { handler.handle(req).await })
    }
}

/// The fixed-shape rejection: always `400`, always this JSON envelope.
///
/// An encode fault cannot change the already-decided status; it is logged
/// and the 400 goes out with an empty body.
fn rejection(errors: &[String]) -> Response {
    let bytes = match serde_json::to_vec(&RejectionBody { code: REJECTION_CODE, errors }) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            error!("could not encode validation rejection: {e}");
            Bytes::new()
        }
    };

    let mut response = http::Response::new(Full::new(bytes));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
