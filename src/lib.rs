//! # torii
//!
//! Fail-fast JSON request-body validation for hyper services.
//! One gate in front of your handler. Nothing more.
//!
//! ## The contract
//!
//! You declare the shape a request body must have. torii derives a JSON
//! Schema from that shape **once**, at construction, and checks every
//! request against it before your handler runs. Requests that don't match
//! never reach application logic — they get a fixed `400` envelope:
//!
//! ```json
//! {"code":"body.validation.failure","errors":["..."]}
//! ```
//!
//! Requests that do match are forwarded with the exact validated bytes
//! attached to the request, so your handler never re-reads the stream to
//! get what was already checked.
//!
//! What torii intentionally ignores:
//!
//! - **Routing** — bring your own router; torii wraps one handler
//! - **Body-size limits** — `client_max_body_size` in nginx
//! - **Content negotiation** — the rejection is always JSON
//! - **Non-JSON payloads** — one document format, checked structurally
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use torii::{
//!     Config, FieldKind, ReferenceShape, Request, RequestValidationConfig,
//!     Response, ValidationLayer, validated_payload,
//! };
//! use http_body_util::Full;
//!
//! async fn create_user(req: Request) -> Response {
//!     // The raw bytes that passed validation — no second body read.
//!     let payload = validated_payload(&req).unwrap_or_default();
//!     http::Response::new(Full::new(payload))
//! }
//!
//! let shape = ReferenceShape::new()
//!     .field("name", FieldKind::String)
//!     .optional("nickname", FieldKind::String);
//!
//! let config = Config::builder()
//!     .request_validation(
//!         RequestValidationConfig::builder()
//!             .reference_shape(shape)
//!             .build(),
//!     )
//!     .build();
//!
//! let create_user = ValidationLayer::new(config).wrap(create_user);
//! // hand `create_user` a Request per call: create_user.handle(req).await
//! ```

mod body;
mod config;
mod handler;
mod middleware;
mod schema;
mod validator;

pub use body::PayloadBody;
pub use config::{
    Config, ConfigBuilder, RequestValidationConfig, RequestValidationConfigBuilder,
};
pub use handler::Handler;
pub use middleware::{ValidationHandler, ValidationLayer, validated_payload};
pub use schema::{FieldKind, ReferenceShape};

/// An incoming request as the middleware sees it.
pub type Request = http::Request<PayloadBody>;

/// An outgoing response: status, headers, and a fully buffered body.
pub type Response = http::Response<http_body_util::Full<bytes::Bytes>>;
