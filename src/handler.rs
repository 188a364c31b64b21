//! Handler trait and type erasure.
//!
//! The middleware wraps "the next thing that handles the request" without
//! knowing its concrete type, so handlers are stored as trait objects
//! behind a common dispatch interface:
//!
//! ```text
//! async fn create_user(req: Request) -> Response { … }
//!        ↓ layer.wrap(create_user)
//! Arc::new(FnHandler(create_user))  stored as BoxedHandler
//!        ↓ per request
//! handler.call(req) → pinned boxed future → Response
//! ```
//!
//! Per-request cost is one `Arc` clone and one virtual call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response};

/// A heap-allocated, type-erased future resolving to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it leaks through
/// the public `Handler` trait's return type; external crates cannot do
/// anything useful with it.
#[doc(hidden)]
pub trait ErasedHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A shared, type-erased handler. `Arc` so concurrent requests dispatch to
/// the same instance without copying it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler>;

/// Implemented for every valid downstream handler.
///
/// You never implement this yourself — it is automatically satisfied for
/// any `async fn(Request) -> Response` (and for the middleware's own
/// [`ValidationHandler`](crate::ValidationHandler), so layers nest). The
/// trait is sealed: only the impls in this crate can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

pub(crate) mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete `Fn` handler into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin((self.0)(req))
    }
}
