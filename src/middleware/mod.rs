//! Middleware layer.
//!
//! A middleware interposes between route resolution and handler execution.
//! It receives the request plus a [`Next`] continuation; calling the
//! continuation runs the matched handler, while returning a response without
//! calling it short-circuits the handler entirely:
//!
//! ```rust,no_run
//! use wyrm::{Next, Request, Response, Router, Status};
//!
//! let app = Router::new().wrap("/admin", |req: Request, next: Next| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(Status::Unauthorized);
//!     }
//!     next(req).await
//! });
//! ```
//!
//! Middleware patterns follow the same segment-count and `:name` wildcard
//! rules as routes, but are method-agnostic. At most **one** middleware fires
//! per request — the first structurally matching entry in registration order,
//! not a chain of every match. See DESIGN.md for the rationale.

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::IntoResponse;

/// The continuation that proceeds to the matched handler.
///
/// Consumed on use: a middleware either invokes it once or drops it.
pub type Next = Box<dyn FnOnce(Request) -> BoxFuture + Send + 'static>;

/// Wraps a resolved handler as the continuation handed to a middleware.
pub(crate) fn continuation(handler: BoxedHandler) -> Next {
    Box::new(move |req| handler.call(req))
}

/// Internal dispatch interface, the middleware twin of `ErasedHandler`.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A heap-allocated, type-erased middleware shared across concurrent requests.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware function.
///
/// Automatically satisfied for any `Fn` with the signature:
///
/// ```text
/// async fn name(req: Request, next: Next) -> impl IntoResponse
/// ```
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

/// Bridges a concrete middleware `F` into the trait-object world.
struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}
