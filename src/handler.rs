//! Controller methods behind one trait object.
//!
//! Every declared method has its own closure type. `HandlerDescriptor::new`
//! boxes it into a [`BoxedHandler`] so route entries can hold them uniformly;
//! the success value is converted with [`IntoResponse`] inside the boxed
//! future, leaving only `Result<Response, Fault>` for dispatch to inspect.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::app::Context;
use crate::error::Fault;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to a response or a fault.
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Fault>> + Send + 'static>>;

/// Object-safe view of a handler, used by dispatch.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Context, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Any `async fn(Context, Request) -> Result<impl IntoResponse, Fault>` or
/// equivalent closure. Sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Fault>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Fault>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Context, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Fault>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, ctx: Context, req: Request) -> BoxFuture {
        let fut = (self.0)(ctx, req);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
