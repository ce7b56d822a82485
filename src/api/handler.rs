//! Handler trait and type erasure.
//!
//! The dispatcher stores handlers of different concrete types in one table,
//! so each one is wrapped behind the object-safe [`ErasedHandler`] and kept
//! as a shared [`BoxedHandler`].
//!
//! ```text
//! async fn list_users(req: Request) -> Response { … }
//!        ↓ dispatcher.route(Method::GET, "/users", list_users)
//! list_users.into_boxed_handler()      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(list_users))      ← stored as BoxedHandler
//!        ↓
//! handler.call(req)                    ← one virtual call per request
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::middleware::BoxFuture;
use crate::models::{Request, Response};

// == Erased Handler ==
/// Object-safe dispatch interface.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// == Handler ==
/// Implemented for every valid route handler: any
/// `Fn(Request) -> impl Future<Output = Response>` that is `Send + Sync`.
pub trait Handler: Send + Sync + 'static {
    fn into_boxed_handler(self) -> BoxedHandler;
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

/// Bridges a concrete handler function to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        Box::pin((self.0)(req))
    }
}
