//! Request dispatcher.
//!
//! One table per HTTP method, exact path match. The dispatcher holds no
//! middleware of its own: chains are composed in front of handlers with
//! [`MiddlewareChain::then`](crate::middleware::MiddlewareChain::then)
//! before they are registered.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info_span, Instrument};

use crate::api::handler::{BoxedHandler, Handler};
use crate::error::{PipelineError, Result};
use crate::models::{Request, Response};

/// Maps `(method, path)` to a handler.
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<Method, HashMap<String, BoxedHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. Returns `self` for chaining.
    ///
    /// # Panics
    /// If the method and path are already registered.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        if let Err(e) = self.try_route(method, path, handler) {
            panic!("{e}");
        }
        self
    }

    /// Registers a handler, failing if the method and path are taken.
    pub fn try_route(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<()> {
        let table = self.routes.entry(method.clone()).or_default();
        if table.contains_key(path) {
            return Err(PipelineError::DuplicateRoute(format!("{method} {path}")));
        }
        table.insert(path.to_string(), handler.into_boxed_handler());
        Ok(())
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.lookup(method, path).is_some()
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<BoxedHandler> {
        self.routes.get(method)?.get(path).map(Arc::clone)
    }

    /// Runs the handler for `method` and `path`, or answers 404.
    pub async fn handle(&self, method: &Method, path: &str, req: Request) -> Response {
        let Some(handler) = self.lookup(method, path) else {
            debug!(%method, path, "no route");
            return Response::not_found();
        };

        handler
            .call(req)
            .instrument(info_span!("dispatch", %method, path))
            .await
    }

    /// Like [`Dispatcher::handle`], taking the method as text (`"GET"`).
    ///
    /// A method that does not parse cannot match any route and gets a 404.
    pub async fn handle_raw(&self, method: &str, path: &str, req: Request) -> Response {
        match method.parse::<Method>() {
            Ok(method) => self.handle(&method, path, req).await,
            Err(_) => {
                debug!(method, path, "unparseable method");
                Response::not_found()
            }
        }
    }
}
