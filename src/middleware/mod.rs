//! Middleware Module
//!
//! Chain-of-responsibility request processing. Each middleware receives the
//! request and a [`Next`] cursor over the rest of the chain, and returns a
//! [`Flow`]: either the request to hand on, or a terminal response.
//!
//! ```text
//! request ─▶ Auth ─▶ Logging ─▶ handler
//!              │         ▲          │
//!              ▼         └──────────┘
//!         Terminate(401)   response flows back up
//! ```
//!
//! A middleware that returns without calling `next.run` short-circuits: no
//! downstream middleware and no handler runs.

mod auth;
mod logging;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::api::handler::{BoxedHandler, Handler};
use crate::models::{Request, Response};

pub use auth::{AuthMiddleware, SchemePrefix, TokenVerifier, DEFAULT_SCHEME};
pub use logging::LoggingMiddleware;

/// A heap-allocated, type-erased future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// == Flow ==
/// Outcome of running (part of) a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Every node forwarded and no handler was installed; carries the request
    Forward(Request),
    /// A node or the handler produced the final response
    Terminate(Response),
}

impl Flow {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Flow::Terminate(_))
    }

    /// Returns the response, if this flow terminated.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Flow::Terminate(resp) => Some(resp),
            Flow::Forward(_) => None,
        }
    }
}

// == Middleware Trait ==
/// A unit of request processing.
///
/// Implementations either return `Flow::Terminate` to stop the chain, or
/// call `next.run(req)` and return (or observe) its result.
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow>;
}

/// What runs once the node list of a [`Next`] is exhausted.
enum Tail<'a> {
    /// Hand the request back as `Flow::Forward`
    PassThrough,
    /// Run the terminal handler
    Endpoint(&'a BoxedHandler),
    /// Resume an enclosing chain (a chain nested inside another chain)
    Resume(Box<Next<'a>>),
}

// == Next ==
/// Cursor over the remainder of a chain.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
    tail: Tail<'a>,
}

impl<'a> Next<'a> {
    /// Whether anything other than a pass-through follows.
    pub fn is_last(&self) -> bool {
        self.rest.is_empty() && matches!(self.tail, Tail::PassThrough)
    }

    /// Invokes the next node, or the tail once nodes run out.
    pub fn run(self, req: Request) -> BoxFuture<'a, Flow> {
        let rest: &'a [Arc<dyn Middleware>] = self.rest;
        match rest.split_first() {
            Some((head, rest)) => head.handle(
                req,
                Next {
                    rest,
                    tail: self.tail,
                },
            ),
            None => match self.tail {
                Tail::PassThrough => Box::pin(async move { Flow::Forward(req) }),
                Tail::Endpoint(handler) => {
                    let fut = handler.call(req);
                    Box::pin(async move { Flow::Terminate(fut.await) })
                }
                Tail::Resume(outer) => outer.run(req),
            },
        }
    }
}

// == Middleware Chain ==
/// An ordered list of middleware, run in the order they were added.
///
/// A chain is itself a [`Middleware`], so chains nest.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Returns `self` for chaining.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Appends an already-shared middleware.
    pub fn with_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.layers.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Runs the chain with no handler behind it.
    ///
    /// Returns `Flow::Forward` with the request if every node forwarded.
    pub async fn process(&self, req: Request) -> Flow {
        Next {
            rest: &self.layers,
            tail: Tail::PassThrough,
        }
        .run(req)
        .await
    }

    /// Puts this chain in front of `handler`, producing a new handler.
    ///
    /// # Panics
    /// The returned handler panics if a middleware answers `Flow::Forward`
    /// without running the rest of the chain.
    pub fn then(self, handler: impl Handler) -> impl Handler {
        let layers: Arc<[Arc<dyn Middleware>]> = self.layers.into();
        let endpoint = handler.into_boxed_handler();

        move |req: Request| -> BoxFuture<'static, Response> {
            let layers = Arc::clone(&layers);
            let endpoint = Arc::clone(&endpoint);
            Box::pin(async move {
                let next = Next {
                    rest: &layers,
                    tail: Tail::Endpoint(&endpoint),
                };
                match next.run(req).await {
                    Flow::Terminate(resp) => resp,
                    Flow::Forward(_) => {
                        panic!("middleware forwarded a request without running the handler")
                    }
                }
            })
        }
    }
}

impl Middleware for MiddlewareChain {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
        Next {
            rest: &self.layers,
            tail: Tail::Resume(Box::new(next)),
        }
        .run(req)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use http::StatusCode;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Records entry and exit order into a shared log.
    pub(crate) struct Recorder {
        pub name: &'static str,
        pub log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
            Box::pin(async move {
                self.log.lock().push(format!("{}:before", self.name));
                let flow = next.run(req).await;
                self.log.lock().push(format!("{}:after", self.name));
                flow
            })
        }
    }

    /// Always rejects with 418.
    struct Teapot;

    impl Middleware for Teapot {
        fn handle<'a>(&'a self, _req: Request, _next: Next<'a>) -> BoxFuture<'a, Flow> {
            Box::pin(async { Flow::Terminate(Response::error(StatusCode::IM_A_TEAPOT, "no")) })
        }
    }

    /// Claims to forward but never calls `next`.
    struct Skipper;

    impl Middleware for Skipper {
        fn handle<'a>(&'a self, req: Request, _next: Next<'a>) -> BoxFuture<'a, Flow> {
            Box::pin(async move { Flow::Forward(req) })
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recorder {
        Recorder {
            name,
            log: log.clone(),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_forwards_request_unchanged() {
        let req = Request::new().with_payload(json!({"a": 1}));
        let flow = MiddlewareChain::new().process(req.clone()).await;
        assert_eq!(flow, Flow::Forward(req));
    }

    #[tokio::test]
    async fn test_chain_runs_in_assembly_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new()
            .with(recorder("a", &log))
            .with(recorder("b", &log));

        let flow = chain.process(Request::new()).await;

        assert!(!flow.is_terminal());
        assert_eq!(*log.lock(), ["a:before", "b:before", "b:after", "a:after"]);
    }

    #[tokio::test]
    async fn test_short_circuit_stops_downstream() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new()
            .with(recorder("outer", &log))
            .with(Teapot)
            .with(recorder("inner", &log));

        let flow = chain.process(Request::new()).await;

        assert_eq!(flow.into_response().map(|r| r.status), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(*log.lock(), ["outer:before", "outer:after"]);
    }

    #[tokio::test]
    async fn test_then_runs_handler_last() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler_log = log.clone();
        let handler = MiddlewareChain::new().with(recorder("a", &log)).then(move |req: Request| {
            let log = handler_log.clone();
            async move {
                log.lock().push("handler".to_string());
                Response::ok(req.payload)
            }
        });

        let resp = handler
            .into_boxed_handler()
            .call(Request::new().with_payload(json!({"x": true})))
            .await;

        assert_eq!(resp, Response::ok(json!({"x": true})));
        assert_eq!(*log.lock(), ["a:before", "handler", "a:after"]);
    }

    #[tokio::test]
    async fn test_nested_chain_splices_into_outer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner = MiddlewareChain::new()
            .with(recorder("i1", &log))
            .with(recorder("i2", &log));
        let outer = MiddlewareChain::new()
            .with(recorder("o1", &log))
            .with(inner)
            .with(recorder("o2", &log));

        outer.process(Request::new()).await;

        assert_eq!(
            *log.lock(),
            [
                "o1:before", "i1:before", "i2:before", "o2:before", "o2:after", "i2:after",
                "i1:after", "o1:after"
            ]
        );
    }

    #[tokio::test]
    async fn test_is_last() {
        struct AssertLast;
        impl Middleware for AssertLast {
            fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
                assert!(next.is_last());
                next.run(req)
            }
        }

        let flow = MiddlewareChain::new().with(AssertLast).process(Request::new()).await;
        assert!(!flow.is_terminal());
    }

    #[tokio::test]
    #[should_panic(expected = "without running the handler")]
    async fn test_forward_past_handler_fails_fast() {
        let handler = MiddlewareChain::new()
            .with(Skipper)
            .then(|_req: Request| async { Response::ok(json!({})) });

        handler.into_boxed_handler().call(Request::new()).await;
    }

    /// Rejects at a fixed position in the chain, otherwise forwards.
    struct Gate {
        reject: bool,
        index: usize,
        reached: Arc<Mutex<Vec<usize>>>,
    }

    impl Middleware for Gate {
        fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
            self.reached.lock().push(self.index);
            if self.reject {
                let resp = Response::error(StatusCode::FORBIDDEN, "gate");
                return Box::pin(async move { Flow::Terminate(resp) });
            }
            next.run(req)
        }
    }

    proptest::proptest! {
        // A request reaches node k+1 only if node k forwarded; the first
        // rejecting node decides the outcome.
        #[test]
        fn prop_short_circuit_stops_at_first_rejection(
            rejects in proptest::collection::vec(proptest::bool::weighted(0.3), 0..12)
        ) {
            let reached = Arc::new(Mutex::new(Vec::new()));
            let chain = rejects
                .iter()
                .enumerate()
                .fold(MiddlewareChain::new(), |chain, (index, reject)| {
                    chain.with(Gate { reject: *reject, index, reached: reached.clone() })
                });

            let flow = tokio_test::block_on(chain.process(Request::new()));

            let first_reject = rejects.iter().position(|r| *r);
            let expected: Vec<usize> = match first_reject {
                Some(k) => (0..=k).collect(),
                None => (0..rejects.len()).collect(),
            };
            proptest::prop_assert_eq!(&*reached.lock(), &expected);
            proptest::prop_assert_eq!(flow.is_terminal(), first_reject.is_some());
        }
    }
}
