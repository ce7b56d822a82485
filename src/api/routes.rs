//! API Routes
//!
//! Assembles the dispatcher: every `/users` route sits behind
//! `[Auth, Logging]`, while `/stats` and `/health` are open.

use std::future::Future;

use http::Method;

use super::dispatcher::Dispatcher;
use super::handler::Handler;
use super::handlers::{
    create_user, delete_user, get_user, health, list_users, stats, update_user, AppState,
};
use crate::config::Config;
use crate::middleware::{AuthMiddleware, LoggingMiddleware, MiddlewareChain, SchemePrefix};
use crate::models::{Request, Response};

/// Binds a state-taking handler to a clone of `state`.
fn with_state<F, Fut>(state: &AppState, f: F) -> impl Handler
where
    F: Fn(AppState, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let state = state.clone();
    move |req: Request| f(state.clone(), req)
}

/// The chain placed in front of protected routes.
pub fn protected_chain(config: &Config) -> MiddlewareChain {
    MiddlewareChain::new()
        .with(AuthMiddleware::with_verifier(SchemePrefix::new(
            config.auth_scheme.clone(),
        )))
        .with(LoggingMiddleware::new())
}

/// Creates the dispatcher with all routes registered.
pub fn create_dispatcher(state: AppState, config: &Config) -> Dispatcher {
    let protected = protected_chain(config);

    Dispatcher::new()
        .route(
            Method::GET,
            "/users",
            protected.clone().then(with_state(&state, list_users)),
        )
        .route(
            Method::GET,
            "/users/by-id",
            protected.clone().then(with_state(&state, get_user)),
        )
        .route(
            Method::POST,
            "/users",
            protected.clone().then(with_state(&state, create_user)),
        )
        .route(
            Method::PUT,
            "/users",
            protected.clone().then(with_state(&state, update_user)),
        )
        .route(
            Method::DELETE,
            "/users",
            protected.then(with_state(&state, delete_user)),
        )
        .route(Method::GET, "/stats", with_state(&state, stats))
        .route(Method::GET, "/health", health)
}
