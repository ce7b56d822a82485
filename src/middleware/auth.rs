//! Authentication middleware
//!
//! Checks the `Authorization` header. The credential check itself is a
//! pluggable [`TokenVerifier`]; the default only checks the scheme prefix.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use super::{BoxFuture, Flow, Middleware, Next};
use crate::models::request::AUTHORIZATION;
use crate::models::{Request, Response};

/// Scheme prefix accepted by [`SchemePrefix::default`]
pub const DEFAULT_SCHEME: &str = "Bearer ";

// == Token Verifier ==
/// Decides whether a credential is acceptable.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> bool;
}

/// Accepts any token that starts with a fixed scheme, e.g. `"Bearer "`.
///
/// This is a syntactic check only.
#[derive(Debug, Clone)]
pub struct SchemePrefix {
    prefix: String,
}

impl SchemePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for SchemePrefix {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}

impl TokenVerifier for SchemePrefix {
    fn verify(&self, token: &str) -> bool {
        token.starts_with(&self.prefix)
    }
}

// == Auth Middleware ==
/// Rejects requests without an acceptable credential.
///
/// - no `Authorization` header: `401 Unauthorized`
/// - header present but rejected by the verifier: `403 Forbidden`
/// - otherwise the request is forwarded untouched
#[derive(Clone)]
pub struct AuthMiddleware {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthMiddleware {
    /// Auth with the default `"Bearer "` prefix check.
    pub fn new() -> Self {
        Self::with_verifier(SchemePrefix::default())
    }

    pub fn with_verifier(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    fn check(&self, req: &Request) -> Option<Response> {
        let Some(token) = req.header(AUTHORIZATION).filter(|t| !t.is_empty()) else {
            warn!("rejected request: missing credential");
            return Some(Response::error(StatusCode::UNAUTHORIZED, "Unauthorized"));
        };

        if !self.verifier.verify(token) {
            warn!("rejected request: invalid credential");
            return Some(Response::error(StatusCode::FORBIDDEN, "Invalid token"));
        }

        None
    }
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for AuthMiddleware {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
        if let Some(rejection) = self.check(&req) {
            return Box::pin(async move { Flow::Terminate(rejection) });
        }

        debug!("credential accepted");
        next.run(req)
    }
}
