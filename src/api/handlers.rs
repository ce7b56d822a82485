//! API Handlers
//!
//! Terminal handlers for the user-directory routes. Every failure is
//! returned as a [`Response`]; nothing here panics or propagates a fault.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::directory::{NewUser, UserDirectory, UserUpdate};
use crate::error::{PipelineError, Result};
use crate::models::{Request, Response};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User store
    pub users: Arc<RwLock<UserDirectory>>,
    /// Response cache for user lookups
    pub cache: Arc<TtlCache<Value>>,
    /// TTL of cached user lookups
    pub user_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState over the given directory and cache.
    pub fn new(users: UserDirectory, cache: TtlCache<Value>, user_ttl: Duration) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
            cache: Arc::new(cache),
            user_ttl,
        }
    }

    /// Creates an empty AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            UserDirectory::new(),
            TtlCache::new(config.default_ttl()),
            config.user_cache_ttl(),
        )
    }
}

/// Cache key for a single user lookup.
pub fn user_cache_key(id: u64) -> String {
    format!("user:{id}")
}

fn required_id(req: &Request) -> Result<u64> {
    req.arg("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| PipelineError::InvalidRequest("Field 'id' must be a positive integer".into()))
}

fn parse_payload<T: serde::de::DeserializeOwned>(req: &Request) -> Result<T> {
    serde_json::from_value(req.payload.clone())
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))
}

/// Handler for GET /users
///
/// Payload `{"active_only": bool}` is optional and defaults to true.
pub async fn list_users(state: AppState, req: Request) -> Response {
    let active_only = req.arg("active_only").and_then(Value::as_bool).unwrap_or(true);
    let users = state.users.read().await;
    Response::ok(json!(users.get_all(active_only)))
}

/// Handler for GET /users/by-id
///
/// Reads through the cache; the directory is consulted only on a miss.
pub async fn get_user(state: AppState, req: Request) -> Response {
    let id = match required_id(&req) {
        Ok(id) => id,
        Err(e) => return e.into(),
    };
    let key = user_cache_key(id);

    if let Some(cached) = state.cache.get(&key) {
        return Response::ok(cached);
    }

    let users = state.users.read().await;
    match users.get_by_id(id) {
        Some(user) => {
            let body = json!(user);
            state.cache.set_with_ttl(key, body.clone(), state.user_ttl);
            debug!(id, "user lookup cached");
            Response::ok(body)
        }
        None => PipelineError::NotFound(format!("User {id} not found")).into(),
    }
}

/// Handler for POST /users
pub async fn create_user(state: AppState, req: Request) -> Response {
    let data: NewUser = match parse_payload(&req) {
        Ok(data) => data,
        Err(e) => return e.into(),
    };

    let mut users = state.users.write().await;
    match users.create(data) {
        Ok(user) => Response::created(json!(user)),
        Err(e) => e.into(),
    }
}

/// Handler for PUT /users
///
/// Payload carries `id` plus the fields to change.
pub async fn update_user(state: AppState, req: Request) -> Response {
    let parsed = required_id(&req).and_then(|id| Ok((id, parse_payload::<UserUpdate>(&req)?)));
    let (id, changes) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return e.into(),
    };

    let mut users = state.users.write().await;
    let result = users.update(id, changes);
    // Invalidated under the write lock
    state.cache.delete(&user_cache_key(id));

    match result {
        Ok(Some(user)) => Response::ok(json!(user)),
        Ok(None) => PipelineError::NotFound(format!("User {id} not found")).into(),
        Err(e) => e.into(),
    }
}

/// Handler for DELETE /users
pub async fn delete_user(state: AppState, req: Request) -> Response {
    let id = match required_id(&req) {
        Ok(id) => id,
        Err(e) => return e.into(),
    };

    let mut users = state.users.write().await;
    if !users.delete(id) {
        return PipelineError::NotFound(format!("User {id} not found")).into();
    }
    state.cache.delete(&user_cache_key(id));

    Response::ok(json!({ "deleted": id }))
}

/// Handler for GET /stats
pub async fn stats(state: AppState, _req: Request) -> Response {
    let users = state.users.read().await;
    Response::ok(json!({
        "cache": state.cache.stats(),
        "users": {
            "active": users.count(true),
            "total": users.count(false),
        },
    }))
}

/// Handler for GET /health
pub async fn health(_req: Request) -> Response {
    Response::ok(json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
