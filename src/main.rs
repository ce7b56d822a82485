//! Pipecache demo
//!
//! Builds the user-directory dispatcher and replays a scripted series of
//! requests through it, logging each response. There is no network
//! listener: requests are constructed in memory.

use std::sync::Arc;

use http::Method;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipecache::{create_dispatcher, spawn_cleanup_task, AppState, Config, Dispatcher, Request};

/// Main entry point for the pipeline demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create application state (user directory + cache)
/// 4. Start background TTL cleanup task
/// 5. Build the dispatcher and replay the demo requests
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pipecache demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, cleanup_interval={}s, user_cache_ttl={}s",
        config.default_ttl, config.cleanup_interval, config.user_cache_ttl
    );

    let state = AppState::from_config(&config);
    let cleanup_handle = spawn_cleanup_task(Arc::clone(&state.cache), config.cleanup_interval());
    info!("Background cleanup task started");

    let dispatcher = create_dispatcher(state.clone(), &config);
    info!("Dispatcher ready with {} routes", dispatcher.len());

    run_script(&dispatcher, &config.auth_scheme).await?;

    cleanup_handle.abort();
    info!("Demo complete");
    Ok(())
}

/// Sends each demo request and logs the flattened response.
async fn run_script(dispatcher: &Dispatcher, scheme: &str) -> anyhow::Result<()> {
    let token = format!("{scheme}demo-token");
    let authed = || Request::new().with_header("Authorization", token.as_str());

    let script = vec![
        (Method::GET, "/health", Request::new()),
        (Method::GET, "/users", Request::new()),
        (
            Method::GET,
            "/users",
            Request::new().with_header("Authorization", "Basic Zm9vOmJhcg=="),
        ),
        (
            Method::POST,
            "/users",
            authed().with_payload(json!({"username": "ada", "email": "ada@example.com"})),
        ),
        (
            Method::POST,
            "/users",
            authed().with_payload(json!({"username": "ada2", "email": "ada@example.com"})),
        ),
        (Method::GET, "/users/by-id", authed().with_payload(json!({"id": 1}))),
        (Method::GET, "/users/by-id", authed().with_payload(json!({"id": 1}))),
        (
            Method::PUT,
            "/users",
            authed().with_payload(json!({"id": 1, "role": "admin"})),
        ),
        (Method::GET, "/unknown", Request::new()),
        (Method::GET, "/stats", Request::new()),
    ];

    for (method, path, req) in script {
        let resp = dispatcher.handle(&method, path, req).await;
        info!("{} {} -> {}", method, path, serde_json::to_string(&resp.to_json())?);
    }

    Ok(())
}
