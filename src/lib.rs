//! Pipecache - a request pipeline with composable middleware and a TTL cache
//!
//! Requests enter a [`Dispatcher`], run through a [`MiddlewareChain`]
//! composed in front of their handler, and handlers may consult a
//! [`TtlCache`] to avoid recomputation.

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod models;
pub mod tasks;

pub use api::{create_dispatcher, AppState, Dispatcher, Handler};
pub use cache::{CacheStats, TtlCache};
pub use config::Config;
pub use error::{PipelineError, Result};
pub use middleware::{AuthMiddleware, Flow, LoggingMiddleware, Middleware, MiddlewareChain, Next};
pub use models::{Request, Response};
pub use tasks::spawn_cleanup_task;
