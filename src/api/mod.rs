//! API Module
//!
//! Dispatching, handler erasure, and the user-directory routes.
//!
//! # Routes
//! - `GET /users` - List users (auth)
//! - `GET /users/by-id` - Fetch one user, read through the cache (auth)
//! - `POST /users` - Create a user (auth)
//! - `PUT /users` - Update a user (auth)
//! - `DELETE /users` - Deactivate a user (auth)
//! - `GET /stats` - Cache and directory statistics
//! - `GET /health` - Health check

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod routes;

pub use dispatcher::Dispatcher;
pub use handler::{BoxedHandler, Handler};
pub use handlers::AppState;
pub use routes::create_dispatcher;
