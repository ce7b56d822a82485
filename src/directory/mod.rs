//! User Directory Module
//!
//! An in-memory user store used by the demo routes. Lookups from the
//! dispatcher go through the TTL cache in front of it.

mod service;
mod user;
mod validate;

pub use service::{NewUser, UserDirectory, UserUpdate};
pub use user::{User, UserRole};
pub use validate::{validate_email, validate_username};
