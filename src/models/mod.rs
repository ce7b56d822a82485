//! Request and Response values flowing through the pipeline
//!
//! These are already-decoded, in-memory shapes. Turning them into wire
//! format is left to whatever transport sits in front of the dispatcher.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::Request;
pub use response::Response;
