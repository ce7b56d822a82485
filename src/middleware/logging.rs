//! Request logging middleware

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::info;

use super::{BoxFuture, Flow, Middleware, Next};
use crate::models::Request;

/// Times everything downstream of it and logs the result.
///
/// Never alters the status or payload of the flow it observes.
#[derive(Debug, Default)]
pub struct LoggingMiddleware {
    completed: AtomicU64,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests whose downstream call has returned.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl Middleware for LoggingMiddleware {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Flow> {
        Box::pin(async move {
            let start = Instant::now();
            let flow = next.run(req).await;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            self.completed.fetch_add(1, Ordering::Relaxed);
            match &flow {
                Flow::Terminate(resp) => {
                    info!(status = resp.status_code(), elapsed_ms, "request processed");
                }
                Flow::Forward(_) => info!(elapsed_ms, "request passed through"),
            }
            flow
        })
    }
}
