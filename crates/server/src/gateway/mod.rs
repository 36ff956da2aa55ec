//! HTTP gateway
//!
//! Translates client requests into cache operations and cache results back
//! into responses. Holds no cache state of its own.

mod error;
mod handlers;
mod wire;

pub use error::ApiError;
pub use wire::{ClientPayload, ErrorBody, HealthBody, StatsBody};

use axum::routing::{get, post};
use axum::Router;
use bcached_cache::{CacheError, CacheHandle, EmptyExpectation};
use std::future::Future;
use std::time::Duration;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub cache: CacheHandle,
    /// Bound on how long a request waits for the arbitrator
    pub request_timeout: Duration,
    pub empty_expectation: EmptyExpectation,
}

impl GatewayState {
    pub fn new(
        cache: CacheHandle,
        request_timeout: Duration,
        empty_expectation: EmptyExpectation,
    ) -> Self {
        Self {
            cache,
            request_timeout,
            empty_expectation,
        }
    }

    /// Await a cache operation, failing with a retryable timeout when the
    /// arbitrator does not answer in time
    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = bcached_cache::Result<T>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.request_timeout, "request timed out");
                Err(CacheError::timeout(operation, self.request_timeout).into())
            }
        }
    }
}

/// Build the router with all client routes
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/client/get", post(handlers::get_value))
        .route("/client/put", post(handlers::put_value))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .fallback(handlers::not_found)
        .with_state(state)
}
