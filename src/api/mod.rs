//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::store::LedgerStore;

pub use routes::create_router;

/// Full application: routes, request context, logging and tracing.
///
/// A request without `X-Correlation-Id` gets one generated, and the id is
/// echoed back on the response.
pub fn build_app<S>(store: S) -> Router
where
    S: LedgerStore + Clone,
{
    create_router::<S>()
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(
            middleware::correlation_id_header(),
        ))
        .layer(SetRequestIdLayer::new(
            middleware::correlation_id_header(),
            MakeRequestUuid,
        ))
        .with_state(store)
}
