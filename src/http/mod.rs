use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::service::SpotService;

mod page;
mod params;
mod rpc;

/// Builds the routing table: the browser page on `/` and the RPC endpoint on
/// `/rpc`.
pub fn router(service: SpotService) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/rpc", get(rpc::forbidden).post(rpc::dispatch))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
