//! HTTP storefront server.
//!
//! REST endpoints over the catalog, cart, checkout, and order query
//! services, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use cart::CartService;
use catalog::CatalogService;
use checkout::{CheckoutConfig, CheckoutOrchestrator};
use gateway::Gateway;
use metrics_exporter_prometheus::PrometheusHandle;
use query::OrderQueryService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<G> {
    pub gateway: Arc<G>,
    pub cart: CartService<G>,
    pub checkout: CheckoutOrchestrator<G>,
    pub catalog: CatalogService<G>,
    pub orders: OrderQueryService<G>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: Gateway + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::export))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<G>))
        .route(
            "/products",
            get(routes::products::list::<G>).post(routes::products::create::<G>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<G>)
                .patch(routes::products::update::<G>)
                .delete(routes::products::delete::<G>),
        )
        .route("/products/{id}/restock", post(routes::products::restock::<G>))
        .route(
            "/categories",
            get(routes::categories::list::<G>).post(routes::categories::create::<G>),
        )
        .route("/categories/{id}", delete(routes::categories::delete::<G>))
        .route(
            "/cart",
            get(routes::cart::view::<G>).delete(routes::cart::clear::<G>),
        )
        .route("/cart/items", post(routes::cart::add_item::<G>))
        .route(
            "/cart/items/{id}",
            put(routes::cart::update_item::<G>).delete(routes::cart::remove_item::<G>),
        )
        .route("/checkout", post(routes::checkout::place_order::<G>))
        .route("/orders", get(routes::orders::list::<G>))
        .route("/orders/{id}", get(routes::orders::get::<G>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<G>))
        .route("/admin/orders", get(routes::admin::list_orders::<G>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::admin::update_status::<G>),
        )
        .route("/admin/sales-report", get(routes::admin::sales_report::<G>))
        .route("/admin/users", get(routes::admin::list_users::<G>))
        .route("/admin/users/{id}", delete(routes::admin::delete_user::<G>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service wired to the same
/// gateway.
pub fn create_default_state<G: Gateway + 'static>(
    gateway: G,
    checkout_config: CheckoutConfig,
) -> Arc<AppState<G>> {
    let gateway = Arc::new(gateway);
    Arc::new(AppState {
        cart: CartService::new(gateway.clone()),
        checkout: CheckoutOrchestrator::with_config(gateway.clone(), checkout_config),
        catalog: CatalogService::new(gateway.clone()),
        orders: OrderQueryService::new(gateway.clone()),
        gateway,
    })
}
