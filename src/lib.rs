//! Adeylink marketplace API: a local marketplace where buyers order from
//! nearby sellers and pay cash on delivery.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::warn;

pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod store;

use auth::AuthService;
use config::AppConfig;
use events::EventSender;
use services::{
    AdminService, CartService, CatalogService, DeliveryEstimator, OrderService, UserService,
};
use store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub orders: OrderService,
    pub admin: AdminService,
    pub catalog: CatalogService,
    pub carts: CartService,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn RecordStore>,
        estimator: Arc<dyn DeliveryEstimator>,
        events: EventSender,
    ) -> Self {
        let auth = Arc::new(AuthService::new(&config, Arc::clone(&store)));
        let orders = OrderService::new(Arc::clone(&store), estimator, events.clone());
        let admin = AdminService::new(Arc::clone(&store), orders.clone());
        let catalog = CatalogService::new(Arc::clone(&store), events);
        let carts = CartService::new(Arc::clone(&store));
        let users = UserService::new(store);

        Self {
            config,
            auth,
            orders,
            admin,
            catalog,
            carts,
            users,
        }
    }
}

/// Builds the full application router: versioned API, docs and health.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(handlers::orders::routes(&state))
        .merge(handlers::admin::routes(&state))
        .merge(handlers::catalog::routes(&state))
        .merge(handlers::carts::routes(&state))
        .merge(handlers::users::routes(&state));

    Router::new()
        .nest("/api/v1", api)
        .merge(openapi::swagger_ui())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer(&state.config))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any);

    if config.cors_allow_any_origin {
        return layer.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
