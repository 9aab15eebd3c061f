use axum::{extract::State, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tradhub_api::config;
use tradhub_api::database::manager;
use tradhub_api::handlers::{protected, public};
use tradhub_api::identity::HttpIdentityProvider;
use tradhub_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, IDENTITY_SERVICE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting TradHub API in {:?} mode", config.environment);

    // Store pool and identity client are built once here and passed through
    // shared state; both are torn down when the server exits.
    let pool =
        manager::connect().unwrap_or_else(|e| panic!("failed to create database pool: {}", e));
    let identity = HttpIdentityProvider::from_config(&config.identity)
        .unwrap_or_else(|e| panic!("failed to build identity client: {}", e));

    let state = AppState::new(pool.clone(), Arc::new(identity));
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("TRADHUB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 TradHub API server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    manager::close(&pool).await;
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Catalog, comments, messaging, profile
        .merge(product_routes())
        .merge(comment_routes())
        .merge(message_routes())
        .merge(profile_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn product_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route(
            "/api/products",
            get(public::products::list).post(protected::products::create),
        )
        .route(
            "/api/products/:id",
            get(public::products::get)
                .put(protected::products::update)
                .delete(protected::products::remove),
        )
        .route("/api/products/:id/like", post(protected::products::like))
}

fn comment_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new().route("/api/comments", post(protected::comments::create))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/messages",
            get(protected::messages::conversations).post(protected::messages::send),
        )
        .route("/api/messages/:peer_id", get(protected::messages::thread))
}

fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/api/profile",
        get(protected::profile::show).put(protected::profile::update),
    )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "TradHub API",
            "version": version,
            "description": "Marketplace backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "products": "GET /api/products, GET /api/products/:id (public)",
                "catalog": "POST/PUT/DELETE /api/products[/:id], POST /api/products/:id/like (protected)",
                "comments": "POST /api/comments (protected)",
                "messages": "/api/messages[/:peer] (protected)",
                "profile": "/api/profile (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
