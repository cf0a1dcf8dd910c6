use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod upload;
pub mod validation;

/// Full application router: public routes plus the JWT-protected cat API,
/// with CORS and request tracing applied globally.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(cat_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// CORS policy from the security config: disabled means a bare layer that
/// adds no headers; a `*` origin opens everything; otherwise only the listed
/// origins are allowed.
fn cors_layer() -> CorsLayer {
    let security = &config::config().security;

    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login_post))
}

fn cat_routes() -> Router {
    use axum::routing::put;
    use handlers::protected::cats;

    Router::new()
        .route("/api/cats", get(cats::cat_list_get).post(cats::cat_post))
        .route("/api/cats/user", get(cats::cat_get_by_user))
        .route("/api/cats/area", get(cats::cat_get_by_bounding_box))
        // Admin routes sit above /:id so the literal segment wins
        .route(
            "/api/cats/admin/:id",
            put(cats::cat_put_admin).delete(cats::cat_delete_admin),
        )
        .route(
            "/api/cats/:id",
            get(cats::cat_get)
                .put(cats::cat_put)
                .delete(cats::cat_delete),
        )
        .layer(from_fn(middleware::auth::jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Cat API (Rust)",
            "version": version,
            "description": "Cat photo catalogue API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "cats": "/api/cats[/:id] (protected)",
                "own_cats": "/api/cats/user (protected)",
                "area": "/api/cats/area?topRight=lat,lng&bottomLeft=lat,lng (protected)",
                "admin": "/api/cats/admin/:id (protected, admin role)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
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
