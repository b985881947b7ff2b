use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::manager::DatabaseManager;
use crate::handlers;

/// Build the full application router.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(cat_routes())
        .merge(user_routes())
        .merge(auth_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn cat_routes() -> Router {
    use axum::routing::put;
    use handlers::cats;

    Router::new()
        .route("/api/v1/cats", get(cats::cat_list).post(cats::cat_post))
        .route("/api/v1/cats/area", get(cats::cat_get_by_bounding_box))
        .route("/api/v1/cats/mine", get(cats::cat_get_by_user))
        .route(
            "/api/v1/cats/:id",
            get(cats::cat_get).put(cats::cat_put).delete(cats::cat_delete),
        )
        .route(
            "/api/v1/cats/:id/admin",
            put(cats::cat_put_admin).delete(cats::cat_delete_admin),
        )
}

fn user_routes() -> Router {
    use handlers::users;

    Router::new()
        .route(
            "/api/v1/users",
            get(users::user_list)
                .post(users::user_post)
                .put(users::user_put_current)
                .delete(users::user_delete_current),
        )
        .route("/api/v1/users/token", get(users::check_token))
        .route("/api/v1/users/:id", get(users::user_get))
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new().route("/api/v1/auth/login", post(auth::login))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "catmap API",
            "version": version,
            "description": "Location-tagged cat registry with bounding-box search",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/api/v1/auth/login (public - token acquisition)",
                "users": "/api/v1/users[/:id], /api/v1/users/token",
                "cats": "/api/v1/cats[/:id], /api/v1/cats/area, /api/v1/cats/mine",
                "admin": "/api/v1/cats/:id/admin (admin role required)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
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
