use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum::extract::State;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::TodoStore;
use crate::handlers::{protected, public};
use crate::middleware::{resolve_identity, session_auth};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API behind the authorization gate
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use public::auth;

    Router::new()
        // Session establishment and teardown
        .route(
            "/auth/session",
            post(auth::session_create).delete(auth::session_delete),
        )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, todos};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        // Task collection and record operations
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/:id",
            get(todos::get).put(todos::update).delete(todos::remove),
        )
        // Gate layering: session validation runs first, then identity
        // resolution; handlers only ever see a resolved CurrentUser.
        .layer(from_fn_with_state(state, resolve_identity))
        .layer(from_fn(session_auth))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Todo API (Rust)",
            "version": version,
            "description": "Session-gated task API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/session (public - sign-in/sign-out)",
                "whoami": "/api/auth/whoami (protected)",
                "todos": "/todos[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.todos.health().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
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
