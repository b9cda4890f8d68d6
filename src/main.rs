use std::sync::Arc;

use anyhow::Context;

use todo_api_rust::database::{self, PgTodoStore, PgUserStore};
use todo_api_rust::provider::GoogleVerifier;
use todo_api_rust::routes;
use todo_api_rust::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = todo_api_rust::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let pool = database::connect(&database_url)
        .await
        .context("failed to open database pool")?;

    let state = AppState {
        users: Arc::new(PgUserStore::new(pool.clone())),
        todos: Arc::new(PgTodoStore::new(pool)),
        provider: Arc::new(GoogleVerifier::from_env()),
    };

    let app = routes::app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("TODO_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Todo API Rust server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;

    Ok(())
}
