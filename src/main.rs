use std::sync::Arc;

use agent_coordinator::api;
use agent_coordinator::config::Config;
use agent_coordinator::coordination::Coordinator;
use agent_coordinator::infrastructure::repositories::FileCoordinationStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    tracing::info!(
        state_path = %config.state_path.display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Using coordination store"
    );
    let store = FileCoordinationStore::new(&config.state_path, config.lock);
    let coordinator = Coordinator::new(Arc::new(store)).with_poll_interval(config.poll_interval);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(coordinator)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
