use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kana_notebook::assistant::Assistant;
use kana_notebook::config::AppConfig;
use kana_notebook::handlers;
use kana_notebook::state::AppState;
use kana_notebook::store::SqliteStore;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kana_notebook=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let store = SqliteStore::open(&config.database_path).expect("Failed to initialize database");
  tracing::info!("Using database at {}", config.database_path.display());

  let assistant = Assistant::from_api_key(config.api_key.as_deref(), &config.model);
  let state = AppState::new(Arc::new(store), assistant);

  let app = handlers::router(state).layer(TraceLayer::new_for_http());

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
