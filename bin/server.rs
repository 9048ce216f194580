// Business Registry - Lookup Server
// GET /bin/{id} returns the registry record, served from the file cache
// when present and fetched from the upstream registry otherwise.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use bin_registry::{lookup, CacheStore, Config, RegistryClient};

/// Shared application state
#[derive(Clone)]
struct AppState {
    cache: Arc<CacheStore>,
    registry: Arc<RegistryClient>,
}

/// GET / - Fixed greeting
async fn read_root() -> impl IntoResponse {
    Json(json!({"Hello": "World"}))
}

/// GET /bin/:id - Cached registry lookup
async fn read_bin(
    State(state): State<AppState>,
    Path(bin_id): Path<String>,
) -> impl IntoResponse {
    match lookup(&state.cache, &state.registry, &bin_id).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => {
            eprintln!("Error looking up bin {}: {}", bin_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

#[tokio::main]
async fn main() {
    println!("🌐 Business Registry - Lookup Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env();

    let state = AppState {
        cache: Arc::new(CacheStore::new(config.cache_dir.clone())),
        registry: Arc::new(RegistryClient::new(config.registry_base_url.clone())),
    };
    println!("✓ Cache directory: {:?}", state.cache.dir());
    println!("✓ Upstream registry: {}", config.registry_base_url);

    let app = Router::new()
        .route("/", get(read_root))
        .route("/bin/:id", get(read_bin))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", config.listen_addr);
    println!("   Lookup: http://{}/bin/<bin>", config.listen_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
