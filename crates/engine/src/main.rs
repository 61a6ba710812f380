//! Storygraph Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storygraph_engine::api;
use storygraph_engine::app::App;
use storygraph_engine::infrastructure::{
    export::FileProfileSink,
    neo4j::{self, Neo4jRepositories},
    settings::{Backend, Settings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storygraph_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Storygraph Engine");

    let settings = Settings::from_env()?;
    let profile_sink = Arc::new(FileProfileSink::new(settings.export_dir.clone()));
    tracing::info!(export_dir = %settings.export_dir.display(), "Profile exports configured");

    let app = match settings.backend {
        Backend::Neo4j => {
            let neo4j_settings = settings
                .neo4j
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Neo4j backend selected without Neo4j settings"))?;
            tracing::info!("Connecting to Neo4j at {}", neo4j_settings.uri);
            let graph = neo4j::connect(neo4j_settings).await?;
            App::with_neo4j(Neo4jRepositories::new(graph), profile_sink)
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory backend; data is lost on exit");
            App::in_memory(profile_sink)
        }
    };

    // Merge duplicates and ensure constraints before serving
    app.use_cases.schema.execute().await?;

    let mut router = api::http::routes()
        .with_state(Arc::new(app))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }
    Some(cors.allow_origin(origins))
}
