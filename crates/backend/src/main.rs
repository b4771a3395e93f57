mod assets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
struct Config {
    port: String,
    assets_dir: PathBuf,
    data_dir: PathBuf,
    dist_dir: PathBuf,
}

impl Config {
    fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
        Self {
            port: var("PORT", "3000"),
            assets_dir: PathBuf::from(var("ASSETS_DIR", "assets")),
            data_dir: PathBuf::from(var("DATA_DIR", "assets/data")),
            dist_dir: PathBuf::from(var("DIST_DIR", "dist")),
        }
    }
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
/// Data documents change under a running page; the minute refresh must see edits.
const CACHE_NONE: &str = "no-cache";

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>Grid Map</title></head>
<body>
<h1>Grid Map</h1>
<p>Frontend not built yet. The data documents are served under <a href="/data/ports.json">/data</a>.</p>
</body>
</html>"#;

/// Build the full application router.
fn build_app(config: &Config) -> Router {
    // Static file routers are stateless; merge them before adding app state
    let static_files = Router::new()
        .nest("/static", cached_static_router(&config.assets_dir, CACHE_1DAY))
        .nest("/data", cached_static_router(&config.data_dir, CACHE_NONE))
        .nest("/dist", cached_static_router(&config.dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let index_path = Arc::new(config.dist_dir.join("index.html"));

    Router::new()
        .route("/", get(serve_index))
        .route("/editor", get(serve_index))
        .with_state(index_path)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

async fn serve_index(State(index_path): State<Arc<PathBuf>>) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(index_path.as_path()).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::debug!(path = %index_path.display(), error = %e, "Serving fallback index");
            Html(FALLBACK_INDEX.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    // A bad document is served anyway; the page keeps its previous state.
    if let Err(e) = assets::check_documents(&config.data_dir) {
        tracing::warn!(dir = %config.data_dir.display(), error = %e, "Map data failed validation");
    }

    let app = build_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running at http://localhost:{}", config.port);
    tracing::info!("Terrain editor at http://localhost:{}/editor", config.port);

    axum::serve(listener, app).await
}
