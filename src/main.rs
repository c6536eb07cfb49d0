use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod catalog;
mod constants;
mod handlers;
mod models;
mod services;
mod types;
mod utils;

use catalog::CatalogClient;
use services::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub catalog: CatalogClient,
    pub static_assets_path: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .finish()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub active_sessions: usize,
    pub timestamp: String,
    pub version: String,
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        message: "Stocktake backend is running".to_string(),
        active_sessions: state.sessions.active_count().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: VERSION.to_string(),
    })
}

/// Serve the static React application with SPA fallback
async fn handle_spa_or_static(
    State(state): State<AppState>,
    uri: axum::http::Uri,
) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    // API routes that reach the fallback are genuinely unknown
    if path.starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    if path.starts_with("assets/")
        || path.ends_with(".js")
        || path.ends_with(".css")
        || path.ends_with(".ico")
        || path.ends_with(".png")
        || path.ends_with(".svg")
        || path.ends_with(".json")
        || path.ends_with(".webmanifest")
    {
        let file_path = format!("{}/{}", state.static_assets_path, path);

        if let Ok(content) = tokio::fs::read(&file_path).await {
            let content_type = match path.split('.').next_back().unwrap_or("") {
                "js" => "application/javascript",
                "css" => "text/css",
                "json" => "application/json",
                "png" => "image/png",
                "svg" => "image/svg+xml",
                "ico" => "image/x-icon",
                "webmanifest" => "application/manifest+json",
                _ => "text/plain",
            };

            return ([(header::CONTENT_TYPE, content_type)], content).into_response();
        }
    }

    // Everything else is SPA routing
    serve_index_html(&state.static_assets_path).await.into_response()
}

async fn serve_index_html(static_assets_path: &str) -> impl IntoResponse {
    let index_path = format!("{static_assets_path}/index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(content) => Html(content).into_response(),
        Err(e) => {
            warn!("🚨 Failed to read index.html from {}: {}", index_path, e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing with environment-based filtering
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "stocktake_backend=info,tower_http=warn".to_string()
        } else {
            "stocktake_backend=warn,tower_http=error".to_string()
        }
    });

    std::env::set_var("RUST_LOG", &log_level);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("🚀 Starting Stocktake Backend v{}", VERSION);

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Server configuration
    let host =
        std::env::var("SERVER_HOST").unwrap_or_else(|_| constants::DEFAULT_SERVER_HOST.to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| constants::DEFAULT_SERVER_PORT.to_string())
        .parse::<u16>()
        .unwrap_or(constants::DEFAULT_SERVER_PORT);

    // CORS configuration
    let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    info!("Server configured to run on {}:{}", host, port);
    info!("CORS origins: {}", cors_origins);

    // Upstream inventory catalog client
    let catalog = CatalogClient::from_env().expect("Failed to initialize catalog client");

    // Determine static assets path at startup
    let static_assets_path = {
        let possible_paths = vec![
            "/app/frontend/build",  // Docker container path (production)
            "../frontend/build",    // Development relative path
            "frontend/build",       // Alternative relative path
            "./frontend/build",     // Current directory path
        ];

        let mut selected_path = possible_paths[0].to_string();
        for path in possible_paths {
            if tokio::fs::metadata(path).await.is_ok() {
                selected_path = path.to_string();
                break;
            }
        }

        info!("📁 Static assets will be served from: {}", selected_path);
        selected_path
    };

    let state = AppState {
        sessions: SessionStore::new(),
        catalog,
        static_assets_path,
    };

    let cors = if cors_origins == "*" {
        warn!("⚠️ CORS is configured with wildcard (*) - this is only acceptable for development!");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-user-id"),
            ])
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        if origins.is_empty() {
            warn!("⚠️ No valid CORS origins found in CORS_ORIGINS, falling back to localhost only");
            CorsLayer::new()
                .allow_origin("http://localhost:3000".parse::<axum::http::HeaderValue>().unwrap())
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static("x-user-id"),
                ])
                .allow_credentials(true)
        } else {
            info!("🔒 CORS configured for specific origins: {}", cors_origins);
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static("x-user-id"),
                ])
                .allow_credentials(true)
        }
    };

    // Security headers
    let nosniff = tower_http::set_header::SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    let x_frame_options = tower_http::set_header::SetResponseHeaderLayer::overriding(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    let app = Router::new()
        // API routes
        .route("/api/health", get(health_check))
        .nest("/api/scan", handlers::scan::create_scan_routes())
        .nest("/api/catalog", handlers::catalog::create_catalog_routes())
        // Serve static files from the React build (using detected path)
        .nest_service(
            "/assets",
            ServeDir::new(format!("{}/assets", state.static_assets_path)),
        )
        .fallback(handle_spa_or_static)
        .layer(cors)
        .layer(nosniff)
        .layer(x_frame_options)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&format!("{host}:{port}"))
        .await
        .expect("Failed to bind to address");

    info!("🎯 Stocktake Server started successfully on http://{}:{}", host, port);
    info!("🔧 API endpoints available at http://{}:{}/api/", host, port);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
