use axum::Router;
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::ServerConfig;
use crate::logging::{log_event, LogLevel};

/// Static files from the built bundle; unknown paths get `index.html` so
/// client-side routes still load the app.
fn router(config: &ServerConfig) -> Router {
    let static_service =
        ServeDir::new(&config.dist_dir).not_found_service(ServeFile::new(config.index_path()));

    Router::new().fallback_service(static_service)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    let bind_address = format!("0.0.0.0:{}", config.port);
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &config,
        LogLevel::Info,
        "server_listening",
        json!({
            "address": format!("http://127.0.0.1:{}", config.port),
            "dist_dir": config.dist_dir.display().to_string(),
        }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}
