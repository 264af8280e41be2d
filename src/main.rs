// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::time::Duration;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod client;
mod common;
mod logging_middleware;
mod services;

use common::AppState;
use services::google::{GoogleConfig, GoogleService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let google_client_id = env::var("GOOGLE_CLIENT_ID").ok();
    let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").ok();
    let public_base_url =
        env::var("NEXTAUTH_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let public_client_id = env::var("NEXT_PUBLIC_GOOGLE_CLIENT_ID")
        .ok()
        .or_else(|| google_client_id.clone());

    if google_client_id.is_none() || google_client_secret.is_none() {
        info!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set; code exchange disabled");
    }

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    // A hung call to Google should not hang the handler indefinitely.
    let http_client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let redirect_uri = format!("{}/api/auth/web-google-login/callback", public_base_url);
    let google_service = Arc::new(GoogleService::new(
        http_client,
        GoogleConfig {
            client_id: google_client_id,
            client_secret: google_client_secret,
            redirect_uri,
        },
    ));
    info!("GoogleService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        public_client_id,
        google_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(client::client_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:8080".to_string()
            });

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
