//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/native-google-login` - WebView token login
/// - `POST /api/auth/web-google-login` - browser token/code login
/// - `GET /api/auth/web-google-login/callback` - Google redirect target
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/api/auth/native-google-login",
            post(handlers::native_google_login),
        )
        .route(
            "/api/auth/web-google-login",
            post(handlers::web_google_login),
        )
        .route(
            "/api/auth/web-google-login/callback",
            get(handlers::web_google_callback),
        )
}
