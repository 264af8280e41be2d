//! Client page routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the client page router
///
/// # Routes
/// - `GET /` - login demo page
pub fn client_routes() -> Router {
    Router::new().route("/", get(handlers::login_page))
}
