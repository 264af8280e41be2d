// Application state shared across all modules

use std::sync::Arc;

use crate::services::GoogleService;

/// Application state containing services and configuration
#[derive(Clone)]
pub struct AppState {
    /// Client id handed to the browser for the popup authorization URL.
    pub public_client_id: Option<String>,
    pub google_service: Arc<GoogleService>,
}
