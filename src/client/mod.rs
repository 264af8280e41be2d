//! # Client Module
//!
//! Serves the demo page that drives both login flows (native WebView
//! bridge and browser popup).

pub mod handlers;
pub mod routes;


pub use routes::client_routes;
