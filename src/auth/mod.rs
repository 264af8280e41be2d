//! # Auth Module
//!
//! This module handles the Google sign-in endpoints:
//! - token login for the native WebView shell
//! - token/code login for browsers
//! - the OAuth redirect callback that relays the outcome to the
//!   opening window via postMessage

pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;


pub use routes::auth_routes;
