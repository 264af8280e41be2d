// src/services/mod.rs
//
// Shared services module containing the outbound Google OAuth calls
// used by the auth handlers.

pub mod google;

pub use google::GoogleService;
