//! Authentication request payloads

use serde::Deserialize;

/// Body of `POST /api/auth/native-google-login`. The WebView shell sends
/// the ID token it obtained from the native Google sign-in SDK.
#[derive(Debug, Deserialize)]
pub struct NativeLoginPayload {
    pub token: Option<String>,
}

/// Body of `POST /api/auth/web-google-login`. Either a bearer token or an
/// authorization code; the token takes precedence when both are present.
#[derive(Debug, Deserialize)]
pub struct WebLoginPayload {
    pub code: Option<String>,
    pub token: Option<String>,
}

/// Query parameters of the browser OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}
