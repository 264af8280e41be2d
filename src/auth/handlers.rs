//! Authentication handlers
//!
//! All three endpoints funnel into `GoogleService::resolve_identity`;
//! the only per-endpoint logic is input validation and the wire shape of
//! the outcome (JSON for the login endpoints, a postMessage page for the
//! browser callback).

use axum::extract::{Extension, Json, Query};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{CallbackParams, NativeLoginPayload, WebLoginPayload};
use super::pages;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::google::{Credential, GoogleError, UserIdentity};

/// Session cookie established after a successful login. The cookie value
/// is the user's email; there is no server-side session store.
pub fn session_cookie(user: &UserIdentity) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "session_email={}; Path=/; HttpOnly; Secure; SameSite=None",
        user.email
    ))
    .map_err(|_| ApiError::Internal("Server error".to_string()))
}

/// Builds the `{"success": true, "user": ...}` response with the session
/// cookie attached.
fn login_success(user: &UserIdentity) -> Result<Response, ApiError> {
    let cookie = session_cookie(user)?;
    let mut response = Json(serde_json::json!({
        "success": true,
        "user": user,
    }))
    .into_response();
    response.headers_mut().append(SET_COOKIE, cookie);

    info!(
        email = %safe_email_log(&user.email),
        "login successful, session cookie issued"
    );
    Ok(response)
}

/// Maps a bearer-credential failure onto the wire contract.
fn bearer_error(err: GoogleError) -> ApiError {
    match err {
        GoogleError::InvalidToken | GoogleError::UserInfoRejected => {
            ApiError::InvalidToken("Invalid token".to_string())
        }
        GoogleError::Unavailable(e) => {
            error!(error = %e, "Google unreachable during token validation");
            ApiError::Unavailable("Server error".to_string())
        }
        other => {
            error!(error = %other, "unexpected failure during token validation");
            ApiError::Internal("Server error".to_string())
        }
    }
}

/// POST /api/auth/native-google-login
/// Verifies the token the native shell relayed over the WebView bridge
/// and issues the session cookie.
///
/// # Request Body
/// ```json
/// { "token": "<google id or access token>" }
/// ```
pub async fn native_google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<NativeLoginPayload>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let token = payload
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::MissingInput("No token provided".to_string()))?;

    info!("received native login request");

    let user = state
        .google_service
        .resolve_identity(&Credential::Bearer(token))
        .await
        .map_err(bearer_error)?;

    login_success(&user)
}

/// POST /api/auth/web-google-login
/// Browser-side login. Accepts either a bearer token (forwarded from the
/// popup flow) or an authorization code to exchange directly.
pub async fn web_google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<WebLoginPayload>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(token) = payload.token.filter(|t| !t.is_empty()) {
        info!("received web login request with bearer token");
        let user = state
            .google_service
            .resolve_identity(&Credential::Bearer(token))
            .await
            .map_err(bearer_error)?;
        return login_success(&user);
    }

    let code = payload.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        ApiError::MissingInput("No authorization code or token provided".to_string())
    })?;

    info!("received web login request with authorization code");

    let user = state
        .google_service
        .resolve_identity(&Credential::AuthorizationCode(code))
        .await
        .map_err(|err| match err {
            GoogleError::ExchangeFailed { status } => {
                warn!(http_status = status, "authorization code rejected");
                ApiError::ExchangeFailed("Failed to exchange code for token".to_string())
            }
            GoogleError::UserInfoRejected => {
                ApiError::InvalidToken("Failed to get user info".to_string())
            }
            GoogleError::Unavailable(e) => {
                error!(error = %e, "Google unreachable during code exchange");
                ApiError::Unavailable("Server error".to_string())
            }
            other => {
                error!(error = %other, "unexpected failure during code exchange");
                ApiError::Internal("Server error".to_string())
            }
        })?;

    login_success(&user)
}

/// GET /api/auth/web-google-login/callback
/// Target of the Google redirect for the popup flow. Always answers with
/// an HTML page that posts one message to the opener and closes; errors
/// are relayed inside the page, never as HTTP error statuses, so the
/// popup can shut itself down cleanly.
pub async fn web_google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
) -> Html<String> {
    if let Some(error) = params.error.filter(|e| !e.is_empty()) {
        warn!(oauth_error = %error, "Google authorization returned an error");
        return Html(pages::login_error_page(&error));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!("OAuth callback arrived without code or error");
        return Html(pages::login_error_page("No authorization code"));
    };

    let state = state_lock.read().await.clone();

    let tokens = match state.google_service.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(GoogleError::ExchangeFailed { status }) => {
            return Html(pages::login_error_page(&format!(
                "Failed to exchange code for token: {}",
                status
            )));
        }
        Err(e) => {
            error!(error = %e, "callback code exchange failed");
            return Html(pages::login_error_page("Server error"));
        }
    };

    // Validate the access token before handing it to the opener; an
    // unusable token would only fail later with a worse message.
    match state.google_service.fetch_userinfo(&tokens.access_token).await {
        Ok(user) => {
            info!(
                email = %safe_email_log(&user.email),
                "callback exchange succeeded, relaying token to opener"
            );
            Html(pages::login_token_page(&tokens.access_token))
        }
        Err(GoogleError::UserInfoRejected) => {
            Html(pages::login_error_page("Failed to get user info"))
        }
        Err(e) => {
            error!(error = %e, "callback userinfo fetch failed");
            Html(pages::login_error_page("Server error"))
        }
    }
}
