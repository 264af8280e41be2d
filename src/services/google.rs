// src/services/google.rs
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::common::safe_token_log;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("credential rejected by Google")]
    InvalidToken,

    #[error("token exchange failed with status {status}")]
    ExchangeFailed { status: u16 },

    #[error("userinfo request rejected")]
    UserInfoRejected,

    #[error("Google unreachable: {0}")]
    Unavailable(String),

    #[error("malformed Google response: {0}")]
    Malformed(String),
}

/// Identity extracted from a Google tokeninfo or userinfo response.
/// Missing fields fall back to placeholder values rather than failing
/// the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub email: String,
    pub name: String,
}

impl UserIdentity {
    fn from_claims(claims: &serde_json::Value) -> Self {
        let email = claims
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or("no-email")
            .to_string();
        let name = claims
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("No Name")
            .to_string();
        Self { email, name }
    }
}

/// Access/ID token pair returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub id_token: Option<String>,
}

/// A credential a client can present to establish identity.
#[derive(Debug, Clone)]
pub enum Credential {
    /// An opaque bearer string, either a Google ID token or an access
    /// token. Which one it is gets discovered at verification time.
    Bearer(String),
    /// An authorization code from the browser redirect flow.
    AuthorizationCode(String),
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

/// Upstream endpoint URLs. Production uses Google's public endpoints;
/// tests point these at a local fake.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub tokeninfo_url: String,
    pub userinfo_url: String,
    pub token_url: String,
    pub auth_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    client: Client,
    config: GoogleConfig,
    endpoints: GoogleEndpoints,
}

impl GoogleService {
    pub fn new(client: Client, config: GoogleConfig) -> Self {
        Self {
            client,
            config,
            endpoints: GoogleEndpoints::default(),
        }
    }

    pub fn with_endpoints(
        client: Client,
        config: GoogleConfig,
        endpoints: GoogleEndpoints,
    ) -> Self {
        Self {
            client,
            config,
            endpoints,
        }
    }

    /// Verify a credential as a Google ID token via the tokeninfo endpoint.
    /// Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    pub async fn verify_id_token(&self, id_token: &str) -> Result<UserIdentity, GoogleError> {
        let url = format!(
            "{}?id_token={}",
            self.endpoints.tokeninfo_url,
            urlencoding::encode(id_token)
        );

        debug!(
            token = %safe_token_log(id_token),
            "verifying credential against tokeninfo endpoint"
        );

        let resp = self.client.get(&url).send().await.map_err(|e| {
            error!(error = %e, "HTTP error contacting tokeninfo endpoint");
            GoogleError::Unavailable(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(http_status = %status, "tokeninfo rejected credential");
            return Err(GoogleError::InvalidToken);
        }

        let claims: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GoogleError::Malformed(e.to_string()))?;

        // tokeninfo serializes exp as a string. Google rejects expired
        // tokens itself; this covers responses straddling the boundary.
        let exp = claims.get("exp").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        });
        if let Some(exp) = exp {
            if exp < Utc::now().timestamp() {
                warn!(token_exp = exp, "id token has expired");
                return Err(GoogleError::InvalidToken);
            }
        }

        if let Some(false) = claims.get("email_verified").and_then(|v| {
            v.as_bool().or_else(|| v.as_str().map(|s| s == "true"))
        }) {
            warn!("id token carries an unverified email address");
        }

        Ok(UserIdentity::from_claims(&claims))
    }

    /// Fetch the user's profile with an access token.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserIdentity, GoogleError> {
        debug!(
            token = %safe_token_log(access_token),
            "fetching userinfo with bearer token"
        );

        let resp = self
            .client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting userinfo endpoint");
                GoogleError::Unavailable(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(http_status = %status, "userinfo rejected access token");
            return Err(GoogleError::UserInfoRejected);
        }

        let profile: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GoogleError::Malformed(e.to_string()))?;

        Ok(UserIdentity::from_claims(&profile))
    }

    /// Exchange an authorization code for tokens. The upstream status code
    /// is surfaced in the error for diagnostics; Google's response body is
    /// logged, never forwarded to clients.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, GoogleError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(GoogleError::NotConfigured)?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or(GoogleError::NotConfigured)?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", &self.config.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("exchanging authorization code for tokens");

        let resp = self
            .client
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting token endpoint");
                GoogleError::Unavailable(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(http_status = %status, error = %error_text, "token exchange failed");
            return Err(GoogleError::ExchangeFailed {
                status: status.as_u16(),
            });
        }

        let tokens = resp
            .json::<TokenPair>()
            .await
            .map_err(|e| GoogleError::Malformed(e.to_string()))?;

        debug!(
            id_token_present = tokens.id_token.is_some(),
            "token exchange succeeded"
        );
        Ok(tokens)
    }

    /// Resolve a credential to an identity. This is the one place that
    /// knows the bearer fallback chain: try the credential as an ID token
    /// first, then as an access token. Transport failures do not trigger
    /// the fallback; only a rejection does.
    pub async fn resolve_identity(
        &self,
        credential: &Credential,
    ) -> Result<UserIdentity, GoogleError> {
        match credential {
            Credential::Bearer(token) => match self.verify_id_token(token).await {
                Ok(user) => Ok(user),
                Err(GoogleError::InvalidToken) => {
                    debug!("credential is not an id token, retrying as access token");
                    match self.fetch_userinfo(token).await {
                        Ok(user) => Ok(user),
                        Err(GoogleError::UserInfoRejected) => Err(GoogleError::InvalidToken),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            },
            Credential::AuthorizationCode(code) => {
                let tokens = self.exchange_code(code).await?;
                self.fetch_userinfo(&tokens.access_token).await
            }
        }
    }

    /// Authorization URL for the browser popup flow, scope `email profile`.
    pub fn authorization_url(&self, client_id: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.endpoints.auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("email profile"),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    pub(crate) const GOOD_ID_TOKEN: &str = "good-id-token";
    pub(crate) const GOOD_ACCESS_TOKEN: &str = "good-access-token";
    pub(crate) const GOOD_CODE: &str = "good-code";
    /// Token the fake upstream answers with a 200 whose body is not JSON.
    pub(crate) const MALFORMED_ID_TOKEN: &str = "malformed-id-token";

    async fn fake_tokeninfo(
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;

        match params.get("id_token").map(String::as_str) {
            Some(GOOD_ID_TOKEN) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "email": "alice@example.com",
                    "name": "Alice Park",
                    "email_verified": "true",
                    "exp": (Utc::now().timestamp() + 3600).to_string(),
                })),
            )
                .into_response(),
            Some("expired-id-token") => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "email": "alice@example.com",
                    "name": "Alice Park",
                    "exp": (Utc::now().timestamp() - 60).to_string(),
                })),
            )
                .into_response(),
            Some(MALFORMED_ID_TOKEN) => {
                (StatusCode::OK, "this is not json").into_response()
            }
            _ => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid_token"})),
            )
                .into_response(),
        }
    }

    async fn fake_userinfo(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", GOOD_ACCESS_TOKEN))
            .unwrap_or(false);
        if authorized {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "email": "alice@example.com",
                    "name": "Alice Park",
                })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "invalid_credentials"})),
            )
        }
    }

    #[derive(serde::Deserialize)]
    struct TokenForm {
        code: String,
        grant_type: String,
    }

    async fn fake_token(Form(form): Form<TokenForm>) -> (StatusCode, Json<serde_json::Value>) {
        if form.code == GOOD_CODE && form.grant_type == "authorization_code" {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "access_token": GOOD_ACCESS_TOKEN,
                    "id_token": GOOD_ID_TOKEN,
                    "expires_in": 3599,
                    "token_type": "Bearer",
                })),
            )
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid_grant"})),
            )
        }
    }

    /// Spawns a local stand-in for Google's OAuth endpoints and returns
    /// its base URL.
    pub(crate) async fn spawn_fake_google() -> String {
        let app = Router::new()
            .route("/tokeninfo", get(fake_tokeninfo))
            .route("/oauth2/v2/userinfo", get(fake_userinfo))
            .route("/token", post(fake_token));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn test_service(base_url: &str) -> GoogleService {
        let config = GoogleConfig {
            client_id: Some("test-client-id".to_string()),
            client_secret: Some("test-client-secret".to_string()),
            redirect_uri: "http://localhost:8080/api/auth/web-google-login/callback".to_string(),
        };
        let endpoints = GoogleEndpoints {
            tokeninfo_url: format!("{}/tokeninfo", base_url),
            userinfo_url: format!("{}/oauth2/v2/userinfo", base_url),
            token_url: format!("{}/token", base_url),
            auth_url: format!("{}/auth", base_url),
        };
        GoogleService::with_endpoints(Client::new(), config, endpoints)
    }

    #[tokio::test]
    async fn verify_id_token_accepts_valid_token() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        let user = service.verify_id_token(GOOD_ID_TOKEN).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice Park");
    }

    #[tokio::test]
    async fn verify_id_token_rejects_expired_token() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        let err = service
            .verify_id_token("expired-id-token")
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::InvalidToken));
    }

    #[tokio::test]
    async fn bearer_resolution_falls_back_to_userinfo() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        // Not an ID token, but a valid access token: the fallback chain
        // must still produce an identity.
        let user = service
            .resolve_identity(&Credential::Bearer(GOOD_ACCESS_TOKEN.to_string()))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn bearer_resolution_rejects_garbage_token() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        let err = service
            .resolve_identity(&Credential::Bearer("not-a-token".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::InvalidToken));
    }

    #[tokio::test]
    async fn code_resolution_exchanges_then_fetches_profile() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        let user = service
            .resolve_identity(&Credential::AuthorizationCode(GOOD_CODE.to_string()))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn code_resolution_surfaces_exchange_status() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        let err = service
            .resolve_identity(&Credential::AuthorizationCode("revoked-code".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::ExchangeFailed { status: 400 }));
    }

    #[tokio::test]
    async fn malformed_tokeninfo_body_is_malformed_not_invalid() {
        let base = spawn_fake_google().await;
        let service = test_service(&base);

        // A 200 with an unparseable body must not look like a token
        // rejection, and must not trigger the access-token fallback.
        let err = service
            .resolve_identity(&Credential::Bearer(MALFORMED_ID_TOKEN.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::Malformed(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable_not_invalid() {
        // Bind then drop a listener so the port refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = test_service(&format!("http://{}", addr));
        let err = service
            .resolve_identity(&Credential::Bearer(GOOD_ID_TOKEN.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::Unavailable(_)));
    }

    #[tokio::test]
    async fn exchange_without_credentials_is_not_configured() {
        let base = spawn_fake_google().await;
        let mut service = test_service(&base);
        service.config.client_id = None;

        let err = service.exchange_code(GOOD_CODE).await.unwrap_err();
        assert!(matches!(err, GoogleError::NotConfigured));
    }

    #[test]
    fn authorization_url_carries_scope_and_redirect() {
        let service = test_service("http://unused");
        let url = service.authorization_url("public-client-id");
        assert!(url.contains("client_id=public-client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=email%20profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));
    }

    #[test]
    fn identity_defaults_substitute_missing_fields() {
        let user = UserIdentity::from_claims(&serde_json::json!({"sub": "123"}));
        assert_eq!(user.email, "no-email");
        assert_eq!(user.name, "No Name");
    }
}
