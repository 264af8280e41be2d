//! Demo login page
//!
//! One server-rendered page drives both sign-in flows: inside the native
//! WebView shell it asks the bridge to run Google sign-in and receives
//! the token back over postMessage; in a plain browser it opens a popup
//! to Google's authorization endpoint and receives the token from the
//! callback page. Either way the token is POSTed to the session endpoint
//! with credentials included so the cookie sticks.

use axum::extract::Extension;
use axum::response::Html;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::AppState;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>WebView Google Login</title>
<style>
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
         max-width: 480px; margin: 40px auto; padding: 0 20px; }
  button { font-size: 16px; padding: 12px 20px; border-radius: 8px;
           border: 1px solid #333; cursor: pointer; background: white; }
  #user { margin: 16px 0; font-weight: 600; }
  #events { list-style: none; padding: 0; font-size: 13px; color: #555; }
  #events li { padding: 2px 0; border-bottom: 1px solid #eee; }
</style>
</head>
<body>
<h1>Google Login Demo</h1>
<button id="login">Sign in with Google</button>
<div id="user"></div>
<ul id="events"></ul>
"#;

const PAGE_FOOT: &str = "</body>\n</html>\n";

const PAGE_SCRIPT: &str = r#"
// Append-only event log; the UI renders the log, control flow never
// reads it back.
const events = [];
function logEvent(kind, detail) {
  events.push({ time: new Date().toISOString(), kind, detail });
  const li = document.createElement('li');
  li.textContent = kind + (detail ? ': ' + detail : '');
  document.getElementById('events').appendChild(li);
  console.log('[login]', kind, detail || '');
}

// A message source abstracts where 'message' events arrive: WebView
// bridges dispatch on document, browser popups on window. Exactly one
// listener gets registered, selected by environment detection.
function createMessageSource(onMessage) {
  const handler = (event) => {
    let data = event.data;
    if (typeof data === 'string') {
      try { data = JSON.parse(data); } catch (e) { return; }
    }
    if (data && typeof data === 'object') onMessage(data);
  };
  if (window.ReactNativeWebView) {
    document.addEventListener('message', handler);
    return { kind: 'webview-bridge' };
  }
  window.addEventListener('message', handler);
  return { kind: 'browser-window' };
}

async function submitToken(token) {
  logEvent('token-received');
  try {
    const res = await fetch('/api/auth/native-google-login', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      credentials: 'include',
      body: JSON.stringify({ token }),
    });
    const result = await res.json();
    if (result.success) {
      document.getElementById('user').textContent = 'Signed in as ' + result.user.email;
      logEvent('login-success', result.user.email);
    } else {
      logEvent('login-failed', result.error);
    }
  } catch (err) {
    logEvent('request-error', String(err));
  }
}

const source = createMessageSource((data) => {
  switch (data.type) {
    case 'LOGIN_TOKEN':
      submitToken(data.token);
      break;
    case 'LOGIN_ERROR':
      logEvent('login-error', data.error);
      break;
    case 'TEST':
      logEvent('test-message', data.message);
      break;
    default:
      logEvent('ignored-message', data.type);
  }
});
logEvent('message-source', source.kind);

document.getElementById('login').addEventListener('click', () => {
  if (window.ReactNativeWebView) {
    logEvent('login-requested', 'native bridge');
    window.ReactNativeWebView.postMessage('GOOGLE_LOGIN_REQUEST');
  } else if (AUTH_URL) {
    logEvent('login-requested', 'browser popup');
    window.open(AUTH_URL, 'google-login', 'width=480,height=640');
  } else {
    logEvent('login-unavailable', 'no client id configured');
  }
});
"#;

/// GET / - serves the login page with the popup authorization URL baked
/// in. Without a configured client id the popup path stays disabled and
/// only the native bridge flow works.
pub async fn login_page(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Html<String> {
    let state = state_lock.read().await.clone();

    let auth_url = state
        .public_client_id
        .as_deref()
        .map(|client_id| state.google_service.authorization_url(client_id));

    debug!(popup_enabled = auth_url.is_some(), "serving login page");

    let auth_url_json =
        serde_json::to_string(&auth_url).unwrap_or_else(|_| "null".to_string());

    Html(format!(
        "{}<script>const AUTH_URL = {};</script>\n<script>{}</script>\n{}",
        PAGE_HEAD, auth_url_json, PAGE_SCRIPT, PAGE_FOOT
    ))
}
