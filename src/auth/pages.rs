//! One-shot HTML pages returned from the OAuth redirect.
//!
//! Each page posts exactly one message to `window.opener` and closes
//! itself; the opener's listener does the rest.

/// Embed a value in an inline script as a JS string literal. JSON
/// escaping covers quotes and control characters; `<` is additionally
/// escaped so a hostile value cannot terminate the script element.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

fn post_message_page(payload_fields: &str) -> String {
    format!(
        "<html><body><script>window.opener.postMessage({{ {} }}, '*'); window.close();</script></body></html>",
        payload_fields
    )
}

/// Page relaying a freshly obtained access token to the opener.
pub fn login_token_page(access_token: &str) -> String {
    post_message_page(&format!(
        "type: 'LOGIN_TOKEN', token: {}",
        js_string(access_token)
    ))
}

/// Page relaying a login failure to the opener.
pub fn login_error_page(error: &str) -> String {
    post_message_page(&format!(
        "type: 'LOGIN_ERROR', error: {}",
        js_string(error)
    ))
}
