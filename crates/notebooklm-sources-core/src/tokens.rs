//! Scraping of page-embedded tokens.
//!
//! The landing page carries two values inside its inline global-data
//! script, each as a quoted key/value pair:
//!
//! ```text
//! "SNlM0e":"AF1_QpN-..."   CSRF token, sent with every RPC
//! "FdrFJe":"-4123..."      session id, sent as a query parameter
//! ```

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const CSRF_TOKEN_KEY: &str = "SNlM0e";
pub const SESSION_ID_KEY: &str = "FdrFJe";

static CSRF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""SNlM0e"\s*:\s*"([^"]+)""#).expect("static csrf pattern"));

static SESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""FdrFJe"\s*:\s*"([^"]+)""#).expect("static session pattern"));

/// The CSRF token, if the page carries one.
pub fn extract_csrf_token(html: &str) -> Option<&str> {
    capture(&CSRF_RE, html)
}

/// The session id, if the page carries one.
pub fn extract_session_id(html: &str) -> Option<&str> {
    capture(&SESSION_RE, html)
}

fn capture<'a>(re: &Regex, html: &'a str) -> Option<&'a str> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// True when `final_url` landed on the identity provider, i.e. the session
/// cookies were rejected and the fetch was bounced to a sign-in page.
///
/// Hosts are compared case-insensitively along with the effective port.
pub fn is_login_redirect(final_url: &Url, login_url: &Url) -> bool {
    match (final_url.host_str(), login_url.host_str()) {
        (Some(a), Some(b)) => {
            a.eq_ignore_ascii_case(b)
                && final_url.port_or_known_default() == login_url.port_or_known_default()
        }
        _ => false,
    }
}
