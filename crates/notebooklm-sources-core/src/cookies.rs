//! Session-cookie filtering.
//!
//! The browser login flow saves a Playwright storage-state file holding
//! every cookie the browser saw. Only first-party service cookies may be
//! forwarded, and at least the identity cookie (`SID`) must survive.
//!
//! # Domain matching
//!
//! A cookie domain is allowed when it equals an allow-list entry or ends
//! with a dot-prefixed entry. The leading dot is the boundary check:
//!
//! | Domain | Against `.google.com` |
//! |--------|-----------------------|
//! | `.google.com` | allowed (exact) |
//! | `lh3.google.com` | allowed (subdomain) |
//! | `evil-google.com` | rejected |
//! | `google.com.evil.net` | rejected |

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

/// Cookies that must be present for any authenticated request.
pub const MINIMUM_REQUIRED_COOKIES: &[&str] = &["SID"];

/// Domains whose cookies go into the RPC `Cookie` header.
pub const AUTH_COOKIE_DOMAINS: &[&str] =
    &[".google.com", "notebooklm.google.com", ".googleusercontent.com"];

/// Domains whose cookies may accompany downloads. Downloads get redirected
/// to content hosts the RPC endpoint never touches.
pub const DOWNLOAD_COOKIE_DOMAINS: &[&str] = &[
    ".google.com",
    "notebooklm.google.com",
    ".googleusercontent.com",
    ".usercontent.google.com",
];

/// One cookie record from a storage-state file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoredCookie {
    pub domain: String,
    pub name: String,
    pub value: String,
}

/// The parts of a Playwright storage-state file this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageState {
    pub cookies: Vec<StoredCookie>,
}

impl StorageState {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A cookie kept for downloads, with its domain preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Required cookies were absent after filtering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing required cookies: {}; log in again to refresh the session", .missing.join(", "))]
pub struct MissingCookieError {
    pub missing: Vec<String>,
}

/// True if `domain` equals or is a dot-qualified subdomain of an entry in
/// `allowed`.
pub fn domain_allowed(domain: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|entry| {
        domain == *entry || (entry.starts_with('.') && domain.ends_with(entry))
    })
}

/// Keep service cookies and collapse them into a name → value map.
///
/// Later duplicates overwrite earlier ones.
pub fn filter_auth_cookies(
    state: &StorageState,
) -> Result<BTreeMap<String, String>, MissingCookieError> {
    let cookies: BTreeMap<String, String> = state
        .cookies
        .iter()
        .filter(|c| !c.name.is_empty() && domain_allowed(&c.domain, AUTH_COOKIE_DOMAINS))
        .map(|c| (c.name.clone(), c.value.clone()))
        .collect();

    require_minimum(cookies.keys().map(String::as_str))?;
    Ok(cookies)
}

/// Keep download-eligible cookies with their domains.
///
/// Cookies with an empty name or value are dropped.
pub fn filter_download_cookies(
    state: &StorageState,
) -> Result<Vec<DownloadCookie>, MissingCookieError> {
    let cookies: Vec<DownloadCookie> = state
        .cookies
        .iter()
        .filter(|c| {
            !c.name.is_empty()
                && !c.value.is_empty()
                && domain_allowed(&c.domain, DOWNLOAD_COOKIE_DOMAINS)
        })
        .map(|c| DownloadCookie {
            name: c.name.clone(),
            value: c.value.clone(),
            domain: c.domain.clone(),
        })
        .collect();

    require_minimum(cookies.iter().map(|c| c.name.as_str()))?;
    Ok(cookies)
}

/// Render a cookie map as a `Cookie` header value.
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn require_minimum<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), MissingCookieError> {
    let present: BTreeSet<&str> = names.collect();
    let missing: Vec<String> = MINIMUM_REQUIRED_COOKIES
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingCookieError { missing })
    }
}
