//! Session authentication.
//!
//! Every call to the service needs three things, bundled as an
//! [`AuthContext`]:
//!
//! 1. **Cookies** from the storage-state file written by the browser login,
//!    filtered to first-party domains (must include `SID`).
//! 2. **CSRF token** (`SNlM0e`) scraped from the landing page.
//! 3. **Session id** (`FdrFJe`) scraped from the same page.
//!
//! [`TokenAcquirer::acquire`] performs all three steps once per session.
//! The resulting context is immutable and shared by `Arc` across every
//! concurrent source operation.
//!
//! # Failure modes
//!
//! | Error | Meaning | Remedy |
//! |-------|---------|--------|
//! | `StorageNotFound` | no storage file | log in |
//! | `MissingCookie` | no `SID` after filtering | log in again |
//! | `AuthExpired` | landing page bounced to sign-in | log in again |
//! | `TokenExtraction` | page loaded, token missing | markup changed; report it |
//!
//! # Downloads
//!
//! [`load_download_cookies`] keeps each cookie's domain so that downloads
//! redirected across first-party content hosts carry the right cookies.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notebooklm_sources_core::cookies::{self, StorageState};
use notebooklm_sources_core::tokens::{self, CSRF_TOKEN_KEY, SESSION_ID_KEY};
use notebooklm_sources_core::{DownloadCookie, MissingCookieError};
use reqwest::cookie::Jar;
use reqwest::header::COOKIE;
use url::Url;

use crate::config::Config;
use crate::error::AuthError;

/// Cookies and scraped tokens required by every service call.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    cookies: BTreeMap<String, String>,
    csrf_token: String,
    session_id: String,
}

impl AuthContext {
    /// Build a context, enforcing that `SID` is present and both tokens are
    /// non-empty.
    pub fn new(
        cookies: BTreeMap<String, String>,
        csrf_token: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let csrf_token = csrf_token.into();
        let session_id = session_id.into();

        let missing: Vec<String> = cookies::MINIMUM_REQUIRED_COOKIES
            .iter()
            .filter(|name| !cookies.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MissingCookieError { missing }.into());
        }
        if csrf_token.is_empty() {
            return Err(AuthError::TokenExtraction {
                token: CSRF_TOKEN_KEY,
                final_url: String::new(),
            });
        }
        if session_id.is_empty() {
            return Err(AuthError::TokenExtraction {
                token: SESSION_ID_KEY,
                final_url: String::new(),
            });
        }

        Ok(Self {
            cookies,
            csrf_token,
            session_id,
        })
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `Cookie` header value, e.g. `HSID=def; SID=abc`.
    pub fn cookie_header(&self) -> String {
        cookies::cookie_header(&self.cookies)
    }
}

// Cookie values and tokens stay out of logs and panic messages.
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("csrf_token", &"<redacted>")
            .field("session_id", &"<redacted>")
            .finish()
    }
}

/// Fetches the landing page and assembles an [`AuthContext`].
#[derive(Clone)]
pub struct TokenAcquirer {
    client: reqwest::Client,
    config: Config,
    login_url: Url,
}

impl TokenAcquirer {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeouts.token_fetch())
            .build()?;
        Self::with_client(client, config)
    }

    /// Use an existing client (its redirect policy must follow redirects).
    pub fn with_client(client: reqwest::Client, config: &Config) -> Result<Self, AuthError> {
        let login_url =
            Url::parse(&config.service.login_url).map_err(|e| AuthError::InvalidConfig {
                field: "service.login_url",
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            config: config.clone(),
            login_url,
        })
    }

    /// Load cookies from `storage_path` (or the configured default) and
    /// scrape the page tokens.
    pub async fn acquire(&self, storage_path: Option<&Path>) -> Result<AuthContext, AuthError> {
        let path = self.resolve(storage_path);
        let cookies = load_auth_cookies(&path)?;
        let (csrf_token, session_id) = self.fetch_tokens(&cookies).await?;
        AuthContext::new(cookies, csrf_token, session_id)
    }

    /// Same as [`acquire`](Self::acquire), wrapped for sharing.
    pub async fn acquire_shared(
        &self,
        storage_path: Option<&Path>,
    ) -> Result<Arc<AuthContext>, AuthError> {
        self.acquire(storage_path).await.map(Arc::new)
    }

    /// Download cookies from `storage_path` or the configured default.
    pub fn download_cookies(&self, storage_path: Option<&Path>) -> Result<DownloadCookies, AuthError> {
        load_download_cookies(&self.resolve(storage_path))
    }

    fn resolve(&self, storage_path: Option<&Path>) -> PathBuf {
        storage_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.storage_path())
    }

    async fn fetch_tokens(
        &self,
        cookies: &BTreeMap<String, String>,
    ) -> Result<(String, String), AuthError> {
        tracing::debug!(url = %self.config.service.base_url, "Fetching landing page tokens");

        let response = self
            .client
            .get(&self.config.service.base_url)
            .header(COOKIE, cookies::cookie_header(cookies))
            .send()
            .await?;

        let final_url = response.url().clone();
        if tokens::is_login_redirect(&final_url, &self.login_url) {
            tracing::debug!(%final_url, "Landing page redirected to sign-in");
            return Err(AuthError::AuthExpired {
                final_url: final_url.to_string(),
            });
        }

        let response = response.error_for_status()?;
        let html = response.text().await?;

        let csrf_token = tokens::extract_csrf_token(&html).ok_or_else(|| {
            AuthError::TokenExtraction {
                token: CSRF_TOKEN_KEY,
                final_url: final_url.to_string(),
            }
        })?;
        let session_id = tokens::extract_session_id(&html).ok_or_else(|| {
            AuthError::TokenExtraction {
                token: SESSION_ID_KEY,
                final_url: final_url.to_string(),
            }
        })?;

        Ok((csrf_token.to_string(), session_id.to_string()))
    }
}

/// Read and parse a storage-state file.
pub fn read_storage_state(path: &Path) -> Result<StorageState, AuthError> {
    if !path.exists() {
        return Err(AuthError::StorageNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| AuthError::StorageUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    StorageState::from_json(&content).map_err(|e| AuthError::StorageUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Service cookies from a storage-state file, as a name → value map.
pub fn load_auth_cookies(path: &Path) -> Result<BTreeMap<String, String>, AuthError> {
    let state = read_storage_state(path)?;
    let cookies = cookies::filter_auth_cookies(&state)?;
    tracing::debug!(
        stored = state.cookies.len(),
        kept = cookies.len(),
        "Filtered session cookies"
    );
    Ok(cookies)
}

/// Download-eligible cookies with their domains preserved.
pub fn load_download_cookies(path: &Path) -> Result<DownloadCookies, AuthError> {
    let state = read_storage_state(path)?;
    let cookies = cookies::filter_download_cookies(&state)?;
    tracing::debug!(
        stored = state.cookies.len(),
        kept = cookies.len(),
        "Filtered download cookies"
    );
    Ok(DownloadCookies { cookies })
}

/// Cookies for authenticated downloads, each tied to its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCookies {
    cookies: Vec<DownloadCookie>,
}

impl DownloadCookies {
    pub fn iter(&self) -> impl Iterator<Item = &DownloadCookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Load into a cookie jar so a redirect-following client sends each
    /// cookie only to its own domain.
    pub fn into_jar(self) -> Jar {
        let jar = Jar::default();
        for cookie in self.cookies {
            let host = cookie.domain.trim_start_matches('.');
            let Ok(origin) = Url::parse(&format!("https://{host}/")) else {
                tracing::debug!(domain = %cookie.domain, "Skipping cookie with unusable domain");
                continue;
            };
            let set_cookie = if cookie.domain.starts_with('.') {
                format!(
                    "{}={}; Domain={}; Path=/; Secure",
                    cookie.name, cookie.value, host
                )
            } else {
                format!("{}={}; Path=/; Secure", cookie.name, cookie.value)
            };
            jar.add_cookie_str(&set_cookie, &origin);
        }
        jar
    }

    /// A client that follows redirects and carries these cookies.
    pub fn into_client(self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .cookie_provider(Arc::new(self.into_jar()))
            .build()
    }
}

impl IntoIterator for DownloadCookies {
    type Item = DownloadCookie;
    type IntoIter = std::vec::IntoIter<DownloadCookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.into_iter()
    }
}
