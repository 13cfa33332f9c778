//! Error types for notebooklm-sources.
//!
//! Errors are grouped by the phase that raised them:
//!
//! | Enum | Phase |
//! |------|-------|
//! | [`AuthError`] | cookie loading and token scraping |
//! | [`UploadError`] | register / negotiate / stream |
//! | [`SourceError`] | the public `add` / `list` / `delete` surface |
//!
//! Nothing here is retried. Each variant carries enough context (file,
//! notebook, source, URL, transport message) for the caller to pick a
//! policy.

use std::path::PathBuf;

use notebooklm_sources_core::MissingCookieError;
use thiserror::Error;

use crate::traits::RpcError;

/// Failures while building an [`AuthContext`](crate::auth::AuthContext).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("storage file not found: {}; log in first to create it", .path.display())]
    StorageNotFound { path: PathBuf },

    #[error("storage file {} could not be read: {reason}", .path.display())]
    StorageUnreadable { path: PathBuf, reason: String },

    #[error(transparent)]
    MissingCookie(#[from] MissingCookieError),

    /// The session was bounced to the sign-in page. Re-authenticate.
    #[error("authentication expired or invalid (redirected to {final_url}); log in again")]
    AuthExpired { final_url: String },

    /// The page loaded but a token was not where it used to be. The markup
    /// probably changed.
    #[error("{token} not found in landing page (final URL: {final_url}); the page structure may have changed")]
    TokenExtraction {
        token: &'static str,
        final_url: String,
    },

    #[error("landing page request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Failures in one of the three upload phases.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("registering {filename} did not return a source id: {detail}")]
    SourceRegistration {
        filename: String,
        detail: String,
        #[source]
        cause: Option<RpcError>,
    },

    #[error("starting upload session for {filename} (source {source_id}) failed: {detail}")]
    UploadSession {
        filename: String,
        source_id: String,
        detail: String,
    },

    /// The registered source stays behind on the service with no content.
    #[error("uploading {filename} failed; source {source_id} remains registered without content: {detail}")]
    UploadTransfer {
        filename: String,
        source_id: String,
        detail: String,
    },
}

/// Failures surfaced by [`SourcesApi`](crate::sources::SourcesApi).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to add source {input}: {detail}")]
    Add {
        input: String,
        detail: String,
        #[source]
        cause: Option<RpcError>,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("failed to list sources of notebook {notebook_id}: {detail}")]
    List {
        notebook_id: String,
        detail: String,
        #[source]
        cause: Option<RpcError>,
    },

    #[error("failed to delete source {source_id} from notebook {notebook_id}")]
    Delete {
        notebook_id: String,
        source_id: String,
        #[source]
        cause: RpcError,
    },
}

impl UploadError {
    /// The source id registered before the failure, if registration got
    /// that far.
    pub fn orphaned_source_id(&self) -> Option<&str> {
        match self {
            UploadError::SourceRegistration { .. } => None,
            UploadError::UploadSession { source_id, .. }
            | UploadError::UploadTransfer { source_id, .. } => Some(source_id),
        }
    }
}
