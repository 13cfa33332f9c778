//! Public source operations on a notebook.
//!
//! [`SourcesApi`] is the entry point: classify the caller's input, dispatch
//! to the upload pipeline or a single RPC, and translate every failure into
//! a [`SourceError`].

use std::path::Path;
use std::sync::Arc;

use notebooklm_sources_core::params::{
    build_delete_params, build_list_params, build_url_add_params, build_video_add_params,
    notebook_source_path,
};
use notebooklm_sources_core::{classify_with, extract_identifier, RawReply, SourceKind};

use crate::auth::AuthContext;
use crate::config::Config;
use crate::error::SourceError;
use crate::models::{FileUpload, IngestResult, IngestedKind};
use crate::traits::{RpcCaller, RpcMethod};
use crate::upload::ResumableUploadClient;

/// Returned for URL sources when the add reply carries no usable id.
pub const URL_SOURCE_PLACEHOLDER: &str = "url_source_added";
/// Returned for video sources when the add reply carries no usable id.
pub const VIDEO_SOURCE_PLACEHOLDER: &str = "youtube_source_added";

/// Classify `raw` against the local filesystem.
pub fn classify(raw: &str) -> SourceKind {
    classify_with(raw, |path: &Path| {
        std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    })
}

/// Add, list and delete the sources of a notebook.
#[derive(Clone)]
pub struct SourcesApi {
    rpc: Arc<dyn RpcCaller>,
    uploader: ResumableUploadClient,
}

impl SourcesApi {
    pub fn new(
        config: &Config,
        rpc: Arc<dyn RpcCaller>,
        auth: Arc<AuthContext>,
    ) -> reqwest::Result<Self> {
        let uploader = ResumableUploadClient::new(config, rpc.clone(), auth)?;
        Ok(Self { rpc, uploader })
    }

    /// Build around an existing uploader; both share the same RPC caller.
    pub fn with_uploader(rpc: Arc<dyn RpcCaller>, uploader: ResumableUploadClient) -> Self {
        Self { rpc, uploader }
    }

    /// Add `raw` (a local path, a video link or any other URL) to the
    /// notebook.
    pub async fn add(&self, notebook_id: &str, raw: &str) -> Result<IngestResult, SourceError> {
        let kind = classify(raw);
        tracing::debug!(notebook_id, kind = kind.label(), "Adding source");

        match kind {
            SourceKind::LocalFile(path) => self.add_file(notebook_id, raw, &path).await,
            SourceKind::VideoReference { url, video_id } => {
                tracing::debug!(%video_id, "Detected video reference");
                let params = build_video_add_params(notebook_id, &url);
                let source_id = self
                    .add_by_reference(notebook_id, &url, params, VIDEO_SOURCE_PLACEHOLDER)
                    .await?;
                Ok(IngestResult {
                    source_id,
                    kind: IngestedKind::Video,
                })
            }
            SourceKind::GenericUrl(url) => {
                let params = build_url_add_params(notebook_id, &url);
                let source_id = self
                    .add_by_reference(notebook_id, &url, params, URL_SOURCE_PLACEHOLDER)
                    .await?;
                Ok(IngestResult {
                    source_id,
                    kind: IngestedKind::Url,
                })
            }
        }
    }

    async fn add_file(
        &self,
        notebook_id: &str,
        raw: &str,
        path: &Path,
    ) -> Result<IngestResult, SourceError> {
        // The file may have gone away since classification.
        let file = FileUpload::from_path(path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "File disappeared before upload");
            SourceError::Add {
                input: raw.to_string(),
                detail: "file not found".to_string(),
                cause: None,
            }
        })?;

        let session = self.uploader.upload(notebook_id, &file).await?;
        Ok(IngestResult {
            source_id: session.source_id,
            kind: IngestedKind::File,
        })
    }

    async fn add_by_reference(
        &self,
        notebook_id: &str,
        url: &str,
        params: Vec<serde_json::Value>,
        placeholder: &str,
    ) -> Result<String, SourceError> {
        let reply = self
            .rpc
            .invoke(
                RpcMethod::AddSource,
                params,
                &notebook_source_path(notebook_id),
                true,
            )
            .await
            .map_err(|e| SourceError::Add {
                input: url.to_string(),
                detail: "add call failed".to_string(),
                cause: Some(e),
            })?;

        if !reply.is_non_empty_sequence() {
            return Err(SourceError::Add {
                input: url.to_string(),
                detail: "service returned an empty reply".to_string(),
                cause: None,
            });
        }

        let source_id = extract_identifier(&reply).unwrap_or(placeholder).to_string();
        tracing::info!(notebook_id, %source_id, "Added source");
        Ok(source_id)
    }

    /// Raw source entries of a notebook, in service order.
    pub async fn list(&self, notebook_id: &str) -> Result<Vec<RawReply>, SourceError> {
        let list_error = |detail: &str, cause| SourceError::List {
            notebook_id: notebook_id.to_string(),
            detail: detail.to_string(),
            cause,
        };

        let reply = self
            .rpc
            .invoke(
                RpcMethod::ListSources,
                build_list_params(notebook_id),
                &notebook_source_path(notebook_id),
                true,
            )
            .await
            .map_err(|e| list_error("list call failed", Some(e)))?;

        match reply {
            RawReply::Null => Ok(Vec::new()),
            RawReply::Sequence(entries) => {
                tracing::debug!(notebook_id, count = entries.len(), "Listed sources");
                Ok(entries)
            }
            RawReply::Scalar(_) => Err(list_error("reply is not a list", None)),
        }
    }

    /// Remove a source. Not retried.
    pub async fn delete(&self, notebook_id: &str, source_id: &str) -> Result<(), SourceError> {
        self.rpc
            .invoke(
                RpcMethod::DeleteSource,
                build_delete_params(notebook_id, source_id),
                &notebook_source_path(notebook_id),
                true,
            )
            .await
            .map_err(|cause| SourceError::Delete {
                notebook_id: notebook_id.to_string(),
                source_id: source_id.to_string(),
                cause,
            })?;

        tracing::info!(notebook_id, source_id, "Deleted source");
        Ok(())
    }
}
