//! Resumable file upload.
//!
//! Local files reach the service in three phases:
//!
//! ```text
//! register ──▶ negotiate ──▶ stream
//!  (RPC)        (POST start)   (POST upload, finalize)
//!    │              │              │
//!  source_id     upload_url     file bytes
//! ```
//!
//! 1. **Register**: an `AddSourceFile` RPC announces the filename and
//!    returns the new source id, wrapped in one to four levels of arrays.
//! 2. **Negotiate**: a `start` request to the upload endpoint with the
//!    byte count and source id. The session URL comes back in the
//!    `x-goog-upload-url` response header.
//! 3. **Stream**: a single `upload, finalize` request to the session URL,
//!    with the file read from disk in fixed-size chunks.
//!
//! No phase is retried. A failure after registration leaves the source
//! registered on the service with no content; the error reports its id
//! (see [`UploadError::orphaned_source_id`]).
//!
//! Both HTTP phases must carry the session cookies plus the browser's
//! `Origin` and `Referer`.

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use notebooklm_sources_core::params::{build_file_registration_params, notebook_source_path};
use notebooklm_sources_core::extract_identifier;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use tokio_util::io::ReaderStream;

use crate::auth::AuthContext;
use crate::config::{Config, ServiceConfig, TimeoutConfig};
use crate::error::UploadError;
use crate::models::{FileUpload, UploadSession};
use crate::traits::{RpcCaller, RpcMethod};

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const UPLOAD_COMMAND_HEADER: &str = "x-goog-upload-command";
const UPLOAD_PROTOCOL_HEADER: &str = "x-goog-upload-protocol";
const UPLOAD_LENGTH_HEADER: &str = "x-goog-upload-header-content-length";
const UPLOAD_OFFSET_HEADER: &str = "x-goog-upload-offset";
const AUTHUSER_HEADER: &str = "x-goog-authuser";

const NEGOTIATE_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";
const TRANSFER_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

/// A file read lazily in fixed-size chunks.
///
/// Peak memory is one chunk regardless of file size. The stream is finite
/// and not restartable: [`into_body`](Self::into_body) consumes it.
pub struct FileChunkStream {
    inner: ReaderStream<tokio::fs::File>,
}

impl FileChunkStream {
    pub async fn open(path: &Path, chunk_size: usize) -> io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self {
            inner: ReaderStream::with_capacity(file, chunk_size),
        })
    }

    pub fn into_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self)
    }
}

impl Stream for FileChunkStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Drives register → negotiate → stream for one file at a time.
///
/// Cheap to clone; holds no per-upload state.
#[derive(Clone)]
pub struct ResumableUploadClient {
    http: reqwest::Client,
    rpc: Arc<dyn RpcCaller>,
    auth: Arc<AuthContext>,
    service: ServiceConfig,
    timeouts: TimeoutConfig,
    chunk_size: usize,
}

impl ResumableUploadClient {
    pub fn new(
        config: &Config,
        rpc: Arc<dyn RpcCaller>,
        auth: Arc<AuthContext>,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, config, rpc, auth))
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &Config,
        rpc: Arc<dyn RpcCaller>,
        auth: Arc<AuthContext>,
    ) -> Self {
        Self {
            http,
            rpc,
            auth,
            service: config.service.clone(),
            timeouts: config.timeouts.clone(),
            chunk_size: config.upload.chunk_size.max(1),
        }
    }

    /// Run all three phases and return the completed session.
    pub async fn upload(
        &self,
        notebook_id: &str,
        file: &FileUpload,
    ) -> Result<UploadSession, UploadError> {
        let source_id = self.register(notebook_id, &file.filename).await?;
        let upload_url = self
            .negotiate(notebook_id, &file.filename, file.size_bytes, &source_id)
            .await?;

        let session = UploadSession {
            notebook_id: notebook_id.to_string(),
            filename: file.filename.clone(),
            file_size_bytes: file.size_bytes,
            source_id,
            upload_url,
        };

        let content = FileChunkStream::open(&file.path, self.chunk_size)
            .await
            .map_err(|e| transfer_failed(&session, format!("cannot read file: {e}")))?;
        self.stream(&session, content).await?;

        tracing::info!(
            notebook_id,
            source_id = %session.source_id,
            bytes = session.file_size_bytes,
            "Uploaded file source"
        );
        Ok(session)
    }

    /// Phase 1: announce the file and obtain its source id.
    pub async fn register(&self, notebook_id: &str, filename: &str) -> Result<String, UploadError> {
        tracing::debug!(notebook_id, filename, "Registering file source");

        let reply = self
            .rpc
            .invoke(
                RpcMethod::AddSourceFile,
                build_file_registration_params(notebook_id, filename),
                &notebook_source_path(notebook_id),
                true,
            )
            .await
            .map_err(|e| UploadError::SourceRegistration {
                filename: filename.to_string(),
                detail: "registration call failed".to_string(),
                cause: Some(e),
            })?;

        extract_identifier(&reply)
            .map(str::to_string)
            .ok_or_else(|| UploadError::SourceRegistration {
                filename: filename.to_string(),
                detail: "reply carried no source id".to_string(),
                cause: None,
            })
    }

    /// Phase 2: open an upload session and return its URL.
    pub async fn negotiate(
        &self,
        notebook_id: &str,
        filename: &str,
        size_bytes: u64,
        source_id: &str,
    ) -> Result<String, UploadError> {
        tracing::debug!(notebook_id, filename, size_bytes, "Starting upload session");

        let session_error = |detail: String| UploadError::UploadSession {
            filename: filename.to_string(),
            source_id: source_id.to_string(),
            detail,
        };

        let body = serde_json::json!({
            "PROJECT_ID": notebook_id,
            "SOURCE_NAME": filename,
            "SOURCE_ID": source_id,
        })
        .to_string();

        let response = self
            .http
            .post(&self.service.upload_url)
            .query(&[("authuser", "0")])
            .timeout(self.timeouts.negotiate())
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, NEGOTIATE_CONTENT_TYPE)
            .header(COOKIE, self.auth.cookie_header())
            .header(ORIGIN, self.origin())
            .header(REFERER, self.referer())
            .header(AUTHUSER_HEADER, "0")
            .header(UPLOAD_COMMAND_HEADER, "start")
            .header(UPLOAD_LENGTH_HEADER, size_bytes.to_string())
            .header(UPLOAD_PROTOCOL_HEADER, "resumable")
            .body(body)
            .send()
            .await
            .map_err(|e| session_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(session_error(format!("upload endpoint returned {status}")));
        }

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| session_error(format!("response has no {UPLOAD_URL_HEADER} header")))
    }

    /// Phase 3: send the file content and finalize in one request.
    pub async fn stream(
        &self,
        session: &UploadSession,
        content: FileChunkStream,
    ) -> Result<(), UploadError> {
        tracing::debug!(
            source_id = %session.source_id,
            bytes = session.file_size_bytes,
            chunk_size = self.chunk_size,
            "Streaming file content"
        );

        let result = self
            .http
            .post(&session.upload_url)
            .timeout(self.timeouts.transfer())
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, TRANSFER_CONTENT_TYPE)
            .header(COOKIE, self.auth.cookie_header())
            .header(ORIGIN, self.origin())
            .header(REFERER, self.referer())
            .header(AUTHUSER_HEADER, "0")
            .header(UPLOAD_COMMAND_HEADER, "upload, finalize")
            .header(UPLOAD_OFFSET_HEADER, "0")
            .body(content.into_body())
            .send()
            .await;

        let failure = match result {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => format!("upload endpoint returned {}", response.status()),
            Err(e) => e.to_string(),
        };

        Err(transfer_failed(session, failure))
    }

    fn origin(&self) -> String {
        self.service.base_url.trim_end_matches('/').to_string()
    }

    fn referer(&self) -> String {
        format!("{}/", self.origin())
    }
}

fn transfer_failed(session: &UploadSession, detail: String) -> UploadError {
    tracing::warn!(
        source_id = %session.source_id,
        filename = %session.filename,
        "Upload failed after registration; source left without content"
    );
    UploadError::UploadTransfer {
        filename: session.filename.clone(),
        source_id: session.source_id.clone(),
        detail,
    }
}
