//! Data types that flow through source ingestion.

use std::path::{Path, PathBuf};

/// A local file about to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: PathBuf,
    /// Name the service will display; the final path component.
    pub filename: String,
    pub size_bytes: u64,
}

impl FileUpload {
    /// Stat `path`. Fails if it is missing or not a regular file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            size_bytes: metadata.len(),
        })
    }
}

/// State of one resumable upload, filled in phase by phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub notebook_id: String,
    pub filename: String,
    pub file_size_bytes: u64,
    /// Assigned by the service at registration.
    pub source_id: String,
    /// Assigned by the upload endpoint at negotiation.
    pub upload_url: String,
}

/// Which path an added source took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestedKind {
    File,
    Video,
    Url,
}

/// Outcome of a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResult {
    pub source_id: String,
    pub kind: IngestedKind,
}
