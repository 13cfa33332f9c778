//! # notebooklm-sources
//!
//! Source ingestion for NotebookLM notebooks: turn a local file, a video
//! link or any web URL into a notebook source, and list or delete existing
//! sources.
//!
//! ## Architecture
//!
//! ```text
//! storage_state.json ──▶ TokenAcquirer ──▶ Arc<AuthContext>
//!                                               │
//!        raw input ──▶ classify ──┬─ LocalFile ─▶ ResumableUploadClient
//!                                 │                register / negotiate / stream
//!                                 ├─ Video ────┐
//!                                 └─ Url ──────┴─▶ RpcCaller (AddSource)
//! ```
//!
//! Pure logic (reply decoding, classification, parameter layouts, cookie
//! filtering, token scraping) lives in the `notebooklm-sources-core` crate
//! and is re-exported here. This crate adds the network and filesystem side.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notebooklm_sources::{Config, SourcesApi, TokenAcquirer};
//! use notebooklm_sources::traits::RpcCaller;
//!
//! # async fn run(rpc: Arc<dyn RpcCaller>) -> anyhow::Result<()> {
//! let config = Config::default();
//! let auth = TokenAcquirer::new(&config)?.acquire_shared(None).await?;
//! let sources = SourcesApi::new(&config, rpc, auth)?;
//!
//! let added = sources.add("nb-1", "https://youtu.be/abc123").await?;
//! println!("added {}", added.source_id);
//! # Ok(())
//! # }
//! ```
//!
//! The RPC transport is not part of this crate; see [`traits::RpcCaller`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Cookie loading and token scraping |
//! | [`config`] | TOML configuration |
//! | [`error`] | Error enums per phase |
//! | [`models`] | Upload and ingest data types |
//! | [`sources`] | Public add / list / delete |
//! | [`traits`] | RPC seam |
//! | [`upload`] | Three-phase resumable upload |

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod sources;
pub mod traits;
pub mod upload;

pub use notebooklm_sources_core::{
    extract_identifier, parse_video_id, DownloadCookie, RawReply, Scalar, SourceKind,
};

pub use auth::{AuthContext, DownloadCookies, TokenAcquirer};
pub use config::{load_config, Config};
pub use error::{AuthError, SourceError, UploadError};
pub use models::{FileUpload, IngestResult, IngestedKind, UploadSession};
pub use sources::{classify, SourcesApi};
pub use traits::{RpcCaller, RpcError, RpcMethod};
pub use upload::{FileChunkStream, ResumableUploadClient};
