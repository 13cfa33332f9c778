//! # notebooklm-sources core
//!
//! Shared, I/O-free logic for the notebooklm-sources client: reply decoding,
//! source classification, RPC parameter layouts, cookie filtering and token
//! scraping.
//!
//! This crate contains no tokio, reqwest, or filesystem I/O. Anything that
//! needs the network or the disk is injected by the caller (see
//! [`classify::classify_with`]).

pub mod classify;
pub mod cookies;
pub mod params;
pub mod reply;
pub mod tokens;

pub use classify::{classify_with, parse_video_id, SourceKind};
pub use cookies::{DownloadCookie, MissingCookieError, StorageState, StoredCookie};
pub use reply::{extract_identifier, RawReply, Scalar};
