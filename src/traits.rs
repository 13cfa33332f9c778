//! The remote-procedure-call seam.
//!
//! Every source operation except the raw byte upload goes through the
//! service's batched RPC endpoint. Encoding that endpoint (method codes,
//! envelope framing, request signing with the CSRF token) is the job of a
//! transport crate; this crate only needs:
//!
//! ```text
//! invoke(method, positional params, notebook path, allow_null) -> RawReply
//! ```
//!
//! Implement [`RpcCaller`] over your transport and hand it to
//! [`SourcesApi`](crate::sources::SourcesApi).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use notebooklm_sources::traits::{RpcCaller, RpcError, RpcMethod};
//! use notebooklm_sources::RawReply;
//! use serde_json::Value;
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl RpcCaller for Offline {
//!     async fn invoke(
//!         &self,
//!         method: RpcMethod,
//!         _params: Vec<Value>,
//!         _source_path: &str,
//!         _allow_null: bool,
//!     ) -> Result<RawReply, RpcError> {
//!         Err(RpcError::Transport {
//!             method,
//!             message: "offline".to_string(),
//!         })
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use notebooklm_sources_core::RawReply;
use serde_json::Value;
use thiserror::Error;

/// The RPC operations this crate issues. Wire codes belong to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// Add a URL or video reference.
    AddSource,
    /// Register a file upload and obtain its source id.
    AddSourceFile,
    ListSources,
    DeleteSource,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::AddSource => "ADD_SOURCE",
            RpcMethod::AddSourceFile => "ADD_SOURCE_FILE",
            RpcMethod::ListSources => "LIST_SOURCES",
            RpcMethod::DeleteSource => "DELETE_SOURCE",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by an [`RpcCaller`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("{method} failed: {message}")]
    Transport { method: RpcMethod, message: String },

    #[error("{method} timed out after {elapsed:?}")]
    Timeout { method: RpcMethod, elapsed: Duration },

    /// The service answered with no payload and the call did not allow it.
    #[error("{method} returned no data")]
    NullReply { method: RpcMethod },
}

/// A transport able to invoke service RPCs.
///
/// Implementations must be `Send + Sync`; one caller is shared by every
/// concurrent source operation.
#[async_trait]
pub trait RpcCaller: Send + Sync {
    /// Invoke `method` with positional `params` in the context of
    /// `source_path` (e.g. `/notebook/<id>`).
    ///
    /// With `allow_null` set, an empty reply is returned as
    /// [`RawReply::Null`] instead of [`RpcError::NullReply`].
    async fn invoke(
        &self,
        method: RpcMethod,
        params: Vec<Value>,
        source_path: &str,
        allow_null: bool,
    ) -> Result<RawReply, RpcError>;
}
