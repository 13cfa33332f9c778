//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notebooklm_sources::traits::{RpcCaller, RpcError, RpcMethod};
use notebooklm_sources::{AuthContext, RawReply};
use serde_json::Value;

/// One recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: RpcMethod,
    pub params: Vec<Value>,
    pub source_path: String,
    pub allow_null: bool,
}

/// An in-memory RPC caller with canned replies per method.
///
/// Methods without a canned reply answer `Null`.
#[derive(Default)]
pub struct FakeRpc {
    replies: Mutex<HashMap<RpcMethod, Result<RawReply, RpcError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, method: RpcMethod, reply: Value) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .insert(method, Ok(RawReply::from(reply)));
        self.clone()
    }

    pub fn fail(self: &Arc<Self>, method: RpcMethod, error: RpcError) -> Arc<Self> {
        self.replies.lock().unwrap().insert(method, Err(error));
        self.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: RpcMethod) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }
}

#[async_trait]
impl RpcCaller for FakeRpc {
    async fn invoke(
        &self,
        method: RpcMethod,
        params: Vec<Value>,
        source_path: &str,
        allow_null: bool,
    ) -> Result<RawReply, RpcError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            params,
            source_path: source_path.to_string(),
            allow_null,
        });
        self.replies
            .lock()
            .unwrap()
            .get(&method)
            .cloned()
            .unwrap_or(Ok(RawReply::Null))
    }
}

pub fn test_auth() -> Arc<AuthContext> {
    let cookies = BTreeMap::from([
        ("HSID".to_string(), "hsid-value".to_string()),
        ("SID".to_string(), "sid-value".to_string()),
    ]);
    Arc::new(AuthContext::new(cookies, "csrf-token", "session-id").unwrap())
}
