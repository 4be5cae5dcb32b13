//! JSON-RPC transport contract consumed by EVM providers
//!
//! The transport is whatever actually talks to the wallet: an injected
//! EIP-1193 object, a WalletConnect session, or a custodial SDK bridge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// EIP-1193 error codes the providers react to
pub mod codes {
    /// User rejected the request
    pub const USER_REJECTED: i64 = 4001;
    /// Requested chain has not been added to the wallet
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
}

/// Error returned by a wallet backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == codes::USER_REJECTED
    }
}

/// Callback for backend-pushed events; receives the raw event payload
pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Handle returned by event subscriptions
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    /// Issue one request and wait for its result
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Register a handler for a pushed event (`accountsChanged`, `chainChanged`)
    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription;

    /// Tear down the backend session, if the backend has one
    async fn close(&self) -> Result<(), RpcError> {
        Ok(())
    }
}
