//! Provider factories
//!
//! The wallet asks a factory for a provider by backend name whenever it
//! installs or reconnects one.

use super::evm::{EvmBackend, EvmProvider};
use super::transport::JsonRpcTransport;
use super::WalletProvider;
use crate::config::RpcConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Produce a provider for `name`, or `None` when the backend is unavailable
    async fn create(&self, name: &str) -> Option<Arc<dyn WalletProvider>>;
}

type TransportConnector =
    dyn Fn(&str, EvmBackend) -> Option<Arc<dyn JsonRpcTransport>> + Send + Sync;

/// Factory for EVM backends
///
/// The connector hands out the JSON-RPC transport for a backend (the injected
/// object, a WalletConnect session, ...) or `None` when it is not present.
pub struct EvmProviderFactory {
    rpc: RpcConfig,
    connector: Box<TransportConnector>,
}

impl EvmProviderFactory {
    pub fn new<F>(rpc: RpcConfig, connector: F) -> Self
    where
        F: Fn(&str, EvmBackend) -> Option<Arc<dyn JsonRpcTransport>> + Send + Sync + 'static,
    {
        Self {
            rpc,
            connector: Box::new(connector),
        }
    }
}

#[async_trait]
impl ProviderFactory for EvmProviderFactory {
    async fn create(&self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        let backend = EvmBackend::from_name(name);
        let Some(transport) = (self.connector)(name, backend) else {
            warn!(provider = name, backend = ?backend, "Wallet backend not available");
            return None;
        };
        debug!(provider = name, backend = ?backend, "Created EVM provider");
        Some(Arc::new(EvmProvider::new(
            name,
            backend,
            transport,
            self.rpc.clone(),
        )))
    }
}
