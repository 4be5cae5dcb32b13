//! EVM provider shared by every Ethereum-compatible wallet backend
//!
//! Implements the chain-switch protocol (switch, add when the wallet does not
//! know the chain) and signature normalization on top of a raw JSON-RPC
//! transport. Backend differences are limited to session teardown.

use super::transport::{codes, JsonRpcTransport, Subscription};
use super::{AccountsChangeHandler, ChainChangeHandler, Transaction, WalletProvider};
use crate::account::{AccountKey, Address};
use crate::chain::{Chain, NativeCurrency};
use crate::config::RpcConfig;
use crate::signature::{
    encode_personal_message, reorder_rsv_to_vrs, typed_data_signing_hash, SignOptions,
    SignatureStandard, PERSONAL_SIGN_OF_TYPED_HASH_TAG,
};
use crate::{Error, Result};
use alloy::primitives::{hex, Bytes, U256};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Kind of EVM wallet backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvmBackend {
    /// Browser-injected provider (MetaMask, Coinbase Wallet, ...)
    Injected,
    WalletConnect,
    /// Custodial SDK
    Portis,
}

impl EvmBackend {
    /// Backend for a provider name. Unknown names are treated as injected
    /// wallets, which register under their own brand names.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "walletconnect" => EvmBackend::WalletConnect,
            "portis" => EvmBackend::Portis,
            _ => EvmBackend::Injected,
        }
    }

    /// Whether the backend holds a session that must be closed on disconnect
    pub fn has_session(&self) -> bool {
        !matches!(self, EvmBackend::Injected)
    }
}

/// Parameter object for `wallet_addEthereumChain`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddEthereumChainParameter {
    chain_id: String,
    chain_name: &'static str,
    native_currency: NativeCurrency,
    rpc_urls: Vec<String>,
    block_explorer_urls: Vec<&'static str>,
}

pub struct EvmProvider {
    name: String,
    backend: EvmBackend,
    transport: Arc<dyn JsonRpcTransport>,
    rpc: RpcConfig,
}

impl EvmProvider {
    pub fn new(
        name: impl Into<String>,
        backend: EvmBackend,
        transport: Arc<dyn JsonRpcTransport>,
        rpc: RpcConfig,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            transport,
            rpc,
        }
    }

    pub fn backend(&self) -> EvmBackend {
        self.backend
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        debug!(provider = %self.name, method, "Wallet request");
        Ok(self.transport.request(method, params).await?)
    }

    async fn account_addresses(&self) -> Result<Vec<Address>> {
        let value = self.request("eth_accounts", json!([])).await?;
        let items = value.as_array().ok_or_else(|| {
            Error::UnexpectedResponse(format!("eth_accounts returned {}", value))
        })?;
        Ok(items
            .iter()
            .filter_map(|v| v.as_str())
            .map(Address::new)
            .collect())
    }

    async fn resolve_chain(&self) -> Result<Chain> {
        let raw = self.request("eth_chainId", json!([])).await?;
        parse_network_id(&raw)
            .and_then(Chain::from_network_id)
            .ok_or_else(|| Error::UnexpectedChainId(raw.to_string()))
    }

    async fn ensure_connected(&self, address: &Address) -> Result<()> {
        let connected = self.account_addresses().await?;
        if connected.contains(address) {
            Ok(())
        } else {
            Err(Error::AccountNotConnected(address.to_string()))
        }
    }

    async fn add_chain(&self, chain: Chain, chain_id: String) -> Result<()> {
        let metadata = chain.metadata();
        let rpc_url = self
            .rpc
            .get(chain)
            .unwrap_or(metadata.rpc_url)
            .to_string();
        let parameter = AddEthereumChainParameter {
            chain_id,
            chain_name: metadata.display_name,
            native_currency: metadata.native_currency,
            rpc_urls: vec![rpc_url],
            block_explorer_urls: vec![metadata.explorer_url],
        };

        self.transport
            .request("wallet_addEthereumChain", json!([parameter]))
            .await
            .map_err(Error::AddChainFailed)?;
        info!(provider = %self.name, chain = ?chain, "Added chain to wallet");
        Ok(())
    }
}

impl fmt::Debug for EvmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmProvider")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish()
    }
}

#[async_trait]
impl WalletProvider for EvmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<()> {
        match self.transport.request("eth_requestAccounts", json!([])).await {
            Ok(_) => Ok(()),
            Err(e) if e.code == codes::METHOD_NOT_FOUND => {
                warn!(provider = %self.name, error = %e, "No explicit connect step, assuming connected");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        if self.backend.has_session() {
            self.transport.close().await?;
            debug!(provider = %self.name, "Closed wallet session");
        }
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<AccountKey>> {
        let addresses = self.account_addresses().await?;
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let chain = self.resolve_chain().await?;
        Ok(addresses
            .into_iter()
            .map(|address| AccountKey { address, chain })
            .collect())
    }

    async fn get_balance(&self, address: &Address) -> Result<U256> {
        let value = self
            .request("eth_getBalance", json!([address.as_str(), "latest"]))
            .await?;
        value
            .as_str()
            .and_then(|s| s.parse::<U256>().ok())
            .ok_or_else(|| Error::UnexpectedResponse(format!("eth_getBalance returned {}", value)))
    }

    async fn sign(
        &self,
        message: &str,
        address: &Address,
        options: SignOptions,
    ) -> Result<String> {
        let standard = options.standard.unwrap_or(SignatureStandard::Personal);
        if standard.is_personal() {
            let params = json!([encode_personal_message(message), address.as_str()]);
            return as_signature(self.request("personal_sign", params).await?);
        }

        let hash = typed_data_signing_hash(message)?;
        let params = json!([hash.to_string(), address.as_str()]);
        let raw = as_signature(self.request("personal_sign", params).await?)?;
        let reordered = reorder_rsv_to_vrs(&raw)?;
        Ok(format!("{}{}", reordered, PERSONAL_SIGN_OF_TYPED_HASH_TAG))
    }

    async fn sign_typed_data(
        &self,
        message: &str,
        address: &Address,
        options: SignOptions,
    ) -> Result<String> {
        let standard = options.standard.unwrap_or(SignatureStandard::TypedDataV4);
        let params = if standard.is_personal() {
            json!([encode_personal_message(message), address.as_str()])
        } else {
            json!([address.as_str(), message])
        };
        let raw = as_signature(self.request(standard.rpc_method(), params).await?)?;
        reorder_rsv_to_vrs(&raw)
    }

    async fn transact(&self, transaction: &Transaction) -> Result<String> {
        self.ensure_connected(&transaction.source).await?;
        let value = self
            .request(
                "eth_sendTransaction",
                json!([transaction_params(transaction)]),
            )
            .await?;
        value.as_str().map(str::to_string).ok_or_else(|| {
            Error::UnexpectedResponse(format!("eth_sendTransaction returned {}", value))
        })
    }

    async fn call(&self, transaction: &Transaction) -> Result<Bytes> {
        self.ensure_connected(&transaction.source).await?;
        let value = self
            .request(
                "eth_call",
                json!([transaction_params(transaction), "latest"]),
            )
            .await?;
        value
            .as_str()
            .and_then(|s| s.parse::<Bytes>().ok())
            .ok_or_else(|| Error::UnexpectedResponse(format!("eth_call returned {}", value)))
    }

    fn on_accounts_change(&self, handler: AccountsChangeHandler) -> Subscription {
        let provider = self.name.clone();
        self.transport.subscribe(
            "accountsChanged",
            Arc::new(move |payload: Value| {
                let Some(items) = payload.as_array() else {
                    warn!(
                        provider = %provider,
                        payload = %payload,
                        "Ignoring malformed accountsChanged payload"
                    );
                    return;
                };
                let addresses = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(Address::new)
                    .collect();
                handler(addresses);
            }),
        )
    }

    fn on_chain_change(&self, handler: ChainChangeHandler) -> Subscription {
        let provider = self.name.clone();
        self.transport.subscribe(
            "chainChanged",
            Arc::new(move |payload: Value| {
                let chain = parse_network_id(&payload)
                    .and_then(Chain::from_network_id)
                    .ok_or_else(|| Error::UnexpectedChainId(payload.to_string()));
                if let Err(e) = &chain {
                    warn!(provider = %provider, error = %e, "Chain changed to an unsupported network");
                }
                handler(chain);
            }),
        )
    }

    async fn switch_chain(&self, chain: Chain) -> Result<()> {
        let network_id = chain
            .network_id()
            .ok_or(Error::ChainNetworkIdNotFound(chain))?;
        let chain_id = format!("0x{:x}", network_id);

        let result = self
            .transport
            .request("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await;

        match result {
            Ok(_) => {
                info!(provider = %self.name, chain = ?chain, "Switched chain");
                Ok(())
            }
            // Adding a chain leaves the wallet on it, so no second switch
            Err(e) if e.code == codes::UNRECOGNIZED_CHAIN => {
                debug!(provider = %self.name, chain = ?chain, "Chain unknown to wallet, adding it");
                self.add_chain(chain, chain_id).await
            }
            Err(e) if e.is_user_rejection() => {
                info!(provider = %self.name, chain = ?chain, "User declined chain switch");
                Ok(())
            }
            Err(e) => Err(Error::SwitchChainFailed(e)),
        }
    }

    async fn get_chain(&self) -> Option<Chain> {
        match self.resolve_chain().await {
            Ok(chain) => Some(chain),
            Err(e) => {
                debug!(provider = %self.name, error = %e, "Could not resolve connected chain");
                None
            }
        }
    }
}

/// Network ids arrive as hex strings ("0x1"), decimal strings or numbers
fn parse_network_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex_id) => u64::from_str_radix(hex_id, 16).ok(),
            None => s.parse().ok(),
        },
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn as_signature(value: Value) -> Result<String> {
    match value {
        Value::String(signature) => Ok(signature),
        other => Err(Error::UnexpectedResponse(format!(
            "expected a hex signature, got {}",
            other
        ))),
    }
}

fn transaction_params(transaction: &Transaction) -> Value {
    let mut params = Map::new();
    params.insert("from".into(), json!(transaction.source.as_str()));
    if let Some(destination) = &transaction.destination {
        params.insert("to".into(), json!(destination.as_str()));
    }
    if let Some(value) = transaction.value {
        params.insert("value".into(), json!(format!("0x{:x}", value)));
    }
    if let Some(data) = &transaction.data {
        params.insert("data".into(), json!(hex::encode_prefixed(data)));
    }
    Value::Object(params)
}
