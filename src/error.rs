//! Error types for the marketplace wallet

use crate::chain::Chain;
use crate::provider::RpcError;
use thiserror::Error;

/// Broad classes of failure, used by callers to decide what to show the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-actionable; the message is meant for display
    Guidance,
    /// A caller or programmer contract was violated
    Precondition,
    /// The wallet backend, remote services or local storage failed
    Backend,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please connect to the {} network", .0.display_name())]
    WrongNetwork(Chain),

    #[error("Unsupported signature standard: {0}")]
    UnsupportedStandard(String),

    #[error("There was a problem switching the network: {0}")]
    SwitchChainFailed(RpcError),

    #[error("There was a problem adding the network: {0}")]
    AddChainFailed(RpcError),

    #[error("Malformed signature length: expected 132 characters, got {0}")]
    MalformedSignatureLength(usize),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Chain network ID not found for {0:?}")]
    ChainNetworkIdNotFound(Chain),

    #[error("Unexpected chain id: {0}")]
    UnexpectedChainId(String),

    #[error("Account not connected: {0}")]
    AccountNotConnected(String),

    #[error("Could not find wallet provider matching current account")]
    ProviderNotFound,

    #[error("Wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid typed data: {0}")]
    InvalidTypedData(String),

    #[error("Wallet RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Unexpected response from wallet: {0}")]
    UnexpectedResponse(String),

    #[error("Account source error: {0}")]
    AccountSource(String),

    #[error("Session storage error: {0}")]
    Session(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::WrongNetwork(_)
            | Error::UnsupportedStandard(_)
            | Error::SwitchChainFailed(_)
            | Error::AddChainFailed(_) => ErrorKind::Guidance,
            Error::MalformedSignatureLength(_)
            | Error::MalformedSignature(_)
            | Error::ChainNetworkIdNotFound(_)
            | Error::UnexpectedChainId(_)
            | Error::AccountNotConnected(_)
            | Error::ProviderNotFound
            | Error::ProviderUnavailable(_)
            | Error::InvalidTypedData(_) => ErrorKind::Precondition,
            Error::Rpc(_)
            | Error::UnexpectedResponse(_)
            | Error::AccountSource(_)
            | Error::Session(_)
            | Error::Config(_)
            | Error::Network(_)
            | Error::Json(_) => ErrorKind::Backend,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
