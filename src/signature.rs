//! Signature standards and normalization
//!
//! Wallet backends return 65-byte signatures in r‖s‖v order. Order
//! verification expects v‖r‖s with `v` in {27, 28}, so every typed-data
//! signature is reordered before it leaves this crate.

use crate::{Error, Result};
use alloy::dyn_abi::TypedData;
use alloy::primitives::{hex, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `0x` + 65 bytes hex encoded
pub const SIGNATURE_HEX_LEN: usize = 132;

/// Appended to a reordered signature produced by personal-signing an EIP-712
/// hash, so verifiers know which recovery path to take.
pub const PERSONAL_SIGN_OF_TYPED_HASH_TAG: &str = "03";

/// Client-side signing standard requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStandard {
    Personal,
    TypedDataV1,
    TypedDataV3,
    TypedDataV4,
}

impl SignatureStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureStandard::Personal => "personal",
            SignatureStandard::TypedDataV1 => "typed_data_v1",
            SignatureStandard::TypedDataV3 => "typed_data_v3",
            SignatureStandard::TypedDataV4 => "typed_data_v4",
        }
    }

    /// Backend RPC method that implements this standard
    pub fn rpc_method(&self) -> &'static str {
        match self {
            SignatureStandard::Personal => "personal_sign",
            SignatureStandard::TypedDataV1 => "eth_signTypedData_v1",
            SignatureStandard::TypedDataV3 => "eth_signTypedData_v3",
            SignatureStandard::TypedDataV4 => "eth_signTypedData_v4",
        }
    }

    pub fn is_personal(&self) -> bool {
        matches!(self, SignatureStandard::Personal)
    }
}

impl FromStr for SignatureStandard {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(SignatureStandard::Personal),
            "typed_data_v1" => Ok(SignatureStandard::TypedDataV1),
            "typed_data_v3" => Ok(SignatureStandard::TypedDataV3),
            "typed_data_v4" => Ok(SignatureStandard::TypedDataV4),
            _ => Err(Error::UnsupportedStandard(s.to_string())),
        }
    }
}

impl fmt::Display for SignatureStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call signing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOptions {
    /// `None` picks the entry point's default (personal for `sign`,
    /// typed-data v4 for `sign_typed_data`)
    #[serde(default)]
    pub standard: Option<SignatureStandard>,
}

impl SignOptions {
    pub fn with_standard(standard: SignatureStandard) -> Self {
        Self {
            standard: Some(standard),
        }
    }
}

/// Reorder an r‖s‖v hex signature into v‖r‖s, lifting a low-form recovery id
/// (0 or 1, as returned by some hardware wallets) to 27 or 28.
pub fn reorder_rsv_to_vrs(signature: &str) -> Result<String> {
    if signature.len() != SIGNATURE_HEX_LEN {
        return Err(Error::MalformedSignatureLength(signature.len()));
    }

    let body = signature
        .strip_prefix("0x")
        .ok_or_else(|| Error::MalformedSignature("missing 0x prefix".to_string()))?;
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::MalformedSignature(
            "signature is not hex encoded".to_string(),
        ));
    }

    let (r, rest) = body.split_at(64);
    let (s, v) = rest.split_at(64);
    let mut v = u8::from_str_radix(v, 16)
        .map_err(|e| Error::MalformedSignature(format!("invalid recovery id: {}", e)))?;
    if v < 2 {
        v += 27;
    }

    Ok(format!("0x{:02x}{}{}", v, r, s))
}

/// Hex encode a UTF-8 message for `personal_sign`
pub fn encode_personal_message(message: &str) -> String {
    format!("0x{}", hex::encode(message.as_bytes()))
}

/// Parse an EIP-712 JSON payload and compute its signing hash
pub fn typed_data_signing_hash(message: &str) -> Result<B256> {
    let typed: TypedData =
        serde_json::from_str(message).map_err(|e| Error::InvalidTypedData(e.to_string()))?;
    typed
        .eip712_signing_hash()
        .map_err(|e| Error::InvalidTypedData(e.to_string()))
}
