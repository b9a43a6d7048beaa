use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest as _, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Prefix of the Ethereum signed-message envelope for a 32-byte message.
const ETH_SIGNED_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// How a signed payload is hashed before recovery.
///
/// The choice depends on which off-chain signer produced the attestation and
/// is made by the caller; it is never inferred from the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DigestMode {
    /// Domain separated: `keccak256(prefix || keccak256(payload))`.
    #[serde(rename = "eth-signed")]
    EthSigned,
    /// Raw `sha256(payload)`.
    #[serde(rename = "sha256")]
    #[default]
    Sha256,
}

impl DigestMode {
    /// Computes the 32-byte digest of `payload`.
    pub fn digest(self, payload: &[u8]) -> [u8; 32] {
        match self {
            DigestMode::EthSigned => {
                let inner = keccak256(payload);
                let mut hasher = Keccak256::new();
                hasher.update(ETH_SIGNED_PREFIX);
                hasher.update(inner);
                to_array(&hasher.finalize())
            }
            DigestMode::Sha256 => sha256(payload),
        }
    }

    /// Wire name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            DigestMode::EthSigned => "eth-signed",
            DigestMode::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eth-signed" => Ok(DigestMode::EthSigned),
            "sha256" => Ok(DigestMode::Sha256),
            other => Err(format!(
                "unknown digest mode '{}', expected 'eth-signed' or 'sha256'",
                other
            )),
        }
    }
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    to_array(&Keccak256::digest(data))
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    to_array(&Sha256::digest(data))
}

fn to_array(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    out
}
