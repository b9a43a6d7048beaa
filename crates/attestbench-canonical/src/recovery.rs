//! Signer address recovery for secp256k1 attestations.
//!
//! The verifier identifies signers by 20-byte account address, so the
//! recovery id that the producer never emitted has to be found by probing
//! `v = 27` and `v = 28` against the digest.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::der::ScalarPair;
use crate::digest::keccak256;

/// Recovery ids tried, in order.
pub const RECOVERY_IDS: [u8; 2] = [27, 28];

/// Errors raised by signer recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    /// Neither recovery id produced a well-formed signer.
    #[error("no recovery id in {{27, 28}} yields a valid signer; the signature is corrupt or the digest mode is wrong")]
    NoValidSigner,
    /// A signer was recovered, but never the one owning the attested key.
    #[error("no recovery id in {{27, 28}} yields signer {expected}; the signature is corrupt or the digest mode is wrong")]
    SignerMismatch {
        /// Address derived from the attested public key.
        expected: Address,
    },
    /// `(r, s)` is not a valid secp256k1 signature (zero or out of range).
    #[error("signature scalars are out of range for secp256k1")]
    InvalidScalars,
}

/// 20-byte account address, `keccak256(X || Y)[12..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derives the address of an uncompressed point `X || Y`.
    pub fn from_point(point: &[u8; 64]) -> Self {
        let hash = keccak256(point);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Address(out)
    }

    /// Derives the address of a recovered verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let encoded = key.to_encoded_point(false);
        let mut point = [0u8; 64];
        point.copy_from_slice(&encoded.as_bytes()[1..]);
        Address::from_point(&point)
    }

    /// Whether all bytes are zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| format!("invalid address '{}': {}", s, e))?;
        let array = <[u8; 20]>::try_from(bytes.as_slice())
            .map_err(|_| format!("invalid address '{}': expected 20 bytes", s))?;
        Ok(Address(array))
    }
}

/// Outcome of a successful recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredSigner {
    /// Recovered signer address.
    pub address: Address,
    /// Accepted recovery id (27 or 28).
    pub v: u8,
    /// Signature the id was found for.
    pub signature: ScalarPair,
}

impl RecoveredSigner {
    /// Signature serialized as `r || s || v` (65 bytes).
    pub fn rsv(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.signature.to_bytes());
        out[64] = self.v;
        out
    }
}

/// Recovers the signer of `digest` from a canonical `(r, s)`.
///
/// Probes recovery ids 27 then 28 and accepts the first candidate that is a
/// non-zero address. When `expected` is given, a candidate must also equal
/// it.
///
/// # Errors
///
/// Returns [`RecoveryError`] if the scalars are out of range or no recovery
/// id yields an acceptable address.
pub fn recover_signer(
    digest: &[u8; 32],
    signature: &ScalarPair,
    expected: Option<&Address>,
) -> Result<RecoveredSigner, RecoveryError> {
    let sig = Signature::from_slice(&signature.to_bytes()).map_err(|_| RecoveryError::InvalidScalars)?;

    for v in RECOVERY_IDS {
        let Some(candidate) = recover_candidate(digest, &sig, v) else {
            tracing::debug!(v, "recovery id produced no key");
            continue;
        };
        if candidate.is_zero() {
            continue;
        }
        if let Some(expected) = expected {
            if &candidate != expected {
                tracing::debug!(v, %candidate, %expected, "recovered signer does not match key");
                continue;
            }
        }
        return Ok(RecoveredSigner {
            address: candidate,
            v,
            signature: *signature,
        });
    }

    Err(match expected {
        Some(expected) => RecoveryError::SignerMismatch {
            expected: *expected,
        },
        None => RecoveryError::NoValidSigner,
    })
}

fn recover_candidate(digest: &[u8; 32], sig: &Signature, v: u8) -> Option<Address> {
    let id = RecoveryId::from_byte(v - 27)?;
    let key = VerifyingKey::recover_from_prehash(digest, sig, id).ok()?;
    Some(Address::from_verifying_key(&key))
}
