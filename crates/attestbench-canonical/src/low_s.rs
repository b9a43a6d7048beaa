//! Low-S canonicalization.
//!
//! ECDSA signatures are malleable: `(r, s)` and `(r, N - s)` both verify. The
//! on-chain secp256k1 path only accepts `s <= N/2`, so high values are
//! replaced by their complement. The scalars go through `k256` so that
//! values outside `[1, N)` are rejected instead of wrapped.

use k256::ecdsa::Signature;
use std::fmt;

use crate::der::{ScalarPair, SignatureError, SCALAR_LEN};

/// Short Weierstrass curves carried by ECDSA attestations.
///
/// Only [`Curve::Secp256k1`] signatures are canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// secp256k1.
    Secp256k1,
    /// NIST P-256.
    P256,
}

impl Curve {
    /// Curve name for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Curve::Secp256k1 => "secp256k1",
            Curve::P256 => "P-256",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Brings a secp256k1 `(r, s)` into low-S form.
///
/// Idempotent: a canonical pair is returned unchanged.
///
/// # Errors
///
/// Returns [`SignatureError::OutOfRange`] if `r` or `s` is zero or not below
/// the group order.
pub fn canonicalize_k1(pair: &ScalarPair) -> Result<ScalarPair, SignatureError> {
    let signature = k1_signature(pair)?;
    let low = signature.normalize_s().unwrap_or(signature);
    Ok(to_pair(&low))
}

/// Whether a secp256k1 pair already satisfies `s <= N/2`.
///
/// # Errors
///
/// Returns [`SignatureError::OutOfRange`] for scalars outside `[1, N)`.
pub fn is_low_s(pair: &ScalarPair) -> Result<bool, SignatureError> {
    Ok(k1_signature(pair)?.normalize_s().is_none())
}

fn k1_signature(pair: &ScalarPair) -> Result<Signature, SignatureError> {
    Signature::from_scalars(pair.r, pair.s).map_err(|_| SignatureError::OutOfRange {
        curve: Curve::Secp256k1.as_str(),
    })
}

fn to_pair(signature: &Signature) -> ScalarPair {
    let (r_bytes, s_bytes) = signature.split_bytes();
    let mut r = [0u8; SCALAR_LEN];
    let mut s = [0u8; SCALAR_LEN];
    r.copy_from_slice(&r_bytes);
    s.copy_from_slice(&s_bytes);
    ScalarPair { r, s }
}
