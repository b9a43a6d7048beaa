use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::low_s::Curve;

/// Signature schemes accepted from attestation producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scheme {
    /// ECDSA over secp256k1.
    #[serde(rename = "ecdsa-k1")]
    EcdsaK1,
    /// ECDSA over NIST P-256 (secp256r1).
    #[serde(rename = "ecdsa-r1")]
    EcdsaR1,
    /// Ed25519 (raw 64-byte signatures).
    #[serde(rename = "ed25519")]
    Ed25519,
}

/// Error returned when a scheme tag is not one of the supported schemes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signature scheme '{0}'")]
pub struct UnknownScheme(pub String);

impl Scheme {
    /// All supported schemes, in registry order.
    pub const ALL: [Scheme; 3] = [Scheme::EcdsaK1, Scheme::EcdsaR1, Scheme::Ed25519];

    /// Scheme assumed by records that predate the `scheme` field.
    pub const IMPLICIT: Scheme = Scheme::EcdsaK1;

    /// Wire tag used in logs, calldata and the address registry.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::EcdsaK1 => "ecdsa-k1",
            Scheme::EcdsaR1 => "ecdsa-r1",
            Scheme::Ed25519 => "ed25519",
        }
    }

    /// Length of a normalized public key for this scheme.
    pub fn public_key_len(self) -> usize {
        match self {
            Scheme::EcdsaK1 | Scheme::EcdsaR1 => 64,
            Scheme::Ed25519 => 32,
        }
    }

    /// Length of the canonical signature bytes for this scheme.
    pub fn signature_len(self) -> usize {
        64
    }

    /// Curve of the ECDSA schemes; `None` for Ed25519.
    pub fn curve(self) -> Option<Curve> {
        match self {
            Scheme::EcdsaK1 => Some(Curve::Secp256k1),
            Scheme::EcdsaR1 => Some(Curve::P256),
            Scheme::Ed25519 => None,
        }
    }

    /// Curve whose signatures are forced into low-S form.
    ///
    /// Only secp256k1 is canonicalized; P-256 and Ed25519 signatures pass
    /// through unchanged.
    pub fn low_s_curve(self) -> Option<Curve> {
        match self {
            Scheme::EcdsaK1 => Some(Curve::Secp256k1),
            Scheme::EcdsaR1 | Scheme::Ed25519 => None,
        }
    }

    /// Whether a signer address can be recovered from signatures of this scheme.
    pub fn supports_recovery(self) -> bool {
        matches!(self, Scheme::EcdsaK1)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s.trim())
            .ok_or_else(|| UnknownScheme(s.to_string()))
    }
}
