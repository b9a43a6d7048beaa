use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::der::{decode_der_signature, ScalarPair, SignatureError};
use crate::low_s::canonicalize_k1;
use crate::scheme::Scheme;

const ED25519_SIGNATURE_LEN: usize = 64;

/// Signature in the layout the verifier expects, tagged by scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalSignature {
    /// ECDSA `(r, s)`; `s` is low-S on secp256k1 and untouched on P-256.
    Ecdsa {
        /// Curve family of the signature.
        scheme: Scheme,
        /// Fixed-width scalars.
        pair: ScalarPair,
    },
    /// Raw Ed25519 `R || S`.
    Ed25519([u8; ED25519_SIGNATURE_LEN]),
}

impl CanonicalSignature {
    /// Scheme of this signature.
    pub fn scheme(&self) -> Scheme {
        match self {
            CanonicalSignature::Ecdsa { scheme, .. } => *scheme,
            CanonicalSignature::Ed25519(_) => Scheme::Ed25519,
        }
    }

    /// Canonical 64-byte encoding.
    pub fn to_bytes(&self) -> [u8; 64] {
        match self {
            CanonicalSignature::Ecdsa { pair, .. } => pair.to_bytes(),
            CanonicalSignature::Ed25519(raw) => *raw,
        }
    }

    /// The ECDSA scalars, if this is an ECDSA signature.
    pub fn scalars(&self) -> Option<&ScalarPair> {
        match self {
            CanonicalSignature::Ecdsa { pair, .. } => Some(pair),
            CanonicalSignature::Ed25519(_) => None,
        }
    }
}

/// Decodes a base64 signature and brings it into canonical form for `scheme`.
///
/// ECDSA signatures are DER-decoded; secp256k1 ones are then range checked
/// and low-S canonicalized. Ed25519 signatures must be exactly 64 raw bytes.
pub fn normalize_signature(scheme: Scheme, b64: &str) -> Result<CanonicalSignature, SignatureError> {
    let raw = BASE64
        .decode(b64.trim())
        .map_err(|e| SignatureError::Base64(e.to_string()))?;

    match scheme {
        Scheme::EcdsaK1 => {
            let pair = canonicalize_k1(&decode_der_signature(&raw)?)?;
            Ok(CanonicalSignature::Ecdsa { scheme, pair })
        }
        Scheme::EcdsaR1 => {
            let pair = decode_der_signature(&raw)?;
            Ok(CanonicalSignature::Ecdsa { scheme, pair })
        }
        Scheme::Ed25519 => {
            let blob = <[u8; ED25519_SIGNATURE_LEN]>::try_from(raw.as_slice()).map_err(|_| {
                SignatureError::Length {
                    expected: ED25519_SIGNATURE_LEN,
                    found: raw.len(),
                }
            })?;
            Ok(CanonicalSignature::Ed25519(blob))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::low_s::is_low_s;

    fn der_b64(r: &[u8; 32], s: &[u8; 32]) -> String {
        let mut body = vec![0x02, 0x21, 0x00];
        body.extend_from_slice(r);
        body.extend_from_slice(&[0x02, 0x21, 0x00]);
        body.extend_from_slice(s);
        let mut der = vec![0x30, body.len() as u8];
        der.extend(body);
        BASE64.encode(der)
    }

    #[test]
    fn k1_high_s_is_canonicalized() {
        let high = [0xF0u8; 32];
        let sig = normalize_signature(Scheme::EcdsaK1, &der_b64(&[0x81; 32], &high)).unwrap();
        let pair = sig.scalars().unwrap();
        assert_ne!(pair.s, high);
        assert!(is_low_s(pair).unwrap());
    }

    #[test]
    fn r1_high_s_is_left_alone() {
        let high = [0xF0u8; 32];
        let sig = normalize_signature(Scheme::EcdsaR1, &der_b64(&[0x81; 32], &high)).unwrap();
        assert_eq!(sig.scalars().unwrap().s, high);
        assert_eq!(sig.scheme(), Scheme::EcdsaR1);
    }

    #[test]
    fn k1_s_above_order_is_rejected() {
        let err = normalize_signature(Scheme::EcdsaK1, &der_b64(&[0x81; 32], &[0xFF; 32])).unwrap_err();
        assert_eq!(err, SignatureError::OutOfRange { curve: "secp256k1" });
        assert!(err.to_string().starts_with("malformed signature"));
    }

    #[test]
    fn ed25519_requires_64_raw_bytes() {
        let sig = normalize_signature(Scheme::Ed25519, &BASE64.encode([9u8; 64])).unwrap();
        assert_eq!(sig.to_bytes(), [9u8; 64]);

        let err = normalize_signature(Scheme::Ed25519, &BASE64.encode([9u8; 70])).unwrap_err();
        assert_eq!(
            err,
            SignatureError::Length {
                expected: 64,
                found: 70
            }
        );
    }

    #[test]
    fn empty_signature_is_malformed() {
        assert!(normalize_signature(Scheme::EcdsaK1, "").is_err());
    }
}
