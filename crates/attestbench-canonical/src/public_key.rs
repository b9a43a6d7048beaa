//! Public key normalization.
//!
//! Producers changed how they export keys between versions without tagging
//! the format, so the encoding is detected from the bytes. Detection order
//! for ECDSA keys:
//!
//! 1. [`KeyEncoding::RawPoint`]: exactly 64 bytes `X || Y`.
//! 2. [`KeyEncoding::Sec1Uncompressed`]: 65 bytes starting with `0x04`.
//! 3. [`KeyEncoding::SpkiEmbedded`]: an SPKI structure whose BIT STRING
//!    header `03 42 00 04` is followed by the 64 point bytes.
//! 4. [`KeyEncoding::FixedOffset`]: a blob of at least 91 bytes assumed to
//!    carry a 27-byte prefix; the trailing 64 bytes are the point. Only
//!    reached when the structural scan finds nothing.
//!
//! Ed25519 keys take the trailing 32 bytes, which covers both raw keys and
//! the 44-byte SPKI wrapping.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::scheme::Scheme;

/// Marker byte of an uncompressed SEC1 point.
const SEC1_UNCOMPRESSED: u8 = 0x04;

/// BIT STRING header that precedes an uncompressed P-256/secp256k1 point in SPKI.
const SPKI_POINT_HEADER: [u8; 4] = [0x03, 0x42, 0x00, SEC1_UNCOMPRESSED];

/// Prefix length assumed by the fixed-offset fallback (P-256 SPKI header).
pub const FIXED_PREFIX_LEN: usize = 27;

const POINT_LEN: usize = 64;
const ED25519_KEY_LEN: usize = 32;

/// Errors raised while normalizing a public key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key bytes match no known encoding for the scheme.
    #[error("malformed {scheme} public key: {reason} ({len} bytes)")]
    Malformed {
        /// Scheme the key was extracted for.
        scheme: Scheme,
        /// Why no encoding matched.
        reason: &'static str,
        /// Decoded length.
        len: usize,
    },
    /// The base64 envelope could not be decoded.
    #[error("malformed {scheme} public key: invalid base64: {message}")]
    Base64 {
        /// Scheme the key was extracted for.
        scheme: Scheme,
        /// Decoder message.
        message: String,
    },
}

/// Encoding a key was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    /// Ed25519 key, raw or with a fixed-length prefix.
    Ed25519Trailing,
    /// Bare `X || Y`.
    RawPoint,
    /// `0x04 || X || Y`.
    Sec1Uncompressed,
    /// Point located by scanning for the SPKI BIT STRING header.
    SpkiEmbedded,
    /// Trailing 64 bytes after an assumed 27-byte prefix.
    FixedOffset,
}

impl KeyEncoding {
    /// Short lowercase name for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyEncoding::Ed25519Trailing => "ed25519-trailing",
            KeyEncoding::RawPoint => "raw-point",
            KeyEncoding::Sec1Uncompressed => "sec1-uncompressed",
            KeyEncoding::SpkiEmbedded => "spki-embedded",
            KeyEncoding::FixedOffset => "fixed-offset",
        }
    }
}

/// Public key in the fixed layout the verifier expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKey {
    /// Scheme the key belongs to.
    pub scheme: Scheme,
    /// Normalized bytes (64 for ECDSA, 32 for Ed25519).
    pub bytes: Vec<u8>,
    /// Encoding the key was detected in.
    pub encoding: KeyEncoding,
}

impl NormalizedKey {
    /// The ECDSA point as a fixed array, if this is an ECDSA key.
    pub fn point(&self) -> Option<[u8; 64]> {
        <[u8; 64]>::try_from(self.bytes.as_slice()).ok()
    }
}

/// Decodes a base64 key and normalizes it for `scheme`.
pub fn normalize_public_key(scheme: Scheme, b64: &str) -> Result<NormalizedKey, KeyError> {
    let bytes = BASE64.decode(b64.trim()).map_err(|e| KeyError::Base64 {
        scheme,
        message: e.to_string(),
    })?;
    normalize_public_key_bytes(scheme, &bytes)
}

/// Normalizes already decoded key bytes for `scheme`.
pub fn normalize_public_key_bytes(scheme: Scheme, bytes: &[u8]) -> Result<NormalizedKey, KeyError> {
    let (encoding, normalized) = match scheme {
        Scheme::Ed25519 => {
            if bytes.len() < ED25519_KEY_LEN {
                return Err(KeyError::Malformed {
                    scheme,
                    reason: "shorter than 32 bytes",
                    len: bytes.len(),
                });
            }
            (
                KeyEncoding::Ed25519Trailing,
                bytes[bytes.len() - ED25519_KEY_LEN..].to_vec(),
            )
        }
        Scheme::EcdsaK1 | Scheme::EcdsaR1 => {
            let (encoding, point) = extract_point(bytes).ok_or(KeyError::Malformed {
                scheme,
                reason: "no raw, SEC1, SPKI or fixed-offset point found",
                len: bytes.len(),
            })?;
            (encoding, point.to_vec())
        }
    };

    if normalized.len() != scheme.public_key_len() {
        return Err(KeyError::Malformed {
            scheme,
            reason: "normalized length does not match scheme",
            len: normalized.len(),
        });
    }

    Ok(NormalizedKey {
        scheme,
        bytes: normalized,
        encoding,
    })
}

fn extract_point(bytes: &[u8]) -> Option<(KeyEncoding, [u8; 64])> {
    if bytes.len() == POINT_LEN {
        return Some((KeyEncoding::RawPoint, to_point(bytes)));
    }
    if bytes.len() == POINT_LEN + 1 && bytes[0] == SEC1_UNCOMPRESSED {
        return Some((KeyEncoding::Sec1Uncompressed, to_point(&bytes[1..])));
    }
    if let Some(point) = extract_structural(bytes) {
        return Some((KeyEncoding::SpkiEmbedded, point));
    }
    extract_fixed_offset(bytes).map(|point| (KeyEncoding::FixedOffset, point))
}

/// Finds the SPKI BIT STRING header and returns the 64 bytes after it.
pub fn extract_structural(bytes: &[u8]) -> Option<[u8; 64]> {
    bytes
        .windows(SPKI_POINT_HEADER.len())
        .position(|window| window == &SPKI_POINT_HEADER[..])
        .map(|at| at + SPKI_POINT_HEADER.len())
        .filter(|start| start + POINT_LEN <= bytes.len())
        .map(|start| to_point(&bytes[start..start + POINT_LEN]))
}

/// Takes the trailing 64 bytes of a blob with room for a 27-byte prefix.
pub fn extract_fixed_offset(bytes: &[u8]) -> Option<[u8; 64]> {
    if bytes.len() < FIXED_PREFIX_LEN + POINT_LEN {
        return None;
    }
    Some(to_point(&bytes[bytes.len() - POINT_LEN..]))
}

fn to_point(bytes: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(bytes);
    out
}
