//! Canonical signature and key primitives for attestation benchmarking.
//!
//! Attestations arrive as base64 blobs in whatever encoding the producing
//! runtime emitted: DER ECDSA over secp256k1 or P-256, raw Ed25519, and public
//! keys that may be raw points, SEC1 points, or SPKI-wrapped. This crate turns
//! them into the fixed-width layouts an on-chain verifier consumes.
//!
//! Every byte that ends up in verifier calldata is produced here.
//!
#![deny(missing_docs)]

/// DER ECDSA signature decoding.
pub mod der;
/// Payload digest modes.
pub mod digest;
/// Low-S canonicalization over 256-bit curve orders.
pub mod low_s;
/// Public key normalization.
pub mod public_key;
/// Signer address recovery (secp256k1).
pub mod recovery;
/// Signature scheme enumeration.
pub mod scheme;
/// Scheme-tagged canonical signatures.
pub mod signature;

pub use der::{decode_der_signature, ScalarPair, SignatureError};
pub use digest::{keccak256, sha256, DigestMode};
pub use low_s::{canonicalize_k1, is_low_s, Curve};
pub use public_key::{
    extract_fixed_offset, extract_structural, normalize_public_key, normalize_public_key_bytes,
    KeyEncoding, KeyError, NormalizedKey,
};
pub use recovery::{recover_signer, Address, RecoveredSigner, RecoveryError};
pub use scheme::{Scheme, UnknownScheme};
pub use signature::{normalize_signature, CanonicalSignature};
