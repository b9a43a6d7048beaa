//! DER ECDSA signature decoding.
//!
//! Producers emit `SEQUENCE { INTEGER r, INTEGER s }` but are not strictly
//! DER-compliant about the outer length, so the sequence and integer lengths
//! are clamped to the bytes actually present. The tag bytes are always
//! checked.

use thiserror::Error;

/// ASN.1 SEQUENCE tag.
const TAG_SEQUENCE: u8 = 0x30;
/// ASN.1 INTEGER tag.
const TAG_INTEGER: u8 = 0x02;
/// Long-form length marker for a single length byte.
const LENGTH_ONE_BYTE: u8 = 0x81;

/// Width of each scalar in the canonical layout.
pub const SCALAR_LEN: usize = 32;

/// Errors raised while decoding a signature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature bytes are not a usable DER structure.
    #[error("malformed signature: expected {expected}, found {found}")]
    Malformed {
        /// Structure the decoder expected.
        expected: &'static str,
        /// What was actually present.
        found: String,
    },
    /// An integer magnitude does not fit in 32 bytes.
    #[error("malformed signature: {field} magnitude is {len} bytes, expected at most 32")]
    Oversize {
        /// Which integer (`r` or `s`).
        field: &'static str,
        /// Stripped magnitude length.
        len: usize,
    },
    /// The base64 envelope could not be decoded.
    #[error("malformed signature: invalid base64: {0}")]
    Base64(String),
    /// A raw signature has the wrong length for its scheme.
    #[error("malformed signature: expected {expected} bytes, found {found}")]
    Length {
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// `r` or `s` is zero or not below the curve order.
    #[error("malformed signature: scalar out of range for {curve}")]
    OutOfRange {
        /// Curve whose order was exceeded.
        curve: &'static str,
    },
}

/// Fixed-width ECDSA `(r, s)` pair, both big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarPair {
    /// `r` scalar.
    pub r: [u8; SCALAR_LEN],
    /// `s` scalar.
    pub s: [u8; SCALAR_LEN],
}

impl ScalarPair {
    /// Concatenated `r‖s` (64 bytes).
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn byte(&mut self, expected: &'static str) -> Result<u8, SignatureError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| SignatureError::Malformed {
                expected,
                found: format!("end of input at offset {}", self.pos),
            })?;
        self.pos += 1;
        Ok(b)
    }

    fn tag(&mut self, tag: u8, expected: &'static str) -> Result<(), SignatureError> {
        let found = self.byte(expected)?;
        if found != tag {
            return Err(SignatureError::Malformed {
                expected,
                found: format!("tag 0x{:02x} at offset {}", found, self.pos - 1),
            });
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> &'a [u8] {
        let len = len.min(self.remaining());
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        out
    }
}

/// Decodes a DER ECDSA signature into fixed-width `(r, s)`.
///
/// # Errors
///
/// Returns [`SignatureError`] if a tag mismatches, the input ends before a
/// tag or length byte, an integer is empty or uses a long-form length, or a
/// stripped magnitude exceeds 32 bytes.
pub fn decode_der_signature(der: &[u8]) -> Result<ScalarPair, SignatureError> {
    let mut cursor = Cursor::new(der);
    cursor.tag(TAG_SEQUENCE, "SEQUENCE tag 0x30")?;

    let mut seq_len = cursor.byte("SEQUENCE length")? as usize;
    if seq_len == LENGTH_ONE_BYTE as usize {
        seq_len = cursor.byte("SEQUENCE long-form length")? as usize;
    }
    // Upstream producers sometimes overstate the length; clamp it.
    let seq_len = seq_len.min(cursor.remaining());
    let mut body = Cursor::new(cursor.take(seq_len));

    let r = read_integer(&mut body, "r")?;
    let s = read_integer(&mut body, "s")?;
    Ok(ScalarPair { r, s })
}

fn read_integer(cursor: &mut Cursor<'_>, field: &'static str) -> Result<[u8; SCALAR_LEN], SignatureError> {
    let expected = match field {
        "r" => "INTEGER tag 0x02 for r",
        _ => "INTEGER tag 0x02 for s",
    };
    cursor.tag(TAG_INTEGER, expected)?;
    let len = cursor.byte("INTEGER length")?;
    if len == 0 || len >= 0x80 {
        return Err(SignatureError::Malformed {
            expected: "short-form non-zero INTEGER length",
            found: format!("length byte 0x{:02x} for {}", len, field),
        });
    }
    let magnitude = strip_leading_zeros(cursor.take(len as usize));
    pad_scalar(magnitude, field)
}

/// Strips leading zero bytes, keeping at least one byte.
fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() && bytes[start] == 0 {
        start += 1;
    }
    &bytes[start..]
}

fn pad_scalar(magnitude: &[u8], field: &'static str) -> Result<[u8; SCALAR_LEN], SignatureError> {
    if magnitude.len() > SCALAR_LEN {
        return Err(SignatureError::Oversize {
            field,
            len: magnitude.len(),
        });
    }
    let mut out = [0u8; SCALAR_LEN];
    out[SCALAR_LEN - magnitude.len()..].copy_from_slice(magnitude);
    Ok(out)
}
