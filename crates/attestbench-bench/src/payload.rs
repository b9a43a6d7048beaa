//! Per-run preparation: every attestation leg is decoded, canonicalized,
//! and (on secp256k1) attributed to a signer before calldata is built.

use attestbench_canonical::{
    normalize_public_key, normalize_signature, recover_signer, Address, CanonicalSignature,
    DigestMode, NormalizedKey, RecoveredSigner, Scheme,
};
use attestbench_journal::{Leg, Run};
use serde::Serialize;
use std::fmt;

use crate::errors::PrepareError;

/// Which side of a run a leg is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Signed inside the TEE over `data`.
    Tee,
    /// Signed by the time-stamping service over `deltaPayload`.
    Ts,
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegKind::Tee => f.write_str("TEE"),
            LegKind::Ts => f.write_str("TS"),
        }
    }
}

/// One leg in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLeg {
    /// Leg identity.
    pub kind: LegKind,
    /// Signed payload, verbatim.
    pub payload: String,
    /// Canonical signature.
    pub signature: CanonicalSignature,
    /// Normalized public key, when the run carries one.
    pub public_key: Option<NormalizedKey>,
    /// Recovered signer (secp256k1 only).
    pub signer: Option<RecoveredSigner>,
}

impl PreparedLeg {
    /// Address derived from the public key, if it is an ECDSA key.
    pub fn key_address(&self) -> Option<Address> {
        self.public_key
            .as_ref()
            .and_then(NormalizedKey::point)
            .map(|point| Address::from_point(&point))
    }
}

/// A run with both legs prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRun {
    /// Position of the run in the ingested log.
    pub index: usize,
    /// Scheme of both legs.
    pub scheme: Scheme,
    /// TEE leg.
    pub tee: PreparedLeg,
    /// TS leg.
    pub ts: PreparedLeg,
}

/// Prepares both legs of `run`.
///
/// # Errors
///
/// Returns [`PrepareError`] naming the failing leg if a signature or key is
/// malformed, or if no signer can be recovered on secp256k1.
pub fn prepare_run(run: &Run, index: usize, digest: DigestMode) -> Result<PreparedRun, PrepareError> {
    let tee = prepare_leg(run.scheme, LegKind::Tee, run.tee_leg(), digest)?;
    let ts = prepare_leg(run.scheme, LegKind::Ts, run.ts_leg(), digest)?;
    tracing::debug!(
        index,
        scheme = %run.scheme,
        tee_signer = ?tee.signer.map(|s| s.address.to_string()),
        ts_signer = ?ts.signer.map(|s| s.address.to_string()),
        "prepared run"
    );
    Ok(PreparedRun {
        index,
        scheme: run.scheme,
        tee,
        ts,
    })
}

fn prepare_leg(
    scheme: Scheme,
    kind: LegKind,
    leg: Leg<'_>,
    digest: DigestMode,
) -> Result<PreparedLeg, PrepareError> {
    let signature = normalize_signature(scheme, leg.signature)
        .map_err(|source| PrepareError::MalformedSignature { leg: kind, source })?;

    let public_key = leg
        .public_key
        .map(|b64| normalize_public_key(scheme, b64))
        .transpose()
        .map_err(|source| PrepareError::MalformedKey { leg: kind, source })?;

    let signer = match (scheme.supports_recovery(), signature.scalars()) {
        (true, Some(pair)) => {
            let expected = public_key
                .as_ref()
                .and_then(NormalizedKey::point)
                .map(|point| Address::from_point(&point));
            let hash = digest.digest(leg.payload.as_bytes());
            let signer = recover_signer(&hash, pair, expected.as_ref())
                .map_err(|source| PrepareError::Recovery { leg: kind, source })?;
            Some(signer)
        }
        _ => None,
    };

    Ok(PreparedLeg {
        kind,
        payload: leg.payload.to_string(),
        signature,
        public_key,
        signer,
    })
}
