use attestbench_canonical::{KeyError, RecoveryError, Scheme, SignatureError};
use attestbench_journal::IngestError;
use thiserror::Error;

use crate::payload::LegKind;
use crate::registry::RegistryError;
use crate::rpc::RpcError;

/// Errors raised while turning one run into calldata.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    /// A signature failed to decode.
    #[error("malformed {leg} signature: {source}")]
    MalformedSignature {
        /// Leg the signature belongs to.
        leg: LegKind,
        /// Decoder error.
        #[source]
        source: SignatureError,
    },
    /// A public key failed to normalize.
    #[error("{leg} leg: {source}")]
    MalformedKey {
        /// Leg the key belongs to.
        leg: LegKind,
        /// Extractor error.
        #[source]
        source: KeyError,
    },
    /// No signer could be recovered.
    #[error("{leg} leg: {source}")]
    Recovery {
        /// Leg being recovered.
        leg: LegKind,
        /// Recovery error.
        #[source]
        source: RecoveryError,
    },
    /// The call shape needs a public key the run does not carry.
    #[error("{leg} leg has no public key; the universal call shape requires one")]
    MissingKey {
        /// Leg lacking a key.
        leg: LegKind,
    },
    /// The call shape cannot express this scheme.
    #[error("the legacy call shape only supports ecdsa-k1, found {0}")]
    UnsupportedScheme(Scheme),
}

/// Errors that can occur while benchmarking or verifying.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A run could not be prepared.
    #[error("run {index}: {source}")]
    Run {
        /// Index of the offending run.
        index: usize,
        /// Preparation error.
        #[source]
        source: PrepareError,
    },
    /// The verifier rejected a payload.
    #[error("run {index}: verifier returned false")]
    VerificationMismatch {
        /// Index of the rejected run.
        index: usize,
    },
    /// The external estimator or verifier failed.
    #[error("external call failed: {0}")]
    ExternalCall(#[from] RpcError),
    /// Ingestion failed.
    #[error(transparent)]
    Ingestion(#[from] IngestError),
    /// The address registry could not be used.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The requested run index does not exist.
    #[error("run index {index} out of range ({total} runs)")]
    NoSuchRun {
        /// Requested index.
        index: usize,
        /// Number of runs available.
        total: usize,
    },
    /// No verifier address was configured or registered.
    #[error("no verifier address: set --verifier/CONTRACT_ADDRESS or register one for {0}")]
    NoVerifier(String),
}

impl BenchError {
    pub(crate) fn run(index: usize, source: PrepareError) -> Self {
        BenchError::Run { index, source }
    }
}
