use attestbench_journal::Run;

use crate::call::{encode_run, CallConfig, EncodedCall};
use crate::errors::BenchError;
use crate::payload::{prepare_run, PreparedRun};
use crate::rpc::Verifier;

/// A run the verifier accepted.
#[derive(Debug, Clone)]
pub struct Verified {
    /// Prepared legs, recovered signers included.
    pub prepared: PreparedRun,
    /// Call that was evaluated.
    pub call: EncodedCall,
}

/// Prepares the run at `index`, encodes it, and asks `verifier` to accept it.
///
/// # Errors
///
/// Returns [`BenchError::NoSuchRun`] if `index` is out of range, otherwise
/// as [`verify_indexed`].
pub fn verify_run(
    runs: &[Run],
    index: usize,
    config: CallConfig,
    verifier: &dyn Verifier,
) -> Result<Verified, BenchError> {
    let run = runs.get(index).ok_or(BenchError::NoSuchRun {
        index,
        total: runs.len(),
    })?;
    verify_indexed(run, index, config, verifier)
}

/// Verifies one run already picked out of the log; `index` is its log index.
///
/// # Errors
///
/// Returns [`BenchError::VerificationMismatch`] if the verifier answers
/// `false`, [`BenchError::ExternalCall`] if the call fails, and
/// [`BenchError::Run`] if the run cannot be prepared.
pub fn verify_indexed(
    run: &Run,
    index: usize,
    config: CallConfig,
    verifier: &dyn Verifier,
) -> Result<Verified, BenchError> {
    let prepared = prepare_run(run, index, config.digest).map_err(|e| BenchError::run(index, e))?;
    let call = encode_run(&prepared, config).map_err(|e| BenchError::run(index, e))?;

    if !verifier.verify(&call)? {
        return Err(BenchError::VerificationMismatch { index });
    }
    tracing::info!(index, function = call.function, "verifier accepted run");
    Ok(Verified { prepared, call })
}
