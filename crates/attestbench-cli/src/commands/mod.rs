//! Command implementations.

pub mod bench;
pub mod convert;
pub mod inspect;
pub mod registry;
pub mod verify;

use attestbench_bench::{BenchError, Registry};
use attestbench_canonical::{Address, Scheme};
use attestbench_journal::{ingest, Run};
use thiserror::Error;

use crate::{ChainArgs, SourceArgs};

/// Configuration problems detected before any work starts.
#[derive(Error, Debug)]
pub enum CliError {
    /// A live command was run without an endpoint.
    #[error("{0} requires --rpc-url or RPC_URL")]
    MissingRpcUrl(&'static str),
    /// The scheme filter removed every run.
    #[error("no {0} runs in the ingested log")]
    NoRunsForScheme(Scheme),
    /// The requested run exists but the scheme filter excluded it.
    #[error("run {index} is not a {scheme} run")]
    FilteredOut {
        /// Index in the ingested log.
        index: usize,
        /// Scheme filter in effect.
        scheme: Scheme,
    },
}

/// Runs left after filtering, with their indices in the ingested log.
pub struct LoadedRuns {
    /// Runs that passed the filter, in log order.
    pub runs: Vec<Run>,
    /// Log index of each entry in `runs`.
    pub indices: Vec<usize>,
    /// Runs ingested before filtering.
    pub total: usize,
}

impl LoadedRuns {
    /// Position of the run with log index `index`, if it survived the filter.
    pub fn position(&self, index: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == index)
    }

    /// `(log index, run)` pairs in log order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Run)> {
        self.indices.iter().copied().zip(&self.runs)
    }
}

/// Ingests runs and applies the scheme filter.
pub fn load_runs(sources: &SourceArgs) -> Result<LoadedRuns, Box<dyn std::error::Error>> {
    let ingested = ingest(&sources.sources(), sources.record_shape)?;
    tracing::info!(
        source = %ingested.source,
        runs = ingested.runs.len(),
        skipped = ingested.skipped,
        "ingested runs"
    );

    let total = ingested.runs.len();
    let (indices, runs): (Vec<usize>, Vec<Run>) = ingested
        .runs
        .into_iter()
        .enumerate()
        .filter(|(_, run)| sources.scheme.map_or(true, |scheme| run.scheme == scheme))
        .unzip();
    if let Some(scheme) = sources.scheme {
        if runs.is_empty() {
            return Err(CliError::NoRunsForScheme(scheme).into());
        }
        tracing::info!(%scheme, kept = runs.len(), total, "applied scheme filter");
    }
    Ok(LoadedRuns {
        runs,
        indices,
        total,
    })
}

/// Verifier address from the command line, else from the registry.
pub fn resolve_verifier(chain: &ChainArgs, scheme: Scheme) -> Result<Address, BenchError> {
    if let Some(address) = chain.verifier {
        return Ok(address);
    }
    let registry = Registry::load(&chain.registry)?;
    let address = registry
        .lookup(scheme)?
        .ok_or_else(|| BenchError::NoVerifier(scheme.to_string()))?;
    tracing::info!(%scheme, %address, "verifier resolved from registry");
    Ok(address)
}
