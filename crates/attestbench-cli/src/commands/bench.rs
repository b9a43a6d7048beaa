//! Bench command implementation.

use std::path::PathBuf;

use attestbench_bench::{
    write_csv, Assembler, CostEstimator, JsonRpcClient, RpcEstimator, StaticCostModel,
};

use super::{load_runs, resolve_verifier};
use crate::{CallArgs, ChainArgs, SourceArgs};

pub fn run(
    sources: SourceArgs,
    call: CallArgs,
    chain: ChainArgs,
    counts: Vec<usize>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_runs(&sources)?;
    let config = call.config();

    let client = chain.rpc_url.as_deref().map(JsonRpcClient::new);
    let live = match &client {
        Some(client) => {
            let scheme = sources.scheme.unwrap_or(loaded.runs[0].scheme);
            let verifier = resolve_verifier(&chain, scheme)?;
            tracing::info!(url = client.url(), %verifier, "estimating with eth_estimateGas");
            Some(RpcEstimator::new(client, verifier, chain.from))
        }
        None => {
            tracing::info!("no RPC endpoint configured, using static cost model");
            None
        }
    };
    let estimator: &dyn CostEstimator = match &live {
        Some(live) => live,
        None => &StaticCostModel,
    };

    let reports = Assembler::new(&loaded.runs, config, estimator)
        .with_indices(&loaded.indices)
        .run_all(&counts)?;

    let out = out.unwrap_or_else(|| PathBuf::from(format!("benchmark_{}.csv", config.mode)));
    write_csv(&out, config.shape, &reports)
        .map_err(|e| format!("Failed to write {}: {}", out.display(), e))?;
    println!("CSV written: {} ({} rows)", out.display(), reports.len());
    Ok(())
}
