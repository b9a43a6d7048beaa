//! Verify command implementation.

use attestbench_bench::{verify_indexed, BenchError, JsonRpcClient, RpcVerifier};

use super::{load_runs, resolve_verifier, CliError};
use crate::output::format_signer;
use crate::{CallArgs, ChainArgs, SourceArgs};

pub fn run(
    sources: SourceArgs,
    call: CallArgs,
    chain: ChainArgs,
    index: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = chain
        .rpc_url
        .as_deref()
        .ok_or(CliError::MissingRpcUrl("verify"))?;
    let loaded = load_runs(&sources)?;
    let index = match index {
        Some(index) => index,
        None => *loaded.indices.last().ok_or(BenchError::NoSuchRun { index: 0, total: 0 })?,
    };
    let position = match (loaded.position(index), sources.scheme) {
        (Some(position), _) => position,
        (None, Some(scheme)) if index < loaded.total => {
            return Err(CliError::FilteredOut { index, scheme }.into())
        }
        (None, _) => {
            return Err(BenchError::NoSuchRun {
                index,
                total: loaded.total,
            }
            .into())
        }
    };
    let run = &loaded.runs[position];
    let verifier_address = resolve_verifier(&chain, run.scheme)?;

    let client = JsonRpcClient::new(url);
    let verifier = RpcVerifier::new(&client, verifier_address, chain.from);
    let verified = verify_indexed(run, index, call.config(), &verifier)?;

    println!("Recovered TEE: {}", format_signer(&verified.prepared.tee));
    println!("Recovered TS: {}", format_signer(&verified.prepared.ts));
    println!("{}: true", verified.call.function);
    Ok(())
}
