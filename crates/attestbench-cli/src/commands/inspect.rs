//! Inspect command implementation.

use attestbench_bench::prepare_run;
use attestbench_canonical::DigestMode;
use serde_json::Value;

use super::load_runs;
use crate::output;
use crate::SourceArgs;

pub fn run(
    sources: SourceArgs,
    digest: DigestMode,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_runs(&sources)?;

    if !json {
        output::print_run_header();
    }

    let mut prepared = Vec::with_capacity(loaded.runs.len());
    let mut failed = 0usize;
    for (index, run) in loaded.iter() {
        match prepare_run(run, index, digest) {
            Ok(run) => {
                if !json {
                    println!("{}", output::format_run_row(&run));
                }
                prepared.push(output::run_json(&run));
            }
            Err(e) => {
                failed += 1;
                if json {
                    prepared.push(serde_json::json!({ "index": index, "error": e.to_string() }));
                } else {
                    println!("{:<6} error: {}", index, e);
                }
            }
        }
    }

    if json {
        println!("{}", output::format_json(&Value::Array(prepared)));
    } else if failed > 0 {
        eprintln!("{} of {} runs could not be prepared", failed, loaded.runs.len());
    }
    Ok(())
}
