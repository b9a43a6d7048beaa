//! Convert command implementation.

use std::path::PathBuf;

use attestbench_journal::{scan_legacy, write_runs, IngestError};

pub fn run(legacy: PathBuf, out: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let runs = scan_legacy(&legacy)?;
    if runs.is_empty() {
        return Err(IngestError::NoRuns {
            structured: out,
            legacy,
        }
        .into());
    }

    let written = write_runs(&out, &runs)?;
    println!("Converted {} runs: {}", written, out.display());
    Ok(())
}
