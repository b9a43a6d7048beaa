//! Registry command implementation.

use std::path::PathBuf;

use attestbench_bench::Registry;
use attestbench_canonical::{Address, Scheme};

use crate::output;

pub fn show(registry: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Registry::load(&registry)?;

    if json {
        println!("{}", output::format_json(&serde_json::to_value(&loaded)?));
        return Ok(());
    }

    output::print_registry_header();
    for (scheme, address) in &loaded.verifiers {
        let history = loaded.history.get(scheme).map_or(0, Vec::len);
        println!("{}", output::format_registry_row(scheme, address, history));
    }
    Ok(())
}

pub fn set(
    registry: PathBuf,
    scheme: Scheme,
    address: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut loaded = Registry::load(&registry)?;
    loaded.record(scheme, address);
    loaded.save(&registry)?;
    tracing::info!(%scheme, %address, history = loaded.history_of(scheme).len(), "verifier recorded");
    println!("{}: {}", scheme, address);
    Ok(())
}
