//! Output formatting utilities.

use attestbench_bench::{PreparedLeg, PreparedRun};
use serde_json::{json, Value};

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Recovered signer of a leg, or `-` when the scheme has no recovery.
pub fn format_signer(leg: &PreparedLeg) -> String {
    match &leg.signer {
        Some(signer) => format!("{} (v={})", signer.address, signer.v),
        None => "-".to_string(),
    }
}

/// JSON view of one prepared leg.
pub fn leg_json(leg: &PreparedLeg) -> Value {
    json!({
        "payload": leg.payload,
        "signature": hex::encode(leg.signature.to_bytes()),
        "publicKey": leg.public_key.as_ref().map(|key| hex::encode(&key.bytes)),
        "keyEncoding": leg.public_key.as_ref().map(|key| key.encoding.as_str()),
        "signer": leg.signer.map(|signer| signer.address.to_string()),
        "v": leg.signer.map(|signer| signer.v),
    })
}

/// JSON view of one prepared run.
pub fn run_json(run: &PreparedRun) -> Value {
    json!({
        "index": run.index,
        "scheme": run.scheme.as_str(),
        "tee": leg_json(&run.tee),
        "ts": leg_json(&run.ts),
    })
}

/// Formats a prepared run as a table row.
pub fn format_run_row(run: &PreparedRun) -> String {
    let encoding = run
        .tee
        .public_key
        .as_ref()
        .map_or("-", |key| key.encoding.as_str());
    format!(
        "{:<6} {:<9} {:<18} {:<48} {}",
        run.index,
        run.scheme.as_str(),
        encoding,
        format_signer(&run.tee),
        format_signer(&run.ts)
    )
}

/// Prints the run table header.
#[allow(clippy::print_literal)]
pub fn print_run_header() {
    println!(
        "{:<6} {:<9} {:<18} {:<48} {}",
        "INDEX", "SCHEME", "KEY_ENCODING", "TEE_SIGNER", "TS_SIGNER"
    );
    println!("{}", "-".repeat(130));
}

/// Formats one registry entry as a table row.
pub fn format_registry_row(scheme: &str, address: &str, history: usize) -> String {
    format!("{:<10} {:<44} {}", scheme, truncate(address, 44), history)
}

/// Prints the registry table header.
#[allow(clippy::print_literal)]
pub fn print_registry_header() {
    println!("{:<10} {:<44} {}", "SCHEME", "VERIFIER", "HISTORY");
    println!("{}", "-".repeat(64));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
