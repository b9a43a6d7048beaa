//! attestbench CLI - ingest attestation logs, verify runs, and benchmark verification cost.

use std::path::PathBuf;

use attestbench_bench::{CallConfig, CallShape, SignatureMode, DEFAULT_REGISTRY};
use attestbench_canonical::{Address, DigestMode, Scheme};
use attestbench_journal::{RecordShape, Sources, DEFAULT_LEGACY, DEFAULT_STRUCTURED};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{bench, convert, inspect, registry, verify};

#[derive(Parser)]
#[command(name = "attestbench")]
#[command(about = "Attestation normalization, verification, and cost benchmarking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where runs are read from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Structured JSONL log (preferred)
    #[arg(long, default_value = DEFAULT_STRUCTURED)]
    structured: PathBuf,
    /// Legacy text log (fallback)
    #[arg(long, default_value = DEFAULT_LEGACY)]
    legacy: PathBuf,
    /// Required fields of structured records: universal or single-scheme
    #[arg(long, default_value = "universal")]
    record_shape: RecordShape,
    /// Only use runs of this scheme
    #[arg(long, env = "SCHEME")]
    scheme: Option<Scheme>,
}

impl SourceArgs {
    fn sources(&self) -> Sources {
        Sources::new(&self.structured, &self.legacy)
    }
}

/// How calldata is built.
#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Signatures per call: one (TEE leg) or two (TEE and TS legs)
    #[arg(long, env = "MODE", default_value = "two")]
    mode: SignatureMode,
    /// Payload digest: eth-signed or sha256
    #[arg(long, env = "DIGEST", default_value = "sha256")]
    digest: DigestMode,
    /// Verifier interface: universal or legacy
    #[arg(long, env = "CALL_SHAPE", default_value = "universal")]
    shape: CallShape,
}

impl CallArgs {
    fn config(&self) -> CallConfig {
        CallConfig {
            shape: self.shape,
            mode: self.mode,
            digest: self.digest,
        }
    }
}

/// How the chain node and verifier are reached.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// JSON-RPC endpoint; without it costs come from the static model
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,
    /// Verifier contract address (default: registry entry for the scheme)
    #[arg(long, env = "CONTRACT_ADDRESS")]
    verifier: Option<Address>,
    /// Sender address for estimation and calls
    #[arg(long = "from", env = "SENDER")]
    from: Option<Address>,
    /// Address registry file
    #[arg(long, env = "REGISTRY", default_value = DEFAULT_REGISTRY)]
    registry: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Group runs, estimate verification cost, and write a CSV report
    Bench {
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        call: CallArgs,
        #[command(flatten)]
        chain: ChainArgs,
        /// Comma-separated group sizes
        #[arg(long, env = "COUNTS", default_value = "5,10,15,20,25", value_delimiter = ',')]
        counts: Vec<usize>,
        /// CSV output path (default: benchmark_<mode>.csv)
        #[arg(long, env = "OUT")]
        out: Option<PathBuf>,
    },
    /// Verify one run against the deployed verifier
    Verify {
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        call: CallArgs,
        #[command(flatten)]
        chain: ChainArgs,
        /// Run index in the ingested log (default: last run)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Show normalized signatures, keys, and recovered signers
    Inspect {
        #[command(flatten)]
        sources: SourceArgs,
        /// Payload digest: eth-signed or sha256
        #[arg(long, env = "DIGEST", default_value = "sha256")]
        digest: DigestMode,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a legacy text log into canonical JSONL
    Convert {
        /// Legacy text log
        #[arg(long, default_value = DEFAULT_LEGACY)]
        legacy: PathBuf,
        /// Output JSONL file
        #[arg(long, default_value = DEFAULT_STRUCTURED)]
        out: PathBuf,
    },
    /// Manage deployed verifier addresses
    Registry {
        /// Address registry file
        #[arg(long, env = "REGISTRY", default_value = DEFAULT_REGISTRY)]
        registry: PathBuf,
        #[command(subcommand)]
        action: RegistryAction,
    },
}

#[derive(Subcommand)]
enum RegistryAction {
    /// Print current verifiers and history
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a verifier address for a scheme
    Set {
        /// Scheme tag
        scheme: Scheme,
        /// Verifier address
        address: Address,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Bench {
            sources,
            call,
            chain,
            counts,
            out,
        } => bench::run(sources, call, chain, counts, out),
        Commands::Verify {
            sources,
            call,
            chain,
            index,
        } => verify::run(sources, call, chain, index),
        Commands::Inspect {
            sources,
            digest,
            json,
        } => inspect::run(sources, digest, json),
        Commands::Convert { legacy, out } => convert::run(legacy, out),
        Commands::Registry { registry, action } => match action {
            RegistryAction::Show { json } => registry::show(registry, json),
            RegistryAction::Set { scheme, address } => registry::set(registry, scheme, address),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
