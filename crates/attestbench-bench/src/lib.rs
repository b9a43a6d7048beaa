//! Calldata assembly and verification cost benchmarking.
//!
//! Each ingested run is turned into verifier calldata: signatures are
//! canonicalized, keys normalized, and secp256k1 signers recovered. The
//! calldata is then costed, either live through `eth_estimateGas` or with a
//! static heuristic, and groups of runs are summarized into report rows.
//!
//! ## Key Types
//!
//! - [`Assembler`] - Groups runs and aggregates cost per group
//! - [`CostEstimator`] - Static or live cost source
//! - [`Verifier`] - Evaluates calldata against a deployed verifier
//! - [`Registry`] - Deployed verifier addresses per scheme

#![deny(missing_docs)]

/// Group planning and processing.
pub mod assembler;
/// Verifier call shapes.
pub mod call;
/// Cost estimation.
pub mod cost;
/// Error types.
pub mod errors;
/// Verifier contract interfaces.
mod interface;
/// Per-run preparation.
pub mod payload;
/// Verifier address registry.
pub mod registry;
/// Report rows and CSV output.
pub mod report;
/// JSON-RPC client, estimator, and verifier.
pub mod rpc;
/// Single-run verification.
pub mod verify;

pub use assembler::{plan_groups, resolve_run, Assembler, GroupPlan};
pub use call::{encode_run, CallConfig, CallShape, EncodedCall, SignatureMode};
pub use cost::{calldata_cost, CostEstimator, StaticCostModel};
pub use errors::{BenchError, PrepareError};
pub use payload::{prepare_run, LegKind, PreparedLeg, PreparedRun};
pub use registry::{Registry, RegistryError, DEFAULT_REGISTRY};
pub use report::{csv_header, write_csv, GroupReport, SchemeLabel};
pub use rpc::{CallRequest, JsonRpcClient, RpcError, RpcEstimator, RpcVerifier, Verifier};
pub use verify::{verify_indexed, verify_run, Verified};
