//! Verification cost estimation.

use attestbench_canonical::Scheme;

use crate::call::EncodedCall;
use crate::rpc::RpcError;

/// Intrinsic cost of any transaction.
pub const BASE_TX_COST: u64 = 21_000;
/// Cold account access of the verifier contract.
pub const COLD_ACCOUNT_ACCESS: u64 = 2_600;
/// Calldata cost per zero byte.
pub const ZERO_BYTE_COST: u64 = 4;
/// Calldata cost per non-zero byte.
pub const NONZERO_BYTE_COST: u64 = 16;

/// Produces a cost figure for one encoded call.
pub trait CostEstimator {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Estimated cost of executing `call` against the verifier.
    fn estimate(&self, call: &EncodedCall) -> Result<u64, RpcError>;
}

/// Offline heuristic: intrinsic and calldata cost plus a fixed per-signature
/// verification cost for the scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCostModel;

impl StaticCostModel {
    /// Verification cost of one signature.
    pub fn per_signature(scheme: Scheme) -> u64 {
        match scheme {
            Scheme::EcdsaK1 => 6_000,
            Scheme::EcdsaR1 => 210_000,
            Scheme::Ed25519 => 480_000,
        }
    }
}

impl CostEstimator for StaticCostModel {
    fn name(&self) -> &'static str {
        "static"
    }

    fn estimate(&self, call: &EncodedCall) -> Result<u64, RpcError> {
        Ok(BASE_TX_COST
            + calldata_cost(&call.calldata)
            + COLD_ACCOUNT_ACCESS
            + call.signatures as u64 * Self::per_signature(call.scheme))
    }
}

/// Calldata cost: 4 per zero byte, 16 per non-zero byte.
pub fn calldata_cost(data: &[u8]) -> u64 {
    data.iter()
        .map(|b| if *b == 0 { ZERO_BYTE_COST } else { NONZERO_BYTE_COST })
        .sum()
}
