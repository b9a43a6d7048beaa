//! Batch assembly.
//!
//! Runs are cut into consecutive, non-overlapping groups by a list of
//! requested counts. Each run in a group is prepared, encoded, and costed in
//! order; the group reports the integer average cost and the calldata length
//! of its first run.

use attestbench_journal::Run;
use std::ops::Range;

use crate::call::{encode_run, CallConfig, EncodedCall};
use crate::cost::CostEstimator;
use crate::errors::BenchError;
use crate::payload::prepare_run;
use crate::report::{GroupReport, SchemeLabel};

/// A planned group: which run indices it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlan {
    /// Count requested by the caller.
    pub requested: usize,
    /// First run index.
    pub start: usize,
    /// Number of runs in the group, after truncation.
    pub len: usize,
}

impl GroupPlan {
    /// Run indices covered by the group.
    pub fn indices(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Whether the group was cut short by the end of the runs.
    pub fn is_truncated(&self) -> bool {
        self.len < self.requested
    }
}

/// Partitions `total` runs by `counts`.
///
/// A count larger than the remaining runs is truncated to what remains. Once
/// the runs are exhausted the remaining counts produce no group. Zero counts
/// produce no group either.
pub fn plan_groups(total: usize, counts: &[usize]) -> Vec<GroupPlan> {
    let mut plans = Vec::new();
    let mut cursor = 0;

    for &requested in counts {
        if requested == 0 {
            tracing::warn!("skipping zero-sized group");
            continue;
        }
        if cursor >= total {
            tracing::info!(requested, "runs exhausted, skipping group");
            continue;
        }
        let len = requested.min(total - cursor);
        if len < requested {
            tracing::info!(requested, len, "truncating group to remaining runs");
        }
        plans.push(GroupPlan {
            requested,
            start: cursor,
            len,
        });
        cursor += len;
    }

    plans
}

/// Run at `index`, or the last run as filler when `index` is past the end.
///
/// Filler reuse distorts the group's composition; it is logged every time.
pub fn resolve_run(runs: &[Run], index: usize) -> Option<&Run> {
    match runs.get(index) {
        Some(run) => Some(run),
        None => {
            let last = runs.last()?;
            tracing::warn!(
                index,
                filler = runs.len() - 1,
                "no run at index, reusing last run as filler"
            );
            Some(last)
        }
    }
}

/// Drives preparation, encoding, and cost estimation over groups.
///
/// Groups are planned over positions in `runs`. Errors and encoded calls
/// carry the run's index in the ingested log, which differs from its
/// position once the caller has filtered the runs (see
/// [`Assembler::with_indices`]).
pub struct Assembler<'a> {
    runs: &'a [Run],
    indices: Option<&'a [usize]>,
    config: CallConfig,
    estimator: &'a dyn CostEstimator,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler over `runs`.
    pub fn new(runs: &'a [Run], config: CallConfig, estimator: &'a dyn CostEstimator) -> Self {
        Self {
            runs,
            indices: None,
            config,
            estimator,
        }
    }

    /// Log index of each run, parallel to `runs`.
    pub fn with_indices(mut self, indices: &'a [usize]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Index in the ingested log of the run at `position`.
    pub fn file_index(&self, position: usize) -> usize {
        self.indices
            .and_then(|indices| indices.get(position).copied())
            .unwrap_or(position)
    }

    /// Encodes the call for the run at `position`.
    pub fn encode(&self, position: usize) -> Result<EncodedCall, BenchError> {
        let index = self.file_index(position);
        let run = resolve_run(self.runs, position).ok_or(BenchError::NoSuchRun {
            index,
            total: self.runs.len(),
        })?;
        let prepared =
            prepare_run(run, index, self.config.digest).map_err(|e| BenchError::run(index, e))?;
        encode_run(&prepared, self.config).map_err(|e| BenchError::run(index, e))
    }

    /// Processes one group.
    ///
    /// # Errors
    ///
    /// The first failing run aborts the group; the error names its index.
    pub fn run_group(&self, plan: &GroupPlan) -> Result<GroupReport, BenchError> {
        let mut total_cost: u128 = 0;
        let mut payload_bytes = 0;
        let mut schemes = SchemeLabel::default();

        for position in plan.indices() {
            let call = self.encode(position)?;
            let cost = self.estimator.estimate(&call)?;
            tracing::debug!(index = call.index, cost, bytes = call.calldata.len(), "estimated run");

            if position == plan.start {
                payload_bytes = call.calldata.len();
            }
            schemes.observe(call.scheme);
            total_cost += u128::from(cost);
        }

        let avg_cost = (total_cost / plan.len.max(1) as u128) as u64;
        let report = GroupReport {
            count: plan.len,
            requested: plan.requested,
            scheme: schemes,
            avg_cost,
            payload_bytes,
        };
        tracing::info!(
            mode = %self.config.mode,
            estimator = self.estimator.name(),
            count = report.count,
            scheme = %report.scheme,
            avg_cost = report.avg_cost,
            payload_bytes = report.payload_bytes,
            "group complete"
        );
        Ok(report)
    }

    /// Plans and processes every group.
    pub fn run_all(&self, counts: &[usize]) -> Result<Vec<GroupReport>, BenchError> {
        plan_groups(self.runs.len(), counts)
            .iter()
            .map(|plan| self.run_group(plan))
            .collect()
    }
}
