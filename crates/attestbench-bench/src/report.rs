use attestbench_canonical::Scheme;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::call::CallShape;

/// Scheme column of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeLabel {
    /// No run observed yet.
    #[default]
    Empty,
    /// Every run had this scheme.
    Single(Scheme),
    /// Runs of more than one scheme.
    Mixed,
}

impl SchemeLabel {
    /// Folds one run's scheme into the label.
    pub fn observe(&mut self, scheme: Scheme) {
        *self = match *self {
            SchemeLabel::Empty => SchemeLabel::Single(scheme),
            SchemeLabel::Single(seen) if seen == scheme => SchemeLabel::Single(seen),
            _ => SchemeLabel::Mixed,
        };
    }
}

impl fmt::Display for SchemeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeLabel::Empty => f.write_str("-"),
            SchemeLabel::Single(scheme) => f.write_str(scheme.as_str()),
            SchemeLabel::Mixed => f.write_str("mixed"),
        }
    }
}

/// Result of one processed group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    /// Runs processed.
    pub count: usize,
    /// Count the caller asked for.
    pub requested: usize,
    /// Scheme of the runs.
    pub scheme: SchemeLabel,
    /// Integer average cost per call.
    pub avg_cost: u64,
    /// Calldata length of the group's first run.
    pub payload_bytes: usize,
}

/// CSV header for `shape`.
pub fn csv_header(shape: CallShape) -> &'static str {
    match shape {
        CallShape::Universal => "count,scheme,avg_cost,payload_bytes",
        CallShape::Legacy => "count,avg_gas,calldata_bytes",
    }
}

impl GroupReport {
    /// CSV row for `shape`.
    pub fn csv_row(&self, shape: CallShape) -> String {
        match shape {
            CallShape::Universal => format!(
                "{},{},{},{}",
                self.count, self.scheme, self.avg_cost, self.payload_bytes
            ),
            CallShape::Legacy => format!("{},{},{}", self.count, self.avg_cost, self.payload_bytes),
        }
    }
}

/// Writes the header and one row per report.
pub fn write_csv<P: AsRef<Path>>(path: P, shape: CallShape, reports: &[GroupReport]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", csv_header(shape))?;
    for report in reports {
        writeln!(out, "{}", report.csv_row(shape))?;
    }
    out.flush()
}
