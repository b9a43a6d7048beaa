use crate::errors::IngestError;
use crate::legacy::scan_legacy;
use crate::reader::{ReadMode, RecordShape, RunReader};
use crate::run::Run;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default structured log location, relative to the working directory.
pub const DEFAULT_STRUCTURED: &str = "occlum/experiment_data.jsonl";
/// Default legacy log location, relative to the working directory.
pub const DEFAULT_LEGACY: &str = "occlum/experiment_data.txt";

/// The two log locations consulted by [`ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    /// Structured JSONL log; preferred.
    pub structured: PathBuf,
    /// Legacy text log; fallback.
    pub legacy: PathBuf,
}

impl Sources {
    /// Creates a source pair.
    pub fn new(structured: impl Into<PathBuf>, legacy: impl Into<PathBuf>) -> Self {
        Self {
            structured: structured.into(),
            legacy: legacy.into(),
        }
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new(DEFAULT_STRUCTURED, DEFAULT_LEGACY)
    }
}

/// Which source the runs came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The structured JSONL log.
    Structured,
    /// The legacy text log.
    Legacy,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Structured => f.write_str("structured"),
            SourceKind::Legacy => f.write_str("legacy"),
        }
    }
}

/// Result of ingestion.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Runs in file order.
    pub runs: Vec<Run>,
    /// Source that produced them.
    pub source: SourceKind,
    /// Structured records skipped as malformed.
    pub skipped: usize,
}

/// Loads runs, preferring the structured log.
///
/// The structured log is used exclusively when it exists and yields at least
/// one run. Otherwise the legacy log is scanned.
///
/// # Errors
///
/// Returns [`IngestError::NoRuns`] if neither source yields a run, and
/// [`IngestError::Io`] if an existing file cannot be read.
pub fn ingest(sources: &Sources, shape: RecordShape) -> Result<Ingested, IngestError> {
    let mut skipped = 0;

    if sources.structured.is_file() {
        let mut reader = RunReader::open(&sources.structured, shape, ReadMode::Permissive)?;
        let runs = reader.read_all()?;
        skipped = reader.skipped();
        if !runs.is_empty() {
            tracing::info!(
                path = %sources.structured.display(),
                runs = runs.len(),
                skipped,
                "loaded structured log"
            );
            return Ok(Ingested {
                runs,
                source: SourceKind::Structured,
                skipped,
            });
        }
        tracing::warn!(
            path = %sources.structured.display(),
            skipped,
            "structured log yielded no runs, falling back to legacy log"
        );
    } else {
        tracing::debug!(path = %sources.structured.display(), "no structured log");
    }

    if sources.legacy.is_file() {
        let runs = scan_legacy(&sources.legacy)?;
        if !runs.is_empty() {
            tracing::info!(
                path = %sources.legacy.display(),
                runs = runs.len(),
                "loaded legacy log"
            );
            return Ok(Ingested {
                runs,
                source: SourceKind::Legacy,
                skipped,
            });
        }
    }

    Err(no_runs(&sources.structured, &sources.legacy))
}

fn no_runs(structured: &Path, legacy: &Path) -> IngestError {
    IngestError::NoRuns {
        structured: structured.to_path_buf(),
        legacy: legacy.to_path_buf(),
    }
}
