//! Canonical JSONL writer.

use crate::errors::IngestError;
use crate::run::Run;
use canonical_json::to_string;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes runs as canonical JSON lines (sorted keys, no insignificant
/// whitespace), one run per line.
///
/// # Example
///
/// ```rust,no_run
/// use attestbench_journal::{scan_legacy, RunWriter};
///
/// let runs = scan_legacy("occlum/experiment_data.txt")?;
/// let mut writer = RunWriter::create("occlum/experiment_data.jsonl")?;
/// for run in &runs {
///     writer.append_run(run)?;
/// }
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RunWriter {
    out: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl RunWriter {
    /// Creates (or truncates) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| IngestError::io(path, e))?;
        Ok(Self {
            out: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Appends one run.
    pub fn append_run(&mut self, run: &Run) -> Result<(), IngestError> {
        let line = canonical_line(run)?;
        writeln!(self.out, "{}", line).map_err(|e| IngestError::io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// Number of runs written.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<usize, IngestError> {
        self.out.flush().map_err(|e| IngestError::io(&self.path, e))?;
        Ok(self.written)
    }
}

/// Serializes a run to its canonical JSON text.
pub fn canonical_line(run: &Run) -> Result<String, IngestError> {
    let value = serde_json::to_value(run).map_err(|e| IngestError::Serialize(e.to_string()))?;
    to_string(&value).map_err(|e| IngestError::Serialize(e.to_string()))
}

/// Writes all runs to `path`, returning the count.
pub fn write_runs<P: AsRef<Path>>(path: P, runs: &[Run]) -> Result<usize, IngestError> {
    let mut writer = RunWriter::create(path)?;
    for run in runs {
        writer.append_run(run)?;
    }
    writer.finish()
}
