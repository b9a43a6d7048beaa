use std::path::PathBuf;
use thiserror::Error;

/// Why a single record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordFault {
    /// The line is not a JSON object of string fields.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// A required field is absent or empty.
    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),
    /// The scheme names no supported signature scheme.
    #[error("unknown signature scheme '{0}'")]
    UnknownScheme(String),
}

/// Errors that can occur while ingesting experiment logs.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O error while reading or writing a log.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A record was rejected in strict mode.
    #[error("line {line}: {fault}")]
    Record {
        /// 1-based line number.
        line: usize,
        /// Rejection reason.
        fault: RecordFault,
    },
    /// Neither source produced a run.
    #[error("no runs found: structured log {structured} and legacy log {legacy} yielded no records")]
    NoRuns {
        /// Structured source path.
        structured: PathBuf,
        /// Legacy source path.
        legacy: PathBuf,
    },
    /// A run could not be serialized.
    #[error("failed to serialize run: {0}")]
    Serialize(String),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}
