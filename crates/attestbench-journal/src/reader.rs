//! Structured JSONL reader.

use crate::errors::{IngestError, RecordFault};
use crate::run::Run;
use attestbench_canonical::Scheme;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How malformed records are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Strict mode: the first malformed record is an error.
    Strict,
    /// Permissive mode: malformed records are skipped with a warning.
    Permissive,
}

/// Which fields a structured record must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordShape {
    /// All seven fields, scheme included.
    #[default]
    Universal,
    /// Two-signature records without scheme or keys; the scheme is implicit.
    SingleScheme,
}

impl RecordShape {
    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordShape::Universal => "universal",
            RecordShape::SingleScheme => "single-scheme",
        }
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "universal" => Ok(RecordShape::Universal),
            "single-scheme" => Ok(RecordShape::SingleScheme),
            other => Err(format!(
                "unknown record shape '{}', expected 'universal' or 'single-scheme'",
                other
            )),
        }
    }
}

/// Wire form of a record; every field optional so faults can be named.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    scheme: Option<String>,
    data: Option<String>,
    delta_payload: Option<String>,
    #[serde(alias = "deltaBase64Sig")]
    delta_signature: Option<String>,
    #[serde(alias = "sigmaBase64Sig")]
    sigma_signature: Option<String>,
    #[serde(alias = "deltaPublicKeyBase64")]
    delta_public_key: Option<String>,
    #[serde(alias = "sigmaPublicKeyBase64")]
    sigma_public_key: Option<String>,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, RecordFault> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecordFault::MissingField(name)),
    }
}

/// Parses one JSONL line into a [`Run`].
///
/// Both the current field names and the historical `*Base64Sig` /
/// `*PublicKeyBase64` names are accepted.
pub fn parse_record(line: &str, shape: RecordShape) -> Result<Run, RecordFault> {
    let raw: RawRecord =
        serde_json::from_str(line).map_err(|e| RecordFault::InvalidJson(e.to_string()))?;

    match shape {
        RecordShape::Universal => {
            let scheme_tag = required(raw.scheme, "scheme")?;
            let scheme = Scheme::from_str(&scheme_tag)
                .map_err(|_| RecordFault::UnknownScheme(scheme_tag.trim().to_string()))?;
            Ok(Run {
                scheme,
                data: required(raw.data, "data")?,
                delta_payload: required(raw.delta_payload, "deltaPayload")?,
                delta_signature: required(raw.delta_signature, "deltaSignature")?,
                sigma_signature: required(raw.sigma_signature, "sigmaSignature")?,
                delta_public_key: Some(required(raw.delta_public_key, "deltaPublicKey")?),
                sigma_public_key: Some(required(raw.sigma_public_key, "sigmaPublicKey")?),
            })
        }
        RecordShape::SingleScheme => Ok(Run {
            scheme: Scheme::IMPLICIT,
            data: required(raw.data, "data")?,
            delta_payload: required(raw.delta_payload, "deltaPayload")?,
            delta_signature: required(raw.delta_signature, "deltaSignature")?,
            sigma_signature: required(raw.sigma_signature, "sigmaSignature")?,
            delta_public_key: None,
            sigma_public_key: None,
        }),
    }
}

/// Line-oriented reader over a structured experiment log.
///
/// # Example
///
/// ```rust,no_run
/// use attestbench_journal::{ReadMode, RecordShape, RunReader};
///
/// let mut reader = RunReader::open("runs.jsonl", RecordShape::Universal, ReadMode::Permissive)?;
/// while let Some(run) = reader.read_run()? {
///     println!("{}", run.scheme);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RunReader<R> {
    input: R,
    path: PathBuf,
    shape: RecordShape,
    mode: ReadMode,
    line: usize,
    skipped: usize,
}

impl RunReader<BufReader<File>> {
    /// Opens a JSONL file for reading.
    pub fn open<P: AsRef<Path>>(
        path: P,
        shape: RecordShape,
        mode: ReadMode,
    ) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
        Ok(Self::new(BufReader::new(file), path, shape, mode))
    }
}

impl<R: BufRead> RunReader<R> {
    /// Wraps any buffered input; `path` is only used in error messages.
    pub fn new(input: R, path: impl Into<PathBuf>, shape: RecordShape, mode: ReadMode) -> Self {
        Self {
            input,
            path: path.into(),
            shape,
            mode,
            line: 0,
            skipped: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of records skipped in permissive mode.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Reads the next valid run, or `Ok(None)` at end of input.
    ///
    /// Blank lines are ignored. In permissive mode a malformed line, including
    /// one that is not valid UTF-8, is logged with its 1-based line number and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] on I/O failure, or on the first malformed
    /// record in strict mode.
    pub fn read_run(&mut self) -> Result<Option<Run>, IngestError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = self
                .input
                .read_until(b'\n', &mut buf)
                .map_err(|e| IngestError::io(&self.path, e))?;
            if n == 0 {
                return Ok(None);
            }
            self.line += 1;

            let parsed = match std::str::from_utf8(&buf) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => parse_record(text.trim(), self.shape),
                Err(e) => Err(RecordFault::InvalidJson(format!("invalid UTF-8: {}", e))),
            };

            match parsed {
                Ok(run) => return Ok(Some(run)),
                Err(fault) if self.mode == ReadMode::Permissive => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = self.line,
                        reason = %fault,
                        "skipping malformed record"
                    );
                    self.skipped += 1;
                }
                Err(fault) => {
                    return Err(IngestError::Record {
                        line: self.line,
                        fault,
                    })
                }
            }
        }
    }

    /// Reads all remaining runs.
    pub fn read_all(&mut self) -> Result<Vec<Run>, IngestError> {
        let mut runs = Vec::new();
        while let Some(run) = self.read_run()? {
            runs.push(run);
        }
        Ok(runs)
    }
}
