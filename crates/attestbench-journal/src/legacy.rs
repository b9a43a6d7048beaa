//! Legacy text scanner.
//!
//! Older producers printed each run as free text to the enclave console. A
//! stanza opens at a section marker (a rule of `=` characters, possibly with a
//! title, or the producer banner) and carries four labeled lines. Labels were
//! renamed once, so each field is accepted under two spellings:
//!
//! | field            | current                      | historical                |
//! |------------------|------------------------------|---------------------------|
//! | `data`           | `PageRank Result String:`    | `Result String:`          |
//! | `deltaPayload`   | `Delta Payload:`             | `TS Payload:`             |
//! | `deltaSignature` | `Delta Signature (Base64):`  | `TEE Signature (Base64):` |
//! | `sigmaSignature` | `Sigma Signature (Base64):`  | `TS Signature (Base64):`  |
//!
//! An optional `Sig_Scheme:` line selects the scheme; otherwise the implicit
//! scheme applies. Lines before the first marker form an implicit stanza.

use crate::errors::IngestError;
use crate::run::Run;
use attestbench_canonical::Scheme;
use regex::Regex;
use std::path::Path;
use std::str::FromStr;

const MARKER_PATTERN: &str = r"^\s*(?:={3,}.*|Starting PageRank Calculation\.\.\.)\s*$";

const LABEL_PATTERN: &str = r"^\s*(PageRank Result String|Result String|Delta Payload|TS Payload|Delta Signature \(Base64\)|TEE Signature \(Base64\)|Sigma Signature \(Base64\)|TS Signature \(Base64\)|Sig_Scheme):\s*(.*?)\s*$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Data,
    DeltaPayload,
    DeltaSignature,
    SigmaSignature,
    Scheme,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "PageRank Result String" | "Result String" => Some(Field::Data),
            "Delta Payload" | "TS Payload" => Some(Field::DeltaPayload),
            "Delta Signature (Base64)" | "TEE Signature (Base64)" => Some(Field::DeltaSignature),
            "Sigma Signature (Base64)" | "TS Signature (Base64)" => Some(Field::SigmaSignature),
            "Sig_Scheme" => Some(Field::Scheme),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Stanza {
    opened_at: usize,
    scheme: Option<String>,
    data: Option<String>,
    delta_payload: Option<String>,
    delta_signature: Option<String>,
    sigma_signature: Option<String>,
}

impl Stanza {
    fn opened_at(line: usize) -> Self {
        Stanza {
            opened_at: line,
            ..Stanza::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.delta_payload.is_none()
            && self.delta_signature.is_none()
            && self.sigma_signature.is_none()
    }

    fn is_complete(&self) -> bool {
        self.data.is_some()
            && self.delta_payload.is_some()
            && self.delta_signature.is_some()
            && self.sigma_signature.is_some()
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.data.is_none() {
            missing.push("data");
        }
        if self.delta_payload.is_none() {
            missing.push("deltaPayload");
        }
        if self.delta_signature.is_none() {
            missing.push("deltaSignature");
        }
        if self.sigma_signature.is_none() {
            missing.push("sigmaSignature");
        }
        missing
    }

    fn set(&mut self, field: Field, value: &str) {
        // Empty signatures mean the producer failed to sign; treat as absent.
        let value = (!value.is_empty()).then(|| value.to_string());
        match field {
            Field::Data => self.data = value,
            Field::DeltaPayload => self.delta_payload = value,
            Field::DeltaSignature => self.delta_signature = value,
            Field::SigmaSignature => self.sigma_signature = value,
            Field::Scheme => self.scheme = value,
        }
    }

    fn into_run(self) -> Option<Run> {
        let scheme = match self.scheme.as_deref() {
            None => Scheme::IMPLICIT,
            Some(tag) => match Scheme::from_str(tag) {
                Ok(scheme) => scheme,
                Err(err) => {
                    tracing::warn!(line = self.opened_at, %err, "discarding legacy stanza");
                    return None;
                }
            },
        };
        Some(Run {
            scheme,
            data: self.data?,
            delta_payload: self.delta_payload?,
            delta_signature: self.delta_signature?,
            sigma_signature: self.sigma_signature?,
            delta_public_key: None,
            sigma_public_key: None,
        })
    }
}

/// Incremental stanza scanner over legacy text lines.
pub struct LegacyScanner {
    marker: Regex,
    label: Regex,
    current: Stanza,
    line: usize,
    discarded: usize,
}

impl LegacyScanner {
    /// Creates a scanner positioned before the first line.
    pub fn new() -> Self {
        Self {
            marker: Regex::new(MARKER_PATTERN).expect("invalid regex"),
            label: Regex::new(LABEL_PATTERN).expect("invalid regex"),
            current: Stanza::opened_at(1),
            line: 0,
            discarded: 0,
        }
    }

    /// Number of incomplete stanzas dropped so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feeds one line; returns a run when it completes a stanza.
    pub fn push_line(&mut self, text: &str) -> Option<Run> {
        self.line += 1;

        if self.marker.is_match(text) {
            if !self.current.is_empty() {
                tracing::warn!(
                    line = self.current.opened_at,
                    missing = ?self.current.missing(),
                    "discarding incomplete legacy stanza"
                );
                self.discarded += 1;
            }
            self.current = Stanza::opened_at(self.line);
            return None;
        }

        let caps = self.label.captures(text)?;
        let field = Field::from_label(caps.get(1)?.as_str())?;
        let value = caps.get(2).map_or("", |m| m.as_str());
        self.current.set(field, value);

        if !self.current.is_complete() {
            return None;
        }
        let stanza = std::mem::replace(&mut self.current, Stanza::opened_at(self.line + 1));
        let run = stanza.into_run();
        if run.is_none() {
            self.discarded += 1;
        }
        run
    }

    /// Scans a whole text.
    pub fn scan(&mut self, text: &str) -> Vec<Run> {
        text.lines().filter_map(|line| self.push_line(line)).collect()
    }
}

impl Default for LegacyScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a legacy text log and returns its runs in file order.
pub fn scan_legacy<P: AsRef<Path>>(path: P) -> Result<Vec<Run>, IngestError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let mut scanner = LegacyScanner::new();
    let runs = scanner.scan(&text);
    tracing::debug!(
        path = %path.display(),
        runs = runs.len(),
        discarded = scanner.discarded(),
        "scanned legacy log"
    );
    Ok(runs)
}
