//! Experiment log ingestion for attestation benchmarking.
//!
//! This crate provides:
//! - The [`Run`] record: one TEE leg and one TS leg of an attestation event
//! - A line-oriented reader for structured JSONL logs, with strict and
//!   permissive modes
//! - A stanza scanner for the legacy free-text producer output
//! - Source precedence (structured first, legacy as fallback)
//! - A canonical JSONL writer used to migrate legacy logs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use attestbench_journal::{ingest, RecordShape, Sources};
//!
//! let sources = Sources::new("occlum/experiment_data.jsonl", "occlum/experiment_data.txt");
//! let ingested = ingest(&sources, RecordShape::Universal)?;
//! for run in &ingested.runs {
//!     println!("{} {}", run.scheme, run.data);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Error types for ingestion.
pub mod errors;
/// Source precedence.
pub mod ingest;
/// Legacy text scanner.
pub mod legacy;
/// Structured JSONL reader.
pub mod reader;
/// Run record type.
pub mod run;
/// Canonical JSONL writer.
pub mod writer;

pub use errors::{IngestError, RecordFault};
pub use ingest::{ingest, Ingested, SourceKind, Sources, DEFAULT_LEGACY, DEFAULT_STRUCTURED};
pub use legacy::{scan_legacy, LegacyScanner};
pub use reader::{parse_record, ReadMode, RecordShape, RunReader};
pub use run::{Leg, Run};
pub use writer::{canonical_line, write_runs, RunWriter};
