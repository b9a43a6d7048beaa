use attestbench_canonical::Scheme;
use attestbench_journal::{
    ingest, scan_legacy, write_runs, IngestError, ReadMode, RecordShape, RunReader, SourceKind,
    Sources,
};
use std::fs;
use tempfile::TempDir;

fn structured_line(scheme: &str, data: &str) -> String {
    format!(
        r#"{{"scheme":"{}","data":"{}","deltaPayload":"TSv1|{}","deltaSignature":"MEUC","sigmaSignature":"MEQC","deltaPublicKey":"BAAA","sigmaPublicKey":"BBBB"}}"#,
        scheme, data, data
    )
}

const LEGACY: &str = "\
Starting PageRank Calculation...
PageRank Result String: L:0.1;
Delta Payload: TSv1|legacy
Delta Signature (Base64): MEUC
Sigma Signature (Base64): MEQC
===== Run 2 =====
Result String: L:0.2;
TS Payload: TSv1|legacy2
TEE Signature (Base64): MEUD
TS Signature (Base64): MEQD
";

fn sources(dir: &TempDir) -> Sources {
    Sources::new(
        dir.path().join("experiment_data.jsonl"),
        dir.path().join("experiment_data.txt"),
    )
}

#[test]
fn structured_log_takes_precedence() {
    let dir = TempDir::new().unwrap();
    let sources = sources(&dir);
    fs::write(
        &sources.structured,
        format!(
            "{}\n{}\n",
            structured_line("ecdsa-k1", "S:1;"),
            structured_line("ed25519", "S:2;")
        ),
    )
    .unwrap();
    fs::write(&sources.legacy, LEGACY).unwrap();

    let ingested = ingest(&sources, RecordShape::Universal).unwrap();
    assert_eq!(ingested.source, SourceKind::Structured);
    assert_eq!(ingested.runs.len(), 2);
    assert_eq!(ingested.runs[0].data, "S:1;");
    assert_eq!(ingested.runs[1].scheme, Scheme::Ed25519);
}

#[test]
fn falls_back_to_legacy_when_structured_is_missing() {
    let dir = TempDir::new().unwrap();
    let sources = sources(&dir);
    fs::write(&sources.legacy, LEGACY).unwrap();

    let ingested = ingest(&sources, RecordShape::Universal).unwrap();
    assert_eq!(ingested.source, SourceKind::Legacy);
    assert_eq!(ingested.runs.len(), 2);
    assert_eq!(ingested.runs[1].data, "L:0.2;");
    assert_eq!(ingested.runs[1].scheme, Scheme::IMPLICIT);
}

#[test]
fn falls_back_when_every_structured_line_is_malformed() {
    let dir = TempDir::new().unwrap();
    let sources = sources(&dir);
    fs::write(
        &sources.structured,
        format!("garbage\n{}\n", structured_line("schnorr-k1", "S:1;")),
    )
    .unwrap();
    fs::write(&sources.legacy, LEGACY).unwrap();

    let ingested = ingest(&sources, RecordShape::Universal).unwrap();
    assert_eq!(ingested.source, SourceKind::Legacy);
    assert_eq!(ingested.skipped, 2);
}

#[test]
fn invalid_utf8_line_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let sources = sources(&dir);
    let mut bytes = format!("{}\n", structured_line("ecdsa-k1", "S:1;")).into_bytes();
    bytes.extend_from_slice(b"{\"data\":\"\xff\xfe\"}\n");
    bytes.extend_from_slice(format!("{}\n", structured_line("ecdsa-r1", "S:3;")).as_bytes());
    fs::write(&sources.structured, bytes).unwrap();

    let ingested = ingest(&sources, RecordShape::Universal).unwrap();
    assert_eq!(ingested.source, SourceKind::Structured);
    assert_eq!(ingested.runs.len(), 2);
    assert_eq!(ingested.skipped, 1);
    assert_eq!(ingested.runs[1].data, "S:3;");
}

#[test]
fn no_sources_is_an_ingestion_error() {
    let dir = TempDir::new().unwrap();
    let sources = sources(&dir);
    fs::write(&sources.structured, "\n\n").unwrap();

    let err = ingest(&sources, RecordShape::Universal).unwrap_err();
    assert!(matches!(err, IngestError::NoRuns { .. }));
    assert!(err.to_string().contains("no runs found"));
}

#[test]
fn converted_legacy_log_reads_back_as_structured() {
    let dir = TempDir::new().unwrap();
    let legacy = dir.path().join("legacy.txt");
    let jsonl = dir.path().join("converted.jsonl");
    fs::write(&legacy, LEGACY).unwrap();

    let runs = scan_legacy(&legacy).unwrap();
    assert_eq!(write_runs(&jsonl, &runs).unwrap(), 2);

    let text = fs::read_to_string(&jsonl).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| !l.contains(": ")));

    let mut reader = RunReader::open(&jsonl, RecordShape::SingleScheme, ReadMode::Strict).unwrap();
    assert_eq!(reader.read_all().unwrap(), runs);

    // Converted runs carry no keys, so the universal shape rejects them.
    let mut reader = RunReader::open(&jsonl, RecordShape::Universal, ReadMode::Permissive).unwrap();
    assert!(reader.read_all().unwrap().is_empty());
    assert_eq!(reader.skipped(), 2);
}
