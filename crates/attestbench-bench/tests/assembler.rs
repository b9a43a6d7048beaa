use attestbench_bench::{
    plan_groups, prepare_run, verify_indexed, verify_run, Assembler, BenchError, CallConfig,
    CallShape, CostEstimator, EncodedCall, RpcError, SchemeLabel, SignatureMode, StaticCostModel,
    Verifier,
};
use attestbench_canonical::{Address, DigestMode, Scheme};
use attestbench_journal::Run;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k256::ecdsa::SigningKey;

fn tee_key() -> SigningKey {
    SigningKey::from_slice(&[0x42; 32]).unwrap()
}

fn ts_key() -> SigningKey {
    SigningKey::from_slice(&[0x43; 32]).unwrap()
}

fn sign_der(key: &SigningKey, payload: &str, digest: DigestMode) -> Vec<u8> {
    let (sig, _) = key
        .sign_prehash_recoverable(&digest.digest(payload.as_bytes()))
        .unwrap();
    sig.to_der().as_bytes().to_vec()
}

fn sec1_b64(key: &SigningKey) -> String {
    BASE64.encode(key.verifying_key().to_encoded_point(false).as_bytes())
}

fn k1_run(tag: usize, digest: DigestMode) -> Run {
    let data = format!("PageA:0.{:04};PageB:0.1897;", tag);
    let delta_payload = format!("TSv1|{}|1700000000000", tag);
    Run {
        scheme: Scheme::EcdsaK1,
        delta_signature: BASE64.encode(sign_der(&tee_key(), &data, digest)),
        sigma_signature: BASE64.encode(sign_der(&ts_key(), &delta_payload, digest)),
        delta_public_key: Some(sec1_b64(&tee_key())),
        sigma_public_key: Some(sec1_b64(&ts_key())),
        data,
        delta_payload,
    }
}

fn runs(n: usize) -> Vec<Run> {
    (0..n).map(|i| k1_run(i, DigestMode::Sha256)).collect()
}

/// Words taken by an ABI `string`/`bytes` of `len` bytes in a tail.
fn dynamic_words(len: usize) -> usize {
    1 + len.div_ceil(32)
}

struct FailingEstimator;

impl CostEstimator for FailingEstimator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn estimate(&self, _call: &EncodedCall) -> Result<u64, RpcError> {
        Err(RpcError::Transport {
            method: "eth_estimateGas",
            message: "connection refused".into(),
        })
    }
}

struct FixedVerifier(bool);

impl Verifier for FixedVerifier {
    fn verify(&self, _call: &EncodedCall) -> Result<bool, RpcError> {
        Ok(self.0)
    }
}

#[test]
fn end_to_end_k1_run_with_70_byte_der() {
    let (tag, run) = (0..64)
        .map(|tag| (tag, k1_run(tag, DigestMode::Sha256)))
        .find(|(_, run)| BASE64.decode(&run.delta_signature).unwrap().len() == 70)
        .unwrap();
    assert_eq!(
        BASE64.decode(run.delta_public_key.as_ref().unwrap()).unwrap().len(),
        65
    );

    let prepared = prepare_run(&run, tag, DigestMode::Sha256).unwrap();
    let key = prepared.tee.public_key.as_ref().unwrap();
    assert_eq!(prepared.tee.signature.to_bytes().len(), 64);
    assert_eq!(key.bytes.len(), 64);
    let signer = prepared.tee.signer.unwrap();
    assert!(!signer.address.is_zero());
    assert_eq!(Some(signer.address), prepared.tee.key_address());

    let runs = vec![run];
    let estimator = StaticCostModel;
    let assembler = Assembler::new(&runs, CallConfig::default(), &estimator);
    let reports = assembler.run_all(&[1]).unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    let call = assembler.encode(0).unwrap();
    assert!(report.avg_cost > 0);
    assert_eq!(report.avg_cost, StaticCostModel.estimate(&call).unwrap());
    assert_eq!(report.scheme, SchemeLabel::Single(Scheme::EcdsaK1));

    let leg_words = |payload: &str| 3 + dynamic_words(payload.len()) + dynamic_words(64) * 2;
    let expected = 4
        + 32 * (3
            + dynamic_words("ecdsa-k1".len())
            + leg_words(&runs[0].data)
            + leg_words(&runs[0].delta_payload));
    assert_eq!(report.payload_bytes, expected);
    assert_eq!(call.calldata.len(), expected);
}

#[test]
fn counts_five_and_ten_over_twelve_runs() {
    let runs = runs(12);
    let estimator = StaticCostModel;
    let assembler = Assembler::new(&runs, CallConfig::default(), &estimator);

    let reports = assembler.run_all(&[5, 10, 15]).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].count, 5);
    assert_eq!(reports[1].count, 7);
    assert_eq!(reports[1].requested, 10);
    assert_eq!(plan_groups(runs.len(), &[5, 10, 15]).len(), 2);
}

#[test]
fn legacy_shape_carries_recovered_signers() {
    let runs = vec![k1_run(1, DigestMode::EthSigned)];
    let config = CallConfig {
        shape: CallShape::Legacy,
        mode: SignatureMode::Two,
        digest: DigestMode::EthSigned,
    };
    let estimator = StaticCostModel;
    let assembler = Assembler::new(&runs, config, &estimator);
    let call = assembler.encode(0).unwrap();
    assert_eq!(call.function, "verifyTwoSignatures");
    assert_eq!(call.signatures, 2);

    let tee = Address::from_verifying_key(tee_key().verifying_key());
    let ts = Address::from_verifying_key(ts_key().verifying_key());
    let words: Vec<&[u8]> = call.calldata[4..].chunks(32).collect();
    // Head: (string, bytes, address, string, bytes, address)
    assert_eq!(&words[2][12..], tee.as_bytes());
    assert_eq!(&words[5][12..], ts.as_bytes());
}

#[test]
fn wrong_digest_mode_aborts_group_with_run_index() {
    let mut runs = runs(8);
    runs[6] = k1_run(6, DigestMode::EthSigned);
    let estimator = StaticCostModel;
    let assembler = Assembler::new(&runs, CallConfig::default(), &estimator);

    let err = assembler.run_all(&[4, 4]).unwrap_err();
    assert!(matches!(err, BenchError::Run { index: 6, .. }));
    assert!(err.to_string().starts_with("run 6: TEE leg: no recovery id"));
}

#[test]
fn filtered_runs_report_their_log_index() {
    let mut runs = runs(3);
    runs[2] = k1_run(2, DigestMode::EthSigned);
    let log_indices = [1, 4, 9];
    let estimator = StaticCostModel;
    let assembler =
        Assembler::new(&runs, CallConfig::default(), &estimator).with_indices(&log_indices);

    assert_eq!(assembler.encode(1).unwrap().index, 4);
    let err = assembler.run_all(&[3]).unwrap_err();
    assert!(matches!(err, BenchError::Run { index: 9, .. }));
    assert!(err.to_string().starts_with("run 9: "));
}

#[test]
fn failed_estimate_aborts_group() {
    let runs = runs(3);
    let estimator = FailingEstimator;
    let assembler = Assembler::new(&runs, CallConfig::default(), &estimator);
    let err = assembler.run_all(&[3]).unwrap_err();
    assert!(matches!(err, BenchError::ExternalCall(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn verifier_false_is_a_mismatch() {
    let runs = runs(2);
    let config = CallConfig::default();

    let ok = verify_run(&runs, 1, config, &FixedVerifier(true)).unwrap();
    assert_eq!(ok.prepared.index, 1);
    assert_eq!(ok.call.function, "verifyAttestationPair");

    let err = verify_run(&runs, 1, config, &FixedVerifier(false)).unwrap_err();
    assert!(matches!(err, BenchError::VerificationMismatch { index: 1 }));

    let err = verify_run(&runs, 5, config, &FixedVerifier(true)).unwrap_err();
    assert!(matches!(err, BenchError::NoSuchRun { index: 5, total: 2 }));

    let err = verify_indexed(&runs[0], 7, config, &FixedVerifier(false)).unwrap_err();
    assert!(matches!(err, BenchError::VerificationMismatch { index: 7 }));
}

#[test]
fn one_signature_mode_sends_tee_leg_only() {
    let runs = runs(1);
    let config = CallConfig {
        mode: SignatureMode::One,
        ..CallConfig::default()
    };
    let estimator = StaticCostModel;
    let call = Assembler::new(&runs, config, &estimator).encode(0).unwrap();
    assert_eq!(call.function, "verifyAttestation");
    assert_eq!(call.signatures, 1);
}
