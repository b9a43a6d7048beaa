use attestbench_canonical::{
    decode_der_signature, normalize_public_key, normalize_public_key_bytes, normalize_signature,
    recover_signer, Address, DigestMode, KeyEncoding, RecoveryError, Scheme,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use k256::Scalar;
use proptest::prelude::*;

fn k1_key() -> SigningKey {
    SigningKey::from_slice(&[0x42; 32]).unwrap()
}

fn der_integer(magnitude: &[u8]) -> Vec<u8> {
    let mut body = magnitude.to_vec();
    if body.first().map_or(true, |b| b & 0x80 != 0) {
        body.insert(0, 0x00);
    }
    let mut out = vec![0x02, body.len() as u8];
    out.extend(body);
    out
}

fn der_signature(r: &[u8], s: &[u8]) -> Vec<u8> {
    let mut body = der_integer(r);
    body.extend(der_integer(s));
    let mut out = vec![0x30, body.len() as u8];
    out.extend(body);
    out
}

fn pad32(magnitude: &[u8]) -> [u8; 32] {
    let start = magnitude.iter().position(|b| *b != 0).unwrap_or(magnitude.len().saturating_sub(1));
    let stripped = &magnitude[start.min(magnitude.len() - 1)..];
    let mut out = [0u8; 32];
    out[32 - stripped.len()..].copy_from_slice(stripped);
    out
}

#[test]
fn exactly_one_recovery_id_yields_the_signer() {
    let key = k1_key();
    let expected = Address::from_verifying_key(key.verifying_key());
    let digest = DigestMode::Sha256.digest(b"PageA:0.3527;PageB:0.1897;");
    let (sig, _) = key.sign_prehash_recoverable(&digest).unwrap();

    let pair = decode_der_signature(sig.to_der().as_bytes()).unwrap();
    let matches = [0u8, 1]
        .into_iter()
        .filter(|id| {
            let id = RecoveryId::from_byte(*id).unwrap();
            VerifyingKey::recover_from_prehash(&digest, &sig, id)
                .map(|vk| Address::from_verifying_key(&vk) == expected)
                .unwrap_or(false)
        })
        .count();
    assert_eq!(matches, 1);

    let signer = recover_signer(&digest, &pair, Some(&expected)).unwrap();
    assert_eq!(signer.address, expected);
    assert!(signer.v == 27 || signer.v == 28);
    assert_eq!(signer.rsv().len(), 65);
}

#[test]
fn recovery_without_expected_accepts_first_wellformed_candidate() {
    let key = k1_key();
    let expected = Address::from_verifying_key(key.verifying_key());
    let digest = DigestMode::EthSigned.digest(b"TSv1|abc|def|1700000000000");
    let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
    let pair = decode_der_signature(sig.to_der().as_bytes()).unwrap();

    let signer = recover_signer(&digest, &pair, None).unwrap();
    assert!(!signer.address.is_zero());
    if signer.v == recid.to_byte() + 27 {
        assert_eq!(signer.address, expected);
    } else {
        assert_ne!(signer.address, expected);
    }
}

#[test]
fn flipped_bit_does_not_recover_the_signer() {
    let key = k1_key();
    let expected = Address::from_verifying_key(key.verifying_key());
    let digest = DigestMode::Sha256.digest(b"payload");
    let (sig, _) = key.sign_prehash_recoverable(&digest).unwrap();
    let pair = decode_der_signature(sig.to_der().as_bytes()).unwrap();

    let mut flipped_s = pair;
    flipped_s.s[31] ^= 0x01;
    assert_eq!(
        recover_signer(&digest, &flipped_s, Some(&expected)).unwrap_err(),
        RecoveryError::SignerMismatch { expected }
    );

    let mut flipped_r = pair;
    flipped_r.r[31] ^= 0x01;
    match recover_signer(&digest, &flipped_r, None) {
        Ok(signer) => assert_ne!(signer.address, expected),
        Err(err) => assert_eq!(err, RecoveryError::NoValidSigner),
    }
}

#[test]
fn wrong_digest_mode_is_a_recovery_error() {
    let key = k1_key();
    let expected = Address::from_verifying_key(key.verifying_key());
    let payload = b"PageA:0.3527;";
    let digest = DigestMode::EthSigned.digest(payload);
    let (sig, _) = key.sign_prehash_recoverable(&digest).unwrap();
    let pair = decode_der_signature(sig.to_der().as_bytes()).unwrap();

    let wrong = DigestMode::Sha256.digest(payload);
    assert!(recover_signer(&wrong, &pair, Some(&expected)).is_err());
}

#[test]
fn high_s_der_signature_recovers_after_canonicalization() {
    let key = k1_key();
    let expected = Address::from_verifying_key(key.verifying_key());
    let digest = DigestMode::Sha256.digest(b"high-s");
    let (sig, _) = key.sign_prehash_recoverable(&digest).unwrap();
    let bytes = sig.to_bytes();
    let r: [u8; 32] = bytes[..32].try_into().unwrap();
    let low_s: [u8; 32] = bytes[32..].try_into().unwrap();
    let s: Scalar = *sig.s();
    let high_s: [u8; 32] = (-s).to_bytes().as_slice().try_into().unwrap();
    assert_ne!(high_s, low_s);

    let b64 = BASE64.encode(der_signature(&r, &high_s));
    let canonical = normalize_signature(Scheme::EcdsaK1, &b64).unwrap();
    let pair = canonical.scalars().unwrap();
    assert_eq!(pair.s, low_s);

    let signer = recover_signer(&digest, pair, Some(&expected)).unwrap();
    assert_eq!(signer.address, expected);
}

#[test]
fn der_signature_with_s_above_order_is_rejected() {
    let key = k1_key();
    let (sig, _) = key.sign_prehash_recoverable(&DigestMode::Sha256.digest(b"wrap")).unwrap();
    let r: [u8; 32] = sig.to_bytes()[..32].try_into().unwrap();

    // N + 1 would wrap to 1 under unchecked subtraction.
    let mut n_plus_one: [u8; 32] = (-Scalar::ONE).to_bytes().as_slice().try_into().unwrap();
    n_plus_one[31] += 2;

    let b64 = BASE64.encode(der_signature(&r, &n_plus_one));
    let err = normalize_signature(Scheme::EcdsaK1, &b64).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn p256_der_signature_decodes_without_canonicalization() {
    use p256::ecdsa::signature::Signer;

    let key = p256::ecdsa::SigningKey::from_slice(&[0x17; 32]).unwrap();
    let sig: p256::ecdsa::Signature = key.sign(b"PageA:0.3527;");
    let b64 = BASE64.encode(sig.to_der().as_bytes());

    let canonical = normalize_signature(Scheme::EcdsaR1, &b64).unwrap();
    assert_eq!(canonical.to_bytes().as_slice(), sig.to_bytes().as_slice());
}

#[test]
fn spki_keys_from_both_curves_normalize_by_scan() {
    use p256::pkcs8::EncodePublicKey as _;

    let r1 = p256::ecdsa::SigningKey::from_slice(&[0x17; 32]).unwrap();
    let r1_vk = r1.verifying_key();
    let r1_spki = r1_vk.to_public_key_der().unwrap();
    assert_eq!(r1_spki.as_bytes().len(), 91);
    let key = normalize_public_key(Scheme::EcdsaR1, &BASE64.encode(r1_spki.as_bytes())).unwrap();
    assert_eq!(key.encoding, KeyEncoding::SpkiEmbedded);
    assert_eq!(key.bytes.as_slice(), &r1_vk.to_encoded_point(false).as_bytes()[1..]);

    let k1 = k1_key();
    let k1_spki = k1.verifying_key().to_public_key_der().unwrap();
    let key = normalize_public_key_bytes(Scheme::EcdsaK1, k1_spki.as_bytes()).unwrap();
    let point = key.point().unwrap();
    assert_eq!(
        Address::from_point(&point),
        Address::from_verifying_key(k1.verifying_key())
    );
}

#[test]
fn sec1_key_matches_recovered_signer() {
    let key = k1_key();
    let sec1 = key.verifying_key().to_encoded_point(false);
    assert_eq!(sec1.as_bytes().len(), 65);
    let normalized = normalize_public_key(Scheme::EcdsaK1, &BASE64.encode(sec1.as_bytes())).unwrap();
    assert_eq!(normalized.encoding, KeyEncoding::Sec1Uncompressed);
    assert_eq!(normalized.bytes.len(), 64);
    assert_eq!(
        Address::from_point(&normalized.point().unwrap()),
        Address::from_verifying_key(key.verifying_key())
    );
}

proptest! {
    #[test]
    fn der_decoding_pads_magnitudes(
        r in proptest::collection::vec(any::<u8>(), 1..=32),
        s in proptest::collection::vec(any::<u8>(), 1..=32),
    ) {
        let pair = decode_der_signature(&der_signature(&r, &s)).unwrap();
        prop_assert_eq!(pair.r, pad32(&r));
        prop_assert_eq!(pair.s, pad32(&s));
    }
}
