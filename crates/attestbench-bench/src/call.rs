use attestbench_canonical::{DigestMode, Scheme};
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address as EvmAddress, Bytes};
use alloy_sol_types::SolCall;

use crate::errors::PrepareError;
use crate::interface::{
    verifyAttestationCall, verifyAttestationPairCall, verifySignatureCall,
    verifySignatureSha256Call, verifyTwoSignaturesCall, verifyTwoSignaturesSha256Call,
    Attestation,
};
use crate::payload::{PreparedLeg, PreparedRun};

/// Which verifier interface calldata targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallShape {
    /// Scheme-polymorphic router taking `(scheme, (data, signature, publicKey)...)`.
    #[default]
    Universal,
    /// Fixed-name secp256k1 verifier taking `(data, r||s||v, signer)...`.
    Legacy,
}

impl CallShape {
    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            CallShape::Universal => "universal",
            CallShape::Legacy => "legacy",
        }
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "universal" => Ok(CallShape::Universal),
            "legacy" => Ok(CallShape::Legacy),
            other => Err(format!(
                "unknown call shape '{}', expected 'universal' or 'legacy'",
                other
            )),
        }
    }
}

/// How many legs each call verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMode {
    /// TEE leg only.
    One,
    /// TEE and TS legs.
    #[default]
    Two,
}

impl SignatureMode {
    /// Number of signatures verified per call.
    pub fn signatures(self) -> usize {
        match self {
            SignatureMode::One => 1,
            SignatureMode::Two => 2,
        }
    }

    /// Name used on the command line and in report file names.
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureMode::One => "one",
            SignatureMode::Two => "two",
        }
    }
}

impl fmt::Display for SignatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one" => Ok(SignatureMode::One),
            "two" => Ok(SignatureMode::Two),
            other => Err(format!("unknown mode '{}', expected 'one' or 'two'", other)),
        }
    }
}

/// Settings shared by every call in a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallConfig {
    /// Verifier interface.
    pub shape: CallShape,
    /// Legs per call.
    pub mode: SignatureMode,
    /// Digest mode; selects the legacy function family.
    pub digest: DigestMode,
}

/// Encoded verifier call for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    /// Run the call was built from.
    pub index: usize,
    /// Scheme of the run.
    pub scheme: Scheme,
    /// Function name invoked.
    pub function: &'static str,
    /// Signatures verified by the call.
    pub signatures: usize,
    /// Full calldata, selector included.
    pub calldata: Vec<u8>,
}

/// Builds verifier calldata for a prepared run.
///
/// # Errors
///
/// The universal shape requires public keys on every leg it sends; the legacy
/// shape requires `ecdsa-k1` and a recovered signer on every leg.
pub fn encode_run(run: &PreparedRun, config: CallConfig) -> Result<EncodedCall, PrepareError> {
    let (function, calldata) = match config.shape {
        CallShape::Universal => encode_universal(run, config.mode)?,
        CallShape::Legacy => {
            if run.scheme != Scheme::EcdsaK1 {
                return Err(PrepareError::UnsupportedScheme(run.scheme));
            }
            encode_legacy(run, config.mode, config.digest)?
        }
    };

    Ok(EncodedCall {
        index: run.index,
        scheme: run.scheme,
        function,
        signatures: config.mode.signatures(),
        calldata,
    })
}

fn encode_universal(
    run: &PreparedRun,
    mode: SignatureMode,
) -> Result<(&'static str, Vec<u8>), PrepareError> {
    let scheme = run.scheme.as_str().to_string();
    Ok(match mode {
        SignatureMode::One => (
            "verifyAttestation",
            verifyAttestationCall {
                scheme,
                attestation: attestation(&run.tee)?,
            }
            .abi_encode(),
        ),
        SignatureMode::Two => (
            "verifyAttestationPair",
            verifyAttestationPairCall {
                scheme,
                tee: attestation(&run.tee)?,
                ts: attestation(&run.ts)?,
            }
            .abi_encode(),
        ),
    })
}

fn encode_legacy(
    run: &PreparedRun,
    mode: SignatureMode,
    digest: DigestMode,
) -> Result<(&'static str, Vec<u8>), PrepareError> {
    let function = legacy_function(mode, digest);
    let a = legacy_leg(&run.tee)?;
    if mode == SignatureMode::One {
        let calldata = match digest {
            DigestMode::EthSigned => verifySignatureCall {
                data: a.data,
                signature: a.signature,
                expectedSigner: a.signer,
            }
            .abi_encode(),
            DigestMode::Sha256 => verifySignatureSha256Call {
                data: a.data,
                signature: a.signature,
                expectedSigner: a.signer,
            }
            .abi_encode(),
        };
        return Ok((function, calldata));
    }

    let b = legacy_leg(&run.ts)?;
    let calldata = match digest {
        DigestMode::EthSigned => verifyTwoSignaturesCall {
            dataA: a.data,
            signatureA: a.signature,
            expectedSignerA: a.signer,
            dataB: b.data,
            signatureB: b.signature,
            expectedSignerB: b.signer,
        }
        .abi_encode(),
        DigestMode::Sha256 => verifyTwoSignaturesSha256Call {
            dataA: a.data,
            signatureA: a.signature,
            expectedSignerA: a.signer,
            dataB: b.data,
            signatureB: b.signature,
            expectedSignerB: b.signer,
        }
        .abi_encode(),
    };
    Ok((function, calldata))
}

fn legacy_function(mode: SignatureMode, digest: DigestMode) -> &'static str {
    match (mode, digest) {
        (SignatureMode::One, DigestMode::EthSigned) => "verifySignature",
        (SignatureMode::Two, DigestMode::EthSigned) => "verifyTwoSignatures",
        (SignatureMode::One, DigestMode::Sha256) => "verifySignatureSha256",
        (SignatureMode::Two, DigestMode::Sha256) => "verifyTwoSignaturesSha256",
    }
}

fn attestation(leg: &PreparedLeg) -> Result<Attestation, PrepareError> {
    let key = leg
        .public_key
        .as_ref()
        .ok_or(PrepareError::MissingKey { leg: leg.kind })?;
    Ok(Attestation {
        data: leg.payload.clone(),
        signature: Bytes::from(leg.signature.to_bytes().to_vec()),
        publicKey: Bytes::from(key.bytes.clone()),
    })
}

/// `(data, r||s||v, signer)` triple of the fixed-name verifier.
struct LegacyLeg {
    data: String,
    signature: Bytes,
    signer: EvmAddress,
}

fn legacy_leg(leg: &PreparedLeg) -> Result<LegacyLeg, PrepareError> {
    let signer = leg.signer.ok_or(PrepareError::UnsupportedScheme(leg.signature.scheme()))?;
    Ok(LegacyLeg {
        data: leg.payload.clone(),
        signature: Bytes::from(signer.rsv().to_vec()),
        signer: EvmAddress::from(signer.address.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::LegKind;
    use attestbench_canonical::{
        Address, CanonicalSignature, KeyEncoding, NormalizedKey, RecoveredSigner, ScalarPair,
    };

    fn k1_leg(kind: LegKind, payload: &str) -> PreparedLeg {
        let pair = ScalarPair {
            r: [1; 32],
            s: [2; 32],
        };
        PreparedLeg {
            kind,
            payload: payload.into(),
            signature: CanonicalSignature::Ecdsa {
                scheme: Scheme::EcdsaK1,
                pair,
            },
            public_key: Some(NormalizedKey {
                scheme: Scheme::EcdsaK1,
                bytes: vec![4; 64],
                encoding: KeyEncoding::RawPoint,
            }),
            signer: Some(RecoveredSigner {
                address: Address([9; 20]),
                v: 28,
                signature: pair,
            }),
        }
    }

    fn k1_run() -> PreparedRun {
        PreparedRun {
            index: 0,
            scheme: Scheme::EcdsaK1,
            tee: k1_leg(LegKind::Tee, "A:0.1;"),
            ts: k1_leg(LegKind::Ts, "TSv1|a"),
        }
    }

    #[test]
    fn universal_pair_uses_tuple_signature() {
        let call = encode_run(&k1_run(), CallConfig::default()).unwrap();
        assert_eq!(call.function, "verifyAttestationPair");
        assert_eq!(call.signatures, 2);
        assert_eq!(&call.calldata[..4], &verifyAttestationPairCall::SELECTOR);
    }

    #[test]
    fn legacy_function_follows_digest_mode() {
        let config = CallConfig {
            shape: CallShape::Legacy,
            mode: SignatureMode::One,
            digest: DigestMode::EthSigned,
        };
        let call = encode_run(&k1_run(), config).unwrap();
        assert_eq!(call.function, "verifySignature");
        assert_eq!(&call.calldata[..4], &verifySignatureCall::SELECTOR);
        // selector + 3 head words + "A:0.1;" (2 words) + rsv (1 + 3 words)
        assert_eq!(call.calldata.len(), 4 + 32 * 9);
        assert_eq!(
            legacy_function(SignatureMode::Two, DigestMode::Sha256),
            "verifyTwoSignaturesSha256"
        );
    }

    #[test]
    fn universal_shape_needs_keys() {
        let mut run = k1_run();
        run.ts.public_key = None;
        let err = encode_run(&run, CallConfig::default()).unwrap_err();
        assert_eq!(err, PrepareError::MissingKey { leg: LegKind::Ts });

        let one = CallConfig {
            mode: SignatureMode::One,
            ..CallConfig::default()
        };
        assert!(encode_run(&run, one).is_ok());
    }

    #[test]
    fn legacy_shape_rejects_other_schemes() {
        let mut run = k1_run();
        run.scheme = Scheme::EcdsaR1;
        let config = CallConfig {
            shape: CallShape::Legacy,
            ..CallConfig::default()
        };
        assert_eq!(
            encode_run(&run, config).unwrap_err(),
            PrepareError::UnsupportedScheme(Scheme::EcdsaR1)
        );
    }
}
