use attestbench_canonical::Scheme;
use serde::{Deserialize, Serialize};

/// One attestation event.
///
/// The `delta` leg is produced inside the TEE and signs [`Run::data`]; the
/// `sigma` leg is produced by the time-stamping service and signs
/// [`Run::delta_payload`]. Keys are absent for runs read from the legacy
/// single-scheme variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Signature scheme of both legs.
    pub scheme: Scheme,
    /// Payload signed by the TEE leg.
    pub data: String,
    /// Payload signed by the TS leg.
    pub delta_payload: String,
    /// Base64 TEE signature.
    pub delta_signature: String,
    /// Base64 TS signature.
    pub sigma_signature: String,
    /// Base64 TEE public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_public_key: Option<String>,
    /// Base64 TS public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_public_key: Option<String>,
}

/// Borrowed (payload, signature, key) view of one side of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg<'a> {
    /// Signed payload.
    pub payload: &'a str,
    /// Base64 signature.
    pub signature: &'a str,
    /// Base64 public key, when the run carries one.
    pub public_key: Option<&'a str>,
}

impl Run {
    /// The TEE (delta) leg.
    pub fn tee_leg(&self) -> Leg<'_> {
        Leg {
            payload: &self.data,
            signature: &self.delta_signature,
            public_key: self.delta_public_key.as_deref(),
        }
    }

    /// The TS (sigma) leg.
    pub fn ts_leg(&self) -> Leg<'_> {
        Leg {
            payload: &self.delta_payload,
            signature: &self.sigma_signature,
            public_key: self.sigma_public_key.as_deref(),
        }
    }

    /// Whether both public keys are present.
    pub fn has_keys(&self) -> bool {
        self.delta_public_key.is_some() && self.sigma_public_key.is_some()
    }
}
