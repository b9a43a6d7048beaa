//! Solidity interfaces of the deployed verifiers.
//!
//! Every verifier function returns a single `bool`, so one return decoder
//! serves all of them.

use alloy_sol_types::{sol, SolCall};

sol! {
    /// One signed statement as the universal router receives it.
    struct Attestation {
        string data;
        bytes signature;
        bytes publicKey;
    }

    function verifyAttestation(string scheme, Attestation attestation) external view returns (bool);
    function verifyAttestationPair(string scheme, Attestation tee, Attestation ts) external view returns (bool);

    function verifySignature(string data, bytes signature, address expectedSigner) external pure returns (bool);
    function verifyTwoSignatures(string dataA, bytes signatureA, address expectedSignerA, string dataB, bytes signatureB, address expectedSignerB) external pure returns (bool);
    function verifySignatureSha256(string data, bytes signature, address expectedSigner) external pure returns (bool);
    function verifyTwoSignaturesSha256(string dataA, bytes signatureA, address expectedSignerA, string dataB, bytes signatureB, address expectedSignerB) external pure returns (bool);
}

/// Decodes the `bool` returned by any verifier function.
pub fn decode_verdict(data: &[u8]) -> Result<bool, alloy_sol_types::Error> {
    Ok(verifySignatureCall::abi_decode_returns(data, true)?._0)
}
