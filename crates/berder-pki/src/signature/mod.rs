//! Signature capabilities and verification of signed structures.
//!
//! The signature engine itself is external: structures hand the canonical
//! DER of their signed payload to a [`SignatureVerifier`] found through a
//! [`SignatureProvider`]. A verifier answering `false` is a verdict, not an
//! error.

#[cfg(feature = "ring")]
mod ring;

#[cfg(feature = "ring")]
pub use self::ring::{Ed25519Signer, RingProvider};

use berder_asn1::asn1::Node;
use berder_asn1::oid::Oid;
use berder_types::PkiError;

use crate::AlgorithmIdentifier;

/// Verifies a signature over a message with a public key.
pub trait SignatureVerifier: Send + Sync {
    /// `Ok(false)` when the signature does not match, including when the
    /// engine rejects the key or signature as malformed.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8])
        -> Result<bool, PkiError>;
}

/// Finds the verifier for a signature algorithm.
pub trait SignatureProvider {
    fn verifier(&self, alg: &AlgorithmIdentifier) -> Option<&dyn SignatureVerifier>;
}

/// Produces signatures for structures being built.
pub trait Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, PkiError>;
}

/// Adapts a lookup function from algorithm OID to verifier into a
/// [`SignatureProvider`].
pub struct ProviderFn<F>(pub F);

impl<F> SignatureProvider for ProviderFn<F>
where
    F: Fn(&Oid) -> Option<&'static dyn SignatureVerifier>,
{
    fn verifier(&self, alg: &AlgorithmIdentifier) -> Option<&dyn SignatureVerifier> {
        (self.0)(alg.algorithm())
    }
}

/// Verify `signature` over the DER re-encoding of `tbs`.
pub fn verify_signed(
    tbs: &Node,
    alg: &AlgorithmIdentifier,
    signature: &[u8],
    public_key: &[u8],
    provider: &dyn SignatureProvider,
) -> Result<bool, PkiError> {
    let message = tbs.to_der()?;
    let verifier = provider.verifier(alg).ok_or_else(|| {
        log::debug!("no verifier registered for {}", alg.algorithm());
        PkiError::UnsupportedAlgorithm(format!("signature algorithm {}", alg.algorithm()))
    })?;
    let valid = verifier.verify(public_key, &message, signature)?;
    if !valid {
        log::debug!(
            "signature with {} does not match {} byte payload",
            alg.algorithm(),
            message.len()
        );
    }
    Ok(valid)
}
