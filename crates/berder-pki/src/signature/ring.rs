//! Signature backend on `ring`.
//!
//! Public keys are the `subjectPublicKey` BIT STRING contents: a PKCS#1
//! `RSAPublicKey` for RSA, an uncompressed point for ECDSA and the raw 32
//! bytes for Ed25519.

use ::ring::signature::{self, Ed25519KeyPair, KeyPair, UnparsedPublicKey, VerificationAlgorithm};

use berder_types::{PkiError, SignAlgId};

use super::{SignatureProvider, SignatureVerifier, Signer};
use crate::AlgorithmIdentifier;

struct RingVerifier(&'static dyn VerificationAlgorithm);

impl SignatureVerifier for RingVerifier {
    fn verify(&self, public_key: &[u8], message: &[u8], sig: &[u8]) -> Result<bool, PkiError> {
        Ok(UnparsedPublicKey::new(self.0, public_key)
            .verify(message, sig)
            .is_ok())
    }
}

static RSA_SHA1: RingVerifier =
    RingVerifier(&signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY);
static RSA_SHA256: RingVerifier = RingVerifier(&signature::RSA_PKCS1_2048_8192_SHA256);
static RSA_SHA384: RingVerifier = RingVerifier(&signature::RSA_PKCS1_2048_8192_SHA384);
static RSA_SHA512: RingVerifier = RingVerifier(&signature::RSA_PKCS1_2048_8192_SHA512);
static ECDSA_P256_SHA256: RingVerifier = RingVerifier(&signature::ECDSA_P256_SHA256_ASN1);
static ECDSA_P384_SHA384: RingVerifier = RingVerifier(&signature::ECDSA_P384_SHA384_ASN1);
static ED25519: RingVerifier = RingVerifier(&signature::ED25519);

/// Verifiers for the RSA PKCS#1 v1.5, ECDSA and Ed25519 signature OIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingProvider;

impl SignatureProvider for RingProvider {
    fn verifier(&self, alg: &AlgorithmIdentifier) -> Option<&dyn SignatureVerifier> {
        let verifier: &RingVerifier = match alg.sign_alg()? {
            SignAlgId::RsaPkcs1Sha1 => &RSA_SHA1,
            SignAlgId::RsaPkcs1Sha256 => &RSA_SHA256,
            SignAlgId::RsaPkcs1Sha384 => &RSA_SHA384,
            SignAlgId::RsaPkcs1Sha512 => &RSA_SHA512,
            SignAlgId::EcdsaSha256 => &ECDSA_P256_SHA256,
            SignAlgId::EcdsaSha384 => &ECDSA_P384_SHA384,
            SignAlgId::Ed25519 => &ED25519,
        };
        Some(verifier)
    }
}

/// An Ed25519 [`Signer`] backed by a `ring` key pair.
pub struct Ed25519Signer {
    key_pair: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Derive the key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, PkiError> {
        let key_pair = Ed25519KeyPair::from_seed_unchecked(seed)
            .map_err(|e| PkiError::Engine(format!("Ed25519 seed rejected: {e}")))?;
        Ok(Self { key_pair })
    }

    /// The raw 32-byte public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }

    pub fn algorithm(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::new(berder_asn1::oid::known::ed25519(), None)
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, PkiError> {
        Ok(self.key_pair.sign(message).as_ref().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::verify_signed;
    use berder_asn1::asn1::Node;
    use berder_asn1::oid::{known, Oid};

    const SEED: [u8; 32] = [0x42; 32];

    #[test]
    fn test_ed25519_sign_and_verify() {
        let signer = Ed25519Signer::from_seed(&SEED).unwrap();
        let tbs = Node::sequence(vec![Node::utf8_string("payload")]);
        let sig = signer.sign(&tbs.to_der().unwrap()).unwrap();
        assert_eq!(sig.len(), 64);

        let alg = signer.algorithm();
        let key = signer.public_key();
        assert!(verify_signed(&tbs, &alg, &sig, &key, &RingProvider).unwrap());

        let other = Node::sequence(vec![Node::utf8_string("payloaD")]);
        assert!(!verify_signed(&other, &alg, &sig, &key, &RingProvider).unwrap());
    }

    #[test]
    fn test_malformed_key_is_false() {
        let tbs = Node::sequence(vec![]);
        let alg = AlgorithmIdentifier::with_null_params(known::sha256_with_rsa_encryption());
        assert!(!verify_signed(&tbs, &alg, &[0u8; 256], &[1, 2, 3], &RingProvider).unwrap());
    }

    #[test]
    fn test_provider_coverage() {
        for oid in [
            known::sha1_with_rsa_encryption(),
            known::sha256_with_rsa_encryption(),
            known::sha384_with_rsa_encryption(),
            known::sha512_with_rsa_encryption(),
            known::ecdsa_with_sha256(),
            known::ecdsa_with_sha384(),
            known::ed25519(),
        ] {
            let alg = AlgorithmIdentifier::new(oid, None);
            assert!(RingProvider.verifier(&alg).is_some());
        }
        let md5_rsa = AlgorithmIdentifier::new(Oid::new(&[1, 2, 840, 113549, 1, 1, 4]), None);
        assert!(RingProvider.verifier(&md5_rsa).is_none());
    }
}
