//! AlgorithmIdentifier and the OID-to-algorithm mapping.

use berder_asn1::asn1::Node;
use berder_asn1::oid::{known, Oid};
use berder_types::{HashAlgId, PkiError, SignAlgId};

use crate::schema::{field, Fields};

/// ```text
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL }
/// ```
#[derive(Debug, Clone)]
pub struct AlgorithmIdentifier {
    algorithm: Oid,
    parameters: Option<Node>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: Oid, parameters: Option<Node>) -> Self {
        Self {
            algorithm,
            parameters,
        }
    }

    /// An identifier with explicit NULL parameters, as RSA and the SHA
    /// family conventionally carry.
    pub fn with_null_params(algorithm: Oid) -> Self {
        Self::new(algorithm, Some(Node::null()))
    }

    pub fn algorithm(&self) -> &Oid {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&Node> {
        self.parameters.as_ref()
    }

    pub fn sign_alg(&self) -> Option<SignAlgId> {
        oid_to_sign_alg(&self.algorithm)
    }

    pub fn hash_alg(&self) -> Option<HashAlgId> {
        oid_to_hash_alg(&self.algorithm)
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("AlgorithmIdentifier", node)?;
        let algorithm = field("AlgorithmIdentifier.algorithm", fields.next("algorithm")?.as_oid())?;
        let parameters = fields.next("parameters").ok().cloned();
        fields.finish()?;
        Ok(Self {
            algorithm,
            parameters,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut children = vec![Node::oid(&self.algorithm)];
        children.extend(self.parameters.clone());
        Node::sequence(children)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.to_node().to_der()?)
    }
}

der_equality!(AlgorithmIdentifier);

/// Map a signature algorithm OID to its `SignAlgId`.
pub(crate) fn oid_to_sign_alg(oid: &Oid) -> Option<SignAlgId> {
    if *oid == known::sha1_with_rsa_encryption() {
        Some(SignAlgId::RsaPkcs1Sha1)
    } else if *oid == known::sha256_with_rsa_encryption() {
        Some(SignAlgId::RsaPkcs1Sha256)
    } else if *oid == known::sha384_with_rsa_encryption() {
        Some(SignAlgId::RsaPkcs1Sha384)
    } else if *oid == known::sha512_with_rsa_encryption() {
        Some(SignAlgId::RsaPkcs1Sha512)
    } else if *oid == known::ecdsa_with_sha256() {
        Some(SignAlgId::EcdsaSha256)
    } else if *oid == known::ecdsa_with_sha384() {
        Some(SignAlgId::EcdsaSha384)
    } else if *oid == known::ed25519() {
        Some(SignAlgId::Ed25519)
    } else {
        None
    }
}

/// Map a digest OID to its `HashAlgId`.
pub(crate) fn oid_to_hash_alg(oid: &Oid) -> Option<HashAlgId> {
    if *oid == known::sha1() {
        Some(HashAlgId::Sha1)
    } else if *oid == known::sha256() {
        Some(HashAlgId::Sha256)
    } else if *oid == known::sha384() {
        Some(HashAlgId::Sha384)
    } else if *oid == known::sha512() {
        Some(HashAlgId::Sha512)
    } else {
        None
    }
}

/// The OID of a digest, for the digests that have one registered here.
pub(crate) fn hash_alg_to_oid(alg: HashAlgId) -> Option<Oid> {
    match alg {
        HashAlgId::Sha1 => Some(known::sha1()),
        HashAlgId::Sha256 => Some(known::sha256()),
        HashAlgId::Sha384 => Some(known::sha384()),
        HashAlgId::Sha512 => Some(known::sha512()),
        _ => None,
    }
}
