//! Certificate decoding capability for the certificates carried in responses.

use berder_asn1::asn1::{decode_der, Node};
use berder_types::PkiError;

use crate::schema::{field, logged, violation};

/// Turns the DER of one certificate into an application certificate type.
pub trait CertificateDecoder {
    type Certificate;

    fn decode(&self, der: &[u8]) -> Result<Self::Certificate, PkiError>;
}

/// A certificate kept as its DER encoding and decoded tree.
///
/// Only the outer shape is checked: a SEQUENCE of
/// `tbsCertificate, signatureAlgorithm, signatureValue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawCertificate {
    der: Vec<u8>,
    node: Node,
}

impl RawCertificate {
    pub fn from_der(der: &[u8]) -> Result<Self, PkiError> {
        logged("certificate", Self::parse(der))
    }

    fn parse(der: &[u8]) -> Result<Self, PkiError> {
        let node = decode_der(der)?;
        let children = field("Certificate", node.as_sequence())?;
        if children.len() != 3 {
            return Err(violation(format!(
                "Certificate: expected 3 fields, found {}",
                children.len()
            )));
        }
        Ok(Self {
            der: der.to_vec(),
            node,
        })
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The `tbsCertificate` subtree.
    pub fn tbs(&self) -> &Node {
        &self.node.children()[0]
    }
}

/// The built-in decoder producing [`RawCertificate`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCertificateDecoder;

impl CertificateDecoder for RawCertificateDecoder {
    type Certificate = RawCertificate;

    fn decode(&self, der: &[u8]) -> Result<RawCertificate, PkiError> {
        RawCertificate::from_der(der)
    }
}

/// A minimal certificate-shaped tree for tests: the tbs carries a serial
/// number and a subject common name.
#[cfg(test)]
pub(crate) fn test_certificate(serial: u64, cn: &str) -> Node {
    use berder_asn1::oid::known;

    let name = Node::sequence(vec![Node::set(vec![Node::sequence(vec![
        Node::oid(&berder_asn1::oid::Oid::new(&[2, 5, 4, 3])),
        Node::utf8_string(cn),
    ])])]);
    let tbs = Node::sequence(vec![Node::integer_u64(serial), name]);
    Node::sequence(vec![
        tbs,
        crate::AlgorithmIdentifier::new(known::ed25519(), None).to_node(),
        Node::bit_string(0, &[0u8; 64]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use berder_types::ErrorKind;

    #[test]
    fn test_decode_raw_certificate() {
        let der = test_certificate(7, "responder").to_der().unwrap();
        let cert = RawCertificateDecoder.decode(&der).unwrap();
        assert_eq!(cert.as_der(), der.as_slice());
        assert_eq!(cert.tbs().children()[0].as_u64().unwrap(), 7);
    }

    #[test]
    fn test_reject_non_certificate() {
        let der = Node::sequence(vec![Node::null()]).to_der().unwrap();
        let err = RawCertificate::from_der(&der).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let err = RawCertificate::from_der(&[0x30, 0x05]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }
}
