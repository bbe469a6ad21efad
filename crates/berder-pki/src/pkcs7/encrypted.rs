//! PKCS#7 EncryptedData (RFC 2315 §13, RFC 5652 §8).
//!
//! ```text
//! EncryptedData ::= SEQUENCE {
//!   version               INTEGER (0),
//!   encryptedContentInfo  EncryptedContentInfo }
//!
//! EncryptedContentInfo ::= SEQUENCE {
//!   contentType                 OBJECT IDENTIFIER,
//!   contentEncryptionAlgorithm  AlgorithmIdentifier,
//!   encryptedContent            [0] IMPLICIT OCTET STRING OPTIONAL }
//! ```

use berder_asn1::asn1::{decode, EncodingRules, Node, UniversalTag};
use berder_asn1::oid::Oid;
use berder_types::PkiError;

use crate::schema::{field, logged, violation, Fields};
use crate::AlgorithmIdentifier;

/// The encrypted payload and how it was encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedContentInfo {
    content_type: Oid,
    content_encryption_algorithm: AlgorithmIdentifier,
    encrypted_content: Option<Vec<u8>>,
}

impl EncryptedContentInfo {
    pub fn new(
        content_type: Oid,
        content_encryption_algorithm: AlgorithmIdentifier,
        encrypted_content: Option<Vec<u8>>,
    ) -> Self {
        Self {
            content_type,
            content_encryption_algorithm,
            encrypted_content,
        }
    }

    pub fn content_type(&self) -> &Oid {
        &self.content_type
    }

    pub fn content_encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.content_encryption_algorithm
    }

    pub fn encrypted_content(&self) -> Option<&[u8]> {
        self.encrypted_content.as_deref()
    }

    /// Parse under BER rules: `[0]` content may be segmented.
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        Self::parse(node, EncodingRules::Ber)
    }

    /// Under DER rules `[0]` content must be primitive.
    fn parse(node: &Node, rules: EncodingRules) -> Result<Self, PkiError> {
        let mut fields = Fields::new("EncryptedContentInfo", node)?;
        let content_type = field(
            "EncryptedContentInfo.contentType",
            fields.next("contentType")?.as_oid(),
        )?;
        let content_encryption_algorithm =
            AlgorithmIdentifier::from_node(fields.next("contentEncryptionAlgorithm")?)?;
        let encrypted_content = match fields.next_context(0) {
            Some(tagged) => {
                if rules == EncodingRules::Der && tagged.is_constructed() {
                    return Err(violation(
                        "EncryptedContentInfo.encryptedContent: constructed [0] in DER",
                    ));
                }
                let octets = field(
                    "EncryptedContentInfo.encryptedContent",
                    tagged.resolve_implicit(0, UniversalTag::OctetString),
                )?;
                Some(field(
                    "EncryptedContentInfo.encryptedContent",
                    octets.as_octet_string(),
                )?)
            }
            None => None,
        };
        fields.finish()?;
        Ok(Self {
            content_type,
            content_encryption_algorithm,
            encrypted_content,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut children = vec![
            Node::oid(&self.content_type),
            self.content_encryption_algorithm.to_node(),
        ];
        if let Some(content) = &self.encrypted_content {
            children.push(Node::implicit(0, Node::octet_string(content.clone())));
        }
        Node::sequence(children)
    }
}

/// PKCS#7 EncryptedData, version 0.
///
/// Keeps the tree it was parsed from, so re-encoding a BER input with
/// [`EncryptedData::to_ber`] reproduces its indefinite-length form.
/// Equality and hashing follow [`EncryptedData::to_der`].
#[derive(Debug, Clone)]
pub struct EncryptedData {
    info: EncryptedContentInfo,
    node: Node,
}

typed_input!(
    /// Input accepted by [`EncryptedData::from_any`].
    EncryptedDataInput => EncryptedData
);

der_equality!(EncryptedData);

impl EncryptedData {
    /// Build version-0 EncryptedData.
    pub fn new(
        content_type: Oid,
        encryption_algorithm: AlgorithmIdentifier,
        content: Option<Vec<u8>>,
    ) -> Self {
        let info = EncryptedContentInfo::new(content_type, encryption_algorithm, content);
        let node = Node::sequence(vec![Node::integer_u64(0), info.to_node()]);
        Self { info, node }
    }

    /// Parse a tree under BER rules.
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        logged("EncryptedData", Self::parse(node, EncodingRules::Ber))
    }

    fn parse(node: &Node, rules: EncodingRules) -> Result<Self, PkiError> {
        let mut fields = Fields::new("EncryptedData", node)?;
        let version = field("EncryptedData.version", fields.next("version")?.as_i64())?;
        if version != 0 {
            return Err(violation(format!(
                "EncryptedData: unsupported version {version}"
            )));
        }
        let info = EncryptedContentInfo::parse(fields.next("encryptedContentInfo")?, rules)?;
        fields.finish()?;
        Ok(Self {
            info,
            node: node.clone(),
        })
    }

    pub fn from_der(data: &[u8]) -> Result<Self, PkiError> {
        let node = decode(data, EncodingRules::Der)?;
        logged("EncryptedData", Self::parse(&node, EncodingRules::Der))
    }

    pub fn from_ber(data: &[u8]) -> Result<Self, PkiError> {
        let node = decode(data, EncodingRules::Ber)?;
        logged("EncryptedData", Self::parse(&node, EncodingRules::Ber))
    }

    /// Always 0.
    pub fn version(&self) -> u64 {
        0
    }

    pub fn content_type(&self) -> Oid {
        self.info.content_type.clone()
    }

    pub fn encryption_algorithm(&self) -> AlgorithmIdentifier {
        self.info.content_encryption_algorithm.clone()
    }

    /// The encrypted content octets, if present.
    pub fn content(&self) -> Option<Vec<u8>> {
        self.info.encrypted_content.clone()
    }

    pub fn encrypted_content_info(&self) -> &EncryptedContentInfo {
        &self.info
    }

    pub fn to_node(&self) -> Node {
        self.node.clone()
    }

    /// Canonical DER, rebuilt from the typed fields so that BER segmented
    /// content under `[0]` comes out as one primitive OCTET STRING.
    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(Node::sequence(vec![Node::integer_u64(0), self.info.to_node()]).to_der()?)
    }

    /// Re-encode the kept tree, preserving indefinite lengths and segments.
    pub fn to_ber(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.node.to_ber()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berder_asn1::asn1::TagClass;
    use berder_asn1::oid::known;
    use berder_types::ErrorKind;
    use hex_literal::hex;

    fn pbe_alg() -> AlgorithmIdentifier {
        let params = Node::sequence(vec![
            Node::octet_string(vec![1, 2, 3, 4, 5, 6, 7, 8]),
            Node::integer_u64(2048),
        ]);
        AlgorithmIdentifier::new(known::pbe_with_sha1_and_des_cbc(), Some(params))
    }

    fn info_node(content: Option<Node>) -> Node {
        let mut children = vec![Node::oid(&known::pkcs7_data()), pbe_alg().to_node()];
        children.extend(content);
        Node::sequence(children)
    }

    #[test]
    fn test_version_gate() {
        let v1 = Node::sequence(vec![Node::integer_u64(1), info_node(None)]);
        let err = EncryptedData::from_node(&v1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let v0 = Node::sequence(vec![Node::integer_u64(0), info_node(None)]);
        let ed = EncryptedData::from_node(&v0).unwrap();
        assert_eq!(ed.version(), 0);
        assert_eq!(ed.content_type(), known::pkcs7_data());
    }

    #[test]
    fn test_content_absent() {
        let node = Node::sequence(vec![Node::integer_u64(0), info_node(None)]);
        let ed = EncryptedData::from_node(&node).unwrap();
        assert_eq!(ed.content(), None);
        assert_eq!(ed.encryption_algorithm(), pbe_alg());
    }

    #[test]
    fn test_content_present() {
        let tagged = Node::implicit(0, Node::octet_string(hex!("DEADBEEF").to_vec()));
        let node = Node::sequence(vec![Node::integer_u64(0), info_node(Some(tagged))]);
        let ed = EncryptedData::from_node(&node).unwrap();
        assert_eq!(ed.content(), Some(hex!("DEADBEEF").to_vec()));
    }

    #[test]
    fn test_new_roundtrip_through_der() {
        let ed = EncryptedData::new(known::pkcs7_data(), pbe_alg(), Some(vec![0xAB; 40]));
        let der = ed.to_der().unwrap();
        let parsed = EncryptedData::from_der(&der).unwrap();
        assert_eq!(parsed.content(), Some(vec![0xAB; 40]));
        assert_eq!(parsed, ed);

        // The content sits under a primitive [0] tag.
        let node = parsed.to_node();
        let info = &node.children()[1];
        let tagged = &info.children()[2];
        assert!(tagged.is_context(0));
        assert!(!tagged.is_constructed());
    }

    #[test]
    fn test_ber_segmented_content() {
        // Indefinite outer sequences and a constructed [0] with two segments.
        let content = Node::constructed_indefinite(
            TagClass::ContextSpecific,
            0,
            vec![Node::octet_string(vec![1, 2]), Node::octet_string(vec![3])],
        );
        let node = Node::sequence(vec![Node::integer_u64(0), info_node(Some(content))])
            .into_indefinite();
        let ber = node.to_ber().unwrap();
        assert!(EncryptedData::from_der(&ber).is_err());

        let ed = EncryptedData::from_ber(&ber).unwrap();
        assert_eq!(ed.content(), Some(vec![1, 2, 3]));
        assert_eq!(ed.to_ber().unwrap(), ber);

        let der = ed.to_der().unwrap();
        let canonical = EncryptedData::from_der(&der).unwrap();
        let node = canonical.to_node();
        let tagged = &node.children()[1].children()[2];
        assert_eq!(tagged.primitive_bytes(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_der_rejects_constructed_content() {
        // Definite lengths throughout, so only the [0] form breaks DER.
        let content = Node::constructed(
            TagClass::ContextSpecific,
            0,
            vec![Node::octet_string(vec![1, 2, 3])],
        );
        let node = Node::sequence(vec![Node::integer_u64(0), info_node(Some(content))]);
        let encoded = node.to_ber().unwrap();

        let err = EncryptedData::from_der(&encoded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let lenient = EncryptedData::from_ber(&encoded).unwrap();
        assert_eq!(lenient.content(), Some(vec![1, 2, 3]));
        assert_eq!(EncryptedData::from_node(&node).unwrap(), lenient);

        let der = lenient.to_der().unwrap();
        let strict = EncryptedData::from_der(&der).unwrap();
        assert_eq!(strict.to_der().unwrap(), der);
    }

    #[test]
    fn test_equality_follows_der() {
        let built = EncryptedData::new(known::pkcs7_data(), pbe_alg(), Some(vec![1, 2, 3]));
        let content = Node::constructed_indefinite(
            TagClass::ContextSpecific,
            0,
            vec![Node::octet_string(vec![1]), Node::octet_string(vec![2, 3])],
        );
        let ber = Node::sequence(vec![Node::integer_u64(0), info_node(Some(content))])
            .into_indefinite()
            .to_ber()
            .unwrap();
        let parsed = EncryptedData::from_ber(&ber).unwrap();
        assert_ne!(parsed.to_node(), built.to_node());
        assert_eq!(parsed, built);

        let set: std::collections::HashSet<_> = [parsed, built].into_iter().collect();
        assert_eq!(set.len(), 1);

        let other = EncryptedData::new(known::pkcs7_data(), pbe_alg(), Some(vec![1, 2, 4]));
        assert!(!set.contains(&other));
    }

    #[test]
    fn test_schema_violations() {
        let short = Node::sequence(vec![Node::integer_u64(0)]);
        assert!(EncryptedData::from_node(&short).is_err());

        let extra = Node::sequence(vec![Node::integer_u64(0), info_node(None), Node::null()]);
        assert!(EncryptedData::from_node(&extra).is_err());

        let wrong_version_type = Node::sequence(vec![Node::boolean(false), info_node(None)]);
        let err = EncryptedData::from_node(&wrong_version_type).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let wrong_tag = info_node(Some(Node::implicit(1, Node::octet_string(vec![1]))));
        let node = Node::sequence(vec![Node::integer_u64(0), wrong_tag]);
        assert!(EncryptedData::from_node(&node).is_err());
    }

    #[test]
    fn test_from_any() {
        let ed = EncryptedData::new(known::pkcs7_data(), pbe_alg(), None);
        assert_eq!(EncryptedData::from_any(&ed).unwrap(), ed);
        let tree = ed.to_node();
        assert_eq!(EncryptedData::from_any(&tree).unwrap(), ed);
        assert!(EncryptedData::from_any(&Node::null()).is_err());
    }
}
