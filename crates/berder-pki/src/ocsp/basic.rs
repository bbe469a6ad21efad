//! BasicOCSPResponse and its components (RFC 6960 §4.2.1).
//!
//! ```text
//! BasicOCSPResponse ::= SEQUENCE {
//!   tbsResponseData     ResponseData,
//!   signatureAlgorithm  AlgorithmIdentifier,
//!   signature           BIT STRING,
//!   certs           [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
//!
//! ResponseData ::= SEQUENCE {
//!   version         [0] EXPLICIT Version DEFAULT v1,
//!   responderID         ResponderID,
//!   producedAt          GeneralizedTime,
//!   responses           SEQUENCE OF SingleResponse,
//!   responseExtensions [1] EXPLICIT Extensions OPTIONAL }
//! ```

use berder_asn1::asn1::{decode_ber, decode_der, format_generalized_time, Node, UniversalTag};
use berder_types::{HashAlgId, PkiError};

use super::extensions::Extensions;
use crate::algorithm::hash_alg_to_oid;
use crate::hash::{compute_hash, DigestProvider};
use crate::schema::{field, generalized_time, logged, violation, Fields};
use crate::signature::{verify_signed, SignatureProvider, Signer};
use crate::AlgorithmIdentifier;

/// Identifies the certificate a [`SingleResponse`] is about.
///
/// ```text
/// CertID ::= SEQUENCE {
///   hashAlgorithm   AlgorithmIdentifier,
///   issuerNameHash  OCTET STRING,
///   issuerKeyHash   OCTET STRING,
///   serialNumber    CertificateSerialNumber }
/// ```
#[derive(Debug, Clone)]
pub struct CertId {
    hash_algorithm: AlgorithmIdentifier,
    issuer_name_hash: Vec<u8>,
    issuer_key_hash: Vec<u8>,
    serial_number: Node,
}

impl CertId {
    /// `serial_number` is the big-endian unsigned serial.
    pub fn new(
        hash_algorithm: AlgorithmIdentifier,
        issuer_name_hash: Vec<u8>,
        issuer_key_hash: Vec<u8>,
        serial_number: &[u8],
    ) -> Self {
        Self {
            hash_algorithm,
            issuer_name_hash,
            issuer_key_hash,
            serial_number: Node::integer_unsigned(serial_number),
        }
    }

    /// Hash the issuer's DER Name and subjectPublicKey bits with `alg`.
    pub fn for_issuer(
        alg: HashAlgId,
        issuer_name_der: &[u8],
        issuer_key: &[u8],
        serial_number: &[u8],
        provider: &dyn DigestProvider,
    ) -> Result<Self, PkiError> {
        let oid = hash_alg_to_oid(alg).ok_or_else(|| {
            PkiError::UnsupportedAlgorithm(format!("no OID registered for {}", alg.name()))
        })?;
        Ok(Self::new(
            AlgorithmIdentifier::with_null_params(oid),
            compute_hash(provider, alg, issuer_name_der)?,
            compute_hash(provider, alg, issuer_key)?,
            serial_number,
        ))
    }

    /// Whether this CertID names the certificate `serial_number` issued by
    /// the given issuer, hashing with this CertID's own algorithm.
    pub fn matches(
        &self,
        issuer_name_der: &[u8],
        issuer_key: &[u8],
        serial_number: &[u8],
        provider: &dyn DigestProvider,
    ) -> Result<bool, PkiError> {
        let alg = self.hash_algorithm.hash_alg().ok_or_else(|| {
            PkiError::UnsupportedAlgorithm(format!(
                "CertID hash {}",
                self.hash_algorithm.algorithm()
            ))
        })?;
        let serial = Node::integer_unsigned(serial_number);
        Ok(serial.to_der()? == self.serial_number.to_der()?
            && compute_hash(provider, alg, issuer_name_der)? == self.issuer_name_hash
            && compute_hash(provider, alg, issuer_key)? == self.issuer_key_hash)
    }

    pub fn hash_algorithm(&self) -> &AlgorithmIdentifier {
        &self.hash_algorithm
    }

    pub fn issuer_name_hash(&self) -> &[u8] {
        &self.issuer_name_hash
    }

    pub fn issuer_key_hash(&self) -> &[u8] {
        &self.issuer_key_hash
    }

    /// Two's complement INTEGER content of the serial number.
    pub fn serial_number(&self) -> &[u8] {
        self.serial_number.primitive_bytes().unwrap_or_default()
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("CertID", node)?;
        let hash_algorithm = AlgorithmIdentifier::from_node(fields.next("hashAlgorithm")?)?;
        let issuer_name_hash = field(
            "CertID.issuerNameHash",
            fields.next("issuerNameHash")?.as_octet_string(),
        )?;
        let issuer_key_hash = field(
            "CertID.issuerKeyHash",
            fields.next("issuerKeyHash")?.as_octet_string(),
        )?;
        let serial = fields.next("serialNumber")?;
        field("CertID.serialNumber", serial.as_integer_bytes())?;
        fields.finish()?;
        Ok(Self {
            hash_algorithm,
            issuer_name_hash,
            issuer_key_hash,
            serial_number: serial.clone(),
        })
    }

    pub fn to_node(&self) -> Node {
        Node::sequence(vec![
            self.hash_algorithm.to_node(),
            Node::octet_string(self.issuer_name_hash.clone()),
            Node::octet_string(self.issuer_key_hash.clone()),
            self.serial_number.clone(),
        ])
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.to_node().to_der()?)
    }
}

/// CRLReason codes (RFC 5280 §5.3.1). Code 7 is unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl RevocationReason {
    pub fn code(self) -> u64 {
        match self {
            RevocationReason::Unspecified => 0,
            RevocationReason::KeyCompromise => 1,
            RevocationReason::CaCompromise => 2,
            RevocationReason::AffiliationChanged => 3,
            RevocationReason::Superseded => 4,
            RevocationReason::CessationOfOperation => 5,
            RevocationReason::CertificateHold => 6,
            RevocationReason::RemoveFromCrl => 8,
            RevocationReason::PrivilegeWithdrawn => 9,
            RevocationReason::AaCompromise => 10,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => RevocationReason::Unspecified,
            1 => RevocationReason::KeyCompromise,
            2 => RevocationReason::CaCompromise,
            3 => RevocationReason::AffiliationChanged,
            4 => RevocationReason::Superseded,
            5 => RevocationReason::CessationOfOperation,
            6 => RevocationReason::CertificateHold,
            8 => RevocationReason::RemoveFromCrl,
            9 => RevocationReason::PrivilegeWithdrawn,
            10 => RevocationReason::AaCompromise,
            _ => return None,
        })
    }
}

/// ```text
/// RevokedInfo ::= SEQUENCE {
///   revocationTime      GeneralizedTime,
///   revocationReason [0] EXPLICIT CRLReason OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevokedInfo {
    pub revocation_time: i64,
    pub reason: Option<RevocationReason>,
}

impl RevokedInfo {
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("RevokedInfo", node)?;
        let revocation_time =
            generalized_time("RevokedInfo.revocationTime", fields.next("revocationTime")?)?;
        let reason = match fields.next_context(0) {
            Some(tagged) => {
                let code = field(
                    "RevokedInfo.revocationReason",
                    tagged
                        .resolve_explicit(0, UniversalTag::Enumerated)
                        .and_then(Node::as_enumerated),
                )?;
                let reason = RevocationReason::from_code(code).ok_or_else(|| {
                    violation(format!("RevokedInfo: unknown revocation reason {code}"))
                })?;
                Some(reason)
            }
            None => None,
        };
        fields.finish()?;
        Ok(Self {
            revocation_time,
            reason,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut children = vec![Node::generalized_time(self.revocation_time)];
        if let Some(reason) = self.reason {
            children.push(Node::explicit(0, Node::enumerated(reason.code())));
        }
        Node::sequence(children)
    }
}

/// ```text
/// CertStatus ::= CHOICE {
///   good     [0] IMPLICIT NULL,
///   revoked  [1] IMPLICIT RevokedInfo,
///   unknown  [2] IMPLICIT UnknownInfo }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertStatus {
    Good,
    Revoked(RevokedInfo),
    Unknown,
}

impl CertStatus {
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let null = |number| {
            field(
                "CertStatus",
                node.resolve_implicit(number, UniversalTag::Null)
                    .and_then(|n| n.as_null()),
            )
        };
        match node.context_number() {
            Some(0) => null(0).map(|()| CertStatus::Good),
            Some(1) => {
                let info = field(
                    "CertStatus.revoked",
                    node.resolve_implicit(1, UniversalTag::Sequence),
                )?;
                Ok(CertStatus::Revoked(RevokedInfo::from_node(&info)?))
            }
            Some(2) => null(2).map(|()| CertStatus::Unknown),
            _ => Err(violation(format!(
                "CertStatus: unexpected tag {}",
                node.tag()
            ))),
        }
    }

    pub fn to_node(&self) -> Node {
        match self {
            CertStatus::Good => Node::implicit(0, Node::null()),
            CertStatus::Revoked(info) => Node::implicit(1, info.to_node()),
            CertStatus::Unknown => Node::implicit(2, Node::null()),
        }
    }
}

/// ```text
/// SingleResponse ::= SEQUENCE {
///   certID                CertID,
///   certStatus            CertStatus,
///   thisUpdate            GeneralizedTime,
///   nextUpdate        [0] EXPLICIT GeneralizedTime OPTIONAL,
///   singleExtensions  [1] EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SingleResponse {
    cert_id: CertId,
    cert_status: CertStatus,
    this_update: i64,
    next_update: Option<i64>,
    single_extensions: Option<Extensions>,
}

impl SingleResponse {
    pub fn new(cert_id: CertId, cert_status: CertStatus, this_update: i64) -> Self {
        Self {
            cert_id,
            cert_status,
            this_update,
            next_update: None,
            single_extensions: None,
        }
    }

    pub fn with_next_update(mut self, next_update: i64) -> Self {
        self.next_update = Some(next_update);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.single_extensions = Some(extensions);
        self
    }

    pub fn cert_id(&self) -> &CertId {
        &self.cert_id
    }

    pub fn cert_status(&self) -> &CertStatus {
        &self.cert_status
    }

    pub fn this_update(&self) -> i64 {
        self.this_update
    }

    pub fn next_update(&self) -> Option<i64> {
        self.next_update
    }

    pub fn single_extensions(&self) -> Option<&Extensions> {
        self.single_extensions.as_ref()
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("SingleResponse", node)?;
        let cert_id = CertId::from_node(fields.next("certID")?)?;
        let cert_status = CertStatus::from_node(fields.next("certStatus")?)?;
        let this_update =
            generalized_time("SingleResponse.thisUpdate", fields.next("thisUpdate")?)?;
        let next_update = match fields.next_context(0) {
            Some(tagged) => Some(generalized_time(
                "SingleResponse.nextUpdate",
                field("SingleResponse.nextUpdate", tagged.resolve_explicit_any(0))?,
            )?),
            None => None,
        };
        let single_extensions = match fields.next_context(1) {
            Some(tagged) => Some(Extensions::from_node(field(
                "SingleResponse.singleExtensions",
                tagged.resolve_explicit(1, UniversalTag::Sequence),
            )?)?),
            None => None,
        };
        fields.finish()?;
        Ok(Self {
            cert_id,
            cert_status,
            this_update,
            next_update,
            single_extensions,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut children = vec![
            self.cert_id.to_node(),
            self.cert_status.to_node(),
            Node::generalized_time(self.this_update),
        ];
        if let Some(next) = self.next_update {
            children.push(Node::explicit(0, Node::generalized_time(next)));
        }
        if let Some(exts) = &self.single_extensions {
            children.push(Node::explicit(1, exts.to_node()));
        }
        Node::sequence(children)
    }
}

/// ```text
/// ResponderID ::= CHOICE {
///   byName  [1] Name,
///   byKey   [2] KeyHash }
/// ```
///
/// The Name is kept as its value tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponderId {
    ByName(Node),
    ByKey(Vec<u8>),
}

impl ResponderId {
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        match node.context_number() {
            Some(1) => {
                let name = field(
                    "ResponderID.byName",
                    node.resolve_explicit(1, UniversalTag::Sequence),
                )?;
                Ok(ResponderId::ByName(name.clone()))
            }
            Some(2) => {
                let key = field(
                    "ResponderID.byKey",
                    node.resolve_explicit(2, UniversalTag::OctetString)
                        .and_then(Node::as_octet_string),
                )?;
                Ok(ResponderId::ByKey(key))
            }
            _ => Err(violation(format!(
                "ResponderID: unexpected tag {}",
                node.tag()
            ))),
        }
    }

    pub fn to_node(&self) -> Node {
        match self {
            ResponderId::ByName(name) => Node::explicit(1, name.clone()),
            ResponderId::ByKey(key) => Node::explicit(2, Node::octet_string(key.clone())),
        }
    }
}

/// The signed part of a [`BasicOcspResponse`].
///
/// Keeps the tree it was parsed from: signatures are checked over its DER
/// re-encoding, not over a tree rebuilt from the typed fields.
#[derive(Debug, Clone)]
pub struct ResponseData {
    /// As encoded; 0 stands for v1.
    version: u64,
    responder_id: ResponderId,
    produced_at: i64,
    produced_at_raw: String,
    responses: Vec<SingleResponse>,
    response_extensions: Option<Extensions>,
    node: Node,
}

impl ResponseData {
    /// Build v1 response data. The version field is left at its default.
    pub fn new(
        responder_id: ResponderId,
        produced_at: i64,
        responses: Vec<SingleResponse>,
        response_extensions: Option<Extensions>,
    ) -> Self {
        let mut children = vec![responder_id.to_node(), Node::generalized_time(produced_at)];
        children.push(Node::sequence(
            responses.iter().map(SingleResponse::to_node).collect(),
        ));
        if let Some(exts) = &response_extensions {
            children.push(Node::explicit(1, exts.to_node()));
        }
        Self {
            version: 0,
            responder_id,
            produced_at,
            produced_at_raw: format_generalized_time(produced_at),
            responses,
            response_extensions,
            node: Node::sequence(children),
        }
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("ResponseData", node)?;
        let version = match fields.next_context(0) {
            Some(tagged) => field(
                "ResponseData.version",
                tagged
                    .resolve_explicit(0, UniversalTag::Integer)
                    .and_then(Node::as_u64),
            )?,
            None => 0,
        };
        if version != 0 {
            return Err(violation(format!(
                "ResponseData: unsupported version {version}"
            )));
        }
        let responder_id = ResponderId::from_node(fields.next("responderID")?)?;
        let produced = fields.next("producedAt")?;
        let produced_at = generalized_time("ResponseData.producedAt", produced)?;
        let produced_at_raw = field("ResponseData.producedAt", produced.as_time_string())?;
        let responses = field(
            "ResponseData.responses",
            fields.next("responses")?.as_sequence(),
        )?
        .iter()
        .map(SingleResponse::from_node)
        .collect::<Result<Vec<_>, _>>()?;
        let response_extensions = match fields.next_context(1) {
            Some(tagged) => Some(Extensions::from_node(field(
                "ResponseData.responseExtensions",
                tagged.resolve_explicit(1, UniversalTag::Sequence),
            )?)?),
            None => None,
        };
        fields.finish()?;
        Ok(Self {
            version,
            responder_id,
            produced_at,
            produced_at_raw,
            responses,
            response_extensions,
            node: node.clone(),
        })
    }

    /// The encoded version number: 0 for v1.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn responder_id(&self) -> &ResponderId {
        &self.responder_id
    }

    pub fn produced_at(&self) -> i64 {
        self.produced_at
    }

    /// The GeneralizedTime text as encoded.
    pub fn produced_at_raw(&self) -> &str {
        &self.produced_at_raw
    }

    pub fn responses(&self) -> &[SingleResponse] {
        &self.responses
    }

    pub fn response_extensions(&self) -> Option<&Extensions> {
        self.response_extensions.as_ref()
    }

    pub fn to_node(&self) -> Node {
        self.node.clone()
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.node.to_der()?)
    }
}

/// A signed OCSP response body.
#[derive(Debug, Clone)]
pub struct BasicOcspResponse {
    tbs_response_data: ResponseData,
    signature_algorithm: AlgorithmIdentifier,
    signature: Vec<u8>,
    certs: Vec<Node>,
    node: Node,
}

typed_input!(
    /// Input accepted by [`BasicOcspResponse::from_any`].
    BasicOcspResponseInput => BasicOcspResponse
);

der_equality!(CertId, ResponseData, BasicOcspResponse);

impl BasicOcspResponse {
    /// Assemble a response around an existing signature. Each entry of
    /// `certs` must be a certificate SEQUENCE.
    pub fn new(
        tbs_response_data: ResponseData,
        signature_algorithm: AlgorithmIdentifier,
        signature: Vec<u8>,
        certs: Vec<Node>,
    ) -> Result<Self, PkiError> {
        if let Some(bad) = certs.iter().find(|c| !c.is_universal(UniversalTag::Sequence)) {
            return Err(PkiError::ConstraintViolation(format!(
                "certificate must be a SEQUENCE, found {}",
                bad.tag()
            )));
        }
        let mut children = vec![
            tbs_response_data.to_node(),
            signature_algorithm.to_node(),
            Node::bit_string(0, &signature),
        ];
        if !certs.is_empty() {
            children.push(Node::explicit(0, Node::sequence(certs.clone())));
        }
        Ok(Self {
            tbs_response_data,
            signature_algorithm,
            signature,
            certs,
            node: Node::sequence(children),
        })
    }

    /// Sign the DER of `tbs_response_data` with `signer`.
    pub fn sign(
        tbs_response_data: ResponseData,
        signature_algorithm: AlgorithmIdentifier,
        signer: &dyn Signer,
        certs: Vec<Node>,
    ) -> Result<Self, PkiError> {
        let signature = signer.sign(&tbs_response_data.to_der()?)?;
        Self::new(tbs_response_data, signature_algorithm, signature, certs)
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        logged("BasicOCSPResponse", Self::parse(node))
    }

    fn parse(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("BasicOCSPResponse", node)?;
        let tbs_response_data = ResponseData::from_node(fields.next("tbsResponseData")?)?;
        let signature_algorithm =
            AlgorithmIdentifier::from_node(fields.next("signatureAlgorithm")?)?;
        let bits = field(
            "BasicOCSPResponse.signature",
            fields.next("signature")?.as_bit_string(),
        )?;
        if bits.unused_bits != 0 {
            return Err(violation(format!(
                "BasicOCSPResponse.signature: {} unused bits",
                bits.unused_bits
            )));
        }
        let certs = match fields.next_context(0) {
            Some(tagged) => {
                let list = field(
                    "BasicOCSPResponse.certs",
                    tagged
                        .resolve_explicit(0, UniversalTag::Sequence)
                        .and_then(Node::as_sequence),
                )?;
                if let Some(bad) = list.iter().find(|c| !c.is_universal(UniversalTag::Sequence)) {
                    return Err(violation(format!(
                        "BasicOCSPResponse.certs: expected SEQUENCE, found {}",
                        bad.tag()
                    )));
                }
                list.to_vec()
            }
            None => Vec::new(),
        };
        fields.finish()?;
        Ok(Self {
            tbs_response_data,
            signature_algorithm,
            signature: bits.data,
            certs,
            node: node.clone(),
        })
    }

    pub fn from_der(data: &[u8]) -> Result<Self, PkiError> {
        Self::from_node(&decode_der(data)?)
    }

    pub fn from_ber(data: &[u8]) -> Result<Self, PkiError> {
        Self::from_node(&decode_ber(data)?)
    }

    pub fn tbs_response_data(&self) -> &ResponseData {
        &self.tbs_response_data
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn certs(&self) -> &[Node] {
        &self.certs
    }

    /// The response for the certificate identified by `cert_id`.
    pub fn find_response(&self, cert_id: &CertId) -> Option<&SingleResponse> {
        self.tbs_response_data
            .responses()
            .iter()
            .find(|r| r.cert_id() == cert_id)
    }

    /// Check the signature over the DER of the response data.
    pub fn verify(
        &self,
        public_key: &[u8],
        provider: &dyn SignatureProvider,
    ) -> Result<bool, PkiError> {
        verify_signed(
            self.tbs_response_data.node(),
            &self.signature_algorithm,
            &self.signature,
            public_key,
            provider,
        )
    }

    pub fn to_node(&self) -> Node {
        self.node.clone()
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.node.to_der()?)
    }
}
