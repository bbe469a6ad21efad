//! OCSP responses (RFC 2560 / RFC 6960), parsing and building only.
//!
//! ```text
//! OCSPResponse ::= SEQUENCE {
//!   responseStatus  OCSPResponseStatus,
//!   responseBytes   [0] EXPLICIT ResponseBytes OPTIONAL }
//!
//! ResponseBytes ::= SEQUENCE {
//!   responseType  OBJECT IDENTIFIER,
//!   response      OCTET STRING }
//! ```

mod basic;
mod extensions;

pub use basic::{
    BasicOcspResponse, BasicOcspResponseInput, CertId, CertStatus, ResponderId, ResponseData,
    RevocationReason, RevokedInfo, SingleResponse,
};
pub use extensions::{Extension, Extensions};

use std::collections::BTreeSet;

use berder_asn1::asn1::{decode, EncodingRules, Node, UniversalTag};
use berder_asn1::oid::{known, Oid};
use berder_types::PkiError;

use crate::cert::CertificateDecoder;
use crate::schema::{field, logged, violation, Fields};
use crate::signature::SignatureProvider;
use crate::AlgorithmIdentifier;

/// OCSPResponseStatus. Code 4 is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcspResponseStatus {
    Successful,
    MalformedRequest,
    InternalError,
    TryLater,
    SigRequired,
    Unauthorized,
}

impl OcspResponseStatus {
    pub fn code(self) -> u64 {
        match self {
            OcspResponseStatus::Successful => 0,
            OcspResponseStatus::MalformedRequest => 1,
            OcspResponseStatus::InternalError => 2,
            OcspResponseStatus::TryLater => 3,
            OcspResponseStatus::SigRequired => 5,
            OcspResponseStatus::Unauthorized => 6,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(OcspResponseStatus::Successful),
            1 => Some(OcspResponseStatus::MalformedRequest),
            2 => Some(OcspResponseStatus::InternalError),
            3 => Some(OcspResponseStatus::TryLater),
            5 => Some(OcspResponseStatus::SigRequired),
            6 => Some(OcspResponseStatus::Unauthorized),
            _ => None,
        }
    }
}

/// The outer OCSP response envelope.
///
/// A successful response carries an id-pkix-ocsp-basic body; any other
/// status carries none.
#[derive(Debug, Clone)]
pub struct OcspResponse {
    status: OcspResponseStatus,
    basic: Option<BasicOcspResponse>,
    /// Encoded BasicOCSPResponse, as carried in `response`.
    response_bytes: Option<Vec<u8>>,
}

impl OcspResponse {
    /// A successful response wrapping `basic`.
    pub fn successful(basic: BasicOcspResponse) -> Result<Self, PkiError> {
        let response_bytes = basic.to_der()?;
        Ok(Self {
            status: OcspResponseStatus::Successful,
            basic: Some(basic),
            response_bytes: Some(response_bytes),
        })
    }

    /// An error response without a body.
    pub fn with_status(status: OcspResponseStatus) -> Result<Self, PkiError> {
        if status == OcspResponseStatus::Successful {
            return Err(PkiError::ConstraintViolation(
                "a successful response needs a body; use OcspResponse::successful".into(),
            ));
        }
        Ok(Self {
            status,
            basic: None,
            response_bytes: None,
        })
    }

    pub fn from_der(data: &[u8]) -> Result<Self, PkiError> {
        let node = decode(data, EncodingRules::Der)?;
        logged("OCSPResponse", Self::parse(&node, EncodingRules::Der))
    }

    /// Parse BER; the embedded BasicOCSPResponse is decoded as BER too.
    pub fn from_ber(data: &[u8]) -> Result<Self, PkiError> {
        let node = decode(data, EncodingRules::Ber)?;
        logged("OCSPResponse", Self::parse(&node, EncodingRules::Ber))
    }

    /// Parse a tree whose embedded BasicOCSPResponse is DER.
    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        logged("OCSPResponse", Self::parse(node, EncodingRules::Der))
    }

    fn parse(node: &Node, rules: EncodingRules) -> Result<Self, PkiError> {
        let mut fields = Fields::new("OCSPResponse", node)?;
        let code = field(
            "OCSPResponse.responseStatus",
            fields.next("responseStatus")?.as_enumerated(),
        )?;
        let status = OcspResponseStatus::from_code(code)
            .ok_or_else(|| violation(format!("OCSPResponse: unknown status {code}")))?;
        let bytes_node = fields.next_context(0);
        fields.finish()?;

        let Some(tagged) = bytes_node else {
            if status == OcspResponseStatus::Successful {
                return Err(violation("OCSPResponse: successful status without responseBytes"));
            }
            return Ok(Self {
                status,
                basic: None,
                response_bytes: None,
            });
        };
        if status != OcspResponseStatus::Successful {
            return Err(violation(format!(
                "OCSPResponse: responseBytes with status {status:?}"
            )));
        }
        let inner = field(
            "OCSPResponse.responseBytes",
            tagged.resolve_explicit(0, UniversalTag::Sequence),
        )?;
        let mut bytes_fields = Fields::new("ResponseBytes", inner)?;
        let response_type = field(
            "ResponseBytes.responseType",
            bytes_fields.next("responseType")?.as_oid(),
        )?;
        if response_type != known::ocsp_basic() {
            return Err(violation(format!(
                "ResponseBytes: unsupported response type {response_type}"
            )));
        }
        let response_bytes = field(
            "ResponseBytes.response",
            bytes_fields.next("response")?.as_octet_string(),
        )?;
        bytes_fields.finish()?;
        let basic = BasicOcspResponse::from_node(&decode(&response_bytes, rules)?)?;
        Ok(Self {
            status,
            basic: Some(basic),
            response_bytes: Some(response_bytes),
        })
    }

    pub fn status(&self) -> OcspResponseStatus {
        self.status
    }

    pub fn basic(&self) -> Option<BasicOcspResp> {
        self.basic.clone().map(BasicOcspResp::from)
    }

    pub fn to_node(&self) -> Node {
        let mut children = vec![Node::enumerated(self.status.code())];
        if let Some(bytes) = &self.response_bytes {
            children.push(Node::explicit(
                0,
                Node::sequence(vec![
                    Node::oid(&known::ocsp_basic()),
                    Node::octet_string(bytes.clone()),
                ]),
            ));
        }
        Node::sequence(children)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.to_node().to_der()?)
    }
}

/// Read-only view of a [`BasicOcspResponse`] with flattened accessors.
///
/// Equality and hashing follow the DER encoding of the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicOcspResp {
    response: BasicOcspResponse,
}

der_equality!(OcspResponse);

impl From<BasicOcspResponse> for BasicOcspResp {
    fn from(response: BasicOcspResponse) -> Self {
        Self { response }
    }
}

impl BasicOcspResp {
    pub fn from_der(data: &[u8]) -> Result<Self, PkiError> {
        BasicOcspResponse::from_der(data).map(Self::from)
    }

    pub fn from_ber(data: &[u8]) -> Result<Self, PkiError> {
        BasicOcspResponse::from_ber(data).map(Self::from)
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        BasicOcspResponse::from_node(node).map(Self::from)
    }

    pub fn basic(&self) -> &BasicOcspResponse {
        &self.response
    }

    fn data(&self) -> &ResponseData {
        self.response.tbs_response_data()
    }

    /// DER of `tbsResponseData`, the signed bytes.
    pub fn tbs_response_data(&self) -> Result<Vec<u8>, PkiError> {
        self.data().to_der()
    }

    /// Version number as displayed: 1 for v1.
    pub fn version(&self) -> u64 {
        self.data().version() + 1
    }

    pub fn responder_id(&self) -> ResponderId {
        self.data().responder_id().clone()
    }

    pub fn produced_at(&self) -> i64 {
        self.data().produced_at()
    }

    pub fn produced_at_raw(&self) -> String {
        self.data().produced_at_raw().to_string()
    }

    pub fn responses(&self) -> Vec<SingleResponse> {
        self.data().responses().to_vec()
    }

    pub fn response_extensions(&self) -> Option<Extensions> {
        self.data().response_extensions().cloned()
    }

    /// Any critical response extension counts as unsupported: none are
    /// processed here.
    pub fn has_unsupported_critical_extension(&self) -> bool {
        self.data()
            .response_extensions()
            .is_some_and(|exts| exts.iter().any(Extension::critical))
    }

    pub fn critical_extension_oids(&self) -> BTreeSet<String> {
        self.data()
            .response_extensions()
            .map(Extensions::critical_oids)
            .unwrap_or_default()
    }

    pub fn non_critical_extension_oids(&self) -> BTreeSet<String> {
        self.data()
            .response_extensions()
            .map(Extensions::non_critical_oids)
            .unwrap_or_default()
    }

    /// DER of the `extnValue` OCTET STRING of extension `oid`.
    pub fn extension_value(&self, oid: &Oid) -> Option<Vec<u8>> {
        let ext = self.data().response_extensions()?.get(oid)?;
        Node::octet_string(ext.value().to_vec()).to_der().ok()
    }

    pub fn signature_algorithm(&self) -> AlgorithmIdentifier {
        self.response.signature_algorithm().clone()
    }

    /// Dotted form of the signature algorithm OID.
    pub fn signature_alg_oid(&self) -> String {
        self.response.signature_algorithm().algorithm().to_string()
    }

    pub fn signature(&self) -> Vec<u8> {
        self.response.signature().to_vec()
    }

    /// DER of each certificate carried in `certs`.
    pub fn certs_der(&self) -> Result<Vec<Vec<u8>>, PkiError> {
        self.response
            .certs()
            .iter()
            .map(|c| c.to_der().map_err(PkiError::from))
            .collect()
    }

    /// Decode each carried certificate with `decoder`.
    pub fn certs<D: CertificateDecoder>(&self, decoder: &D) -> Result<Vec<D::Certificate>, PkiError> {
        self.certs_der()?
            .iter()
            .map(|der| decoder.decode(der))
            .collect()
    }

    pub fn verify(
        &self,
        public_key: &[u8],
        provider: &dyn SignatureProvider,
    ) -> Result<bool, PkiError> {
        self.response.verify(public_key, provider)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        self.response.to_der()
    }
}
