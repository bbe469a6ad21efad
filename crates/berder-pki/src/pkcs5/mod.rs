//! PKCS#5 v1.5 password-based encryption parameters.
//!
//! ```text
//! PBEParameter ::= SEQUENCE {
//!   salt            OCTET STRING (SIZE(8)),
//!   iterationCount  INTEGER }
//! ```
//!
//! The 8-byte salt rule is enforced by [`PbeParameter::new`] only. Parsing
//! an existing SEQUENCE accepts any salt length so that parameters written
//! by lenient producers can still be read.

mod pbkdf1;

pub use pbkdf1::pbkdf1;

use berder_asn1::asn1::{decode_ber, decode_der, Node};
use berder_types::PkiError;
use zeroize::Zeroizing;

use crate::hash::{lookup, DigestProvider};
use crate::schema::{field, logged, violation, Fields};

/// Salt length required of freshly built parameters.
pub const SALT_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct PbeParameter {
    salt: Vec<u8>,
    /// A non-negative universal INTEGER.
    iteration_count: Node,
}

typed_input!(
    /// Input accepted by [`PbeParameter::from_any`].
    PbeParameterInput => PbeParameter
);

der_equality!(PbeParameter);

impl PbeParameter {
    /// Build parameters from an 8-byte salt.
    pub fn new(salt: &[u8], iteration_count: u64) -> Result<Self, PkiError> {
        if salt.len() != SALT_LEN {
            return Err(PkiError::ConstraintViolation(format!(
                "salt length must be {SALT_LEN}, got {}",
                salt.len()
            )));
        }
        Ok(Self {
            salt: salt.to_vec(),
            iteration_count: Node::integer_u64(iteration_count),
        })
    }

    /// Build parameters with a random salt.
    pub fn generate(iteration_count: u64) -> Result<Self, PkiError> {
        let mut salt = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt).map_err(|e| PkiError::Engine(format!("getrandom: {e}")))?;
        Self::new(&salt, iteration_count)
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        logged("PBEParameter", Self::parse(node))
    }

    fn parse(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("PBEParameter", node)?;
        let salt = field("PBEParameter.salt", fields.next("salt")?.as_octet_string())?;
        let count = fields.next("iterationCount")?;
        let bytes = field("PBEParameter.iterationCount", count.as_integer_bytes())?;
        fields.finish()?;
        if bytes[0] & 0x80 != 0 {
            return Err(violation("PBEParameter: negative iteration count"));
        }
        Ok(Self {
            salt,
            iteration_count: count.clone(),
        })
    }

    pub fn from_der(data: &[u8]) -> Result<Self, PkiError> {
        Self::from_node(&decode_der(data)?)
    }

    pub fn from_ber(data: &[u8]) -> Result<Self, PkiError> {
        Self::from_node(&decode_ber(data)?)
    }

    pub fn salt(&self) -> Vec<u8> {
        self.salt.clone()
    }

    /// The iteration count, saturating at `u64::MAX` for larger values.
    /// Key derivation does not use this; see [`Self::derive_key_pbkdf1`].
    pub fn iteration_count(&self) -> u64 {
        self.iteration_count.as_u64().unwrap_or(u64::MAX)
    }

    /// The iteration count as two's complement INTEGER content.
    pub fn iteration_count_bytes(&self) -> Vec<u8> {
        self.iteration_count
            .primitive_bytes()
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }

    pub fn to_node(&self) -> Node {
        Node::sequence(vec![
            Node::octet_string(self.salt.clone()),
            self.iteration_count.clone(),
        ])
    }

    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        Ok(self.to_node().to_der()?)
    }

    /// Derive a `key_len`-byte key with PBKDF1 over the digest registered
    /// as `digest_name`. Counts above `u32::MAX` are rejected.
    pub fn derive_key_pbkdf1(
        &self,
        password: &[u8],
        digest_name: &str,
        provider: &dyn DigestProvider,
        key_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, PkiError> {
        let iterations = self
            .iteration_count
            .as_u64()
            .ok()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                PkiError::ConstraintViolation(format!("iteration count exceeds {}", u32::MAX))
            })?;
        let digest = lookup(provider, digest_name)?;
        pbkdf1(digest, password, &self.salt, u64::from(iterations), key_len)
    }
}
