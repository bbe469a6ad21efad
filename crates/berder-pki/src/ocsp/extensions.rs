//! X.509 extensions as carried in OCSP responses.
//!
//! ```text
//! Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension
//! Extension  ::= SEQUENCE {
//!   extnID     OBJECT IDENTIFIER,
//!   critical   BOOLEAN DEFAULT FALSE,
//!   extnValue  OCTET STRING }
//! ```

use std::collections::BTreeSet;

use berder_asn1::asn1::{Node, UniversalTag};
use berder_asn1::oid::Oid;
use berder_types::PkiError;

use crate::schema::{field, violation, Fields};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    id: Oid,
    critical: bool,
    value: Vec<u8>,
}

impl Extension {
    pub fn new(id: Oid, critical: bool, value: Vec<u8>) -> Self {
        Self {
            id,
            critical,
            value,
        }
    }

    pub fn id(&self) -> &Oid {
        &self.id
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    /// The contents of `extnValue`.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let mut fields = Fields::new("Extension", node)?;
        let id = field("Extension.extnID", fields.next("extnID")?.as_oid())?;
        let critical = match fields.next_universal(UniversalTag::Boolean) {
            Some(flag) => field("Extension.critical", flag.as_boolean())?,
            None => false,
        };
        let value = field(
            "Extension.extnValue",
            fields.next("extnValue")?.as_octet_string(),
        )?;
        fields.finish()?;
        Ok(Self {
            id,
            critical,
            value,
        })
    }

    /// `critical` is only written when true.
    pub fn to_node(&self) -> Node {
        let mut children = vec![Node::oid(&self.id)];
        if self.critical {
            children.push(Node::boolean(true));
        }
        children.push(Node::octet_string(self.value.clone()));
        Node::sequence(children)
    }
}

/// A non-empty list of extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extensions(Vec<Extension>);

impl Extensions {
    pub fn new(extensions: Vec<Extension>) -> Result<Self, PkiError> {
        if extensions.is_empty() {
            return Err(PkiError::ConstraintViolation(
                "Extensions must not be empty".into(),
            ));
        }
        Ok(Self(extensions))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed or constructed list.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &Oid) -> Option<&Extension> {
        self.0.iter().find(|e| e.id == *id)
    }

    pub fn critical_oids(&self) -> BTreeSet<String> {
        self.oids_where(true)
    }

    pub fn non_critical_oids(&self) -> BTreeSet<String> {
        self.oids_where(false)
    }

    fn oids_where(&self, critical: bool) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|e| e.critical == critical)
            .map(|e| e.id.to_string())
            .collect()
    }

    pub fn from_node(node: &Node) -> Result<Self, PkiError> {
        let items = field("Extensions", node.as_sequence())?;
        if items.is_empty() {
            return Err(violation("Extensions: empty SEQUENCE"));
        }
        let extensions = items
            .iter()
            .map(Extension::from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = BTreeSet::new();
        if let Some(dup) = extensions.iter().find(|e| !seen.insert(e.id.clone())) {
            return Err(violation(format!("Extensions: duplicate {}", dup.id)));
        }
        Ok(Self(extensions))
    }

    pub fn to_node(&self) -> Node {
        Node::sequence(self.0.iter().map(Extension::to_node).collect())
    }
}
