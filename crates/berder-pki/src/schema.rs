//! Helpers for imposing a schema on a value tree.

use berder_asn1::asn1::{Node, UniversalTag};
use berder_types::{Asn1Error, PkiError};

pub(crate) fn violation(reason: impl Into<String>) -> PkiError {
    PkiError::SchemaViolation(reason.into())
}

/// Map a codec-level failure in `field` to a schema violation naming it.
pub(crate) fn field<T>(name: &str, result: Result<T, Asn1Error>) -> Result<T, PkiError> {
    result.map_err(|e| violation(format!("{name}: {e}")))
}

/// Log a rejected parse of `what` at debug level and pass the result on.
pub(crate) fn logged<T>(what: &str, result: Result<T, PkiError>) -> Result<T, PkiError> {
    if let Err(e) = &result {
        log::debug!("rejecting {what}: {e}");
    }
    result
}

/// Sequential reader over the children of a SEQUENCE.
pub(crate) struct Fields<'a> {
    what: &'static str,
    children: &'a [Node],
    pos: usize,
}

impl<'a> Fields<'a> {
    /// Open `node` as a SEQUENCE.
    pub(crate) fn new(what: &'static str, node: &'a Node) -> Result<Self, PkiError> {
        let children = field(what, node.as_sequence())?;
        Ok(Self {
            what,
            children,
            pos: 0,
        })
    }

    /// The next field, which must exist.
    pub(crate) fn next(&mut self, name: &str) -> Result<&'a Node, PkiError> {
        let node = self
            .children
            .get(self.pos)
            .ok_or_else(|| violation(format!("{}: missing {name}", self.what)))?;
        self.pos += 1;
        Ok(node)
    }

    /// The next field if it carries context tag `[number]`.
    pub(crate) fn next_context(&mut self, number: u32) -> Option<&'a Node> {
        let node = self.children.get(self.pos).filter(|n| n.is_context(number))?;
        self.pos += 1;
        Some(node)
    }

    /// The next field if it carries the universal tag `tag`.
    pub(crate) fn next_universal(&mut self, tag: UniversalTag) -> Option<&'a Node> {
        let node = self.children.get(self.pos).filter(|n| n.is_universal(tag))?;
        self.pos += 1;
        Some(node)
    }

    /// Fail if fields remain.
    pub(crate) fn finish(self) -> Result<(), PkiError> {
        if self.pos == self.children.len() {
            Ok(())
        } else {
            Err(violation(format!(
                "{}: {} unexpected trailing fields",
                self.what,
                self.children.len() - self.pos
            )))
        }
    }
}

/// A GeneralizedTime field as UNIX seconds.
pub(crate) fn generalized_time(name: &str, node: &Node) -> Result<i64, PkiError> {
    if !node.is_universal(UniversalTag::GeneralizedTime) {
        return Err(violation(format!(
            "{name}: expected GeneralizedTime, found {}",
            node.tag()
        )));
    }
    field(name, node.as_time())
}
