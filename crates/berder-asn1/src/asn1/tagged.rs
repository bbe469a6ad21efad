//! IMPLICIT / EXPLICIT interpretation of context-specific tags.

use super::{Node, TagClass, UniversalTag};
use berder_types::Asn1Error;

/// How a context-specific tag relates to the value it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagging {
    /// The tag replaces the universal tag of the value.
    Implicit,
    /// The tag wraps the complete encoding of the value.
    Explicit,
}

impl Node {
    /// `[number] IMPLICIT`: the inner value's content under a context tag.
    pub fn implicit(number: u32, inner: Node) -> Node {
        Node::from_parts(TagClass::ContextSpecific, number, inner.into_content())
    }

    /// `[number] EXPLICIT`: a constructed context tag holding `inner`.
    pub fn explicit(number: u32, inner: Node) -> Node {
        Node::constructed(TagClass::ContextSpecific, number, vec![inner])
    }

    /// Tag number if this node is context-specific.
    pub fn context_number(&self) -> Option<u32> {
        (self.class() == TagClass::ContextSpecific).then_some(self.number())
    }

    /// Reinterpret an IMPLICIT `[number]` node as universal type `expected`.
    ///
    /// The node's form must match the natural form of `expected`; string
    /// types also accept the BER constructed form.
    pub fn resolve_implicit(&self, number: u32, expected: UniversalTag) -> Result<Node, Asn1Error> {
        let want = || format!("[{number}] IMPLICIT {}", expected.name());
        if !self.is_context(number) {
            return Err(Asn1Error::mismatch(want(), self.tag().to_string()));
        }
        let form_ok = if expected.is_constructed() {
            self.is_constructed()
        } else {
            expected.is_string() || !self.is_constructed()
        };
        if !form_ok {
            return Err(Asn1Error::mismatch(want(), self.tag().to_string()));
        }
        Ok(Node::from_parts(
            TagClass::Universal,
            expected.number(),
            self.content().clone(),
        ))
    }

    /// Unwrap an EXPLICIT `[number]` node whose single child must carry the
    /// universal tag `expected`.
    pub fn resolve_explicit(&self, number: u32, expected: UniversalTag) -> Result<&Node, Asn1Error> {
        let inner = self.resolve_explicit_any(number)?;
        if !inner.is_universal(expected) {
            return Err(Asn1Error::mismatch(
                format!("[{number}] EXPLICIT {}", expected.name()),
                format!("[{number}] EXPLICIT {}", inner.tag()),
            ));
        }
        Ok(inner)
    }

    /// Unwrap an EXPLICIT `[number]` node around a value of any type.
    pub fn resolve_explicit_any(&self, number: u32) -> Result<&Node, Asn1Error> {
        match self.children() {
            [inner] if self.is_context(number) && self.is_constructed() => Ok(inner),
            _ => Err(Asn1Error::mismatch(
                format!("[{number}] EXPLICIT with one inner value"),
                format!("{self}"),
            )),
        }
    }

    /// Resolve a context-tagged node under the given tagging mode.
    pub fn resolve(
        &self,
        number: u32,
        tagging: Tagging,
        expected: UniversalTag,
    ) -> Result<Node, Asn1Error> {
        match tagging {
            Tagging::Implicit => self.resolve_implicit(number, expected),
            Tagging::Explicit => self.resolve_explicit(number, expected).cloned(),
        }
    }
}
