//! The in-memory value tree and its universal-type interpretations.

use std::fmt;

use super::time::{format_generalized_time, format_utc_time, parse_generalized_time, parse_utc_time};
use super::{encode, EncodingRules, Tag, TagClass, UniversalTag};
use crate::oid::Oid;
use berder_types::Asn1Error;

/// Content of a value tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Content {
    /// Raw content octets.
    Primitive(Vec<u8>),
    /// Ordered child values. `indefinite` records the BER indefinite-length
    /// form; DER output ignores it.
    Constructed { children: Vec<Node>, indefinite: bool },
}

/// A tagged ASN.1 value: either primitive bytes or an ordered list of children.
///
/// Nodes are immutable once built. Universal-type semantics (INTEGER,
/// OCTET STRING, OID, ...) are provided by the `as_*` interpretation
/// methods rather than by separate types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    class: TagClass,
    number: u32,
    content: Content,
}

/// A decoded BIT STRING.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    pub unused_bits: u8,
    pub data: Vec<u8>,
}

impl Node {
    // ---- construction ----

    pub fn primitive(class: TagClass, number: u32, content: impl Into<Vec<u8>>) -> Self {
        Node {
            class,
            number,
            content: Content::Primitive(content.into()),
        }
    }

    pub fn constructed(class: TagClass, number: u32, children: Vec<Node>) -> Self {
        Node {
            class,
            number,
            content: Content::Constructed {
                children,
                indefinite: false,
            },
        }
    }

    /// A constructed node that BER output writes with indefinite length.
    pub fn constructed_indefinite(class: TagClass, number: u32, children: Vec<Node>) -> Self {
        Node {
            class,
            number,
            content: Content::Constructed {
                children,
                indefinite: true,
            },
        }
    }

    pub(crate) fn from_parts(class: TagClass, number: u32, content: Content) -> Self {
        Node {
            class,
            number,
            content,
        }
    }

    pub(crate) fn into_content(self) -> Content {
        self.content
    }

    /// Same value, marked for indefinite-length BER output. Primitive nodes
    /// are returned unchanged.
    pub fn into_indefinite(self) -> Self {
        match self.content {
            Content::Constructed { children, .. } => Node {
                class: self.class,
                number: self.number,
                content: Content::Constructed {
                    children,
                    indefinite: true,
                },
            },
            primitive => Node {
                class: self.class,
                number: self.number,
                content: primitive,
            },
        }
    }

    fn universal(tag: UniversalTag, content: Vec<u8>) -> Self {
        Node::primitive(TagClass::Universal, tag.number(), content)
    }

    pub fn boolean(value: bool) -> Self {
        Node::universal(UniversalTag::Boolean, vec![if value { 0xFF } else { 0x00 }])
    }

    /// An INTEGER from a signed value, minimal two's complement.
    pub fn integer_i64(value: i64) -> Self {
        Node::universal(UniversalTag::Integer, minimal_twos_complement(&value.to_be_bytes()))
    }

    /// An INTEGER from an unsigned value.
    pub fn integer_u64(value: u64) -> Self {
        Node::integer_unsigned(&value.to_be_bytes())
    }

    /// An INTEGER from big-endian unsigned magnitude bytes. A leading zero
    /// is added when the high bit is set, keeping the value positive.
    pub fn integer_unsigned(magnitude: &[u8]) -> Self {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let trimmed = &magnitude[start..];
        let mut content = Vec::with_capacity(trimmed.len() + 1);
        if trimmed.is_empty() || trimmed[0] & 0x80 != 0 {
            content.push(0x00);
        }
        content.extend_from_slice(trimmed);
        Node::universal(UniversalTag::Integer, content)
    }

    pub fn enumerated(value: u64) -> Self {
        let int = Node::integer_u64(value);
        Node::universal(UniversalTag::Enumerated, int.primitive_bytes().unwrap_or(&[0]).to_vec())
    }

    pub fn octet_string(value: impl Into<Vec<u8>>) -> Self {
        Node::universal(UniversalTag::OctetString, value.into())
    }

    pub fn bit_string(unused_bits: u8, data: &[u8]) -> Self {
        let mut content = Vec::with_capacity(data.len() + 1);
        content.push(unused_bits);
        content.extend_from_slice(data);
        Node::universal(UniversalTag::BitString, content)
    }

    pub fn null() -> Self {
        Node::universal(UniversalTag::Null, Vec::new())
    }

    pub fn oid(oid: &Oid) -> Self {
        Node::universal(UniversalTag::ObjectIdentifier, oid.to_der_value())
    }

    pub fn utf8_string(s: &str) -> Self {
        Node::universal(UniversalTag::Utf8String, s.as_bytes().to_vec())
    }

    pub fn printable_string(s: &str) -> Self {
        Node::universal(UniversalTag::PrintableString, s.as_bytes().to_vec())
    }

    /// GeneralizedTime `YYYYMMDDHHMMSSZ` from a UNIX timestamp.
    pub fn generalized_time(timestamp: i64) -> Self {
        Node::universal(
            UniversalTag::GeneralizedTime,
            format_generalized_time(timestamp).into_bytes(),
        )
    }

    /// UTCTime `YYMMDDHHMMSSZ` from a UNIX timestamp.
    pub fn utc_time(timestamp: i64) -> Self {
        Node::universal(UniversalTag::UtcTime, format_utc_time(timestamp).into_bytes())
    }

    pub fn sequence(children: Vec<Node>) -> Self {
        Node::constructed(TagClass::Universal, UniversalTag::Sequence.number(), children)
    }

    pub fn set(children: Vec<Node>) -> Self {
        Node::constructed(TagClass::Universal, UniversalTag::Set.number(), children)
    }

    // ---- structure ----

    pub fn class(&self) -> TagClass {
        self.class
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self.content, Content::Constructed { .. })
    }

    /// True if this node was decoded from, or will be written with,
    /// indefinite length.
    pub fn is_indefinite(&self) -> bool {
        matches!(
            self.content,
            Content::Constructed {
                indefinite: true,
                ..
            }
        )
    }

    pub fn tag(&self) -> Tag {
        Tag {
            class: self.class,
            constructed: self.is_constructed(),
            number: self.number,
        }
    }

    /// Child nodes; empty for a primitive node.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            Content::Constructed { children, .. } => children.as_slice(),
            Content::Primitive(_) => &[],
        }
    }

    /// Raw content octets, or `None` for a constructed node.
    pub fn primitive_bytes(&self) -> Option<&[u8]> {
        match &self.content {
            Content::Primitive(bytes) => Some(bytes.as_slice()),
            Content::Constructed { .. } => None,
        }
    }

    /// True if this node carries the universal tag `tag` (either form).
    pub fn is_universal(&self, tag: UniversalTag) -> bool {
        self.class == TagClass::Universal && self.number == tag.number()
    }

    /// The universal type of this node, if it is a known universal tag.
    pub fn universal_tag(&self) -> Option<UniversalTag> {
        if self.class == TagClass::Universal {
            UniversalTag::from_number(self.number)
        } else {
            None
        }
    }

    pub fn is_context(&self, number: u32) -> bool {
        self.class == TagClass::ContextSpecific && self.number == number
    }

    /// DER encoding of this node.
    pub fn to_der(&self) -> Result<Vec<u8>, Asn1Error> {
        encode(self, EncodingRules::Der)
    }

    /// BER encoding of this node, honoring indefinite-length markers.
    pub fn to_ber(&self) -> Result<Vec<u8>, Asn1Error> {
        encode(self, EncodingRules::Ber)
    }

    // ---- interpretation ----

    fn expect_primitive(&self, tag: UniversalTag) -> Result<&[u8], Asn1Error> {
        match (&self.content, self.is_universal(tag)) {
            (Content::Primitive(bytes), true) => Ok(bytes.as_slice()),
            _ => Err(Asn1Error::mismatch(tag.name(), self.tag().to_string())),
        }
    }

    fn expect_constructed(&self, tag: UniversalTag) -> Result<&[Node], Asn1Error> {
        match (&self.content, self.is_universal(tag)) {
            (Content::Constructed { children, .. }, true) => Ok(children.as_slice()),
            _ => Err(Asn1Error::mismatch(tag.name(), self.tag().to_string())),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, Asn1Error> {
        let bytes = self.expect_primitive(UniversalTag::Boolean)?;
        if bytes.len() != 1 {
            return Err(Asn1Error::malformed("BOOLEAN must have one content octet"));
        }
        Ok(bytes[0] != 0x00)
    }

    /// Two's complement INTEGER content octets.
    pub fn as_integer_bytes(&self) -> Result<&[u8], Asn1Error> {
        let bytes = self.expect_primitive(UniversalTag::Integer)?;
        if bytes.is_empty() {
            return Err(Asn1Error::malformed("empty INTEGER"));
        }
        Ok(bytes)
    }

    pub fn as_i64(&self) -> Result<i64, Asn1Error> {
        let value = twos_complement_to_i128(self.as_integer_bytes()?)
            .ok_or_else(|| Asn1Error::mismatch("INTEGER in i64 range", "larger INTEGER"))?;
        i64::try_from(value)
            .map_err(|_| Asn1Error::mismatch("INTEGER in i64 range", value.to_string()))
    }

    pub fn as_u64(&self) -> Result<u64, Asn1Error> {
        let value = twos_complement_to_i128(self.as_integer_bytes()?)
            .ok_or_else(|| Asn1Error::mismatch("INTEGER in u64 range", "larger INTEGER"))?;
        u64::try_from(value)
            .map_err(|_| Asn1Error::mismatch("INTEGER in u64 range", value.to_string()))
    }

    pub fn as_enumerated(&self) -> Result<u64, Asn1Error> {
        let bytes = self.expect_primitive(UniversalTag::Enumerated)?;
        let value = twos_complement_to_i128(bytes)
            .ok_or_else(|| Asn1Error::malformed("invalid ENUMERATED"))?;
        u64::try_from(value)
            .map_err(|_| Asn1Error::mismatch("non-negative ENUMERATED", value.to_string()))
    }

    /// OCTET STRING content; BER constructed segments are concatenated.
    pub fn as_octet_string(&self) -> Result<Vec<u8>, Asn1Error> {
        if !self.is_universal(UniversalTag::OctetString) {
            return Err(Asn1Error::mismatch(
                UniversalTag::OctetString.name(),
                self.tag().to_string(),
            ));
        }
        self.string_content()
    }

    pub fn as_bit_string(&self) -> Result<BitString, Asn1Error> {
        if !self.is_universal(UniversalTag::BitString) {
            return Err(Asn1Error::mismatch(
                UniversalTag::BitString.name(),
                self.tag().to_string(),
            ));
        }
        let content = self.string_content()?;
        let (&unused_bits, data) = content
            .split_first()
            .ok_or_else(|| Asn1Error::malformed("empty BIT STRING"))?;
        if unused_bits > 7 || (data.is_empty() && unused_bits != 0) {
            return Err(Asn1Error::malformed("invalid BIT STRING unused-bits count"));
        }
        Ok(BitString {
            unused_bits,
            data: data.to_vec(),
        })
    }

    pub fn as_null(&self) -> Result<(), Asn1Error> {
        let bytes = self.expect_primitive(UniversalTag::Null)?;
        if !bytes.is_empty() {
            return Err(Asn1Error::malformed("NULL with content"));
        }
        Ok(())
    }

    pub fn as_oid(&self) -> Result<Oid, Asn1Error> {
        Oid::from_der_value(self.expect_primitive(UniversalTag::ObjectIdentifier)?)
    }

    pub fn as_sequence(&self) -> Result<&[Node], Asn1Error> {
        self.expect_constructed(UniversalTag::Sequence)
    }

    pub fn as_set(&self) -> Result<&[Node], Asn1Error> {
        self.expect_constructed(UniversalTag::Set)
    }

    /// Character string value (UTF8String, PrintableString, IA5String,
    /// VisibleString, NumericString, TeletexString or BMPString).
    pub fn as_string(&self) -> Result<String, Asn1Error> {
        let tag = self.universal_tag();
        let malformed = || Asn1Error::malformed("invalid character string content");
        match tag {
            Some(
                UniversalTag::Utf8String
                | UniversalTag::PrintableString
                | UniversalTag::Ia5String
                | UniversalTag::VisibleString
                | UniversalTag::NumericString,
            ) => String::from_utf8(self.string_content()?).map_err(|_| malformed()),
            // TeletexString, treated as Latin-1
            Some(UniversalTag::TeletexString) => {
                Ok(self.string_content()?.iter().map(|&b| b as char).collect())
            }
            // UTF-16BE
            Some(UniversalTag::BmpString) => {
                let content = self.string_content()?;
                if content.len() % 2 != 0 {
                    return Err(malformed());
                }
                let units: Vec<u16> = content
                    .chunks(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&units).map_err(|_| malformed())
            }
            _ => Err(Asn1Error::mismatch("character string", self.tag().to_string())),
        }
    }

    /// Raw text of a UTCTime or GeneralizedTime.
    pub fn as_time_string(&self) -> Result<String, Asn1Error> {
        match self.universal_tag() {
            Some(UniversalTag::UtcTime | UniversalTag::GeneralizedTime) => {
                let content = self.string_content()?;
                if !content.is_ascii() {
                    return Err(Asn1Error::malformed("non-ASCII time value"));
                }
                String::from_utf8(content)
                    .map_err(|_| Asn1Error::malformed("non-ASCII time value"))
            }
            _ => Err(Asn1Error::mismatch("UTCTime or GeneralizedTime", self.tag().to_string())),
        }
    }

    /// A UTCTime or GeneralizedTime as a UNIX timestamp.
    pub fn as_time(&self) -> Result<i64, Asn1Error> {
        let text = self.as_time_string()?;
        if self.is_universal(UniversalTag::UtcTime) {
            parse_utc_time(&text)
        } else {
            parse_generalized_time(&text)
        }
    }

    /// Content of a string-typed node with BER segments concatenated.
    /// Segments of a BIT STRING are BIT STRINGs; every other string type
    /// is segmented into OCTET STRINGs.
    pub(crate) fn string_content(&self) -> Result<Vec<u8>, Asn1Error> {
        match &self.content {
            Content::Primitive(bytes) => Ok(bytes.clone()),
            Content::Constructed { .. } => {
                if self.class == TagClass::Universal
                    && self.number == UniversalTag::BitString.number()
                {
                    let mut segments = Vec::new();
                    self.collect_segments(UniversalTag::BitString, &mut segments)?;
                    join_bit_string_segments(&segments)
                } else {
                    let mut segments = Vec::new();
                    self.collect_segments(UniversalTag::OctetString, &mut segments)?;
                    Ok(segments.concat())
                }
            }
        }
    }

    fn collect_segments<'a>(
        &'a self,
        segment: UniversalTag,
        out: &mut Vec<&'a [u8]>,
    ) -> Result<(), Asn1Error> {
        for child in self.children() {
            if !child.is_universal(segment) {
                return Err(Asn1Error::malformed(format!(
                    "constructed string segment must be {}, found {}",
                    segment.name(),
                    child.tag()
                )));
            }
            match &child.content {
                Content::Primitive(bytes) => out.push(bytes.as_slice()),
                Content::Constructed { .. } => child.collect_segments(segment, out)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Content::Primitive(bytes) => write!(f, "{} ({} bytes)", self.tag(), bytes.len()),
            Content::Constructed { children, .. } => {
                write!(f, "{} ({} children)", self.tag(), children.len())
            }
        }
    }
}

/// Concatenate BIT STRING segments: only the last may have unused bits.
fn join_bit_string_segments(segments: &[&[u8]]) -> Result<Vec<u8>, Asn1Error> {
    let mut out = vec![0u8];
    for (i, seg) in segments.iter().enumerate() {
        let (&unused, data) = seg
            .split_first()
            .ok_or_else(|| Asn1Error::malformed("empty BIT STRING segment"))?;
        if unused != 0 && i + 1 != segments.len() {
            return Err(Asn1Error::malformed(
                "unused bits in a non-final BIT STRING segment",
            ));
        }
        out[0] = unused;
        out.extend_from_slice(data);
    }
    Ok(out)
}

/// Strip redundant sign-extension octets from two's complement content.
pub(crate) fn minimal_twos_complement(bytes: &[u8]) -> Vec<u8> {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (b0, b1) = (bytes[start], bytes[start + 1]);
        if (b0 == 0x00 && b1 & 0x80 == 0) || (b0 == 0xFF && b1 & 0x80 != 0) {
            start += 1;
        } else {
            break;
        }
    }
    bytes[start..].to_vec()
}

fn twos_complement_to_i128(bytes: &[u8]) -> Option<i128> {
    let minimal = minimal_twos_complement(bytes);
    if minimal.is_empty() || minimal.len() > 16 {
        return None;
    }
    let negative = minimal[0] & 0x80 != 0;
    let mut buf = if negative { [0xFFu8; 16] } else { [0u8; 16] };
    buf[16 - minimal.len()..].copy_from_slice(&minimal);
    Some(i128::from_be_bytes(buf))
}
