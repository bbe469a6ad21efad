//! ASN.1 BER/DER decoder.

use super::node::minimal_twos_complement;
use super::{Content, EncodingRules, Node, Tag, TagClass, UniversalTag};
use crate::oid::Oid;
use berder_types::Asn1Error;

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    rules: EncodingRules,
    max_depth: usize,
    allow_trailing: bool,
}

impl DecoderConfig {
    /// Create a builder with DER rules, a nesting limit of 64 and no
    /// trailing bytes allowed.
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }

    pub fn rules(&self) -> EncodingRules {
        self.rules
    }

    /// Maximum nesting depth of constructed values. The top-level value is
    /// at depth 0.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn allow_trailing(&self) -> bool {
        self.allow_trailing
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig::builder().build()
    }
}

/// Builder for `DecoderConfig`.
#[derive(Debug, Clone)]
pub struct DecoderConfigBuilder {
    rules: EncodingRules,
    max_depth: usize,
    allow_trailing: bool,
}

impl Default for DecoderConfigBuilder {
    fn default() -> Self {
        Self {
            rules: EncodingRules::Der,
            max_depth: 64,
            allow_trailing: false,
        }
    }
}

impl DecoderConfigBuilder {
    pub fn rules(mut self, rules: EncodingRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Accept bytes after the top-level value in [`Decoder::decode`].
    pub fn allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }

    pub fn build(self) -> DecoderConfig {
        DecoderConfig {
            rules: self.rules,
            max_depth: self.max_depth,
            allow_trailing: self.allow_trailing,
        }
    }
}

/// Decodes bytes into a value tree under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// A strict DER decoder with default limits.
    pub fn der() -> Self {
        Self::new(DecoderConfig::builder().rules(EncodingRules::Der).build())
    }

    /// A BER decoder with default limits.
    pub fn ber() -> Self {
        Self::new(DecoderConfig::builder().rules(EncodingRules::Ber).build())
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one value. Unless the configuration allows trailing bytes,
    /// the value must span all of `data`.
    pub fn decode(&self, data: &[u8]) -> Result<Node, Asn1Error> {
        let (node, consumed) = self.decode_prefix(data)?;
        if consumed != data.len() && !self.config.allow_trailing {
            return Err(Asn1Error::malformed(format!(
                "{} trailing bytes after top-level value",
                data.len() - consumed
            )));
        }
        Ok(node)
    }

    /// Decode the first value in `data` and return it with the number of
    /// bytes it occupied.
    pub fn decode_prefix(&self, data: &[u8]) -> Result<(Node, usize), Asn1Error> {
        let mut reader = Reader::new(data, &self.config);
        let node = reader.read_node(0)?;
        Ok((node, reader.pos))
    }

    /// Decode a concatenation of values.
    pub fn decode_all(&self, data: &[u8]) -> Result<Vec<Node>, Asn1Error> {
        let mut reader = Reader::new(data, &self.config);
        let mut nodes = Vec::new();
        while !reader.is_empty() {
            nodes.push(reader.read_node(0)?);
        }
        Ok(nodes)
    }
}

enum Length {
    Definite(usize),
    Indefinite,
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    config: &'a DecoderConfig,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], config: &'a DecoderConfig) -> Self {
        Self {
            data,
            pos: 0,
            config,
        }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn der(&self) -> bool {
        self.config.rules.is_der()
    }

    fn read_node(&mut self, depth: usize) -> Result<Node, Asn1Error> {
        if depth > self.config.max_depth {
            return Err(Asn1Error::malformed(format!(
                "nesting deeper than {} levels",
                self.config.max_depth
            )));
        }

        let (tag, tag_len) = Tag::from_bytes(&self.data[self.pos..])?;
        if tag.class == TagClass::Universal && tag.number == 0 {
            return Err(Asn1Error::malformed(
                "end-of-contents marker outside indefinite-length content",
            ));
        }
        if self.der() && !tag.is_minimal(&self.data[self.pos..self.pos + tag_len]) {
            return Err(Asn1Error::malformed(format!(
                "non-minimal tag encoding for {tag}"
            )));
        }
        self.pos += tag_len;

        let length = self.read_length()?;
        let content = match (tag.constructed, length) {
            (false, Length::Indefinite) => {
                return Err(Asn1Error::malformed(format!(
                    "indefinite length on primitive {tag}"
                )));
            }
            (false, Length::Definite(len)) => {
                let bytes = &self.data[self.pos..self.pos + len];
                self.pos += len;
                Content::Primitive(bytes.to_vec())
            }
            (true, Length::Definite(len)) => {
                let end = self.pos + len;
                let body: &'a [u8] = &self.data[self.pos..end];
                let mut inner = Reader::new(body, self.config);
                let mut children = Vec::new();
                let mut prev: Option<&[u8]> = None;
                let check_order = self.der()
                    && tag.class == TagClass::Universal
                    && tag.number == UniversalTag::Set.number();
                while !inner.is_empty() {
                    let start = inner.pos;
                    children.push(inner.read_node(depth + 1)?);
                    if check_order {
                        let encoded = &body[start..inner.pos];
                        if prev.is_some_and(|p| p > encoded) {
                            return Err(Asn1Error::malformed(
                                "SET elements not in canonical order",
                            ));
                        }
                        prev = Some(encoded);
                    }
                }
                self.pos = end;
                Content::Constructed {
                    children,
                    indefinite: false,
                }
            }
            (true, Length::Indefinite) => {
                let mut children = Vec::new();
                loop {
                    match self.data.get(self.pos..self.pos + 2) {
                        Some([0x00, 0x00]) => {
                            self.pos += 2;
                            break;
                        }
                        Some([0x00, _]) => {
                            return Err(Asn1Error::malformed(
                                "end-of-contents marker with non-zero length",
                            ));
                        }
                        Some(_) => children.push(self.read_node(depth + 1)?),
                        None => {
                            return Err(Asn1Error::malformed(format!(
                                "missing end-of-contents for indefinite-length {tag}"
                            )));
                        }
                    }
                }
                log::trace!(
                    "decoded indefinite-length {tag} with {} children",
                    children.len()
                );
                Content::Constructed {
                    children,
                    indefinite: true,
                }
            }
        };

        let node = Node::from_parts(tag.class, tag.number, content);
        check_form(&node)?;
        if self.der() {
            check_der_content(&node)?;
        }
        Ok(node)
    }

    /// Read a length field. Definite lengths are checked against the
    /// remaining input.
    fn read_length(&mut self) -> Result<Length, Asn1Error> {
        let first = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Asn1Error::malformed("truncated length"))?;
        self.pos += 1;

        let length = if first < 0x80 {
            first as usize
        } else if first == 0x80 {
            if self.der() {
                return Err(Asn1Error::malformed("indefinite length in DER"));
            }
            return Ok(Length::Indefinite);
        } else if first == 0xFF {
            return Err(Asn1Error::malformed("reserved length octet 0xFF"));
        } else {
            let num_bytes = (first & 0x7F) as usize;
            let bytes = self
                .data
                .get(self.pos..self.pos + num_bytes)
                .ok_or_else(|| Asn1Error::malformed("truncated long-form length"))?;
            let mut length: usize = 0;
            for &b in bytes {
                if length > (usize::MAX >> 8) {
                    return Err(Asn1Error::malformed("length does not fit in usize"));
                }
                length = (length << 8) | b as usize;
            }
            if self.der() && (bytes[0] == 0 || length < 0x80) {
                return Err(Asn1Error::malformed("non-minimal length encoding"));
            }
            self.pos += num_bytes;
            length
        };

        if length > self.data.len() - self.pos {
            return Err(Asn1Error::malformed(format!(
                "length {length} exceeds {} remaining bytes",
                self.data.len() - self.pos
            )));
        }
        Ok(Length::Definite(length))
    }
}

/// Forms X.690 forbids under both rule sets: SEQUENCE/SET must be
/// constructed and the scalar universal types must be primitive.
fn check_form(node: &Node) -> Result<(), Asn1Error> {
    let Some(tag) = node.universal_tag() else {
        return Ok(());
    };
    let ok = if tag.is_constructed() {
        node.is_constructed()
    } else if tag.is_string() {
        true
    } else {
        !node.is_constructed()
    };
    if ok {
        Ok(())
    } else {
        Err(Asn1Error::malformed(format!("invalid form {}", node.tag())))
    }
}

/// Canonical-content rules DER adds on top of BER.
fn check_der_content(node: &Node) -> Result<(), Asn1Error> {
    let Some(tag) = node.universal_tag() else {
        return Ok(());
    };
    let bytes = match node.primitive_bytes() {
        Some(bytes) => bytes,
        None if tag.is_string() => {
            return Err(Asn1Error::malformed(format!(
                "constructed {} in DER",
                tag.name()
            )));
        }
        None => return Ok(()),
    };
    match tag {
        UniversalTag::Boolean => {
            if bytes != [0x00] && bytes != [0xFF] {
                return Err(Asn1Error::malformed("DER BOOLEAN must be 00 or FF"));
            }
        }
        UniversalTag::Integer | UniversalTag::Enumerated => {
            if bytes.is_empty() {
                return Err(Asn1Error::malformed(format!("empty {}", tag.name())));
            }
            if minimal_twos_complement(bytes).len() != bytes.len() {
                return Err(Asn1Error::malformed(format!(
                    "non-minimal {} encoding",
                    tag.name()
                )));
            }
        }
        UniversalTag::ObjectIdentifier => {
            if !Oid::has_minimal_encoding(bytes) {
                return Err(Asn1Error::malformed("non-minimal OID subidentifier"));
            }
            Oid::from_der_value(bytes)?;
        }
        UniversalTag::Null => {
            if !bytes.is_empty() {
                return Err(Asn1Error::malformed("NULL with content"));
            }
        }
        UniversalTag::BitString => {
            let (&unused, data) = bytes
                .split_first()
                .ok_or_else(|| Asn1Error::malformed("empty BIT STRING"))?;
            let last = data.last().copied().unwrap_or(0);
            if unused > 7 || (data.is_empty() && unused != 0) {
                return Err(Asn1Error::malformed("invalid BIT STRING unused-bits count"));
            }
            if unused > 0 && last & ((1u8 << unused) - 1) != 0 {
                return Err(Asn1Error::malformed("DER BIT STRING padding bits must be zero"));
            }
        }
        _ => {}
    }
    Ok(())
}
