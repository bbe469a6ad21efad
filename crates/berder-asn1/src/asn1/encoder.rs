//! ASN.1 BER/DER encoder.

use super::node::minimal_twos_complement;
use super::{Content, EncodingRules, Node, Tag, TagClass, UniversalTag};
use crate::oid::Oid;
use berder_types::Asn1Error;

/// Serializes value trees under one set of encoding rules.
///
/// In DER mode lengths are always definite, universal SET children are
/// sorted by their encodings, scalar content is written in its minimal
/// form and constructed strings are flattened. BER mode writes the tree as
/// stored and honors indefinite-length markers.
#[derive(Debug, Clone)]
pub struct Encoder {
    rules: EncodingRules,
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new(rules: EncodingRules) -> Self {
        Self {
            rules,
            buf: Vec::new(),
        }
    }

    pub fn der() -> Self {
        Self::new(EncodingRules::Der)
    }

    pub fn ber() -> Self {
        Self::new(EncodingRules::Ber)
    }

    pub fn rules(&self) -> EncodingRules {
        self.rules
    }

    /// Append the encoding of `node`.
    pub fn write_node(&mut self, node: &Node) -> Result<&mut Self, Asn1Error> {
        encode_into(node, self.rules, &mut self.buf)?;
        Ok(self)
    }

    /// Append pre-encoded bytes unchanged.
    pub fn write_raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Encode a single node without touching the internal buffer.
    pub fn encode(&self, node: &Node) -> Result<Vec<u8>, Asn1Error> {
        let mut out = Vec::new();
        encode_into(node, self.rules, &mut out)?;
        Ok(out)
    }

    /// Consume the encoder and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::der()
    }
}

fn encode_into(node: &Node, rules: EncodingRules, out: &mut Vec<u8>) -> Result<(), Asn1Error> {
    match node.content() {
        Content::Primitive(bytes) => {
            let content = if rules.is_der() {
                canonical_content(node, bytes)?
            } else {
                bytes.clone()
            };
            write_header(out, node, false, content.len());
            out.extend_from_slice(&content);
        }
        Content::Constructed {
            children,
            indefinite,
        } => {
            let string_type = node.universal_tag().filter(|t| t.is_string());
            if let (true, Some(tag)) = (rules.is_der(), string_type) {
                let joined = node.string_content()?;
                log::trace!(
                    "flattening constructed {} of {} segments",
                    tag.name(),
                    children.len()
                );
                let content = canonical_content(node, &joined)?;
                write_header(out, node, false, content.len());
                out.extend_from_slice(&content);
                return Ok(());
            }

            if !rules.is_der() && *indefinite {
                out.extend_from_slice(&node.tag().to_bytes());
                out.push(0x80);
                for child in children {
                    encode_into(child, rules, out)?;
                }
                out.extend_from_slice(&[0x00, 0x00]);
                return Ok(());
            }

            let mut encoded = children
                .iter()
                .map(|child| {
                    let mut buf = Vec::new();
                    encode_into(child, rules, &mut buf)?;
                    Ok(buf)
                })
                .collect::<Result<Vec<_>, Asn1Error>>()?;
            if rules.is_der() && node.is_universal(UniversalTag::Set) {
                if encoded.windows(2).any(|w| w[0] > w[1]) {
                    log::trace!("sorting {} SET elements into DER order", encoded.len());
                }
                encoded.sort();
            }
            if *indefinite {
                log::trace!("writing indefinite-length {} with definite length", node.tag());
            }
            let len = encoded.iter().map(Vec::len).sum();
            write_header(out, node, true, len);
            for child in &encoded {
                out.extend_from_slice(child);
            }
        }
    }
    Ok(())
}

fn write_header(out: &mut Vec<u8>, node: &Node, constructed: bool, len: usize) {
    let tag = Tag {
        class: node.class(),
        constructed,
        number: node.number(),
    };
    out.extend_from_slice(&tag.to_bytes());
    write_length(out, len);
}

/// Write a definite length in its minimal form.
fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// DER form of a universal primitive's content octets.
fn canonical_content(node: &Node, bytes: &[u8]) -> Result<Vec<u8>, Asn1Error> {
    if node.class() != TagClass::Universal {
        return Ok(bytes.to_vec());
    }
    match UniversalTag::from_number(node.number()) {
        Some(UniversalTag::Boolean) => match bytes {
            [0x00] => Ok(vec![0x00]),
            [_] => Ok(vec![0xFF]),
            _ => Err(Asn1Error::malformed("BOOLEAN must have one content octet")),
        },
        Some(tag @ (UniversalTag::Integer | UniversalTag::Enumerated)) => {
            if bytes.is_empty() {
                return Err(Asn1Error::malformed(format!("empty {}", tag.name())));
            }
            Ok(minimal_twos_complement(bytes))
        }
        Some(UniversalTag::ObjectIdentifier) => Ok(Oid::from_der_value(bytes)?.to_der_value()),
        Some(UniversalTag::BitString) => {
            let (&unused, data) = bytes
                .split_first()
                .ok_or_else(|| Asn1Error::malformed("empty BIT STRING"))?;
            if unused > 7 || (data.is_empty() && unused != 0) {
                return Err(Asn1Error::malformed("invalid BIT STRING unused-bits count"));
            }
            let mut content = bytes.to_vec();
            if let Some(last) = content.last_mut().filter(|_| unused > 0) {
                *last &= !((1u8 << unused) - 1);
            }
            Ok(content)
        }
        _ => Ok(bytes.to_vec()),
    }
}
