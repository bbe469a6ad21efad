//! ASN.1 value tree with BER/DER encoding and decoding.

mod decoder;
mod encoder;
mod node;
mod tag;
mod tagged;
mod time;

pub use decoder::{Decoder, DecoderConfig, DecoderConfigBuilder};
pub use encoder::Encoder;
pub use node::{BitString, Content, Node};
pub use tagged::Tagging;
pub use time::{format_generalized_time, format_utc_time, parse_generalized_time, parse_utc_time};

use berder_types::Asn1Error;

/// ASN.1 identifier octet constants for the universal types used here.
pub mod tags {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const ENUMERATED: u8 = 0x0A;
    pub const UTF8_STRING: u8 = 0x0C;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
    pub const CONSTRUCTED: u8 = 0x20;
}

/// Represents a parsed ASN.1 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

/// ASN.1 tag class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// Which set of X.690 rules a codec operation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingRules {
    /// Basic Encoding Rules: indefinite lengths and constructed strings allowed.
    Ber,
    /// Distinguished Encoding Rules: the canonical subset of BER.
    #[default]
    Der,
}

impl EncodingRules {
    pub fn is_der(self) -> bool {
        self == EncodingRules::Der
    }
}

/// The universal types the value tree knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniversalTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Enumerated,
    Utf8String,
    Sequence,
    Set,
    NumericString,
    PrintableString,
    TeletexString,
    Ia5String,
    UtcTime,
    GeneralizedTime,
    VisibleString,
    BmpString,
}

impl UniversalTag {
    /// The universal tag number.
    pub fn number(self) -> u32 {
        match self {
            UniversalTag::Boolean => 1,
            UniversalTag::Integer => 2,
            UniversalTag::BitString => 3,
            UniversalTag::OctetString => 4,
            UniversalTag::Null => 5,
            UniversalTag::ObjectIdentifier => 6,
            UniversalTag::Enumerated => 10,
            UniversalTag::Utf8String => 12,
            UniversalTag::Sequence => 16,
            UniversalTag::Set => 17,
            UniversalTag::NumericString => 18,
            UniversalTag::PrintableString => 19,
            UniversalTag::TeletexString => 20,
            UniversalTag::Ia5String => 22,
            UniversalTag::UtcTime => 23,
            UniversalTag::GeneralizedTime => 24,
            UniversalTag::VisibleString => 26,
            UniversalTag::BmpString => 30,
        }
    }

    pub fn from_number(number: u32) -> Option<Self> {
        let tag = match number {
            1 => UniversalTag::Boolean,
            2 => UniversalTag::Integer,
            3 => UniversalTag::BitString,
            4 => UniversalTag::OctetString,
            5 => UniversalTag::Null,
            6 => UniversalTag::ObjectIdentifier,
            10 => UniversalTag::Enumerated,
            12 => UniversalTag::Utf8String,
            16 => UniversalTag::Sequence,
            17 => UniversalTag::Set,
            18 => UniversalTag::NumericString,
            19 => UniversalTag::PrintableString,
            20 => UniversalTag::TeletexString,
            22 => UniversalTag::Ia5String,
            23 => UniversalTag::UtcTime,
            24 => UniversalTag::GeneralizedTime,
            26 => UniversalTag::VisibleString,
            30 => UniversalTag::BmpString,
            _ => return None,
        };
        Some(tag)
    }

    /// True for SEQUENCE and SET, the only types that are always constructed.
    pub fn is_constructed(self) -> bool {
        matches!(self, UniversalTag::Sequence | UniversalTag::Set)
    }

    /// True for the string types BER may split into constructed segments.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            UniversalTag::BitString
                | UniversalTag::OctetString
                | UniversalTag::Utf8String
                | UniversalTag::NumericString
                | UniversalTag::PrintableString
                | UniversalTag::TeletexString
                | UniversalTag::Ia5String
                | UniversalTag::UtcTime
                | UniversalTag::GeneralizedTime
                | UniversalTag::VisibleString
                | UniversalTag::BmpString
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            UniversalTag::Boolean => "BOOLEAN",
            UniversalTag::Integer => "INTEGER",
            UniversalTag::BitString => "BIT STRING",
            UniversalTag::OctetString => "OCTET STRING",
            UniversalTag::Null => "NULL",
            UniversalTag::ObjectIdentifier => "OBJECT IDENTIFIER",
            UniversalTag::Enumerated => "ENUMERATED",
            UniversalTag::Utf8String => "UTF8String",
            UniversalTag::Sequence => "SEQUENCE",
            UniversalTag::Set => "SET",
            UniversalTag::NumericString => "NumericString",
            UniversalTag::PrintableString => "PrintableString",
            UniversalTag::TeletexString => "TeletexString",
            UniversalTag::Ia5String => "IA5String",
            UniversalTag::UtcTime => "UTCTime",
            UniversalTag::GeneralizedTime => "GeneralizedTime",
            UniversalTag::VisibleString => "VisibleString",
            UniversalTag::BmpString => "BMPString",
        }
    }
}

/// Decode exactly one value from `data` under the given rules.
pub fn decode(data: &[u8], rules: EncodingRules) -> Result<Node, Asn1Error> {
    Decoder::new(DecoderConfig::builder().rules(rules).build()).decode(data)
}

/// Decode exactly one DER value.
pub fn decode_der(data: &[u8]) -> Result<Node, Asn1Error> {
    decode(data, EncodingRules::Der)
}

/// Decode exactly one BER value.
pub fn decode_ber(data: &[u8]) -> Result<Node, Asn1Error> {
    decode(data, EncodingRules::Ber)
}

/// Encode a value tree under the given rules.
pub fn encode(node: &Node, rules: EncodingRules) -> Result<Vec<u8>, Asn1Error> {
    let mut enc = Encoder::new(rules);
    enc.write_node(node)?;
    Ok(enc.finish())
}
