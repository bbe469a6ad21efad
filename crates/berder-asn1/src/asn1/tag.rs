//! ASN.1 tag parsing and encoding.

use std::fmt;

use super::{Tag, TagClass, UniversalTag};
use berder_types::Asn1Error;

impl Tag {
    /// Parse a tag from the first bytes of `input`.
    /// Returns the tag and number of bytes consumed.
    pub fn from_bytes(input: &[u8]) -> Result<(Self, usize), Asn1Error> {
        let first = *input
            .first()
            .ok_or_else(|| Asn1Error::malformed("truncated tag"))?;
        let class = match first >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = (first & 0x20) != 0;

        let low_bits = first & 0x1F;
        if low_bits < 0x1F {
            return Ok((
                Tag {
                    class,
                    constructed,
                    number: low_bits as u32,
                },
                1,
            ));
        }

        // Long form tag number
        let mut number: u32 = 0;
        let mut i = 1;
        loop {
            let byte = *input
                .get(i)
                .ok_or_else(|| Asn1Error::malformed("truncated long-form tag"))?;
            if number > (u32::MAX >> 7) {
                return Err(Asn1Error::malformed("tag number overflow"));
            }
            number = (number << 7) | (byte & 0x7F) as u32;
            i += 1;
            if (byte & 0x80) == 0 {
                break;
            }
        }
        Ok((
            Tag {
                class,
                constructed,
                number,
            },
            i,
        ))
    }

    /// Encode this tag to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let class_bits = match self.class {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        };
        let constructed_bit = if self.constructed { 0x20 } else { 0x00 };

        if self.number < 0x1F {
            return vec![class_bits | constructed_bit | (self.number as u8)];
        }

        let mut result = vec![class_bits | constructed_bit | 0x1F];
        let mut num = self.number;
        let mut bytes = Vec::new();
        while num > 0 {
            bytes.push((num & 0x7F) as u8);
            num >>= 7;
        }
        bytes.reverse();
        let last = bytes.len() - 1;
        for (i, b) in bytes.iter().enumerate() {
            if i < last {
                result.push(b | 0x80);
            } else {
                result.push(*b);
            }
        }
        result
    }

    /// True if `encoded` (the bytes `from_bytes` consumed) is the shortest
    /// form for this tag number.
    pub(crate) fn is_minimal(&self, encoded: &[u8]) -> bool {
        if encoded.len() == 1 {
            return true;
        }
        self.number >= 0x1F && encoded[1] != 0x80
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => match UniversalTag::from_number(self.number) {
                Some(u) => write!(f, "{}", u.name())?,
                None => write!(f, "[UNIVERSAL {}]", self.number)?,
            },
            TagClass::Application => write!(f, "[APPLICATION {}]", self.number)?,
            TagClass::ContextSpecific => write!(f, "[{}]", self.number)?,
            TagClass::Private => write!(f, "[PRIVATE {}]", self.number)?,
        }
        if self.constructed {
            write!(f, " constructed")
        } else {
            write!(f, " primitive")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_tag() {
        let (tag, len) = Tag::from_bytes(&[0x30]).unwrap();
        assert_eq!(tag.class, TagClass::Universal);
        assert!(tag.constructed);
        assert_eq!(tag.number, 0x10);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_parse_context_primitive() {
        let (tag, len) = Tag::from_bytes(&[0x80]).unwrap();
        assert_eq!(tag.class, TagClass::ContextSpecific);
        assert!(!tag.constructed);
        assert_eq!(tag.number, 0);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_long_form_tag() {
        // [APPLICATION 200] primitive: 0x5F 0x81 0x48
        let (tag, len) = Tag::from_bytes(&[0x5F, 0x81, 0x48]).unwrap();
        assert_eq!(tag.class, TagClass::Application);
        assert_eq!(tag.number, 200);
        assert_eq!(len, 3);
        assert_eq!(tag.to_bytes(), vec![0x5F, 0x81, 0x48]);
        assert!(tag.is_minimal(&[0x5F, 0x81, 0x48]));
    }

    #[test]
    fn test_truncated_long_form_tag() {
        let err = Tag::from_bytes(&[0x1F, 0x81]).unwrap_err();
        assert!(matches!(err, Asn1Error::MalformedEncoding(_)));
        assert!(Tag::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_non_minimal_long_form() {
        // Tag number 5 written in long form.
        let (tag, _) = Tag::from_bytes(&[0x9F, 0x05]).unwrap();
        assert_eq!(tag.number, 5);
        assert!(!tag.is_minimal(&[0x9F, 0x05]));
        // Leading 0x80 padding group.
        let (tag, _) = Tag::from_bytes(&[0x9F, 0x80, 0x40]).unwrap();
        assert!(!tag.is_minimal(&[0x9F, 0x80, 0x40]));
    }

    #[test]
    fn test_roundtrip() {
        let tag = Tag {
            class: TagClass::ContextSpecific,
            constructed: true,
            number: 3,
        };
        let bytes = tag.to_bytes();
        let (parsed, _) = Tag::from_bytes(&bytes).unwrap();
        assert_eq!(tag, parsed);
    }

    #[test]
    fn test_display() {
        let (tag, _) = Tag::from_bytes(&[0x30]).unwrap();
        assert_eq!(tag.to_string(), "SEQUENCE constructed");
        let (tag, _) = Tag::from_bytes(&[0xA1]).unwrap();
        assert_eq!(tag.to_string(), "[1] constructed");
    }
}
