//! OID (Object Identifier) values and the well-known OIDs used by the PKI layer.

use std::fmt;
use std::str::FromStr;

use berder_types::Asn1Error;

/// An object identifier represented as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: Vec<u64>,
}

impl Oid {
    /// Create an OID from a slice of arc values. The arcs are not checked;
    /// use [`Oid::try_from_arcs`] for untrusted input.
    pub fn new(arcs: &[u64]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// Create an OID, checking that it has at least two arcs, that the
    /// first arc is 0, 1 or 2 and that the second arc is below 40 under
    /// roots 0 and 1.
    pub fn try_from_arcs(arcs: &[u64]) -> Result<Self, Asn1Error> {
        if arcs.len() < 2 {
            return Err(Asn1Error::malformed("OID needs at least two arcs"));
        }
        match arcs[0] {
            0 | 1 if arcs[1] >= 40 => Err(Asn1Error::malformed(format!(
                "second OID arc {} out of range under root {}",
                arcs[1], arcs[0]
            ))),
            0..=2 => {
                if arcs[0] == 2 && arcs[1] > u64::MAX - 80 {
                    return Err(Asn1Error::malformed("OID arc overflow"));
                }
                Ok(Self::new(arcs))
            }
            root => Err(Asn1Error::malformed(format!("invalid OID root arc {root}"))),
        }
    }

    /// Return the arc values.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Encode this OID to content octets (no tag/length).
    pub fn to_der_value(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if self.arcs.len() >= 2 {
            encode_arc(&mut buf, self.arcs[0].saturating_mul(40).saturating_add(self.arcs[1]));
            for &arc in &self.arcs[2..] {
                encode_arc(&mut buf, arc);
            }
        }
        buf
    }

    /// Parse an OID from content octets. Non-minimal subidentifiers are
    /// accepted here; DER decoding checks [`Oid::has_minimal_encoding`].
    pub fn from_der_value(data: &[u8]) -> Result<Self, Asn1Error> {
        if data.is_empty() {
            return Err(Asn1Error::malformed("empty OID"));
        }
        let (first, mut i) = decode_arc(data)?;
        let mut arcs = match first {
            0..=39 => vec![0, first],
            40..=79 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        while i < data.len() {
            let (arc, consumed) = decode_arc(&data[i..])?;
            arcs.push(arc);
            i += consumed;
        }
        Ok(Self { arcs })
    }

    /// True if no subidentifier in `data` starts with a `0x80` padding group.
    pub fn has_minimal_encoding(data: &[u8]) -> bool {
        let mut at_start = true;
        for &byte in data {
            if at_start && byte == 0x80 {
                return false;
            }
            at_start = byte & 0x80 == 0;
        }
        true
    }

    /// Return the dotted-string representation (e.g., "1.2.840.113549.1.7.6").
    pub fn to_dot_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dot_string())
    }
}

impl FromStr for Oid {
    type Err = Asn1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Asn1Error::malformed(format!("invalid OID string {s:?}")));
                }
                part.parse::<u64>()
                    .map_err(|_| Asn1Error::malformed(format!("OID arc overflow in {s:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_arcs(&arcs)
    }
}

fn encode_arc(buf: &mut Vec<u8>, mut value: u64) {
    if value < 0x80 {
        buf.push(value as u8);
        return;
    }
    let mut bytes = Vec::new();
    while value > 0 {
        bytes.push((value & 0x7F) as u8);
        value >>= 7;
    }
    bytes.reverse();
    let last = bytes.len() - 1;
    for (i, b) in bytes.iter().enumerate() {
        if i < last {
            buf.push(b | 0x80);
        } else {
            buf.push(*b);
        }
    }
}

fn decode_arc(data: &[u8]) -> Result<(u64, usize), Asn1Error> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if value > (u64::MAX >> 7) {
            return Err(Asn1Error::malformed("OID arc overflow"));
        }
        value = (value << 7) | (byte & 0x7F) as u64;
        if (byte & 0x80) == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Asn1Error::malformed("truncated OID subidentifier"))
}

// Well-known OIDs
pub mod known {
    use super::Oid;

    // PKCS#7 content types
    pub fn pkcs7_data() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 7, 1])
    }
    pub fn pkcs7_encrypted_data() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 7, 6])
    }

    // PKCS#5 v1.5 password-based encryption
    pub fn pbe_with_md2_and_des_cbc() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 5, 1])
    }
    pub fn pbe_with_md5_and_des_cbc() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 5, 3])
    }
    pub fn pbe_with_md5_and_rc2_cbc() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 5, 6])
    }
    pub fn pbe_with_sha1_and_des_cbc() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 5, 10])
    }
    pub fn pbe_with_sha1_and_rc2_cbc() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 5, 11])
    }

    // OCSP
    pub fn ocsp_basic() -> Oid {
        Oid::new(&[1, 3, 6, 1, 5, 5, 7, 48, 1, 1])
    }
    pub fn ocsp_nonce() -> Oid {
        Oid::new(&[1, 3, 6, 1, 5, 5, 7, 48, 1, 2])
    }

    // Hash algorithms
    pub fn sha1() -> Oid {
        Oid::new(&[1, 3, 14, 3, 2, 26])
    }
    pub fn sha256() -> Oid {
        Oid::new(&[2, 16, 840, 1, 101, 3, 4, 2, 1])
    }
    pub fn sha384() -> Oid {
        Oid::new(&[2, 16, 840, 1, 101, 3, 4, 2, 2])
    }
    pub fn sha512() -> Oid {
        Oid::new(&[2, 16, 840, 1, 101, 3, 4, 2, 3])
    }

    // Signature algorithms
    pub fn sha1_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 5])
    }
    pub fn sha256_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 11])
    }
    pub fn sha384_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 12])
    }
    pub fn sha512_with_rsa_encryption() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 1, 13])
    }
    pub fn ecdsa_with_sha256() -> Oid {
        Oid::new(&[1, 2, 840, 10045, 4, 3, 2])
    }
    pub fn ecdsa_with_sha384() -> Oid {
        Oid::new(&[1, 2, 840, 10045, 4, 3, 3])
    }
    pub fn ed25519() -> Oid {
        Oid::new(&[1, 3, 101, 112])
    }
}
