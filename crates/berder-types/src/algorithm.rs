/// Hash algorithm identifiers, addressable by their registry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Md2,
    Md4,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgId {
    /// Canonical registry name (e.g. `"SHA-256"`).
    pub fn name(self) -> &'static str {
        match self {
            HashAlgId::Md2 => "MD2",
            HashAlgId::Md4 => "MD4",
            HashAlgId::Md5 => "MD5",
            HashAlgId::Sha1 => "SHA-1",
            HashAlgId::Sha224 => "SHA-224",
            HashAlgId::Sha256 => "SHA-256",
            HashAlgId::Sha384 => "SHA-384",
            HashAlgId::Sha512 => "SHA-512",
        }
    }

    /// Look up a hash by name. Case-insensitive; the hyphen is optional
    /// (`"sha256"`, `"SHA-256"` and `"Sha-256"` all match).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MD2" => Some(HashAlgId::Md2),
            "MD4" => Some(HashAlgId::Md4),
            "MD5" => Some(HashAlgId::Md5),
            "SHA1" | "SHA" => Some(HashAlgId::Sha1),
            "SHA224" => Some(HashAlgId::Sha224),
            "SHA256" => Some(HashAlgId::Sha256),
            "SHA384" => Some(HashAlgId::Sha384),
            "SHA512" => Some(HashAlgId::Sha512),
            _ => None,
        }
    }

    /// Digest output size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgId::Md2 | HashAlgId::Md4 | HashAlgId::Md5 => 16,
            HashAlgId::Sha1 => 20,
            HashAlgId::Sha224 => 28,
            HashAlgId::Sha256 => 32,
            HashAlgId::Sha384 => 48,
            HashAlgId::Sha512 => 64,
        }
    }
}

/// Signature algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignAlgId {
    RsaPkcs1Sha1,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPkcs1Sha512,
    EcdsaSha256,
    EcdsaSha384,
    Ed25519,
}

impl SignAlgId {
    /// The hash the scheme applies to the message, if any.
    pub fn hash(self) -> Option<HashAlgId> {
        match self {
            SignAlgId::RsaPkcs1Sha1 => Some(HashAlgId::Sha1),
            SignAlgId::RsaPkcs1Sha256 | SignAlgId::EcdsaSha256 => Some(HashAlgId::Sha256),
            SignAlgId::RsaPkcs1Sha384 | SignAlgId::EcdsaSha384 => Some(HashAlgId::Sha384),
            SignAlgId::RsaPkcs1Sha512 => Some(HashAlgId::Sha512),
            SignAlgId::Ed25519 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_from_name() {
        assert_eq!(HashAlgId::from_name("SHA-256"), Some(HashAlgId::Sha256));
        assert_eq!(HashAlgId::from_name("sha1"), Some(HashAlgId::Sha1));
        assert_eq!(HashAlgId::from_name("md4"), Some(HashAlgId::Md4));
        assert_eq!(HashAlgId::from_name("whirlpool"), None);
    }

    #[test]
    fn test_name_roundtrip() {
        for alg in [HashAlgId::Md5, HashAlgId::Sha1, HashAlgId::Sha384] {
            assert_eq!(HashAlgId::from_name(alg.name()), Some(alg));
        }
    }

    #[test]
    fn test_sign_alg_hash() {
        assert_eq!(SignAlgId::EcdsaSha384.hash(), Some(HashAlgId::Sha384));
        assert_eq!(SignAlgId::Ed25519.hash(), None);
    }
}
