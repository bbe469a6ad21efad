//! Digest lookup by algorithm name.

use digest::DynDigest;

use berder_types::{HashAlgId, PkiError};

/// A registry of digest algorithms keyed by name (`"SHA-256"`, `"SHA1"`, ...).
pub trait DigestProvider: Send + Sync {
    /// A fresh digest context for `name`, or `None` if the name is unknown.
    fn digest(&self, name: &str) -> Option<Box<dyn DynDigest>>;
}

impl<F> DigestProvider for F
where
    F: Fn(&str) -> Option<Box<dyn DynDigest>> + Send + Sync,
{
    fn digest(&self, name: &str) -> Option<Box<dyn DynDigest>> {
        self(name)
    }
}

/// Look up `name` in `provider`, failing with `UnsupportedAlgorithm`.
pub fn lookup(provider: &dyn DigestProvider, name: &str) -> Result<Box<dyn DynDigest>, PkiError> {
    provider.digest(name).ok_or_else(|| {
        log::debug!("no digest registered for {name:?}");
        PkiError::UnsupportedAlgorithm(format!("digest {name}"))
    })
}

/// One-shot digest of `data` with `alg`.
pub fn compute_hash(
    provider: &dyn DigestProvider,
    alg: HashAlgId,
    data: &[u8],
) -> Result<Vec<u8>, PkiError> {
    let mut ctx = lookup(provider, alg.name())?;
    ctx.update(data);
    Ok(ctx.finalize().into_vec())
}

/// SHA-1 and SHA-2 from the RustCrypto `sha1` / `sha2` crates.
#[cfg(feature = "rustcrypto")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoDigests;

#[cfg(feature = "rustcrypto")]
impl DigestProvider for RustCryptoDigests {
    fn digest(&self, name: &str) -> Option<Box<dyn DynDigest>> {
        match HashAlgId::from_name(name)? {
            HashAlgId::Sha1 => Some(Box::new(sha1::Sha1::default())),
            HashAlgId::Sha224 => Some(Box::new(sha2::Sha224::default())),
            HashAlgId::Sha256 => Some(Box::new(sha2::Sha256::default())),
            HashAlgId::Sha384 => Some(Box::new(sha2::Sha384::default())),
            HashAlgId::Sha512 => Some(Box::new(sha2::Sha512::default())),
            HashAlgId::Md2 | HashAlgId::Md4 | HashAlgId::Md5 => None,
        }
    }
}

#[cfg(all(test, feature = "rustcrypto"))]
mod tests {
    use super::*;
    use berder_types::ErrorKind;
    use hex_literal::hex;

    #[test]
    fn test_sha256_by_name() {
        for name in ["SHA-256", "sha256", "Sha-256"] {
            let digest = compute_hash(&RustCryptoDigests, HashAlgId::from_name(name).unwrap(), b"abc")
                .unwrap();
            assert_eq!(
                digest,
                hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            );
        }
    }

    #[test]
    fn test_sha1() {
        let digest = compute_hash(&RustCryptoDigests, HashAlgId::Sha1, b"abc").unwrap();
        assert_eq!(digest, hex!("a9993e364706816aba3e25717850c26c9cd0d89d"));
    }

    #[test]
    fn test_unknown_name() {
        let err = lookup(&RustCryptoDigests, "MD4").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
        assert!(RustCryptoDigests.digest("whirlpool").is_none());
    }

    #[test]
    fn test_closure_provider() {
        let only_sha1 = |name: &str| -> Option<Box<dyn DynDigest>> {
            (name == "SHA-1").then(|| Box::new(sha1::Sha1::default()) as Box<dyn DynDigest>)
        };
        assert!(lookup(&only_sha1, "SHA-1").is_ok());
        assert!(lookup(&only_sha1, "SHA-256").is_err());
    }
}
