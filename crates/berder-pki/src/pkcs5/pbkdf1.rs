//! PBKDF1 (PKCS#5 v1.5 key derivation, RFC 8018 §5.1).

use digest::DynDigest;
use zeroize::Zeroizing;

use berder_types::PkiError;

/// Derive a key from a password using PBKDF1.
///
/// # Parameters
/// - `digest`: a fresh digest context; its output length bounds `dk_len`.
/// - `password`: the password bytes.
/// - `salt`: the salt bytes (8 bytes for PKCS#5 v1.5 schemes).
/// - `iterations`: the iteration count, at least 1.
/// - `dk_len`: the desired derived key length in bytes.
///
/// # Returns
/// The first `dk_len` bytes of `T_c`, where `T_1 = Hash(P || S)` and
/// `T_i = Hash(T_{i-1})`.
pub fn pbkdf1(
    mut digest: Box<dyn DynDigest>,
    password: &[u8],
    salt: &[u8],
    iterations: u64,
    dk_len: usize,
) -> Result<Zeroizing<Vec<u8>>, PkiError> {
    if iterations == 0 {
        return Err(PkiError::ConstraintViolation(
            "PBKDF1 iteration count must be at least 1".into(),
        ));
    }
    if dk_len > digest.output_size() {
        return Err(PkiError::ConstraintViolation(format!(
            "derived key length {dk_len} exceeds digest length {}",
            digest.output_size()
        )));
    }

    digest.update(password);
    digest.update(salt);
    let mut t = Zeroizing::new(digest.finalize_reset().into_vec());
    for _ in 1..iterations {
        digest.update(&t);
        t = Zeroizing::new(digest.finalize_reset().into_vec());
    }
    t.truncate(dk_len);
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::{Digest, Sha1};

    #[test]
    fn test_matches_iterated_definition() {
        let password = b"password";
        let salt = [0x78, 0x57, 0x8E, 0x5A, 0x5D, 0x63, 0xCB, 0x06];

        let mut expected = Sha1::new().chain_update(password).chain_update(salt).finalize();
        for _ in 1..1000 {
            expected = Sha1::digest(expected);
        }

        let key = pbkdf1(Box::new(Sha1::new()), password, &salt, 1000, 16).unwrap();
        assert_eq!(key.as_slice(), &expected[..16]);
    }

    #[test]
    fn test_single_iteration() {
        let key = pbkdf1(Box::new(Sha1::new()), b"pw", b"saltsalt", 1, 20).unwrap();
        assert_eq!(key.as_slice(), Sha1::digest(b"pwsaltsalt").as_slice());
    }

    #[test]
    fn test_constraints() {
        assert!(pbkdf1(Box::new(Sha1::new()), b"pw", b"s", 0, 16).is_err());
        let err = pbkdf1(Box::new(Sha1::new()), b"pw", b"s", 1, 21).unwrap_err();
        assert!(matches!(err, PkiError::ConstraintViolation(_)));
    }
}
