#![forbid(unsafe_code)]
#![doc = "Typed PKCS#5, PKCS#7 and OCSP structures over the berder ASN.1 value tree."]

#[macro_use]
mod macros;
mod schema;

pub mod algorithm;
pub mod cert;
pub mod hash;
pub mod ocsp;
pub mod pkcs5;
pub mod pkcs7;
pub mod signature;

pub use algorithm::AlgorithmIdentifier;
pub use berder_types::{ErrorKind, PkiError};
