//! PKCS#7 content types.

mod encrypted;

pub use encrypted::{EncryptedContentInfo, EncryptedData, EncryptedDataInput};
