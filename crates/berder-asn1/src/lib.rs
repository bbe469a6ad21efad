#![forbid(unsafe_code)]
#![doc = "ASN.1 value tree, BER/DER codec, tagged-object resolution and OIDs."]

pub mod asn1;
pub mod oid;
