#![no_main]
use berder_asn1::asn1::{decode_ber, decode_der};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Accepted DER re-encodes to itself.
    if let Ok(node) = decode_der(data) {
        let der = node.to_der().expect("decoded DER must re-encode");
        assert_eq!(der, data);
    }
    // BER canonicalizes to DER that decodes strictly.
    if let Ok(node) = decode_ber(data) {
        if let Ok(der) = node.to_der() {
            decode_der(&der).expect("canonical DER must decode");
        }
    }
});
