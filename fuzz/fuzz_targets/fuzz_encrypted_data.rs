#![no_main]
use berder_pki::pkcs5::PbeParameter;
use berder_pki::pkcs7::EncryptedData;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(ed) = EncryptedData::from_ber(data) {
        let der = ed.to_der().expect("parsed EncryptedData must encode");
        let canonical = EncryptedData::from_der(&der).expect("canonical EncryptedData must parse");
        assert_eq!(canonical, ed);
        assert_eq!(canonical.to_der().expect("re-encode"), der);
        if let Some(params) = ed.encryption_algorithm().parameters() {
            let _ = PbeParameter::from_node(params);
        }
    }
    let _ = PbeParameter::from_der(data);
});
