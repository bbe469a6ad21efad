#![no_main]
use berder_pki::ocsp::{BasicOcspResp, OcspResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(resp) = OcspResponse::from_der(data) {
        let _ = resp.basic().map(|b| b.responses());
    }
    if let Ok(resp) = BasicOcspResp::from_ber(data) {
        let _ = resp.tbs_response_data();
        let _ = resp.produced_at_raw();
        let _ = resp.critical_extension_oids();
        let _ = resp.certs_der();
    }
});
