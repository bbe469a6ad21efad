//! Integration tests for berder.
//! Cross-crate interoperability over fixed encodings.

#[cfg(test)]
mod tests {
    use berder_asn1::asn1::{decode, decode_ber, decode_der, Decoder, EncodingRules, Node};
    use berder_asn1::oid::{known, Oid};
    use berder_pki::hash::RustCryptoDigests;
    use berder_pki::ocsp::{
        BasicOcspResponse, CertId, CertStatus, OcspResponse, OcspResponseStatus, ResponderId,
        ResponseData, SingleResponse,
    };
    use berder_pki::pkcs5::PbeParameter;
    use berder_pki::pkcs7::EncryptedData;
    use berder_pki::signature::{ProviderFn, SignatureVerifier};
    use berder_pki::AlgorithmIdentifier;
    use berder_types::{ErrorKind, PkiError};

    fn hex(s: &str) -> Vec<u8> {
        let s: String = s.split_whitespace().collect();
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    /// EncryptedData, pbeWithSHA1AndDES-CBC with salt A1..A8 and 2048
    /// iterations, 16 content octets 10..1F.
    const ENCRYPTED_DATA_DER: &str = "303F 020100 303A 06092A864886F70D010701 \
        301B 06092A864886F70D01050A 300E 0408A1A2A3A4A5A6A7A8 02020800 \
        8010 101112131415161718191A1B1C1D1E1F";

    /// The same value with indefinite lengths and the content in two segments.
    const ENCRYPTED_DATA_BER: &str = "3080 020100 3080 06092A864886F70D010701 \
        301B 06092A864886F70D01050A 300E 0408A1A2A3A4A5A6A7A8 02020800 \
        A080 04081011121314151617 040818191A1B1C1D1E1F 0000 0000 0000";

    // -------------------------------------------------------
    // 1. PKCS#7 EncryptedData with PKCS#5 parameters
    // -------------------------------------------------------
    #[test]
    fn test_encrypted_data_with_pbe_parameters() {
        let der = hex(ENCRYPTED_DATA_DER);
        let ed = EncryptedData::from_der(&der).unwrap();
        assert_eq!(ed.version(), 0);
        assert_eq!(ed.content_type().to_string(), "1.2.840.113549.1.7.1");
        assert_eq!(ed.content(), Some((0x10..0x20).collect::<Vec<u8>>()));

        let alg = ed.encryption_algorithm();
        assert_eq!(*alg.algorithm(), known::pbe_with_sha1_and_des_cbc());
        let pbe = PbeParameter::from_node(alg.parameters().unwrap()).unwrap();
        assert_eq!(pbe.salt(), hex("A1A2A3A4A5A6A7A8"));
        assert_eq!(pbe.iteration_count(), 2048);

        // DES key and IV come from one 16-byte PBKDF1-SHA1 output.
        let key = pbe
            .derive_key_pbkdf1(b"password", "SHA-1", &RustCryptoDigests, 16)
            .unwrap();
        assert_eq!(key.len(), 16);

        assert_eq!(ed.to_der().unwrap(), der);
        assert_eq!(EncryptedData::from_any(&decode_der(&der).unwrap()).unwrap(), ed);
    }

    // -------------------------------------------------------
    // 2. BER input canonicalized to DER
    // -------------------------------------------------------
    #[test]
    fn test_encrypted_data_ber_to_der() {
        let ber = hex(ENCRYPTED_DATA_BER);
        let err = EncryptedData::from_der(&ber).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);

        let ed = EncryptedData::from_ber(&ber).unwrap();
        assert_eq!(ed.content(), Some((0x10..0x20).collect::<Vec<u8>>()));
        assert_eq!(ed.to_der().unwrap(), hex(ENCRYPTED_DATA_DER));
        assert_eq!(ed.to_ber().unwrap(), ber);
    }

    #[test]
    fn test_generic_ber_canonicalization() {
        // Non-minimal length, non-minimal INTEGER and an unsorted SET.
        let ber = hex("3181 08 0203 000001 0101 FF");
        let node = decode_ber(&ber).unwrap();
        assert!(decode_der(&ber).is_err());
        assert_eq!(node.to_der().unwrap(), hex("3106 0101FF 020101"));

        let der = node.to_der().unwrap();
        assert_eq!(decode_der(&der).unwrap().to_der().unwrap(), der);
    }

    #[test]
    fn test_decoder_config() {
        let data = hex("0500 0500");
        assert!(decode(&data, EncodingRules::Der).is_err());

        let config = berder_asn1::asn1::DecoderConfig::builder()
            .rules(EncodingRules::Der)
            .allow_trailing(true)
            .build();
        let node = Decoder::new(config).decode(&data).unwrap();
        assert_eq!(node, Node::null());

        let nested = hex("3004 3002 3000");
        let shallow = berder_asn1::asn1::DecoderConfig::builder().max_depth(1).build();
        assert!(Decoder::new(shallow).decode(&nested).is_err());
    }

    // -------------------------------------------------------
    // 3. OID round-trip
    // -------------------------------------------------------
    #[test]
    fn test_oid_roundtrip() {
        let oid: Oid = "1.2.840.113549.1.7.6".parse().unwrap();
        assert_eq!(oid, known::pkcs7_encrypted_data());
        let der = Node::oid(&oid).to_der().unwrap();
        assert_eq!(der, hex("0609 2A864886F70D010706"));
        assert_eq!(decode_der(&der).unwrap().as_oid().unwrap(), oid);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.7.6");
    }

    // -------------------------------------------------------
    // 4. OCSP envelope with an injected verifier lookup
    // -------------------------------------------------------
    /// Accepts signatures that equal the last 8 octets of the message.
    struct TailVerifier;

    impl SignatureVerifier for TailVerifier {
        fn verify(&self, _key: &[u8], message: &[u8], sig: &[u8]) -> Result<bool, PkiError> {
            Ok(message.len() >= 8 && &message[message.len() - 8..] == sig)
        }
    }

    static TAIL: TailVerifier = TailVerifier;

    fn lookup(oid: &Oid) -> Option<&'static dyn SignatureVerifier> {
        (*oid == known::ecdsa_with_sha256()).then_some(&TAIL as &dyn SignatureVerifier)
    }

    fn tail_signed_response() -> BasicOcspResponse {
        let cert_id = CertId::new(
            AlgorithmIdentifier::with_null_params(known::sha1()),
            vec![0xAA; 20],
            vec![0xBB; 20],
            &[0x10, 0x00],
        );
        let data = ResponseData::new(
            ResponderId::ByKey(vec![0xBB; 20]),
            1_600_000_000,
            vec![SingleResponse::new(cert_id, CertStatus::Unknown, 1_600_000_000)],
            None,
        );
        let tbs = data.to_der().unwrap();
        let sig = tbs[tbs.len() - 8..].to_vec();
        BasicOcspResponse::new(
            data,
            AlgorithmIdentifier::new(known::ecdsa_with_sha256(), None),
            sig,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_ocsp_envelope_roundtrip_and_verify() {
        let envelope = OcspResponse::successful(tail_signed_response()).unwrap();
        let der = envelope.to_der().unwrap();

        let parsed = OcspResponse::from_der(&der).unwrap();
        assert_eq!(parsed.status(), OcspResponseStatus::Successful);
        let resp = parsed.basic().unwrap();
        assert_eq!(resp.version(), 1);
        assert_eq!(resp.produced_at_raw(), "20200913122640Z");
        assert_eq!(resp.responses()[0].cert_status(), &CertStatus::Unknown);
        assert!(resp.verify(&[], &ProviderFn(lookup)).unwrap());
        assert_eq!(parsed.to_der().unwrap(), der);
    }

    #[test]
    fn test_ocsp_tampered_and_unknown_algorithm() {
        let resp = tail_signed_response();
        let mut der = resp.to_der().unwrap();
        // producedAt seconds digit.
        let pos = der
            .windows(15)
            .position(|w| w == b"20200913122640Z")
            .unwrap();
        der[pos + 13] = b'1';
        let tampered = BasicOcspResponse::from_der(&der).unwrap();
        assert!(!tampered.verify(&[], &ProviderFn(lookup)).unwrap());

        let rsa = BasicOcspResponse::new(
            resp.tbs_response_data().clone(),
            AlgorithmIdentifier::with_null_params(known::sha256_with_rsa_encryption()),
            resp.signature().to_vec(),
            vec![],
        )
        .unwrap();
        let err = rsa.verify(&[], &ProviderFn(lookup)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    // -------------------------------------------------------
    // 5. Error kinds across layers
    // -------------------------------------------------------
    #[test]
    fn test_error_kinds_across_layers() {
        let truncated = hex("3010 0201");
        let err = EncryptedData::from_der(&truncated).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);

        let not_sequence = Node::oid(&known::pkcs7_data()).to_der().unwrap();
        let err = PbeParameter::from_der(&not_sequence).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let err = PbeParameter::new(&[0; 4], 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }
}
