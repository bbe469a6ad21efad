//! End-to-end OCSP signing and verification with Ed25519 keys from `ring`.

#![cfg(all(feature = "ring", feature = "rustcrypto"))]

use berder_asn1::asn1::Node;
use berder_asn1::oid::known;
use berder_pki::hash::RustCryptoDigests;
use berder_pki::ocsp::{
    BasicOcspResp, BasicOcspResponse, CertId, CertStatus, OcspResponse, ResponderId,
    ResponseData, SingleResponse,
};
use berder_pki::signature::{Ed25519Signer, RingProvider};
use berder_pki::{ErrorKind, PkiError};
use berder_types::HashAlgId;

const SEED: [u8; 32] = [
    0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
    0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
    0x7f, 0x60,
];
const PRODUCED_AT: i64 = 1_717_200_000;

fn issuer_name() -> Node {
    Node::sequence(vec![Node::set(vec![Node::sequence(vec![
        Node::oid(&"2.5.4.3".parse().unwrap()),
        Node::utf8_string("Example Issuing CA"),
    ])])])
}

fn signed_response(signer: &Ed25519Signer) -> Result<BasicOcspResponse, PkiError> {
    let name_der = issuer_name().to_der()?;
    let cert_id = CertId::for_issuer(
        HashAlgId::Sha1,
        &name_der,
        &signer.public_key(),
        &[0x01, 0x02, 0x03],
        &RustCryptoDigests,
    )?;
    let single = SingleResponse::new(cert_id, CertStatus::Good, PRODUCED_AT)
        .with_next_update(PRODUCED_AT + 7 * 86_400);
    let data = ResponseData::new(
        ResponderId::ByName(issuer_name()),
        PRODUCED_AT,
        vec![single],
        None,
    );
    BasicOcspResponse::sign(data, signer.algorithm(), signer, vec![])
}

#[test]
fn test_signed_response_verifies() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let der = signed_response(&signer).unwrap().to_der().unwrap();

    let resp = BasicOcspResp::from_der(&der).unwrap();
    assert_eq!(resp.signature_alg_oid(), known::ed25519().to_string());
    assert_eq!(resp.signature().len(), 64);
    assert!(resp.verify(&signer.public_key(), &RingProvider).unwrap());

    let name_der = issuer_name().to_der().unwrap();
    let single = &resp.responses()[0];
    assert!(single
        .cert_id()
        .matches(&name_der, &signer.public_key(), &[0x01, 0x02, 0x03], &RustCryptoDigests)
        .unwrap());
}

#[test]
fn test_flipped_payload_byte_fails() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let mut der = signed_response(&signer).unwrap().to_der().unwrap();

    // The last byte of the CA name inside the responder ID.
    let needle = b"Example Issuing CA";
    let pos = der
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    der[pos + needle.len() - 1] ^= 0x01;

    let resp = BasicOcspResp::from_der(&der).unwrap();
    assert!(!resp.verify(&signer.public_key(), &RingProvider).unwrap());
}

#[test]
fn test_flipped_signature_byte_fails() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let mut der = signed_response(&signer).unwrap().to_der().unwrap();
    // The signature BIT STRING ends the encoding when no certs are carried.
    let last = der.len() - 1;
    der[last] ^= 0x80;

    let resp = BasicOcspResp::from_der(&der).unwrap();
    assert!(!resp.verify(&signer.public_key(), &RingProvider).unwrap());
}

#[test]
fn test_wrong_key_fails() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let other = Ed25519Signer::from_seed(&[0x07; 32]).unwrap();
    let resp = BasicOcspResp::from(signed_response(&signer).unwrap());
    assert!(!resp.verify(&other.public_key(), &RingProvider).unwrap());
}

#[test]
fn test_ber_envelope_verifies_over_der() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let basic = signed_response(&signer).unwrap();
    let ber = basic.to_node().into_indefinite().to_ber().unwrap();
    let envelope = Node::sequence(vec![
        Node::enumerated(0),
        Node::explicit(
            0,
            Node::sequence(vec![Node::oid(&known::ocsp_basic()), Node::octet_string(ber)]),
        ),
    ])
    .into_indefinite();

    let parsed = OcspResponse::from_ber(&envelope.to_ber().unwrap()).unwrap();
    let resp = parsed.basic().unwrap();
    assert!(resp.verify(&signer.public_key(), &RingProvider).unwrap());
    assert_eq!(resp.tbs_response_data().unwrap(), basic.tbs_response_data().to_der().unwrap());
}

#[test]
fn test_unsupported_signature_algorithm() {
    let signer = Ed25519Signer::from_seed(&SEED).unwrap();
    let basic = signed_response(&signer).unwrap();
    let md5_rsa = berder_pki::AlgorithmIdentifier::with_null_params(
        "1.2.840.113549.1.1.4".parse().unwrap(),
    );
    let relabelled = BasicOcspResponse::new(
        basic.tbs_response_data().clone(),
        md5_rsa,
        basic.signature().to_vec(),
        vec![],
    )
    .unwrap();
    let err = relabelled
        .verify(&signer.public_key(), &RingProvider)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
}
