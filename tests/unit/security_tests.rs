// Request signing and address policy tests through the public API

use kitsune::security::signature::{sign, verify};
use kitsune::security::{AddressPolicy, SignatureError, SignatureVerifier};
use std::net::IpAddr;

#[test]
fn test_free_functions_match_verifier() {
    let query = "path=photos/a.jpg&width=200&height=100";
    let verifier = SignatureVerifier::new("secret");

    assert_eq!(sign(query, "secret"), verifier.sign(query));

    let signed = format!("{}&s={}", query, sign(query, "secret"));
    assert_eq!(verify(&signed, "secret"), Ok(()));
    assert_eq!(verifier.verify(&signed), Ok(()));
}

#[test]
fn test_signature_position_in_query_is_irrelevant() {
    let query = "width=200&path=photos/a.jpg";
    let signature = sign(query, "secret");

    let front = format!("s={}&path=photos/a.jpg&width=200", signature);
    assert_eq!(verify(&front, "secret"), Ok(()));
}

#[test]
fn test_encoded_and_plus_spaces_sign_identically() {
    let signature = sign("path=my%20photo.jpg&width=10", "secret");
    let query = format!("path=my+photo.jpg&width=10&s={}", signature);
    assert_eq!(verify(&query, "secret"), Ok(()));
}

#[test]
fn test_signature_is_lowercase_hex_sha256() {
    let signature = sign("width=1", "secret");
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_rejection_kinds() {
    assert_eq!(
        verify("path=a.jpg", "secret"),
        Err(SignatureError::MissingSignature)
    );
    assert_eq!(
        verify("path=a.jpg&s=xyz", "secret"),
        Err(SignatureError::MalformedSignature)
    );
    assert_eq!(
        verify("path=a.jpg&s=00ff", "secret"),
        Err(SignatureError::InvalidSignature)
    );
}

#[test]
fn test_address_policy_requires_all_public() {
    let policy = AddressPolicy::default();
    let mixed: Vec<IpAddr> = vec!["8.8.8.8".parse().unwrap(), "192.168.1.1".parse().unwrap()];
    let public: Vec<IpAddr> = vec!["8.8.8.8".parse().unwrap(), "1.1.1.1".parse().unwrap()];

    assert!(policy.first_blocked(&mixed).is_some());
    assert!(policy.first_blocked(&public).is_none());
}
