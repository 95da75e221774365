// Request signature verification
//
// Clients sign the query string of a transform request with a shared secret.
// The signature travels in the `s` parameter as lowercase hex of
// HMAC-SHA256(secret, canonical_query), where canonical_query is every other
// parameter, sorted by key and form-encoded.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::borrow::Cow;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the signature
pub const SIGNATURE_PARAM: &str = "s";

/// Why a request signature was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing request signature")]
    MissingSignature,

    #[error("request signature is not valid hex")]
    MalformedSignature,

    #[error("request signature does not match")]
    InvalidSignature,
}

impl SignatureError {
    /// Label used for `signature_rejections_total{reason}`
    pub fn reason(&self) -> &'static str {
        match self {
            SignatureError::MissingSignature => "missing",
            SignatureError::MalformedSignature => "malformed",
            SignatureError::InvalidSignature => "invalid",
        }
    }
}

/// Verifies HMAC-SHA256 request signatures against a shared secret
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify the `s` parameter of a raw (still percent-encoded) query string
    pub fn verify(&self, raw_query: &str) -> Result<(), SignatureError> {
        let pairs = parse_query(raw_query);

        let provided = pairs
            .iter()
            .find(|(key, _)| key.as_slice() == SIGNATURE_PARAM.as_bytes())
            .map(|(_, value)| value.as_slice())
            .filter(|value| !value.is_empty())
            .ok_or(SignatureError::MissingSignature)?;

        let provided = hex::decode(provided).map_err(|_| SignatureError::MalformedSignature)?;

        let canonical = canonical_query(pairs);
        let mut mac = self.mac();
        mac.update(canonical.as_bytes());

        // verify_slice compares in constant time
        mac.verify_slice(&provided)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// Compute the hex signature for a query string
    ///
    /// Any `s` parameter already present is ignored, so the result can be
    /// appended as `&s=<signature>` to produce a verifiable request.
    pub fn sign(&self, raw_query: &str) -> String {
        let canonical = canonical_query(parse_query(raw_query));
        let mut mac = self.mac();
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }
}

/// Verify a query string against a secret without keeping a verifier around
pub fn verify(raw_query: &str, secret: &str) -> Result<(), SignatureError> {
    SignatureVerifier::new(secret).verify(raw_query)
}

/// Sign a query string with a secret
pub fn sign(raw_query: &str, secret: &str) -> String {
    SignatureVerifier::new(secret).sign(raw_query)
}

/// Split an `application/x-www-form-urlencoded` string into decoded pairs
///
/// `+` decodes to a space and a pair without `=` has an empty value.
/// Decoding works on bytes so non-UTF-8 escapes survive re-encoding unchanged.
fn parse_query(raw_query: &str) -> Vec<(Vec<u8>, Vec<u8>)> {
    raw_query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            (form_decode(key), form_decode(value))
        })
        .collect()
}

fn form_decode(input: &str) -> Vec<u8> {
    let spaced = input.replace('+', " ");
    urlencoding::decode_binary(spaced.as_bytes()).into_owned()
}

fn form_encode(input: &[u8]) -> String {
    match urlencoding::encode_binary(input) {
        Cow::Borrowed(unchanged) => unchanged.to_string(),
        // encode_binary escapes '%' itself, so %20 can only come from a space
        Cow::Owned(encoded) => encoded.replace("%20", "+"),
    }
}

/// Build the string that gets signed: all pairs except `s`, sorted by key
///
/// The sort is stable so repeated keys keep their order of appearance.
fn canonical_query(mut pairs: Vec<(Vec<u8>, Vec<u8>)>) -> String {
    pairs.retain(|(key, _)| key.as_slice() != SIGNATURE_PARAM.as_bytes());
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
