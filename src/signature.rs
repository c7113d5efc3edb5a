//! HMAC-SHA256 signatures of event notification bodies (`X-Hub-Signature-256` header).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the `X-Hub-Signature-256` header value preceding the hex digest.
pub const PREFIX: &str = "sha256=";

/// Computes the lowercase hex HMAC-SHA256 digest of `raw_body` keyed with `secret`.
pub fn compute_signature(secret: impl AsRef<[u8]>, raw_body: impl AsRef<[u8]>) -> String {
    // `Hmac` accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_ref()).unwrap();
    mac.update(raw_body.as_ref());
    hex::encode(mac.finalize().into_bytes())
}

/// Returns whether `expected_hex` is exactly the lowercase hex digest of `raw_body`.
///
/// The comparison is case-sensitive and runs in constant time with respect to the contents of the
/// digests.
pub fn signatures_match(
    expected_hex: &str,
    raw_body: impl AsRef<[u8]>,
    secret: impl AsRef<[u8]>,
) -> bool {
    let actual = compute_signature(secret, raw_body);
    actual.as_bytes().ct_eq(expected_hex.as_bytes()).into()
}

/// Strips the `sha256=` prefix from a header value, if any.
///
/// Only a leading prefix is removed. `sha256=` appearing anywhere else in the value is kept, so
/// such a value simply fails to match the computed digest.
pub fn strip_prefix(header_value: &str) -> &str {
    header_value.strip_prefix(PREFIX).unwrap_or(header_value)
}

/// Formats a complete `X-Hub-Signature-256` header value the way the platform sends it.
pub fn header_value(secret: impl AsRef<[u8]>, raw_body: impl AsRef<[u8]>) -> String {
    format!("{}{}", PREFIX, compute_signature(secret, raw_body))
}
