//! HMAC signature verification for inbound webhooks.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::DeployError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded HMAC of the request body.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies the signature header against the raw request body.
///
/// The body must be the exact transmitted bytes, captured before any JSON
/// decoding; a re-serialized payload would not reproduce the signature.
/// The comparison is constant-time via `Mac::verify_slice`.
pub fn validate_signature(
    secret: &str,
    body: &[u8],
    signature_header: Option<&str>,
) -> Result<(), DeployError> {
    let header = signature_header.ok_or(DeployError::MissingSignature)?;
    let supplied_hex = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(DeployError::InvalidSignature)?;
    let supplied = hex::decode(supplied_hex).map_err(|_| DeployError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| DeployError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&supplied)
        .map_err(|_| DeployError::InvalidSignature)
}

#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}
