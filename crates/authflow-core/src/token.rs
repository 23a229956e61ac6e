//! Bearer token expiry inspection.
//!
//! The codec reads the `exp` claim out of a JWT payload without verifying the
//! signature. Authenticity is the server's concern; the client only needs to
//! know whether a stored token is still worth presenting. The fail-safe
//! default is load-bearing: a token that cannot be decoded is always reported
//! as expired, never as valid.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The claims this codec cares about. Everything else in the payload is
/// ignored.
#[derive(Debug, Deserialize)]
struct Payload {
    /// Expiration timestamp, seconds since epoch.
    #[serde(default)]
    exp: Option<u64>,
}

/// Decode the middle JWT segment into a [`Payload`].
///
/// Returns `None` for anything that is not a three-segment token with a
/// base64url-encoded JSON payload.
fn decode_payload(token: &str) -> Option<Payload> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Check whether a token is expired as of now.
///
/// A token without an `exp` claim never expires. A token that fails to
/// decode is expired.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Check whether a token is expired as of the given instant.
///
/// This is the deterministic form of [`is_expired`] used by tests and by
/// callers that batch-evaluate against a single clock reading.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_payload(token) {
        Some(payload) => match payload.exp {
            Some(exp) => now.timestamp() >= i64::try_from(exp).unwrap_or(i64::MAX),
            None => false,
        },
        None => {
            tracing::debug!("token payload failed to decode, treating as expired");
            true
        }
    }
}

/// Read the expiry instant out of a token, if it has one and decodes.
#[must_use]
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_payload(token)?.exp?;
    DateTime::from_timestamp(i64::try_from(exp).ok()?, 0)
}
