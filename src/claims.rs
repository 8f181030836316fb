//! Best-effort expiry extraction from compact JWTs
//!
//! The guard never verifies token signatures; it only needs the `exp`
//! claim to decide when a proactive re-login is due. A token whose
//! payload cannot be decoded simply has no known expiry and stays in use
//! until the target rejects it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RegisteredClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode the `exp` claim of a compact three-segment token, returned in
/// epoch milliseconds.
///
/// Returns 0 when the value is not a three-segment token, the payload is
/// not URL-safe base64 JSON, or the claim is absent. This path is an
/// optimization, not a correctness requirement; failures never propagate.
pub fn decode_expiry_millis(token: &str) -> i64 {
    try_decode_expiry(token).unwrap_or(0)
}

fn try_decode_expiry(token: &str) -> Option<i64> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    // JWT payloads are unpadded, but tolerate padded input
    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .ok()?;
    let claims: RegisteredClaims = serde_json::from_slice(&payload).ok()?;

    claims.exp.map(|exp| exp.saturating_mul(1000))
}
