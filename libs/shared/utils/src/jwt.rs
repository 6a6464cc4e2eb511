use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use shared_models::auth::{AccessClaims, User};

/// Decodes the claims segment of an access token issued by the auth service.
///
/// The client never holds the signing secret, so the signature is not
/// checked here; the backend re-validates the token on every request.
pub fn decode_claims(token: &str) -> Result<AccessClaims, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    match serde_json::from_str(&claims_json) {
        Ok(claims) => Ok(claims),
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            Err("Invalid claims format".to_string())
        }
    }
}

/// Builds the session user from an access token.
pub fn user_from_token(token: &str) -> Result<User, String> {
    let claims = decode_claims(token)?;

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    Ok(User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    })
}

/// Expiry instant encoded in the token, if any.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token)
        .ok()?
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single())
}
