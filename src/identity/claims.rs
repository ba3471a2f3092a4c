//! Unverified bearer-token payload decoding.
//!
//! The backend issues JWTs carrying the WS-Federation claim URIs for identity.
//! Nothing here checks the signature: the values only personalise what the user
//! sees and must never gate an access decision. The backend enforces authorization.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::error::TokenDecodeError;

pub const CLAIM_ID: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
pub const CLAIM_NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
pub const CLAIM_EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
pub const CLAIM_PHONE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/mobilephone";
pub const CLAIM_ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
pub const CLAIM_EXPIRY: &str = "exp";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<String>,
}

/// Everything read from one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub claims: IdentityClaims,
    /// Absent when the token carries no `exp`; such a token never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` when the token has no role claim at all, as opposed to an empty list.
    pub roles_claim: Option<Vec<String>>,
}

impl IdentityClaims {
    /// Merge claims read from a newer token.
    ///
    /// Contact fields are always replaced. The role list is replaced only when its
    /// length changes, so a token swapping one role for another of the same count
    /// keeps the previous list.
    pub fn apply(&mut self, decoded: &DecodedToken) {
        self.id = decoded.claims.id.clone();
        self.name = decoded.claims.name.clone();
        self.email = decoded.claims.email.clone();
        self.phone = decoded.claims.phone.clone();
        if let Some(roles) = &decoded.roles_claim {
            if roles.len() != self.roles.len() {
                self.roles = roles.clone();
            }
        }
    }

    /// Key the backend accepts on `/users/{identifier}`: email first, then phone.
    pub fn lookup_identifier(&self) -> Option<&str> {
        self.email.as_deref().or(self.phone.as_deref())
    }
}

/// Decode the payload segment into its JSON object.
pub fn decode_payload(token: &str) -> Result<Map<String, Value>, TokenDecodeError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenDecodeError::Segments(parts.len()));
    }
    // issuers differ on padding; accept both
    let segment = parts[1].trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(segment)?;
    let map: Map<String, Value> = serde_json::from_slice(&bytes)?;
    Ok(map)
}

pub fn decode(token: &str) -> Result<DecodedToken, TokenDecodeError> {
    let payload = decode_payload(token)?;
    let roles_claim = payload.get(CLAIM_ROLE).and_then(string_list);
    let claims = IdentityClaims {
        id: string_claim(&payload, CLAIM_ID),
        name: string_claim(&payload, CLAIM_NAME),
        email: string_claim(&payload, CLAIM_EMAIL),
        phone: string_claim(&payload, CLAIM_PHONE),
        roles: roles_claim.clone().unwrap_or_default(),
    };
    Ok(DecodedToken { claims, expires_at: expiry(&payload), roles_claim })
}

/// Expiry check used before every request.
///
/// Undecodable tokens count as expired so the caller attempts a refresh rather than
/// sending garbage. Tokens without `exp` are treated as non-expiring. A leeway that
/// pushes `now` past the representable range counts as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>, leeway: Duration) -> bool {
    match decode_payload(token) {
        Ok(payload) => match expiry(&payload) {
            Some(exp) => now.checked_add_signed(leeway).map_or(true, |deadline| deadline > exp),
            None => false,
        },
        Err(e) => {
            tracing::warn!(target: "pantry::identity", "cannot decode access token: {}", e);
            true
        }
    }
}

fn string_claim(payload: &Map<String, Value>, name: &str) -> Option<String> {
    payload.get(name).and_then(|v| v.as_str()).map(|s| s.to_string())
}

// single-role tokens carry a bare string instead of an array
fn string_list(v: &Value) -> Option<Vec<String>> {
    match v {
        Value::Array(items) => Some(items.iter().filter_map(|i| i.as_str().map(|s| s.to_string())).collect()),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

fn expiry(payload: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let secs = match payload.get(CLAIM_EXPIRY)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    DateTime::from_timestamp(whole, nanos)
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod claims_tests;
