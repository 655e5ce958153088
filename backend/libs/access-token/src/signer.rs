//! HS256 compact signing
//!
//! `base64url(header) . base64url(claims) . base64url(HMAC-SHA256(secret, H.P))`,
//! all segments without padding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{AccessTokenError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";
pub const TOKEN_TYPE: &str = "JWT";
/// Content type marking the platform-specific token variant
pub const CONTENT_TYPE: &str = "twilio-fpa;v=1";

/// Fixed JOSE header of every access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub alg: &'static str,
    pub typ: &'static str,
    pub cty: &'static str,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: ALGORITHM,
            typ: TOKEN_TYPE,
            cty: CONTENT_TYPE,
        }
    }
}

/// Serialize header and claims, then sign them into the compact form
pub fn sign<C: Serialize>(header: &Header, claims: &C, secret: &SecretString) -> Result<String> {
    let header_b64 = BASE64_URL.encode(serde_json::to_vec(header)?);
    let claims_b64 = BASE64_URL.encode(serde_json::to_vec(claims)?);

    let message = format!("{}.{}", header_b64, claims_b64);
    let signature_b64 = BASE64_URL.encode(compute_signature(secret, &message)?);

    Ok(format!("{}.{}", message, signature_b64))
}

/// Raw HMAC-SHA256 over the signing input
pub(crate) fn compute_signature(secret: &SecretString, message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| AccessTokenError::Internal(format!("HMAC key setup failed: {}", e)))?;
    mac.update(message.as_bytes());

    Ok(mac.finalize().into_bytes().to_vec())
}
