//! Access token builder
//!
//! Collects the account identity, signing secret, validity window and grants,
//! then mints a signed token on `sign()`. The builder keeps no state between
//! `sign()` calls: each call reads the clock afresh and returns a new token.
//!
//! ## Usage
//!
//! ```rust
//! use access_token::{AccessToken, Grant};
//! use chrono::Duration;
//!
//! let mut token = AccessToken::new("ACxxxx", "SKxxxx", "secret", Duration::hours(1));
//! token.set_identity("alice");
//! token.add_grant(Grant::video("room-42"));
//!
//! let jwt = token.sign().unwrap();
//! assert_eq!(jwt.split('.').count(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{AccessTokenError, Result};
use crate::grants::{keys, Grant};
use crate::signer::{self, Header};

/// How the suffix of the `jti` claim is generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JtiStrategy {
    /// `<api-key-sid>-<nbf>`. Not unique for two tokens minted in the same
    /// second with the same key, but what existing SDKs expect.
    #[default]
    Timestamp,
    /// `<api-key-sid>-<uuid v4>`
    Random,
}

/// Claim set of an access token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    pub grants: Map<String, Value>,
}

/// Builder for signed access tokens
///
/// Not meant for concurrent mutation; distinct builders are independent.
pub struct AccessToken {
    account_sid: String,
    api_key_sid: String,
    api_key_secret: SecretString,
    ttl: Duration,
    identity: Option<String>,
    /// Keyed by section key so a second grant of the same kind replaces the first
    grants: BTreeMap<&'static str, Grant>,
    clock: Arc<dyn Clock>,
    jti_strategy: JtiStrategy,
}

impl AccessToken {
    /// Create a builder. `ttl` is the validity window; `nbf` is the signing
    /// time and `exp` is `nbf + ttl`. The window must be a whole, positive
    /// number of seconds or `sign()` fails with a config error.
    pub fn new(
        account_sid: impl Into<String>,
        api_key_sid: impl Into<String>,
        api_key_secret: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let secret: String = api_key_secret.into();
        Self {
            account_sid: account_sid.into(),
            api_key_sid: api_key_sid.into(),
            api_key_secret: SecretString::from(secret),
            ttl,
            identity: None,
            grants: BTreeMap::new(),
            clock: Arc::new(SystemClock),
            jti_strategy: JtiStrategy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_jti_strategy(mut self, strategy: JtiStrategy) -> Self {
        self.jti_strategy = strategy;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.set_identity(identity);
        self
    }

    pub fn with_grant(mut self, grant: impl Into<Grant>) -> Self {
        self.add_grant(grant);
        self
    }

    /// Attach a grant, replacing any grant already stored under the same key
    pub fn add_grant(&mut self, grant: impl Into<Grant>) -> &mut Self {
        let grant = grant.into();
        self.grants.insert(grant.key(), grant);
        self
    }

    /// Set the end-user identity emitted as `grants.identity`
    pub fn set_identity(&mut self, identity: impl Into<String>) -> &mut Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn grant(&self, key: &str) -> Option<&Grant> {
        self.grants.get(key)
    }

    pub fn grants(&self) -> impl Iterator<Item = &Grant> {
        self.grants.values()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Assemble the claim set for the current clock reading without signing
    pub fn claims(&self) -> Result<Claims> {
        self.validate()?;

        let now = self.clock.now().timestamp();
        if now < 0 {
            return Err(AccessTokenError::config("clock reports a time before the epoch"));
        }
        let exp = now
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| AccessTokenError::config("validity window overflows"))?;

        let jti = match self.jti_strategy {
            JtiStrategy::Timestamp => format!("{}-{}", self.api_key_sid, now),
            JtiStrategy::Random => format!("{}-{}", self.api_key_sid, Uuid::new_v4().simple()),
        };

        let mut grants = Map::new();
        if let Some(identity) = self.identity.as_deref().filter(|id| !id.is_empty()) {
            grants.insert(keys::IDENTITY.to_string(), Value::from(identity));
        }
        for (key, grant) in &self.grants {
            grants.insert(key.to_string(), grant.payload()?);
        }

        Ok(Claims {
            jti,
            iss: self.api_key_sid.clone(),
            sub: self.account_sid.clone(),
            nbf: now,
            exp,
            grants,
        })
    }

    /// Mint the compact `header.claims.signature` token
    pub fn sign(&self) -> Result<String> {
        let claims = self.claims()?;
        let token = signer::sign(&Header::default(), &claims, &self.api_key_secret)?;

        debug!(
            iss = %claims.iss,
            jti = %claims.jti,
            nbf = claims.nbf,
            exp = claims.exp,
            grants = ?self.grants.keys().collect::<Vec<_>>(),
            "Minted access token"
        );

        Ok(token)
    }

    /// Alias of [`AccessToken::sign`]
    pub fn to_jwt(&self) -> Result<String> {
        self.sign()
    }

    fn validate(&self) -> Result<()> {
        let problem = if self.account_sid.is_empty() {
            Some("account SID must not be empty")
        } else if self.api_key_sid.is_empty() {
            Some("API key SID must not be empty")
        } else if self.api_key_secret.expose_secret().is_empty() {
            Some("API key secret must not be empty")
        } else if self.ttl.num_seconds() < 1 {
            Some("validity window must be at least one second")
        } else if self.ttl.subsec_nanos() != 0 {
            Some("validity window must be a whole number of seconds")
        } else {
            None
        };

        match problem {
            Some(message) => {
                warn!(iss = %self.api_key_sid, "Rejected access token configuration: {}", message);
                Err(AccessTokenError::config(message))
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("account_sid", &self.account_sid)
            .field("api_key_sid", &self.api_key_sid)
            .field("api_key_secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl.num_seconds())
            .field("identity", &self.identity)
            .field("grants", &self.grants.keys().collect::<Vec<_>>())
            .field("jti_strategy", &self.jti_strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn builder() -> AccessToken {
        AccessToken::new("AC00", "SK00", "topsecret", Duration::seconds(3600))
            .with_clock(Arc::new(FixedClock::from_timestamp(NOW).unwrap()))
    }

    #[test]
    fn test_claims_time_window_and_jti() {
        let claims = builder().with_grant(Grant::video("room-42")).claims().unwrap();

        assert_eq!(claims.jti, "SK00-1700000000");
        assert_eq!(claims.iss, "SK00");
        assert_eq!(claims.sub, "AC00");
        assert_eq!(claims.nbf, NOW);
        assert_eq!(claims.exp, NOW + 3600);
        assert_eq!(claims.grants, *json!({ "video": { "room": "room-42" } }).as_object().unwrap());
    }

    #[test]
    fn test_duplicate_grant_replaces_previous() {
        let mut token = builder();
        token.add_grant(Grant::video("r1"));
        token.add_grant(Grant::video("r2"));

        assert_eq!(token.grants().count(), 1);
        let claims = token.claims().unwrap();
        assert_eq!(claims.grants["video"], json!({ "room": "r2" }));
    }

    #[test]
    fn test_empty_identity_is_omitted() {
        let claims = builder().with_identity("").claims().unwrap();
        assert!(claims.grants.is_empty());
    }

    #[test]
    fn test_random_jti_is_prefixed_and_unique() {
        let token = builder().with_jti_strategy(JtiStrategy::Random);
        let first = token.claims().unwrap().jti;
        let second = token.claims().unwrap().jti;

        assert!(first.starts_with("SK00-"));
        assert_eq!(first.len(), "SK00-".len() + 32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_identity_fields_are_config_errors() {
        let cases = [
            AccessToken::new("", "SK00", "s", Duration::hours(1)),
            AccessToken::new("AC00", "", "s", Duration::hours(1)),
            AccessToken::new("AC00", "SK00", "", Duration::hours(1)),
        ];
        for token in cases {
            assert!(matches!(token.sign(), Err(AccessTokenError::Config(_))));
        }
    }

    #[test]
    fn test_non_positive_window_is_config_error() {
        for ttl in [Duration::zero(), Duration::seconds(-5), Duration::milliseconds(500)] {
            let token = AccessToken::new("AC00", "SK00", "s", ttl);
            assert!(matches!(token.sign(), Err(AccessTokenError::Config(_))));
        }
    }

    #[test]
    fn test_fractional_window_is_config_error() {
        for ttl in [Duration::milliseconds(1500), Duration::seconds(3600) + Duration::nanoseconds(1)] {
            let token = AccessToken::new("AC00", "SK00", "s", ttl);
            assert!(matches!(token.claims(), Err(AccessTokenError::Config(_))));
        }
    }

    #[test]
    fn test_pre_epoch_clock_is_config_error() {
        let token = builder().with_clock(Arc::new(FixedClock::from_timestamp(-10).unwrap()));
        assert!(matches!(token.claims(), Err(AccessTokenError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", builder());
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_sign_is_deterministic_for_fixed_clock() {
        let token = builder()
            .with_identity("alice")
            .with_grant(Grant::chat("IS1", "", "", ""));

        assert_eq!(token.sign().unwrap(), token.sign().unwrap());
    }
}
