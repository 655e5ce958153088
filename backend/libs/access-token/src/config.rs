//! Access token configuration
//!
//! Optional convenience for services that keep their platform credentials in
//! the environment. The builder itself never reads the environment.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use crate::error::{AccessTokenError, Result};
use crate::token::{AccessToken, JtiStrategy};

/// Prefix of the environment variables read by [`AccessTokenConfig::from_env`]
pub const ENV_PREFIX: &str = "TWILIO_";

/// Longest validity window accepted from configuration (366 days)
pub const MAX_TOKEN_TTL_SECS: i64 = 31_622_400;

/// Credentials and defaults for minting tokens
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccessTokenConfig {
    /// Account SID, emitted as `sub`
    #[validate(length(min = 1))]
    pub account_sid: String,

    /// API key SID, emitted as `iss`
    #[validate(length(min = 1))]
    pub api_key_sid: String,

    /// API key secret (HMAC key)
    pub api_key_secret: SecretString,

    /// Validity window in seconds, at most [`MAX_TOKEN_TTL_SECS`]
    #[validate(range(min = 1, max = 31622400))]
    #[serde(default = "default_ttl_secs")]
    pub token_ttl_secs: i64,

    /// End-user identity added to every token built from this config
    #[serde(default)]
    pub identity: Option<String>,

    #[serde(default)]
    pub jti_strategy: JtiStrategy,
}

fn default_ttl_secs() -> i64 {
    3600 // 1 hour
}

impl AccessTokenConfig {
    /// Load from `TWILIO_ACCOUNT_SID`, `TWILIO_API_KEY_SID`,
    /// `TWILIO_API_KEY_SECRET`, `TWILIO_TOKEN_TTL_SECS`, `TWILIO_IDENTITY`
    /// and `TWILIO_JTI_STRATEGY`.
    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed(ENV_PREFIX)
            .from_env()
            .map_err(|e| AccessTokenError::config(format!("failed to load from environment: {}", e)))?;

        config.validate_config()?;
        Ok(config)
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Err(errors) = self.validate() {
            warn!(api_key_sid = %self.api_key_sid, "Invalid access token config: {}", errors);
            return Err(AccessTokenError::config(errors.to_string()));
        }
        if self.api_key_secret.expose_secret().is_empty() {
            warn!(api_key_sid = %self.api_key_sid, "Invalid access token config: empty API key secret");
            return Err(AccessTokenError::config("api_key_secret must not be empty"));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Result<Duration> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(AccessTokenError::config(format!(
                "token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Duration::try_seconds(self.token_ttl_secs)
            .ok_or_else(|| AccessTokenError::config("token_ttl_secs out of range"))
    }

    /// Start a token builder from this configuration
    pub fn into_token(self) -> Result<AccessToken> {
        let ttl = self.ttl()?;
        let mut token = AccessToken::new(
            self.account_sid,
            self.api_key_sid,
            self.api_key_secret.expose_secret(),
            ttl,
        )
        .with_jti_strategy(self.jti_strategy);

        if let Some(identity) = self.identity {
            token.set_identity(identity);
        }
        Ok(token)
    }
}
