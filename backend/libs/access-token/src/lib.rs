//! Access tokens for the Twilio real-time platform
//!
//! Mints HS256-signed tokens that client SDKs present to voice, video, chat
//! and messaging services. A token carries the account identity, a validity
//! window and one section per [`Grant`].
//!
//! ## Design
//!
//! - **Grants are values**: a tagged enum with a uniform `key()` / `payload()`
//!   projection, immutable once built and free to share across threads
//! - **Empty means absent**: empty strings, `false` and empty maps never
//!   reach the wire, except the voice `incoming` / `outgoing` containers
//! - **Injectable clock**: `sign()` reads the [`Clock`] once per call
//! - **Secret stays secret**: held as `SecretString`, never logged, never
//!   part of an error message
//!
//! Verification, revocation and refresh are out of scope.

pub mod clock;
pub mod config;
pub mod error;
pub mod grants;
pub mod signer;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AccessTokenConfig;
pub use error::{AccessTokenError, Result};
pub use grants::{
    ChatGrant, ConversationGrant, Grant, IpMessagingGrant, VideoGrant, VoiceGrant,
};
pub use signer::Header;
pub use token::{AccessToken, Claims, JtiStrategy};
