//! Permission grants carried inside an access token
//!
//! Each grant contributes one section to the `grants` claim: a fixed section
//! key plus a JSON payload. Empty strings, `false` and empty maps are left out
//! of the payload entirely.
//!
//! ```rust
//! use access_token::Grant;
//!
//! let grant = Grant::video("room-42");
//! assert_eq!(grant.key(), "video");
//! assert_eq!(grant.payload().unwrap(), serde_json::json!({ "room": "room-42" }));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

/// Section keys used inside the `grants` claim
pub mod keys {
    pub const IDENTITY: &str = "identity";
    pub const VOICE: &str = "voice";
    pub const CHAT: &str = "chat";
    pub const CONVERSATION: &str = "rtc";
    pub const VIDEO: &str = "video";
    pub const IP_MESSAGING: &str = "ip_messaging";
}

/// A permission section of an access token
#[derive(Debug, Clone, PartialEq)]
pub enum Grant {
    Voice(VoiceGrant),
    Chat(ChatGrant),
    /// Legacy video conversations
    Conversation(ConversationGrant),
    /// Room-based video
    Video(VideoGrant),
    IpMessaging(IpMessagingGrant),
}

impl Grant {
    /// Programmable voice grant
    pub fn voice(
        application_sid: impl Into<String>,
        push_credential_sid: impl Into<String>,
        endpoint_id: impl Into<String>,
        allow_incoming: bool,
        application_params: Option<Map<String, Value>>,
    ) -> Self {
        Self::Voice(VoiceGrant {
            allow_incoming,
            outgoing_application_sid: application_sid.into(),
            outgoing_application_params: application_params.unwrap_or_default(),
            push_credential_sid: push_credential_sid.into(),
            endpoint_id: endpoint_id.into(),
        })
    }

    pub fn chat(
        service_sid: impl Into<String>,
        endpoint_id: impl Into<String>,
        deployment_role_sid: impl Into<String>,
        push_credential_sid: impl Into<String>,
    ) -> Self {
        Self::Chat(ChatGrant {
            service_sid: service_sid.into(),
            endpoint_id: endpoint_id.into(),
            deployment_role_sid: deployment_role_sid.into(),
            push_credential_sid: push_credential_sid.into(),
        })
    }

    pub fn conversation(configuration_profile_sid: impl Into<String>) -> Self {
        Self::Conversation(ConversationGrant {
            configuration_profile_sid: configuration_profile_sid.into(),
        })
    }

    pub fn video(room: impl Into<String>) -> Self {
        Self::Video(VideoGrant { room: room.into() })
    }

    pub fn ip_messaging(
        service_sid: impl Into<String>,
        endpoint_id: impl Into<String>,
        deployment_role_sid: impl Into<String>,
        push_credential_sid: impl Into<String>,
    ) -> Self {
        Self::IpMessaging(IpMessagingGrant {
            service_sid: service_sid.into(),
            endpoint_id: endpoint_id.into(),
            deployment_role_sid: deployment_role_sid.into(),
            push_credential_sid: push_credential_sid.into(),
        })
    }

    /// Section key this grant occupies in the `grants` claim
    pub fn key(&self) -> &'static str {
        match self {
            Self::Voice(_) => keys::VOICE,
            Self::Chat(_) => keys::CHAT,
            Self::Conversation(_) => keys::CONVERSATION,
            Self::Video(_) => keys::VIDEO,
            Self::IpMessaging(_) => keys::IP_MESSAGING,
        }
    }

    /// JSON fragment stored under `key()`
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Voice(grant) => serde_json::to_value(grant.wire_payload()),
            Self::Chat(grant) => serde_json::to_value(grant),
            Self::Conversation(grant) => serde_json::to_value(grant),
            Self::Video(grant) => serde_json::to_value(grant),
            Self::IpMessaging(grant) => serde_json::to_value(grant),
        }
    }
}

// ============================================================================
// Voice
// ============================================================================

/// Programmable voice SDK grant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceGrant {
    allow_incoming: bool,
    outgoing_application_sid: String,
    outgoing_application_params: Map<String, Value>,
    push_credential_sid: String,
    endpoint_id: String,
}

impl VoiceGrant {
    pub fn new(application_sid: impl Into<String>) -> Self {
        Self {
            outgoing_application_sid: application_sid.into(),
            ..Default::default()
        }
    }

    pub fn allow_incoming(mut self, allow: bool) -> Self {
        self.allow_incoming = allow;
        self
    }

    pub fn with_push_credential_sid(mut self, sid: impl Into<String>) -> Self {
        self.push_credential_sid = sid.into();
        self
    }

    pub fn with_endpoint_id(mut self, endpoint_id: impl Into<String>) -> Self {
        self.endpoint_id = endpoint_id.into();
        self
    }

    /// Replace all outgoing application parameters
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.outgoing_application_params = params;
        self
    }

    /// Add a single outgoing application parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outgoing_application_params
            .insert(name.into(), value.into());
        self
    }

    pub fn application_sid(&self) -> &str {
        &self.outgoing_application_sid
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.outgoing_application_params
    }

    fn wire_payload(&self) -> VoicePayload<'_> {
        VoicePayload {
            incoming: VoiceIncoming {
                allow: self.allow_incoming,
            },
            outgoing: VoiceOutgoing {
                application_sid: &self.outgoing_application_sid,
                params: &self.outgoing_application_params,
            },
            push_credential_sid: &self.push_credential_sid,
            endpoint_id: &self.endpoint_id,
        }
    }
}

// SDKs tell direction apart by the presence of `incoming` / `outgoing`,
// so both containers are always emitted even when their fields are not.
#[derive(Serialize)]
struct VoicePayload<'a> {
    incoming: VoiceIncoming,
    outgoing: VoiceOutgoing<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    push_credential_sid: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    endpoint_id: &'a str,
}

#[derive(Serialize)]
struct VoiceIncoming {
    #[serde(skip_serializing_if = "is_false")]
    allow: bool,
}

#[derive(Serialize)]
struct VoiceOutgoing<'a> {
    #[serde(skip_serializing_if = "is_empty")]
    application_sid: &'a str,
    #[serde(skip_serializing_if = "has_no_params")]
    params: &'a Map<String, Value>,
}

fn is_empty(value: &&str) -> bool {
    value.is_empty()
}

fn has_no_params(params: &&Map<String, Value>) -> bool {
    params.is_empty()
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Chat / IP messaging
// ============================================================================

/// Chat service grant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatGrant {
    #[serde(skip_serializing_if = "String::is_empty")]
    service_sid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    endpoint_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    deployment_role_sid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    push_credential_sid: String,
}

impl ChatGrant {
    pub fn service_sid(&self) -> &str {
        &self.service_sid
    }
}

/// IP messaging grant, the predecessor of chat with the same fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpMessagingGrant {
    #[serde(skip_serializing_if = "String::is_empty")]
    service_sid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    endpoint_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    deployment_role_sid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    push_credential_sid: String,
}

impl IpMessagingGrant {
    pub fn service_sid(&self) -> &str {
        &self.service_sid
    }
}

// ============================================================================
// Video
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationGrant {
    #[serde(skip_serializing_if = "String::is_empty")]
    configuration_profile_sid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoGrant {
    #[serde(skip_serializing_if = "String::is_empty")]
    room: String,
}

impl VideoGrant {
    pub fn room(&self) -> &str {
        &self.room
    }
}

impl From<VoiceGrant> for Grant {
    fn from(grant: VoiceGrant) -> Self {
        Self::Voice(grant)
    }
}

impl From<ChatGrant> for Grant {
    fn from(grant: ChatGrant) -> Self {
        Self::Chat(grant)
    }
}

impl From<ConversationGrant> for Grant {
    fn from(grant: ConversationGrant) -> Self {
        Self::Conversation(grant)
    }
}

impl From<VideoGrant> for Grant {
    fn from(grant: VideoGrant) -> Self {
        Self::Video(grant)
    }
}

impl From<IpMessagingGrant> for Grant {
    fn from(grant: IpMessagingGrant) -> Self {
        Self::IpMessaging(grant)
    }
}
