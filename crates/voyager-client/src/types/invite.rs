//! Wire types for the invitation and profile lookup endpoints.

use serde::{Deserialize, Serialize};

/// Payload for `POST /voyager/api/growth/normInvitations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitePayload {
    ember_entity_name: &'static str,

    invitee: Invitee,

    /// Optional custom note attached to the invitation.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    /// Tracking id scraped from the profile page.
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_id: Option<String>,
}

impl InvitePayload {
    /// Build a payload for a numeric member id.
    pub fn for_member(member_id: impl Into<String>) -> Self {
        Self {
            ember_entity_name: "growth/invitation/norm-invitation",
            invitee: Invitee {
                profile: InviteeProfile {
                    profile_id: member_id.into(),
                },
            },
            message: None,
            tracking_id: None,
        }
    }

    /// Attach a custom note.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a tracking id.
    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }
}

/// Invitee wrapper; the key is the union discriminator the endpoint
/// expects.
#[derive(Debug, Clone, Serialize)]
struct Invitee {
    #[serde(rename = "com.linkedin.voyager.growth.invitation.InviteeProfile")]
    profile: InviteeProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteeProfile {
    profile_id: String,
}

/// Raw invitation response. Interpreting status and body is the
/// classifier's job, not the client's.
#[derive(Debug, Clone)]
pub struct InviteResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, possibly empty or non-JSON.
    pub body: String,
}

/// Profile lookup response from the identity endpoint.
///
/// The endpoint is loosely typed; every field defaults so unknown shapes
/// deserialize instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLookup {
    /// Profile entity URN (e.g., "urn:li:fsd_profile:ACoAAB...").
    #[serde(default)]
    pub entity_urn: Option<String>,

    /// Member object URN (e.g., "urn:li:member:12345").
    #[serde(default)]
    pub object_urn: Option<String>,

    /// The public handle this record belongs to.
    #[serde(default)]
    pub public_identifier: Option<String>,
}

impl ProfileLookup {
    /// Extract the opaque profile id from the entity URN, if present.
    pub fn opaque_id(&self) -> Option<&str> {
        let urn = self.entity_urn.as_deref()?;
        urn.strip_prefix("urn:li:fsd_profile:")
            .or_else(|| urn.strip_prefix("urn:li:fs_profile:"))
    }

    /// Extract the numeric member id from the object URN, if present.
    pub fn member_id(&self) -> Option<&str> {
        self.object_urn.as_deref()?.strip_prefix("urn:li:member:")
    }
}
