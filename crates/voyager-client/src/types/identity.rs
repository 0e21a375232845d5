//! Profile identity types.

use serde::{Deserialize, Serialize};

/// The kind of platform-internal identifier a profile resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdKind {
    /// No identifier yet.
    Unresolved,
    /// Numeric member id from a `urn:li:member:` URN. The only kind the
    /// invitation endpoint accepts.
    MemberId,
    /// Alphanumeric id from a `urn:li:fsd_profile:` URN. Read endpoints
    /// accept it; the invitation endpoint rejects it.
    OpaqueProfileId,
}

/// A target person, keyed by their public profile handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIdentity {
    /// Human-readable profile slug (e.g., "john-doe-123"). Stable; used
    /// as the dedupe key upstream.
    pub handle: String,
    /// Platform-internal identifier, absent until resolved.
    pub canonical_id: Option<String>,
    /// Which kind of identifier `canonical_id` is.
    pub kind: IdKind,
    /// Tracking id found near the identifier in the rendered page, if any.
    pub tracking_id: Option<String>,
}

impl ProfileIdentity {
    /// Create an unresolved identity for a handle.
    pub fn unresolved(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            canonical_id: None,
            kind: IdKind::Unresolved,
            tracking_id: None,
        }
    }

    /// Create an identity resolved to a numeric member id.
    pub fn member(handle: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            canonical_id: Some(member_id.into()),
            kind: IdKind::MemberId,
            tracking_id: None,
        }
    }

    /// Create an identity resolved to an opaque profile id.
    pub fn opaque(handle: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            canonical_id: Some(profile_id.into()),
            kind: IdKind::OpaqueProfileId,
            tracking_id: None,
        }
    }

    /// Attach a tracking id.
    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    /// Whether this identity can be submitted to the invitation endpoint.
    pub fn connectable(&self) -> bool {
        self.kind == IdKind::MemberId && self.canonical_id.is_some()
    }

    /// The numeric member id, if this identity carries one.
    pub fn member_id(&self) -> Option<&str> {
        if self.kind == IdKind::MemberId {
            self.canonical_id.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_identity_is_connectable() {
        let identity = ProfileIdentity::member("jane-smith", "12345");
        assert!(identity.connectable());
        assert_eq!(identity.member_id(), Some("12345"));
    }

    #[test]
    fn test_opaque_identity_is_not_connectable() {
        let identity = ProfileIdentity::opaque("jane-smith", "ACoAAB12345");
        assert!(!identity.connectable());
        assert_eq!(identity.member_id(), None);
        assert_eq!(identity.canonical_id.as_deref(), Some("ACoAAB12345"));
    }

    #[test]
    fn test_unresolved_identity_is_not_connectable() {
        let identity = ProfileIdentity::unresolved("jane-smith");
        assert!(!identity.connectable());
        assert_eq!(identity.kind, IdKind::Unresolved);
    }

    #[test]
    fn test_with_tracking_id() {
        let identity = ProfileIdentity::member("jane-smith", "12345").with_tracking_id("trk_1");
        assert_eq!(identity.tracking_id.as_deref(), Some("trk_1"));
    }
}
