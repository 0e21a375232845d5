//! Error types for the outreach engine.

use thiserror::Error;
use voyager_client::{IdKind, VoyagerError};

use crate::session::CredentialScope;

/// Errors that can occur while running outreach.
///
/// Everything here except `AuthenticationExpired` is recoverable at the
/// batch level: the item is skipped and captured in its `Outcome`.
#[derive(Debug, Error)]
pub enum OutreachError {
    /// The handle could not be resolved to any reachable profile.
    #[error("could not resolve {handle}: {source}")]
    Resolution {
        handle: String,
        #[source]
        source: VoyagerError,
    },

    /// Resolution produced an identifier kind the invitation endpoint
    /// rejects. The handle should be flagged for manual follow-up.
    #[error("{handle} resolved to a non-connectable identifier ({kind:?})")]
    UnresolvedIdentity { handle: String, kind: IdKind },

    /// The session credential is absent or has been marked invalid. Fatal
    /// for the run: refresh the credential out-of-band and rerun.
    #[error(
        "session expired for account {account_id} ({scope:?}): refresh the credential and rerun"
    )]
    AuthenticationExpired {
        account_id: String,
        scope: CredentialScope,
    },
}

impl OutreachError {
    /// Whether this error must abort the whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OutreachError::AuthenticationExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_auth_expiry_is_fatal() {
        let auth = OutreachError::AuthenticationExpired {
            account_id: "acct-1".to_string(),
            scope: CredentialScope::Act,
        };
        assert!(auth.is_fatal());

        let resolution = OutreachError::Resolution {
            handle: "jane-smith".to_string(),
            source: VoyagerError::ResolutionFailed {
                handle: "jane-smith".to_string(),
            },
        };
        assert!(!resolution.is_fatal());
    }

    #[test]
    fn test_auth_expiry_message_carries_remediation() {
        let err = OutreachError::AuthenticationExpired {
            account_id: "acct-1".to_string(),
            scope: CredentialScope::Act,
        };
        let message = err.to_string();
        assert!(message.contains("acct-1"));
        assert!(message.contains("refresh the credential"));
    }
}
