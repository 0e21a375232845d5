//! Session credentials and the guard that owns them.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::OutreachError;

/// Access scope of a credential.
///
/// Read-only browsing and write actions carry different risk profiles and
/// are distinct credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialScope {
    /// Read endpoints only (profile pages, lookups).
    Read,
    /// Write actions (invitations, messages).
    Act,
}

/// One account's session credential for one scope.
#[derive(Clone)]
pub struct Credential {
    /// Account this credential belongs to.
    pub account_id: String,
    /// Scope it is valid for.
    pub scope: CredentialScope,
    /// Session cookie value. Never logged, never copied into outcomes.
    pub token: String,
    /// When the credential was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential obtained now.
    pub fn new(
        account_id: impl Into<String>,
        scope: CredentialScope,
        token: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            scope,
            token: token.into(),
            obtained_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Credential {
    // Token redacted: credentials must never leak into logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account_id", &self.account_id)
            .field("scope", &self.scope)
            .field("token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Supplies session credentials.
///
/// The surrounding application owns acquisition (cookie store, manual
/// login); the engine only consumes what this trait hands out.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// The current credential for an account and scope, if one exists.
    async fn credential(&self, account_id: &str, scope: CredentialScope) -> Option<Credential>;
}

/// A fixed in-memory credential source for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    tokens: HashMap<(String, CredentialScope), String>,
}

impl StaticCredentialSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with one token covering both scopes of an account.
    pub fn single(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        let account_id = account_id.into();
        let token = token.into();
        let mut source = Self::new();
        source.insert(account_id.clone(), CredentialScope::Read, token.clone());
        source.insert(account_id, CredentialScope::Act, token);
        source
    }

    /// Register a token for an account and scope.
    pub fn insert(
        &mut self,
        account_id: impl Into<String>,
        scope: CredentialScope,
        token: impl Into<String>,
    ) {
        self.tokens.insert((account_id.into(), scope), token.into());
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn credential(&self, account_id: &str, scope: CredentialScope) -> Option<Credential> {
        self.tokens
            .get(&(account_id.to_string(), scope))
            .map(|token| Credential::new(account_id, scope, token.clone()))
    }
}

enum Slot {
    Valid(Credential),
    Invalid,
}

/// Holds the current credential for one account and detects expiry.
///
/// The credential is cached per scope after the first fetch. Once a scope
/// is invalidated, every later `current` call fails with
/// `AuthenticationExpired` — a dead credential is never retried within the
/// run; the operator refreshes it out-of-band.
pub struct SessionGuard<S> {
    source: S,
    account_id: String,
    slots: RwLock<HashMap<CredentialScope, Slot>>,
}

impl<S: CredentialSource> SessionGuard<S> {
    /// Create a guard for one account.
    pub fn new(source: S, account_id: impl Into<String>) -> Self {
        Self {
            source,
            account_id: account_id.into(),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// The account this guard supervises.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The current credential for a scope.
    pub async fn current(&self, scope: CredentialScope) -> Result<Credential, OutreachError> {
        {
            let slots = self.slots.read().await;
            match slots.get(&scope) {
                Some(Slot::Valid(credential)) => return Ok(credential.clone()),
                Some(Slot::Invalid) => return Err(self.expired(scope)),
                None => {}
            }
        }

        match self.source.credential(&self.account_id, scope).await {
            Some(credential) => {
                debug!("Obtained {:?} credential for {}", scope, self.account_id);
                self.slots
                    .write()
                    .await
                    .insert(scope, Slot::Valid(credential.clone()));
                Ok(credential)
            }
            None => Err(self.expired(scope)),
        }
    }

    /// Mark a scope's credential invalid for the rest of the run.
    ///
    /// Called on any session-expiry signal; propagates immediately to all
    /// subsequent callers.
    pub async fn invalidate(&self, scope: CredentialScope) {
        warn!(
            "Invalidating {:?} credential for {}; refresh it before the next run",
            scope, self.account_id
        );
        self.slots.write().await.insert(scope, Slot::Invalid);
    }

    fn expired(&self, scope: CredentialScope) -> OutreachError {
        OutreachError::AuthenticationExpired {
            account_id: self.account_id.clone(),
            scope,
        }
    }
}
