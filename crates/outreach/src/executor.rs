//! The connection request executor.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use voyager_client::{
    Classification, Classifier, InvitePayload, InviteResponse, ProfileIdentity, Resolver,
    VoyagerClient, VoyagerError,
};

use crate::budget::{ActionKind, BudgetTracker};
use crate::error::OutreachError;
use crate::outcome::Outcome;
use crate::session::{CredentialScope, CredentialSource, SessionGuard};

/// The protocol operations the executor needs.
///
/// Abstracted to support mocks in tests (and alternative transports).
#[async_trait]
pub trait InvitationApi: Send + Sync {
    /// Resolve a handle to a platform identity.
    async fn resolve(&self, token: &str, handle: &str) -> Result<ProfileIdentity, VoyagerError>;

    /// Submit a connection invitation for a resolved identity.
    async fn send_invitation(
        &self,
        token: &str,
        identity: &ProfileIdentity,
        message: Option<&str>,
    ) -> Result<InviteResponse, VoyagerError>;
}

/// [`InvitationApi`] backed by a real Voyager client with a shared
/// resolution cache.
pub struct VoyagerApi {
    client: VoyagerClient,
    resolver: Mutex<Resolver>,
}

impl VoyagerApi {
    /// Wrap a client with a fresh resolver.
    pub fn new(client: VoyagerClient) -> Self {
        Self::with_resolver(client, Resolver::new())
    }

    /// Wrap a client with a preconfigured resolver (custom strategy
    /// order).
    pub fn with_resolver(client: VoyagerClient, resolver: Resolver) -> Self {
        Self {
            client,
            resolver: Mutex::new(resolver),
        }
    }
}

#[async_trait]
impl InvitationApi for VoyagerApi {
    async fn resolve(&self, token: &str, handle: &str) -> Result<ProfileIdentity, VoyagerError> {
        self.resolver
            .lock()
            .await
            .resolve(&self.client, token, handle)
            .await
    }

    async fn send_invitation(
        &self,
        token: &str,
        identity: &ProfileIdentity,
        message: Option<&str>,
    ) -> Result<InviteResponse, VoyagerError> {
        let member_id = identity
            .member_id()
            .ok_or_else(|| VoyagerError::ResolutionFailed {
                handle: identity.handle.clone(),
            })?;

        let mut payload = InvitePayload::for_member(member_id);
        if let Some(message) = message {
            payload = payload.with_message(message);
        }
        if let Some(tracking_id) = &identity.tracking_id {
            payload = payload.with_tracking_id(tracking_id);
        }

        self.client.send_invitation(token, &payload).await
    }
}

/// Orchestrates one connection attempt end to end: credential, budget,
/// resolution, submission, classification.
///
/// Performs no persistence of its own: the returned [`Outcome`] is the
/// caller's to act on, and callers are expected to have consulted their
/// own already-contacted state before invoking [`attempt`](Self::attempt).
pub struct ConnectionExecutor<A, S> {
    api: A,
    guard: SessionGuard<S>,
    budget: Arc<BudgetTracker>,
    classifier: Classifier,
    message: Option<String>,
}

impl<A: InvitationApi, S: CredentialSource> ConnectionExecutor<A, S> {
    /// Create an executor with the default classifier and no note.
    pub fn new(api: A, guard: SessionGuard<S>, budget: Arc<BudgetTracker>) -> Self {
        Self {
            api,
            guard,
            budget,
            classifier: Classifier::default(),
            message: None,
        }
    }

    /// Replace the response classifier (custom duplicate phrases).
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the note attached to every connection request.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The account this executor acts for.
    pub fn account_id(&self) -> &str {
        self.guard.account_id()
    }

    /// The budget tracker backing this executor.
    pub fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    /// Attempt one connection request.
    ///
    /// At most one network write happens per call. Every recoverable
    /// condition folds into the returned [`Outcome`]; the only `Err` this
    /// method produces is `AuthenticationExpired`, which is fatal for the
    /// whole run.
    pub async fn attempt(&self, handle: &str) -> Result<Outcome, OutreachError> {
        let credential = self.guard.current(CredentialScope::Act).await?;

        // Reserve before any network traffic so a denied attempt costs
        // nothing. The guard drops (and releases the unit) on every path
        // that does not explicitly confirm.
        let Some(reservation) = self.budget.reserve(self.account_id(), ActionKind::Connection)
        else {
            info!(
                "Daily connection budget exhausted for {}; skipping {}",
                self.account_id(),
                handle
            );
            return Ok(Outcome::preflight(
                handle,
                Classification::RateLimited,
                "daily connection budget exhausted",
            ));
        };

        let identity = match self.api.resolve(&credential.token, handle).await {
            Ok(identity) => identity,
            Err(VoyagerError::SessionExpired { .. }) => {
                self.guard.invalidate(CredentialScope::Act).await;
                return Err(self.expired());
            }
            Err(
                e @ (VoyagerError::ProfileNotFound { .. } | VoyagerError::ResolutionFailed { .. }),
            ) => {
                let err = OutreachError::Resolution {
                    handle: handle.to_string(),
                    source: e,
                };
                debug!("Skipping {}: {}", handle, err);
                return Ok(Outcome::preflight(
                    handle,
                    Classification::InvalidRequest,
                    err.to_string(),
                ));
            }
            Err(e) => {
                warn!("Resolution error for {}: {}", handle, e);
                return Ok(Outcome::preflight(
                    handle,
                    Classification::UnknownError,
                    e.to_string(),
                ));
            }
        };

        if !identity.connectable() {
            // The invitation endpoint answers an ambiguous 422 for opaque
            // ids; refusing here keeps that case off the wire entirely.
            let err = OutreachError::UnresolvedIdentity {
                handle: handle.to_string(),
                kind: identity.kind,
            };
            warn!("{}; flag the handle for manual follow-up", err);
            return Ok(Outcome::preflight(
                handle,
                Classification::InvalidRequest,
                err.to_string(),
            ));
        }

        let response = match self
            .api
            .send_invitation(&credential.token, &identity, self.message.as_deref())
            .await
        {
            Ok(response) => response,
            Err(VoyagerError::SessionExpired { .. }) => {
                self.guard.invalidate(CredentialScope::Act).await;
                return Err(self.expired());
            }
            Err(e) => {
                warn!("Invitation submission failed for {}: {}", handle, e);
                return Ok(Outcome::preflight(
                    handle,
                    Classification::UnknownError,
                    e.to_string(),
                ));
            }
        };

        let classified = self.classifier.classify(response.status, &response.body);
        if classified.classification.counts_against_budget() {
            reservation.confirm();
        }

        let outcome = Outcome::classified(handle, response.status, classified);
        info!(
            "Attempt for {} classified as {:?} (status {})",
            handle, outcome.classification, response.status
        );
        Ok(outcome)
    }

    fn expired(&self) -> OutreachError {
        OutreachError::AuthenticationExpired {
            account_id: self.account_id().to_string(),
            scope: CredentialScope::Act,
        }
    }
}
