//! End-to-end tests for the outreach engine over a scripted protocol API.
//!
//! Run with: cargo test -p outreach

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use outreach::{
    ActionKind, BatchRunner, BudgetConfig, BudgetTracker, ConnectionExecutor, InvitationApi,
    OutreachError, PacingConfig, SessionGuard, StaticCredentialSource,
};
use voyager_client::{InviteResponse, ProfileIdentity, VoyagerError};

/// A scripted directory of profiles: each handle maps to a resolution
/// result and an invitation response.
#[derive(Clone, Default)]
struct Directory {
    profiles: HashMap<String, Profile>,
    submissions: Arc<AtomicUsize>,
}

#[derive(Clone)]
enum Profile {
    Member { id: String, status: u16, body: String },
    OpaqueOnly { id: String },
    Missing,
    ExpiredSession,
}

impl Directory {
    fn new() -> Self {
        Self::default()
    }

    fn member(mut self, handle: &str, id: &str, status: u16, body: &str) -> Self {
        self.profiles.insert(
            handle.to_string(),
            Profile::Member {
                id: id.to_string(),
                status,
                body: body.to_string(),
            },
        );
        self
    }

    fn opaque_only(mut self, handle: &str, id: &str) -> Self {
        self.profiles
            .insert(handle.to_string(), Profile::OpaqueOnly { id: id.to_string() });
        self
    }

    fn missing(mut self, handle: &str) -> Self {
        self.profiles.insert(handle.to_string(), Profile::Missing);
        self
    }

    fn expired_session(mut self, handle: &str) -> Self {
        self.profiles
            .insert(handle.to_string(), Profile::ExpiredSession);
        self
    }

    fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvitationApi for Directory {
    async fn resolve(&self, _token: &str, handle: &str) -> Result<ProfileIdentity, VoyagerError> {
        match self.profiles.get(handle) {
            Some(Profile::Member { id, .. }) => Ok(ProfileIdentity::member(handle, id.clone())),
            Some(Profile::OpaqueOnly { id }) => Ok(ProfileIdentity::opaque(handle, id.clone())),
            Some(Profile::ExpiredSession) => Err(VoyagerError::SessionExpired {
                redirect: "/login".to_string(),
            }),
            Some(Profile::Missing) | None => Err(VoyagerError::ProfileNotFound {
                handle: handle.to_string(),
            }),
        }
    }

    async fn send_invitation(
        &self,
        _token: &str,
        identity: &ProfileIdentity,
        _message: Option<&str>,
    ) -> Result<InviteResponse, VoyagerError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        match self.profiles.get(&identity.handle) {
            Some(Profile::Member { status, body, .. }) => Ok(InviteResponse {
                status: *status,
                body: body.clone(),
            }),
            _ => panic!("submission for a handle that should never be submitted"),
        }
    }
}

fn runner_for(
    directory: Directory,
    connections: u32,
) -> BatchRunner<Directory, StaticCredentialSource> {
    let guard = SessionGuard::new(StaticCredentialSource::single("acct-1", "tok"), "acct-1");
    let budget = Arc::new(BudgetTracker::new(BudgetConfig {
        connections,
        ..Default::default()
    }));
    let executor = ConnectionExecutor::new(directory, guard, budget);
    BatchRunner::new(executor, PacingConfig::immediate())
}

fn batch(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn test_mixed_batch_end_to_end() {
    let directory = Directory::new()
        .member("fresh-contact", "101", 201, "")
        .member(
            "old-friend",
            "102",
            422,
            r#"{"message":"You are already connected to this member"}"#,
        )
        .member("bad-id", "103", 422, r#"{"data":{"status":422},"included":[]}"#)
        .opaque_only("api-only", "ACoAAB1")
        .missing("gone");
    let runner = runner_for(directory.clone(), 25);

    let handles = batch(&["fresh-contact", "old-friend", "bad-id", "api-only", "gone"]);
    let report = runner.run(&handles).await;

    let summary = report.summary();
    assert_eq!(summary.attempted, 5);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.duplicate, 1);
    assert_eq!(summary.invalid, 3);
    assert!(report.is_complete(5));

    // Only the two handles that keep budget also justify persistence.
    let connected: Vec<_> = report
        .outcomes
        .iter()
        .filter(|outcome| outcome.connection_exists())
        .map(|outcome| outcome.handle.as_str())
        .collect();
    assert_eq!(connected, vec!["fresh-contact", "old-friend"]);

    // Only resolvable members were submitted; opaque and missing handles
    // never reached the wire.
    assert_eq!(directory.submissions(), 3);

    // Success + duplicate consumed budget; everything else was released.
    assert_eq!(
        runner.executor().budget().used("acct-1", ActionKind::Connection),
        2
    );
}

#[tokio::test]
async fn test_expired_session_aborts_and_reports_remediation() {
    let directory = Directory::new()
        .member("first", "101", 201, "")
        .expired_session("second")
        .member("never-reached", "103", 201, "");
    let runner = runner_for(directory.clone(), 25);

    let handles = batch(&["first", "second", "never-reached"]);
    let report = runner.run(&handles).await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.next_index, 1);

    let aborted = report.aborted.expect("batch should abort");
    assert!(aborted.is_fatal());
    assert!(matches!(
        aborted,
        OutreachError::AuthenticationExpired { ref account_id, .. } if account_id.as_str() == "acct-1"
    ));
    assert!(aborted.to_string().contains("refresh the credential"));

    // "never-reached" was never submitted.
    assert_eq!(directory.submissions(), 1);
}

#[tokio::test]
async fn test_budget_is_never_exceeded_across_a_batch() {
    let directory = Directory::new()
        .member("a", "1", 201, "")
        .member("b", "2", 201, "")
        .member("c", "3", 201, "")
        .member("d", "4", 201, "");
    let runner = runner_for(directory.clone(), 2);

    let handles = batch(&["a", "b", "c", "d"]);
    let report = runner.run(&handles).await;

    assert!(report.rate_limited);
    assert_eq!(directory.submissions(), 2);
    assert_eq!(
        runner.executor().budget().used("acct-1", ActionKind::Connection),
        2
    );

    // Tomorrow's run resumes with the first denied handle.
    assert_eq!(handles[report.next_index], "c");
}

#[tokio::test]
async fn test_non_counting_outcomes_leave_budget_untouched() {
    let directory = Directory::new()
        .member("invalid", "1", 422, "")
        .member("unknown", "2", 500, "boom")
        .missing("gone");
    let runner = runner_for(directory, 25);

    let handles = batch(&["invalid", "unknown", "gone"]);
    let report = runner.run(&handles).await;

    assert_eq!(report.summary().attempted, 3);
    for outcome in &report.outcomes {
        assert!(!outcome.connection_exists());
    }
    assert_eq!(
        runner.executor().budget().used("acct-1", ActionKind::Connection),
        0
    );
}

#[tokio::test]
async fn test_resumed_batch_completes_the_remainder() {
    let directory = Directory::new()
        .member("a", "1", 201, "")
        .member("b", "2", 201, "")
        .member("c", "3", 201, "");
    let runner = runner_for(directory, 25);

    let handles = batch(&["a", "b", "c"]);
    let first = runner.run_from(&handles, 0).await;
    assert!(first.is_complete(3));

    // Resuming past the end is a no-op, not an error.
    let resumed = runner.run_from(&handles, first.next_index).await;
    assert!(resumed.outcomes.is_empty());
}
