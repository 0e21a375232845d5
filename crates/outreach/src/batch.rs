//! Batch pacing and the batch failure boundary.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use voyager_client::Classification;

use crate::config::{DelayRange, PacingConfig};
use crate::error::OutreachError;
use crate::executor::{ConnectionExecutor, InvitationApi};
use crate::outcome::{BatchReport, Outcome};
use crate::session::CredentialSource;

/// Draws randomized inter-action delays so attempts never land on a fixed
/// interval.
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    /// Create a pacer from pacing configuration.
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// Sleep a randomized profile-level delay.
    pub async fn pause_between_profiles(&self) {
        Self::pause(self.config.profile_delay).await;
    }

    /// Sleep a randomized pagination delay.
    pub async fn pause_between_pages(&self) {
        Self::pause(self.config.page_delay).await;
    }

    async fn pause(range: DelayRange) {
        let delay = Self::sample(range);
        if delay.is_zero() {
            return;
        }
        debug!("Pacing: sleeping {:?}", delay);
        tokio::time::sleep(delay).await;
    }

    /// A uniform draw from the range, at millisecond granularity.
    fn sample(range: DelayRange) -> Duration {
        let min = range.min_duration().as_millis() as u64;
        let max = range.max_duration().as_millis() as u64;
        if min == max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Runs a batch of handles through one executor, pacing between attempts.
///
/// The runner is the failure boundary for the batch: per-item problems
/// become that item's [`Outcome`] and the batch continues; an expired
/// session aborts the remainder; a rate-limited outcome stops the account
/// for the day. Cancellation takes effect between attempts, never
/// mid-attempt, so an in-flight budget reservation always reaches a
/// terminal state first.
///
/// One runner drives one account. Run several accounts as independent
/// tasks, each with its own runner, tracker, and guard.
pub struct BatchRunner<A, S> {
    executor: ConnectionExecutor<A, S>,
    pacer: Pacer,
    cancel: CancellationToken,
}

impl<A: InvitationApi, S: CredentialSource> BatchRunner<A, S> {
    /// Create a runner with a fresh cancellation token.
    pub fn new(executor: ConnectionExecutor<A, S>, pacing: PacingConfig) -> Self {
        Self {
            executor,
            pacer: Pacer::new(pacing),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token consumers can trigger to stop the batch between attempts.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The executor backing this runner.
    pub fn executor(&self) -> &ConnectionExecutor<A, S> {
        &self.executor
    }

    /// Lazily yield outcomes for `handles`, starting at `start_index`.
    ///
    /// Handles are attempted in supplied order with a randomized delay
    /// between attempts. The stream ends early when the batch is
    /// cancelled, when an attempt is rate limited (resume tomorrow from
    /// the checkpoint), or after a fatal error has been yielded — handles
    /// past the failure point are never attempted.
    pub fn stream(
        &self,
        handles: Vec<String>,
        start_index: usize,
    ) -> impl Stream<Item = Result<Outcome, OutreachError>> + '_ {
        stream::unfold(
            (handles, start_index, false),
            move |(handles, index, stopped)| async move {
                if stopped || index >= handles.len() {
                    return None;
                }

                if index > start_index {
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            info!("Batch cancelled before item {}", index);
                            return None;
                        }
                        _ = self.pacer.pause_between_profiles() => {}
                    }
                }
                if self.cancel.is_cancelled() {
                    info!("Batch cancelled before item {}", index);
                    return None;
                }

                let handle = handles[index].clone();
                match self.executor.attempt(&handle).await {
                    Ok(outcome) => {
                        let stop = outcome.classification == Classification::RateLimited;
                        if stop {
                            warn!(
                                "{} is rate limited; stopping the batch for the day",
                                self.executor.account_id()
                            );
                        }
                        Some((Ok(outcome), (handles, index + 1, stop)))
                    }
                    Err(e) => {
                        error!("Fatal error at item {} ({}): {}", index, handle, e);
                        Some((Err(e), (handles, index + 1, true)))
                    }
                }
            },
        )
    }

    /// Run the whole batch and collect a report.
    pub async fn run(&self, handles: &[String]) -> BatchReport {
        self.run_from(handles, 0).await
    }

    /// Resume a batch from a checkpoint index.
    pub async fn run_from(&self, handles: &[String], start_index: usize) -> BatchReport {
        info!(
            "Starting batch for {}: {} handles from index {}",
            self.executor.account_id(),
            handles.len(),
            start_index
        );

        let mut outcomes = Vec::new();
        let mut aborted = None;
        let mut rate_limited = false;
        let mut next_index = start_index;

        {
            let mut stream = Box::pin(self.stream(handles.to_vec(), start_index));
            while let Some(item) = stream.next().await {
                match item {
                    Ok(outcome) => {
                        if outcome.classification == Classification::RateLimited {
                            // The handle was not submitted (or did not
                            // count); it is first in line tomorrow.
                            rate_limited = true;
                            outcomes.push(outcome);
                        } else {
                            next_index += 1;
                            outcomes.push(outcome);
                        }
                    }
                    Err(e) => {
                        aborted = Some(e);
                    }
                }
            }
        }

        if let Some(e) = &aborted {
            error!(
                "Batch aborted after {} outcome(s): {}. Remaining handles were not attempted.",
                outcomes.len(),
                e
            );
        }

        let report = BatchReport {
            outcomes,
            next_index,
            aborted,
            rate_limited,
        };
        info!("Batch finished: {:?}", report.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetTracker;
    use crate::config::BudgetConfig;
    use crate::executor::InvitationApi;
    use crate::session::{SessionGuard, StaticCredentialSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use voyager_client::{InviteResponse, ProfileIdentity, VoyagerError};

    /// Mock API that succeeds until `expire_after` attempts, then reports
    /// an expired session. Clones share the attempt counter.
    #[derive(Clone)]
    struct CountingApi {
        attempts: Arc<AtomicUsize>,
        expire_after: Option<usize>,
    }

    impl CountingApi {
        fn healthy() -> Self {
            Self {
                attempts: Arc::new(AtomicUsize::new(0)),
                expire_after: None,
            }
        }

        fn expiring_after(n: usize) -> Self {
            Self {
                attempts: Arc::new(AtomicUsize::new(0)),
                expire_after: Some(n),
            }
        }

        fn calls(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InvitationApi for CountingApi {
        async fn resolve(
            &self,
            _token: &str,
            handle: &str,
        ) -> Result<ProfileIdentity, VoyagerError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = self.expire_after {
                if attempt >= limit {
                    return Err(VoyagerError::SessionExpired {
                        redirect: "/login".to_string(),
                    });
                }
            }
            Ok(ProfileIdentity::member(handle, "123"))
        }

        async fn send_invitation(
            &self,
            _token: &str,
            _identity: &ProfileIdentity,
            _message: Option<&str>,
        ) -> Result<InviteResponse, VoyagerError> {
            Ok(InviteResponse {
                status: 201,
                body: String::new(),
            })
        }
    }

    fn runner_with(api: CountingApi, connections: u32) -> BatchRunner<CountingApi, StaticCredentialSource> {
        let guard = SessionGuard::new(StaticCredentialSource::single("acct-1", "tok"), "acct-1");
        let budget = Arc::new(BudgetTracker::new(BudgetConfig {
            connections,
            ..Default::default()
        }));
        let executor = ConnectionExecutor::new(api, guard, budget);
        BatchRunner::new(executor, PacingConfig::immediate())
    }

    fn handles(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let runner = runner_with(CountingApi::healthy(), 25);
        let batch = handles(&["a", "b", "c"]);
        let report = runner.run(&batch).await;

        let attempted: Vec<_> = report.outcomes.iter().map(|o| o.handle.as_str()).collect();
        assert_eq!(attempted, vec!["a", "b", "c"]);
        assert!(report.is_complete(3));
        assert_eq!(report.summary().succeeded, 3);
    }

    #[tokio::test]
    async fn test_auth_expiry_aborts_remaining_handles() {
        let api = CountingApi::expiring_after(1);
        let runner = runner_with(api.clone(), 25);
        let batch = handles(&["a", "b", "c", "d"]);
        let report = runner.run(&batch).await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.aborted.as_ref().is_some_and(|e| e.is_fatal()));
        // "b" failed fatally; "c" and "d" were never attempted.
        assert_eq!(api.calls(), 2);
        assert_eq!(report.next_index, 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_halts_batch_for_the_day() {
        let runner = runner_with(CountingApi::healthy(), 2);
        let batch = handles(&["a", "b", "c", "d"]);
        let report = runner.run(&batch).await;

        assert!(report.rate_limited);
        assert!(report.aborted.is_none());
        // Two submissions, then the denied item, then a halt.
        let summary = report.summary();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.rate_limited, 1);
        // The denied handle is first in line when the batch resumes.
        assert_eq!(report.next_index, 2);
        assert_eq!(batch[report.next_index], "c");
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_attempts() {
        let api = CountingApi::healthy();
        let runner = runner_with(api.clone(), 25);
        runner.cancellation_token().cancel();

        let batch = handles(&["a", "b", "c"]);
        let report = runner.run(&batch).await;

        assert!(report.outcomes.is_empty());
        assert_eq!(report.next_index, 0);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_from_resumes_at_checkpoint() {
        let runner = runner_with(CountingApi::healthy(), 25);
        let batch = handles(&["a", "b", "c"]);
        let report = runner.run_from(&batch, 2).await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].handle, "c");
        assert!(report.is_complete(3));
    }

    #[tokio::test]
    async fn test_stream_can_be_dropped_early() {
        let api = CountingApi::healthy();
        let runner = runner_with(api.clone(), 25);
        let batch = handles(&["a", "b", "c"]);

        let mut stream = Box::pin(runner.stream(batch, 0));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.handle, "a");
        drop(stream);

        // Only the consumed item was attempted.
        assert_eq!(api.calls(), 1);
    }

    #[test]
    fn test_sample_respects_bounds() {
        let range = DelayRange::new(2, 5);
        for _ in 0..100 {
            let delay = Pacer::sample(range);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(5));
        }
    }

    #[test]
    fn test_sample_fixed_range() {
        assert_eq!(Pacer::sample(DelayRange::fixed(0)), Duration::ZERO);
        assert_eq!(Pacer::sample(DelayRange::fixed(3)), Duration::from_secs(3));
    }
}
