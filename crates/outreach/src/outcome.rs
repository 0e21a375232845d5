//! Attempt outcomes and batch reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voyager_client::{Classification, Classified};

use crate::error::OutreachError;

/// The result of one connection attempt.
///
/// Immutable once produced; the caller owns it and alone decides whether
/// to persist anything. The engine keeps no store of outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// Profile handle the attempt targeted.
    pub handle: String,
    /// HTTP status of the submission, when one was made.
    pub http_status: Option<u16>,
    /// Classified result.
    pub classification: Classification,
    /// Matched phrase or diagnostic snippet behind the classification.
    pub evidence: Option<String>,
    /// When the outcome was produced.
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    /// Outcome of a classified network response.
    pub fn classified(handle: impl Into<String>, status: u16, classified: Classified) -> Self {
        Self {
            handle: handle.into(),
            http_status: Some(status),
            classification: classified.classification,
            evidence: classified.evidence,
            timestamp: Utc::now(),
        }
    }

    /// Outcome produced without any network submission.
    pub fn preflight(
        handle: impl Into<String>,
        classification: Classification,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            http_status: None,
            classification,
            evidence: Some(evidence.into()),
            timestamp: Utc::now(),
        }
    }

    /// Whether the caller may record the relationship as existing.
    pub fn connection_exists(&self) -> bool {
        self.classification.connection_exists()
    }
}

/// Aggregate counts per classification for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub duplicate: usize,
    pub invalid: usize,
    pub rate_limited: usize,
    pub unknown: usize,
}

/// Everything a finished (or halted) batch produced.
#[derive(Debug)]
pub struct BatchReport {
    /// Outcomes in attempt order.
    pub outcomes: Vec<Outcome>,
    /// Index of the first handle that was not completed; the checkpoint
    /// to resume from.
    pub next_index: usize,
    /// Fatal error that aborted the batch, if any.
    pub aborted: Option<OutreachError>,
    /// The account was rate limited (by the platform or the local budget)
    /// and the batch stopped for the day. Resume from `next_index`
    /// tomorrow.
    pub rate_limited: bool,
}

impl BatchReport {
    /// Aggregate counts per classification.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            attempted: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome.classification {
                Classification::Success => summary.succeeded += 1,
                Classification::Duplicate => summary.duplicate += 1,
                Classification::InvalidRequest => summary.invalid += 1,
                Classification::RateLimited => summary.rate_limited += 1,
                Classification::UnknownError => summary.unknown += 1,
            }
        }
        summary
    }

    /// Whether every handle in a batch of `total` was completed.
    pub fn is_complete(&self, total: usize) -> bool {
        self.aborted.is_none() && !self.rate_limited && self.next_index >= total
    }
}
