//! Configuration for the outreach engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::budget::ActionKind;

/// Daily caps per action kind. Each kind has an independent counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Connection requests per day.
    pub connections: u32,
    /// Direct messages per day.
    pub messages: u32,
    /// InMails per day.
    pub inmails: u32,
    /// Profile views per day.
    pub profile_views: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            connections: 25,
            messages: 40,
            inmails: 10,
            profile_views: 100,
        }
    }
}

impl BudgetConfig {
    /// The configured cap for an action kind.
    pub fn limit_for(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Connection => self.connections,
            ActionKind::Message => self.messages,
            ActionKind::InMail => self.inmails,
            ActionKind::ProfileView => self.profile_views,
        }
    }
}

/// An inclusive delay range in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayRange {
    /// Create a range; `max_secs` is clamped up to `min_secs`.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            max_secs: max_secs.max(min_secs),
        }
    }

    /// A fixed (zero-jitter) delay.
    pub fn fixed(secs: u64) -> Self {
        Self::new(secs, secs)
    }

    pub(crate) fn min_duration(&self) -> Duration {
        Duration::from_secs(self.min_secs)
    }

    pub(crate) fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_secs.max(self.min_secs))
    }
}

/// Inter-attempt delay ranges per action category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay between profile-level actions.
    pub profile_delay: DelayRange,
    /// Delay between pagination steps.
    pub page_delay: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            profile_delay: DelayRange::new(5, 15),
            page_delay: DelayRange::new(2, 5),
        }
    }
}

impl PacingConfig {
    /// A zero-delay configuration for tests.
    pub fn immediate() -> Self {
        Self {
            profile_delay: DelayRange::fixed(0),
            page_delay: DelayRange::fixed(0),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutreachConfig {
    /// Daily action caps.
    #[serde(default)]
    pub budgets: BudgetConfig,
    /// Pacing delay ranges.
    #[serde(default)]
    pub pacing: PacingConfig,
}
