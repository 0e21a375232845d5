//! Per-account daily action budgets.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BudgetConfig;

/// An action kind with its own daily cap and counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Connection,
    Message,
    InMail,
    ProfileView,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BudgetKey {
    account_id: String,
    action: ActionKind,
    date: NaiveDate,
}

/// Tracks per-account, per-action daily usage against configured caps.
///
/// Reservation is optimistic: a unit is taken before submission and handed
/// back when the classified outcome shows the action did not count against
/// the platform's own limits. The `(account, action, date)` keyed map sits
/// behind one mutex, so concurrent reservations against the same key are
/// linearizable and `used` can never pass `limit`.
///
/// Not a process-wide singleton: construct one per engine (or per test)
/// and pass it by handle.
pub struct BudgetTracker {
    limits: BudgetConfig,
    used: Mutex<HashMap<BudgetKey, u32>>,
}

impl BudgetTracker {
    /// Create a tracker with the given caps.
    pub fn new(limits: BudgetConfig) -> Self {
        Self {
            limits,
            used: Mutex::new(HashMap::new()),
        }
    }

    /// Reserve one unit against today's cap (UTC date).
    ///
    /// Returns `None` when the cap is reached. The returned guard releases
    /// the unit on drop unless [`Reservation::confirm`] is called.
    pub fn reserve(&self, account_id: &str, action: ActionKind) -> Option<Reservation<'_>> {
        self.reserve_on(account_id, action, Utc::now().date_naive())
    }

    /// Reserve against an explicit calendar date.
    ///
    /// Date rollover needs no bookkeeping: a new day is a new key.
    pub fn reserve_on(
        &self,
        account_id: &str,
        action: ActionKind,
        date: NaiveDate,
    ) -> Option<Reservation<'_>> {
        let key = BudgetKey {
            account_id: account_id.to_string(),
            action,
            date,
        };
        let limit = self.limits.limit_for(action);

        let mut used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = used.entry(key.clone()).or_insert(0);
        if *counter >= limit {
            debug!(
                "Budget exhausted for {} {:?} on {} ({}/{})",
                account_id, action, date, counter, limit
            );
            return None;
        }
        *counter += 1;

        Some(Reservation {
            tracker: self,
            key: Some(key),
        })
    }

    /// Units used today for an account/action pair.
    pub fn used(&self, account_id: &str, action: ActionKind) -> u32 {
        self.used_on(account_id, action, Utc::now().date_naive())
    }

    /// Units used on an explicit date.
    pub fn used_on(&self, account_id: &str, action: ActionKind, date: NaiveDate) -> u32 {
        let key = BudgetKey {
            account_id: account_id.to_string(),
            action,
            date,
        };
        let used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        used.get(&key).copied().unwrap_or(0)
    }

    /// Units still available today for an account/action pair.
    pub fn remaining(&self, account_id: &str, action: ActionKind) -> u32 {
        self.limits
            .limit_for(action)
            .saturating_sub(self.used(account_id, action))
    }

    fn release_key(&self, key: &BudgetKey) {
        let mut used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(counter) = used.get_mut(key) {
            *counter = counter.saturating_sub(1);
        }
    }
}

/// A reserved budget unit.
///
/// The per-attempt state machine: `Reserved -> {Confirmed, Released}`.
/// Call [`confirm`](Self::confirm) when the action counted against the
/// platform's limits; dropping an unconfirmed reservation hands the unit
/// back, so a failed or cancelled attempt can never leak one.
#[must_use = "an unconfirmed reservation releases its unit on drop"]
pub struct Reservation<'a> {
    tracker: &'a BudgetTracker,
    key: Option<BudgetKey>,
}

impl Reservation<'_> {
    /// Keep the unit: the action counted.
    pub fn confirm(mut self) {
        self.key = None;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.tracker.release_key(&key);
        }
    }
}
