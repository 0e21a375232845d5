//! Connection-request engine for Voyager outreach.
//!
//! This crate drives batches of connection requests through the
//! [`voyager_client`] protocol client while enforcing the rules that keep
//! a multi-tenant CRM honest:
//!
//! - a persisted "connected" record is only ever justified by a `Success`
//!   or `Duplicate` classification — nothing in this crate persists
//!   anything, it returns [`Outcome`]s and the workflow layer decides;
//! - per-account daily action budgets are reserved optimistically and
//!   given back when an attempt did not count against the platform's own
//!   limits;
//! - one logical worker per account, with randomized pacing between
//!   attempts;
//! - an expired session is fatal for the run and is never retried with the
//!   dead credential.
//!
//! # Architecture
//!
//! ```text
//! handles (from the workflow layer)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BATCH RUNNER                          │
//! │                                                             │
//! │  for each handle (cancellation checked between attempts):   │
//! │     1. SessionGuard supplies the Act credential             │
//! │     2. BudgetTracker reserves one connection unit           │
//! │     3. Resolver turns the handle into a member id           │
//! │     4. VoyagerClient submits the invitation                 │
//! │     5. Classifier maps status + body to an outcome          │
//! │     6. reservation confirmed (Success/Duplicate) or         │
//! │        released (anything else)                             │
//! │          ↓                                                  │
//! │     randomized pacing delay                                 │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! BatchReport { outcomes, checkpoint, summary }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outreach::{
//!     BatchRunner, BudgetTracker, ConnectionExecutor, OutreachConfig, SessionGuard,
//!     StaticCredentialSource, VoyagerApi, VoyagerClient, VoyagerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OutreachConfig::default();
//!     let client = VoyagerClient::new(VoyagerConfig::default())?;
//!
//!     let source = StaticCredentialSource::single("acct-1", "li_at-cookie-value");
//!     let guard = SessionGuard::new(source, "acct-1");
//!     let budget = Arc::new(BudgetTracker::new(config.budgets.clone()));
//!
//!     let executor = ConnectionExecutor::new(VoyagerApi::new(client), guard, budget);
//!     let runner = BatchRunner::new(executor, config.pacing.clone());
//!
//!     let handles = vec!["john-doe-123".to_string(), "jane-smith-456".to_string()];
//!     let report = runner.run(&handles).await;
//!     println!("{:?}", report.summary());
//!     Ok(())
//! }
//! ```

mod batch;
mod budget;
mod config;
mod error;
mod executor;
mod outcome;
mod session;

// Public exports
pub use batch::{BatchRunner, Pacer};
pub use budget::{ActionKind, BudgetTracker, Reservation};
pub use config::{BudgetConfig, DelayRange, OutreachConfig, PacingConfig};
pub use error::OutreachError;
pub use executor::{ConnectionExecutor, InvitationApi, VoyagerApi};
pub use outcome::{BatchReport, BatchSummary, Outcome};
pub use session::{
    Credential, CredentialScope, CredentialSource, SessionGuard, StaticCredentialSource,
};

// Re-export commonly used types from the protocol client
pub use voyager_client::{
    Classification, Classified, Classifier, VoyagerClient, VoyagerConfig, VoyagerError,
};
