//! LinkedIn Voyager API client library.
//!
//! This crate provides a Rust client for the unofficial Voyager API that
//! backs the LinkedIn web application. It supports:
//!
//! - Resolving a public profile handle to a platform-internal identifier
//! - Submitting connection invitations
//! - Classifying the loosely-typed invitation responses into a closed set
//!   of outcomes
//! - Detecting session expiry from login redirects
//!
//! The client holds no credential: the session cookie is passed into each
//! call by whoever owns it.
//!
//! # Example
//!
//! ```no_run
//! use voyager_client::{Classifier, InvitePayload, Resolver, VoyagerClient, VoyagerConfig};
//!
//! # async fn example() -> Result<(), voyager_client::VoyagerError> {
//! let client = VoyagerClient::new(VoyagerConfig::default())?;
//! let token = std::env::var("LINKEDIN_SID").unwrap_or_default();
//!
//! // Resolve a handle to a member id
//! let mut resolver = Resolver::new();
//! let identity = resolver.resolve(&client, &token, "john-doe-123").await?;
//!
//! // Submit an invitation and classify the raw response
//! if let Some(member_id) = identity.member_id() {
//!     let payload = InvitePayload::for_member(member_id);
//!     let response = client.send_invitation(&token, &payload).await?;
//!     let classified = Classifier::default().classify(response.status, &response.body);
//!     println!("{:?}", classified.classification);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod resolve;
pub mod types;

pub use classify::{
    Classification, Classified, Classifier, DEFAULT_DUPLICATE_PHRASES, DEFAULT_THROTTLE_PHRASES,
};
pub use client::VoyagerClient;
pub use config::VoyagerConfig;
pub use error::VoyagerError;
pub use resolve::{ResolveStrategy, Resolver};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
