//! Handle-to-identifier resolution.
//!
//! Resolution strategies run in a fixed priority order. Only the
//! rendered-page strategy can produce the numeric member id the invitation
//! endpoint accepts; the profile API yields an opaque id that read
//! endpoints take but the invitation endpoint rejects. The resolver never
//! upgrades an opaque id, so callers can refuse to submit with one instead
//! of discovering the rejection as an ambiguous 422.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::client::VoyagerClient;
use crate::error::VoyagerError;
use crate::types::ProfileIdentity;

/// Resolution strategies, tried in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Fetch the rendered profile page and extract the numeric member id.
    /// The only strategy that yields an invitation-capable identifier.
    RenderedPage,
    /// Query the profile lookup endpoint. Reliable, but yields an opaque
    /// id the invitation endpoint rejects.
    ProfileApi,
}

/// How far (in bytes) around an anchor the page extractors search.
const CONTEXT_WINDOW: usize = 2000;

static MEMBER_URN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"urn:li:member:(\d+)").expect("member urn regex"));

static TRACKING_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"trackingId(?:&quot;|")?\s*[:=]\s*(?:&quot;|")?([A-Za-z0-9_+/=-]{8,})"#)
        .expect("tracking id regex")
});

/// Values the tracking id pattern can capture that are not ids.
const TRACKING_FALSE_POSITIVES: &[&str] = &["undefined"];

/// Resolves profile handles to platform identities, caching per run.
///
/// Resolution is expensive (a rendered-page fetch per handle) and results
/// are stable for a session's lifetime, so each handle is resolved at most
/// once per resolver instance.
pub struct Resolver {
    strategies: Vec<ResolveStrategy>,
    cache: HashMap<String, ProfileIdentity>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver with the default strategy order.
    pub fn new() -> Self {
        Self::with_strategies(vec![ResolveStrategy::RenderedPage, ResolveStrategy::ProfileApi])
    }

    /// Create a resolver with an explicit strategy priority order.
    pub fn with_strategies(strategies: Vec<ResolveStrategy>) -> Self {
        Self {
            strategies,
            cache: HashMap::new(),
        }
    }

    /// Resolve a handle, consulting the per-run cache first.
    pub async fn resolve(
        &mut self,
        client: &VoyagerClient,
        token: &str,
        handle: &str,
    ) -> Result<ProfileIdentity, VoyagerError> {
        if let Some(cached) = self.cache.get(handle) {
            debug!("Resolution cache hit for {}", handle);
            return Ok(cached.clone());
        }

        let identity = self.resolve_uncached(client, token, handle).await?;
        self.cache.insert(handle.to_string(), identity.clone());
        Ok(identity)
    }

    async fn resolve_uncached(
        &self,
        client: &VoyagerClient,
        token: &str,
        handle: &str,
    ) -> Result<ProfileIdentity, VoyagerError> {
        for strategy in &self.strategies {
            match strategy {
                ResolveStrategy::RenderedPage => {
                    match client.fetch_profile_page(token, handle).await {
                        Ok(html) => {
                            if let Some(identity) = identity_from_page(handle, &html) {
                                debug!(
                                    "Resolved {} to member id via rendered page",
                                    handle
                                );
                                return Ok(identity);
                            }
                            debug!("No member urn in rendered page for {}", handle);
                        }
                        Err(
                            e @ (VoyagerError::SessionExpired { .. }
                            | VoyagerError::ProfileNotFound { .. }),
                        ) => return Err(e),
                        Err(e) => {
                            warn!("Rendered-page strategy failed for {}: {}", handle, e);
                        }
                    }
                }
                ResolveStrategy::ProfileApi => {
                    match client.lookup_profile(token, handle).await {
                        Ok(lookup) => {
                            if let Some(opaque_id) = lookup.opaque_id() {
                                debug!("Resolved {} to an opaque profile id", handle);
                                return Ok(ProfileIdentity::opaque(handle, opaque_id));
                            }
                            debug!("Profile lookup for {} carried no usable urn", handle);
                        }
                        Err(
                            e @ (VoyagerError::SessionExpired { .. }
                            | VoyagerError::ProfileNotFound { .. }),
                        ) => return Err(e),
                        Err(e) => {
                            warn!("Profile API strategy failed for {}: {}", handle, e);
                        }
                    }
                }
            }
        }

        Err(VoyagerError::ResolutionFailed {
            handle: handle.to_string(),
        })
    }
}

/// Extract a member identity from rendered profile HTML.
///
/// Prefers a member urn adjacent to the handle's own markup; falls back to
/// the first member urn on the page (the page embeds other members too, so
/// the fallback is best-effort). `None` when the page carries no member
/// urn at all.
fn identity_from_page(handle: &str, html: &str) -> Option<ProfileIdentity> {
    let (member_id, position) =
        member_id_near_handle(html, handle).or_else(|| first_member_id(html))?;

    let identity = ProfileIdentity::member(handle, member_id);
    match tracking_id_near(html, position) {
        Some(tracking_id) => Some(identity.with_tracking_id(tracking_id)),
        None => Some(identity),
    }
}

/// First member id within the context window of any occurrence of the
/// handle, together with its byte position.
fn member_id_near_handle(html: &str, handle: &str) -> Option<(String, usize)> {
    for (anchor, _) in html.match_indices(handle) {
        let (window, offset) = window_around(html, anchor);
        if let Some(captures) = MEMBER_URN.captures(window) {
            let m = captures.get(1)?;
            return Some((m.as_str().to_string(), offset + m.start()));
        }
    }
    None
}

/// First member id anywhere on the page.
fn first_member_id(html: &str) -> Option<(String, usize)> {
    let captures = MEMBER_URN.captures(html)?;
    let m = captures.get(1)?;
    Some((m.as_str().to_string(), m.start()))
}

/// Tracking id near a byte position, falling back to a page-wide search.
fn tracking_id_near(html: &str, position: usize) -> Option<String> {
    let (window, _) = window_around(html, position);
    extract_tracking_id(window).or_else(|| extract_tracking_id(html))
}

fn extract_tracking_id(text: &str) -> Option<String> {
    for captures in TRACKING_ID.captures_iter(text) {
        if let Some(m) = captures.get(1) {
            let candidate = m.as_str();
            if !TRACKING_FALSE_POSITIVES.contains(&candidate) {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Slice a `CONTEXT_WINDOW`-radius window around a byte position, clamped
/// to char boundaries. Returns the window and its starting offset.
fn window_around(html: &str, center: usize) -> (&str, usize) {
    let mut start = center.saturating_sub(CONTEXT_WINDOW);
    let mut end = (center + CONTEXT_WINDOW).min(html.len());
    while !html.is_char_boundary(start) {
        start -= 1;
    }
    while end < html.len() && !html.is_char_boundary(end) {
        end += 1;
    }
    (&html[start..end], start)
}
