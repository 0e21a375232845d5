//! Configuration types for voyager-client.

use std::time::Duration;

/// Default browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for talking to the Voyager API.
#[derive(Debug, Clone)]
pub struct VoyagerConfig {
    /// Base URL of the platform (e.g., "https://www.linkedin.com").
    pub base_url: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
}

impl VoyagerConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the rendered public profile page URL for a handle.
    pub fn profile_page_url(&self, handle: &str) -> String {
        format!("{}/in/{}/", self.base_url, urlencoding::encode(handle))
    }

    /// Get the profile lookup endpoint URL for a handle.
    pub fn profile_lookup_url(&self, handle: &str) -> String {
        format!(
            "{}/voyager/api/identity/profiles/{}",
            self.base_url,
            urlencoding::encode(handle)
        )
    }

    /// Get the invitation submission endpoint URL.
    pub fn invitation_url(&self) -> String {
        format!("{}/voyager/api/growth/normInvitations", self.base_url)
    }
}

impl Default for VoyagerConfig {
    fn default() -> Self {
        Self::new("https://www.linkedin.com")
    }
}
