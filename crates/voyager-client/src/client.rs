//! Voyager API HTTP client.

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::VoyagerConfig;
use crate::error::VoyagerError;
use crate::types::{InvitePayload, InviteResponse, ProfileLookup};

/// Value shared by the `JSESSIONID` cookie and the `csrf-token` header;
/// the API rejects requests where the two differ.
const CSRF_TOKEN: &str = "ajax:2712048714529368143";

/// Path fragments a 3xx may point at when the session cookie is no longer
/// accepted.
const AUTH_PATHS: &[&str] = &["/login", "/checkpoint", "/authwall", "/uas/"];

/// Client for the Voyager API.
///
/// Holds no credential: the session cookie value is passed into each call
/// and lives only for the duration of that call. Redirects are never
/// followed automatically because in this protocol a redirect is a signal
/// (usually "your session is dead"), not a navigation.
#[derive(Debug, Clone)]
pub struct VoyagerClient {
    http: Client,
    config: VoyagerConfig,
}

impl VoyagerClient {
    /// Build a client from configuration.
    pub fn new(config: VoyagerConfig) -> Result<Self, VoyagerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &VoyagerConfig {
        &self.config
    }

    /// Fetch the rendered public profile page for a handle.
    pub async fn fetch_profile_page(
        &self,
        token: &str,
        handle: &str,
    ) -> Result<String, VoyagerError> {
        let url = self.config.profile_page_url(handle);
        debug!("Fetching profile page: {}", url);

        let response = self.send(self.get(token, &url), &url).await?;
        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(VoyagerError::ProfileNotFound {
                handle: handle.to_string(),
            }),
            status => Err(VoyagerError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            }),
        }
    }

    /// Look up a profile by handle on the identity endpoint.
    pub async fn lookup_profile(
        &self,
        token: &str,
        handle: &str,
    ) -> Result<ProfileLookup, VoyagerError> {
        let url = self.config.profile_lookup_url(handle);
        debug!("Profile lookup: {}", url);

        let response = self.send(self.get(token, &url), &url).await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(VoyagerError::ProfileNotFound {
                handle: handle.to_string(),
            }),
            status => Err(VoyagerError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            }),
        }
    }

    /// Submit a connection invitation.
    ///
    /// Exactly one network write per call. Returns the raw status and
    /// body; interpreting them is the classifier's job.
    pub async fn send_invitation(
        &self,
        token: &str,
        payload: &InvitePayload,
    ) -> Result<InviteResponse, VoyagerError> {
        let url = self.config.invitation_url();
        debug!("Submitting invitation: {}", url);

        let request = self
            .decorate(self.http.post(&url), token)
            .header(ACCEPT, "application/vnd.linkedin.normalized+json+2.1")
            .header(CONTENT_TYPE, "application/json")
            .json(payload);

        let response = self.send(request, &url).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Invitation response: status={}", status);

        Ok(InviteResponse { status, body })
    }

    fn get(&self, token: &str, url: &str) -> RequestBuilder {
        self.decorate(self.http.get(url), token)
            .header(ACCEPT, "*/*")
    }

    /// Headers common to every Voyager request.
    fn decorate(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header("x-li-lang", "en_US")
            .header("x-restli-protocol-version", "2.0.0")
            .header("csrf-token", CSRF_TOKEN)
            .header(COOKIE, cookie_header(token))
    }

    /// Send a request and screen the response for session-expiry signals.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, VoyagerError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VoyagerError::Timeout {
                    url: url.to_string(),
                }
            } else if e.is_redirect() {
                // Redirect loop; the platform bounces expired sessions
                // between interstitials.
                VoyagerError::SessionExpired {
                    redirect: "redirect loop".to_string(),
                }
            } else {
                VoyagerError::Http(e)
            }
        })?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if is_auth_redirect(&location) {
                warn!("Session cookie rejected at {}: redirected to {}", url, location);
                return Err(VoyagerError::SessionExpired { redirect: location });
            }
        }

        Ok(response)
    }
}

/// Whether a redirect target is a login/interstitial path.
fn is_auth_redirect(location: &str) -> bool {
    AUTH_PATHS.iter().any(|path| location.contains(path))
}

fn cookie_header(token: &str) -> String {
    format!("li_at={}; JSESSIONID=\"{}\"", token, CSRF_TOKEN)
}
