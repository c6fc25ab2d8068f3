//! Confluence REST API client.
//!
//! Sync HTTP client for Confluence Cloud, Server and Data Center with
//! instance auto-detection, pluggable authentication, pagination and
//! rate-limited requests.

mod auth;
mod pages;
mod rate_limit;
mod spaces;
mod types;

pub use auth::AuthScheme;
pub use pages::RemotePage;
pub use rate_limit::RateLimiter;
pub use types::{PageSummary, Space};

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::error::ApiError;
use types::{CurrentUser, SystemInfo};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Backoff before the single retry of a failed transport attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Candidate API path prefixes probed on Server/Data Center instances.
const PROBE_PREFIXES: &[&str] = &["/wiki", ""];

/// Detected Confluence deployment flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfluenceVersion {
    /// Atlassian-hosted cloud instance.
    Cloud,
    /// Self-hosted server.
    Server,
    /// Self-hosted Data Center cluster.
    DataCenter,
}

impl ConfluenceVersion {
    /// Lowercase tag for logs and UI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Server => "server",
            Self::DataCenter => "datacenter",
        }
    }
}

/// Outcome of a connection test.
#[derive(Debug)]
pub struct ConnectionStatus {
    /// Whether authentication succeeded.
    pub success: bool,
    /// Detected deployment flavor.
    pub version: Option<ConfluenceVersion>,
    /// Display identity of the authenticated user.
    pub user: Option<String>,
    /// Last error message when authentication failed.
    pub error: Option<String>,
}

/// Confluence REST API client.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
    limiter: RateLimiter,
    prefix: Option<&'static str>,
    version: Option<ConfluenceVersion>,
}

impl ApiClient {
    /// Create a client for the given instance and credentials.
    ///
    /// `rate_limit` is the request ceiling per minute.
    #[must_use]
    pub fn new(
        base_url: &str,
        scheme: AuthScheme,
        username: &str,
        token: &str,
        rate_limit: u32,
    ) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: scheme.header_value(username, token),
            limiter: RateLimiter::new(rate_limit),
            prefix: None,
            version: None,
        }
    }

    /// Create a client from configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownAuthScheme`] for an unrecognized auth tag.
    pub fn from_config(
        confluence: &pagedock_config::ConfluenceConfig,
        import: &pagedock_config::ImportConfig,
    ) -> Result<Self, ApiError> {
        let scheme = AuthScheme::from_tag(&confluence.auth)?;
        Ok(Self::new(
            &confluence.base_url,
            scheme,
            &confluence.username,
            &confluence.token,
            import.rate_limit,
        ))
    }

    /// Base URL of the instance.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST API root, including the detected path prefix.
    fn api_url(&self) -> String {
        format!(
            "{}{}/rest/api",
            self.base_url,
            self.prefix.unwrap_or_default()
        )
    }

    /// API path prefix detected for this instance.
    pub(crate) fn prefix(&self) -> &'static str {
        self.prefix.unwrap_or_default()
    }

    /// Detect the deployment flavor and API path prefix.
    ///
    /// Cloud instances are recognized by hostname. Server and Data Center
    /// are probed through the system-info endpoint under both candidate
    /// prefixes; the first one that answers is remembered for all later
    /// calls. When neither answers, the client falls back to Server with
    /// the `/wiki` prefix.
    pub fn detect_version(&mut self) -> ConfluenceVersion {
        if let Some(version) = self.version {
            return version;
        }

        if self.base_url.contains(".atlassian.net") {
            info!("detected Confluence Cloud");
            self.prefix = Some("");
            self.version = Some(ConfluenceVersion::Cloud);
            return ConfluenceVersion::Cloud;
        }

        for prefix in PROBE_PREFIXES.iter().copied() {
            let url = format!("{}{prefix}/rest/api/settings/systemInfo", self.base_url);
            match self.get_json::<SystemInfo>(&url) {
                Ok(system_info) => {
                    self.prefix = Some(prefix);
                    let version = if system_info.is_data_center {
                        ConfluenceVersion::DataCenter
                    } else {
                        ConfluenceVersion::Server
                    };
                    info!(
                        version = version.as_str(),
                        prefix, "detected Confluence deployment"
                    );
                    self.version = Some(version);
                    return version;
                }
                Err(err) => {
                    debug!(prefix, error = %err, "system info probe failed");
                }
            }
        }

        warn!("failed to detect Confluence version via API, assuming Server with /wiki prefix");
        self.prefix = Some("/wiki");
        self.version = Some(ConfluenceVersion::Server);
        ConfluenceVersion::Server
    }

    /// Test connectivity and authentication.
    ///
    /// Runs version detection, then tries the two current-user endpoints
    /// under the detected prefix.
    pub fn test_connection(&mut self) -> ConnectionStatus {
        let version = self.detect_version();

        let mut last_error = None;
        for endpoint in ["user/current", "myself"] {
            let url = format!("{}/{endpoint}", self.api_url());
            match self.get_json::<CurrentUser>(&url) {
                Ok(user) => {
                    info!(endpoint, "authenticated against Confluence");
                    return ConnectionStatus {
                        success: true,
                        version: Some(version),
                        user: Some(user.identity()),
                        error: None,
                    };
                }
                Err(err) => {
                    debug!(endpoint, error = %err, "authentication endpoint failed");
                    last_error = Some(err.to_string());
                }
            }
        }

        ConnectionStatus {
            success: false,
            version: Some(version),
            user: None,
            error: last_error,
        }
    }

    /// GET a JSON resource, enforcing the rate limit and surfacing error
    /// statuses.
    pub(crate) fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, ApiError> {
        let response = self.send_get(url)?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ApiError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body.read_json()?)
    }

    /// Send a GET request, retrying once after a short backoff on transport
    /// failure. HTTP error statuses are not retried.
    pub(crate) fn send_get(
        &mut self,
        url: &str,
    ) -> Result<ureq::http::Response<ureq::Body>, ApiError> {
        self.limiter.acquire();

        let send = || {
            self.agent
                .get(url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .call()
        };

        match send() {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(url, error = %err, "transport error, retrying once");
                std::thread::sleep(RETRY_BACKOFF);
                Ok(send()?)
            }
        }
    }
}
