//! Authentication strategies for the Confluence REST API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::ApiError;

/// Supported authentication schemes, selected by a configuration tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Cloud: HTTP Basic with account email and API token.
    ApiToken,
    /// Server/Data Center: personal access token.
    Bearer,
    /// Server/Data Center: legacy Basic credentials.
    Basic,
}

impl AuthScheme {
    /// Parse a configuration tag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownAuthScheme`] for unrecognized tags.
    pub fn from_tag(tag: &str) -> Result<Self, ApiError> {
        match tag {
            "api-token" => Ok(Self::ApiToken),
            "bearer" => Ok(Self::Bearer),
            "basic" => Ok(Self::Basic),
            other => Err(ApiError::UnknownAuthScheme(other.to_owned())),
        }
    }

    /// Build the `Authorization` header value for this scheme.
    #[must_use]
    pub fn header_value(self, username: &str, token: &str) -> String {
        match self {
            Self::ApiToken | Self::Basic => {
                let credentials = BASE64.encode(format!("{username}:{token}"));
                format!("Basic {credentials}")
            }
            Self::Bearer => format!("Bearer {token}"),
        }
    }
}
