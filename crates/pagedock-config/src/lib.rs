//! Configuration management for Pagedock imports.
//!
//! Parses `pagedock.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.username`
//! - `confluence.token`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagedock.toml";

/// Recognized authentication scheme tags.
const AUTH_SCHEMES: &[&str] = &["api-token", "bearer", "basic"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override target language for imported pages.
    pub language: Option<String>,
    /// Override media deduplication flag.
    pub dedupe_media: Option<bool>,
    /// Override API rate limit ceiling (requests per minute).
    pub rate_limit: Option<u32>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection configuration.
    pub confluence: Option<ConfluenceConfig>,
    /// Import behavior configuration.
    pub import: ImportConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL.
    pub base_url: String,
    /// Authentication scheme tag: `api-token`, `bearer` or `basic`.
    #[serde(default = "default_auth")]
    pub auth: String,
    /// Username or account email (unused for `bearer`).
    #[serde(default)]
    pub username: String,
    /// API token, personal access token or password.
    pub token: String,
}

fn default_auth() -> String {
    "api-token".to_owned()
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has an
    /// invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.token, "confluence.token")?;

        if !AUTH_SCHEMES.contains(&self.auth.as_str()) {
            return Err(ConfigError::Validation(format!(
                "confluence.auth must be one of: {}",
                AUTH_SCHEMES.join(", ")
            )));
        }

        // Bearer tokens carry the identity themselves
        if self.auth != "bearer" {
            require_non_empty(&self.username, "confluence.username")?;
        }

        Ok(())
    }
}

/// Import behavior configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Language tag applied to imported pages.
    pub language: String,
    /// Collapse duplicate media download URLs into one work item.
    pub dedupe_media: bool,
    /// API rate limit ceiling, requests per minute.
    pub rate_limit: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            dedupe_media: false,
            rate_limit: 100,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagedock.toml` in the current directory and
    /// parents, falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist or parsing
    /// fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(language) = &settings.language {
            self.import.language.clone_from(language);
        }
        if let Some(dedupe_media) = settings.dedupe_media {
            self.import.dedupe_media = dedupe_media;
        }
        if let Some(rate_limit) = settings.rate_limit {
            self.import.rate_limit = rate_limit;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section is present
    /// and all fields are valid. Use this instead of accessing the
    /// `confluence` field directly when the operation requires Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        if let Some(confluence) = &config.confluence {
            confluence.validate()?;
        }

        Ok(config)
    }

    /// Expand environment variable references in string fields.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(confluence) = &mut self.confluence {
            confluence.base_url = expand::expand_value(&confluence.base_url, "confluence.base_url")?;
            confluence.username = expand::expand_value(&confluence.username, "confluence.username")?;
            confluence.token = expand::expand_value(&confluence.token, "confluence.token")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = Config::default();
        assert!(config.confluence.is_none());
        assert_eq!(config.import.language, "en");
        assert!(!config.import.dedupe_media);
        assert_eq!(config.import.rate_limit, 100);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[confluence]
base_url = "https://wiki.example.com"
auth = "bearer"
token = "pat-token"

[import]
language = "nl"
dedupe_media = true
rate_limit = 30
"#,
        );

        let config = Config::load(Some(file.path()), None).unwrap();
        let confluence = config.require_confluence().unwrap();
        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.auth, "bearer");
        assert_eq!(config.import.language, "nl");
        assert!(config.import.dedupe_media);
        assert_eq!(config.import.rate_limit, 30);
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let err = Config::load(Some(Path::new("/nonexistent/pagedock.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_auth_scheme_rejected() {
        let file = write_config(
            r#"
[confluence]
base_url = "https://wiki.example.com"
auth = "oauth"
username = "user"
token = "tok"
"#,
        );

        let err = Config::load(Some(file.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let confluence = ConfluenceConfig {
            base_url: "ftp://wiki.example.com".to_owned(),
            auth: "basic".to_owned(),
            username: "user".to_owned(),
            token: "tok".to_owned(),
        };
        assert!(confluence.validate().is_err());
    }

    #[test]
    fn test_api_token_requires_username() {
        let confluence = ConfluenceConfig {
            base_url: "https://wiki.example.com".to_owned(),
            auth: "api-token".to_owned(),
            username: String::new(),
            token: "tok".to_owned(),
        };
        assert!(confluence.validate().is_err());
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let file = write_config(
            r#"
[import]
language = "nl"
"#,
        );

        let settings = CliSettings {
            language: Some("de".to_owned()),
            dedupe_media: Some(true),
            rate_limit: None,
        };
        let config = Config::load(Some(file.path()), Some(&settings)).unwrap();
        assert_eq!(config.import.language, "de");
        assert!(config.import.dedupe_media);
        assert_eq!(config.import.rate_limit, 100);
    }

    #[test]
    fn test_env_expansion_in_token() {
        // SAFETY: variable name is unique to this test.
        unsafe { std::env::set_var("PAGEDOCK_CFG_TOKEN", "expanded") };
        let file = write_config(
            r#"
[confluence]
base_url = "https://wiki.example.com"
username = "user"
token = "${PAGEDOCK_CFG_TOKEN}"
"#,
        );

        let config = Config::load(Some(file.path()), None).unwrap();
        assert_eq!(config.require_confluence().unwrap().token, "expanded");
    }
}
