//! Environment variable expansion for configuration values.

use std::borrow::Cow;
use std::env::VarError;

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// Supported forms:
///
/// - `${VAR}` - expands to the value of `VAR`, errors if unset
/// - `${VAR:-default}` - expands to `VAR` if set, otherwise uses `default`
///
/// `field` names the configuration key being expanded and is used in error
/// messages only.
pub fn expand_value(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = shellexpand::env_with_context(value, |name: &str| {
        // shellexpand passes the full braced content through, so the
        // default-value form arrives as "VAR:-default".
        let (var, default) = match name.split_once(":-") {
            Some((var, default)) => (var, Some(default)),
            None => (name, None),
        };

        match std::env::var(var) {
            Ok(val) => Ok(Some(Cow::Owned(val))),
            Err(VarError::NotPresent) => match default {
                Some(default) => Ok(Some(Cow::Owned(default.to_owned()))),
                None => Err(ConfigError::EnvVar {
                    field: field.to_owned(),
                    message: format!("${{{var}}} not set"),
                }),
            },
            Err(VarError::NotUnicode(_)) => Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{var}}} is not valid UTF-8"),
            }),
        }
    })
    .map_err(|err| err.cause)?;

    Ok(expanded.into_owned())
}
