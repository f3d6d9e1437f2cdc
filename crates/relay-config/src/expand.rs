//! Environment variable expansion for configuration strings.
//!
//! Supported forms:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Anything outside `${...}` passes through unchanged.

use crate::ConfigError;

/// Expand `${VAR}` / `${VAR:-default}` references in a string.
///
/// # Errors
///
/// Returns [`ConfigError::EnvVar`] for an unset variable without a
/// default or for an unterminated `${` reference. The `field` name is
/// carried into the error for operator-readable diagnostics.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: "unterminated ${ reference".to_owned(),
            });
        };

        let reference = &after[..end];
        let (name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };

        match std::env::var(name) {
            Ok(v) => result.push_str(&v),
            Err(_) => match default {
                Some(d) => result.push_str(d),
                None => {
                    return Err(ConfigError::EnvVar {
                        field: field.to_owned(),
                        message: format!("${{{name}}} not set"),
                    });
                }
            },
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_string_passes_through() {
        assert_eq!(expand_env("smtp.example.com", "f").unwrap(), "smtp.example.com");
    }

    #[test]
    fn test_expands_set_variable() {
        // Unique name to avoid collisions with parallel tests.
        unsafe { std::env::set_var("SCANRELAY_TEST_EXPAND_SET", "sekrit") };

        assert_eq!(
            expand_env("${SCANRELAY_TEST_EXPAND_SET}", "mail.password").unwrap(),
            "sekrit"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(
            expand_env("${SCANRELAY_TEST_EXPAND_UNSET:-fallback}", "f").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_unset_without_default_errors() {
        let err = expand_env("${SCANRELAY_TEST_EXPAND_MISSING}", "mail.user").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { field, .. } if field == "mail.user"));
    }

    #[test]
    fn test_unterminated_reference_errors() {
        assert!(expand_env("${OOPS", "f").is_err());
    }

    #[test]
    fn test_mixed_literal_and_reference() {
        unsafe { std::env::set_var("SCANRELAY_TEST_EXPAND_HOST", "dav.example.com") };

        assert_eq!(
            expand_env("https://${SCANRELAY_TEST_EXPAND_HOST}/scans", "webdav.host").unwrap(),
            "https://dav.example.com/scans"
        );
    }
}
