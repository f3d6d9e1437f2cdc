//! Configuration management for scanrelay.
//!
//! Parses `scanrelay.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]; they take
//! precedence over file values.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `printer.host`, everything under `[mail]` and
//! `[webdav]`. CLI-supplied values are taken literally.
//!
//! ## Validation
//!
//! [`Config::validate`] checks the operating mode and its mode-specific
//! required fields; a missing field is reported with its name and the
//! active mode. Validation failures are startup-fatal — no cycle runs
//! with an incomplete destination.

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scanrelay.toml";

/// Default polling interval in seconds.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Operating mode: which delivery backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Deliver scans as email attachments.
    Mail,
    /// Upload scans to a WebDAV collection.
    Webdav,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mail => f.write_str("mail"),
            Self::Webdav => f.write_str("webdav"),
        }
    }
}

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded
/// config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override printer hostname.
    pub printer_host: Option<String>,
    /// Override printer model.
    pub printer_model: Option<String>,
    /// Override operating mode.
    pub mode: Option<Mode>,
    /// Run exactly one cycle instead of the periodic loop.
    pub once: Option<bool>,
    /// Override polling interval in seconds.
    pub interval_secs: Option<u64>,
    /// Override local mount point of the printer share.
    pub share_mount: Option<PathBuf>,
    /// Override SMTP username.
    pub smtp_user: Option<String>,
    /// Override SMTP password.
    pub smtp_password: Option<String>,
    /// Override SMTP host.
    pub smtp_host: Option<String>,
    /// Override SMTP port.
    pub smtp_port: Option<u16>,
    /// Override mail recipients (comma-separated).
    pub mail_to: Option<String>,
    /// Override mail from address.
    pub mail_from: Option<String>,
    /// Override WebDAV server URL.
    pub webdav_host: Option<String>,
    /// Override WebDAV username.
    pub webdav_user: Option<String>,
    /// Override WebDAV password.
    pub webdav_password: Option<String>,
    /// Override WebDAV base path.
    pub webdav_base_path: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Printer configuration.
    pub printer: PrinterConfig,
    /// Scheduling configuration.
    pub schedule: ScheduleConfig,
    /// Operating mode; required (from file or CLI) before any cycle runs.
    pub mode: Option<Mode>,
    /// Mail destination (required in mail mode).
    pub mail: Option<MailSection>,
    /// WebDAV destination (required in webdav mode).
    pub webdav: Option<WebDavSection>,
    /// Share access configuration.
    pub share: ShareSection,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Printer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Printer hostname; required.
    pub host: String,
    /// Printer model family; determines the scan root on the share.
    pub model: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            model: "epson".to_owned(),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between cycle starts (accumulating, non-overlapping).
    pub interval_secs: u64,
    /// Run exactly one cycle and exit.
    pub once: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            once: false,
        }
    }
}

/// Mail destination configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MailSection {
    /// SMTP username.
    pub user: String,
    /// SMTP password.
    pub password: String,
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    pub port: Option<u16>,
    /// Recipient addresses, comma-separated.
    pub to: String,
    /// From address; defaults to the SMTP user.
    pub from: Option<String>,
}

impl MailSection {
    /// Recipient list: comma-split, trimmed, empties dropped.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        self.to
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Effective from address (explicit, or the SMTP user).
    #[must_use]
    pub fn sender(&self) -> String {
        self.from.clone().unwrap_or_else(|| self.user.clone())
    }
}

/// WebDAV destination configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebDavSection {
    /// Server URL.
    pub host: String,
    /// Basic auth username.
    pub user: String,
    /// Basic auth password.
    pub password: String,
    /// Collection path uploads go into; empty means the root collection.
    pub base_path: String,
}

/// Share access configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShareSection {
    /// Local mount point of the printer share; when set, the filesystem
    /// backend is used instead of direct SMB.
    pub mount: Option<PathBuf>,
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
        /// Config field path (e.g. `mail.password`).
        field: String,
        /// Error message (e.g. "${`SMTP_PASSWORD`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `scanrelay.toml` in the current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// CLI settings are applied after loading and expansion, so CLI
    /// arguments take precedence over config file values. Call
    /// [`Config::validate`] afterwards; loading does not validate because
    /// CLI settings may supply the missing pieces.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, or if
    /// reading, parsing or env expansion fails.
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
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

    /// Apply CLI settings to the configuration.
    #[allow(clippy::too_many_lines)]
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.printer_host {
            self.printer.host.clone_from(host);
        }
        if let Some(model) = &settings.printer_model {
            self.printer.model.clone_from(model);
        }
        if let Some(mode) = settings.mode {
            self.mode = Some(mode);
        }
        if let Some(once) = settings.once {
            self.schedule.once = once;
        }
        if let Some(interval) = settings.interval_secs {
            self.schedule.interval_secs = interval;
        }
        if let Some(mount) = &settings.share_mount {
            self.share.mount = Some(mount.clone());
        }

        if settings.smtp_user.is_some()
            || settings.smtp_password.is_some()
            || settings.smtp_host.is_some()
            || settings.smtp_port.is_some()
            || settings.mail_to.is_some()
            || settings.mail_from.is_some()
        {
            let mail = self.mail.get_or_insert_with(MailSection::default);
            if let Some(user) = &settings.smtp_user {
                mail.user.clone_from(user);
            }
            if let Some(password) = &settings.smtp_password {
                mail.password.clone_from(password);
            }
            if let Some(host) = &settings.smtp_host {
                mail.host.clone_from(host);
            }
            if let Some(port) = settings.smtp_port {
                mail.port = Some(port);
            }
            if let Some(to) = &settings.mail_to {
                mail.to.clone_from(to);
            }
            if let Some(from) = &settings.mail_from {
                mail.from = Some(from.clone());
            }
        }

        if settings.webdav_host.is_some()
            || settings.webdav_user.is_some()
            || settings.webdav_password.is_some()
            || settings.webdav_base_path.is_some()
        {
            let webdav = self.webdav.get_or_insert_with(WebDavSection::default);
            if let Some(host) = &settings.webdav_host {
                webdav.host.clone_from(host);
            }
            if let Some(user) = &settings.webdav_user {
                webdav.user.clone_from(user);
            }
            if let Some(password) = &settings.webdav_password {
                webdav.password.clone_from(password);
            }
            if let Some(base_path) = &settings.webdav_base_path {
                webdav.base_path.clone_from(base_path);
            }
        }
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.printer.host = expand::expand_env(&self.printer.host, "printer.host")?;

        if let Some(ref mut mail) = self.mail {
            mail.user = expand::expand_env(&mail.user, "mail.user")?;
            mail.password = expand::expand_env(&mail.password, "mail.password")?;
            mail.host = expand::expand_env(&mail.host, "mail.host")?;
            mail.to = expand::expand_env(&mail.to, "mail.to")?;
            if let Some(ref from) = mail.from {
                mail.from = Some(expand::expand_env(from, "mail.from")?);
            }
        }

        if let Some(ref mut webdav) = self.webdav {
            webdav.host = expand::expand_env(&webdav.host, "webdav.host")?;
            webdav.user = expand::expand_env(&webdav.user, "webdav.user")?;
            webdav.password = expand::expand_env(&webdav.password, "webdav.password")?;
            webdav.base_path = expand::expand_env(&webdav.base_path, "webdav.base_path")?;
        }

        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Checks the printer host, the operating mode and the mode-specific
    /// required fields. Errors name the missing field and the active mode.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any required value is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.printer.host.is_empty() {
            return Err(ConfigError::Validation(
                "printer.host is required".to_owned(),
            ));
        }

        match self.mode {
            None => Err(ConfigError::Validation(
                "mode is required (mail or webdav)".to_owned(),
            )),
            Some(Mode::Mail) => {
                self.require_mail()?;
                Ok(())
            }
            Some(Mode::Webdav) => {
                self.require_webdav()?;
                Ok(())
            }
        }
    }

    /// Get validated mail configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or a
    /// required field is empty.
    pub fn require_mail(&self) -> Result<&MailSection, ConfigError> {
        let mail = self.mail.as_ref().ok_or_else(|| {
            ConfigError::Validation("[mail] section is required in mail mode".to_owned())
        })?;
        require_field(&mail.user, "mail.user", Mode::Mail)?;
        require_field(&mail.password, "mail.password", Mode::Mail)?;
        require_field(&mail.host, "mail.host", Mode::Mail)?;
        if mail.port.is_none() {
            return Err(missing("mail.port", Mode::Mail));
        }
        if mail.recipients().is_empty() {
            return Err(missing("mail.to", Mode::Mail));
        }
        Ok(mail)
    }

    /// Get validated WebDAV configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or a
    /// required field is empty.
    pub fn require_webdav(&self) -> Result<&WebDavSection, ConfigError> {
        let webdav = self.webdav.as_ref().ok_or_else(|| {
            ConfigError::Validation("[webdav] section is required in webdav mode".to_owned())
        })?;
        require_field(&webdav.host, "webdav.host", Mode::Webdav)?;
        require_field(&webdav.user, "webdav.user", Mode::Webdav)?;
        require_field(&webdav.password, "webdav.password", Mode::Webdav)?;
        Ok(webdav)
    }
}

/// Require a mode-specific field to be non-empty.
fn require_field(value: &str, field: &str, mode: Mode) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(missing(field, mode));
    }
    Ok(())
}

/// Build the missing-field error, naming field and mode.
fn missing(field: &str, mode: Mode) -> ConfigError {
    ConfigError::Validation(format!("{field} is required in {mode} mode"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn mail_toml() -> &'static str {
        r#"
mode = "mail"

[printer]
host = "printer.lan"

[mail]
user = "scanner@example.com"
password = "secret"
host = "smtp.example.com"
port = 587
to = "a@example.com, b@example.com"
"#
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.printer.host, "");
        assert_eq!(config.printer.model, "epson");
        assert_eq!(config.schedule.interval_secs, 60);
        assert!(!config.schedule.once);
        assert!(config.mode.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.printer.model, "epson");
        assert!(config.mail.is_none());
        assert!(config.webdav.is_none());
    }

    #[test]
    fn test_parse_mail_config() {
        let config: Config = toml::from_str(mail_toml()).unwrap();

        assert_eq!(config.mode, Some(Mode::Mail));
        let mail = config.mail.as_ref().unwrap();
        assert_eq!(mail.host, "smtp.example.com");
        assert_eq!(mail.port, Some(587));
    }

    #[test]
    fn test_recipients_comma_split() {
        let config: Config = toml::from_str(mail_toml()).unwrap();

        assert_eq!(
            config.mail.unwrap().recipients(),
            vec!["a@example.com".to_owned(), "b@example.com".to_owned()]
        );
    }

    #[test]
    fn test_sender_defaults_to_user() {
        let config: Config = toml::from_str(mail_toml()).unwrap();

        assert_eq!(config.mail.unwrap().sender(), "scanner@example.com");
    }

    #[test]
    fn test_sender_explicit_from() {
        let mut config: Config = toml::from_str(mail_toml()).unwrap();
        config.mail.as_mut().unwrap().from = Some("scans@example.com".to_owned());

        assert_eq!(config.mail.unwrap().sender(), "scans@example.com");
    }

    #[test]
    fn test_validate_mail_mode_ok() {
        let config: Config = toml::from_str(mail_toml()).unwrap();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_printer_host() {
        let config: Config = toml::from_str(r#"mode = "mail""#).unwrap();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: printer.host is required"
        );
    }

    #[test]
    fn test_validate_requires_mode() {
        let config: Config = toml::from_str(
            r#"
[printer]
host = "printer.lan"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: mode is required (mail or webdav)"
        );
    }

    #[test]
    fn test_validate_names_missing_mail_field_and_mode() {
        let config: Config = toml::from_str(
            r#"
mode = "mail"

[printer]
host = "printer.lan"

[mail]
user = "scanner@example.com"
host = "smtp.example.com"
port = 587
to = "a@example.com"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: mail.password is required in mail mode"
        );
    }

    #[test]
    fn test_validate_missing_mail_section() {
        let config: Config = toml::from_str(
            r#"
mode = "mail"

[printer]
host = "printer.lan"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: [mail] section is required in mail mode"
        );
    }

    #[test]
    fn test_validate_webdav_mode() {
        let config: Config = toml::from_str(
            r#"
mode = "webdav"

[printer]
host = "printer.lan"

[webdav]
host = "https://dav.example.com"
user = "scans"
password = "secret"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.require_webdav().unwrap().base_path, "");
    }

    #[test]
    fn test_validate_names_missing_webdav_field() {
        let config: Config = toml::from_str(
            r#"
mode = "webdav"

[printer]
host = "printer.lan"

[webdav]
host = "https://dav.example.com"
user = "scans"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: webdav.password is required in webdav mode"
        );
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let mut config: Config = toml::from_str(mail_toml()).unwrap();
        config.apply_cli_settings(&CliSettings {
            printer_host: Some("other.lan".to_owned()),
            once: Some(true),
            interval_secs: Some(5),
            smtp_password: Some("cli-secret".to_owned()),
            ..CliSettings::default()
        });

        assert_eq!(config.printer.host, "other.lan");
        assert!(config.schedule.once);
        assert_eq!(config.schedule.interval_secs, 5);
        assert_eq!(config.mail.unwrap().password, "cli-secret");
    }

    #[test]
    fn test_cli_settings_create_mail_section() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            mode: Some(Mode::Mail),
            smtp_user: Some("u@example.com".to_owned()),
            ..CliSettings::default()
        });

        assert_eq!(config.mode, Some(Mode::Mail));
        assert_eq!(config.mail.unwrap().user, "u@example.com");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/scanrelay.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_with_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanrelay.toml");
        std::fs::write(&path, mail_toml()).unwrap();

        let settings = CliSettings {
            printer_host: Some("cli.lan".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.printer.host, "cli.lan");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_env_expansion_in_credentials() {
        unsafe { std::env::set_var("SCANRELAY_TEST_SMTP_PW", "from-env") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanrelay.toml");
        std::fs::write(
            &path,
            r#"
mode = "mail"

[printer]
host = "printer.lan"

[mail]
user = "scanner@example.com"
password = "${SCANRELAY_TEST_SMTP_PW}"
host = "smtp.example.com"
port = 587
to = "a@example.com"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.mail.unwrap().password, "from-env");
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Mail.to_string(), "mail");
        assert_eq!(Mode::Webdav.to_string(), "webdav");
    }
}
