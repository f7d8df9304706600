//! Configuration module for mailrelay.

use serde::Deserialize;
use std::path::Path;

use crate::{RelayError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the form UI from `static_path`.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Maximum request body size in megabytes (attachments travel inline).
    #[serde(default = "default_max_body_size")]
    pub max_body_size_mb: u64,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "static".to_string()
}

fn default_max_body_size() -> u64 {
    10
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: default_serve_static(),
            static_path: default_static_path(),
            max_body_size_mb: default_max_body_size(),
        }
    }
}

impl WebConfig {
    /// Maximum request body size in bytes.
    pub fn max_body_size_bytes(&self) -> usize {
        (self.max_body_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

/// TLS negotiation mode used when `secure` is false.
pub const TLS_MODES: [&str; 2] = ["starttls", "none"];

/// SMTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Use implicit TLS for the whole connection (usually port 465).
    #[serde(default)]
    pub secure: bool,
    /// TLS mode when `secure` is false: "starttls" or "none".
    #[serde(default = "default_smtp_tls")]
    pub tls: String,
    /// Username for authentication.
    #[serde(default)]
    pub user: Option<String>,
    /// Password for authentication.
    #[serde(default)]
    pub pass: Option<String>,
    /// Default sender address. Falls back to `user` when unset.
    #[serde(default)]
    pub from: Option<String>,
    /// Connection timeout in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
    /// Check that the SMTP server is reachable before serving requests.
    #[serde(default = "default_verify_on_startup")]
    pub verify_on_startup: bool,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> String {
    "starttls".to_string()
}

fn default_smtp_timeout() -> u64 {
    10
}

fn default_verify_on_startup() -> bool {
    true
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            secure: false,
            tls: default_smtp_tls(),
            user: None,
            pass: None,
            from: None,
            timeout_secs: default_smtp_timeout(),
            verify_on_startup: default_verify_on_startup(),
        }
    }
}

impl SmtpConfig {
    /// The sender address used for every outgoing message.
    ///
    /// A blank `from` falls back to `user`.
    pub fn sender(&self) -> Option<&str> {
        let not_blank = |s: &&str| !s.trim().is_empty();
        self.from
            .as_deref()
            .filter(not_blank)
            .or_else(|| self.user.as_deref().filter(not_blank))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// SMTP transport configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: HTTP listen port
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_SECURE` (`"true"` for implicit TLS)
    /// - `SMTP_USER`, `SMTP_PASS`, `SMTP_FROM`
    /// - `MAILRELAY_LOG_LEVEL`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = get("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = get("SMTP_PORT").and_then(|v| v.parse().ok()) {
            self.smtp.port = port;
        }
        if let Some(secure) = get("SMTP_SECURE") {
            self.smtp.secure = secure == "true";
        }
        if let Some(user) = get("SMTP_USER") {
            self.smtp.user = Some(user);
        }
        if let Some(pass) = get("SMTP_PASS") {
            self.smtp.pass = Some(pass);
        }
        if let Some(from) = get("SMTP_FROM") {
            self.smtp.from = Some(from);
        }
        if let Some(level) = get("MAILRELAY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - SMTP host is empty
    /// - Neither `smtp.from` nor `smtp.user` provides a sender address
    /// - Only one of `smtp.user` / `smtp.pass` is set
    /// - `smtp.tls` is not a known mode
    pub fn validate(&self) -> Result<()> {
        if self.smtp.host.trim().is_empty() {
            return Err(RelayError::Config("smtp.host is not set".to_string()));
        }
        if self.smtp.sender().is_none() {
            return Err(RelayError::Config(
                "No sender address. Set smtp.from (or smtp.user) in config.toml \
                 or via the SMTP_FROM environment variable."
                    .to_string(),
            ));
        }
        if self.smtp.user.is_some() != self.smtp.pass.is_some() {
            return Err(RelayError::Config(
                "smtp.user and smtp.pass must be set together".to_string(),
            ));
        }
        if !TLS_MODES.contains(&self.smtp.tls.as_str()) {
            return Err(RelayError::Config(format!(
                "unknown smtp.tls mode '{}' (expected one of: {})",
                self.smtp.tls,
                TLS_MODES.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.smtp.from = Some("noreply@example.com".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);

        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.serve_static);
        assert_eq!(config.web.static_path, "static");
        assert_eq!(config.web.max_body_size_mb, 10);
        assert_eq!(config.web.max_body_size_bytes(), 10 * 1024 * 1024);

        assert_eq!(config.smtp.host, "localhost");
        assert_eq!(config.smtp.port, 587);
        assert!(!config.smtp.secure);
        assert_eq!(config.smtp.tls, "starttls");
        assert!(config.smtp.user.is_none());
        assert!(config.smtp.pass.is_none());
        assert!(config.smtp.from.is_none());
        assert_eq!(config.smtp.timeout_secs, 10);
        assert!(config.smtp.verify_on_startup);

        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[web]
cors_origins = ["http://localhost:5173"]
serve_static = false
static_path = "public"
max_body_size_mb = 25

[smtp]
host = "smtp.example.com"
port = 465
secure = true
tls = "none"
user = "mailer@example.com"
pass = "hunter2"
from = "Relay <noreply@example.com>"
timeout_secs = 30
verify_on_startup = false

[logging]
level = "debug"
file = "logs/mailrelay.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert!(!config.web.serve_static);
        assert_eq!(config.web.static_path, "public");
        assert_eq!(config.web.max_body_size_mb, 25);

        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.secure);
        assert_eq!(config.smtp.tls, "none");
        assert_eq!(config.smtp.user.as_deref(), Some("mailer@example.com"));
        assert_eq!(config.smtp.pass.as_deref(), Some("hunter2"));
        assert_eq!(
            config.smtp.from.as_deref(),
            Some("Relay <noreply@example.com>")
        );
        assert_eq!(config.smtp.timeout_secs, 30);
        assert!(!config.smtp.verify_on_startup);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/mailrelay.log"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[smtp]
host = "mail.internal"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.smtp.host, "mail.internal");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.smtp.host, "localhost");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(RelayError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(RelayError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 6000\n\n[smtp]\nfrom = \"a@x.com\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.smtp.sender(), Some("a@x.com"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("PORT", "7000"),
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_SECURE", "true"),
            ("SMTP_USER", "me@gmail.com"),
            ("SMTP_PASS", "app-password"),
            ("SMTP_FROM", "Me <me@gmail.com>"),
            ("MAILRELAY_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.secure);
        assert_eq!(config.smtp.user.as_deref(), Some("me@gmail.com"));
        assert_eq!(config.smtp.pass.as_deref(), Some("app-password"));
        assert_eq!(config.smtp.from.as_deref(), Some("Me <me@gmail.com>"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_overrides_empty_and_unparsable_values() {
        let mut config = Config::default();
        config.smtp.host = "original".to_string();
        config.apply_overrides_from(lookup_from(&[
            ("SMTP_HOST", ""),
            ("SMTP_PORT", "not-a-port"),
        ]));

        assert_eq!(config.smtp.host, "original");
        assert_eq!(config.smtp.port, 587);
    }

    #[test]
    fn test_env_override_secure_false() {
        let mut config = Config::default();
        config.smtp.secure = true;
        config.apply_overrides_from(lookup_from(&[("SMTP_SECURE", "false")]));
        assert!(!config.smtp.secure);
    }

    #[test]
    fn test_sender_falls_back_to_user() {
        let mut smtp = SmtpConfig::default();
        assert_eq!(smtp.sender(), None);

        smtp.user = Some("user@example.com".to_string());
        assert_eq!(smtp.sender(), Some("user@example.com"));

        smtp.from = Some("from@example.com".to_string());
        assert_eq!(smtp.sender(), Some("from@example.com"));
    }

    #[test]
    fn test_blank_from_falls_back_to_user() {
        let smtp = SmtpConfig {
            user: Some("user@example.com".to_string()),
            from: Some("  ".to_string()),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.sender(), Some("user@example.com"));

        let smtp = SmtpConfig {
            from: Some(String::new()),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.sender(), None);
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_sender() {
        let result = Config::default().validate();
        if let Err(RelayError::Config(msg)) = result {
            assert!(msg.contains("sender"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = valid_config();
        config.smtp.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_user_without_pass() {
        let mut config = valid_config();
        config.smtp.user = Some("user@example.com".to_string());
        assert!(config.validate().is_err());

        config.smtp.pass = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_tls_mode() {
        let mut config = valid_config();
        config.smtp.tls = "ssl3".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ssl3"));
    }
}
