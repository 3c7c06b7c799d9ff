//! Handler configuration.
//!
//! Defaults match the suggestions API test setup. An optional TOML file named
//! by `DREDD_HOOKS_CONFIG` can override them, and a few environment variables
//! override the file:
//!
//! - `DREDD_HOOKS_FIXTURE` - fixture file path
//! - `DREDD_HOOKS_CONFIGURE_URL` - mock server configuration endpoint
//! - `DREDD_HOOKS_HOST` / `DREDD_HOOKS_PORT` - hooks server listen address

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::Rule;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_ENV: &str = "DREDD_HOOKS_CONFIG";

/// Fixture file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSettings {
    /// Path of the fixture document posted before the suite.
    #[serde(default = "default_fixture_path")]
    pub path: PathBuf,
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("./_ft/ersatz-fixtures.yml")
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            path: default_fixture_path(),
        }
    }
}

/// Mock server configuration endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureSettings {
    /// Endpoint the fixture is posted to.
    #[serde(default = "default_configure_url")]
    pub url: String,
    /// Content type sent with the fixture.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_configure_url() -> String {
    "http://localhost:9000/__configure".to_string()
}

fn default_content_type() -> String {
    "application/x-yaml".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ConfigureSettings {
    fn default() -> Self {
        Self {
            url: default_configure_url(),
            content_type: default_content_type(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hooks server listen settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    61321
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full handler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    #[serde(default)]
    pub fixture: FixtureSettings,
    #[serde(default)]
    pub configure: ConfigureSettings,
    #[serde(default)]
    pub server: ServerSettings,
    /// Extra transaction rules, evaluated after the built-in ones.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl HooksConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
        Self::from_toml(&content)
    }

    /// Loads the file named by `DREDD_HOOKS_CONFIG` if set, then applies
    /// environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HooksConfig::from_env`] with variables read from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = match lookup(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };
        config.with_overrides(lookup)
    }

    /// Applies overrides looked up by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup("DREDD_HOOKS_FIXTURE") {
            self.fixture.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("DREDD_HOOKS_CONFIGURE_URL") {
            self.configure.url = url;
        }
        if let Some(host) = lookup("DREDD_HOOKS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DREDD_HOOKS_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid DREDD_HOOKS_PORT '{}'", port)))?;
        }
        Ok(self)
    }
}

/// Validation result containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merges another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Trait for validatable configuration types.
pub trait Validate {
    /// Validates the configuration and returns any issues found.
    fn validate(&self) -> ValidationResult;
}

impl Validate for FixtureSettings {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        if self.path.as_os_str().is_empty() {
            result.add_error("fixture path cannot be empty");
        }
        result
    }
}

fn is_local_host(host: &str) -> bool {
    ["localhost", "127.0.0.1", "[::1]"]
        .iter()
        .any(|local| host.eq_ignore_ascii_case(local))
}

impl Validate for ConfigureSettings {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        match reqwest::Url::parse(&self.url) {
            Err(e) => result.add_error(format!("configure url '{}' is invalid: {}", self.url, e)),
            Ok(url) => {
                if url.scheme() != "http" {
                    result.add_error(format!(
                        "configure url '{}' must use http:// (built without TLS)",
                        self.url
                    ));
                }
                match url.host_str() {
                    None | Some("") => {
                        result.add_error(format!("configure url '{}' has no host", self.url))
                    }
                    Some(host) if !is_local_host(host) => result.add_warning(format!(
                        "configure url host '{}' is not local - fixtures will leave this machine",
                        host
                    )),
                    Some(_) => {}
                }
            }
        }

        if self.content_type.trim().is_empty() {
            result.add_error("content_type cannot be empty");
        }

        if self.timeout_secs == 0 {
            result.add_error("timeout_secs must be at least 1");
        }

        result
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        if self.host.trim().is_empty() {
            result.add_error("server host cannot be empty");
        }
        if self.port == 0 {
            result.add_error("server port cannot be 0");
        }
        result
    }
}

impl Validate for HooksConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        result.merge(self.fixture.validate());
        result.merge(self.configure.validate());
        result.merge(self.server.validate());

        for rule in &self.rules {
            if rule.prefix.is_empty() {
                result.add_warning("rule with empty prefix matches every transaction");
            }
        }

        result
    }
}
