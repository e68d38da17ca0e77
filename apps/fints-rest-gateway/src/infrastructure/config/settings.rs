//! Gateway Configuration Settings
//!
//! Configuration types for the gateway, loaded once from environment
//! variables at startup and shared read-only afterwards.
//!
//! Missing bank credentials or a missing API password do not fail startup.
//! They surface per request instead (HTTP 500), so the process stays up and
//! reports the misconfiguration to its callers.
//!
//! The sandbox bank is opt-in. Without `FINTS_SANDBOX_FIXTURE` or
//! `FINTS_SANDBOX=demo` no connector is configured and every inquiry fails.

use std::net::IpAddr;
use std::path::PathBuf;

use crate::domain::banking::BankCredentials;

const FINTS_BANK_URL: &str = "FINTS_BANK_URL";
const FINTS_BANK_CODE: &str = "FINTS_BANK_CODE";
const FINTS_USERNAME: &str = "FINTS_USERNAME";
const FINTS_PIN: &str = "FINTS_PIN";
const API_PASSWORD: &str = "API_PASSWORD";
const FINTS_SANDBOX: &str = "FINTS_SANDBOX";
const FINTS_SANDBOX_FIXTURE: &str = "FINTS_SANDBOX_FIXTURE";

/// Raw FinTS access settings as configured. Any field may be empty.
#[derive(Clone, Default)]
pub struct FintsSettings {
    /// Bank FinTS endpoint.
    pub bank_url: String,
    /// Bank institute code.
    pub bank_code: String,
    /// Online-banking login.
    pub username: String,
    /// Online-banking PIN.
    pub pin: String,
}

impl std::fmt::Debug for FintsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FintsSettings")
            .field("bank_url", &self.bank_url)
            .field("bank_code", &self.bank_code)
            .field("username", &"[REDACTED]")
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

/// Turns `FintsSettings` into validated `BankCredentials`.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    settings: FintsSettings,
}

impl CredentialProvider {
    /// Create a provider over the configured settings.
    #[must_use]
    pub const fn new(settings: FintsSettings) -> Self {
        Self { settings }
    }

    /// Load credentials for one request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Incomplete` listing the names (never the values)
    /// of every empty setting.
    pub fn load(&self) -> Result<BankCredentials, ConfigError> {
        let s = &self.settings;
        let missing: Vec<&'static str> = [
            (FINTS_BANK_URL, &s.bank_url),
            (FINTS_BANK_CODE, &s.bank_code),
            (FINTS_USERNAME, &s.username),
            (FINTS_PIN, &s.pin),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Incomplete(missing.join(", ")));
        }

        Ok(BankCredentials::new(
            s.bank_url.clone(),
            s.bank_code.clone(),
            s.username.clone(),
            s.pin.clone(),
        ))
    }

    /// Whether all four settings are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.load().is_ok()
    }
}

/// Shared secret callers present as `Authorization: Bearer <secret>`.
#[derive(Clone)]
pub struct GatewaySecret(String);

impl GatewaySecret {
    /// Wrap a secret. Returns `None` for an empty value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Raw secret bytes, for constant-time comparison.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for GatewaySecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GatewaySecret([REDACTED])")
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Bind address.
    pub host: IpAddr,
    /// Gateway HTTP port.
    pub http_port: u16,
    /// Prometheus metrics port (0 = disabled).
    pub metrics_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            http_port: 8000,
            metrics_port: 0,
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// FinTS access settings.
    pub fints: FintsSettings,
    /// API password; `None` when unset or empty.
    pub api_password: Option<GatewaySecret>,
    /// Listener settings.
    pub server: ServerSettings,
    /// Data source of the sandbox bank; `None` leaves the gateway without a
    /// bank connector.
    pub sandbox: Option<SandboxSource>,
}

/// Where the sandbox bank connector takes its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxSource {
    /// Built-in demo data (`FINTS_SANDBOX=demo`).
    Demo,
    /// JSON fixture file (`FINTS_SANDBOX_FIXTURE`).
    Fixture(PathBuf),
}

impl SandboxSource {
    fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(FINTS_SANDBOX_FIXTURE).filter(|path| !path.trim().is_empty()) {
            return Ok(Some(Self::Fixture(PathBuf::from(path.trim()))));
        }

        match lookup(FINTS_SANDBOX).map(|mode| mode.trim().to_lowercase()) {
            None => Ok(None),
            Some(mode) if mode.is_empty() || mode == "off" => Ok(None),
            Some(mode) if mode == "demo" => Ok(Some(Self::Demo)),
            Some(mode) => Err(ConfigError::InvalidValue {
                key: FINTS_SANDBOX.to_string(),
                value: mode,
            }),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or address setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or address setting cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let fints = FintsSettings {
            bank_url: var(FINTS_BANK_URL),
            bank_code: var(FINTS_BANK_CODE),
            username: var(FINTS_USERNAME),
            pin: var(FINTS_PIN),
        };

        let defaults = ServerSettings::default();
        let server = ServerSettings {
            host: parse_or(&lookup, "HTTP_HOST", defaults.host)?,
            http_port: parse_or(&lookup, "HTTP_PORT", defaults.http_port)?,
            metrics_port: parse_or(&lookup, "GATEWAY_METRICS_PORT", defaults.metrics_port)?,
        };

        Ok(Self {
            fints,
            api_password: GatewaySecret::new(var(API_PASSWORD)),
            server,
            sandbox: SandboxSource::from_lookup(&lookup)?,
        })
    }

    /// Credential provider over this configuration.
    #[must_use]
    pub fn credential_provider(&self) -> CredentialProvider {
        CredentialProvider::new(self.fints.clone())
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required FinTS settings are empty.
    #[error("FinTS configuration incomplete, missing: {0}")]
    Incomplete(String),
    /// A setting could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn complete_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (FINTS_BANK_URL, "https://banking.example/fints".to_string()),
            (FINTS_BANK_CODE, "12030000".to_string()),
            (FINTS_USERNAME, "jdoe".to_string()),
            (FINTS_PIN, "1234".to_string()),
            (API_PASSWORD, "hunter2".to_string()),
        ])
    }

    fn config_from(env: &HashMap<&'static str, String>) -> GatewayConfig {
        GatewayConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
    }

    #[test]
    fn complete_settings_load_credentials() {
        let config = config_from(&complete_env());
        let creds = config.credential_provider().load().unwrap();
        assert_eq!(creds.bank_url(), "https://banking.example/fints");
        assert_eq!(creds.bank_code(), "12030000");
        assert_eq!(creds.username(), "jdoe");
        assert_eq!(creds.pin(), "1234");
    }

    #[test_case(FINTS_BANK_URL; "bank url")]
    #[test_case(FINTS_BANK_CODE; "bank code")]
    #[test_case(FINTS_USERNAME; "username")]
    #[test_case(FINTS_PIN; "pin")]
    fn any_empty_field_is_incomplete(field: &'static str) {
        let mut env = complete_env();
        env.insert(field, String::new());
        let config = config_from(&env);

        let err = config.credential_provider().load().unwrap_err();
        assert_eq!(err, ConfigError::Incomplete(field.to_string()));
        assert!(!config.credential_provider().is_complete());
    }

    #[test]
    fn incomplete_error_never_contains_pin() {
        let mut env = complete_env();
        env.insert(FINTS_USERNAME, String::new());
        let err = config_from(&env).credential_provider().load().unwrap_err();
        assert!(!err.to_string().contains("1234"));
    }

    #[test]
    fn missing_api_password_is_none() {
        let mut env = complete_env();
        env.remove(API_PASSWORD);
        assert!(config_from(&env).api_password.is_none());

        env.insert(API_PASSWORD, String::new());
        assert!(config_from(&env).api_password.is_none());
    }

    #[test]
    fn secret_and_settings_redacted_debug() {
        let config = config_from(&complete_env());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("jdoe"));
        assert!(!debug.contains("1234"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn server_settings_defaults() {
        let config = config_from(&HashMap::new());
        assert_eq!(config.server.http_port, 8000);
        assert_eq!(config.server.metrics_port, 0);
        assert_eq!(config.server.host, IpAddr::from([0, 0, 0, 0]));
    }

    #[test]
    fn no_bank_connector_by_default() {
        let config = config_from(&complete_env());
        assert_eq!(config.sandbox, None);
    }

    #[test_case("demo", Some(SandboxSource::Demo); "demo")]
    #[test_case(" Demo ", Some(SandboxSource::Demo); "demo mixed case")]
    #[test_case("off", None; "off")]
    #[test_case("", None; "empty")]
    fn sandbox_mode(value: &str, expected: Option<SandboxSource>) {
        let env = HashMap::from([(FINTS_SANDBOX, value.to_string())]);
        assert_eq!(config_from(&env).sandbox, expected);
    }

    #[test]
    fn unknown_sandbox_mode_is_rejected() {
        let env = HashMap::from([(FINTS_SANDBOX, "live".to_string())]);
        let err = GatewayConfig::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: FINTS_SANDBOX.to_string(),
                value: "live".to_string(),
            }
        );
    }

    #[test]
    fn fixture_path_wins_over_demo() {
        let env = HashMap::from([
            (FINTS_SANDBOX, "demo".to_string()),
            (FINTS_SANDBOX_FIXTURE, "/tmp/bank.json".to_string()),
        ]);
        assert_eq!(
            config_from(&env).sandbox,
            Some(SandboxSource::Fixture(PathBuf::from("/tmp/bank.json")))
        );
    }

    #[test]
    fn server_settings_overrides() {
        let env = HashMap::from([
            ("HTTP_HOST", "127.0.0.1".to_string()),
            ("HTTP_PORT", "9000".to_string()),
            ("GATEWAY_METRICS_PORT", "9464".to_string()),
            ("FINTS_SANDBOX_FIXTURE", "/tmp/bank.json".to_string()),
        ]);
        let config = config_from(&env);
        assert_eq!(config.server.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.server.metrics_port, 9464);
        assert_eq!(
            config.sandbox,
            Some(SandboxSource::Fixture(PathBuf::from("/tmp/bank.json")))
        );
    }

    #[test]
    fn malformed_port_is_rejected() {
        let env = HashMap::from([("HTTP_PORT", "eighty".to_string())]);
        let err = GatewayConfig::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "HTTP_PORT".to_string(),
                value: "eighty".to_string(),
            }
        );
    }
}
