use crate::core::kernel::client::select_endpoint;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Which of the broker's hosts to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Demo,
}

impl Environment {
    pub const fn host(self) -> &'static str {
        match self {
            Self::Production => "kabuka.e-shiten.jp",
            Self::Demo => "demo-kabuka.e-shiten.jp",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "demo" => Ok(Self::Demo),
            other => Err(ConfigError::InvalidConfiguration(format!(
                "Unknown environment '{}'",
                other
            ))),
        }
    }
}

/// Protocol revision. `Latest` follows the newest revision this crate speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    Latest,
    V4R3,
    V4R4,
    V4R5,
}

impl ApiVersion {
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::V4R3 => "v4r3",
            Self::V4R4 => "v4r4",
            Self::Latest | Self::V4R5 => "v4r5",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "v4r3" => Ok(Self::V4R3),
            "v4r4" => Ok(Self::V4R4),
            "v4r5" => Ok(Self::V4R5),
            other => Err(ConfigError::InvalidConfiguration(format!(
                "Unknown API version '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_id: Secret<String>,
    pub password: Secret<String>,
    /// Order-entry password, required by every order operation.
    pub second_password: Secret<String>,
    pub environment: Environment,
    pub api_version: ApiVersion,
    pub base_url: Option<String>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ClientConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ClientConfig", 6)?;
        state.serialize_field("user_id", "[REDACTED]")?;
        state.serialize_field("password", "[REDACTED]")?;
        state.serialize_field("second_password", "[REDACTED]")?;
        state.serialize_field("environment", &self.environment)?;
        state.serialize_field("api_version", &self.api_version)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ClientConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ClientConfigHelper {
            user_id: String,
            password: String,
            #[serde(default)]
            second_password: String,
            #[serde(default)]
            environment: Environment,
            #[serde(default)]
            api_version: ApiVersion,
            base_url: Option<String>,
        }

        let helper = ClientConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            user_id: Secret::new(helper.user_id),
            password: Secret::new(helper.password),
            second_password: Secret::new(helper.second_password),
            environment: helper.environment,
            api_version: helper.api_version,
            base_url: helper.base_url,
        })
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(user_id: String, password: String, second_password: String) -> Self {
        Self {
            user_id: Secret::new(user_id),
            password: Secret::new(password),
            second_password: Secret::new(second_password),
            environment: Environment::default(),
            api_version: ApiVersion::default(),
            base_url: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_USER_ID`
    /// - `{PREFIX}_PASSWORD`
    /// - `{PREFIX}_SECOND_PASSWORD` (optional, needed only for order entry)
    /// - `{PREFIX}_ENVIRONMENT` (optional, `production` or `demo`)
    /// - `{PREFIX}_API_VERSION` (optional, `latest`, `v4r3`, `v4r4`, `v4r5`)
    /// - `{PREFIX}_BASE_URL` (optional, overrides the two above)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let user_id_var = format!("{}_USER_ID", prefix);
        let password_var = format!("{}_PASSWORD", prefix);

        let user_id = env::var(&user_id_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(user_id_var))?;
        let password = env::var(&password_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(password_var))?;
        let second_password = env::var(format!("{}_SECOND_PASSWORD", prefix)).unwrap_or_default();

        let environment = env::var(format!("{}_ENVIRONMENT", prefix))
            .ok()
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();
        let api_version = env::var(format!("{}_API_VERSION", prefix))
            .ok()
            .map(|value| value.parse::<ApiVersion>())
            .transpose()?
            .unwrap_or_default();
        let base_url = env::var(format!("{}_BASE_URL", prefix)).ok();

        Ok(Self {
            user_id: Secret::new(user_id),
            password: Secret::new(password),
            second_password: Secret::new(second_password),
            environment,
            api_version,
            base_url,
        })
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // No file; fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Load configuration with automatic .env file detection
    ///
    /// Tries `.env.local`, then `.env.{ENVIRONMENT}`, then `.env`; the first file
    /// found wins. Falls back to system environment variables if none exist.
    #[cfg(feature = "env-file")]
    pub fn from_env_auto(prefix: &str) -> Result<Self, ConfigError> {
        let env_files = [
            ".env.local".to_string(),
            format!(
                ".env.{}",
                env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
            ),
            ".env".to_string(),
        ];

        for env_file in &env_files {
            match dotenv::from_path(env_file) {
                Ok(()) => break,
                Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ConfigError::InvalidConfiguration(format!(
                        "Failed to load .env file '{}': {}",
                        env_file, e
                    )));
                }
            }
        }

        Self::from_env(prefix)
    }

    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub const fn api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Base address requests are built on: the override if set, otherwise the
    /// address for the configured environment and version.
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| select_endpoint(self.environment, self.api_version))
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.user_id.expose_secret().is_empty() && !self.password.expose_secret().is_empty()
    }

    /// Get user id (use carefully - exposes secret)
    pub fn user_id(&self) -> &str {
        self.user_id.expose_secret()
    }

    /// Get login password (use carefully - exposes secret)
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Get order-entry password (use carefully - exposes secret)
    pub fn second_password(&self) -> &str {
        self.second_password.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_redacts_credentials() {
        let config = ClientConfig::new(
            "user".to_string(),
            "hunter2".to_string(),
            "order-pin".to_string(),
        )
        .environment(Environment::Demo);

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("order-pin"));
        assert!(json.contains("[REDACTED]"));
        assert!(json.contains(r#""environment":"demo""#));
    }

    #[test]
    fn test_endpoint_prefers_override() {
        let config = ClientConfig::new("u".to_string(), "p".to_string(), String::new());
        assert_eq!(config.endpoint(), "https://kabuka.e-shiten.jp/e_api_v4r5/");

        let config = config
            .api_version(ApiVersion::V4R4)
            .base_url("http://127.0.0.1:8080/e_api/".to_string());
        assert_eq!(config.endpoint(), "http://127.0.0.1:8080/e_api/");
    }

    #[test]
    fn test_from_env() {
        env::set_var("ESHITEN_CFG_TEST_USER_ID", "user");
        env::set_var("ESHITEN_CFG_TEST_PASSWORD", "pass");
        env::set_var("ESHITEN_CFG_TEST_ENVIRONMENT", "demo");
        env::set_var("ESHITEN_CFG_TEST_API_VERSION", "V4R3");

        let config = ClientConfig::from_env("eshiten_cfg_test").unwrap();
        assert_eq!(config.user_id(), "user");
        assert_eq!(config.second_password(), "");
        assert_eq!(config.environment, Environment::Demo);
        assert_eq!(config.api_version, ApiVersion::V4R3);
        assert!(config.has_credentials());
    }

    #[test]
    fn test_from_env_rejects_unknown_version() {
        env::set_var("ESHITEN_BAD_TEST_USER_ID", "user");
        env::set_var("ESHITEN_BAD_TEST_PASSWORD", "pass");
        env::set_var("ESHITEN_BAD_TEST_API_VERSION", "v9");

        assert!(matches!(
            ClientConfig::from_env("eshiten_bad_test"),
            Err(ConfigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_env_missing_user() {
        assert!(matches!(
            ClientConfig::from_env("eshiten_missing_test"),
            Err(ConfigError::MissingEnvironmentVariable(var)) if var == "ESHITEN_MISSING_TEST_USER_ID"
        ));
    }
}
