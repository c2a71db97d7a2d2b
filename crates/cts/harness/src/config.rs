//! Configuration for the conformance harness

use crate::error::{HarnessError, HarnessResult};
use crate::lab::LabConfig;
use cts_client::ClientConfig;
use cts_types::ServerIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `CTS_LAB__PARALLEL_WORKBENCHES=true`.
pub const ENV_PREFIX: &str = "CTS";

/// Main harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Protocol client settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Lab execution settings
    #[serde(default)]
    pub lab: LabSettings,

    /// Result persistence settings
    #[serde(default)]
    pub output: OutputSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Protocol client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// User id every protocol call is issued on behalf of
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,

    /// Accept self-signed TLS certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            timeout_secs: default_client_timeout(),
            accept_invalid_certs: false,
        }
    }
}

/// Lab execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSettings {
    /// Run workbenches concurrently
    #[serde(default)]
    pub parallel_workbenches: bool,

    /// Per-test-case timeout in seconds
    #[serde(default = "default_test_timeout")]
    pub test_timeout_secs: u64,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            parallel_workbenches: false,
            test_timeout_secs: default_test_timeout(),
        }
    }
}

/// Result persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory the result record is written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_user_id() -> String {
    "cts-user".to_string()
}

fn default_client_timeout() -> u64 {
    30
}

fn default_test_timeout() -> u64 {
    60
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HarnessConfig {
    /// Load configuration: defaults, then the file if given, then `CTS_*`
    /// environment variables.
    ///
    /// A file that is named explicitly must exist.
    pub fn load(path: Option<&Path>) -> HarnessResult<Self> {
        let config = Self::build(path).map_err(|e| HarnessError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn build(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&HarnessConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.client.user_id.trim().is_empty() {
            return Err(HarnessError::Configuration(
                "client.user_id must not be empty".into(),
            ));
        }
        if self.client.timeout_secs == 0 {
            return Err(HarnessError::Configuration(
                "client.timeout_secs must be positive".into(),
            ));
        }
        if self.lab.test_timeout_secs == 0 {
            return Err(HarnessError::Configuration(
                "lab.test_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn lab_config(&self) -> LabConfig {
        LabConfig {
            parallel_workbenches: self.lab.parallel_workbenches,
            test_timeout: Duration::from_secs(self.lab.test_timeout_secs),
        }
    }

    pub fn client_config(&self, server: ServerIdentity) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.client.timeout_secs),
            accept_invalid_certs: self.client.accept_invalid_certs,
            ..ClientConfig::new(server, self.client.user_id.clone())
        }
    }
}
