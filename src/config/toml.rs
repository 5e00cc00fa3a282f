//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Management API scope
    #[serde(default)]
    pub arm: ArmSection,

    /// Credentials
    #[serde(default)]
    pub auth: AuthSection,

    /// Long-running operation handling
    #[serde(default)]
    pub operation: OperationSection,
}

/// Management API scope section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmSection {
    /// Subscription ID
    pub subscription_id: Option<String>,

    /// Resource group holding the node resources
    pub resource_group: Option<String>,

    /// Location for newly created public IPs
    pub location: Option<String>,

    /// Management endpoint base URL
    pub endpoint: Option<String>,

    /// API version for `Microsoft.Network`
    pub network_api_version: Option<String>,

    /// API version for `Microsoft.Compute`
    pub compute_api_version: Option<String>,
}

/// Credentials section.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Bearer token
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Long-running operation section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationSection {
    /// Delay between polls in seconds
    pub poll_interval: Option<u64>,

    /// Upper bound for any delay between polls in seconds
    pub max_poll_interval: Option<u64>,

    /// Limit for a single operation in seconds
    pub timeout: Option<u64>,

    /// Limit for a single HTTP request in seconds
    pub request_timeout: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or has unknown fields.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# node-pip Configuration File

[arm]
# Subscription ID (required)
# subscription_id = "00000000-0000-0000-0000-000000000000"

# Resource group holding the node VMs, interfaces and public IPs (required)
# resource_group = "cluster-rg"

# Location for newly created public IPs (required)
# location = "westeurope"

# Management endpoint (default: https://management.azure.com)
# endpoint = "https://management.azure.com"

# API versions (defaults shown)
# network_api_version = "2017-09-01"
# compute_api_version = "2018-10-01"

[auth]
# Bearer token for the management API.
# Prefer the ARM_ACCESS_TOKEN environment variable over storing it here.
# token = ""

[operation]
# Delay between polls of a long-running operation in seconds (default: 5)
# The control plane's Retry-After hint takes precedence.
# poll_interval = 5

# Upper bound for any delay between polls in seconds (default: 60)
# max_poll_interval = 60

# Give up waiting for a single operation after this many seconds (default: 900)
# timeout = 900

# Timeout for a single HTTP request in seconds (default: 30)
# request_timeout = 30
"#
    .to_string()
}
