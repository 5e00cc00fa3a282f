//! Validated configuration after merging CLI, TOML and environment sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::arm::{AccessToken, ArmScope};
use crate::lro::PollPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_sources`] to merge CLI args, an optional TOML
/// config and the token environment variable, or [`ValidatedConfig::load`]
/// to do the same with the file and environment read for you.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Scope shared by every management API request
    pub scope: ArmScope,

    /// Bearer token for the management API
    pub token: AccessToken,

    /// Polling cadence and per-operation limit
    pub poll_policy: PollPolicy,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeout = self
            .poll_policy
            .timeout
            .map_or_else(|| "none".to_string(), |t| format!("{}s", t.as_secs()));

        write!(
            f,
            "Config {{ endpoint: {}, subscription: {}, resource_group: {}, location: {}, \
             api_versions: network={}/compute={}, poll: {}s..{}s, operation_timeout: {}, \
             request_timeout: {}s }}",
            self.scope.endpoint,
            self.scope.subscription_id,
            self.scope.resource_group,
            self.scope.location,
            self.scope.network_api_version,
            self.scope.compute_api_version,
            self.poll_policy.interval.as_secs(),
            self.poll_policy.max_interval.as_secs(),
            timeout,
            self.request_timeout.as_secs(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// Equivalent to [`ValidatedConfig::from_sources`] without an environment token.
    ///
    /// # Errors
    ///
    /// See [`ValidatedConfig::from_sources`].
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        Self::from_sources(cli, toml, None)
    }

    /// Creates a validated configuration from every source.
    ///
    /// Explicit CLI values win, then TOML, then `env_token` (token only),
    /// then built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`subscription_id`, `resource_group`, `location`, `token`)
    /// - A provided string value is empty
    /// - The endpoint URL is invalid
    /// - Duration values are zero or inconsistent
    pub fn from_sources(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        env_token: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let scope = Self::resolve_scope(cli, toml)?;
        let token = Self::resolve_token(cli, toml, env_token)?;
        let poll_policy = Self::resolve_poll_policy(cli, toml)?;
        let request_timeout = Self::resolve_request_timeout(toml)?;

        Ok(Self {
            scope,
            token,
            poll_policy,
            request_timeout,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI, optional config file and environment.
    ///
    /// If `cli.config` is set, loads the TOML file from that path. The token
    /// falls back to the `ARM_ACCESS_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };
        let env_token = std::env::var(defaults::TOKEN_ENV).ok();

        Self::from_sources(cli, toml.as_ref(), env_token.as_deref())
    }

    fn resolve_scope(cli: &Cli, toml: Option<&TomlConfig>) -> Result<ArmScope, ConfigError> {
        let arm = toml.map(|t| &t.arm);

        let subscription_id = required(
            cli.subscription_id
                .as_deref()
                .or_else(|| arm.and_then(|a| a.subscription_id.as_deref())),
            field::SUBSCRIPTION_ID,
            "Use --subscription-id or set arm.subscription_id in config file",
        )?;
        let resource_group = required(
            cli.resource_group
                .as_deref()
                .or_else(|| arm.and_then(|a| a.resource_group.as_deref())),
            field::RESOURCE_GROUP,
            "Use --resource-group or set arm.resource_group in config file",
        )?;
        let location = required(
            cli.location
                .as_deref()
                .or_else(|| arm.and_then(|a| a.location.as_deref())),
            field::LOCATION,
            "Use --location or set arm.location in config file",
        )?;

        let mut scope = ArmScope::new(subscription_id, resource_group, location);

        if let Some(endpoint) = cli
            .endpoint
            .as_deref()
            .or_else(|| arm.and_then(|a| a.endpoint.as_deref()))
        {
            scope = scope.with_endpoint(parse_endpoint(endpoint)?);
        }

        if let Some(arm) = arm {
            let network = arm
                .network_api_version
                .as_deref()
                .unwrap_or(&scope.network_api_version);
            let compute = arm
                .compute_api_version
                .as_deref()
                .unwrap_or(&scope.compute_api_version);
            let (network, compute) = (
                non_empty(network, "network_api_version")?.to_string(),
                non_empty(compute, "compute_api_version")?.to_string(),
            );
            scope = scope.with_api_versions(network, compute);
        }

        Ok(scope)
    }

    fn resolve_token(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        env_token: Option<&str>,
    ) -> Result<AccessToken, ConfigError> {
        // Blank values are treated as unset so an empty variable does not mask a real source.
        let token = cli
            .token
            .as_deref()
            .or_else(|| toml.and_then(|t| t.auth.token.as_deref()))
            .or(env_token)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ConfigError::missing(
                    field::TOKEN,
                    "Set ARM_ACCESS_TOKEN, use --token or set auth.token in config file",
                )
            })?;

        Ok(AccessToken::new(token))
    }

    fn resolve_poll_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<PollPolicy, ConfigError> {
        let operation = toml.map(|t| &t.operation);

        // Priority: CLI explicit > TOML > default
        let interval = seconds(
            "poll_interval",
            cli.poll_interval
                .or_else(|| operation.and_then(|o| o.poll_interval))
                .unwrap_or(defaults::POLL_INTERVAL_SECS),
        )?;
        let max_interval = seconds(
            "max_poll_interval",
            operation
                .and_then(|o| o.max_poll_interval)
                .unwrap_or(defaults::MAX_POLL_INTERVAL_SECS),
        )?;
        let timeout = seconds(
            "operation_timeout",
            cli.operation_timeout
                .or_else(|| operation.and_then(|o| o.timeout))
                .unwrap_or(defaults::OPERATION_TIMEOUT_SECS),
        )?;

        if max_interval < interval {
            return Err(ConfigError::InvalidDuration {
                field: "max_poll_interval",
                reason: format!(
                    "must not be below poll_interval ({}s)",
                    interval.as_secs()
                ),
            });
        }

        Ok(PollPolicy::new()
            .with_interval(interval)
            .with_max_interval(max_interval)
            .with_timeout(Some(timeout)))
    }

    fn resolve_request_timeout(toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        toml.and_then(|t| t.operation.request_timeout)
            .map_or(Ok(defaults::request_timeout()), |secs| {
                seconds("request_timeout", secs)
            })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn required<'a>(
    value: Option<&'a str>,
    name: &'static str,
    hint: &'static str,
) -> Result<&'a str, ConfigError> {
    value.map_or(Err(ConfigError::missing(name, hint)), |v| non_empty(v, name))
}

fn non_empty<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { field: name });
    }
    Ok(trimmed)
}

fn seconds(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidDuration {
            field: name,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}
