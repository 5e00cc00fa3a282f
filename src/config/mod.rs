//! Configuration layer for node-pip.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Environment** - `ARM_ACCESS_TOKEN`, for the bearer token only
//! 4. **Built-in defaults** - Hardcoded default values
//!
//! The scope fields (`subscription_id`, `resource_group`, `location`) and the
//! token have no defaults and must come from one of the sources above.
//!
//! # TOML-Only Options
//!
//! Some options are not available via CLI:
//! - `arm.network_api_version`, `arm.compute_api_version`
//! - `operation.max_poll_interval` (default: 60s)
//! - `operation.request_timeout` (default: 30s)

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{ArmSection, AuthSection, OperationSection, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
