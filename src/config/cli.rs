//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// node-pip: public IP reconciliation for cluster nodes
///
/// Attaches public IPs to standalone VMs, cleans them up after scale-in,
/// and enables per-instance public IPs on scale sets.
#[derive(Debug, Parser)]
#[command(name = "node-pip")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Subscription ID holding the node resources
    #[arg(long = "subscription-id", global = true)]
    pub subscription_id: Option<String>,

    /// Resource group holding the node resources
    #[arg(long = "resource-group", global = true)]
    pub resource_group: Option<String>,

    /// Location for newly created public IPs
    #[arg(long, global = true)]
    pub location: Option<String>,

    /// Management endpoint base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bearer token for the management API (prefer ARM_ACCESS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Delay between operation polls in seconds
    #[arg(long = "poll-interval", global = true)]
    pub poll_interval: Option<u64>,

    /// Give up waiting for a single operation after this many seconds
    #[arg(long = "operation-timeout", global = true)]
    pub operation_timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a public IP and attach it to the node's primary interface
    ///
    /// Scale set members get the per-instance template on their scale set instead.
    Associate {
        /// Node name
        #[arg(long)]
        node: String,

        /// Provider ID reported by the node (azure:///subscriptions/...)
        #[arg(long = "provider-id")]
        provider_id: String,

        /// Public IP name (default: <node>-ip)
        #[arg(long = "ip-name")]
        ip_name: Option<String>,
    },

    /// Detach the node's public IP and delete its network interface
    Disassociate {
        /// Node name
        #[arg(long)]
        node: String,

        /// Provider ID reported by the node
        #[arg(long = "provider-id")]
        provider_id: String,
    },

    /// Delete a public IP resource
    DeleteIp {
        /// Public IP name
        #[arg(long = "ip-name")]
        ip_name: String,
    },

    /// Set the per-instance public IP template on a scale set
    ApplyScaleSet {
        /// Scale set name
        #[arg(long = "scale-set")]
        scale_set: String,
    },

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the environment.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if running the init subcommand.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
