//! Application execution logic.
//!
//! Turns a parsed subcommand into a [`Task`], wires the production
//! management API client, and runs the task until it finishes or a
//! shutdown signal arrives.

use std::fmt;

use thiserror::Error;
use tokio::signal;

use node_pip::arm::{ArmClient, HttpError, ReqwestClient, StaticTokenCredential};
use node_pip::config::{Command, ValidatedConfig};
use node_pip::reconcile::{PublicIpReconciler, ReconcileError, Reconciler};
use node_pip::resource::NodeIdentity;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// A reconciliation flow failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Shutdown was requested before the task finished.
    #[error("Interrupted while running {0}")]
    Interrupted(String),
}

/// One unit of work requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Give a node a public IP.
    Associate {
        /// Target node
        node: NodeIdentity,
        /// Public IP resource name
        ip_name: String,
    },
    /// Detach a node's public IP and delete its interface.
    Disassociate {
        /// Target node
        node: NodeIdentity,
    },
    /// Delete a public IP resource.
    DeleteIp {
        /// Public IP resource name
        ip_name: String,
    },
    /// Enable per-instance public IPs on a scale set.
    ApplyScaleSet {
        /// Scale set name
        scale_set: String,
    },
}

impl Task {
    /// Builds the task for a subcommand; `init` has none.
    pub fn from_command(command: &Command) -> Option<Self> {
        let task = match command {
            Command::Associate {
                node,
                provider_id,
                ip_name,
            } => {
                let node = NodeIdentity::new(node.as_str(), provider_id.as_str());
                let ip_name = ip_name.clone().unwrap_or_else(|| node.public_ip_name());
                Self::Associate { node, ip_name }
            }
            Command::Disassociate { node, provider_id } => Self::Disassociate {
                node: NodeIdentity::new(node.as_str(), provider_id.as_str()),
            },
            Command::DeleteIp { ip_name } => Self::DeleteIp {
                ip_name: ip_name.clone(),
            },
            Command::ApplyScaleSet { scale_set } => Self::ApplyScaleSet {
                scale_set: scale_set.clone(),
            },
            Command::Init { .. } => return None,
        };
        Some(task)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Associate { node, ip_name } => write!(f, "associate {ip_name} with {node}"),
            Self::Disassociate { node } => write!(f, "disassociate {node}"),
            Self::DeleteIp { ip_name } => write!(f, "delete-ip {ip_name}"),
            Self::ApplyScaleSet { scale_set } => write!(f, "apply-scale-set {scale_set}"),
        }
    }
}

/// Executes a task against the management API.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be built
/// - The reconciliation flow fails
/// - A shutdown signal arrives first; the in-flight wait is abandoned
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// a reachable management endpoint and OS signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, task: Task) -> Result<(), RunError> {
    let http = ReqwestClient::with_timeout(config.request_timeout).map_err(RunError::HttpClient)?;
    let location = config.scope.location.clone();
    let client = ArmClient::new(http, StaticTokenCredential::new(config.token), config.scope);
    let reconciler = Reconciler::new(client, location).with_poll_policy(config.poll_policy);

    let description = task.to_string();
    tokio::select! {
        result = run_task(&reconciler, task) => result,
        () = shutdown_signal() => {
            tracing::warn!("Shutdown signal received, abandoning {description}");
            Err(RunError::Interrupted(description))
        }
    }
}

/// Runs a task with any reconciler.
///
/// # Errors
///
/// Returns [`RunError::Reconcile`] if the flow fails.
pub async fn run_task<R: PublicIpReconciler>(reconciler: &R, task: Task) -> Result<(), RunError> {
    tracing::info!("Running {task}");

    match &task {
        Task::Associate { node, ip_name } => reconciler.associate_public_ip(node, ip_name).await?,
        Task::Disassociate { node } => reconciler.disassociate_and_cleanup(node).await?,
        Task::DeleteIp { ip_name } => reconciler.delete_public_ip(ip_name).await?,
        Task::ApplyScaleSet { scale_set } => {
            reconciler.apply_per_instance_public_ip(scale_set).await?;
        }
    }

    tracing::info!("Finished {task}");
    Ok(())
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that signal source never fires.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
