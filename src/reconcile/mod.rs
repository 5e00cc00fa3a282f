//! Public IP reconciliation flows.
//!
//! This module provides:
//! - The [`PublicIpReconciler`] seam consumed by the cluster layer
//! - [`Reconciler`], which runs the flows against a [`ControlPlane`]
//! - [`ReconcileError`], which names the failing step and any committed one
//!
//! Every flow is a strict sequence of control-plane calls. Mutations are
//! submitted and then awaited to a terminal state before the next step.

mod error;
mod scale_set;
mod standalone;
mod teardown;

#[cfg(test)]
mod fake;
#[cfg(test)]
mod scale_set_tests;

use std::future::Future;

use serde::de::DeserializeOwned;

pub use error::{ReconcileError, ResourceRef, Step};

use crate::arm::{ArmError, ControlPlane};
use crate::lro::{Operation, OperationWaiter, PollPolicy};
use crate::resource::{NodeIdentity, NodeKind};
use crate::time::{Sleeper, TokioSleeper};

/// Reconciles public IPs of cluster nodes.
///
/// Implementations must be safe to call concurrently for different nodes.
/// Overlapping calls for the same node are not coordinated.
pub trait PublicIpReconciler: Send + Sync {
    /// Gives `node` a public IP named `ip_name`.
    ///
    /// Standalone VMs get a new dynamic IPv4 address attached to their
    /// primary interface. Scale-set members get the per-instance template
    /// applied to their scale set instead, and `ip_name` is not used.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] naming the failing step. A public IP that
    /// was created before the failure is not removed.
    fn associate_public_ip(
        &self,
        node: &NodeIdentity,
        ip_name: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Deletes a public IP. Deleting an absent IP succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the deletion is rejected or fails.
    fn delete_public_ip(
        &self,
        ip_name: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Detaches a standalone node's public IP and deletes its interface.
    ///
    /// Scale-set members are skipped. Missing resources count as already
    /// cleaned up.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] naming the failing step.
    fn disassociate_and_cleanup(
        &self,
        node: &NodeIdentity,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;

    /// Enables per-instance public IPs on a scale set and upgrades its instances.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] naming the failing step.
    fn apply_per_instance_public_ip(
        &self,
        scale_set: &str,
    ) -> impl Future<Output = Result<(), ReconcileError>> + Send;
}

/// Runs the reconciliation flows against a control plane.
///
/// Holds no mutable state, so one instance can be shared (for example in an
/// `Arc`) across concurrently running flows.
///
/// # Type Parameters
///
/// - `C`: The control-plane client
/// - `S`: The sleeper used between operation polls (defaults to [`TokioSleeper`])
#[derive(Debug, Clone)]
pub struct Reconciler<C, S = TokioSleeper> {
    control_plane: C,
    waiter: OperationWaiter<S>,
    location: String,
}

impl<C> Reconciler<C, TokioSleeper> {
    /// Creates a reconciler that creates resources in `location`.
    #[must_use]
    pub fn new(control_plane: C, location: impl Into<String>) -> Self {
        Self {
            control_plane,
            waiter: OperationWaiter::default(),
            location: location.into(),
        }
    }

    /// Sets the policy used to wait for long-running operations.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.waiter = OperationWaiter::new(policy);
        self
    }
}

impl<C, S> Reconciler<C, S> {
    /// Replaces the operation waiter.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_waiter<S2>(self, waiter: OperationWaiter<S2>) -> Reconciler<C, S2> {
        Reconciler {
            control_plane: self.control_plane,
            waiter,
            location: self.location,
        }
    }

    /// Returns the control-plane client.
    #[must_use]
    pub const fn control_plane(&self) -> &C {
        &self.control_plane
    }

    /// Returns the location new public IPs are created in.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl<C: ControlPlane, S: Sleeper> Reconciler<C, S> {
    /// Awaits a submitted mutation, then waits for it to finish.
    async fn submit_and_wait<T, F>(&self, submit: F) -> Result<Option<T>, ArmError>
    where
        T: DeserializeOwned + Send,
        F: Future<Output = Result<Operation<T>, ArmError>> + Send,
    {
        let operation = submit.await?;
        self.waiter.wait(&self.control_plane, operation).await
    }
}

impl<C: ControlPlane, S: Sleeper> PublicIpReconciler for Reconciler<C, S> {
    async fn associate_public_ip(
        &self,
        node: &NodeIdentity,
        ip_name: &str,
    ) -> Result<(), ReconcileError> {
        match node.kind() {
            NodeKind::Standalone => self.associate_standalone(node, ip_name).await,
            NodeKind::ScaleSetMember { scale_set } => {
                tracing::info!(
                    node = %node,
                    scale_set = %scale_set,
                    "Node is a scale set member, applying per-instance public IP template"
                );
                self.apply_scale_set_template(&scale_set).await
            }
        }
    }

    async fn delete_public_ip(&self, ip_name: &str) -> Result<(), ReconcileError> {
        self.delete_ip(ip_name).await
    }

    async fn disassociate_and_cleanup(&self, node: &NodeIdentity) -> Result<(), ReconcileError> {
        self.teardown(node).await
    }

    async fn apply_per_instance_public_ip(&self, scale_set: &str) -> Result<(), ReconcileError> {
        self.apply_scale_set_template(scale_set).await
    }
}
