//! Errors reported by the reconciliation flows.

use std::fmt;

use thiserror::Error;

use crate::arm::{ArmError, ResourceKind};

/// A single step of a reconciliation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Read the node's virtual machine.
    GetVirtualMachine,
    /// Read a network interface.
    GetNetworkInterface,
    /// Create the node's public IP and wait for it.
    CreatePublicIp,
    /// Re-read a created public IP to learn its ID.
    FetchPublicIp,
    /// Reference the public IP from the interface and wait.
    AttachPublicIp,
    /// Read the node's public IP.
    GetPublicIp,
    /// Delete a public IP and wait.
    DeletePublicIp,
    /// Clear the public IP reference on the interface and wait.
    DetachPublicIp,
    /// Delete the interface and wait.
    DeleteNetworkInterface,
    /// Read the scale set.
    GetScaleSet,
    /// Write the per-instance public IP template and wait.
    UpdateScaleSet,
    /// Upgrade every instance to the new scale-set model and wait.
    UpdateScaleSetInstances,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GetVirtualMachine => "get virtual machine",
            Self::GetNetworkInterface => "get network interface",
            Self::CreatePublicIp => "create public IP",
            Self::FetchPublicIp => "fetch created public IP",
            Self::AttachPublicIp => "attach public IP to",
            Self::GetPublicIp => "get public IP",
            Self::DeletePublicIp => "delete public IP",
            Self::DetachPublicIp => "detach public IP from",
            Self::DeleteNetworkInterface => "delete network interface",
            Self::GetScaleSet => "get scale set",
            Self::UpdateScaleSet => "set public IP template on",
            Self::UpdateScaleSetInstances => "update instances of",
        };
        f.write_str(text)
    }
}

impl Step {
    /// The step's verb phrase, to be followed by the resource it acted on.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::GetVirtualMachine
            | Self::GetNetworkInterface
            | Self::GetPublicIp
            | Self::GetScaleSet => "get",
            Self::CreatePublicIp => "create",
            Self::FetchPublicIp => "fetch created",
            Self::AttachPublicIp => "attach public IP to",
            Self::DeletePublicIp | Self::DeleteNetworkInterface => "delete",
            Self::DetachPublicIp => "detach public IP from",
            Self::UpdateScaleSet => "set public IP template on",
            Self::UpdateScaleSetInstances => "update instances of",
        }
    }
}

/// The remote resource a step acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Resource kind
    pub kind: ResourceKind,
    /// Resource name within the resource group
    pub name: String,
}

impl ResourceRef {
    /// Creates a reference to `name` of the given kind.
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Failure of a reconciliation call.
///
/// Exactly one error is reported per call. Whether anything was already
/// changed remotely is encoded in the variant.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A step failed before anything was committed remotely.
    #[error("Failed to {} {resource}: {source}", step.action())]
    Step {
        /// The failing step
        step: Step,
        /// Resource the step acted on
        resource: ResourceRef,
        /// Underlying control-plane error
        #[source]
        source: ArmError,
    },

    /// A step failed after an earlier step was already committed.
    ///
    /// The committed change is left in place.
    #[error("Failed to {} {resource} after '{committed}' completed: {source}", step.action())]
    PartialChain {
        /// The last step that completed remotely
        committed: Step,
        /// The failing step
        step: Step,
        /// Resource the failing step acted on
        resource: ResourceRef,
        /// Underlying control-plane error
        #[source]
        source: ArmError,
    },

    /// A remote resource lacks a link the flow depends on.
    #[error("Cannot {} {resource}: {reason}", step.action())]
    MalformedResource {
        /// The step that needed the link
        step: Step,
        /// The resource that was read
        resource: ResourceRef,
        /// What was missing
        reason: String,
    },
}

impl ReconcileError {
    pub(crate) const fn step(step: Step, resource: ResourceRef, source: ArmError) -> Self {
        Self::Step {
            step,
            resource,
            source,
        }
    }

    pub(crate) const fn partial(
        committed: Step,
        step: Step,
        resource: ResourceRef,
        source: ArmError,
    ) -> Self {
        Self::PartialChain {
            committed,
            step,
            resource,
            source,
        }
    }

    pub(crate) fn malformed(step: Step, resource: ResourceRef, reason: impl Into<String>) -> Self {
        Self::MalformedResource {
            step,
            resource,
            reason: reason.into(),
        }
    }

    /// The step that failed.
    #[must_use]
    pub const fn failed_step(&self) -> Step {
        match self {
            Self::Step { step, .. }
            | Self::PartialChain { step, .. }
            | Self::MalformedResource { step, .. } => *step,
        }
    }

    /// The last committed step, for partial-chain failures.
    #[must_use]
    pub const fn committed_step(&self) -> Option<Step> {
        match self {
            Self::PartialChain { committed, .. } => Some(*committed),
            _ => None,
        }
    }

    /// The resource the failing step acted on.
    #[must_use]
    pub const fn resource(&self) -> &ResourceRef {
        match self {
            Self::Step { resource, .. }
            | Self::PartialChain { resource, .. }
            | Self::MalformedResource { resource, .. } => resource,
        }
    }

    /// The underlying control-plane error, if any.
    #[must_use]
    pub const fn arm_error(&self) -> Option<&ArmError> {
        match self {
            Self::Step { source, .. } | Self::PartialChain { source, .. } => Some(source),
            Self::MalformedResource { .. } => None,
        }
    }
}
