//! Per-resource-kind control-plane clients.
//!
//! Each trait is the narrow surface the reconciler needs from one resource
//! kind. Mutations return an [`Operation`] that must be driven to completion
//! with an [`OperationWaiter`](crate::lro::OperationWaiter).
//!
//! Method names carry the resource kind so one type can implement every
//! trait without ambiguity.

use std::future::Future;

use super::ArmError;
use super::model::{
    InstanceIds, NetworkInterface, PublicIpAddress, VirtualMachine, VirtualMachineScaleSet,
};
use crate::lro::{NoContent, Operation, OperationPoller};

/// `Microsoft.Network/publicIPAddresses`
pub trait PublicIpAddresses: Send + Sync {
    /// Fetches a public IP by name.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if it does not exist.
    fn get_public_ip(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<PublicIpAddress, ArmError>> + Send;

    /// Submits a create-or-update of a public IP.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn create_or_update_public_ip(
        &self,
        name: &str,
        public_ip: &PublicIpAddress,
    ) -> impl Future<Output = Result<Operation<PublicIpAddress>, ArmError>> + Send;

    /// Submits deletion of a public IP.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn delete_public_ip(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Operation<NoContent>, ArmError>> + Send;
}

/// `Microsoft.Network/networkInterfaces`
pub trait NetworkInterfaces: Send + Sync {
    /// Fetches a network interface by name.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if it does not exist.
    fn get_interface(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<NetworkInterface, ArmError>> + Send;

    /// Submits a create-or-update of a network interface.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn create_or_update_interface(
        &self,
        name: &str,
        interface: &NetworkInterface,
    ) -> impl Future<Output = Result<Operation<NetworkInterface>, ArmError>> + Send;

    /// Submits deletion of a network interface.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn delete_interface(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Operation<NoContent>, ArmError>> + Send;
}

/// `Microsoft.Compute/virtualMachines`
pub trait VirtualMachines: Send + Sync {
    /// Fetches a virtual machine by name, including its instance view.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if it does not exist.
    fn get_virtual_machine(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<VirtualMachine, ArmError>> + Send;
}

/// `Microsoft.Compute/virtualMachineScaleSets`
pub trait ScaleSets: Send + Sync {
    /// Fetches a scale set by name.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if it does not exist.
    fn get_scale_set(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<VirtualMachineScaleSet, ArmError>> + Send;

    /// Submits a create-or-update of a scale set.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn create_or_update_scale_set(
        &self,
        name: &str,
        scale_set: &VirtualMachineScaleSet,
    ) -> impl Future<Output = Result<Operation<VirtualMachineScaleSet>, ArmError>> + Send;

    /// Submits an upgrade of the selected instances to the latest scale-set model.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the control plane rejects the request.
    fn update_scale_set_instances(
        &self,
        name: &str,
        instances: &InstanceIds,
    ) -> impl Future<Output = Result<Operation<NoContent>, ArmError>> + Send;
}

/// Everything the reconciler needs from the control plane.
///
/// Implemented automatically for any type that implements the individual
/// client traits and can poll operations.
pub trait ControlPlane:
    PublicIpAddresses + NetworkInterfaces + VirtualMachines + ScaleSets + OperationPoller
{
}

impl<T> ControlPlane for T where
    T: PublicIpAddresses + NetworkInterfaces + VirtualMachines + ScaleSets + OperationPoller
{
}
