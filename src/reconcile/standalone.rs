//! Public IP association for standalone virtual machines.

use super::{ReconcileError, Reconciler, ResourceRef, Step};
use crate::arm::model::{PublicIpAddress, SubResource};
use crate::arm::{ControlPlane, ResourceKind};
use crate::resource::{NodeIdentity, short_name};
use crate::time::Sleeper;

impl<C: ControlPlane, S: Sleeper> Reconciler<C, S> {
    /// Creates `ip_name` and attaches it to the node's primary interface.
    pub(super) async fn associate_standalone(
        &self,
        node: &NodeIdentity,
        ip_name: &str,
    ) -> Result<(), ReconcileError> {
        let vm_ref = ResourceRef::new(ResourceKind::VirtualMachine, node.name());
        let vm = self
            .control_plane
            .get_virtual_machine(node.name())
            .await
            .map_err(|e| ReconcileError::step(Step::GetVirtualMachine, vm_ref.clone(), e))?;
        let Some(nic_id) = vm.primary_interface_id() else {
            return Err(ReconcileError::malformed(
                Step::GetVirtualMachine,
                vm_ref,
                "virtual machine has no network interfaces",
            ));
        };

        let nic_name = short_name(nic_id).to_string();
        let nic_ref = ResourceRef::new(ResourceKind::NetworkInterface, nic_name.as_str());
        let mut nic = self
            .control_plane
            .get_interface(&nic_name)
            .await
            .map_err(|e| ReconcileError::step(Step::GetNetworkInterface, nic_ref.clone(), e))?;

        // Checked before the IP exists so a malformed interface leaves nothing behind.
        let Some(config) = nic.primary_ip_configuration_mut() else {
            return Err(ReconcileError::malformed(
                Step::AttachPublicIp,
                nic_ref,
                "network interface has no IP configurations",
            ));
        };

        tracing::info!(node = %node, ip = ip_name, location = self.location(), "Creating public IP");
        let ip_ref = ResourceRef::new(ResourceKind::PublicIpAddress, ip_name);
        let body = PublicIpAddress::dynamic_ipv4(ip_name, self.location());
        let created = self
            .submit_and_wait(self.control_plane.create_or_update_public_ip(ip_name, &body))
            .await
            .map_err(|e| ReconcileError::step(Step::CreatePublicIp, ip_ref.clone(), e))?;

        let ip_id = match created.and_then(|ip| ip.id) {
            Some(id) => id,
            None => self
                .control_plane
                .get_public_ip(ip_name)
                .await
                .map_err(|e| {
                    ReconcileError::partial(Step::CreatePublicIp, Step::FetchPublicIp, ip_ref.clone(), e)
                })?
                .id
                .ok_or_else(|| {
                    ReconcileError::malformed(Step::FetchPublicIp, ip_ref, "public IP has no resource ID")
                })?,
        };

        config.set_public_ip(Some(SubResource::new(ip_id)));

        tracing::info!(node = %node, ip = ip_name, nic = %nic_name, "Attaching public IP to network interface");
        self.submit_and_wait(self.control_plane.create_or_update_interface(&nic_name, &nic))
            .await
            .map_err(|e| {
                tracing::warn!(
                    node = %node,
                    ip = ip_name,
                    "Public IP was created but could not be attached; it is left in place"
                );
                ReconcileError::partial(Step::CreatePublicIp, Step::AttachPublicIp, nic_ref, e)
            })?;

        tracing::info!(node = %node, ip = ip_name, nic = %nic_name, "Public IP associated");
        Ok(())
    }

    /// Deletes `ip_name`, treating a missing IP as already deleted.
    pub(super) async fn delete_ip(&self, ip_name: &str) -> Result<(), ReconcileError> {
        tracing::info!(ip = ip_name, "Deleting public IP");
        match self
            .submit_and_wait(self.control_plane.delete_public_ip(ip_name))
            .await
        {
            Ok(_) => {
                tracing::info!(ip = ip_name, "Public IP deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(ip = ip_name, "Public IP already absent");
                Ok(())
            }
            Err(e) => Err(ReconcileError::step(
                Step::DeletePublicIp,
                ResourceRef::new(ResourceKind::PublicIpAddress, ip_name),
                e,
            )),
        }
    }
}
