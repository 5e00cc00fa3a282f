//! Detaching a node's public IP and removing its interface after scale-in.

use super::{ReconcileError, Reconciler, ResourceRef, Step};
use crate::arm::{ControlPlane, ResourceKind};
use crate::resource::{NodeIdentity, NodeKind, interface_name_from_ip_config_id};
use crate::time::Sleeper;

impl<C: ControlPlane, S: Sleeper> Reconciler<C, S> {
    pub(super) async fn teardown(&self, node: &NodeIdentity) -> Result<(), ReconcileError> {
        if let NodeKind::ScaleSetMember { scale_set } = node.kind() {
            tracing::info!(
                node = %node,
                scale_set = %scale_set,
                "Scale set instances release their public IPs with the instance, skipping"
            );
            return Ok(());
        }

        let ip_name = node.public_ip_name();
        let ip = match self.control_plane.get_public_ip(&ip_name).await {
            Ok(ip) => ip,
            Err(e) if e.is_not_found() => {
                tracing::info!(node = %node, ip = %ip_name, "Public IP not found, nothing to disassociate");
                return Ok(());
            }
            Err(e) => {
                return Err(ReconcileError::step(
                    Step::GetPublicIp,
                    ResourceRef::new(ResourceKind::PublicIpAddress, ip_name),
                    e,
                ));
            }
        };

        let Some(config_id) = ip.ip_configuration_id() else {
            tracing::info!(node = %node, ip = %ip_name, "Public IP already disassociated");
            return Ok(());
        };
        if !config_id.contains("/ipConfigurations/") {
            return Err(ReconcileError::malformed(
                Step::GetPublicIp,
                ResourceRef::new(ResourceKind::PublicIpAddress, ip_name),
                format!("unexpected IP configuration reference '{config_id}'"),
            ));
        }

        let nic_name = interface_name_from_ip_config_id(config_id).to_string();
        let nic_ref = ResourceRef::new(ResourceKind::NetworkInterface, nic_name.as_str());
        let mut nic = match self.control_plane.get_interface(&nic_name).await {
            Ok(nic) => nic,
            Err(e) if e.is_not_found() => {
                tracing::info!(node = %node, nic = %nic_name, "Network interface already deleted");
                return Ok(());
            }
            Err(e) => return Err(ReconcileError::step(Step::GetNetworkInterface, nic_ref, e)),
        };

        let mut detached = false;
        if let Some(config) = nic
            .primary_ip_configuration_mut()
            .filter(|config| config.has_public_ip())
        {
            config.set_public_ip(None);

            tracing::info!(node = %node, ip = %ip_name, nic = %nic_name, "Detaching public IP");
            match self
                .submit_and_wait(self.control_plane.create_or_update_interface(&nic_name, &nic))
                .await
            {
                Ok(_) => detached = true,
                Err(e) if e.is_not_found() => {
                    tracing::info!(node = %node, nic = %nic_name, "Network interface removed while detaching");
                    return Ok(());
                }
                Err(e) => return Err(ReconcileError::step(Step::DetachPublicIp, nic_ref, e)),
            }
        }

        tracing::info!(node = %node, nic = %nic_name, "Deleting network interface");
        match self
            .submit_and_wait(self.control_plane.delete_interface(&nic_name))
            .await
        {
            Ok(_) => {
                tracing::info!(node = %node, nic = %nic_name, "Network interface deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(node = %node, nic = %nic_name, "Network interface already deleted");
                Ok(())
            }
            Err(e) if detached => Err(ReconcileError::partial(
                Step::DetachPublicIp,
                Step::DeleteNetworkInterface,
                nic_ref,
                e,
            )),
            Err(e) => Err(ReconcileError::step(Step::DeleteNetworkInterface, nic_ref, e)),
        }
    }
}
