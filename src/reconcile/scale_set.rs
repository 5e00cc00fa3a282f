//! Per-instance public IP template for scale sets.

use super::{ReconcileError, Reconciler, ResourceRef, Step};
use crate::arm::model::{InstanceIds, ScaleSetPublicIpConfiguration};
use crate::arm::{ControlPlane, ResourceKind};
use crate::resource::scale_set_public_ip_name;
use crate::time::Sleeper;

impl<C: ControlPlane, S: Sleeper> Reconciler<C, S> {
    /// Sets the public IP template on the primary IP configuration, then
    /// upgrades every instance to the new model.
    ///
    /// A scale set without a network profile has nothing to configure and
    /// is left untouched.
    pub(super) async fn apply_scale_set_template(
        &self,
        scale_set: &str,
    ) -> Result<(), ReconcileError> {
        let resource = ResourceRef::new(ResourceKind::ScaleSet, scale_set);
        let mut model = self
            .control_plane
            .get_scale_set(scale_set)
            .await
            .map_err(|e| ReconcileError::step(Step::GetScaleSet, resource.clone(), e))?;

        let Some(config) = model.primary_ip_configuration_mut() else {
            tracing::info!(scale_set, "Scale set has no network profile, nothing to configure");
            return Ok(());
        };

        let template = scale_set_public_ip_name(scale_set);
        config.set_public_ip_template(ScaleSetPublicIpConfiguration::named(template.as_str()));

        tracing::info!(scale_set, template = %template, "Setting per-instance public IP template");
        self.submit_and_wait(self.control_plane.create_or_update_scale_set(scale_set, &model))
            .await
            .map_err(|e| ReconcileError::step(Step::UpdateScaleSet, resource.clone(), e))?;

        tracing::info!(scale_set, "Upgrading scale set instances");
        self.submit_and_wait(
            self.control_plane
                .update_scale_set_instances(scale_set, &InstanceIds::all()),
        )
        .await
        .map_err(|e| {
            tracing::warn!(
                scale_set,
                "Template was saved but instances were not upgraded"
            );
            ReconcileError::partial(Step::UpdateScaleSet, Step::UpdateScaleSetInstances, resource, e)
        })?;

        tracing::info!(scale_set, "Per-instance public IPs applied");
        Ok(())
    }
}
