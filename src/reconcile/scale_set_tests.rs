//! Tests for the per-instance public IP template flow.

use http::StatusCode;
use serde_json::json;

use super::fake::{FakeCloud, Failure, Op, scale_set, scale_set_provider_id};
use super::{PublicIpReconciler, ReconcileError, Reconciler, Step};
use crate::arm::model::{InstanceIds, VirtualMachineScaleSet};
use crate::lro::{OperationWaiter, PollPolicy};
use crate::resource::NodeIdentity;
use crate::time::InstantSleeper;

fn reconciler(cloud: FakeCloud) -> Reconciler<FakeCloud, InstantSleeper> {
    Reconciler::new(cloud, "westeurope")
        .with_waiter(OperationWaiter::new(PollPolicy::new()).with_sleeper(InstantSleeper))
}

fn template_name(cloud: &FakeCloud, name: &str) -> Option<String> {
    cloud
        .scale_set(name)
        .unwrap()
        .primary_ip_configuration()
        .and_then(|c| c.public_ip_template_name())
        .map(str::to_string)
}

fn scale_set_from(value: serde_json::Value) -> VirtualMachineScaleSet {
    serde_json::from_value(value).unwrap()
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn scale_set_member_gets_template_instead_of_ip() {
        let reconciler = reconciler(FakeCloud::new().with_scale_set(scale_set("vmss-pool-0")));
        let node = NodeIdentity::new("vmss-pool-0_3", scale_set_provider_id("vmss-pool-0", 3));

        reconciler
            .associate_public_ip(&node, "vmss-pool-0_3-ip")
            .await
            .unwrap();

        let cloud = reconciler.control_plane();
        assert_eq!(
            template_name(cloud, "vmss-pool-0").as_deref(),
            Some("vmss-pool-0_public_ip")
        );
        assert_eq!(
            cloud.instance_updates(),
            vec![("vmss-pool-0".to_string(), InstanceIds::all())]
        );
        assert!(cloud.public_ip("vmss-pool-0_3-ip").is_none());
        assert_eq!(
            cloud.ops(),
            vec![Op::GetScaleSet, Op::PutScaleSet, Op::UpdateInstances]
        );
    }
}

mod apply {
    use super::*;

    #[tokio::test]
    async fn sets_template_and_upgrades_all_instances() {
        let reconciler = reconciler(FakeCloud::new().with_scale_set(scale_set("pool")));

        reconciler.apply_per_instance_public_ip("pool").await.unwrap();

        let cloud = reconciler.control_plane();
        assert_eq!(template_name(cloud, "pool").as_deref(), Some("pool_public_ip"));
        assert_eq!(cloud.instance_updates()[0].1.instance_ids, vec!["*"]);
    }

    #[tokio::test]
    async fn keeps_unrelated_scale_set_settings() {
        let reconciler = reconciler(FakeCloud::new().with_scale_set(scale_set("pool")));

        reconciler.apply_per_instance_public_ip("pool").await.unwrap();

        let body = serde_json::to_value(reconciler.control_plane().scale_set("pool").unwrap()).unwrap();
        assert_eq!(body["sku"]["capacity"], 3);
        assert_eq!(body["properties"]["upgradePolicy"]["mode"], "Manual");
        let config = &body["properties"]["virtualMachineProfile"]["networkProfile"]
            ["networkInterfaceConfigurations"][0]["properties"]["ipConfigurations"][0]["properties"];
        assert_eq!(config["subnet"]["id"], "/subnets/default");
    }

    #[tokio::test]
    async fn applying_twice_succeeds() {
        let reconciler = reconciler(FakeCloud::new().with_scale_set(scale_set("pool")));

        reconciler.apply_per_instance_public_ip("pool").await.unwrap();
        reconciler.apply_per_instance_public_ip("pool").await.unwrap();

        let cloud = reconciler.control_plane();
        assert_eq!(template_name(cloud, "pool").as_deref(), Some("pool_public_ip"));
        assert_eq!(cloud.instance_updates().len(), 2);
    }
}

mod empty_profiles {
    use super::*;

    async fn assert_no_op(model: VirtualMachineScaleSet) {
        let reconciler = reconciler(FakeCloud::new().with_scale_set(model));

        reconciler.apply_per_instance_public_ip("pool").await.unwrap();

        let cloud = reconciler.control_plane();
        assert_eq!(cloud.ops(), vec![Op::GetScaleSet]);
        assert!(cloud.instance_updates().is_empty());
    }

    #[tokio::test]
    async fn missing_properties() {
        assert_no_op(scale_set_from(json!({ "name": "pool" }))).await;
    }

    #[tokio::test]
    async fn missing_network_profile() {
        assert_no_op(scale_set_from(json!({
            "name": "pool",
            "properties": { "virtualMachineProfile": {} }
        })))
        .await;
    }

    #[tokio::test]
    async fn empty_interface_list() {
        assert_no_op(scale_set_from(json!({
            "name": "pool",
            "properties": {
                "virtualMachineProfile": {
                    "networkProfile": { "networkInterfaceConfigurations": [] }
                }
            }
        })))
        .await;
    }

    #[tokio::test]
    async fn empty_ip_configuration_list() {
        assert_no_op(scale_set_from(json!({
            "name": "pool",
            "properties": {
                "virtualMachineProfile": {
                    "networkProfile": {
                        "networkInterfaceConfigurations": [
                            { "name": "nic", "properties": { "ipConfigurations": [] } }
                        ]
                    }
                }
            }
        })))
        .await;
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn missing_scale_set_is_reported() {
        let reconciler = reconciler(FakeCloud::new());

        let err = reconciler
            .apply_per_instance_public_ip("pool")
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Step::GetScaleSet);
        assert!(err.arm_error().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn rejected_model_update_skips_instance_upgrade() {
        let cloud = FakeCloud::new().with_scale_set(scale_set("pool"));
        cloud.fail(Op::PutScaleSet, Failure::Reject(StatusCode::CONFLICT));
        let reconciler = reconciler(cloud);

        let err = reconciler
            .apply_per_instance_public_ip("pool")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::Step {
                step: Step::UpdateScaleSet,
                ..
            }
        ));
        assert!(!reconciler.control_plane().ops().contains(&Op::UpdateInstances));
        assert_eq!(template_name(reconciler.control_plane(), "pool"), None);
    }

    #[tokio::test]
    async fn failed_instance_upgrade_is_partial_chain() {
        let cloud = FakeCloud::new().with_scale_set(scale_set("pool"));
        cloud.fail(Op::UpdateInstances, Failure::OperationFailed);
        let reconciler = reconciler(cloud);

        let err = reconciler
            .apply_per_instance_public_ip("pool")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::PartialChain {
                committed: Step::UpdateScaleSet,
                step: Step::UpdateScaleSetInstances,
                ..
            }
        ));
        assert_eq!(
            template_name(reconciler.control_plane(), "pool").as_deref(),
            Some("pool_public_ip")
        );
    }
}
