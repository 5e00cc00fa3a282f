//! ARM resource identifier helpers.
//!
//! ARM identifiers look like:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{child-type}/{child-name}]
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Matches provider IDs of scale-set instances and captures the scale-set name.
static SCALE_SET_PROVIDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r".*/subscriptions/(?:.*)/Microsoft\.Compute/virtualMachineScaleSets/([^/]+)/virtualMachines(?:.*)",
    )
    .expect("scale set provider ID pattern is a valid regex")
});

/// Extracts the scale-set name from a node's provider ID.
///
/// Returns `None` when the provider ID does not describe a scale-set
/// instance. That is the common case for standalone VMs and is not an error.
///
/// # Example
///
/// ```
/// use node_pip::resource::extract_scale_set_name;
///
/// let id = "azure:///subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachineScaleSets/pool/virtualMachines/3";
/// assert_eq!(extract_scale_set_name(id), Some("pool"));
///
/// let vm = "azure:///subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/worker-1";
/// assert_eq!(extract_scale_set_name(vm), None);
/// ```
#[must_use]
pub fn extract_scale_set_name(provider_id: &str) -> Option<&str> {
    SCALE_SET_PROVIDER_ID
        .captures(provider_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns the trailing segment of a resource ID.
///
/// Precondition: `full_id` is a `/`-separated ARM identifier such as
/// `/subscriptions/A/resourceGroups/B/providers/Microsoft.Network/publicIPAddresses/worker-1-ip`,
/// for which this returns `worker-1-ip`. A string without `/` is returned unchanged.
#[must_use]
pub fn short_name(full_id: &str) -> &str {
    full_id.rsplit('/').next().unwrap_or(full_id)
}

/// Returns the network interface name from an IP configuration ID.
///
/// Precondition: `ip_config_id` has the shape
/// `…/networkInterfaces/{nic}/ipConfigurations/{config}`; the NIC name is
/// the third segment from the end.
///
/// # Panics
///
/// Panics if the identifier has fewer than three segments. Such an ID
/// cannot come from the control plane and indicates a caller bug.
#[must_use]
pub fn interface_name_from_ip_config_id(ip_config_id: &str) -> &str {
    ip_config_id.rsplit('/').nth(2).unwrap_or_else(|| {
        panic!(
            "IP configuration ID '{ip_config_id}' must look like \
             .../networkInterfaces/{{nic}}/ipConfigurations/{{config}}"
        )
    })
}
