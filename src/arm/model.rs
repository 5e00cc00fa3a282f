//! Control-plane resource bodies.
//!
//! Only the fields this crate reads or writes are modeled. Everything else
//! the control plane returns is kept in the flattened `extra` maps, so a
//! GET, mutate, PUT cycle sends back what it received.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields preserved verbatim across a read-modify-write cycle.
pub type Extra = Map<String, Value>;

/// A reference to another resource by ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubResource {
    /// Full resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl SubResource {
    /// Creates a bare reference to `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            extra: Extra::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public IP addresses
// ---------------------------------------------------------------------------

/// `Microsoft.Network/publicIPAddresses`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicIpAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PublicIpAddressProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Properties of a public IP address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(
        rename = "publicIPAddressVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    #[serde(
        rename = "publicIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allocation_method: Option<String>,

    /// The IP configuration this address is attached to; `None` when unassociated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_configuration: Option<SubResource>,

    /// The allocated address, once the control plane has assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl PublicIpAddress {
    /// IPv4 address version.
    pub const IPV4: &'static str = "IPv4";

    /// Dynamic allocation method.
    pub const DYNAMIC: &'static str = "Dynamic";

    /// Creation body for a dynamically allocated IPv4 address.
    #[must_use]
    pub fn dynamic_ipv4(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            properties: Some(PublicIpAddressProperties {
                version: Some(Self::IPV4.to_string()),
                allocation_method: Some(Self::DYNAMIC.to_string()),
                ..PublicIpAddressProperties::default()
            }),
            ..Self::default()
        }
    }

    /// ID of the IP configuration this address is attached to.
    #[must_use]
    pub fn ip_configuration_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.ip_configuration.as_ref())
            .and_then(|c| c.id.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Network interfaces
// ---------------------------------------------------------------------------

/// `Microsoft.Network/networkInterfaces`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<NetworkInterfaceProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(default)]
    pub ip_configurations: Vec<InterfaceIpConfiguration>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One IP configuration of a network interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceIpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<InterfaceIpConfigurationProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceIpConfigurationProperties {
    /// The single associated public IP; omitted on PUT to detach.
    #[serde(
        rename = "publicIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address: Option<SubResource>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl NetworkInterface {
    /// The first IP configuration, which carries the public IP association.
    #[must_use]
    pub fn primary_ip_configuration(&self) -> Option<&InterfaceIpConfiguration> {
        self.properties
            .as_ref()
            .and_then(|p| p.ip_configurations.first())
    }

    /// Mutable access to the first IP configuration.
    pub fn primary_ip_configuration_mut(&mut self) -> Option<&mut InterfaceIpConfiguration> {
        self.properties
            .as_mut()
            .and_then(|p| p.ip_configurations.first_mut())
    }
}

impl InterfaceIpConfiguration {
    /// ID of the associated public IP, if any.
    #[must_use]
    pub fn public_ip_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.public_ip_address.as_ref())
            .and_then(|r| r.id.as_deref())
    }

    /// Returns true if a public IP is associated.
    #[must_use]
    pub fn has_public_ip(&self) -> bool {
        self.properties
            .as_ref()
            .is_some_and(|p| p.public_ip_address.is_some())
    }

    /// Replaces the public IP association; `None` detaches.
    pub fn set_public_ip(&mut self, public_ip: Option<SubResource>) {
        self.properties
            .get_or_insert_with(InterfaceIpConfigurationProperties::default)
            .public_ip_address = public_ip;
    }
}

// ---------------------------------------------------------------------------
// Virtual machines
// ---------------------------------------------------------------------------

/// `Microsoft.Compute/virtualMachines`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<VirtualMachineProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<VirtualMachineNetworkProfile>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineNetworkProfile {
    #[serde(default)]
    pub network_interfaces: Vec<SubResource>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl VirtualMachine {
    /// ID of the first network interface, treated as the primary one.
    #[must_use]
    pub fn primary_interface_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.network_profile.as_ref())
            .and_then(|n| n.network_interfaces.first())
            .and_then(|r| r.id.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Scale sets
// ---------------------------------------------------------------------------

/// `Microsoft.Compute/virtualMachineScaleSets`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachineScaleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ScaleSetProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_machine_profile: Option<ScaleSetVmProfile>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetVmProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<ScaleSetNetworkProfile>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetNetworkProfile {
    #[serde(default)]
    pub network_interface_configurations: Vec<ScaleSetInterfaceConfiguration>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleSetInterfaceConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ScaleSetInterfaceProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetInterfaceProperties {
    #[serde(default)]
    pub ip_configurations: Vec<ScaleSetIpConfiguration>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleSetIpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ScaleSetIpConfigurationProperties>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleSetIpConfigurationProperties {
    /// Per-instance public IP template.
    #[serde(
        rename = "publicIPAddressConfiguration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address_configuration: Option<ScaleSetPublicIpConfiguration>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Template from which every instance gets its own public IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleSetPublicIpConfiguration {
    pub name: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl ScaleSetPublicIpConfiguration {
    /// A template carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Extra::new(),
        }
    }
}

impl VirtualMachineScaleSet {
    /// IP configuration [0] of interface configuration [0].
    ///
    /// Returns `None` when any level of the network profile is missing or empty.
    #[must_use]
    pub fn primary_ip_configuration(&self) -> Option<&ScaleSetIpConfiguration> {
        self.properties
            .as_ref()?
            .virtual_machine_profile
            .as_ref()?
            .network_profile
            .as_ref()?
            .network_interface_configurations
            .first()?
            .properties
            .as_ref()?
            .ip_configurations
            .first()
    }

    /// Mutable access to IP configuration [0] of interface configuration [0].
    pub fn primary_ip_configuration_mut(&mut self) -> Option<&mut ScaleSetIpConfiguration> {
        self.properties
            .as_mut()?
            .virtual_machine_profile
            .as_mut()?
            .network_profile
            .as_mut()?
            .network_interface_configurations
            .first_mut()?
            .properties
            .as_mut()?
            .ip_configurations
            .first_mut()
    }
}

impl ScaleSetIpConfiguration {
    /// Name of the per-instance public IP template, if set.
    #[must_use]
    pub fn public_ip_template_name(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.public_ip_address_configuration.as_ref())
            .map(|c| c.name.as_str())
    }

    /// Replaces the per-instance public IP template.
    pub fn set_public_ip_template(&mut self, template: ScaleSetPublicIpConfiguration) {
        self.properties
            .get_or_insert_with(ScaleSetIpConfigurationProperties::default)
            .public_ip_address_configuration = Some(template);
    }
}

/// Body of the scale-set `manualupgrade` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIds {
    pub instance_ids: Vec<String>,
}

impl InstanceIds {
    /// Selector matching every instance.
    pub const ALL: &'static str = "*";

    /// Selects every current instance.
    #[must_use]
    pub fn all() -> Self {
        Self {
            instance_ids: vec![Self::ALL.to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and operation status
// ---------------------------------------------------------------------------

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudError {
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Body returned by an `Azure-AsyncOperation` status URL.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationStatusBody {
    pub status: String,
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}
