//! Subscription, resource group and location the clients operate in.

use std::fmt;

use url::Url;

use super::ArmError;

/// Public Azure Resource Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Network resource provider API version (public IPs, network interfaces).
pub const DEFAULT_NETWORK_API_VERSION: &str = "2017-09-01";

/// Compute resource provider API version (virtual machines, scale sets).
pub const DEFAULT_COMPUTE_API_VERSION: &str = "2018-10-01";

/// The resource kinds this crate reads or mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `Microsoft.Network/publicIPAddresses`
    PublicIpAddress,
    /// `Microsoft.Network/networkInterfaces`
    NetworkInterface,
    /// `Microsoft.Compute/virtualMachines`
    VirtualMachine,
    /// `Microsoft.Compute/virtualMachineScaleSets`
    ScaleSet,
}

impl ResourceKind {
    /// Resource provider namespace.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::PublicIpAddress | Self::NetworkInterface => "Microsoft.Network",
            Self::VirtualMachine | Self::ScaleSet => "Microsoft.Compute",
        }
    }

    /// Resource type segment under the namespace.
    #[must_use]
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::PublicIpAddress => "publicIPAddresses",
            Self::NetworkInterface => "networkInterfaces",
            Self::VirtualMachine => "virtualMachines",
            Self::ScaleSet => "virtualMachineScaleSets",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PublicIpAddress => "public IP",
            Self::NetworkInterface => "network interface",
            Self::VirtualMachine => "virtual machine",
            Self::ScaleSet => "scale set",
        };
        f.write_str(name)
    }
}

/// Fixed scope shared by every resource client.
///
/// Passed explicitly at construction instead of being read from
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmScope {
    /// Management endpoint base URL
    pub endpoint: Url,
    /// Subscription ID
    pub subscription_id: String,
    /// Resource group holding the node resources
    pub resource_group: String,
    /// Location for newly created resources
    pub location: String,
    /// API version for `Microsoft.Network`
    pub network_api_version: String,
    /// API version for `Microsoft.Compute`
    pub compute_api_version: String,
}

impl ArmScope {
    /// Creates a scope against the public endpoint with default API versions.
    ///
    /// # Panics
    ///
    /// Never; [`DEFAULT_ENDPOINT`] is a valid URL.
    #[must_use]
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            network_api_version: DEFAULT_NETWORK_API_VERSION.to_string(),
            compute_api_version: DEFAULT_COMPUTE_API_VERSION.to_string(),
        }
    }

    /// Overrides the management endpoint (sovereign clouds, test servers).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Overrides the network and compute API versions.
    #[must_use]
    pub fn with_api_versions(
        mut self,
        network: impl Into<String>,
        compute: impl Into<String>,
    ) -> Self {
        self.network_api_version = network.into();
        self.compute_api_version = compute.into();
        self
    }

    /// API version used for requests against `kind`.
    #[must_use]
    pub fn api_version(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::PublicIpAddress | ResourceKind::NetworkInterface => {
                &self.network_api_version
            }
            ResourceKind::VirtualMachine | ResourceKind::ScaleSet => &self.compute_api_version,
        }
    }

    /// Builds the URL of a named resource, optionally followed by an action segment.
    ///
    /// The result carries the `api-version` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidRequest`] if `name` is blank or the
    /// endpoint cannot carry a path.
    pub fn resource_url(
        &self,
        kind: ResourceKind,
        name: &str,
        action: Option<&str>,
    ) -> Result<Url, ArmError> {
        if name.trim().is_empty() {
            return Err(ArmError::InvalidRequest(format!("{kind} name is empty")));
        }

        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ArmError::InvalidRequest(format!(
                    "endpoint '{}' cannot be used as a base URL",
                    self.endpoint
                ))
            })?;
            segments.pop_if_empty().extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                self.resource_group.as_str(),
                "providers",
                kind.namespace(),
                kind.resource_type(),
                name,
            ]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        url.query_pairs_mut()
            .append_pair("api-version", self.api_version(kind));
        Ok(url)
    }
}
