//! Node identity and classification.

use std::fmt;

use super::extract_scale_set_name;

/// How a node's public connectivity is provisioned.
///
/// Produced once from the provider ID and passed down, so each
/// orchestration path matches on a closed set of variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A standalone virtual machine with its own public IP resource.
    Standalone,
    /// An instance of a scale set; public IPs come from the scale-set template.
    ScaleSetMember {
        /// Name of the owning scale set.
        scale_set: String,
    },
}

impl NodeKind {
    /// Classifies a node from its provider ID.
    #[must_use]
    pub fn from_provider_id(provider_id: &str) -> Self {
        extract_scale_set_name(provider_id).map_or(Self::Standalone, |name| Self::ScaleSetMember {
            scale_set: name.to_string(),
        })
    }

    /// Returns the scale-set name for scale-set members.
    #[must_use]
    pub fn scale_set(&self) -> Option<&str> {
        match self {
            Self::Standalone => None,
            Self::ScaleSetMember { scale_set } => Some(scale_set),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => write!(f, "standalone"),
            Self::ScaleSetMember { scale_set } => write!(f, "scale set member of {scale_set}"),
        }
    }
}

/// A cluster node as issued by the cluster layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    name: String,
    provider_id: String,
}

impl NodeIdentity {
    /// Creates a node identity from its name and provider ID.
    #[must_use]
    pub fn new(name: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_id: provider_id.into(),
        }
    }

    /// The node name, unique within the cluster.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The provider ID (a standalone VM or scale-set instance URN).
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Classifies this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_provider_id(&self.provider_id)
    }

    /// The conventional public IP name for this node.
    #[must_use]
    pub fn public_ip_name(&self) -> String {
        public_ip_name(&self.name)
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Returns the conventional public IP resource name for a node.
#[must_use]
pub fn public_ip_name(node_name: &str) -> String {
    format!("{node_name}-ip")
}

/// Returns the per-instance public IP template name for a scale set.
#[must_use]
pub fn scale_set_public_ip_name(scale_set: &str) -> String {
    format!("{scale_set}_public_ip")
}
