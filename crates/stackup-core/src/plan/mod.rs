//! Deployment plan: the namespaced, fully resolved set of descriptors.
//!
//! A plan is built once per invocation from the application description and
//! is read-only afterwards. All maps are keyed by logical name and iterate in
//! sorted order, which is the order the reconciler processes resources in.
//! Nothing beyond "networks before services" should be read into that order.

pub mod builder;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::translate::{MountDirective, PortMapping};

pub use builder::{BuildOptions, PlanBuilder, PortPolicy, build_plan};

/// Logical name of the network synthesized when none are declared.
pub const DEFAULT_NETWORK: &str = "default";

/// Driver used when a network does not name one.
pub const DEFAULT_NETWORK_DRIVER: &str = "overlay";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    pub logical_name: String,
    pub real_name: String,
    pub driver: String,
    /// Must already exist; never created or removed by this tool
    pub external: bool,
}

/// Volumes are reported only; nothing creates or mounts them by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDescriptor {
    pub logical_name: String,
    pub driver: Option<String>,
    pub external: bool,
    pub external_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub logical_name: String,
    pub real_name: String,
    pub image: String,
    pub command: Vec<String>,
    pub environment: Vec<String>,
    pub ports: Vec<PortMapping>,
    /// Real names of the attached networks
    pub network_refs: Vec<String>,
    pub mounts: Vec<MountDirective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    pub project: String,
    pub networks: BTreeMap<String, NetworkDescriptor>,
    pub volumes: BTreeMap<String, VolumeDescriptor>,
    pub services: BTreeMap<String, ServiceDescriptor>,
    /// Non-fatal problems found while building, e.g. zeroed port specs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DeploymentPlan {
    pub fn network(&self, logical_name: &str) -> Option<&NetworkDescriptor> {
        self.networks.get(logical_name)
    }

    pub fn service(&self, logical_name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(logical_name)
    }
}
