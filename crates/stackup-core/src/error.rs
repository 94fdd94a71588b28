//! Error types for planning and reconciliation.

use thiserror::Error;

use crate::cluster::ClusterError;
use crate::translate::PortSpecError;

/// Raised while building a plan, before any cluster call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("service '{service}' references undefined network '{network}'")]
    UnresolvedNetwork { service: String, network: String },

    #[error("service '{service}' has an invalid port spec: {source}")]
    InvalidPort {
        service: String,
        #[source]
        source: PortSpecError,
    },

    #[error("networks '{first}' and '{second}' both resolve to '{real_name}'")]
    DuplicateNetworkName {
        real_name: String,
        first: String,
        second: String,
    },
}

/// Raised while applying or tearing down a plan.
///
/// Every variant names the real (cluster-side) resource it concerns.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("external network '{name}' could not be found")]
    ExternalNetworkMissing { name: String },

    #[error("network name '{name}' matches {matches} networks")]
    AmbiguousName { name: String, matches: usize },

    #[error("failed to look up network '{name}': {source}")]
    NetworkLookup {
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to create network '{name}': {source}")]
    NetworkCreate {
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to create service '{name}': {source}")]
    ServiceCreate {
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to remove network '{name}': {source}")]
    NetworkRemove {
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to remove service '{name}': {source}")]
    ServiceRemove {
        name: String,
        #[source]
        source: ClusterError,
    },
}

impl DeployError {
    /// Real name of the resource the error concerns.
    pub fn resource_name(&self) -> &str {
        match self {
            DeployError::ExternalNetworkMissing { name }
            | DeployError::AmbiguousName { name, .. }
            | DeployError::NetworkLookup { name, .. }
            | DeployError::NetworkCreate { name, .. }
            | DeployError::ServiceCreate { name, .. }
            | DeployError::NetworkRemove { name, .. }
            | DeployError::ServiceRemove { name, .. } => name,
        }
    }
}
