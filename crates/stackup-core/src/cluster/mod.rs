//! Cluster client abstraction.
//!
//! The reconciler only ever talks to the orchestrator through
//! [`ClusterClient`]. Every call is a single synchronous request; retries and
//! timeouts are the implementation's business.

pub mod docker;

use serde::Serialize;
use thiserror::Error;

use crate::plan::ServiceDescriptor;
use crate::translate::{MountDirective, PortMapping};

pub use docker::DockerClient;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cluster returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid cluster endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClusterError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClusterError::Api {
            status,
            message: message.into(),
        }
    }
}

/// A network as listed by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub driver: String,
}

/// Everything the cluster needs to create one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<String>,
    pub mounts: Vec<MountDirective>,
    pub ports: Vec<PortMapping>,
    /// Real names of the networks to attach to
    pub networks: Vec<String>,
}

impl From<&ServiceDescriptor> for ServiceSpec {
    fn from(service: &ServiceDescriptor) -> Self {
        Self {
            name: service.real_name.clone(),
            image: service.image.clone(),
            command: service.command.clone(),
            env: service.environment.clone(),
            mounts: service.mounts.clone(),
            ports: service.ports.clone(),
            networks: service.network_refs.clone(),
        }
    }
}

/// Operations the reconciler needs from the orchestrator.
pub trait ClusterClient {
    /// Networks whose name is exactly `name`.
    fn list_networks_by_name(&self, name: &str) -> Result<Vec<NetworkSummary>, ClusterError>;

    /// Create a network and return its id.
    fn create_network(&self, name: &str, driver: &str) -> Result<String, ClusterError>;

    fn remove_network(&self, name: &str) -> Result<(), ClusterError>;

    /// Create a service and return its id.
    fn create_service(&self, spec: &ServiceSpec) -> Result<String, ClusterError>;

    fn remove_service(&self, name: &str) -> Result<(), ClusterError>;
}

impl<C: ClusterClient + ?Sized> ClusterClient for &C {
    fn list_networks_by_name(&self, name: &str) -> Result<Vec<NetworkSummary>, ClusterError> {
        (**self).list_networks_by_name(name)
    }

    fn create_network(&self, name: &str, driver: &str) -> Result<String, ClusterError> {
        (**self).create_network(name, driver)
    }

    fn remove_network(&self, name: &str) -> Result<(), ClusterError> {
        (**self).remove_network(name)
    }

    fn create_service(&self, spec: &ServiceSpec) -> Result<String, ClusterError> {
        (**self).create_service(spec)
    }

    fn remove_service(&self, name: &str) -> Result<(), ClusterError> {
        (**self).remove_service(name)
    }
}
