//! Stackup Core Library
//!
//! Plans and reconciles multi-service application descriptions against a
//! swarm-mode cluster: logical names are namespaced under a project, textual
//! port and volume specs become orchestrator directives, and the resulting
//! plan is applied or torn down idempotently.

pub mod app;
pub mod cluster;
pub mod commands;
pub mod context;
pub mod deploy;
pub mod error;
pub mod naming;
pub mod plan;
pub mod translate;

/// Re-exports of commonly used types
pub mod prelude {
    // Application description
    pub use crate::app::{
        AppDescription, ExternalRef, NetworkDefinition, ServiceDefinition, VolumeAttachment,
        VolumeDefinition,
    };

    // Plan
    pub use crate::plan::{
        BuildOptions, DeploymentPlan, NetworkDescriptor, PlanBuilder, PortPolicy,
        ServiceDescriptor, VolumeDescriptor,
    };

    // Cluster
    pub use crate::cluster::{ClusterClient, ClusterError, NetworkSummary};

    // Deploy
    pub use crate::deploy::{DownReport, Reconciler, UpReport};

    // Errors
    pub use crate::error::{DeployError, PlanError};
}
