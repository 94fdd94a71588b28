//! Parsed application description consumed by the plan builder.
//!
//! This is the materialized tree a compose document parses into: networks,
//! volumes and services keyed by their logical names. Maps are ordered so
//! that everything derived from them iterates in logical-name order.

pub mod compose;

use std::collections::BTreeMap;

pub use compose::{load_compose, parse_compose_str};

/// The whole application: every declared network, volume and service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppDescription {
    pub networks: BTreeMap<String, NetworkDefinition>,
    pub volumes: BTreeMap<String, VolumeDefinition>,
    pub services: BTreeMap<String, ServiceDefinition>,
}

impl AppDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, name: impl Into<String>, network: NetworkDefinition) -> Self {
        self.networks.insert(name.into(), network);
        self
    }

    pub fn with_volume(mut self, name: impl Into<String>, volume: VolumeDefinition) -> Self {
        self.volumes.insert(name.into(), volume);
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, service: ServiceDefinition) -> Self {
        self.services.insert(name.into(), service);
        self
    }
}

/// Marks a resource as managed outside this tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalRef {
    pub external: bool,
    /// Name of the pre-existing resource, when it differs from the logical name
    pub name: Option<String>,
}

impl ExternalRef {
    pub fn owned() -> Self {
        Self::default()
    }

    pub fn external() -> Self {
        Self {
            external: true,
            name: None,
        }
    }

    pub fn external_named(name: impl Into<String>) -> Self {
        Self {
            external: true,
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkDefinition {
    pub driver: Option<String>,
    pub external: ExternalRef,
}

impl NetworkDefinition {
    pub fn with_driver(driver: impl Into<String>) -> Self {
        Self {
            driver: Some(driver.into()),
            external: ExternalRef::owned(),
        }
    }

    pub fn external(external: ExternalRef) -> Self {
        Self {
            driver: None,
            external,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeDefinition {
    pub driver: Option<String>,
    pub external: ExternalRef,
}

/// A service as declared, before any name resolution or translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub image: String,
    pub command: Vec<String>,
    /// `KEY=VALUE` entries, passed through untouched
    pub environment: Vec<String>,
    /// Raw port specs, `"published:target"` or `"target"`
    pub ports: Vec<String>,
    /// Logical names of the networks this service attaches to
    pub networks: Vec<String>,
    pub volumes: Vec<VolumeAttachment>,
}

impl ServiceDefinition {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.environment.push(entry.into());
        self
    }

    pub fn with_port(mut self, spec: impl Into<String>) -> Self {
        self.ports.push(spec.into());
        self
    }

    pub fn with_network(mut self, name: impl Into<String>) -> Self {
        self.networks.push(name.into());
        self
    }

    pub fn with_volume(mut self, attachment: VolumeAttachment) -> Self {
        self.volumes.push(attachment);
        self
    }
}

/// A declared volume attachment on a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeAttachment {
    /// Named volume or host path, as written. Not bound to a managed volume.
    pub source: Option<String>,
    /// Path inside the container
    pub destination: String,
}

impl VolumeAttachment {
    pub fn anonymous(destination: impl Into<String>) -> Self {
        Self {
            source: None,
            destination: destination.into(),
        }
    }

    pub fn named(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            destination: destination.into(),
        }
    }
}
