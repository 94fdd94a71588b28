//! Build a deployment plan from an application description.
//!
//! Building never touches the cluster. The same project and description
//! always produce the same plan.

use std::collections::{BTreeMap, HashMap};

use crate::app::{AppDescription, ServiceDefinition};
use crate::error::PlanError;
use crate::naming::resolve_name;
use crate::plan::{
    DEFAULT_NETWORK, DEFAULT_NETWORK_DRIVER, DeploymentPlan, NetworkDescriptor,
    ServiceDescriptor, VolumeDescriptor,
};
use crate::translate::{self, PortMapping};

/// How malformed port specs are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortPolicy {
    /// Fail the build
    #[default]
    Strict,
    /// Substitute zero for bad components and record a warning
    Lenient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub port_policy: PortPolicy,
}

#[derive(Debug, Clone)]
pub struct PlanBuilder {
    project: String,
    options: BuildOptions,
}

impl PlanBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self, app: &AppDescription) -> Result<DeploymentPlan, PlanError> {
        let networks = self.build_networks(app)?;
        let volumes = self.build_volumes(app);

        let mut warnings = Vec::new();
        let mut services = BTreeMap::new();
        for (name, definition) in &app.services {
            let service = self.build_service(name, definition, &networks, &mut warnings)?;
            services.insert(name.clone(), service);
        }

        Ok(DeploymentPlan {
            project: self.project.clone(),
            networks,
            volumes,
            services,
            warnings,
        })
    }

    fn build_networks(
        &self,
        app: &AppDescription,
    ) -> Result<BTreeMap<String, NetworkDescriptor>, PlanError> {
        let mut networks = BTreeMap::new();

        if app.networks.is_empty() {
            networks.insert(
                DEFAULT_NETWORK.to_string(),
                NetworkDescriptor {
                    logical_name: DEFAULT_NETWORK.to_string(),
                    real_name: resolve_name(&self.project, DEFAULT_NETWORK, false, None),
                    driver: DEFAULT_NETWORK_DRIVER.to_string(),
                    external: false,
                },
            );
            return Ok(networks);
        }

        let mut seen: HashMap<String, String> = HashMap::new();
        for (name, definition) in &app.networks {
            let external = definition.external.external;
            let real_name = resolve_name(
                &self.project,
                name,
                external,
                definition.external.name.as_deref(),
            );

            if let Some(first) = seen.insert(real_name.clone(), name.clone()) {
                return Err(PlanError::DuplicateNetworkName {
                    real_name,
                    first,
                    second: name.clone(),
                });
            }

            let driver = definition
                .driver
                .clone()
                .filter(|driver| !driver.is_empty())
                .unwrap_or_else(|| DEFAULT_NETWORK_DRIVER.to_string());

            networks.insert(
                name.clone(),
                NetworkDescriptor {
                    logical_name: name.clone(),
                    real_name,
                    driver,
                    external,
                },
            );
        }

        Ok(networks)
    }

    fn build_volumes(&self, app: &AppDescription) -> BTreeMap<String, VolumeDescriptor> {
        app.volumes
            .iter()
            .map(|(name, definition)| {
                let descriptor = VolumeDescriptor {
                    logical_name: name.clone(),
                    driver: definition.driver.clone(),
                    external: definition.external.external,
                    external_name: definition.external.name.clone(),
                };
                (name.clone(), descriptor)
            })
            .collect()
    }

    fn build_service(
        &self,
        name: &str,
        definition: &ServiceDefinition,
        networks: &BTreeMap<String, NetworkDescriptor>,
        warnings: &mut Vec<String>,
    ) -> Result<ServiceDescriptor, PlanError> {
        let ports = self.build_ports(name, definition, warnings)?;
        let network_refs = resolve_network_refs(name, definition, networks)?;

        Ok(ServiceDescriptor {
            logical_name: name.to_string(),
            real_name: resolve_name(&self.project, name, false, None),
            image: definition.image.clone(),
            command: definition.command.clone(),
            environment: definition.environment.clone(),
            ports,
            network_refs,
            mounts: translate::translate_mounts(&definition.volumes),
        })
    }

    fn build_ports(
        &self,
        name: &str,
        definition: &ServiceDefinition,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<PortMapping>, PlanError> {
        match self.options.port_policy {
            PortPolicy::Strict => {
                translate::translate_ports(&definition.ports).map_err(|source| {
                    PlanError::InvalidPort {
                        service: name.to_string(),
                        source,
                    }
                })
            }
            PortPolicy::Lenient => Ok(definition
                .ports
                .iter()
                .map(|spec| {
                    let (mapping, error) = translate::parse_port_lenient(spec);
                    if let Some(error) = error {
                        warnings.push(format!(
                            "service '{}': {}; using {:?}",
                            name, error, mapping
                        ));
                    }
                    mapping
                })
                .collect()),
        }
    }
}

/// Build a plan with default options.
pub fn build_plan(project: &str, app: &AppDescription) -> Result<DeploymentPlan, PlanError> {
    PlanBuilder::new(project).build(app)
}

/// Resolve declared attachments to real names.
///
/// A service that declares none attaches to the plan's `default` network.
/// Without one it attaches to the only network when there is exactly one,
/// and to nothing otherwise.
fn resolve_network_refs(
    service: &str,
    definition: &ServiceDefinition,
    networks: &BTreeMap<String, NetworkDescriptor>,
) -> Result<Vec<String>, PlanError> {
    if definition.networks.is_empty() {
        let implicit = match networks.get(DEFAULT_NETWORK) {
            Some(network) => Some(network),
            None if networks.len() == 1 => networks.values().next(),
            None => None,
        };
        return Ok(implicit
            .map(|network| vec![network.real_name.clone()])
            .unwrap_or_default());
    }

    let mut refs: Vec<String> = Vec::with_capacity(definition.networks.len());
    for logical in &definition.networks {
        let network = networks
            .get(logical)
            .ok_or_else(|| PlanError::UnresolvedNetwork {
                service: service.to_string(),
                network: logical.clone(),
            })?;
        if !refs.contains(&network.real_name) {
            refs.push(network.real_name.clone());
        }
    }
    Ok(refs)
}
