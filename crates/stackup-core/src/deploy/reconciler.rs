//! Apply and tear down deployment plans.
//!
//! `up` handles every network before any service, and `down` removes every
//! service before any network. Within a category resources are processed in
//! logical-name order, but nothing may depend on that order.
//!
//! Failure policy:
//!
//! | step                         | on failure           |
//! |------------------------------|----------------------|
//! | external network missing     | abort `up`           |
//! | owned network create/lookup  | record, continue     |
//! | service create               | abort `up`           |
//! | any removal                  | record, continue     |

use tracing::{debug, info, warn};

use crate::cluster::{ClusterClient, ServiceSpec};
use crate::deploy::existence::network_exists;
use crate::error::DeployError;
use crate::plan::{DeploymentPlan, NetworkDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkOutcome {
    /// Created by this run
    Created { id: String },
    /// Already present; nothing done
    Existing,
    /// External network confirmed present
    ExternalPresent,
    /// Lookup or creation failed; the error is in `UpReport::failures`
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResult {
    pub real_name: String,
    pub outcome: NetworkOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResult {
    pub real_name: String,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct UpReport {
    pub networks: Vec<NetworkResult>,
    pub services: Vec<ServiceResult>,
    /// Non-fatal errors, in the order they occurred
    pub failures: Vec<DeployError>,
}

impl UpReport {
    pub fn created_networks(&self) -> impl Iterator<Item = &str> {
        self.networks.iter().filter_map(|network| match network.outcome {
            NetworkOutcome::Created { .. } => Some(network.real_name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
pub struct DownReport {
    pub removed_services: Vec<String>,
    pub removed_networks: Vec<String>,
    pub skipped_external: Vec<String>,
    /// Non-fatal errors, in the order they occurred
    pub failures: Vec<DeployError>,
}

impl DownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converges the cluster toward a plan through a [`ClusterClient`].
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
}

impl<C: ClusterClient> Reconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Create everything in the plan that is missing.
    ///
    /// Network creation is idempotent: networks that already exist are
    /// skipped. Service creation is not. No existence probe is made before
    /// creating a service, so running `up` against an already deployed plan
    /// fails on the first name collision (or duplicates the service,
    /// depending on the cluster). Tear down with [`Reconciler::down`] first.
    pub fn up(&self, plan: &DeploymentPlan) -> Result<UpReport, DeployError> {
        let mut report = UpReport::default();

        for network in plan.networks.values() {
            let result = if network.external {
                self.verify_external(network)?
            } else {
                self.ensure_network(network, &mut report.failures)
            };
            report.networks.push(result);
        }

        for volume in plan.volumes.values() {
            match (volume.external, &volume.external_name) {
                (true, Some(external_name)) => info!(
                    volume = %volume.logical_name,
                    external = %external_name,
                    "Volume (external)"
                ),
                (true, None) => info!(volume = %volume.logical_name, "Volume (external)"),
                (false, _) => {
                    info!(volume = %volume.logical_name, driver = ?volume.driver, "Volume")
                }
            }
        }

        for service in plan.services.values() {
            info!(service = %service.real_name, image = %service.image, "Creating service");
            let spec = ServiceSpec::from(service);
            let id = self
                .client
                .create_service(&spec)
                .map_err(|source| DeployError::ServiceCreate {
                    name: service.real_name.clone(),
                    source,
                })?;
            debug!(service = %service.real_name, id = %id, "Service created");
            report.services.push(ServiceResult {
                real_name: service.real_name.clone(),
                id,
            });
        }

        Ok(report)
    }

    /// Remove everything the plan owns, best effort.
    ///
    /// External networks are never touched. Removal is attempted without
    /// checking whether a network still has attachments; the cluster refuses
    /// if it does and the failure is recorded.
    pub fn down(&self, plan: &DeploymentPlan) -> DownReport {
        let mut report = DownReport::default();

        for service in plan.services.values() {
            info!(service = %service.real_name, "Removing service");
            match self.client.remove_service(&service.real_name) {
                Ok(()) => report.removed_services.push(service.real_name.clone()),
                Err(source) => {
                    let error = DeployError::ServiceRemove {
                        name: service.real_name.clone(),
                        source,
                    };
                    warn!(error = %error, "Service removal failed");
                    report.failures.push(error);
                }
            }
        }

        for network in plan.networks.values() {
            if network.external {
                debug!(network = %network.real_name, "Skipping external network");
                report.skipped_external.push(network.real_name.clone());
                continue;
            }

            info!(network = %network.real_name, "Removing network");
            match self.client.remove_network(&network.real_name) {
                Ok(()) => report.removed_networks.push(network.real_name.clone()),
                Err(source) => {
                    let error = DeployError::NetworkRemove {
                        name: network.real_name.clone(),
                        source,
                    };
                    warn!(error = %error, "Network removal failed");
                    report.failures.push(error);
                }
            }
        }

        report
    }

    fn verify_external(&self, network: &NetworkDescriptor) -> Result<NetworkResult, DeployError> {
        info!(network = %network.real_name, "Checking if external network exists");
        if !network_exists(&self.client, &network.real_name)? {
            return Err(DeployError::ExternalNetworkMissing {
                name: network.real_name.clone(),
            });
        }
        Ok(NetworkResult {
            real_name: network.real_name.clone(),
            outcome: NetworkOutcome::ExternalPresent,
        })
    }

    fn ensure_network(
        &self,
        network: &NetworkDescriptor,
        failures: &mut Vec<DeployError>,
    ) -> NetworkResult {
        let outcome = match self.try_ensure_network(network) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(error = %error, "Network not created; continuing");
                failures.push(error);
                NetworkOutcome::Failed
            }
        };
        NetworkResult {
            real_name: network.real_name.clone(),
            outcome,
        }
    }

    fn try_ensure_network(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<NetworkOutcome, DeployError> {
        if network_exists(&self.client, &network.real_name)? {
            info!(network = %network.real_name, "Network exists, skipping");
            return Ok(NetworkOutcome::Existing);
        }

        info!(network = %network.real_name, driver = %network.driver, "Creating network");
        let id = self
            .client
            .create_network(&network.real_name, &network.driver)
            .map_err(|source| DeployError::NetworkCreate {
                name: network.real_name.clone(),
                source,
            })?;
        Ok(NetworkOutcome::Created { id })
    }
}
