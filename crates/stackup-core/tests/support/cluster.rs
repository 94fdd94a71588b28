use std::cell::RefCell;
use std::collections::HashSet;

use stackup_core::cluster::{ClusterClient, ClusterError, NetworkSummary, ServiceSpec};

/// One call made against the cluster, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListNetworks(String),
    CreateNetwork { name: String, driver: String },
    RemoveNetwork(String),
    CreateService(ServiceSpec),
    RemoveService(String),
}

impl Call {
    pub fn is_network_op(&self) -> bool {
        matches!(
            self,
            Call::ListNetworks(_) | Call::CreateNetwork { .. } | Call::RemoveNetwork(_)
        )
    }

    pub fn is_service_op(&self) -> bool {
        !self.is_network_op()
    }
}

#[derive(Debug, Default)]
struct State {
    networks: Vec<NetworkSummary>,
    services: Vec<ServiceSpec>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    failing_lookups: HashSet<String>,
    next_id: u64,
}

/// In-memory swarm that records every call.
///
/// Networks still referenced by a service refuse removal, like a real
/// cluster does.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: RefCell<State>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing network.
    pub fn with_network(self, name: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = next_id(&mut state);
            state.networks.push(NetworkSummary {
                id,
                name: name.to_string(),
                driver: "overlay".to_string(),
            });
        }
        self
    }

    /// Seed an existing service.
    pub fn with_service(self, name: &str, networks: &[&str]) -> Self {
        self.state.borrow_mut().services.push(ServiceSpec {
            name: name.to_string(),
            image: "seed".to_string(),
            command: Vec::new(),
            env: Vec::new(),
            mounts: Vec::new(),
            ports: Vec::new(),
            networks: networks.iter().map(|n| n.to_string()).collect(),
        });
        self
    }

    /// Make every mutating call on `name` fail.
    pub fn failing(self, name: &str) -> Self {
        self.state.borrow_mut().failing.insert(name.to_string());
        self
    }

    /// Make listing networks named `name` fail.
    pub fn failing_lookup(self, name: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_lookups
            .insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn network_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .networks
            .iter()
            .map(|n| n.name.clone())
            .collect()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .services
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn service(&self, name: &str) -> Option<ServiceSpec> {
        self.state
            .borrow()
            .services
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    pub fn created_networks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateNetwork { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn created_services(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateService(spec) => Some(spec.name),
                _ => None,
            })
            .collect()
    }
}

fn next_id(state: &mut State) -> String {
    state.next_id += 1;
    format!("id{:04}", state.next_id)
}

impl ClusterClient for MemoryCluster {
    fn list_networks_by_name(&self, name: &str) -> Result<Vec<NetworkSummary>, ClusterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ListNetworks(name.to_string()));
        if state.failing_lookups.contains(name) {
            return Err(ClusterError::api(500, "network list refused"));
        }
        Ok(state
            .networks
            .iter()
            .filter(|n| n.name == name)
            .cloned()
            .collect())
    }

    fn create_network(&self, name: &str, driver: &str) -> Result<String, ClusterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CreateNetwork {
            name: name.to_string(),
            driver: driver.to_string(),
        });
        if state.failing.contains(name) {
            return Err(ClusterError::api(500, "network create refused"));
        }
        if state.networks.iter().any(|n| n.name == name) {
            return Err(ClusterError::api(
                409,
                format!("network with name {} already exists", name),
            ));
        }
        let id = next_id(&mut state);
        state.networks.push(NetworkSummary {
            id: id.clone(),
            name: name.to_string(),
            driver: driver.to_string(),
        });
        Ok(id)
    }

    fn remove_network(&self, name: &str) -> Result<(), ClusterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::RemoveNetwork(name.to_string()));
        if state.failing.contains(name) {
            return Err(ClusterError::api(500, "network remove refused"));
        }
        if state
            .services
            .iter()
            .any(|s| s.networks.iter().any(|n| n == name))
        {
            return Err(ClusterError::api(403, format!("network {} is in use", name)));
        }
        let before = state.networks.len();
        state.networks.retain(|n| n.name != name);
        if state.networks.len() == before {
            return Err(ClusterError::api(404, format!("network {} not found", name)));
        }
        Ok(())
    }

    fn create_service(&self, spec: &ServiceSpec) -> Result<String, ClusterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CreateService(spec.clone()));
        if state.failing.contains(&spec.name) {
            return Err(ClusterError::api(500, "service create refused"));
        }
        if state.services.iter().any(|s| s.name == spec.name) {
            return Err(ClusterError::api(
                409,
                format!("name conflicts with an existing object: {}", spec.name),
            ));
        }
        state.services.push(spec.clone());
        Ok(next_id(&mut state))
    }

    fn remove_service(&self, name: &str) -> Result<(), ClusterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::RemoveService(name.to_string()));
        if state.failing.contains(name) {
            return Err(ClusterError::api(500, "service remove refused"));
        }
        let before = state.services.len();
        state.services.retain(|s| s.name != name);
        if state.services.len() == before {
            return Err(ClusterError::api(404, format!("service {} not found", name)));
        }
        Ok(())
    }
}
