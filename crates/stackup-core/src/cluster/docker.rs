//! Docker Engine API client for swarm-mode clusters.
//!
//! Speaks plain HTTP(S) to a manager node. Unix sockets are not supported;
//! expose the engine on TCP (`DOCKER_HOST=tcp://host:2375`) instead.

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ClusterClient, ClusterError, NetworkSummary, ServiceSpec};
use crate::translate::MountKind;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:2375";

const DEFAULT_TCP_PORT: u16 = 2375;

#[derive(Debug, Clone)]
pub struct DockerClient {
    base: Url,
    http: Client,
}

impl DockerClient {
    pub fn new(endpoint: &str) -> Result<Self, ClusterError> {
        let base = parse_endpoint(endpoint)?;
        let http = Client::builder()
            .user_agent(concat!("stackup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClusterError> {
        endpoint_url(&self.base, segments)
    }
}

impl ClusterClient for DockerClient {
    fn list_networks_by_name(&self, name: &str) -> Result<Vec<NetworkSummary>, ClusterError> {
        let filters = name_filter(name);
        let response = self
            .http
            .get(self.url(&["networks"])?)
            .query(&[("filters", filters)])
            .send()?;
        let networks: Vec<NetworkResource> = decode(check(response)?)?;

        // The engine's name filter matches substrings.
        Ok(networks
            .into_iter()
            .filter(|network| network.name == name)
            .map(|network| NetworkSummary {
                id: network.id,
                name: network.name,
                driver: network.driver,
            })
            .collect())
    }

    fn create_network(&self, name: &str, driver: &str) -> Result<String, ClusterError> {
        let body = NetworkCreateRequest {
            name,
            driver,
            check_duplicate: true,
        };
        let response = self
            .http
            .post(self.url(&["networks", "create"])?)
            .json(&body)
            .send()?;
        let created: NetworkCreateResponse = decode(check(response)?)?;
        Ok(created.id)
    }

    fn remove_network(&self, name: &str) -> Result<(), ClusterError> {
        let response = self.http.delete(self.url(&["networks", name])?).send()?;
        check(response)?;
        Ok(())
    }

    fn create_service(&self, spec: &ServiceSpec) -> Result<String, ClusterError> {
        let body = SwarmServiceSpec::from(spec);
        let response = self
            .http
            .post(self.url(&["services", "create"])?)
            .json(&body)
            .send()?;
        let created: ServiceCreateResponse = decode(check(response)?)?;
        Ok(created.id)
    }

    fn remove_service(&self, name: &str) -> Result<(), ClusterError> {
        let response = self.http.delete(self.url(&["services", name])?).send()?;
        check(response)?;
        Ok(())
    }
}

/// Normalize `tcp://`, `http://` and `https://` endpoints to an HTTP base URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ClusterError> {
    let invalid = || ClusterError::InvalidEndpoint(endpoint.to_string());
    let url = Url::parse(endpoint).map_err(|_| invalid())?;

    let host = url.host_str().filter(|host| !host.is_empty()).ok_or_else(invalid)?;
    let (scheme, port) = match url.scheme() {
        "tcp" => ("http", url.port().unwrap_or(DEFAULT_TCP_PORT)),
        "http" => ("http", url.port_or_known_default().unwrap_or(80)),
        "https" => ("https", url.port_or_known_default().unwrap_or(443)),
        _ => return Err(invalid()),
    };

    Url::parse(&format!("{}://{}:{}/", scheme, host, port)).map_err(|_| invalid())
}

/// Engine filter document selecting networks by name.
fn name_filter(name: &str) -> String {
    let mut names = serde_json::Map::new();
    names.insert(name.to_string(), serde_json::Value::Bool(true));
    serde_json::json!({ "name": names }).to_string()
}

fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, ClusterError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClusterError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn check(response: Response) -> Result<Response, ClusterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Err(ClusterError::api(status.as_u16(), message.trim()))
}

fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClusterError> {
    let body = response.text()?;
    serde_json::from_str(&body).map_err(|e| ClusterError::Decode(e.to_string()))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkResource {
    id: String,
    name: String,
    #[serde(default)]
    driver: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkCreateRequest<'a> {
    name: &'a str,
    driver: &'a str,
    check_duplicate: bool,
}

#[derive(Debug, Deserialize)]
struct NetworkCreateResponse {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ServiceCreateResponse {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SwarmServiceSpec<'a> {
    name: &'a str,
    task_template: TaskTemplate<'a>,
    endpoint_spec: EndpointSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TaskTemplate<'a> {
    container_spec: ContainerSpec<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    networks: Vec<NetworkAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerSpec<'a> {
    image: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    command: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    env: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mounts: Vec<Mount<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Mount<'a> {
    #[serde(rename = "Type")]
    kind: &'static str,
    target: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkAttachment<'a> {
    target: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointSpec {
    ports: Vec<PortConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PortConfig {
    protocol: &'static str,
    target_port: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_port: Option<u32>,
}

impl<'a> From<&'a ServiceSpec> for SwarmServiceSpec<'a> {
    fn from(spec: &'a ServiceSpec) -> Self {
        let mounts = spec
            .mounts
            .iter()
            .map(|mount| Mount {
                kind: match mount.kind {
                    MountKind::Volume => "volume",
                },
                target: &mount.target,
            })
            .collect();

        let ports = spec
            .ports
            .iter()
            .map(|port| PortConfig {
                protocol: "tcp",
                target_port: u32::from(port.target),
                published_port: port.published.map(u32::from),
            })
            .collect();

        let networks = spec
            .networks
            .iter()
            .map(|target| NetworkAttachment { target })
            .collect();

        Self {
            name: &spec.name,
            task_template: TaskTemplate {
                container_spec: ContainerSpec {
                    image: &spec.image,
                    command: &spec.command,
                    env: &spec.env,
                    mounts,
                },
                networks,
            },
            endpoint_spec: EndpointSpec { ports },
        }
    }
}
