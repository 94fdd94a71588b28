//! Compose document loader with helpful error messages
//!
//! Reads the subset of a compose file the planner consumes: top-level
//! networks, volumes and services. Everything else in the document is
//! ignored.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{
    AppDescription, ExternalRef, NetworkDefinition, ServiceDefinition, VolumeAttachment,
    VolumeDefinition,
};

/// Load and convert a compose file
pub fn load_compose(path: &Path) -> Result<AppDescription> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read compose file: {}", path.display()))?;

    parse_compose_str(&content)
        .with_context(|| format!("Failed to parse compose file: {}", path.display()))
}

/// Parse compose content from string
pub fn parse_compose_str(content: &str) -> Result<AppDescription> {
    let raw: RawCompose =
        serde_yaml::from_str(content).map_err(|e| enhance_yaml_error(e, content))?;

    let app = raw.into_app()?;
    validate_app(&app)?;

    Ok(app)
}

#[derive(Debug, Default, Deserialize)]
struct RawCompose {
    #[serde(default)]
    networks: BTreeMap<String, Option<RawResource>>,
    #[serde(default)]
    volumes: BTreeMap<String, Option<RawResource>>,
    #[serde(default)]
    services: BTreeMap<String, Option<RawService>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResource {
    #[serde(default)]
    driver: Option<String>,
    #[serde(default)]
    external: Option<RawExternal>,
    /// Top-level name, only meaningful for external resources
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExternal {
    Flag(bool),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    command: Option<StringOrList>,
    #[serde(default)]
    environment: Option<RawEnvironment>,
    #[serde(default)]
    ports: Vec<RawPort>,
    #[serde(default)]
    networks: Option<RawServiceNetworks>,
    #[serde(default)]
    volumes: Vec<RawVolumeMount>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnvironment {
    List(Vec<String>),
    Map(BTreeMap<String, Option<RawScalar>>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

impl RawScalar {
    fn render(&self) -> String {
        match self {
            RawScalar::Bool(value) => value.to_string(),
            RawScalar::Number(value) => value.to_string(),
            RawScalar::String(value) => value.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(u64),
    String(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawServiceNetworks {
    List(Vec<String>),
    Map(BTreeMap<String, serde_yaml::Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVolumeMount {
    Short(String),
    Long {
        #[serde(default)]
        source: Option<String>,
        target: String,
    },
}

impl RawCompose {
    fn into_app(self) -> Result<AppDescription> {
        let networks = self
            .networks
            .into_iter()
            .map(|(name, raw)| {
                let raw = raw.unwrap_or_default();
                let network = NetworkDefinition {
                    external: raw.external_ref(),
                    driver: raw.driver,
                };
                (name, network)
            })
            .collect();

        let volumes = self
            .volumes
            .into_iter()
            .map(|(name, raw)| {
                let raw = raw.unwrap_or_default();
                let volume = VolumeDefinition {
                    external: raw.external_ref(),
                    driver: raw.driver,
                };
                (name, volume)
            })
            .collect();

        let mut services = BTreeMap::new();
        for (name, raw) in self.services {
            let raw = raw.unwrap_or_default();
            let service = raw
                .into_definition()
                .with_context(|| format!("Invalid service '{}'", name))?;
            services.insert(name, service);
        }

        Ok(AppDescription {
            networks,
            volumes,
            services,
        })
    }
}

impl RawResource {
    fn external_ref(&self) -> ExternalRef {
        match &self.external {
            None | Some(RawExternal::Flag(false)) => ExternalRef::owned(),
            Some(RawExternal::Flag(true)) => ExternalRef {
                external: true,
                name: self.name.clone(),
            },
            Some(RawExternal::Named { name }) => ExternalRef {
                external: true,
                name: name.clone().or_else(|| self.name.clone()),
            },
        }
    }
}

impl RawService {
    fn into_definition(self) -> Result<ServiceDefinition> {
        let image = match self.image {
            Some(image) if !image.trim().is_empty() => image,
            _ => anyhow::bail!("no image defined for service"),
        };

        let command = match self.command {
            None => Vec::new(),
            Some(StringOrList::String(line)) => {
                line.split_whitespace().map(str::to_string).collect()
            }
            Some(StringOrList::List(args)) => args,
        };

        let environment = match self.environment {
            None => Vec::new(),
            Some(RawEnvironment::List(entries)) => entries,
            Some(RawEnvironment::Map(entries)) => entries
                .into_iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{}={}", key, value.render()),
                    None => key,
                })
                .collect(),
        };

        let ports = self
            .ports
            .into_iter()
            .map(|port| match port {
                RawPort::Number(port) => port.to_string(),
                RawPort::String(port) => port,
            })
            .collect();

        let networks = match self.networks {
            None => Vec::new(),
            Some(RawServiceNetworks::List(names)) => names,
            Some(RawServiceNetworks::Map(names)) => names.into_keys().collect(),
        };

        let volumes = self
            .volumes
            .into_iter()
            .map(|mount| match mount {
                RawVolumeMount::Short(spec) => parse_short_volume(&spec),
                RawVolumeMount::Long { source, target } => VolumeAttachment {
                    source,
                    destination: target,
                },
            })
            .collect();

        Ok(ServiceDefinition {
            image,
            command,
            environment,
            ports,
            networks,
            volumes,
        })
    }
}

/// Split `src:dst[:mode]` or a bare `dst` into an attachment
fn parse_short_volume(spec: &str) -> VolumeAttachment {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [destination] => VolumeAttachment::anonymous(*destination),
        [source, destination, ..] => VolumeAttachment::named(*source, *destination),
        [] => VolumeAttachment::anonymous(spec),
    }
}

/// Enhance YAML parsing errors with the surrounding lines
fn enhance_yaml_error(error: serde_yaml::Error, content: &str) -> anyhow::Error {
    match error.location() {
        Some(location) => {
            let line_num = location.line();
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "YAML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                error
            )
        }
        None => anyhow::anyhow!("YAML parsing error: {}", error),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_app(app: &AppDescription) -> Result<()> {
    if app.services.is_empty() {
        anyhow::bail!("No services defined");
    }
    Ok(())
}
