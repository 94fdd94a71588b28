//! Translation of textual port and volume specs into cluster directives.

use serde::Serialize;
use thiserror::Error;

use crate::app::VolumeAttachment;

/// A published/target port pair for the service endpoint.
///
/// Without a published port the cluster allocates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PortMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<u16>,
    pub target: u16,
}

impl PortMapping {
    pub fn published(published: u16, target: u16) -> Self {
        Self {
            published: Some(published),
            target,
        }
    }

    pub fn target(target: u16) -> Self {
        Self {
            published: None,
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    Volume,
}

/// A mount on the service's container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MountDirective {
    pub kind: MountKind,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortSpecError {
    #[error("empty port spec")]
    Empty,

    #[error("invalid port '{component}' in spec '{spec}'")]
    InvalidNumber { spec: String, component: String },

    #[error("port spec '{spec}' has more than two components")]
    TooManyComponents { spec: String },
}

/// Parse `"published:target"` or `"target"`.
pub fn parse_port(spec: &str) -> Result<PortMapping, PortSpecError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(PortSpecError::Empty);
    }

    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [target] => Ok(PortMapping::target(parse_component(spec, target)?)),
        [published, target] => Ok(PortMapping::published(
            parse_component(spec, published)?,
            parse_component(spec, target)?,
        )),
        _ => Err(PortSpecError::TooManyComponents {
            spec: spec.to_string(),
        }),
    }
}

/// Best-effort parse: malformed components become zero.
///
/// Returns the mapping together with the error the strict parse would have
/// raised, so callers can still report it.
pub fn parse_port_lenient(spec: &str) -> (PortMapping, Option<PortSpecError>) {
    let error = parse_port(spec).err();
    let parts: Vec<&str> = spec.trim().split(':').collect();
    let mapping = match parts.as_slice() {
        [target] => PortMapping::target(target.trim().parse().unwrap_or(0)),
        [published, target, ..] => PortMapping::published(
            published.trim().parse().unwrap_or(0),
            target.trim().parse().unwrap_or(0),
        ),
        [] => PortMapping::target(0),
    };
    (mapping, error)
}

pub fn translate_ports<S: AsRef<str>>(specs: &[S]) -> Result<Vec<PortMapping>, PortSpecError> {
    specs.iter().map(|spec| parse_port(spec.as_ref())).collect()
}

/// One volume-type mount per attachment, targeting its destination.
pub fn translate_mounts(attachments: &[VolumeAttachment]) -> Vec<MountDirective> {
    attachments
        .iter()
        .map(|attachment| MountDirective {
            kind: MountKind::Volume,
            target: attachment.destination.clone(),
        })
        .collect()
}

fn parse_component(spec: &str, component: &str) -> Result<u16, PortSpecError> {
    component
        .trim()
        .parse::<u16>()
        .map_err(|_| PortSpecError::InvalidNumber {
            spec: spec.to_string(),
            component: component.to_string(),
        })
}
