//! Existence checks against the cluster by exact real name.

use crate::cluster::ClusterClient;
use crate::error::DeployError;

/// Whether exactly one network named `real_name` exists.
///
/// More than one match is an [`DeployError::AmbiguousName`] rather than a
/// yes: colliding real names point at a namespacing bug or a conflict with
/// something outside this tool.
pub fn network_exists<C: ClusterClient + ?Sized>(
    client: &C,
    real_name: &str,
) -> Result<bool, DeployError> {
    let matches = client
        .list_networks_by_name(real_name)
        .map_err(|source| DeployError::NetworkLookup {
            name: real_name.to_string(),
            source,
        })?;

    match matches.len() {
        0 => Ok(false),
        1 => Ok(true),
        count => Err(DeployError::AmbiguousName {
            name: real_name.to_string(),
            matches: count,
        }),
    }
}
