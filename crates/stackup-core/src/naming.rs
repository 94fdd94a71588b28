//! Project namespacing for cluster resource names.

use std::path::Path;

/// Separator between the project and the logical name.
pub const NAME_SEPARATOR: &str = "_";

/// Compute the name a resource carries in the cluster.
///
/// Owned resources are namespaced as `{project}_{logical}`. External
/// resources keep the name they already have outside this tool: the
/// override when one is given, otherwise the logical name unchanged.
pub fn resolve_name(
    project: &str,
    logical_name: &str,
    external: bool,
    external_name: Option<&str>,
) -> String {
    if external {
        return match external_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => logical_name.to_string(),
        };
    }
    format!("{}{}{}", project, NAME_SEPARATOR, logical_name)
}

/// Pick the project name for this run.
///
/// An explicit name is used as given. Otherwise the base name of `cwd` is
/// normalized with [`normalize_project_name`].
pub fn project_name(explicit: Option<&str>, cwd: &Path) -> String {
    if let Some(name) = explicit
        && !name.is_empty()
    {
        return name.to_string();
    }
    let dir = cwd
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    normalize_project_name(&dir)
}

/// Lower-case and drop every character outside `[a-z0-9]`.
pub fn normalize_project_name(candidate: &str) -> String {
    candidate
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}
