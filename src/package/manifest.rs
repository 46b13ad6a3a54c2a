use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::query::{PackageQuery, validate_identifier};
use crate::runtime::Runtime;

/// One entry of a package manifest.
///
/// ```json
/// {
///     "ZLIB": {},
///     "Qt5": { "name": "Qt5", "components": ["Core", "Gui"] }
/// }
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Option<Vec<String>>,
}

/// Parse a manifest (a JSON object mapping package names to entries).
pub fn parse_manifest(content: &str) -> Result<Vec<PackageQuery>> {
    let entries: BTreeMap<String, ManifestEntry> =
        serde_json::from_str(content).context("Invalid package manifest")?;

    entries
        .into_iter()
        .map(|(key, entry)| {
            let name = entry.name.unwrap_or_else(|| key.clone());
            if name != key {
                bail!(
                    "Package manifest entry '{}' declares a different name '{}'",
                    key,
                    name
                );
            }
            validate_identifier("Package", &name)?;
            let components = entry.components.unwrap_or_default();
            for component in &components {
                validate_identifier("Component", component)?;
            }
            Ok(PackageQuery { name, components })
        })
        .collect()
}

#[tracing::instrument(skip(runtime))]
pub fn load_manifest<R: Runtime>(runtime: &R, path: &Path) -> Result<Vec<PackageQuery>> {
    let content = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to load package manifest {:?}", path))?;
    parse_manifest(&content).with_context(|| format!("In package manifest {:?}", path))
}

/// Combine manifest and command-line queries. Every package may only be
/// requested once, whatever the source.
pub fn merge_queries(
    manifest: Vec<PackageQuery>,
    inline: Vec<PackageQuery>,
) -> Result<Vec<PackageQuery>> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(manifest.len() + inline.len());
    for query in manifest.into_iter().chain(inline) {
        if !seen.insert(query.name.clone()) {
            bail!("Package '{}' is requested more than once", query.name);
        }
        merged.push(query);
    }
    if merged.is_empty() {
        bail!("No packages requested. Use --package or --packages.");
    }
    Ok(merged)
}
