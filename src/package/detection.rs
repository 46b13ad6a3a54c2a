use std::collections::BTreeSet;

use super::PackageQuery;

/// What the first probe run found for one requested package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedPackage {
    pub query: PackageQuery,
    /// The package's own `<Name>_DIR` entry resolved to a real location.
    pub found: bool,
    detected: BTreeSet<String>,
}

impl DetectedPackage {
    fn new(query: PackageQuery) -> Self {
        Self {
            query,
            found: false,
            detected: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.query.name
    }

    pub fn is_detected(&self, component: &str) -> bool {
        self.detected.contains(component)
    }

    /// Detected components, in the order they were requested.
    pub fn detected_components(&self) -> Vec<&str> {
        self.query
            .components
            .iter()
            .filter(|c| self.is_detected(c))
            .map(String::as_str)
            .collect()
    }
}

/// Outcome of the enumeration pass, one entry per query in request order.
///
/// Only components that were requested can be recorded, so the detected
/// count of a package never exceeds its declared count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    packages: Vec<DetectedPackage>,
}

impl DetectionResult {
    pub fn new(queries: &[PackageQuery]) -> Self {
        Self {
            packages: queries.iter().cloned().map(DetectedPackage::new).collect(),
        }
    }

    pub fn packages(&self) -> &[DetectedPackage] {
        &self.packages
    }

    pub fn get(&self, package: &str) -> Option<&DetectedPackage> {
        self.packages.iter().find(|p| p.name() == package)
    }

    pub fn mark_found(&mut self, package: &str) {
        if let Some(entry) = self.packages.iter_mut().find(|p| p.name() == package) {
            entry.found = true;
        }
    }

    /// Record a detected component. Returns `false` if the package or the
    /// component was not requested.
    pub fn record_component(&mut self, package: &str, component: &str) -> bool {
        match self.packages.iter_mut().find(|p| p.name() == package) {
            Some(entry) if entry.query.components.iter().any(|c| c == component) => {
                entry.detected.insert(component.to_string());
                true
            }
            _ => false,
        }
    }
}
