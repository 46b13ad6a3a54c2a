//! Package queries and detection results
//!
//! This module holds the caller-supplied description of what to look for
//! and the typed result of the enumeration pass that feeds the extraction pass.

mod detection;
mod manifest;
mod query;

pub use detection::{DetectedPackage, DetectionResult};
pub use manifest::{ManifestEntry, load_manifest, merge_queries, parse_manifest};
pub use query::PackageQuery;
