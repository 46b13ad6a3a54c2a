use log::debug;

use super::resolve::KeyResolver;
use super::{CacheEntry, EntryKind};
use crate::package::{DetectionResult, PackageQuery};

const DIR_SUFFIX: &str = "_DIR";
const NOT_FOUND_SUFFIX: &str = "-NOTFOUND";

/// Enumeration pass: find which requested components the probe located.
///
/// Only `<Key>_DIR:PATH` entries whose value is not a `-NOTFOUND` sentinel
/// count. A key naming a package marks the package as found, a key naming
/// one of its requested components marks the component as detected.
pub fn detect_components(entries: &[CacheEntry], queries: &[PackageQuery]) -> DetectionResult {
    let resolver = KeyResolver::from_queries(queries);
    let mut result = DetectionResult::new(queries);

    for entry in entries {
        if entry.kind != EntryKind::Path || entry.value.ends_with(NOT_FOUND_SUFFIX) {
            continue;
        }
        let Some(stem) = entry.key.strip_suffix(DIR_SUFFIX) else {
            continue;
        };
        let Some(resolved) = resolver.resolve(stem) else {
            continue;
        };
        match resolved.component {
            Some(component) => {
                debug!("Detected {}::{} at {}", resolved.package, component, entry.value);
                result.record_component(resolved.package, component);
            }
            None => {
                debug!("Found package {} at {}", resolved.package, entry.value);
                result.mark_found(resolved.package);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::parse_cache;

    fn queries() -> Vec<PackageQuery> {
        vec![
            PackageQuery::new("ZLIB"),
            PackageQuery::with_components("Qt5", ["Core", "Gui", "Sql"]),
            PackageQuery::with_components("Boost", ["filesystem", "system"]),
        ]
    }

    #[test_log::test]
    fn test_detect_components() {
        let cache = "\
ZLIB_DIR:PATH=/usr/lib/cmake/zlib
Qt5_DIR:PATH=/usr/lib/cmake/Qt5
Qt5Core_DIR:PATH=/usr/lib/cmake/Qt5Core
Qt5Gui_DIR:PATH=/usr/lib/cmake/Qt5Gui
Qt5Sql_DIR:PATH=Qt5Sql_DIR-NOTFOUND
boost_filesystem_DIR:PATH=/usr/lib/cmake/boost_filesystem-1.83.0
Boost_system_DIR:PATH=Boost_system_DIR-NOTFOUND
";
        let result = detect_components(&parse_cache(cache), &queries());

        assert!(result.get("ZLIB").unwrap().found);
        let qt = result.get("Qt5").unwrap();
        assert!(qt.found);
        assert_eq!(qt.detected_components(), vec!["Core", "Gui"]);
        let boost = result.get("Boost").unwrap();
        assert!(!boost.found);
        assert_eq!(boost.detected_components(), vec!["filesystem"]);
    }

    #[test]
    fn test_detect_ignores_non_path_and_non_dir_entries() {
        let cache = "\
Qt5Core_DIR:STRING=/usr/lib/cmake/Qt5Core
Qt5Gui_DIR:FILEPATH=/usr/lib/cmake/Qt5Gui
Qt5Sql_INCLUDE:PATH=/usr/include
_DIR:PATH=/somewhere
Qt5Widgets_DIR:PATH=/usr/lib/cmake/Qt5Widgets
";
        let result = detect_components(&parse_cache(cache), &queries());
        assert!(result.get("Qt5").unwrap().detected_components().is_empty());
    }

    #[test]
    fn test_detected_count_never_exceeds_declared() {
        let cache = "\
Qt5Core_DIR:PATH=/a
Qt5_Core_DIR:PATH=/b
qt5_Gui_DIR:PATH=/c
Qt5Sql_DIR:PATH=/d
Qt5Xml_DIR:PATH=/e
";
        let result = detect_components(&parse_cache(cache), &queries());
        for package in result.packages() {
            assert!(package.detected_components().len() <= package.query.components.len());
        }
        assert_eq!(
            result.get("Qt5").unwrap().detected_components(),
            vec!["Core", "Gui", "Sql"]
        );
    }

    #[test]
    fn test_detect_empty_cache() {
        let result = detect_components(&[], &queries());
        assert_eq!(result.packages().len(), 3);
        assert!(result.packages().iter().all(|p| !p.found));
    }
}
