//! The project descriptor (`CMakeLists.txt`) the probe is configured with.
//!
//! The enumeration pass writes one `find_package` per query. The extraction
//! pass appends, without touching what is already there, stanzas that copy
//! target properties into cache variables named
//! `<Package>[_<Component>]_<property>` so they can be read back from the cache.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::package::{DetectionResult, PackageQuery};
use crate::runtime::Runtime;

pub const PROJECT_FILE_NAME: &str = "CMakeLists.txt";

/// Properties copied into the cache, as (cache name, target property).
const QUERIED_PROPERTIES: [(&str, &str); 9] = [
    ("compileDefines", "INTERFACE_COMPILE_DEFINITIONS"),
    ("compileFeatures", "INTERFACE_COMPILE_FEATURES"),
    ("compileOptions", "INTERFACE_COMPILE_OPTIONS"),
    ("includePaths", "INTERFACE_INCLUDE_DIRECTORIES"),
    ("systemIncludePaths", "INTERFACE_SYSTEM_INCLUDE_DIRECTORIES"),
    ("dependencies", "INTERFACE_LINK_LIBRARIES"),
    ("linkOptions", "INTERFACE_LINK_OPTIONS"),
    ("libraryPaths", "INTERFACE_LINK_DIRECTORIES"),
    ("configurations", "IMPORTED_CONFIGURATIONS"),
];

pub fn project_path(working_dir: &Path) -> PathBuf {
    working_dir.join(PROJECT_FILE_NAME)
}

/// Project header plus one `find_package` per query. Components are
/// optional so a missing one does not fail the whole configure step.
pub fn render_find_packages(queries: &[PackageQuery]) -> String {
    let mut out = String::new();
    out.push_str("cmake_minimum_required(VERSION 3.5)\n");
    out.push_str("project(cmdep)\n");
    for query in queries {
        if query.has_components() {
            out.push_str(&format!(
                "find_package({} OPTIONAL_COMPONENTS {})\n",
                query.name,
                query.components.join(" ")
            ));
        } else {
            out.push_str(&format!("find_package({})\n", query.name));
        }
    }
    out
}

/// Store `variable` in the cache. `FORCE` replaces the value a previous
/// configure left in a reused working directory.
fn cache_variable(out: &mut String, indent: &str, variable: &str, description: &str) {
    out.push_str(&format!(
        "{indent}set({variable} \"${{{variable}}}\" CACHE STRING \"{description}\" FORCE)\n"
    ));
}

/// Copy every queried property of `target` into `<prefix>_<property>`.
///
/// The imported location is configuration scoped: the first reported
/// configuration is used, and without any the unscoped property is read.
fn render_target_stanza(out: &mut String, target: &str, prefix: &str, label: &str) {
    out.push_str(&format!("if(TARGET {target})\n"));
    for (name, property) in QUERIED_PROPERTIES {
        let variable = format!("{prefix}_{name}");
        out.push_str(&format!(
            "  get_property({variable} TARGET {target} PROPERTY {property})\n"
        ));
        cache_variable(out, "  ", &variable, &format!("{label} {name}"));
    }

    let configurations = format!("{prefix}_configurations");
    let configuration = format!("{prefix}_configuration");
    let location = format!("{prefix}_location");
    out.push_str(&format!("  if({configurations})\n"));
    out.push_str(&format!(
        "    list(GET {configurations} 0 {configuration})\n"
    ));
    out.push_str(&format!(
        "    get_property({location} TARGET {target} PROPERTY IMPORTED_LOCATION_${{{configuration}}})\n"
    ));
    out.push_str("  else()\n");
    out.push_str(&format!(
        "    get_property({location} TARGET {target} PROPERTY IMPORTED_LOCATION)\n"
    ));
    out.push_str("  endif()\n");
    cache_variable(out, "  ", &location, &format!("{label} location"));
    out.push_str("endif()\n");
}

/// Property stanzas for every detected component, or for the package
/// itself when it was requested without components.
pub fn render_property_queries(detection: &DetectionResult) -> String {
    let mut out = String::new();
    for package in detection.packages() {
        let name = package.name();
        cache_variable(&mut out, "", &format!("{name}_VERSION"), &format!("{name} version"));

        if package.query.has_components() {
            for component in package.detected_components() {
                render_target_stanza(
                    &mut out,
                    &format!("{name}::{component}"),
                    &format!("{name}_{component}"),
                    &format!("{name} {component}"),
                );
            }
        } else {
            render_target_stanza(&mut out, name, name, name);
        }
    }
    out
}

/// Create the project descriptor for the enumeration pass.
#[tracing::instrument(skip(runtime, queries))]
pub fn write_find_packages<R: Runtime>(
    runtime: &R,
    working_dir: &Path,
    queries: &[PackageQuery],
) -> Result<()> {
    let path = project_path(working_dir);
    runtime
        .write(&path, render_find_packages(queries).as_bytes())
        .with_context(|| format!("Failed to write project descriptor {:?}", path))
}

/// Extend the project descriptor for the extraction pass.
#[tracing::instrument(skip(runtime, detection))]
pub fn append_property_queries<R: Runtime>(
    runtime: &R,
    working_dir: &Path,
    detection: &DetectionResult,
) -> Result<()> {
    let path = project_path(working_dir);
    runtime
        .append(&path, render_property_queries(detection).as_bytes())
        .with_context(|| format!("Failed to extend project descriptor {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::{always, eq};

    fn queries() -> Vec<PackageQuery> {
        vec![
            PackageQuery::new("ZLIB"),
            PackageQuery::with_components("Qt5", ["Core", "Gui"]),
        ]
    }

    #[test]
    fn test_render_find_packages() {
        assert_eq!(
            render_find_packages(&queries()),
            "cmake_minimum_required(VERSION 3.5)\n\
             project(cmdep)\n\
             find_package(ZLIB)\n\
             find_package(Qt5 OPTIONAL_COMPONENTS Core Gui)\n"
        );
    }

    #[test]
    fn test_render_property_queries_for_component() {
        let mut detection = DetectionResult::new(&queries());
        detection.record_component("Qt5", "Core");

        let out = render_property_queries(&detection);

        assert!(out.contains("set(Qt5_VERSION \"${Qt5_VERSION}\" CACHE STRING \"Qt5 version\" FORCE)\n"));
        assert!(out.contains("if(TARGET Qt5::Core)\n"));
        assert!(out.contains(
            "  get_property(Qt5_Core_includePaths TARGET Qt5::Core PROPERTY INTERFACE_INCLUDE_DIRECTORIES)\n"
        ));
        assert!(out.contains(
            "  set(Qt5_Core_includePaths \"${Qt5_Core_includePaths}\" CACHE STRING \"Qt5 Core includePaths\" FORCE)\n"
        ));
        assert!(out.contains("    list(GET Qt5_Core_configurations 0 Qt5_Core_configuration)\n"));
        assert!(out.contains(
            "    get_property(Qt5_Core_location TARGET Qt5::Core PROPERTY IMPORTED_LOCATION_${Qt5_Core_configuration})\n"
        ));
        assert!(out.contains(
            "    get_property(Qt5_Core_location TARGET Qt5::Core PROPERTY IMPORTED_LOCATION)\n"
        ));
        // Gui was not detected
        assert!(!out.contains("Qt5::Gui"));
    }

    #[test]
    fn test_render_property_queries_for_package() {
        let detection = DetectionResult::new(&queries());
        let out = render_property_queries(&detection);

        assert!(out.contains("if(TARGET ZLIB)\n"));
        assert!(out.contains(
            "  get_property(ZLIB_dependencies TARGET ZLIB PROPERTY INTERFACE_LINK_LIBRARIES)\n"
        ));
        assert!(out.contains("set(ZLIB_location \"${ZLIB_location}\" CACHE STRING \"ZLIB location\" FORCE)"));
    }

    #[test]
    fn test_render_property_queries_covers_every_property() {
        let detection = DetectionResult::new(&[PackageQuery::new("Foo")]);
        let out = render_property_queries(&detection);
        for name in [
            "compileDefines",
            "compileFeatures",
            "compileOptions",
            "includePaths",
            "systemIncludePaths",
            "dependencies",
            "linkOptions",
            "libraryPaths",
            "configurations",
            "location",
        ] {
            assert!(out.contains(&format!("set(Foo_{name} ")), "missing {name}");
        }
        assert_eq!(out.matches("if(TARGET Foo)").count(), 1);
        assert_eq!(out.matches("endif()").count(), 2);
    }

    #[test]
    fn test_cache_variables_replace_previous_values() {
        let mut detection = DetectionResult::new(&queries());
        detection.record_component("Qt5", "Core");
        let out = render_property_queries(&detection);

        let cache_lines: Vec<&str> = out.lines().filter(|l| l.contains(" CACHE ")).collect();
        // two version lines, ten properties for each of ZLIB and Qt5::Core
        assert_eq!(cache_lines.len(), 22);
        for line in cache_lines {
            assert!(line.ends_with(" FORCE)"), "not forced: {line}");
        }
    }

    #[test]
    fn test_package_without_detected_components_only_queries_version() {
        let detection = DetectionResult::new(&[PackageQuery::with_components("Qt5", ["Core"])]);
        assert_eq!(
            render_property_queries(&detection),
            "set(Qt5_VERSION \"${Qt5_VERSION}\" CACHE STRING \"Qt5 version\" FORCE)\n"
        );
    }

    #[test]
    fn test_write_and_append_use_project_file() {
        let mut runtime = MockRuntime::new();
        let dir = PathBuf::from("/tmp/work");

        runtime
            .expect_write()
            .with(eq(dir.join("CMakeLists.txt")), always())
            .times(1)
            .returning(|_, contents| {
                assert!(String::from_utf8_lossy(contents).contains("find_package(ZLIB)"));
                Ok(())
            });
        runtime
            .expect_append()
            .with(eq(dir.join("CMakeLists.txt")), always())
            .times(1)
            .returning(|_, contents| {
                assert!(String::from_utf8_lossy(contents).contains("if(TARGET ZLIB)"));
                Ok(())
            });

        let queries = vec![PackageQuery::new("ZLIB")];
        write_find_packages(&runtime, &dir, &queries).unwrap();
        append_property_queries(&runtime, &dir, &DetectionResult::new(&queries)).unwrap();
    }
}
