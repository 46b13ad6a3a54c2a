//! The two-step detection pipeline.
//!
//! 1. [`enumerate`]: `find_package` every query, run the probe and read back
//!    which components it located.
//! 2. [`extract`]: query the properties of what was located, run the probe
//!    again and fold the cache into a [`ModuleModel`].
//!
//! [`setup`] runs both on a working directory and writes the descriptors.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::cache::{detect_components, read_cache};
use crate::descriptor::write_descriptors;
use crate::model::{ModuleModel, collect_properties};
use crate::package::{DetectionResult, PackageQuery};
use crate::probe::project::{append_property_queries, write_find_packages};
use crate::probe::{ProbeInvocation, run_probe};
use crate::runtime::Runtime;

const WORK_DIR_PREFIX: &str = "cmdep-";

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub invocation: ProbeInvocation,
    pub packages: Vec<PackageQuery>,
    /// Descriptors are written below `<output_base>/modules`.
    pub output_base: PathBuf,
    /// Fixed working directory. Its `CMakeLists.txt` is overwritten and an
    /// existing probe cache is configured on top of. When unset a temporary
    /// directory is used and removed once the run is over.
    pub work_dir: Option<PathBuf>,
}

/// Enumeration pass.
#[tracing::instrument(skip(runtime, invocation, packages))]
pub fn enumerate<R: Runtime>(
    runtime: &R,
    invocation: &ProbeInvocation,
    working_dir: &Path,
    packages: &[PackageQuery],
) -> Result<DetectionResult> {
    write_find_packages(runtime, working_dir, packages)?;
    run_probe(runtime, invocation, working_dir)?;
    let entries = read_cache(runtime, working_dir)?;
    let detection = detect_components(&entries, packages);

    for package in detection.packages() {
        debug!(
            "{}: found={} components={:?}",
            package.name(),
            package.found,
            package.detected_components()
        );
    }
    Ok(detection)
}

/// Extraction pass. Needs the enumeration result to know what to query.
#[tracing::instrument(skip(runtime, invocation, detection))]
pub fn extract<R: Runtime>(
    runtime: &R,
    invocation: &ProbeInvocation,
    working_dir: &Path,
    detection: &DetectionResult,
) -> Result<ModuleModel> {
    append_property_queries(runtime, working_dir, detection)?;
    run_probe(runtime, invocation, working_dir)?;
    let entries = read_cache(runtime, working_dir)?;
    let model = collect_properties(ModuleModel::from_detection(detection), &entries);
    info!("Collected properties of {} package(s)", model.len());
    Ok(model)
}

/// Run the whole detection and write one descriptor per package or
/// component. Returns the written descriptor paths.
#[tracing::instrument(skip(runtime, options))]
pub fn setup<R: Runtime>(runtime: &R, options: &SetupOptions) -> Result<Vec<PathBuf>> {
    // The guard removes the temporary directory when the run is over.
    let (working_dir, _guard) = match &options.work_dir {
        Some(dir) => {
            runtime.create_dir_all(dir)?;
            (dir.clone(), None)
        }
        None => {
            let dir = tempfile::Builder::new()
                .prefix(WORK_DIR_PREFIX)
                .tempdir_in(runtime.temp_dir())
                .context("Failed to create temporary working directory")?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };
    info!("Probing {} package(s) in {:?}", options.packages.len(), working_dir);

    let detection = enumerate(runtime, &options.invocation, &working_dir, &options.packages)?;
    let model = extract(runtime, &options.invocation, &working_dir, &detection)?;
    write_descriptors(runtime, &model, &options.output_base)
}
