//! Generation of qbs module files from the module model.
//!
//! Layout below the output base:
//!
//! - `modules/<Package>/module.qbs` for a package requested without components
//! - `modules/<Package>/<Component>/module.qbs` for every detected component

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::model::{ComponentProperties, Field, Module, ModuleModel};
use crate::runtime::Runtime;

pub const MODULES_DIR: &str = "modules";
pub const DESCRIPTOR_FILE_NAME: &str = "module.qbs";

/// Module every descriptor depends on.
const TOOLCHAIN_MODULE: &str = "cpp";

pub fn module_dir(output_base: &Path, package: &str, component: Option<&str>) -> PathBuf {
    let dir = output_base.join(MODULES_DIR).join(package);
    match component {
        Some(component) => dir.join(component),
        None => dir,
    }
}

fn literal<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to render descriptor literal")
}

/// Render one descriptor. Properties without values are left out.
pub fn render_descriptor(props: &ComponentProperties) -> Result<String> {
    let mut out = String::from("Module {\n");
    if !props.version.is_empty() {
        out.push_str(&format!("    version: {}\n", literal(&props.version)?));
    }
    out.push_str(&format!("    Depends {{ name: {} }}\n", literal(TOOLCHAIN_MODULE)?));
    for dependency in &props.dependencies {
        out.push_str(&format!("    Depends {{ name: {} }}\n", literal(dependency)?));
    }
    for (field, values) in props.non_empty_fields() {
        if field == Field::Dependencies {
            continue;
        }
        out.push_str(&format!(
            "    {}.{}: {}\n",
            TOOLCHAIN_MODULE,
            field,
            literal(values)?
        ));
    }
    out.push_str("}\n");
    Ok(out)
}

fn log_module(name: &str, props: &ComponentProperties) {
    info!(
        "Module: {} ({}), dynamicLibraries: {:?}, staticLibraries: {:?}, defines: {:?}, dependencies: {:?}, includes: {:?}",
        name,
        props.version,
        props.dynamic_libraries,
        props.static_libraries,
        props.defines,
        props.dependencies,
        props.include_paths
    );
}

fn write_one<R: Runtime>(
    runtime: &R,
    dir: &Path,
    name: &str,
    props: &ComponentProperties,
) -> Result<PathBuf> {
    log_module(name, props);
    runtime.create_dir_all(dir)?;
    let path = dir.join(DESCRIPTOR_FILE_NAME);
    runtime
        .write(&path, render_descriptor(props)?.as_bytes())
        .with_context(|| format!("Failed to write module descriptor {:?}", path))?;
    Ok(path)
}

/// Walk the model once and write every descriptor. Returns the written
/// files in walk order.
///
/// Files written before a failure are left in place.
#[tracing::instrument(skip(runtime, model))]
pub fn write_descriptors<R: Runtime>(
    runtime: &R,
    model: &ModuleModel,
    output_base: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (package, module) in model.iter() {
        match module {
            Module::Single(props) => {
                let dir = module_dir(output_base, package, None);
                written.push(write_one(runtime, &dir, package, props)?);
            }
            Module::Components {
                version,
                components,
            } => {
                if components.is_empty() {
                    warn!("No requested component of {} was found", package);
                }
                for (component, props) in components {
                    let props = ComponentProperties {
                        version: version.clone(),
                        ..props.clone()
                    };
                    let dir = module_dir(output_base, package, Some(component));
                    let name = format!("{}.{}", package, component);
                    written.push(write_one(runtime, &dir, &name, &props)?);
                }
            }
        }
    }
    Ok(written)
}
