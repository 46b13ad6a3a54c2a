//! In-memory model of the detected modules.
//!
//! A [`ModuleModel`] maps every requested package either to a single
//! [`ComponentProperties`] (packages requested without components) or to one
//! [`ComponentProperties`] per detected component. It is seeded from the
//! [`DetectionResult`], filled by folding the extraction-pass cache through
//! [`collect_properties`] and then walked once by the descriptor writer.

mod collect;

use std::collections::BTreeMap;

use crate::cache::{Candidate, KeyResolver};
use crate::package::DetectionResult;

pub use collect::{
    DependencyList, PropertyKey, apply_entry, classify_dependencies, collect_properties,
    library_from_location,
};

/// List-valued properties of a component, in descriptor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IncludePaths,
    SystemIncludePaths,
    Defines,
    CommonCompilerFlags,
    DynamicLibraries,
    StaticLibraries,
    LibraryPaths,
    Frameworks,
    FrameworkPaths,
    DriverLinkerFlags,
    Dependencies,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::IncludePaths,
        Field::SystemIncludePaths,
        Field::Defines,
        Field::CommonCompilerFlags,
        Field::DynamicLibraries,
        Field::StaticLibraries,
        Field::LibraryPaths,
        Field::Frameworks,
        Field::FrameworkPaths,
        Field::DriverLinkerFlags,
        Field::Dependencies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::IncludePaths => "includePaths",
            Field::SystemIncludePaths => "systemIncludePaths",
            Field::Defines => "defines",
            Field::CommonCompilerFlags => "commonCompilerFlags",
            Field::DynamicLibraries => "dynamicLibraries",
            Field::StaticLibraries => "staticLibraries",
            Field::LibraryPaths => "libraryPaths",
            Field::Frameworks => "frameworks",
            Field::FrameworkPaths => "frameworkPaths",
            Field::DriverLinkerFlags => "driverLinkerFlags",
            Field::Dependencies => "dependencies",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything known about one package or component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentProperties {
    pub version: String,
    pub include_paths: Vec<String>,
    pub system_include_paths: Vec<String>,
    pub defines: Vec<String>,
    pub common_compiler_flags: Vec<String>,
    pub dynamic_libraries: Vec<String>,
    pub static_libraries: Vec<String>,
    pub library_paths: Vec<String>,
    pub frameworks: Vec<String>,
    pub framework_paths: Vec<String>,
    pub driver_linker_flags: Vec<String>,
    pub dependencies: Vec<String>,
}

impl ComponentProperties {
    pub fn field(&self, field: Field) -> &[String] {
        match field {
            Field::IncludePaths => &self.include_paths,
            Field::SystemIncludePaths => &self.system_include_paths,
            Field::Defines => &self.defines,
            Field::CommonCompilerFlags => &self.common_compiler_flags,
            Field::DynamicLibraries => &self.dynamic_libraries,
            Field::StaticLibraries => &self.static_libraries,
            Field::LibraryPaths => &self.library_paths,
            Field::Frameworks => &self.frameworks,
            Field::FrameworkPaths => &self.framework_paths,
            Field::DriverLinkerFlags => &self.driver_linker_flags,
            Field::Dependencies => &self.dependencies,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::IncludePaths => &mut self.include_paths,
            Field::SystemIncludePaths => &mut self.system_include_paths,
            Field::Defines => &mut self.defines,
            Field::CommonCompilerFlags => &mut self.common_compiler_flags,
            Field::DynamicLibraries => &mut self.dynamic_libraries,
            Field::StaticLibraries => &mut self.static_libraries,
            Field::LibraryPaths => &mut self.library_paths,
            Field::Frameworks => &mut self.frameworks,
            Field::FrameworkPaths => &mut self.framework_paths,
            Field::DriverLinkerFlags => &mut self.driver_linker_flags,
            Field::Dependencies => &mut self.dependencies,
        }
    }

    /// Append a single value. Empty values are dropped.
    pub fn push(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.field_mut(field).push(value);
        }
    }

    /// Append several values after the existing ones.
    pub fn extend<I>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.field_mut(field)
            .extend(values.into_iter().filter(|v| !v.is_empty()));
    }

    /// Fields holding at least one value, in descriptor order.
    pub fn non_empty_fields(&self) -> impl Iterator<Item = (Field, &[String])> {
        Field::ALL
            .into_iter()
            .map(|field| (field, self.field(field)))
            .filter(|(_, values)| !values.is_empty())
    }
}

/// Shape of one package in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Module {
    /// Package requested without components.
    Single(ComponentProperties),
    /// Package requested with components; only detected ones are present.
    /// The version is package-wide and inherited by every component.
    Components {
        version: String,
        components: BTreeMap<String, ComponentProperties>,
    },
}

impl Module {
    pub fn version(&self) -> &str {
        match self {
            Module::Single(props) => &props.version,
            Module::Components { version, .. } => version,
        }
    }

    pub fn set_version(&mut self, value: impl Into<String>) {
        match self {
            Module::Single(props) => props.version = value.into(),
            Module::Components { version, .. } => *version = value.into(),
        }
    }

    /// The property container for a component (or for the package itself
    /// when `component` is `None`), if the model has one.
    pub fn properties_mut(&mut self, component: Option<&str>) -> Option<&mut ComponentProperties> {
        match (self, component) {
            (Module::Single(props), None) => Some(props),
            (Module::Components { components, .. }, Some(name)) => components.get_mut(name),
            _ => None,
        }
    }

    pub fn component_names(&self) -> Vec<&str> {
        match self {
            Module::Single(_) => Vec::new(),
            Module::Components { components, .. } => {
                components.keys().map(String::as_str).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleModel {
    modules: BTreeMap<String, Module>,
}

impl ModuleModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape the model after the enumeration pass: one entry per package,
    /// with a container for every detected component.
    pub fn from_detection(detection: &DetectionResult) -> Self {
        let mut model = Self::new();
        for package in detection.packages() {
            let module = if package.query.has_components() {
                Module::Components {
                    version: String::new(),
                    components: package
                        .detected_components()
                        .into_iter()
                        .map(|name| (name.to_string(), ComponentProperties::default()))
                        .collect(),
                }
            } else {
                Module::Single(ComponentProperties::default())
            };
            model.insert(package.name(), module);
        }
        model
    }

    pub fn insert(&mut self, name: impl Into<String>, module: Module) {
        self.modules.insert(name.into(), module);
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Module)> {
        self.modules.iter().map(|(name, module)| (name.as_str(), module))
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    /// Resolver over the package and component names currently in the model.
    pub fn resolver(&self) -> KeyResolver {
        KeyResolver::new(
            self.modules
                .iter()
                .map(|(name, module)| Candidate::new(name.clone(), module.component_names()))
                .collect(),
        )
    }
}
