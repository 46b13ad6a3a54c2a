//! Extraction pass: folding cache entries into the module model.

use log::debug;
use std::path::Path;

use super::{Field, ModuleModel};
use crate::cache::{CacheEntry, KeyResolver};

const THREADS_TARGET: &str = "Threads::Threads";
const THREADS_LIBRARY: &str = "pthread";
const NAMESPACE_SEPARATOR: &str = "::";
const STATIC_LIBRARY_EXTENSION: &str = ".a";
const LIST_SEPARATOR: char = ';';

/// Property a cache key carries, identified by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKey {
    Version,
    Location,
    IncludePaths,
    SystemIncludePaths,
    CompileDefines,
    LinkOptions,
    LibraryPaths,
    Dependencies,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 8] = [
        PropertyKey::Version,
        PropertyKey::Location,
        PropertyKey::IncludePaths,
        PropertyKey::SystemIncludePaths,
        PropertyKey::CompileDefines,
        PropertyKey::LinkOptions,
        PropertyKey::LibraryPaths,
        PropertyKey::Dependencies,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            PropertyKey::Version => "_VERSION",
            PropertyKey::Location => "_location",
            PropertyKey::IncludePaths => "_includePaths",
            PropertyKey::SystemIncludePaths => "_systemIncludePaths",
            PropertyKey::CompileDefines => "_compileDefines",
            PropertyKey::LinkOptions => "_linkOptions",
            PropertyKey::LibraryPaths => "_libraryPaths",
            PropertyKey::Dependencies => "_dependencies",
        }
    }

    /// Split `key` into its (package[, component]) stem and property.
    pub fn split(key: &str) -> Option<(&str, PropertyKey)> {
        Self::ALL.into_iter().find_map(|property| {
            key.strip_suffix(property.suffix())
                .filter(|stem| !stem.is_empty())
                .map(|stem| (stem, property))
        })
    }
}

/// A probe link-library list split into package references and plain libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    /// Cross-package references, `Foo::Bar` rewritten as `Foo.Bar`.
    pub dependencies: Vec<String>,
    /// Libraries to link directly.
    pub libraries: Vec<String>,
}

/// Classify a `;`-separated link-library list. Unknown shapes are kept as
/// plain libraries.
pub fn classify_dependencies(value: &str) -> DependencyList {
    let mut list = DependencyList::default();
    for token in value.split(LIST_SEPARATOR).filter(|t| !t.is_empty()) {
        if token == THREADS_TARGET {
            list.libraries.push(THREADS_LIBRARY.to_string());
            continue;
        }
        match token.split_once(NAMESPACE_SEPARATOR) {
            Some((namespace, name))
                if !namespace.is_empty()
                    && !name.is_empty()
                    && !name.contains(NAMESPACE_SEPARATOR) =>
            {
                list.dependencies.push(format!("{}.{}", namespace, name));
            }
            _ => list.libraries.push(token.to_string()),
        }
    }
    list
}

/// Map an imported location onto the library field it belongs to.
///
/// Static archives are kept verbatim. Anything else becomes a bare library
/// name: `/usr/lib/libfoo.so` gives `libfoo`.
pub fn library_from_location(value: &str) -> Option<(Field, String)> {
    if value.is_empty() {
        return None;
    }
    if value.ends_with(STATIC_LIBRARY_EXTENSION) {
        return Some((Field::StaticLibraries, value.to_string()));
    }
    let stem = Path::new(value).file_stem()?.to_string_lossy().into_owned();
    Some((Field::DynamicLibraries, stem))
}

/// Apply one cache entry to the model.
///
/// Entries without a known suffix, entries that resolve to no known package
/// or component, and entries for a container the model does not have are
/// ignored.
pub fn apply_entry(model: &mut ModuleModel, resolver: &KeyResolver, entry: &CacheEntry) {
    let Some((stem, property)) = PropertyKey::split(&entry.key) else {
        return;
    };
    let Some(resolved) = resolver.resolve(stem) else {
        return;
    };
    let Some(module) = model.get_mut(resolved.package) else {
        return;
    };

    if property == PropertyKey::Version {
        if resolved.component.is_none() {
            module.set_version(entry.value.as_str());
        }
        return;
    }

    let Some(props) = module.properties_mut(resolved.component) else {
        debug!("No container for cache key {}, skipping", entry.key);
        return;
    };

    let value = entry.value.as_str();
    match property {
        PropertyKey::Location => {
            if let Some((field, library)) = library_from_location(value) {
                props.push(field, library);
            }
        }
        PropertyKey::IncludePaths => props.push(Field::IncludePaths, value),
        PropertyKey::SystemIncludePaths => props.push(Field::SystemIncludePaths, value),
        PropertyKey::CompileDefines => props.push(Field::Defines, value),
        PropertyKey::LinkOptions => props.push(Field::DriverLinkerFlags, value),
        PropertyKey::LibraryPaths => props.push(Field::LibraryPaths, value),
        PropertyKey::Dependencies => {
            let list = classify_dependencies(value);
            props.extend(Field::Dependencies, list.dependencies);
            props.extend(Field::DynamicLibraries, list.libraries);
        }
        PropertyKey::Version => {}
    }
}

/// Fold the extraction-pass cache into `model`, in cache line order.
pub fn collect_properties(model: ModuleModel, entries: &[CacheEntry]) -> ModuleModel {
    let resolver = model.resolver();
    entries.iter().fold(model, |mut model, entry| {
        apply_entry(&mut model, &resolver, entry);
        model
    })
}
