//! Package queries and their inline command-line syntax.

use anyhow::{Result, bail};
use std::str::FromStr;

/// A package the caller wants detected, with the components it asks for.
///
/// An empty component list means the package is looked up as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageQuery {
    pub name: String,
    pub components: Vec<String>,
}

impl PackageQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn with_components<I, S>(name: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }
}

impl std::fmt::Display for PackageQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.components.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.components.join(","))
        }
    }
}

/// Names end up in CMake variable names and in cache keys, so they are
/// restricted to what the cache key pattern accepts.
pub(crate) fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} name cannot be empty", kind);
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!(
            "Invalid {} name '{}': only ASCII letters, digits and '_' are allowed",
            kind.to_lowercase(),
            value
        );
    }
    Ok(())
}

/// Format: "Name" or "Name:Component1,Component2"
impl FromStr for PackageQuery {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, components) = match s.split_once(':') {
            Some((name, list)) => {
                if list.is_empty() {
                    bail!(
                        "Invalid format: component list after ':' cannot be empty. Expected 'Name:Component1,Component2'."
                    );
                }
                let components: Vec<String> =
                    list.split(',').map(|c| c.trim().to_string()).collect();
                (name, components)
            }
            None => (s, Vec::new()),
        };

        let name = name.trim();
        validate_identifier("Package", name)?;
        for component in &components {
            validate_identifier("Component", component)?;
        }

        Ok(PackageQuery {
            name: name.to_string(),
            components,
        })
    }
}
