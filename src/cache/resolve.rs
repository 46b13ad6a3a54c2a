//! Mapping flat cache keys onto (package, component) pairs.
//!
//! Cache keys carry no structure: `Qt5Core`, `Qt5_Core` and `qt5_Core` may all
//! name the `Core` component of `Qt5`. Resolution tries, in order:
//!
//! 1. the key is exactly a package name (package-level hit),
//! 2. `<package>_<component>`, with the package part compared ignoring ASCII case,
//! 3. `<package><component>` with no separator.
//!
//! Within a step, packages with longer names are tried first, so that with
//! both `Qt` and `Qt5` requested, `Qt5Core` belongs to `Qt5` and never to a
//! `Qt` component called `5Core`. Ties are broken by name.

use crate::package::PackageQuery;

/// A package and the component names a key may refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub package: String,
    pub components: Vec<String>,
}

impl Candidate {
    pub fn new<I, S>(package: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package: package.into(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    fn component(&self, name: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|c| c.as_str() == name)
            .map(String::as_str)
    }
}

impl From<&PackageQuery> for Candidate {
    fn from(query: &PackageQuery) -> Self {
        Candidate::new(query.name.clone(), query.components.iter().cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub package: &'a str,
    /// `None` for a package-level hit.
    pub component: Option<&'a str>,
}

/// Side-effect free resolver over a fixed, deterministically ordered
/// candidate list.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    candidates: Vec<Candidate>,
}

impl KeyResolver {
    pub fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| {
            b.package
                .len()
                .cmp(&a.package.len())
                .then_with(|| a.package.cmp(&b.package))
        });
        Self { candidates }
    }

    pub fn from_queries(queries: &[PackageQuery]) -> Self {
        Self::new(queries.iter().map(Candidate::from).collect())
    }

    #[cfg(test)]
    fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn resolve(&self, key: &str) -> Option<Resolved<'_>> {
        if let Some(candidate) = self.candidates.iter().find(|c| c.package == key) {
            return Some(Resolved {
                package: &candidate.package,
                component: None,
            });
        }

        self.candidates
            .iter()
            .find_map(|c| Self::with_separator(c, key))
            .or_else(|| {
                self.candidates
                    .iter()
                    .find_map(|c| Self::without_separator(c, key))
            })
    }

    fn with_separator<'a>(candidate: &'a Candidate, key: &str) -> Option<Resolved<'a>> {
        let len = candidate.package.len();
        let head = key.get(..len)?;
        if !head.eq_ignore_ascii_case(&candidate.package) {
            return None;
        }
        let rest = key.get(len..)?.strip_prefix('_')?;
        candidate.component(rest).map(|component| Resolved {
            package: &candidate.package,
            component: Some(component),
        })
    }

    fn without_separator<'a>(candidate: &'a Candidate, key: &str) -> Option<Resolved<'a>> {
        let rest = key.strip_prefix(candidate.package.as_str())?;
        candidate.component(rest).map(|component| Resolved {
            package: &candidate.package,
            component: Some(component),
        })
    }
}
