//! Reading the probe's persisted cache.
//!
//! The cache is a line-oriented `KEY:TYPE=VALUE` store. Parsing is a best
//! effort scan: comments, blank lines and anything that does not fit the
//! entry pattern are skipped without error.
//!
//! - `resolve` - mapping a flat key onto a (package, component) pair
//! - `detect` - the enumeration pass over `<Name>_DIR` entries

mod detect;
mod resolve;

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::runtime::Runtime;

pub use detect::detect_components;
pub use resolve::{Candidate, KeyResolver, Resolved};

/// File name of the cache inside the probe's build directory.
pub const CACHE_FILE_NAME: &str = "CMakeCache.txt";

/// Type tag of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Internal,
    FilePath,
    Path,
    String,
    Bool,
    Static,
    Uninitialized,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Internal => "INTERNAL",
            EntryKind::FilePath => "FILEPATH",
            EntryKind::Path => "PATH",
            EntryKind::String => "STRING",
            EntryKind::Bool => "BOOL",
            EntryKind::Static => "STATIC",
            EntryKind::Uninitialized => "UNINITIALIZED",
        }
    }
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTERNAL" => Ok(EntryKind::Internal),
            "FILEPATH" => Ok(EntryKind::FilePath),
            "PATH" => Ok(EntryKind::Path),
            "STRING" => Ok(EntryKind::String),
            "BOOL" => Ok(EntryKind::Bool),
            "STATIC" => Ok(EntryKind::Static),
            "UNINITIALIZED" => Ok(EntryKind::Uninitialized),
            _ => anyhow::bail!("Unknown cache entry type '{}'", s),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `KEY:TYPE=VALUE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub kind: EntryKind,
    pub value: String,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, kind: EntryKind, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            value: value.into(),
        }
    }
}

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A missing type is what the probe records for `-DKEY=VALUE`.
        Regex::new(
            r"^([A-Za-z0-9_]+)(?::(INTERNAL|FILEPATH|PATH|STRING|BOOL|STATIC|UNINITIALIZED))?=(.*)$",
        )
        .expect("cache entry pattern is valid")
    })
}

/// Parse one cache line, or `None` if it is not an entry.
pub fn parse_line(line: &str) -> Option<CacheEntry> {
    let captures = entry_pattern().captures(line)?;
    let kind = match captures.get(2) {
        Some(kind) => kind.as_str().parse().ok()?,
        None => EntryKind::Uninitialized,
    };
    Some(CacheEntry::new(&captures[1], kind, &captures[3]))
}

/// Parse the whole cache, keeping file order.
pub fn parse_cache(content: &str) -> Vec<CacheEntry> {
    content.lines().filter_map(parse_line).collect()
}

pub fn cache_path(working_dir: &Path) -> PathBuf {
    working_dir.join(CACHE_FILE_NAME)
}

#[tracing::instrument(skip(runtime))]
pub fn read_cache<R: Runtime>(runtime: &R, working_dir: &Path) -> Result<Vec<CacheEntry>> {
    let path = cache_path(working_dir);
    let content = runtime
        .read_to_string(&path)
        .with_context(|| format!("Failed to read probe cache {:?}", path))?;
    let entries = parse_cache(&content);
    log::debug!("Parsed {} cache entries from {:?}", entries.len(), path);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_parse_line_typed() {
        let entry = parse_line("ZLIB_INCLUDE_DIR:PATH=/usr/include").unwrap();
        assert_eq!(entry, CacheEntry::new("ZLIB_INCLUDE_DIR", EntryKind::Path, "/usr/include"));
    }

    #[test]
    fn test_parse_line_untyped_is_uninitialized() {
        let entry = parse_line("CMAKE_BUILD_TYPE=Release").unwrap();
        assert_eq!(entry.kind, EntryKind::Uninitialized);
        assert_eq!(entry.value, "Release");
    }

    #[test]
    fn test_parse_line_keeps_value_verbatim() {
        let entry = parse_line("Qt5_Core_dependencies:STRING=Qt5::Core;Threads::Threads").unwrap();
        assert_eq!(entry.value, "Qt5::Core;Threads::Threads");

        let entry = parse_line("Foo_compileDefines:STRING=").unwrap();
        assert_eq!(entry.value, "");

        let entry = parse_line("Foo_flags:STRING=-DX=1").unwrap();
        assert_eq!(entry.value, "-DX=1");
    }

    #[test]
    fn test_parse_line_skips_non_entries() {
        assert!(parse_line("# This is the CMakeCache file.").is_none());
        assert!(parse_line("//Path to a program.").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("FOO:WEIRD=1").is_none());
        assert!(parse_line("\"QUOTED KEY\":STRING=1").is_none());
        assert!(parse_line("-bad-key:STRING=1").is_none());
    }

    #[test]
    fn test_parse_cache_keeps_file_order() {
        let content = "\
# comment
B_includePaths:STRING=/b

A_includePaths:STRING=/a
//doc line
A_VERSION:STRING=1.0
";
        let keys: Vec<_> = parse_cache(content).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["B_includePaths", "A_includePaths", "A_VERSION"]);
    }

    #[test]
    fn test_parse_cache_handles_crlf() {
        let entries = parse_cache("A_VERSION:STRING=1.0\r\nB_VERSION:STRING=2.0\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, "1.0");
    }

    #[test]
    fn test_entry_kind_round_trip_names() {
        for name in ["INTERNAL", "FILEPATH", "PATH", "STRING", "BOOL", "STATIC", "UNINITIALIZED"] {
            let kind: EntryKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }
        assert!("FLOAT".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_read_cache() {
        let mut runtime = MockRuntime::new();
        let dir = PathBuf::from("/tmp/work");

        runtime
            .expect_read_to_string()
            .with(eq(dir.join("CMakeCache.txt")))
            .returning(|_| Ok("ZLIB_DIR:PATH=/usr/lib/cmake/zlib\n".to_string()));

        let entries = read_cache(&runtime, &dir).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "ZLIB_DIR");
    }

    #[test]
    fn test_read_cache_missing_file_is_fatal() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("not found")));

        let result = read_cache(&runtime, Path::new("/tmp/work"));
        assert!(result.unwrap_err().to_string().contains("Failed to read probe cache"));
    }
}
