//! Runtime abstraction for system operations.
//!
//! Everything the detection pass does to the outside world goes through the
//! [`Runtime`] trait, so the pipeline can be exercised with a mock.
//!
//! # Structure
//!
//! - `env` - The temporary directory root
//! - `fs` - File system operations (read, write, append, directory)
//! - `process` - Synchronous execution of external programs

mod env;
mod fs;
mod process;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Captured result of a finished external process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    // Environment
    fn temp_dir(&self) -> PathBuf;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Append to a file, creating it if needed. Existing content is kept.
    fn append(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    // Processes
    /// Run `program` with `args`, block until it exits and capture its output.
    /// Only a failure to start the process is an error; a non-zero exit code
    /// is reported through [`ProcessOutput::exit_code`].
    fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn temp_dir(&self) -> PathBuf {
        self.temp_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.append_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        self.run_impl(program, args)
    }
}
