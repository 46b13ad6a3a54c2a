//! Driving the external probe tool (CMake).
//!
//! The probe is configured in place (`-S dir -B dir`) and runs to completion
//! synchronously. Any non-zero exit aborts the whole detection run.

pub mod project;

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::{ProcessOutput, Runtime};

/// The probe did not exit cleanly.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{program} failed with exit code {code}:\n{stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// How to invoke the probe, independent of the directory it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInvocation {
    pub program: PathBuf,
    pub toolchain_file: Option<PathBuf>,
    /// Passed through verbatim, after every generated argument.
    pub extra_args: Vec<String>,
}

impl ProbeInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            toolchain_file: None,
            extra_args: Vec::new(),
        }
    }

    pub fn args(&self, working_dir: &Path) -> Vec<String> {
        let dir = working_dir.display().to_string();
        let mut args = vec!["-S".to_string(), dir.clone(), "-B".to_string(), dir];
        if let Some(toolchain) = &self.toolchain_file {
            args.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Run the probe on `working_dir` and return its captured output.
///
/// A non-zero exit code is returned as [`ProbeError::Failed`].
#[tracing::instrument(skip(runtime, invocation))]
pub fn run_probe<R: Runtime>(
    runtime: &R,
    invocation: &ProbeInvocation,
    working_dir: &Path,
) -> Result<ProcessOutput> {
    let args = invocation.args(working_dir);
    debug!("Running {:?} {}", invocation.program, args.join(" "));

    let output = runtime.run(&invocation.program, &args)?;
    debug!("Probe stdout:\n{}", output.stdout);
    debug!("Probe stderr:\n{}", output.stderr);

    if !output.success() {
        return Err(ProbeError::Failed {
            program: invocation.program.display().to_string(),
            code: output.exit_code,
            stderr: output.stderr,
        }
        .into());
    }
    Ok(output)
}
