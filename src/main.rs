use anyhow::Result;
use clap::{ArgAction, Parser};
use cmdep::package::{PackageQuery, load_manifest, merge_queries};
use cmdep::probe::ProbeInvocation;
use cmdep::setup::{SetupOptions, setup};
use std::path::PathBuf;

/// cmdep - CMake dependency detector
///
/// Locates native libraries through CMake's find_package and writes one qbs
/// module per package or component below <OUTPUT>/modules.
///
/// Examples:
///   cmdep --output build --package ZLIB --package Qt5:Core,Gui
///   cmdep --output build --packages packages.json --probe-arg=-GNinja
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Package to detect, "Name" or "Name:Component1,Component2" (repeatable)
    #[arg(long = "package", short = 'p', value_name = "NAME[:COMPONENTS]")]
    pub packages: Vec<PackageQuery>,

    /// JSON manifest mapping package names to { "components": [...] }
    #[arg(long = "packages", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Output base directory (also via CMDEP_OUTPUT)
    #[arg(long, short = 'o', env = "CMDEP_OUTPUT", value_name = "DIR")]
    pub output: PathBuf,

    /// CMake executable (also via CMDEP_CMAKE)
    #[arg(long, env = "CMDEP_CMAKE", value_name = "PATH", default_value = "cmake")]
    pub cmake: PathBuf,

    /// CMake toolchain file (also via CMDEP_TOOLCHAIN_FILE)
    #[arg(long, env = "CMDEP_TOOLCHAIN_FILE", value_name = "PATH")]
    pub toolchain_file: Option<PathBuf>,

    /// Extra argument passed to CMake verbatim (repeatable)
    #[arg(long = "probe-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub probe_args: Vec<String>,

    /// Working directory to configure in, kept after the run. An existing
    /// CMakeLists.txt there is overwritten; its CMake cache is reused
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_level(cli.verbose)),
    )
    .init();
    let runtime = cmdep::runtime::RealRuntime;

    let manifest = match &cli.manifest {
        Some(path) => load_manifest(&runtime, path)?,
        None => Vec::new(),
    };
    let options = SetupOptions {
        invocation: ProbeInvocation {
            program: cli.cmake,
            toolchain_file: cli.toolchain_file,
            extra_args: cli.probe_args,
        },
        packages: merge_queries(manifest, cli.packages)?,
        output_base: cli.output,
        work_dir: cli.work_dir,
    };

    for path in setup(&runtime, &options)? {
        println!("{}", path.display());
    }
    Ok(())
}
