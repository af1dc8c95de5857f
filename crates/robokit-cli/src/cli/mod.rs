//! CLI for robokit.

mod commands;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use robokit_core::config::{self, ProjectLayout, RobokitConfig};
use robokit_core::Version;
use std::path::{Path, PathBuf};

use commands::{
    run_checksum, run_completions, run_deploy, run_download, run_package, run_provision,
    run_reconcile, run_resolve, run_unpack,
};

/// Top-level CLI for robokit.
#[derive(Debug, Parser)]
#[command(name = "robokit")]
#[command(about = "Provision a Robocode installation and package robots", long_about = None)]
pub struct Cli {
    /// Config file (default: ./robokit.toml, then the user config).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory that relative config paths resolve against (default: current dir).
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the latest Robocode version listed in the release feed.
    Resolve,

    /// Download the setup jar without unpacking it.
    Download {
        /// Version to fetch instead of the configured or latest one.
        #[arg(long, value_parser = parse_version)]
        version: Option<Version>,
        /// Directory to save into (default: the Robocode directory).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// Unpack a setup jar additively into a directory.
    Unpack {
        /// Archive to extract.
        archive: PathBuf,
        /// Destination (default: the Robocode directory).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// Add a directory to Robocode's development path.
    Reconcile {
        /// Properties file (default: <robocode>/config/robocode.properties).
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Directory to add (default: the robot development dir).
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
    },

    /// Resolve, download, unpack and configure Robocode.
    Provision {
        /// Version to install instead of the configured or latest one.
        #[arg(long, value_parser = parse_version)]
        version: Option<Version>,
        /// Download and unpack even if the installation looks current.
        #[arg(long)]
        force: bool,
    },

    /// Build one archive per configured robot.
    Package {
        /// Only package the named robot (repeatable).
        #[arg(long = "robot", value_name = "NAME")]
        robots: Vec<String>,
    },

    /// Package all robots and refresh the robot development dir.
    Deploy,

    /// Compute SHA-256 of a file (e.g. a downloaded setup jar).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_version(s: &str) -> std::result::Result<Version, String> {
    Version::parse(s).map_err(|e| e.to_string())
}

/// Loaded config plus the paths derived from it.
pub struct Context {
    pub cfg: RobokitConfig,
    pub layout: ProjectLayout,
}

impl Context {
    fn load(config_path: Option<&Path>, project: Option<&Path>) -> Result<Self> {
        let root = match project {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("current directory")?,
        };
        let cfg = config::discover(config_path, &root)?;
        tracing::debug!("loaded config: {:?}", cfg);
        let layout = ProjectLayout::new(&cfg, &root);
        Ok(Context { cfg, layout })
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need no project config.
        match &cli.command {
            CliCommand::Completions { shell } => return run_completions(*shell),
            CliCommand::Checksum { path } => return run_checksum(path),
            _ => {}
        }

        let ctx = Context::load(cli.config.as_deref(), cli.project.as_deref())?;
        match cli.command {
            CliCommand::Resolve => run_resolve(&ctx)?,
            CliCommand::Download { version, dest } => {
                run_download(&ctx, version.as_ref(), dest.as_deref())?
            }
            CliCommand::Unpack { archive, dest } => run_unpack(&ctx, &archive, dest.as_deref())?,
            CliCommand::Reconcile { file, path } => {
                run_reconcile(&ctx, file.as_deref(), path.as_deref())?
            }
            CliCommand::Provision { version, force } => run_provision(&ctx, version, force)?,
            CliCommand::Package { robots } => run_package(&ctx, &robots)?,
            CliCommand::Deploy => run_deploy(&ctx)?,
            CliCommand::Checksum { .. } | CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
