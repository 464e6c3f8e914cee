//! stmbuild CLI — generate and run STM32 Makefile builds.

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::bail;
use clap::{Parser, Subcommand};

use stmbuild_project::ProjectManifest;

#[derive(Parser)]
#[command(name = "stmbuild", version, about = "STM32 firmware build tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new firmware project with a starter stmbuild.toml
    Init {
        /// Project name
        name: String,
    },
    /// Render the Makefile from stmbuild.toml
    Generate,
    /// Build the firmware (generates the Makefile first)
    Build {
        /// Flash the firmware after a successful build
        #[arg(long)]
        flash: bool,
        /// Run the clean target before building
        #[arg(long)]
        clean_first: bool,
        /// Number of parallel make jobs
        #[arg(long, default_value_t = 16)]
        jobs: u32,
    },
    /// Build and flash the firmware
    Flash {
        /// Number of parallel make jobs
        #[arg(long, default_value_t = 16)]
        jobs: u32,
    },
    /// Mass-erase the target microcontroller
    Erase,
    /// Remove build artifacts
    Clean,
    /// Check toolchain and project status
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Generate => {
            let (manifest, project_dir) = load_manifest(&cwd)?;
            commands::generate::run(&project_dir, &manifest)
        }
        Commands::Build {
            flash,
            clean_first,
            jobs,
        } => {
            let (manifest, project_dir) = load_manifest(&cwd)?;
            commands::build::run(&project_dir, &manifest, flash, clean_first, jobs)
        }
        Commands::Flash { jobs } => {
            let (manifest, project_dir) = load_manifest(&cwd)?;
            commands::build::run(&project_dir, &manifest, true, false, jobs)
        }
        Commands::Erase => {
            let (manifest, project_dir) = load_manifest(&cwd)?;
            commands::erase::run(&project_dir, &manifest)
        }
        Commands::Clean => {
            let (manifest, project_dir) = load_manifest(&cwd)?;
            commands::clean::run(&project_dir, &manifest)
        }
        Commands::Doctor => commands::doctor::run(&cwd),
    }
}

fn load_manifest(cwd: &std::path::Path) -> anyhow::Result<(ProjectManifest, PathBuf)> {
    match ProjectManifest::find_and_load(cwd)? {
        Some(found) => Ok(found),
        None => bail!(
            "no stmbuild.toml found in {} or any parent directory; run 'stmbuild init' to create a project",
            cwd.display()
        ),
    }
}
