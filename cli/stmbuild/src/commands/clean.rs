//! `stmbuild clean` — remove build artifacts.

use std::path::Path;

use anyhow::{Context, Result};

use stmbuild_project::{HostPlatform, ProjectManifest};
use stmbuild_tasks::{TaskHost, TaskKind};

use crate::commands::generate::write_makefile;
use crate::commands::{block_on_task, make_invocation};

/// Run the Makefile's clean target.
///
/// The Makefile is regenerated first so clean works even on a fresh
/// checkout that never built.
pub fn run(project_dir: &Path, manifest: &ProjectManifest) -> Result<()> {
    let project = manifest.to_project(HostPlatform::current())?;
    write_makefile(project_dir, &project)?;

    let host = TaskHost::new(Some(project_dir.to_path_buf()));
    block_on_task(host.execute(make_invocation(TaskKind::Clean, Some("clean"), 1)))
        .context("clean failed")?;
    println!("Cleaned build/");
    Ok(())
}
