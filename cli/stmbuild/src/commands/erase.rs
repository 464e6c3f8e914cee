//! `stmbuild erase` — mass-erase the target microcontroller.

use std::path::Path;

use anyhow::{Context, Result};

use stmbuild_project::{HostPlatform, ProjectManifest};
use stmbuild_tasks::{TaskHost, TaskKind};

use crate::commands::generate::{report_issues, write_makefile};
use crate::commands::{block_on_task, make_invocation};

/// Run the Makefile's erase target, regenerating the Makefile first.
pub fn run(project_dir: &Path, manifest: &ProjectManifest) -> Result<()> {
    let project = manifest.to_project(HostPlatform::current())?;
    report_issues(&project);
    write_makefile(project_dir, &project)?;

    let host = TaskHost::new(Some(project_dir.to_path_buf()));
    block_on_task(host.execute(make_invocation(TaskKind::Erase, Some("erase"), 1)))
        .context("erase failed")?;
    println!("Erased {}", project.target_mcu);
    Ok(())
}
