//! `stmbuild build` — generate the Makefile and run `make`.

use std::path::Path;

use anyhow::{Context, Result};

use stmbuild_project::{HostPlatform, ProjectManifest};
use stmbuild_tasks::{TaskHost, TaskKind};

use crate::commands::generate::{report_issues, write_makefile};
use crate::commands::{block_on_task, make_invocation};

/// Run the build pipeline: render the Makefile, then drive `make`.
///
/// `flash` runs the flash target after a successful build; `clean_first`
/// runs the clean target before compiling anything.
pub fn run(
    project_dir: &Path,
    manifest: &ProjectManifest,
    flash: bool,
    clean_first: bool,
    jobs: u32,
) -> Result<()> {
    let project = manifest.to_project(HostPlatform::current())?;
    report_issues(&project);

    let (makefile, changed) = write_makefile(project_dir, &project)?;
    if changed {
        println!("Generated {}", makefile.display());
    }

    let host = TaskHost::new(Some(project_dir.to_path_buf()));

    if clean_first {
        block_on_task(host.execute(make_invocation(TaskKind::Clean, Some("clean"), jobs)))
            .context("clean failed")?;
    }

    block_on_task(host.execute(make_invocation(TaskKind::Build, None, jobs)))
        .context("build failed")?;
    println!("Build succeeded: build/{}.elf", project.target);

    if flash {
        block_on_task(host.execute(make_invocation(TaskKind::Flash, Some("flash"), jobs)))
            .context("flash failed")?;
        println!("Flashed {}", project.target);
    }

    Ok(())
}
