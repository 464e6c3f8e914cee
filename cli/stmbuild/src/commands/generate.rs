//! `stmbuild generate` — render the Makefile from the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use stmbuild_make::{render, MAKEFILE_NAME};
use stmbuild_project::validate::validate;
use stmbuild_project::{HostPlatform, ProjectDescription, ProjectManifest};

/// Render the Makefile and write it to the project root.
pub fn run(project_dir: &Path, manifest: &ProjectManifest) -> Result<()> {
    let project = manifest.to_project(HostPlatform::current())?;
    report_issues(&project);

    let (path, changed) = write_makefile(project_dir, &project)?;
    if changed {
        println!("Generated {}", path.display());
    } else {
        println!("{} is up to date", path.display());
    }
    Ok(())
}

/// Render and write the Makefile, skipping the write when the on-disk
/// content already matches. Rebuilds key off the Makefile's mtime, so an
/// unchanged render must not touch the file.
///
/// Returns the Makefile path and whether it was (re)written.
pub(crate) fn write_makefile(
    project_dir: &Path,
    project: &ProjectDescription,
) -> Result<(PathBuf, bool)> {
    let path = project_dir.join(MAKEFILE_NAME);
    let text = render(project);

    if let Ok(existing) = fs::read_to_string(&path) {
        if existing == text {
            return Ok((path, false));
        }
    }
    fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?;
    Ok((path, true))
}

/// Print validation findings without blocking generation; the rendered
/// Makefile is syntactically valid either way and `make` reports the rest.
pub(crate) fn report_issues(project: &ProjectDescription) {
    if let Err(issues) = validate(project) {
        for issue in issues {
            eprintln!("{}: {}", issue.severity, issue.message);
        }
    }
}
