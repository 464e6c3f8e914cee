//! `stmbuild init` — project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use stmbuild_project::manifest::MANIFEST_NAME;
use stmbuild_project::ProjectManifest;

/// Create a new firmware project at the given path.
///
/// `name` is the project name; the directory `name` is created relative
/// to the current directory.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("Src")).context("creating Src/ directory")?;
    fs::create_dir_all(project_dir.join("Inc")).context("creating Inc/ directory")?;

    let manifest = ProjectManifest::starter(name);
    let manifest_text = manifest
        .to_toml()
        .context("serializing starter manifest")?;
    fs::write(project_dir.join(MANIFEST_NAME), &manifest_text)
        .with_context(|| format!("writing {MANIFEST_NAME}"))?;

    fs::write(project_dir.join(".gitignore"), "build/\n").context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_NAME}");
    println!("  {name}/Src/");
    println!("  {name}/Inc/");
    println!("  {name}/.gitignore");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_manifest_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("fw");
        create_project(&project_dir, "fw").unwrap();

        assert!(project_dir.join(MANIFEST_NAME).exists());
        assert!(project_dir.join("Src").is_dir());
        assert!(project_dir.join("Inc").is_dir());

        let manifest = ProjectManifest::load(&project_dir.join(MANIFEST_NAME)).unwrap();
        assert_eq!(manifest.project.name, "fw");
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("fw");
        fs::create_dir(&project_dir).unwrap();
        assert!(create_project(&project_dir, "fw").is_err());
    }
}
