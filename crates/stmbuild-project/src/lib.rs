//! Project description model and manifest parsing for stmbuild.
//!
//! A [`ProjectDescription`](description::ProjectDescription) captures
//! everything the Makefile renderer needs: partitioned source file sets,
//! preprocessor defines, include and library paths, MCU characteristics,
//! toolchain locations, and custom make rules. It is normally assembled
//! from an `stmbuild.toml` manifest at the project root.

pub mod description;
pub mod error;
pub mod manifest;
pub mod validate;

pub use description::{
    posix_path, CustomRule, HostPlatform, Language, ProjectDescription, ToolPaths,
};
pub use error::{ProjectError, Result};
pub use manifest::ProjectManifest;
