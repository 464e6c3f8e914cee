//! CLI command implementations.

pub mod build;
pub mod clean;
pub mod doctor;
pub mod erase;
pub mod generate;
pub mod init;

use anyhow::Result;
use stmbuild_make::MAKEFILE_NAME;
use stmbuild_tasks::{TaskInvocation, TaskKind};

/// Build the `make` invocation for a target of the generated Makefile.
///
/// `target` of `None` runs the default `all` target. The invocation name
/// doubles as the completion-correlation key, so it matches the target.
pub(crate) fn make_invocation(kind: TaskKind, target: Option<&str>, jobs: u32) -> TaskInvocation {
    let name = target.unwrap_or("build").to_string();
    let command = match target {
        Some(target) => format!("make -j{jobs} -f {MAKEFILE_NAME} {target}"),
        None => format!("make -j{jobs} -f {MAKEFILE_NAME}"),
    };
    TaskInvocation::new(kind, name, command)
}

/// Run an async task to completion on a single-threaded runtime.
///
/// The CLI is synchronous end to end; only task execution needs the
/// scheduler, so each command builds a runtime just around it.
pub(crate) fn block_on_task<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = stmbuild_tasks::Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)?;
    Ok(())
}
