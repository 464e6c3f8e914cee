//! Task invocation and completion records.

use std::fmt;
use std::path::PathBuf;

/// The kind of build operation a task performs.
///
/// Purely descriptive: it labels the invocation for diagnostics and does
/// not change how the command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// `make` with the default target.
    Build,
    /// `make flash`.
    Flash,
    /// `make erase`.
    Erase,
    /// `make clean`.
    Clean,
    /// Any other shell command.
    Custom,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskKind::Build => "build",
            TaskKind::Flash => "flash",
            TaskKind::Erase => "erase",
            TaskKind::Clean => "clean",
            TaskKind::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// A named shell command to run through a [`TaskHost`](crate::TaskHost).
///
/// `name` is the correlation key: the completion event carrying this name
/// settles this invocation and no other. Names must be unique among
/// concurrently in-flight invocations; the host enforces this.
#[derive(Debug, Clone)]
pub struct TaskInvocation {
    /// What the task does, for diagnostics.
    pub kind: TaskKind,
    /// Correlation key matched against completion events.
    pub name: String,
    /// Shell command line to execute.
    pub command: String,
    /// Directory to run in; the host's project root when absent.
    pub working_dir: Option<PathBuf>,
}

impl TaskInvocation {
    /// Create an invocation that runs in the host's project root.
    pub fn new(kind: TaskKind, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            command: command.into(),
            working_dir: None,
        }
    }

    /// Run in an explicit directory instead of the project root.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// A completion event published on the host's broadcast stream.
///
/// The stream carries completions for every task the host runs; waiters
/// filter by `name`.
#[derive(Debug, Clone)]
pub struct TaskCompletion {
    /// Name of the task that finished.
    pub name: String,
    /// Process exit code; `-1` when the child died without one.
    pub exit_code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels() {
        assert_eq!(TaskKind::Build.to_string(), "build");
        assert_eq!(TaskKind::Flash.to_string(), "flash");
    }

    #[test]
    fn in_dir_overrides_working_directory() {
        let inv = TaskInvocation::new(TaskKind::Build, "build", "make").in_dir("/tmp/fw");
        assert_eq!(inv.working_dir.as_deref(), Some(std::path::Path::new("/tmp/fw")));
    }
}
