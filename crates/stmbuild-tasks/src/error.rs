//! Error types for task execution.

/// Errors that can occur while executing a shell task.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No working directory was supplied and the host has no project root.
    /// Raised before any process is spawned.
    #[error("no project root is configured and the invocation names no working directory")]
    NoProjectRoot,

    /// Another invocation with the same name is still in flight; running
    /// both would make completion matching ambiguous.
    #[error("a task named `{name}` is already in flight")]
    DuplicateName {
        /// The contested task name.
        name: String,
    },

    /// The shell process itself could not be started.
    #[error("failed to spawn shell for task `{name}`: {source}")]
    Spawn {
        /// The task that failed to start.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The task's process ended with a non-zero exit code. A child killed
    /// by a signal reports code `-1`.
    #[error("task `{name}` exited with code {code}")]
    NonZeroExit {
        /// The task name.
        name: String,
        /// The exit code carried by the completion event.
        code: i32,
    },

    /// The completion stream closed before this task's event arrived.
    #[error("completion stream closed before task `{name}` finished")]
    ChannelClosed {
        /// The task that was still pending.
        name: String,
    },
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;
