//! Async shell-task execution and completion correlation for stmbuild.
//!
//! A [`TaskHost`](host::TaskHost) runs named shell commands (the `make`
//! invocations for build, flash, erase, and clean) and publishes every
//! completion on a process-wide broadcast stream. Each
//! [`execute`](host::TaskHost::execute) call waits only for the completion
//! carrying its own task name, so any number of invocations may be in
//! flight concurrently without affecting each other's outcome.

pub mod error;
pub mod host;
pub mod invocation;

pub use error::{Result, TaskError};
pub use host::TaskHost;
pub use invocation::{TaskCompletion, TaskInvocation, TaskKind};
