//! The task host: spawns shell tasks and correlates their completions.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::process::Command;
use tokio::sync::broadcast;

use crate::error::{Result, TaskError};
use crate::invocation::{TaskCompletion, TaskInvocation};

/// Capacity of the completion broadcast channel. Completions are tiny and
/// consumed promptly; this only needs to absorb bursts of short tasks.
const COMPLETION_CHANNEL_CAPACITY: usize = 64;

/// Runs named shell commands and broadcasts their completions.
///
/// The completion stream is process-wide: every task the host runs
/// publishes its `(name, exit_code)` there, and every waiter sees every
/// event. [`execute`](TaskHost::execute) filters that stream by its own
/// invocation name, so concurrent invocations settle independently.
///
/// There is no cancellation or timeout: once spawned, a task runs until
/// its process exits.
#[derive(Debug, Clone)]
pub struct TaskHost {
    project_root: Option<PathBuf>,
    completions: broadcast::Sender<TaskCompletion>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    // Completions also recorded here, keyed by name, before broadcasting.
    // A waiter whose receiver lagged past its own event recovers from this
    // record instead of waiting forever.
    settled: Arc<Mutex<HashMap<String, i32>>>,
}

impl TaskHost {
    /// Create a host. `project_root` is the default working directory for
    /// invocations that do not name one; a host without a project root can
    /// only run invocations carrying an explicit working directory.
    pub fn new(project_root: Option<PathBuf>) -> Self {
        Self::with_capacity(project_root, COMPLETION_CHANNEL_CAPACITY)
    }

    fn with_capacity(project_root: Option<PathBuf>, capacity: usize) -> Self {
        let (completions, _) = broadcast::channel(capacity);
        Self {
            project_root,
            completions,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            settled: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The configured project root, if any.
    pub fn project_root(&self) -> Option<&PathBuf> {
        self.project_root.as_ref()
    }

    /// Subscribe to the raw completion stream. Mostly useful for observers
    /// such as progress reporting; `execute` does its own filtering.
    pub fn completions(&self) -> broadcast::Receiver<TaskCompletion> {
        self.completions.subscribe()
    }

    /// Run a shell task to completion.
    ///
    /// Fails before spawning anything when no working directory can be
    /// resolved ([`TaskError::NoProjectRoot`]) or when an invocation with
    /// the same name is still in flight ([`TaskError::DuplicateName`]).
    /// Otherwise the command runs through the platform shell in the
    /// resolved directory; exit code 0 resolves to `Ok(())`, anything else
    /// to [`TaskError::NonZeroExit`] carrying the code. A missing tool
    /// surfaces as the shell's command-not-found exit code, not as a
    /// distinct error.
    pub async fn execute(&self, invocation: TaskInvocation) -> Result<()> {
        let cwd = match invocation.working_dir.clone().or_else(|| self.project_root.clone()) {
            Some(dir) => dir,
            None => return Err(TaskError::NoProjectRoot),
        };

        let _reservation = self.reserve_name(&invocation.name)?;
        // An abandoned earlier invocation may have left a settled record
        // under this name; it must not settle this one.
        self.take_settled(&invocation.name);

        // Subscribe before spawning so the completion cannot be missed.
        let mut stream = self.completions.subscribe();

        let mut command = shell_command(&invocation.command);
        command.current_dir(&cwd);
        let mut child = command.spawn().map_err(|source| TaskError::Spawn {
            name: invocation.name.clone(),
            source,
        })?;

        let publisher = self.completions.clone();
        let settled = Arc::clone(&self.settled);
        let task_name = invocation.name.clone();
        tokio::spawn(async move {
            // A child killed by a signal carries no exit code; report -1 so
            // the waiter still settles.
            let exit_code = match child.wait().await {
                Ok(status) => status.code().unwrap_or(-1),
                Err(_) => -1,
            };
            // Record before broadcasting so a lagged waiter can still find
            // its completion.
            lock(&settled).insert(task_name.clone(), exit_code);
            // Send only fails when every receiver is gone, in which case
            // nobody is waiting on this completion.
            let _ = publisher.send(TaskCompletion {
                name: task_name,
                exit_code,
            });
        });

        loop {
            // Checked on every wake-up: if the receiver lagged past this
            // invocation's own event, the settled record still carries it.
            if let Some(exit_code) = self.take_settled(&invocation.name) {
                return finish(invocation.name, exit_code);
            }
            match stream.recv().await {
                Ok(completion) if completion.name == invocation.name => {
                    self.take_settled(&invocation.name);
                    return finish(invocation.name, completion.exit_code);
                }
                // Some other invocation's completion; keep waiting.
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TaskError::ChannelClosed {
                        name: invocation.name,
                    })
                }
            }
        }
    }

    fn take_settled(&self, name: &str) -> Option<i32> {
        lock(&self.settled).remove(name)
    }

    fn reserve_name(&self, name: &str) -> Result<NameReservation> {
        let mut names = lock(&self.in_flight);
        if !names.insert(name.to_string()) {
            return Err(TaskError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(NameReservation {
            names: Arc::clone(&self.in_flight),
            name: name.to_string(),
        })
    }
}

/// Holds an in-flight task name; releasing it on drop makes the name
/// reusable once the invocation settles, on every exit path.
struct NameReservation {
    names: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for NameReservation {
    fn drop(&mut self) {
        lock(&self.names).remove(&self.name);
    }
}

fn finish(name: String, exit_code: i32) -> Result<()> {
    if exit_code == 0 {
        Ok(())
    } else {
        Err(TaskError::NonZeroExit {
            name,
            code: exit_code,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        // The data stays consistent even if a holder panicked mid-update.
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}
