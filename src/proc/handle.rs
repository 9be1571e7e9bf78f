// src/proc/handle.rs

//! One supervised OS process: its child handle, its two stream drainers,
//! its keep-buffers, its exit notifier, and its poll task.
//!
//! The handle exclusively owns the OS resources; the poll task only holds a
//! `Weak` reference back to the shared state, so there is no ownership
//! cycle and cancelling the task from the handle is always possible.
//!
//! Lifecycle is strictly forward: `Created -> Running -> Exited`, with the
//! Running→Exited transition performed exactly once under the lifecycle
//! lock, on whichever path first observes termination (poll tick, explicit
//! `check()`, `stop()`, or `block()`).

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::errors::{ProcwatchError, Result};
use crate::exec::drainer::StreamDrainer;
use crate::exec::poller::{self, PollTask};
use crate::notify::{ExitEvent, ExitNotifier};
use crate::output;
use crate::proc::options::SuperviseOptions;
use crate::proc::spec::ProcessSpec;
use crate::types::{ProcessState, StreamSource};

/// Typed result of the non-blocking "has this process terminated" query.
/// The OS query is the sole source of truth for liveness; there is no
/// separate exit signal.
enum Liveness {
    NotStarted,
    Running,
    /// Termination observed by this query; the transition has not happened
    /// yet when this is returned.
    JustExited(i32),
    AlreadyExited(i32),
}

/// What the poll loop should do after a tick.
pub(crate) enum TickOutcome {
    Continue,
    Finished,
}

enum Lifecycle {
    Created,
    Running {
        child: Child,
        stdout: StreamDrainer,
        stderr: StreamDrainer,
    },
    Exited {
        code: i32,
    },
}

/// State shared between the handle and its poll task.
pub(crate) struct HandleShared {
    id: String,
    opts: SuperviseOptions,
    lifecycle: Mutex<Lifecycle>,
    poller: StdMutex<Option<PollTask>>,
    notifier: ExitNotifier,
    stdout_kept: StdMutex<Vec<String>>,
    stderr_kept: StdMutex<Vec<String>>,
}

impl HandleShared {
    fn query_locked(lifecycle: &mut Lifecycle) -> std::io::Result<Liveness> {
        match lifecycle {
            Lifecycle::Created => Ok(Liveness::NotStarted),
            Lifecycle::Exited { code } => Ok(Liveness::AlreadyExited(*code)),
            Lifecycle::Running { child, .. } => match child.try_wait()? {
                None => Ok(Liveness::Running),
                Some(status) => Ok(Liveness::JustExited(status.code().unwrap_or(-1))),
            },
        }
    }

    /// Apply the print/keep policy to a batch of drained lines.
    fn emit(&self, source: StreamSource, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let (print, keep, kept) = match source {
            StreamSource::Stdout => (
                self.opts.print_stdout,
                self.opts.keep_stdout,
                &self.stdout_kept,
            ),
            StreamSource::Stderr => (
                self.opts.print_stderr,
                self.opts.keep_stderr,
                &self.stderr_kept,
            ),
        };
        if print {
            output::print_lines(&self.id, lines, self.opts.wrap_columns);
        }
        if keep {
            kept.lock().unwrap().extend_from_slice(lines);
        }
    }

    /// Final drain, stream close, and state swap on the exit path.
    /// Caller holds the lifecycle lock and has observed termination.
    async fn seal_locked(&self, lifecycle: &mut Lifecycle, code: i32) {
        if let Lifecycle::Running { stdout, stderr, .. } = lifecycle {
            // Same fixed order as the poll tick: stderr first.
            let err_final = stderr.flush().await;
            let out_final = stdout.flush().await;
            self.emit(StreamSource::Stderr, &err_final.lines);
            self.emit(StreamSource::Stdout, &out_final.lines);
            stderr.close();
            stdout.close();
        }
        *lifecycle = Lifecycle::Exited { code };
    }

    /// Post-transition bookkeeping: cancel the poll task, broadcast the
    /// exit event (exactly once), and announce unless silent.
    fn finish(&self, code: i32, silent: bool) {
        self.cancel_poller();
        let fired = self.notifier.notify(&ExitEvent {
            id: self.id.clone(),
            exit_code: code,
        });
        if fired {
            info!(id = %self.id, exit_code = code, "process exited");
        }
        if !silent {
            output::print_status(&self.id, ProcessState::Exited, Some(code));
        }
    }

    fn cancel_poller(&self) {
        if let Some(task) = self.poller.lock().unwrap().take() {
            if !task.is_finished() {
                debug!(id = %self.id, "cancelling poll task");
            }
            task.cancel();
        }
    }

    /// One drain-and-check pass, invoked by the poll task.
    ///
    /// In order: drain stderr, drain stdout, apply print/keep policy, then
    /// re-check liveness. On observed termination the tick performs one
    /// last drain pass (inside `seal_locked`) before the task self-cancels,
    /// so output emitted between the previous drain and process death is
    /// not lost. Stream failures stop this handle's poll task only;
    /// sibling handles are unaffected.
    pub(crate) async fn poll_tick(&self) -> TickOutcome {
        let mut lifecycle = self.lifecycle.lock().await;

        let (err_drained, out_drained) = match &mut *lifecycle {
            Lifecycle::Running { stdout, stderr, .. } => (stderr.drain(), stdout.drain()),
            _ => return TickOutcome::Finished,
        };
        self.emit(StreamSource::Stderr, &err_drained.lines);
        self.emit(StreamSource::Stdout, &out_drained.lines);

        if let Some(failure) = err_drained.failure.or(out_drained.failure) {
            error!(
                id = %self.id,
                error = %failure,
                "unexpected stream failure; stopping this handle's poll task"
            );
            return TickOutcome::Finished;
        }

        match Self::query_locked(&mut lifecycle) {
            Ok(Liveness::Running) => TickOutcome::Continue,
            Ok(Liveness::JustExited(code)) => {
                self.seal_locked(&mut lifecycle, code).await;
                drop(lifecycle);
                self.finish(code, false);
                TickOutcome::Finished
            }
            Ok(Liveness::NotStarted | Liveness::AlreadyExited(_)) => TickOutcome::Finished,
            Err(err) => {
                error!(
                    id = %self.id,
                    error = %err,
                    "liveness query failed; stopping this handle's poll task"
                );
                TickOutcome::Finished
            }
        }
    }

    async fn check(&self, silent: bool) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        let liveness = Self::query_locked(&mut lifecycle).map_err(|err| {
            error!(id = %self.id, error = %err, "liveness query failed");
            ProcwatchError::IoError(err)
        })?;

        match liveness {
            Liveness::NotStarted => {
                if !silent {
                    output::print_status(&self.id, ProcessState::Created, None);
                }
            }
            Liveness::Running => {
                if !silent {
                    output::print_status(&self.id, ProcessState::Running, None);
                }
            }
            Liveness::AlreadyExited(code) => {
                // Terminal state; repeat checks are no-ops.
                if !silent {
                    output::print_status(&self.id, ProcessState::Exited, Some(code));
                }
            }
            Liveness::JustExited(code) => {
                self.seal_locked(&mut lifecycle, code).await;
                drop(lifecycle);
                self.finish(code, silent);
            }
        }
        Ok(())
    }
}

/// The in-process object representing one supervised OS process.
///
/// Resources are released explicitly via [`stop`]; dropping a handle
/// without stopping it relies only on best-effort backstops
/// (`kill_on_drop`, reader-task teardown) and is not the supported path.
///
/// [`stop`]: ProcessHandle::stop
pub struct ProcessHandle {
    spec: ProcessSpec,
    shared: Arc<HandleShared>,
}

impl ProcessHandle {
    /// Construct a handle without starting it, regardless of
    /// `opts.auto_start`. Use [`ProcessHandle::create`] to honour it.
    pub fn new(spec: ProcessSpec, opts: SuperviseOptions) -> Result<Self> {
        opts.validate()?;
        let shared = Arc::new(HandleShared {
            id: opts.id.clone(),
            opts,
            lifecycle: Mutex::new(Lifecycle::Created),
            poller: StdMutex::new(None),
            notifier: ExitNotifier::new(),
            stdout_kept: StdMutex::new(Vec::new()),
            stderr_kept: StdMutex::new(Vec::new()),
        });
        Ok(Self { spec, shared })
    }

    /// Construct a handle and, when `opts.auto_start` is set (the default),
    /// start it immediately.
    pub async fn create(spec: ProcessSpec, opts: SuperviseOptions) -> Result<Self> {
        let auto_start = opts.auto_start;
        let handle = Self::new(spec, opts)?;
        if auto_start {
            handle.start().await?;
        }
        Ok(handle)
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn options(&self) -> &SuperviseOptions {
        &self.shared.opts
    }

    /// Spawn the OS process and schedule the poll task.
    ///
    /// Fails with `SpawnError` when the OS refuses to create the process;
    /// the handle then remains `Created`. A second `start()` on a running
    /// or exited handle is rejected with `LifecycleError`.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.shared.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running { .. } => {
                return Err(ProcwatchError::LifecycleError(format!(
                    "process '{}' is already running",
                    self.shared.id
                )));
            }
            Lifecycle::Exited { .. } => {
                return Err(ProcwatchError::LifecycleError(format!(
                    "process '{}' has already exited; handles are not restartable",
                    self.shared.id
                )));
            }
        }

        let mut command = self.spec.to_command();
        let mut child = command.spawn().map_err(|source| ProcwatchError::SpawnError {
            id: self.shared.id.clone(),
            source,
        })?;

        let stdout_pipe = child.stdout.take().ok_or_else(|| {
            ProcwatchError::IoError(std::io::Error::other("child stdout pipe was not captured"))
        })?;
        let stderr_pipe = child.stderr.take().ok_or_else(|| {
            ProcwatchError::IoError(std::io::Error::other("child stderr pipe was not captured"))
        })?;

        info!(
            id = %self.shared.id,
            pid = ?child.id(),
            cmd = %self.spec.command().display(),
            "process started"
        );

        *lifecycle = Lifecycle::Running {
            child,
            stdout: StreamDrainer::new(StreamSource::Stdout, stdout_pipe),
            stderr: StreamDrainer::new(StreamSource::Stderr, stderr_pipe),
        };
        drop(lifecycle);

        let task = poller::spawn_poller(
            Arc::downgrade(&self.shared),
            self.shared.opts.poll_interval,
        );
        *self.shared.poller.lock().unwrap() = Some(task);

        Ok(())
    }

    pub async fn state(&self) -> ProcessState {
        match &*self.shared.lifecycle.lock().await {
            Lifecycle::Created => ProcessState::Created,
            Lifecycle::Running { .. } => ProcessState::Running,
            Lifecycle::Exited { .. } => ProcessState::Exited,
        }
    }

    /// Re-derive liveness from the OS with a non-blocking query.
    ///
    /// Returns `true` exactly when the OS reports the process has not yet
    /// produced an exit status. Does not perform the Exited transition;
    /// that belongs to `check`.
    pub async fn is_running(&self) -> Result<bool> {
        let mut lifecycle = self.shared.lifecycle.lock().await;
        let liveness = HandleShared::query_locked(&mut lifecycle)?;
        Ok(matches!(liveness, Liveness::Running))
    }

    /// Exit code, defined only after the Exited transition. Processes
    /// killed by a signal report `-1`.
    pub async fn exit_code(&self) -> Option<i32> {
        match &*self.shared.lifecycle.lock().await {
            Lifecycle::Exited { code } => Some(*code),
            _ => None,
        }
    }

    /// If running and the OS reports termination, transition to Exited,
    /// cancel the poll task, and fire the exit notification (exactly once
    /// per handle lifetime, however many checks observe the terminal
    /// state). Unless `silent`, prints one status line for the resulting
    /// state.
    pub async fn check(&self, silent: bool) -> Result<()> {
        self.shared.check(silent).await
    }

    /// Idempotent teardown: cancel the poll task, close both stream
    /// readers exactly once, force-kill the process if still running, then
    /// run a final `check`. `silent` suppresses the status line only,
    /// never the transition or the notification.
    pub async fn stop(&self, silent: bool) -> Result<()> {
        self.shared.cancel_poller();

        let mut lifecycle = self.shared.lifecycle.lock().await;
        if let Lifecycle::Running { child, stdout, stderr } = &mut *lifecycle {
            stderr.close();
            stdout.close();
            if let Err(err) = child.kill().await {
                // Already gone; the final check below picks up the status.
                debug!(id = %self.shared.id, error = %err, "kill raced process exit");
            }
        }
        drop(lifecycle);

        self.shared.check(silent).await
    }

    /// Busy-wait (cooperative sleeps, never stream I/O) until the process
    /// is no longer running, then run a final silent `check` so the exit
    /// notification fires even when no poll task is active. The only
    /// operation that may occupy the caller for an unbounded duration.
    pub async fn block(&self, poll_interval_override: Option<Duration>) -> Result<()> {
        let interval = poll_interval_override.unwrap_or(self.shared.opts.poll_interval);
        while self.is_running().await? {
            tokio::time::sleep(interval).await;
        }
        self.shared.check(true).await
    }

    /// Register an exit listener; delivered exactly once, synchronously,
    /// on the context that first observes termination.
    pub fn on_exit(&self, listener: impl Fn(&ExitEvent) + Send + Sync + 'static) {
        self.shared.notifier.subscribe(listener);
    }

    /// Whether the exit notification has been broadcast.
    pub fn exit_notified(&self) -> bool {
        self.shared.notifier.has_fired()
    }

    /// Lines retained under the keep policy, in arrival order.
    pub fn kept_stdout(&self) -> Vec<String> {
        self.shared.stdout_kept.lock().unwrap().clone()
    }

    pub fn kept_stderr(&self) -> Vec<String> {
        self.shared.stderr_kept.lock().unwrap().clone()
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("id", &self.shared.id)
            .field("command", &self.spec.command().display())
            .finish_non_exhaustive()
    }
}
