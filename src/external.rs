use crate::command::{self, ExitCode, Spawner};
use crate::env::Environment;
use crate::resolve::ResolvedCommand;
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execve, fork};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures the parent observes while starting or reaping a child.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),
    #[error("waiting for child {pid} failed: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },
    #[error("{0}: argument contains a NUL byte")]
    InvalidArgument(String),
}

impl LaunchError {
    /// Status reported to the loop in place of a child's exit code.
    pub fn status(&self) -> ExitCode {
        match self {
            LaunchError::Fork(_) => command::SPAWN_FAILURE,
            LaunchError::Wait { .. } => command::ABNORMAL_TERMINATION,
            LaunchError::InvalidArgument(_) => command::EXEC_FAILURE,
        }
    }
}

/// Run a resolved command and return the status the loop should record.
///
/// `args` is the token list as typed; its first element is replaced by the
/// resolved path before it reaches the child. An unresolved command yields
/// [`command::NOT_FOUND`] without touching `spawner`.
pub fn launch(
    spawner: &mut dyn Spawner,
    resolved: &ResolvedCommand,
    args: &[String],
    env: &Environment,
) -> ExitCode {
    let Some(program) = resolved.path() else {
        return command::NOT_FOUND;
    };

    let argv: Vec<String> = std::iter::once(program.to_string_lossy().into_owned())
        .chain(args.iter().skip(1).cloned())
        .collect();

    match spawner.spawn_and_wait(program, &argv, env) {
        Ok(code) => code,
        Err(err) => {
            warn!(program = %program.display(), "{err}");
            err.status()
        }
    }
}

/// Launches children with `fork` + `execve` and waits for them with `waitpid`.
pub struct ForkExec {
    program_name: String,
}

impl ForkExec {
    /// `program_name` prefixes the diagnostics a child writes when exec fails.
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
        }
    }
}

impl Spawner for ForkExec {
    fn spawn_and_wait(
        &mut self,
        program: &Path,
        argv: &[String],
        env: &Environment,
    ) -> Result<ExitCode, LaunchError> {
        // Everything the child needs is allocated before the fork.
        let (path, argv, envp) = match to_c_strings(program, argv, env) {
            Ok(prepared) => prepared,
            Err(err) => {
                eprintln!("{}: {err}", self.program_name);
                return Err(err);
            }
        };

        let prefix = format!("{}: {}: ", self.program_name, program.display());

        // SAFETY: the child only calls execve, write and _exit; nothing in it
        // allocates or takes a lock.
        match unsafe { fork() } {
            Err(errno) => Err(LaunchError::Fork(errno)),
            Ok(ForkResult::Child) => {
                let err = match execve(&path, &argv, &envp) {
                    Ok(never) => match never {},
                    Err(err) => err,
                };
                let stderr = std::io::stderr();
                let _ = nix::unistd::write(&stderr, prefix.as_bytes());
                let _ = nix::unistd::write(&stderr, err.desc().as_bytes());
                let _ = nix::unistd::write(&stderr, b"\n");
                // SAFETY: terminate the forked child without running the parent's
                // exit handlers or flushing its buffered output twice.
                unsafe { nix::libc::_exit(command::EXEC_FAILURE) }
            }
            Ok(ForkResult::Parent { child }) => {
                debug!(pid = %child, program = %program.display(), "spawned child");
                wait_for(child)
            }
        }
    }
}

fn wait_for(pid: Pid) -> Result<ExitCode, LaunchError> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!(%pid, code, "child exited");
                return Ok(code);
            }
            Ok(WaitStatus::Signaled(_, signal, core_dumped)) => {
                debug!(%pid, ?signal, core_dumped, "child terminated by signal");
                return Ok(command::ABNORMAL_TERMINATION);
            }
            Ok(other) => debug!(%pid, ?other, "child still running"),
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(LaunchError::Wait { pid, source }),
        }
    }
}

fn to_c_strings(
    program: &Path,
    argv: &[String],
    env: &Environment,
) -> Result<(CString, Vec<CString>, Vec<CString>), LaunchError> {
    let invalid = || LaunchError::InvalidArgument(program.display().to_string());
    let path = CString::new(program.as_os_str().as_bytes()).map_err(|_| invalid())?;
    let argv = argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    let envp = env
        .entries()
        .map(CString::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    Ok((path, argv, envp))
}
