use crate::env::Environment;
use crate::external::LaunchError;
use std::path::Path;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

pub const SUCCESS: ExitCode = 0;
/// The command could not be resolved; no process was created.
pub const NOT_FOUND: ExitCode = 127;
/// The OS refused to create a child process.
pub const SPAWN_FAILURE: ExitCode = 1;
/// The child could not replace itself with the target program.
pub const EXEC_FAILURE: ExitCode = 2;
/// The child was killed by a signal or otherwise did not exit normally.
pub const ABNORMAL_TERMINATION: ExitCode = 1;

/// Creates a child running `program` and blocks until it terminates.
///
/// Implementors only deal with programs that resolved to a path; the
/// "not found" short circuit lives in [`crate::external::launch`].
pub trait Spawner {
    /// Run `program` with `argv` (whose first element is the program as passed
    /// to the child) and the variables of `env`, returning the child's status.
    fn spawn_and_wait(
        &mut self,
        program: &Path,
        argv: &[String],
        env: &Environment,
    ) -> Result<ExitCode, LaunchError>;
}
