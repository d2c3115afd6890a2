use crate::env::Environment;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of looking a command name up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommand {
    /// The name as typed already names an existing file.
    Literal(PathBuf),
    /// Found as `dir/name` for the first matching directory of `PATH`.
    Searched(PathBuf),
    /// Neither the name itself nor any `PATH` candidate exists.
    NotFound,
}

impl ResolvedCommand {
    /// Location to execute, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedCommand::Literal(path) | ResolvedCommand::Searched(path) => Some(path),
            ResolvedCommand::NotFound => None,
        }
    }

    /// Whether there is anything to execute.
    pub fn is_found(&self) -> bool {
        !matches!(self, ResolvedCommand::NotFound)
    }
}

/// Resolve a command path the way the interpreter runs it.
///
/// Behavior:
/// - The name as given (absolute, relative, or bare) is checked first and returned
///   unchanged if a file exists there. Explicit paths therefore never hit `PATH`.
/// - Otherwise each `PATH` directory is tried in order as `dir/name`; the first
///   existing file wins.
/// - Without a `PATH` variable, or with an empty name, nothing is found.
///
/// Only existence is checked. A non-executable file still resolves and fails later
/// at exec time.
pub fn resolve(command: &str, env: &Environment) -> ResolvedCommand {
    if command.is_empty() {
        return ResolvedCommand::NotFound;
    }

    if let Some(path) = find_by_path(Path::new(command)) {
        debug!(command, "resolved as given");
        return ResolvedCommand::Literal(path.to_owned());
    }

    let Some(dirs) = env.search_path() else {
        debug!(command, "PATH is not set");
        return ResolvedCommand::NotFound;
    };

    match find_in_path(&dirs, command) {
        Some(path) => {
            debug!(command, path = %path.display(), "resolved via PATH");
            ResolvedCommand::Searched(path)
        }
        None => {
            debug!(command, "not found on PATH");
            ResolvedCommand::NotFound
        }
    }
}

fn find_in_path(dirs: &[String], command: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| PathBuf::from(format!("{dir}/{command}")))
        .find(|candidate| find_by_path(candidate).is_some())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).expect("touch file");
        path
    }

    fn path_env(dirs: &[&Path]) -> Environment {
        let joined = dirs
            .iter()
            .map(|d| d.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(":");
        Environment::from_vars([("PATH", joined)])
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_bypasses_search() {
        let env = Environment::from_vars([("PATH", "/nonexistent")]);
        assert_eq!(
            resolve("/bin/sh", &env),
            ResolvedCommand::Literal(PathBuf::from("/bin/sh"))
        );
    }

    #[test]
    fn absolute_existing_without_path_var() {
        let dir = tempfile::tempdir().unwrap();
        let tool = touch(&dir, "tool");
        let env = Environment::default();
        let name = tool.to_str().unwrap();
        assert_eq!(resolve(name, &env), ResolvedCommand::Literal(tool.clone()));
    }

    #[test]
    fn explicit_path_wins_over_search() {
        let local = tempfile::tempdir().unwrap();
        let on_path = tempfile::tempdir().unwrap();
        let explicit = touch(&local, "tool");
        touch(&on_path, "tool");
        let env = path_env(&[on_path.path()]);

        let resolved = resolve(explicit.to_str().unwrap(), &env);
        assert_eq!(resolved, ResolvedCommand::Literal(explicit));
    }

    #[test]
    fn bare_name_found_in_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = touch(&dir, "my-tool");
        let env = path_env(&[dir.path()]);
        assert_eq!(resolve("my-tool", &env), ResolvedCommand::Searched(tool));
    }

    #[test]
    fn first_directory_match_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let third = tempfile::tempdir().unwrap();
        touch(&second, "ls-like");
        touch(&third, "ls-like");
        let env = path_env(&[first.path(), second.path(), third.path()]);

        let resolved = resolve("ls-like", &env);
        assert_eq!(
            resolved.path(),
            Some(second.path().join("ls-like").as_path())
        );
    }

    #[test]
    fn missing_command_not_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir, "other");
        let env = path_env(&[dir.path(), Path::new("/bin"), Path::new("/usr/bin")]);
        let resolved = resolve("definitely_missing_cmd_xyz", &env);
        assert_eq!(resolved, ResolvedCommand::NotFound);
        assert!(!resolved.is_found());
    }

    #[test]
    fn no_path_variable_only_literal_paths_work() {
        let env = Environment::from_vars([("HOME", "/tmp")]);
        assert_eq!(resolve("definitely_missing_cmd_xyz", &env), ResolvedCommand::NotFound);
    }

    #[test]
    fn non_executable_file_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let data = touch(&dir, "notes.txt");
        let env = path_env(&[dir.path()]);
        assert_eq!(resolve("notes.txt", &env), ResolvedCommand::Searched(data));
    }

    #[test]
    fn nested_name_is_joined_under_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let nested = dir.path().join("sub").join("tool");
        File::create(&nested).unwrap();
        let env = path_env(&[dir.path()]);
        assert_eq!(resolve("sub/tool", &env), ResolvedCommand::Searched(nested));
    }

    #[test]
    fn empty_name_is_not_found() {
        let env = path_env(&[Path::new("/bin")]);
        assert_eq!(resolve("", &env), ResolvedCommand::NotFound);
    }
}
