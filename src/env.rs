use crate::lexer;
use std::collections::HashMap;
use std::env as stdenv;

/// Name of the variable holding the command search path.
pub const PATH_VAR: &str = "PATH";

/// The variables handed to resolved commands and consulted by the path resolver.
///
/// The interpreter owns one `Environment` for its whole lifetime. It is read-only
/// from the point of view of resolution and launching.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the variables of the current process.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn new() -> Self {
        Self::from_vars(stdenv::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// Build an environment from explicit pairs, ignoring the process environment.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Directories to search for a bare command name, in order.
    ///
    /// The raw `PATH=dir1:dir2` entry is split on both `:` and `=` and its first
    /// field (the variable name) is dropped. Empty fields vanish, so `a::b`
    /// yields two directories. Returns `None` when `PATH` is not set.
    pub fn search_path(&self) -> Option<Vec<String>> {
        let value = self.get_var(PATH_VAR)?;
        let entry = format!("{PATH_VAR}={value}");
        Some(lexer::tokenize(&entry, ":=").into_iter().skip(1).collect())
    }

    /// `NAME=value` strings in the form expected by `execve`.
    pub fn entries(&self) -> impl Iterator<Item = String> + '_ {
        self.vars.iter().map(|(k, v)| format!("{k}={v}"))
    }
}
