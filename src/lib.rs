//! A minimal interactive command interpreter.
//!
//! Each input line is split into words, the first word is resolved to a file
//! (as typed, or through the directories of `PATH`), and the file is run in a
//! child process with `fork` + `execve`. The shell waits for the child and keeps
//! its exit status, which becomes the shell's own status when input ends.
//!
//! The main entry point is [`Interpreter`]. Input comes from any
//! [`io_adapters::LineSource`]; process creation goes through a
//! [`command::Spawner`], which tests replace with a recording double.

pub mod command;
pub mod env;
pub mod external;
pub mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod resolve;
pub mod signal;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
