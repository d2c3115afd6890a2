use crate::command::{self, ExitCode, Spawner};
use crate::env::Environment;
use crate::external::{self, ForkExec};
use crate::io_adapters::{Input, LineSource};
use crate::lexer;
use crate::resolve::resolve;
use std::io::Write;
use tracing::{debug, error, warn};

/// The only command handled without spawning a process.
pub const EXIT_BUILTIN: &str = "exit";

/// What the loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Go back to waiting for the next line.
    Continue,
    /// Stop the loop; the shell exits with this status.
    Terminate(ExitCode),
}

/// A minimal interactive interpreter that runs external commands one at a time.
///
/// The interpreter keeps a single "current status": the exit status of the last
/// command that was resolved and launched. Blank lines leave it untouched.
///
/// Example
/// ```no_run
/// use simple_shell::Interpreter;
/// use simple_shell::io_adapters::ScriptedInput;
///
/// let mut sh = Interpreter::default();
/// let mut input = ScriptedInput::from_lines(["echo hello world"]);
/// let code = sh.repl(&mut input);
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    spawner: Box<dyn Spawner>,
    diagnostics: Box<dyn Write>,
    program_name: String,
    prompt: String,
    status: ExitCode,
    line_number: usize,
}

impl Interpreter {
    /// Create an interpreter that prints no prompt and reports to standard error.
    pub fn new(
        program_name: impl Into<String>,
        env: Environment,
        spawner: Box<dyn Spawner>,
    ) -> Self {
        Self {
            env,
            spawner,
            diagnostics: Box::new(std::io::stderr()),
            program_name: program_name.into(),
            prompt: String::new(),
            status: command::SUCCESS,
            line_number: 0,
        }
    }

    /// Prompt shown before each line is read.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Redirect "not found" diagnostics, e.g. into a [`crate::io_adapters::MemWriter`].
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Write>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Status of the last launched command, 0 before any command ran.
    pub fn status(&self) -> ExitCode {
        self.status
    }

    /// Tokenize, resolve and run one line of input.
    pub fn execute_line(&mut self, line: &str) -> Control {
        self.line_number += 1;

        let tokens = lexer::tokenize(line, lexer::WHITESPACE);
        let Some(name) = tokens.first() else {
            return Control::Continue;
        };
        debug!(?tokens, "tokenized line {}", self.line_number);

        if name == EXIT_BUILTIN {
            if tokens.len() > 1 {
                debug!(ignored = ?&tokens[1..], "arguments to exit are ignored");
            }
            return Control::Terminate(command::SUCCESS);
        }

        let resolved = resolve(name, &self.env);
        if !resolved.is_found() {
            self.report_not_found(name);
        }
        self.status = external::launch(self.spawner.as_mut(), &resolved, &tokens, &self.env);
        debug!(status = self.status, "command finished");
        Control::Continue
    }

    /// Read and execute lines from `source` until it ends, `exit` is typed or the
    /// user interrupts at the prompt. Returns the shell's own exit status.
    pub fn repl(&mut self, source: &mut dyn LineSource) -> ExitCode {
        loop {
            let input = match source.read_line(&self.prompt) {
                Ok(input) => input,
                Err(err) => {
                    error!("{err:#}");
                    return self.status;
                }
            };

            match input {
                Input::Line(line) => {
                    if let Control::Terminate(code) = self.execute_line(&line) {
                        return code;
                    }
                }
                Input::Interrupted => {
                    debug!("interrupted at prompt");
                    return command::SUCCESS;
                }
                Input::Eof => return self.status,
            }
        }
    }

    fn report_not_found(&mut self, name: &str) {
        let written = writeln!(
            self.diagnostics,
            "{}: {}: {}: not found",
            self.program_name, self.line_number, name
        );
        if let Err(err) = written {
            warn!("failed to write diagnostic: {err}");
        }
    }
}

impl Default for Interpreter {
    /// Interpreter named `simple_shell` over the process environment, launching
    /// commands with [`ForkExec`].
    fn default() -> Self {
        let name = "simple_shell";
        Self::new(name, Environment::new(), Box::new(ForkExec::new(name)))
    }
}
