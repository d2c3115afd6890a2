use crate::signal::Interrupt;
use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read, Result as IoResult, Write};
use std::os::fd::AsFd;
use std::rc::Rc;

/// One event from the input side of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text without its trailing newline.
    Line(String),
    /// The user asked to cancel while the shell was waiting for input.
    Interrupted,
    /// No more input will arrive.
    Eof,
}

/// Source of command lines for the interpreter.
///
/// An `Err` means the source broke down and the loop should stop.
pub trait LineSource {
    /// Block until the next [`Input`] is available. `prompt` may be empty.
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

/// Terminal input through `rustyline`.
///
/// Ctrl-C typed at the prompt comes back from the editor as
/// [`ReadlineError::Interrupted`]; a SIGINT sent from elsewhere is seen through
/// the interrupt pipe once the editor returns.
pub struct EditorInput {
    editor: DefaultEditor,
    interrupt: Interrupt,
    record_history: bool,
}

impl EditorInput {
    pub fn new(interrupt: Interrupt, record_history: bool) -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialise line editor")?;
        Ok(Self {
            editor,
            interrupt,
            record_history,
        })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        // Interrupts that arrived while a child was running are not ours.
        self.interrupt.take();
        let readline = self.editor.readline(prompt);
        if self.interrupt.take() {
            // whatever was read is released with `readline`
            return Ok(Input::Interrupted);
        }

        match readline {
            Ok(line) => {
                if self.record_history && !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err).context("failed to read input line"),
        }
    }
}

/// Line input from a pipe or a file.
///
/// Before blocking, the source is polled together with the interrupt pipe, so a
/// SIGINT while waiting for a line returns [`Input::Interrupted`] immediately.
/// Lines already buffered are handed out without waiting.
pub struct StreamInput<R> {
    reader: BufReader<R>,
    interrupt: Interrupt,
}

impl StreamInput<File> {
    /// Read from a duplicate of the process's standard input.
    pub fn stdin(interrupt: Interrupt) -> Result<Self> {
        let fd = std::io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .context("failed to duplicate standard input")?;
        Ok(Self::new(File::from(fd), interrupt))
    }
}

impl<R: Read + AsFd> StreamInput<R> {
    pub fn new(source: R, interrupt: Interrupt) -> Self {
        Self {
            reader: BufReader::new(source),
            interrupt,
        }
    }

    /// Block until the source is readable or an interrupt arrives.
    /// Returns `true` for an interrupt.
    fn wait_readable(&self) -> Result<bool> {
        loop {
            let mut fds = [
                PollFd::new(self.interrupt.as_fd(), PollFlags::POLLIN),
                PollFd::new(self.reader.get_ref().as_fd(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(err) => return Err(err).context("failed to wait for input"),
            }
            if fds[0].revents().is_some_and(|r| !r.is_empty()) {
                return Ok(true);
            }
            if fds[1].revents().is_some_and(|r| !r.is_empty()) {
                return Ok(false);
            }
        }
    }
}

impl<R: Read + AsFd> LineSource for StreamInput<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Input> {
        // Interrupts that arrived while a child was running are not ours.
        self.interrupt.take();

        let mut line = Vec::new();
        loop {
            let buffered = self.reader.buffer();
            if let Some(end) = buffered.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&buffered[..end]);
                self.reader.consume(end + 1);
                return Ok(Input::Line(finish_line(line)));
            }
            line.extend_from_slice(buffered);
            let taken = buffered.len();
            self.reader.consume(taken);

            if self.wait_readable()? {
                self.interrupt.take();
                // the partial line is dropped with `line`
                return Ok(Input::Interrupted);
            }

            match self.reader.fill_buf() {
                Ok(filled) if filled.is_empty() => {
                    return Ok(if line.is_empty() {
                        Input::Eof
                    } else {
                        Input::Line(finish_line(line))
                    });
                }
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err).context("failed to read input line"),
            }
        }
    }
}

fn finish_line(mut line: Vec<u8>) -> String {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

/// Memory-backed line source that replays a fixed sequence of inputs.
///
/// Yields [`Input::Eof`] once the sequence is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    inputs: VecDeque<Input>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Convenience: one [`Input::Line`] per element.
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|l| Input::Line(l.into())))
    }

    /// Prompts that were passed to `read_line`, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Inputs not consumed yet.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front().unwrap_or(Input::Eof))
    }
}

/// Memory-backed writer for capturing diagnostics.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
