use anyhow::{Context, Result};
use argh::FromArgs;
use simple_shell::Interpreter;
use simple_shell::command::ExitCode;
use simple_shell::env::Environment;
use simple_shell::external::ForkExec;
use simple_shell::io_adapters::{EditorInput, LineSource, StreamInput};
use simple_shell::signal::Interrupt;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str = "#simple_shell$ ";

#[derive(FromArgs)]
/// Read commands line by line and run each one as a child process.
struct Args {
    #[argh(option, default = "String::from(DEFAULT_PROMPT)")]
    /// prompt printed before each line when standard input is a terminal.
    prompt: String,

    #[argh(option, default = "String::from(\"warn\")")]
    /// log filter used when RUST_LOG is not set, e.g. "debug".
    log: String,

    #[argh(switch)]
    /// do not keep a history of entered lines.
    no_history: bool,
}

fn main() {
    let args: Args = argh::from_env();
    init_logging(&args.log);

    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("simple_shell: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    let program_name = std::env::args()
        .next()
        .unwrap_or_else(|| "simple_shell".to_string());

    let interrupt = Interrupt::install().context("failed to register SIGINT handler")?;

    // The prompt and line editing are only meaningful to a person at a terminal.
    let interactive = std::io::stdin().is_terminal();
    let mut input: Box<dyn LineSource> = if interactive {
        Box::new(EditorInput::new(interrupt, !args.no_history)?)
    } else {
        Box::new(StreamInput::stdin(interrupt)?)
    };
    let prompt = if interactive { args.prompt } else { String::new() };

    let mut sh = Interpreter::new(
        &program_name,
        Environment::new(),
        Box::new(ForkExec::new(&program_name)),
    )
    .with_prompt(prompt);
    Ok(sh.repl(input.as_mut()))
}
