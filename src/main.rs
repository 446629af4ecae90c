use anyhow::Result;

use swim_analytics::cli::Command;
use swim_analytics::{handle_analyze, handle_completions, handle_serve, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port, store } => handle_serve(*port, *store),
        Command::Analyze(args) => handle_analyze(args),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
