//! StackPlot CLI

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod commands;

use commands::{dispatch, dispatch_setup, CommandOutcome, PlotSession};

#[derive(Parser)]
#[command(name = "stackplot")]
#[command(about = "StackPlot - interactive stacked comparison plots")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// Plot configuration to load before the first prompt
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Selection qualifying every histogram key, as with the `selection`
    /// command
    #[arg(short, long)]
    selection: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    let mut session = PlotSession::new();
    if let Some(config) = &cli.config {
        session
            .setup(config)
            .with_context(|| format!("cannot set up from {}", config.display()))?;
        println!("configuration loaded from {}", config.display());
    }
    if let Some(selection) = &cli.selection {
        session.selection(selection);
    }

    run_repl(&mut session)
}

/// `setup` re-roots the histogram source, which only the file-backed
/// session supports; everything else goes through the generic dispatch.
fn run_line(line: &str, session: &mut PlotSession) -> CommandOutcome {
    match dispatch_setup(line, session) {
        Some(outcome) => outcome,
        None => dispatch(line, session),
    }
}

fn run_repl(session: &mut PlotSession) -> Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("failed to read piped input")?;
        for line in buffer.lines() {
            if let CommandOutcome::Quit = run_line(line, session) {
                break;
            }
        }
        return Ok(());
    }

    let mut rl = DefaultEditor::new().context("failed to initialize line editor")?;

    println!("StackPlot v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'exit' to quit");
    println!();
    info!("interactive session ready");

    loop {
        match rl.readline("stackplot> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if let CommandOutcome::Quit = run_line(line, session) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}
