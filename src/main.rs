use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use irg::app::{input, render, AppEvent, Controller, InputEvent};
use irg::core::config::Config;
use irg::core::telemetry::logging::init_logging;
use irg::services::search::{CaseSensitivity, RipgrepBackend};
use irg::services::syntax::SyntaxService;
use irg::services::types::TypeCatalog;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const FRAME_HEIGHT: usize = 20;
const FRAME_WIDTH: usize = 120;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaseArg {
    Smart,
    Sensitive,
    Insensitive,
}

impl From<CaseArg> for CaseSensitivity {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Smart => CaseSensitivity::Smart,
            CaseArg::Sensitive => CaseSensitivity::Sensitive,
            CaseArg::Insensitive => CaseSensitivity::Insensitive,
        }
    }
}

/// Interactive ripgrep: type a pattern per line, `:q` to quit.
#[derive(Debug, Parser)]
#[command(name = "irg", version, about)]
struct Cli {
    /// Case sensitivity mode.
    #[arg(long, value_enum, default_value_t = CaseArg::Smart)]
    case: CaseArg,
    /// Only search files of this type (repeatable).
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,
    /// Skip files of this type (repeatable).
    #[arg(long = "type-not", value_name = "TYPE")]
    types_not: Vec<String>,
    /// Directory or file to search instead of the current directory.
    #[arg(long)]
    path: Option<String>,
    /// Start with preview syntax colouring off (`:syntax` toggles it).
    #[arg(long)]
    no_syntax: bool,
    /// Initial search pattern.
    pattern: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    config.case = cli.case.into();
    config.types = cli.types;
    config.types_not = cli.types_not;
    config.syntax_highlighting = !cli.no_syntax;

    RipgrepBackend::new(&config.search_tool)
        .probe()
        .await
        .with_context(|| {
            format!(
                "{} is not installed or not in PATH (see https://github.com/BurntSushi/ripgrep#installation)",
                config.search_tool.display()
            )
        })?;

    let catalog = match TypeCatalog::load(&config.search_tool).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Type list unavailable: {}", e);
            TypeCatalog::default()
        }
    };

    // Built even when colouring starts off, so `:syntax` can turn it on.
    let decorator = SyntaxService::new(config.theme.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let controller = Controller::new(&config, catalog, tx.clone());

    if let Some(path) = cli.path {
        let _ = tx.send(InputEvent::PathChanged(path).into());
    }
    if let Some(pattern) = cli.pattern {
        let _ = tx.send(InputEvent::PatternChanged(pattern).into());
    }

    spawn_stdin_reader(tx.clone());
    spawn_interrupt_handler(tx);

    controller
        .run(rx, |state| {
            let frame = render::frame(state, &decorator, FRAME_HEIGHT, FRAME_WIDTH);
            let mut stdout = std::io::stdout().lock();
            // A closed stdout only means nobody is watching.
            let _ = writeln!(stdout, "\x1b[2J\x1b[H{frame}");
            let _ = stdout.flush();
        })
        .await;

    Ok(())
}

fn spawn_stdin_reader(events: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match input::parse_line(&line) {
                    Some(event) => {
                        if events.send(event.into()).is_err() {
                            return;
                        }
                    }
                    None => tracing::warn!("Unknown command: {}", line),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
        let _ = events.send(InputEvent::Quit.into());
    });
}

fn spawn_interrupt_handler(events: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = events.send(InputEvent::Quit.into());
        }
    });
}
