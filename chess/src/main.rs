mod config;
mod interactive;
mod line;
mod session;

use chess_agents::{choose_move, evaluate, SearchConfig};
use chess_core::{positions, Color, Game, GameError};
use clap::Parser;
use config::{Cli, Command};
use interactive::InteractiveGame;
use session::Session;
use std::fs::File;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, ParseError};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Game(#[from] GameError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] ParseError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let command = cli.command.unwrap_or(Command::Play);
    init_logging(
        cli.log_level.as_deref(),
        cli.log_file.as_deref(),
        matches!(command, Command::Play),
    )?;

    match command {
        Command::Play => {
            info!(settings = ?cli.config, "starting full-screen game");
            InteractiveGame::new(cli.config.session()).run()?;
        }
        Command::Line => {
            let mut session = Session::new(cli.config.session());
            line::run(&mut session, io::stdin().lock(), &mut io::stdout())?;
        }
        Command::Eval { fen } => {
            let game = load(fen.as_deref())?;
            line::display_board(&game, &mut io::stdout())?;

            let board = game.board_snapshot();
            println!("FEN: {}", game.fen());
            for color in [Color::Black, Color::White] {
                println!("Material for {color}: {}", evaluate(&board, color));
            }
        }
        Command::Search { fen } => {
            let mut game = load(fen.as_deref())?;
            let config = SearchConfig {
                depth: cli.config.depth,
                perspective: game.current_turn(),
            };

            println!("Position: {}", game.fen());
            println!("Searching {} to depth {}...", config.perspective, config.depth);

            let start = Instant::now();
            let result = choose_move(&mut game, config);
            let elapsed = start.elapsed();

            match result.best_move {
                Some(best_move) => {
                    println!("\nBest move: {best_move}");
                    println!("Score: {}", result.score);
                    println!("Nodes: {}", result.nodes);
                    println!("Time: {:.3}s", elapsed.as_secs_f64());
                }
                None => println!("No legal moves available"),
            }
        }
    }

    Ok(())
}

fn load(fen: Option<&str>) -> Result<Game, GameError> {
    Game::from_fen(fen.unwrap_or(positions::STARTING))
}

/// Installs the global subscriber. `--log-level` wins over `RUST_LOG`,
/// which wins over the `warn` default. The full-screen board owns the
/// terminal, so it only logs when given a file.
fn init_logging(
    level: Option<&str>,
    file: Option<&std::path::Path>,
    owns_terminal: bool,
) -> Result<(), CliError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        None if owns_terminal => {}
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}
