use chess_agents::SearchConfig;
use chess_core::{Color, GameMode};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "chess", version, about = "Terminal chess with a material-counting bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: Config,

    /// Log filter, e.g. `debug` or `chess_agents=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full-screen board (the default)
    Play,
    /// Line-by-line play on stdin/stdout
    Line,
    /// Print the material evaluation of a position
    Eval {
        /// Position to evaluate; the starting position if omitted
        fen: Option<String>,
    },
    /// Run one bot search and print the chosen move
    Search {
        /// Position to search; the starting position if omitted
        fen: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Plies the bot searches below each of its candidate moves
    #[arg(long, global = true, default_value_t = 2)]
    pub depth: u8,

    /// Delay before the bot answers, in milliseconds
    #[arg(long, global = true, default_value_t = 250)]
    pub delay_ms: u64,

    /// Start in bot mode instead of two-player mode
    #[arg(long, global = true)]
    pub bot: bool,

    /// The side the bot plays
    #[arg(long, global = true, value_enum, default_value_t = Side::Black)]
    pub bot_color: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl Config {
    pub fn search(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            perspective: self.bot_color.into(),
        }
    }

    pub fn session(&self) -> SessionSettings {
        SessionSettings {
            search: self.search(),
            bot_delay: Duration::from_millis(self.delay_ms),
            mode: if self.bot {
                GameMode::VsBot
            } else {
                GameMode::TwoPlayer
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            depth: 2,
            delay_ms: 250,
            bot: false,
            bot_color: Side::Black,
        }
    }
}

/// Everything a [`Session`](crate::session::Session) needs to start.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Its perspective is the color the bot plays.
    pub search: SearchConfig,
    pub bot_delay: Duration,
    pub mode: GameMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Config::default().session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["chess"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config.depth, 2);

        let settings = cli.config.session();
        assert_eq!(settings.mode, GameMode::TwoPlayer);
        assert_eq!(settings.bot_delay, Duration::from_millis(250));
        assert_eq!(settings.search, SearchConfig::default());
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::parse_from(["chess", "line", "--bot", "--bot-color", "white", "--depth", "1"]);
        assert!(matches!(cli.command, Some(Command::Line)));

        let settings = cli.config.session();
        assert_eq!(settings.mode, GameMode::VsBot);
        assert_eq!(settings.search.depth, 1);
        assert_eq!(settings.search.perspective, Color::White);
    }

    #[test]
    fn test_search_takes_fen() {
        let cli = Cli::parse_from(["chess", "search", "8/8/8/8/8/8/8/K1k5 w - - 0 1"]);
        match cli.command {
            Some(Command::Search { fen }) => assert_eq!(fen.as_deref(), Some("8/8/8/8/8/8/8/K1k5 w - - 0 1")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
