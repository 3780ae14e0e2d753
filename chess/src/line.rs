use crate::session::Session;
use chess_core::{Color, File, Game, Rank, Square};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Instant;
use tracing::warn;

const HELP: &str = "Enter moves in SAN (Nf3, exd5, O-O, e8=Q) or coordinates (e2e4, e7e8q)
Commands: undo, new, bot, history, help, quit";

/// Plays on a line-oriented terminal until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> io::Result<()> {
    writeln!(out, "Chess - line mode")?;
    writeln!(out, "{HELP}")?;

    let mut lines = input.lines();
    loop {
        wait_for_bot(session, out)?;
        display_board(session.game(), out)?;
        display_status(session, out)?;

        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "undo" => {
                let plies = session.undo();
                if plies == 0 {
                    writeln!(out, "Nothing to undo")?;
                }
            }
            "new" => session.reset(),
            "bot" => {
                session.toggle_bot_mode();
                writeln!(out, "Mode: {:?}", session.mode())?;
            }
            "history" => {
                for entry in session.history_lines() {
                    writeln!(out, "{entry}")?;
                }
            }
            text => match session.game().parse_move(text) {
                Some(mv) => {
                    if let Err(err) = session.submit_move(mv) {
                        writeln!(out, "{err}")?;
                    }
                }
                None => {
                    warn!(input = text, "unparsable move");
                    writeln!(out, "Not a legal move: {text} (type 'help')")?;
                }
            },
        }
    }

    Ok(())
}

/// Blocks until any pending bot move has been played.
fn wait_for_bot<W: Write>(session: &mut Session, out: &mut W) -> io::Result<()> {
    while let Some(wait) = session.bot_due_in(Instant::now()) {
        thread::sleep(wait);
        if let Some(record) = session.poll_bot(Instant::now()) {
            writeln!(out, "Bot played: {}", record.san)?;
        }
    }
    Ok(())
}

fn display_status<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    let captured = session.tracker().captured();
    for color in [Color::White, Color::Black] {
        let lost = captured.lost_by(color);
        if !lost.is_empty() {
            let symbols: String = lost.iter().map(|piece| piece.symbol()).collect();
            writeln!(out, "{color} lost: {symbols}")?;
        }
    }
    writeln!(out, "{}", session.status())
}

pub fn display_board<W: Write>(game: &Game, out: &mut W) -> io::Result<()> {
    let state = game.state();
    writeln!(out, "\n  a b c d e f g h")?;
    writeln!(out, "  ---------------")?;

    for rank_idx in (0..8).rev() {
        let Some(rank) = Rank::new(rank_idx) else {
            continue;
        };
        write!(out, "{} ", rank.to_char())?;

        for file_idx in 0..8 {
            let Some(file) = File::new(file_idx) else {
                continue;
            };
            match state.board.piece_at(Square::new(file, rank)) {
                Some(piece) => write!(out, "{} ", piece.symbol())?,
                None => write!(out, ". ")?,
            }
        }

        writeln!(out, "| {}", rank.to_char())?;
    }

    writeln!(out, "  ---------------")?;
    writeln!(out, "  a b c d e f g h\n")?;
    writeln!(out, "Move {}", state.fullmove_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use chess_core::GameMode;
    use std::io::Cursor;
    use std::time::Duration;

    fn play(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run(session, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_moves_and_commands() {
        let mut session = Session::new(SessionSettings::default());
        let out = play(&mut session, "e4\nd5\nexd5\nhistory\nundo\nquit\n");

        assert!(out.contains("1. e4\n2. d5\n3. exd5"));
        assert!(out.contains("Black lost: ♟"));
        assert_eq!(session.history_lines(), ["1. e4", "2. d5"]);
    }

    #[test]
    fn test_bad_input_is_reported() {
        let mut session = Session::new(SessionSettings::default());
        let out = play(&mut session, "e5\nbanana\n");

        assert!(out.contains("Not a legal move: e5"));
        assert!(out.contains("Not a legal move: banana"));
        assert_eq!(session.game().ply_count(), 0);
    }

    #[test]
    fn test_bot_replies() {
        let mut settings = SessionSettings::default();
        settings.mode = GameMode::VsBot;
        settings.bot_delay = Duration::ZERO;
        let mut session = Session::new(settings);

        let out = play(&mut session, "e4\nquit\n");

        assert!(out.contains("Bot played: "));
        assert_eq!(session.game().ply_count(), 2);
    }

    #[test]
    fn test_board_rendering() {
        let mut out = Vec::new();
        display_board(&Game::new(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ | 8"));
        assert!(text.contains("4 . . . . . . . . | 4"));
    }
}
