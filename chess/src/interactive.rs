use crate::config::SessionSettings;
use crate::session::{Session, SessionEvent};
use chess_core::{Color, File, GameMode, Move, PieceType, Rank, Square};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
    ExecutableCommand, QueueableCommand,
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How long to wait for a key when no bot move is pending.
const IDLE_POLL: Duration = Duration::from_millis(500);
const PANEL_COLUMN: u16 = 26;
const HISTORY_ROWS: usize = 10;

pub struct InteractiveGame {
    session: Session,
    cursor_pos: (u8, u8), // (file, rank) in 0-7 range
    selected_square: Option<Square>,
    legal_moves_for_selected: Vec<Move>,
    message: String,
}

impl InteractiveGame {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            session: Session::new(settings),
            cursor_pos: (4, 1), // Start at e2
            selected_square: None,
            legal_moves_for_selected: Vec::new(),
            message: String::from("Use hjkl to move, Enter to select/move, q to quit"),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        // Setup terminal
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(Hide)?;
        stdout.execute(Clear(ClearType::All))?;

        let result = self.game_loop();

        // Cleanup
        stdout.execute(Show)?;
        terminal::disable_raw_mode()?;
        stdout.execute(Clear(ClearType::All))?;
        stdout.execute(MoveTo(0, 0))?;

        result
    }

    fn game_loop(&mut self) -> io::Result<()> {
        loop {
            self.take_events();
            self.draw_board()?;

            let timeout = self
                .session
                .bot_due_in(Instant::now())
                .unwrap_or(IDLE_POLL);

            if event::poll(timeout)? {
                if let Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                }) = event::read()?
                {
                    match code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1, 0),
                        KeyCode::Char('j') | KeyCode::Down => self.move_cursor(0, -1),
                        KeyCode::Char('k') | KeyCode::Up => self.move_cursor(0, 1),
                        KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1, 0),
                        KeyCode::Enter | KeyCode::Char(' ') => self.handle_selection(),
                        KeyCode::Char('u') => self.undo_move(),
                        KeyCode::Char('n') => self.new_game(),
                        KeyCode::Char('b') => self.toggle_bot(),
                        _ => {}
                    }
                }
            }

            if self.session.bot_pending() {
                self.session.poll_bot(Instant::now());
            }
        }

        Ok(())
    }

    /// Turns session events into the message line.
    fn take_events(&mut self) {
        let bot_color = self.session.bot_color();
        for event in self.session.drain_events() {
            self.message = match event {
                SessionEvent::MoveApplied(record) if record.color == bot_color => {
                    format!("Bot played: {}", record.san)
                }
                SessionEvent::MoveApplied(record) => format!("Moved: {}", record.san),
                SessionEvent::Undone { plies: 0 } => String::from("Nothing to undo"),
                SessionEvent::Undone { plies } => format!("Took back {plies} ply"),
                SessionEvent::Reset => String::from("New game started!"),
            };
        }
    }

    fn move_cursor(&mut self, dx: i8, dy: i8) {
        let new_file = self.cursor_pos.0 as i8 + dx;
        let new_rank = self.cursor_pos.1 as i8 + dy;

        if (0..8).contains(&new_file) && (0..8).contains(&new_rank) {
            self.cursor_pos = (new_file as u8, new_rank as u8);
        }
    }

    fn cursor_square(&self) -> Option<Square> {
        Some(Square::new(
            File::new(self.cursor_pos.0)?,
            Rank::new(self.cursor_pos.1)?,
        ))
    }

    fn clear_selection(&mut self) {
        self.selected_square = None;
        self.legal_moves_for_selected.clear();
    }

    fn handle_selection(&mut self) {
        let Some(cursor_square) = self.cursor_square() else {
            return;
        };

        if self.selected_square.is_some() {
            // Promotions always pick the queen
            let chosen = self
                .legal_moves_for_selected
                .iter()
                .copied()
                .find(|m| {
                    m.to == cursor_square
                        && matches!(m.promotion, None | Some(PieceType::Queen))
                });
            self.clear_selection();

            if let Some(mv) = chosen {
                if let Err(err) = self.session.submit_move(mv) {
                    self.message = err.to_string();
                }
                return;
            }
        }

        if self.session.is_bot_turn() {
            self.message = String::from("Bot is thinking...");
            return;
        }

        let game = self.session.game();
        if let Some(piece) = game.state().board.piece_at(cursor_square) {
            if piece.color == game.current_turn() {
                self.legal_moves_for_selected = game
                    .legal_moves()
                    .iter()
                    .filter(|m| m.from == cursor_square)
                    .copied()
                    .collect();
                self.selected_square = Some(cursor_square);
                self.message = format!("Selected {} at {}", piece.piece_type.name(), cursor_square);
            }
        }
    }

    fn undo_move(&mut self) {
        self.clear_selection();
        self.session.undo();
    }

    fn new_game(&mut self) {
        self.clear_selection();
        self.cursor_pos = (4, 1); // e2
        self.session.reset();
    }

    fn toggle_bot(&mut self) {
        self.clear_selection();
        self.cursor_pos = (4, 1);
        let mode = self.session.toggle_bot_mode();
        self.take_events();
        if mode == GameMode::VsBot {
            self.message = format!(
                "Playing against the bot! You are {}",
                self.session.bot_color().opponent()
            );
        }
    }

    fn draw_board(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.execute(MoveTo(0, 0))?;
        let game = self.session.game();

        // Title
        println!("Chess (vim keys: hjkl)\r");
        println!("Enter=select/move, u=undo, n=new, b=bot, q=quit\r");
        println!("\r");

        // Board with coordinates
        println!("  a b c d e f g h  \r");
        println!(" ┌─────────────────┐\r");

        for rank_idx in (0..8u8).rev() {
            print!("{}│ ", rank_idx + 1);

            for file_idx in 0..8u8 {
                let (Some(file), Some(rank)) = (File::new(file_idx), Rank::new(rank_idx)) else {
                    continue;
                };
                let square = Square::new(file, rank);

                let is_cursor = self.cursor_pos == (file_idx, rank_idx);
                let is_selected = self.selected_square == Some(square);
                let is_legal_move = self.legal_moves_for_selected.iter().any(|m| m.to == square);

                // Set background color
                if is_cursor {
                    stdout.execute(SetBackgroundColor(TermColor::Yellow))?;
                } else if is_selected {
                    stdout.execute(SetBackgroundColor(TermColor::Green))?;
                } else if is_legal_move {
                    stdout.execute(SetBackgroundColor(TermColor::Blue))?;
                } else if (file_idx + rank_idx) % 2 == 0 {
                    stdout.execute(SetBackgroundColor(TermColor::DarkGrey))?;
                } else {
                    stdout.execute(SetBackgroundColor(TermColor::Black))?;
                }

                // Draw piece or empty square
                if let Some(piece) = game.state().board.piece_at(square) {
                    if piece.color == Color::White {
                        stdout.execute(SetForegroundColor(TermColor::White))?;
                    } else {
                        stdout.execute(SetForegroundColor(TermColor::Magenta))?;
                    }

                    print!("{} ", piece.symbol());
                } else {
                    print!("  ");
                }

                stdout.execute(ResetColor)?;
            }

            println!("│{}\r", rank_idx + 1);
        }

        println!(" └─────────────────┘\r");
        println!("  a b c d e f g h  \r");
        println!("\r");

        // Status message
        stdout.queue(Clear(ClearType::CurrentLine))?;
        println!("{}\r", self.message);

        self.draw_panel(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    /// Status, captured pieces and the tail of the move list, right of the board.
    fn draw_panel(&self, stdout: &mut io::Stdout) -> io::Result<()> {
        let captured = self.session.tracker().captured();
        let lost = |color: Color| -> String {
            captured
                .lost_by(color)
                .iter()
                .map(|piece| piece.symbol().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        let mode = match self.session.mode() {
            GameMode::TwoPlayer => String::from("2-Player Mode"),
            GameMode::VsBot => format!("Bot: ON ({})", self.session.bot_color()),
        };

        let mut lines = vec![
            self.session.status().to_string(),
            mode,
            String::new(),
            format!("White lost: {}", lost(Color::White)),
            format!("Black lost: {}", lost(Color::Black)),
            String::new(),
            String::from("Moves:"),
        ];
        let history = self.session.history_lines();
        let skip = history.len().saturating_sub(HISTORY_ROWS);
        lines.extend(history.into_iter().skip(skip));
        lines.resize(lines.len().max(7 + HISTORY_ROWS), String::new());

        for (row, line) in lines.iter().enumerate() {
            stdout
                .queue(MoveTo(PANEL_COLUMN, 3 + row as u16))?
                .queue(Clear(ClearType::UntilNewLine))?
                .queue(Print(line))?;
        }
        Ok(())
    }
}
