//! One interactive game: the rules engine, its bookkeeping, the bot and the
//! timer that lets the bot answer after a short pause.

use crate::config::SessionSettings;
use chess_agents::{Agent, MinimaxAgent};
use chess_core::{Color, Game, GameError, GameMode, GameStateTracker, Move, MoveRecord};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What the status line reports, checked in this order. `Draw` covers only
/// the fifty-move rule and insufficient material; stalemate and repetition
/// get their own variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameStatus {
    Checkmate { loser: Color },
    Draw,
    Stalemate,
    ThreefoldRepetition,
    Check { to_move: Color },
    ToMove { to_move: Color },
}

impl GameStatus {
    pub fn of(game: &Game) -> Self {
        let to_move = game.current_turn();
        if game.is_checkmate() {
            GameStatus::Checkmate { loser: to_move }
        } else if game.is_draw() {
            GameStatus::Draw
        } else if game.is_stalemate() {
            GameStatus::Stalemate
        } else if game.is_threefold_repetition() {
            GameStatus::ThreefoldRepetition
        } else if game.is_in_check() {
            GameStatus::Check { to_move }
        } else {
            GameStatus::ToMove { to_move }
        }
    }

    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Check { .. } | GameStatus::ToMove { .. })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Checkmate { loser } => write!(f, "Checkmate! {loser} loses!"),
            GameStatus::Draw => f.write_str("Draw!"),
            GameStatus::Stalemate => f.write_str("Stalemate!"),
            GameStatus::ThreefoldRepetition => f.write_str("Draw by repetition"),
            GameStatus::Check { to_move } => write!(f, "CHECK! {to_move} to move"),
            GameStatus::ToMove { to_move } => write!(f, "{to_move} to move"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    MoveApplied(MoveRecord),
    Undone { plies: u32 },
    Reset,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PendingMove {
    due: Instant,
    /// History length the bot move was scheduled for.
    ply: usize,
}

/// A single deferred bot move that can be cancelled, and that goes stale
/// once the game has moved on from the ply it was scheduled for.
#[derive(Clone, Debug)]
pub struct BotSchedule {
    delay: Duration,
    pending: Option<PendingMove>,
}

impl BotSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, now: Instant, ply: usize) {
        self.pending = Some(PendingMove {
            due: now + self.delay,
            ply,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending move is due, if there is one.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|pending| pending.due.saturating_duration_since(now))
    }

    /// True when the pending move is due and still belongs to `ply`. The
    /// task is consumed when it fires or turns out to be stale.
    pub fn poll(&mut self, now: Instant, ply: usize) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if pending.ply != ply {
            debug!(scheduled = pending.ply, current = ply, "dropping stale bot move");
            self.pending = None;
            return false;
        }
        if now < pending.due {
            return false;
        }
        self.pending = None;
        true
    }
}

pub struct Session {
    game: Game,
    tracker: GameStateTracker,
    mode: GameMode,
    bot: MinimaxAgent,
    bot_color: Color,
    schedule: BotSchedule,
    events: VecDeque<SessionEvent>,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_game(Game::new(), settings)
    }

    /// Starts from an existing game; `reset` returns to its initial position.
    pub fn with_game(game: Game, settings: SessionSettings) -> Self {
        let mut tracker = GameStateTracker::new();
        for record in game.history() {
            tracker.on_move_applied(record);
        }

        let mut session = Self {
            game,
            tracker,
            mode: settings.mode,
            bot: MinimaxAgent::new(settings.search),
            bot_color: settings.search.perspective,
            schedule: BotSchedule::new(settings.bot_delay),
            events: VecDeque::new(),
        };
        session.schedule_bot(Instant::now());
        session
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn tracker(&self) -> &GameStateTracker {
        &self.tracker
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn bot_color(&self) -> Color {
        self.bot_color
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::of(&self.game)
    }

    pub fn is_bot_turn(&self) -> bool {
        self.mode == GameMode::VsBot && self.game.current_turn() == self.bot_color
    }

    pub fn bot_pending(&self) -> bool {
        self.schedule.is_pending()
    }

    /// Plays a move for the human side. Illegal moves leave the session
    /// untouched.
    pub fn submit_move(&mut self, mv: Move) -> Result<MoveRecord, GameError> {
        if self.status().is_over() {
            return Err(GameError::GameOver);
        }
        if self.is_bot_turn() {
            return Err(GameError::NotYourTurn {
                side: self.bot_color.opponent(),
            });
        }

        let record = self.game.apply_move(mv).map_err(|err| {
            warn!(%mv, "rejected move");
            err
        })?;
        self.record(record.clone());
        self.schedule_bot(Instant::now());
        Ok(record)
    }

    /// Plays the bot's move if one is due. Returns the move played.
    pub fn poll_bot(&mut self, now: Instant) -> Option<MoveRecord> {
        if !self.schedule.poll(now, self.game.ply_count()) {
            return None;
        }
        if !self.is_bot_turn() || self.status().is_over() {
            return None;
        }
        self.play_bot_move()
    }

    /// Time until the pending bot move is due.
    pub fn bot_due_in(&self, now: Instant) -> Option<Duration> {
        self.schedule.time_until_due(now)
    }

    fn play_bot_move(&mut self) -> Option<MoveRecord> {
        let mv = self.bot.best_move(&mut self.game)?;
        match self.game.apply_move(mv) {
            Ok(record) => {
                info!(bot = self.bot.name(), san = %record.san, "bot moved");
                self.record(record.clone());
                Some(record)
            }
            Err(err) => {
                error!(%mv, %err, "bot chose a move the rules engine refused");
                None
            }
        }
    }

    /// Takes back the last ply, or the last two in bot mode.
    pub fn undo(&mut self) -> u32 {
        self.schedule.cancel();
        let plies = self.tracker.on_undo(&mut self.game, self.mode);
        info!(plies, "undo");
        self.events.push_back(SessionEvent::Undone { plies });
        self.schedule_bot(Instant::now());
        plies
    }

    pub fn reset(&mut self) {
        self.schedule.cancel();
        self.game.reset();
        self.tracker.on_reset();
        info!(mode = ?self.mode, "new game");
        self.events.push_back(SessionEvent::Reset);
        self.schedule_bot(Instant::now());
    }

    /// Switches between two-player and bot mode. Always starts a new game.
    pub fn toggle_bot_mode(&mut self) -> GameMode {
        self.mode = self.mode.toggled();
        self.reset();
        self.mode
    }

    /// The move list as "n. SAN" lines, one per ply.
    pub fn history_lines(&self) -> Vec<String> {
        self.game
            .history()
            .enumerate()
            .map(|(i, record)| format!("{}. {}", i + 1, record.san))
            .collect()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.events.drain(..)
    }

    fn record(&mut self, record: MoveRecord) {
        self.tracker.on_move_applied(&record);
        self.events.push_back(SessionEvent::MoveApplied(record));

        let status = self.status();
        if status.is_over() {
            info!(%status, "game over");
        }
    }

    fn schedule_bot(&mut self, now: Instant) {
        if self.is_bot_turn() && !self.status().is_over() {
            self.schedule.schedule(now, self.game.ply_count());
        }
    }
}
