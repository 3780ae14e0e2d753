//! A playable game: a position plus the history needed to undo moves,
//! detect repetitions and render notation.

use crate::board::BoardSnapshot;
use crate::fen::FenError;
use crate::game_state::GameState;
use crate::move_gen::{generate_legal_moves, is_checkmate, is_stalemate, MoveList};
use crate::san;
use crate::types::{Color, Move, Piece};
use crate::zobrist::ZOBRIST;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors surfaced by [`Game`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The rules engine rejected the move; nothing was changed.
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// No further moves can be made in a finished game.
    #[error("The game is over")]
    GameOver,

    /// A move was submitted for the side that is not to move.
    #[error("It is not {side}'s turn to move")]
    NotYourTurn { side: Color },

    #[error(transparent)]
    Fen(#[from] FenError),
}

/// Result type alias for game operations.
pub type GameResult<T> = Result<T, GameError>;

/// A move as it was played: what moved, what it took, and how it reads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveRecord {
    pub mv: Move,
    pub piece: Piece,
    /// The side that made the move.
    pub color: Color,
    /// The piece removed from the board, en passant victims included.
    pub captured: Option<Piece>,
    pub san: String,
}

/// The operations a move search needs from a rules engine.
///
/// Every `apply_move` made during a search must be paired with an
/// `undo_last_move` before the search returns.
pub trait RulesEngine {
    fn current_turn(&self) -> Color;

    /// Legal moves in the engine's deterministic enumeration order.
    fn legal_moves(&self) -> Vec<Move>;

    fn apply_move(&mut self, mv: Move) -> GameResult<()>;

    /// Reverts the most recent move; returns false if there was none.
    fn undo_last_move(&mut self) -> bool;

    fn board_snapshot(&self) -> BoardSnapshot;
}

#[derive(Clone, Debug)]
struct Ply {
    record: MoveRecord,
    /// Position before the move was made.
    before: GameState,
}

/// A chess game with legality checking, undo and repetition tracking.
#[derive(Clone, Debug)]
pub struct Game {
    initial: GameState,
    state: GameState,
    plies: Vec<Ply>,
    /// Zobrist keys of every position reached, the initial one included.
    keys: Vec<u64>,
}

impl Game {
    /// Starts a game from the standard initial position.
    pub fn new() -> Self {
        Self::from_state(GameState::new())
    }

    /// Starts a game from a FEN position; `reset` returns to it.
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        Ok(Self::from_state(GameState::from_fen(fen)?))
    }

    fn from_state(state: GameState) -> Self {
        Self {
            keys: vec![ZOBRIST.hash(&state)],
            initial: state.clone(),
            state,
            plies: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn fen(&self) -> String {
        self.state.to_fen()
    }

    pub fn current_turn(&self) -> Color {
        self.state.turn
    }

    pub fn legal_moves(&self) -> MoveList {
        generate_legal_moves(&self.state)
    }

    /// Applies a legal move and returns its record. Illegal moves are
    /// rejected without touching the game.
    pub fn apply_move(&mut self, mv: Move) -> GameResult<MoveRecord> {
        let legal = self.checked_legal_moves(mv)?;
        let san = san::to_san(&self.state, &legal, mv);
        self.push_ply(mv, san)
    }

    fn checked_legal_moves(&self, mv: Move) -> GameResult<MoveList> {
        let legal = self.legal_moves();
        if legal.contains(mv) {
            Ok(legal)
        } else {
            Err(GameError::IllegalMove { mv })
        }
    }

    /// Makes an already validated move.
    fn push_ply(&mut self, mv: Move, san: String) -> GameResult<MoveRecord> {
        let piece = self
            .state
            .board
            .piece_at(mv.from)
            .ok_or(GameError::IllegalMove { mv })?;

        let record = MoveRecord {
            mv,
            piece,
            color: self.state.turn,
            captured: self.state.captured_by(mv),
            san,
        };
        trace!(%mv, san = %record.san, "apply");

        let next = self.state.apply_move(mv);
        let before = std::mem::replace(&mut self.state, next);
        self.keys.push(ZOBRIST.hash(&self.state));
        self.plies.push(Ply {
            record: record.clone(),
            before,
        });

        Ok(record)
    }

    /// Reverts the most recent move and returns its record.
    pub fn undo_last_move(&mut self) -> Option<MoveRecord> {
        let ply = self.plies.pop()?;
        self.keys.pop();
        self.state = ply.before;
        trace!(san = %ply.record.san, "undo");
        Some(ply.record)
    }

    /// Every move played so far, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &MoveRecord> + '_ {
        self.plies.iter().map(|ply| &ply.record)
    }

    pub fn ply_count(&self) -> usize {
        self.plies.len()
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.state.board.snapshot()
    }

    /// Returns to the position the game started from.
    pub fn reset(&mut self) {
        debug!(plies = self.plies.len(), "reset");
        *self = Self::from_state(self.initial.clone());
    }

    /// Finds the legal move written in coordinate notation (`e2e4`,
    /// `e7e8q`) or SAN (`Nf3`, `exd5`, `O-O`, `e8=Q+`).
    pub fn parse_move(&self, text: &str) -> Option<Move> {
        let text = text.trim();
        let legal = self.legal_moves();

        if let Some(mv) = Move::from_coordinate(text).filter(|&mv| legal.contains(mv)) {
            return Some(mv);
        }

        let wanted = san::strip_annotations(text).replace('0', "O");
        let found = legal
            .iter()
            .copied()
            .find(|&mv| san::strip_annotations(&san::to_san(&self.state, &legal, mv)) == wanted);
        found
    }

    pub fn is_in_check(&self) -> bool {
        self.state.is_in_check()
    }

    pub fn is_checkmate(&self) -> bool {
        is_checkmate(&self.state)
    }

    pub fn is_stalemate(&self) -> bool {
        is_stalemate(&self.state)
    }

    /// Fifty-move rule or insufficient material.
    pub fn is_draw(&self) -> bool {
        self.state.is_fifty_move_draw() || self.state.is_insufficient_material()
    }

    /// True once the current position has occurred three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let Some(current) = self.keys.last() else {
            return false;
        };
        self.keys.iter().filter(|&key| key == current).count() >= 3
    }

    pub fn is_game_over(&self) -> bool {
        self.legal_moves().is_empty() || self.is_draw() || self.is_threefold_repetition()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for Game {
    fn current_turn(&self) -> Color {
        Game::current_turn(self)
    }

    fn legal_moves(&self) -> Vec<Move> {
        Game::legal_moves(self).as_slice().to_vec()
    }

    /// Search plies skip SAN rendering; their records carry an empty `san`.
    fn apply_move(&mut self, mv: Move) -> GameResult<()> {
        self.checked_legal_moves(mv)?;
        self.push_ply(mv, String::new()).map(|_| ())
    }

    fn undo_last_move(&mut self) -> bool {
        Game::undo_last_move(self).is_some()
    }

    fn board_snapshot(&self) -> BoardSnapshot {
        Game::board_snapshot(self)
    }
}
