//! Bookkeeping derived from a game's move history: the ply counter and the
//! pieces each side has lost.

use crate::game::{Game, MoveRecord};
use crate::types::{Color, Piece};
use tracing::debug;

/// Whether both sides are human or one side is played by the bot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GameMode {
    #[default]
    TwoPlayer,
    VsBot,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::TwoPlayer => GameMode::VsBot,
            GameMode::VsBot => GameMode::TwoPlayer,
        }
    }

    /// Plies reverted by one undo request when `available` plies exist.
    pub fn undo_plies(self, available: u32) -> u32 {
        match self {
            GameMode::VsBot if available >= 2 => 2,
            _ => 1,
        }
    }
}

/// Captured pieces, bucketed by the color that lost them, in capture order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapturedSets {
    white: Vec<Piece>,
    black: Vec<Piece>,
}

impl CapturedSets {
    /// Pieces the given color has lost.
    pub fn lost_by(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.white.is_empty() && self.black.is_empty()
    }

    fn push(&mut self, loser: Color, piece: Piece) {
        match loser {
            Color::White => self.white.push(piece),
            Color::Black => self.black.push(piece),
        }
    }

    fn clear(&mut self) {
        self.white.clear();
        self.black.clear();
    }
}

/// Keeps the move counter and captured pieces in step with a [`Game`].
///
/// All mutation goes through `on_move_applied`, `on_undo` and `on_reset`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GameStateTracker {
    move_count: u32,
    captured: CapturedSets,
}

impl GameStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn captured(&self) -> &CapturedSets {
        &self.captured
    }

    /// Records a move the rules engine has just applied.
    pub fn on_move_applied(&mut self, record: &MoveRecord) {
        self.move_count += 1;
        if let Some(piece) = record.captured {
            self.captured.push(record.color.opponent(), piece);
        }
    }

    /// Undoes one ply (two in bot mode when at least two exist), then
    /// rebuilds the captured pieces from the remaining history.
    /// Returns the number of plies actually undone.
    pub fn on_undo(&mut self, game: &mut Game, mode: GameMode) -> u32 {
        let wanted = mode.undo_plies(self.move_count);
        let mut undone = 0;

        while undone < wanted && game.undo_last_move().is_some() {
            undone += 1;
        }

        self.move_count = self.move_count.saturating_sub(undone);
        self.recompute(game.history());
        debug!(undone, move_count = self.move_count, "undo");
        undone
    }

    pub fn on_reset(&mut self) {
        self.move_count = 0;
        self.captured.clear();
    }

    /// Rebuilds both capture buckets by replaying `history` from the start.
    pub fn recompute<'a>(&mut self, history: impl IntoIterator<Item = &'a MoveRecord>) {
        self.captured.clear();
        for record in history {
            if let Some(piece) = record.captured {
                self.captured.push(record.color.opponent(), piece);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    fn play(game: &mut Game, tracker: &mut GameStateTracker, moves: &[&str]) {
        for text in moves {
            let mv = game.parse_move(text).unwrap();
            let record = game.apply_move(mv).unwrap();
            tracker.on_move_applied(&record);
        }
    }

    fn pawn(color: Color) -> Piece {
        Piece::new(PieceType::Pawn, color)
    }

    #[test]
    fn test_capture_goes_to_losers_bucket() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4", "d5", "exd5", "Qxd5"]);

        assert_eq!(tracker.move_count(), 4);
        assert_eq!(tracker.captured().lost_by(Color::Black), &[pawn(Color::Black)]);
        assert_eq!(tracker.captured().lost_by(Color::White), &[pawn(Color::White)]);
    }

    #[test]
    fn test_two_player_undo_reverts_one_ply() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4", "d5", "exd5"]);

        let undone = tracker.on_undo(&mut game, GameMode::TwoPlayer);

        assert_eq!(undone, 1);
        assert_eq!(tracker.move_count(), 2);
        assert!(tracker.captured().is_empty());
        assert_eq!(game.ply_count(), 2);
    }

    #[test]
    fn test_bot_undo_reverts_two_plies() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4", "d5", "exd5", "Qxd5"]);

        let undone = tracker.on_undo(&mut game, GameMode::VsBot);

        assert_eq!(undone, 2);
        assert_eq!(tracker.move_count(), 2);
        assert!(tracker.captured().is_empty());
        assert_eq!(game.history().map(|r| r.san.as_str()).collect::<Vec<_>>(), ["e4", "d5"]);
    }

    #[test]
    fn test_bot_undo_falls_back_to_single_ply() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4"]);

        assert_eq!(tracker.on_undo(&mut game, GameMode::VsBot), 1);
        assert_eq!(tracker.move_count(), 0);
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn test_undo_with_empty_history_is_harmless() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();

        assert_eq!(tracker.on_undo(&mut game, GameMode::TwoPlayer), 0);
        assert_eq!(tracker.move_count(), 0);
    }

    #[test]
    fn test_undo_keeps_earlier_captures() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4", "d5", "exd5", "Qxd5", "Nc3"]);

        tracker.on_undo(&mut game, GameMode::TwoPlayer);

        assert_eq!(tracker.move_count(), 4);
        assert_eq!(tracker.captured().lost_by(Color::Black), &[pawn(Color::Black)]);
        assert_eq!(tracker.captured().lost_by(Color::White), &[pawn(Color::White)]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(&mut game, &mut tracker, &["e4", "d5", "exd5"]);

        tracker.on_reset();

        assert_eq!(tracker, GameStateTracker::new());
    }

    #[test]
    fn test_recompute_matches_incremental_bookkeeping() {
        let mut game = Game::new();
        let mut tracker = GameStateTracker::new();
        play(
            &mut game,
            &mut tracker,
            &["e4", "d5", "exd5", "Nf6", "c4", "c6", "dxc6", "Nxc6"],
        );

        let mut rebuilt = GameStateTracker::new();
        rebuilt.recompute(game.history());

        assert_eq!(rebuilt.captured(), tracker.captured());
    }

    #[test]
    fn test_random_games_unwind_to_empty() {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut game = Game::new();
            let mut tracker = GameStateTracker::new();

            for _ in 0..40 {
                let legal = game.legal_moves();
                let Some(&mv) = legal.as_slice().choose(&mut rng) else {
                    break;
                };
                let record = game.apply_move(mv).unwrap();
                tracker.on_move_applied(&record);
            }

            while tracker.move_count() > 0 {
                assert!(tracker.on_undo(&mut game, GameMode::VsBot) > 0);
                let mut rebuilt = GameStateTracker::new();
                rebuilt.recompute(game.history());
                assert_eq!(rebuilt.captured(), tracker.captured());
            }

            assert!(tracker.captured().is_empty());
            assert_eq!(game.ply_count(), 0);
            assert_eq!(game.state(), &crate::GameState::new());
        }
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(GameMode::TwoPlayer.toggled(), GameMode::VsBot);
        assert_eq!(GameMode::VsBot.toggled(), GameMode::TwoPlayer);
        assert_eq!(GameMode::VsBot.undo_plies(1), 1);
        assert_eq!(GameMode::TwoPlayer.undo_plies(5), 1);
    }
}
