pub mod evaluation;
pub mod minimax;
pub mod search;

use chess_core::{Game, Move};

/// Core trait for chess agents
pub trait Agent {
    /// Picks a move for the side to move. The game is used as scratch space
    /// and handed back in the position it arrived in.
    fn best_move(&mut self, game: &mut Game) -> Option<Move>;

    /// Get the agent's name
    fn name(&self) -> &str;
}

pub use evaluation::*;
pub use minimax::MinimaxAgent;
pub use search::*;
