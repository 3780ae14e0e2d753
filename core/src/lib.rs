pub mod board;
pub mod fen;
pub mod game;
pub mod game_state;
pub mod move_gen;
pub mod san;
pub mod tracker;
pub mod types;
pub mod zobrist;

pub use board::*;
pub use fen::{positions, FenError};
pub use game::{Game, GameError, GameResult, MoveRecord, RulesEngine};
pub use game_state::*;
pub use move_gen::*;
pub use tracker::{CapturedSets, GameMode, GameStateTracker};
pub use types::*;
pub use zobrist::ZOBRIST;
