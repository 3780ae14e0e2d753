use crate::game_state::GameState;
use crate::types::{CastlingRights, Color, Piece, Square};

/// Zobrist hashing for chess positions.
/// Uses pre-computed random numbers for each piece-square combination.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    /// Random values for each piece type, color, and square
    piece_square: [[[u64; 64]; 6]; 2],
    /// Random value for side to move (XOR when black to move)
    black_to_move: u64,
    /// Random values for castling rights
    castling: [u64; 16],
    /// Random values for en passant files
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Creates a new set of Zobrist keys with deterministic random values.
    /// Uses a fixed seed for reproducibility.
    pub fn new() -> Self {
        // xorshift64 with a fixed seed
        let mut rng = 0x123456789ABCDEFu64;
        let mut next_random = || {
            rng ^= rng << 13;
            rng ^= rng >> 7;
            rng ^= rng << 17;
            rng
        };

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in 0..2 {
            for piece_type in 0..6 {
                for square in 0..64 {
                    piece_square[color][piece_type][square] = next_random();
                }
            }
        }

        let black_to_move = next_random();

        let castling = std::array::from_fn(|_| next_random());
        let en_passant = std::array::from_fn(|_| next_random());

        Self {
            piece_square,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Gets the Zobrist key for a piece on a square.
    pub fn piece_square_key(&self, piece: Piece, square: Square) -> u64 {
        self.piece_square[piece.color.index()][piece.piece_type as usize][square.index() as usize]
    }

    /// Gets the Zobrist key for the side to move.
    pub fn side_to_move_key(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    /// Gets the Zobrist key for castling rights.
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.bits()]
    }

    /// Gets the Zobrist key for en passant square.
    pub fn en_passant_key(&self, square: Option<Square>) -> u64 {
        match square {
            Some(sq) => self.en_passant[sq.file().index() as usize],
            None => 0,
        }
    }

    /// Hashes the parts of a position that decide repetition: placement,
    /// side to move, castling rights and en passant target. Move clocks
    /// are left out.
    pub fn hash(&self, state: &GameState) -> u64 {
        state
            .board
            .pieces()
            .fold(0, |key, (square, piece)| key ^ self.piece_square_key(piece, square))
            ^ self.side_to_move_key(state.turn)
            ^ self.castling_key(state.castling)
            ^ self.en_passant_key(state.en_passant)
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Global Zobrist keys instance.
/// Initialized once and shared across the application.
pub static ZOBRIST: std::sync::LazyLock<ZobristKeys> = std::sync::LazyLock::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    fn mv(s: &str) -> Move {
        Move::from_coordinate(s).unwrap()
    }

    #[test]
    fn test_transposition_hashes_equal() {
        let start = GameState::new();
        let a = start.apply_move(mv("g1f3")).apply_move(mv("g8f6")).apply_move(mv("b1c3"));
        let b = start.apply_move(mv("b1c3")).apply_move(mv("g8f6")).apply_move(mv("g1f3"));

        assert_eq!(ZOBRIST.hash(&a), ZOBRIST.hash(&b));
    }

    #[test]
    fn test_side_to_move_changes_hash() {
        let white = GameState::new();
        let mut black = white.clone();
        black.turn = Color::Black;

        assert_ne!(ZOBRIST.hash(&white), ZOBRIST.hash(&black));
    }

    #[test]
    fn test_clocks_do_not_affect_hash() {
        let a = GameState::new();
        let mut b = a.clone();
        b.halfmove_clock = 12;
        b.fullmove_number = 40;

        assert_eq!(ZOBRIST.hash(&a), ZOBRIST.hash(&b));
    }
}
