/// A single chess position: placement, side to move, castling rights,
/// en passant target and move clocks.
use crate::board::*;
use crate::types::*;

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const STRAIGHTS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Complete state of a chess position, matching FEN components.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    /// En passant target square (if a pawn just made a double move)
    pub en_passant: Option<Square>,
    /// Half-move clock for the fifty-move rule
    pub halfmove_clock: u16,
    /// Full move number (incremented after Black's move)
    pub fullmove_number: u16,
}

impl GameState {
    /// Creates a new game in the starting position.
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            turn: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates an empty position for testing.
    pub fn empty() -> Self {
        Self {
            board: Board::empty(),
            turn: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Returns true if the game is drawn by the fifty-move rule.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Returns true if neither side can force mate: bare kings, a single
    /// minor piece, or only bishops that all stand on one square colour.
    /// Two knights against a bare king play on.
    pub fn is_insufficient_material(&self) -> bool {
        let mut knights = 0;
        let mut bishop_shades = [0u8; 2];

        for (square, piece) in self.board.pieces() {
            match piece.piece_type {
                PieceType::King => {}
                PieceType::Knight => knights += 1,
                PieceType::Bishop => {
                    let shade = (square.file().index() + square.rank().index()) % 2;
                    bishop_shades[shade as usize] += 1;
                }
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            }
        }

        let bishops = bishop_shades[0] + bishop_shades[1];
        match (knights, bishops) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (0, _) => bishop_shades.contains(&0),
            _ => false,
        }
    }

    /// Returns the piece a move would remove from the board, including the
    /// pawn taken en passant.
    pub fn captured_by(&self, mv: Move) -> Option<Piece> {
        let mover = self.board.piece_at(mv.from)?;
        if let Some(target) = self.board.piece_at(mv.to) {
            return Some(target);
        }
        if self.is_en_passant(mover, mv) {
            return Some(Piece::new(PieceType::Pawn, mover.color.opponent()));
        }
        None
    }

    fn is_en_passant(&self, mover: Piece, mv: Move) -> bool {
        mover.piece_type == PieceType::Pawn
            && Some(mv.to) == self.en_passant
            && mv.from.file() != mv.to.file()
    }

    /// Applies a move to the position, returning the new position.
    /// This does NOT check legality; a move from an empty square returns
    /// an unchanged copy.
    pub fn apply_move(&self, mv: Move) -> Self {
        let mut next = self.clone();

        let Some(piece) = self.board.piece_at(mv.from) else {
            return next;
        };

        next.en_passant = None;

        if mv.is_castle(piece) {
            next.apply_castle(mv);
            next.halfmove_clock += 1;
        } else {
            let en_passant = self.is_en_passant(piece, mv);
            let captured = next.board.move_piece(mv.from, mv.to);

            if en_passant {
                next.board
                    .set_piece(Square::new(mv.to.file(), mv.from.rank()), None);
            }

            if let Some(promotion) = mv.promotion {
                next.board
                    .set_piece(mv.to, Some(Piece::new(promotion, piece.color)));
            }

            if piece.piece_type == PieceType::Pawn && mv.from.distance(mv.to) == 2 {
                next.en_passant = mv.from.offset(0, piece.color.pawn_direction());
            }

            if piece.piece_type == PieceType::Pawn || captured.is_some() || en_passant {
                next.halfmove_clock = 0;
            } else {
                next.halfmove_clock += 1;
            }
        }

        next.castling = self.castling.update_after_move(mv.from, mv.to);

        if self.turn == Color::Black {
            next.fullmove_number += 1;
        }
        next.turn = self.turn.opponent();

        next
    }

    fn apply_castle(&mut self, mv: Move) {
        let rank = mv.from.rank();
        let (rook_file, rook_target) = if mv.to.file() > mv.from.file() {
            (7, 5)
        } else {
            (0, 3)
        };

        self.board.move_piece(mv.from, mv.to);
        if let (Some(from), Some(to)) = (File::new(rook_file), File::new(rook_target)) {
            self.board
                .move_piece(Square::new(from, rank), Square::new(to, rank));
        }
    }

    /// Returns true if the given square is attacked by the given color.
    pub fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        self.is_pawn_attacked(square, attacker)
            || self.is_leaper_attacked(square, attacker, PieceType::Knight, &KNIGHT_DELTAS)
            || self.is_leaper_attacked(square, attacker, PieceType::King, &KING_DELTAS)
            || self.is_slider_attacked(square, attacker)
    }

    fn is_pawn_attacked(&self, square: Square, attacker: Color) -> bool {
        // An attacking pawn stands one rank behind the target from its own
        // point of view.
        let back = -attacker.pawn_direction();
        let pawn = Piece::new(PieceType::Pawn, attacker);

        [-1, 1].iter().any(|&df| {
            square
                .offset(df, back)
                .is_some_and(|from| self.board.piece_at(from) == Some(pawn))
        })
    }

    fn is_leaper_attacked(
        &self,
        square: Square,
        attacker: Color,
        piece_type: PieceType,
        deltas: &[(i8, i8)],
    ) -> bool {
        let leaper = Piece::new(piece_type, attacker);
        deltas.iter().any(|&(df, dr)| {
            square
                .offset(df, dr)
                .is_some_and(|from| self.board.piece_at(from) == Some(leaper))
        })
    }

    fn is_slider_attacked(&self, square: Square, attacker: Color) -> bool {
        DIAGONALS
            .iter()
            .any(|&(df, dr)| self.ray_attacker(square, df, dr, attacker, PieceType::Bishop))
            || STRAIGHTS
                .iter()
                .any(|&(df, dr)| self.ray_attacker(square, df, dr, attacker, PieceType::Rook))
    }

    /// Walks a ray until the first piece and checks whether it is an
    /// attacker of the given slider kind (or a queen).
    fn ray_attacker(
        &self,
        square: Square,
        df: i8,
        dr: i8,
        attacker: Color,
        slider: PieceType,
    ) -> bool {
        let mut current = square;

        while let Some(next) = current.offset(df, dr) {
            if let Some(piece) = self.board.piece_at(next) {
                return piece.color == attacker
                    && (piece.piece_type == slider || piece.piece_type == PieceType::Queen);
            }
            current = next;
        }

        false
    }

    /// Returns true if the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.is_side_in_check(self.turn)
    }

    /// Returns true if the given side is in check. A side without a king is
    /// never in check.
    pub fn is_side_in_check(&self, color: Color) -> bool {
        self.board
            .king_square(color)
            .is_some_and(|king| self.is_attacked_by(king, color.opponent()))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_starting_position() {
        let state = GameState::new();
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.castling, CastlingRights::all());
        assert!(state.en_passant.is_none());
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);
    }

    #[test]
    fn test_apply_pawn_move() {
        let state = GameState::new();
        let new_state = state.apply_move(Move::new(sq("e2"), sq("e4")));

        assert_eq!(new_state.turn, Color::Black);
        assert_eq!(new_state.en_passant, Some(sq("e3")));
        assert_eq!(new_state.halfmove_clock, 0);
        assert_eq!(new_state.fullmove_number, 1);
    }

    #[test]
    fn test_en_passant_capture_removes_pawn() {
        let state = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let mv = Move::new(sq("e5"), sq("d6"));

        assert_eq!(
            state.captured_by(mv),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );

        let next = state.apply_move(mv);
        assert!(next.board.is_empty(sq("d5")));
        assert_eq!(
            next.board.piece_at(sq("d6")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );
    }

    #[test]
    fn test_castle_moves_rook() {
        let state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let next = state.apply_move(Move::new(sq("e8"), sq("c8")));

        assert_eq!(
            next.board.piece_at(sq("d8")),
            Some(Piece::new(PieceType::Rook, Color::Black))
        );
        assert!(next.board.is_empty(sq("a8")));
        assert!(!next.castling.black.any());
        assert!(next.castling.white.any());
        assert_eq!(next.fullmove_number, 2);
    }

    #[test]
    fn test_is_attacked() {
        let mut state = GameState::empty();
        state
            .board
            .set_piece(sq("e4"), Some(Piece::new(PieceType::Rook, Color::White)));

        assert!(state.is_attacked_by(sq("e1"), Color::White));
        assert!(state.is_attacked_by(sq("e8"), Color::White));
        assert!(state.is_attacked_by(sq("a4"), Color::White));
        assert!(state.is_attacked_by(sq("h4"), Color::White));
        assert!(!state.is_attacked_by(sq("d5"), Color::White));
    }

    #[test]
    fn test_pawn_attacks_follow_color() {
        let mut state = GameState::empty();
        state
            .board
            .set_piece(sq("e4"), Some(Piece::new(PieceType::Pawn, Color::White)));
        state
            .board
            .set_piece(sq("e5"), Some(Piece::new(PieceType::Pawn, Color::Black)));

        assert!(state.is_attacked_by(sq("d5"), Color::White));
        assert!(!state.is_attacked_by(sq("d3"), Color::White));
        assert!(state.is_attacked_by(sq("f4"), Color::Black));
        assert!(!state.is_attacked_by(sq("f6"), Color::Black));
    }

    #[test]
    fn test_insufficient_material() {
        let bare = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(bare.is_insufficient_material());

        let minor = GameState::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(minor.is_insufficient_material());

        let rook = GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(!rook.is_insufficient_material());
    }

    #[test]
    fn test_two_knights_play_on() {
        let knights = GameState::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        assert!(!knights.is_insufficient_material());

        let knight_each = GameState::from_fen("4kn2/8/8/8/8/8/8/1N2K3 w - - 0 1").unwrap();
        assert!(!knight_each.is_insufficient_material());
    }

    #[test]
    fn test_bishops_on_one_colour() {
        // c1 and f8 are both dark squares
        let same = GameState::from_fen("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(same.is_insufficient_material());

        let pair = GameState::from_fen("4k3/8/8/8/8/8/2B5/2B1K3 w - - 0 1").unwrap();
        assert!(!pair.is_insufficient_material());

        let opposite = GameState::from_fen("4k1b1/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(!opposite.is_insufficient_material());
    }
}
