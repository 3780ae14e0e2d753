//! Array-based board representation.
use crate::types::*;

/// An 8x8 grid of optional pieces, row 0 = rank 8 and column 0 = file a.
/// This is the layout the evaluator and the presentation layer read.
pub type BoardSnapshot = [[Option<Piece>; 8]; 8];

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Board {
    /// 64 squares, indexed by Square::index()
    squares: [Option<Piece>; 64],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    /// Creates the standard starting position.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();

        for (file, &piece_type) in BACK_RANK.iter().enumerate() {
            board.squares[file] = Some(Piece::new(piece_type, Color::White));
            board.squares[8 + file] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[48 + file] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[56 + file] = Some(Piece::new(piece_type, Color::Black));
        }

        board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index() as usize] = piece;
    }

    /// Moves a piece from one square to another.
    /// Returns the piece previously standing on the destination, if any.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.squares[from.index() as usize].take();
        std::mem::replace(&mut self.squares[to.index() as usize], piece)
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Returns true if the given square contains a piece of the given color.
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Returns true if the given square contains an enemy piece.
    pub fn is_enemy(&self, square: Square, color: Color) -> bool {
        self.is_color(square, color.opponent())
    }

    /// Iterates over occupied squares in a1..h8 order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Squares holding the given piece, in a1..h8 order.
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        self.pieces()
            .filter(move |&(_, p)| p == piece)
            .map(|(sq, _)| sq)
    }

    /// Finds the king of the given color, if one is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.squares_of(Piece::new(PieceType::King, color)).next()
    }

    /// Copies the board into rank-major display order.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut grid: BoardSnapshot = [[None; 8]; 8];
        for (square, piece) in self.pieces() {
            let row = 7 - square.rank().index() as usize;
            let col = square.file().index() as usize;
            grid[row][col] = Some(piece);
        }
        grid
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
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
        let board = Board::starting_position();

        assert_eq!(
            board.piece_at(sq("a1")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("e8")),
            Some(Piece::new(PieceType::King, Color::Black))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
        assert!(board.piece_at(sq("d5")).is_none());
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn test_move_piece() {
        let mut board = Board::starting_position();

        let captured = board.move_piece(sq("e2"), sq("e4"));
        assert!(captured.is_none());
        assert!(board.is_empty(sq("e2")));
        assert_eq!(
            board.piece_at(sq("e4")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );

        let captured = board.move_piece(sq("d8"), sq("d2"));
        assert_eq!(captured, Some(Piece::new(PieceType::Pawn, Color::White)));
    }

    #[test]
    fn test_snapshot_is_rank_major_from_rank_eight() {
        let snapshot = Board::starting_position().snapshot();

        assert_eq!(
            snapshot[0][4],
            Some(Piece::new(PieceType::King, Color::Black))
        );
        assert_eq!(
            snapshot[7][3],
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert!(snapshot[3].iter().all(Option::is_none));
    }

    #[test]
    fn test_king_square_missing() {
        assert_eq!(Board::empty().king_square(Color::White), None);
        assert_eq!(
            Board::starting_position().king_square(Color::Black),
            Some(sq("e8"))
        );
    }
}
