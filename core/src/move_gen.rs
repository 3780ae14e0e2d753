use crate::game_state::{GameState, DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, STRAIGHTS};
use crate::types::{Color, File, Move, Piece, PieceType, Square};

const MAX_MOVES: usize = 256;

/// Queens walk the diagonals first, then the straight lines.
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    DIAGONALS[0],
    DIAGONALS[1],
    DIAGONALS[2],
    DIAGONALS[3],
    STRAIGHTS[0],
    STRAIGHTS[1],
    STRAIGHTS[2],
    STRAIGHTS[3],
];

/// A list of moves with a fixed capacity to avoid allocations.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl MoveList {
    pub const fn new() -> Self {
        const A1: Square = match Square::from_index(0) {
            Some(sq) => sq,
            None => unreachable!(),
        };
        Self {
            moves: [Move::new(A1, A1); MAX_MOVES],
            count: 0,
        }
    }

    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.count < MAX_MOVES, "Move list overflow");
        self.moves[self.count] = mv;
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Generates all legal moves for the current position.
///
/// The order is deterministic: pawns, knights, bishops, rooks, queens, the
/// king, then castling; within a piece kind origins run a1..h8. The search
/// relies on this order for its tie-break.
pub fn generate_legal_moves(state: &GameState) -> MoveList {
    let pseudo = generate_pseudo_legal_moves(state);
    let mut legal = MoveList::new();

    for &mv in pseudo.iter() {
        if !state.apply_move(mv).is_side_in_check(state.turn) {
            legal.push(mv);
        }
    }

    legal
}

/// Generates all pseudo-legal moves (not checking for king safety).
fn generate_pseudo_legal_moves(state: &GameState) -> MoveList {
    let mut moves = MoveList::new();
    let color = state.turn;

    generate_pawn_moves(state, color, &mut moves);
    generate_leaper_moves(state, color, PieceType::Knight, &KNIGHT_DELTAS, &mut moves);
    generate_slider_moves(state, color, PieceType::Bishop, &DIAGONALS, &mut moves);
    generate_slider_moves(state, color, PieceType::Rook, &STRAIGHTS, &mut moves);
    generate_slider_moves(state, color, PieceType::Queen, &QUEEN_DIRECTIONS, &mut moves);
    generate_leaper_moves(state, color, PieceType::King, &KING_DELTAS, &mut moves);
    generate_castling_moves(state, color, &mut moves);

    moves
}

/// Pushes a pawn move, expanding it into the four promotions on the last rank.
fn push_pawn_move(from: Square, to: Square, color: Color, moves: &mut MoveList) {
    if to.rank() == color.promotion_rank() {
        for promotion in PieceType::PROMOTIONS {
            moves.push(Move::new_promotion(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

fn generate_pawn_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let board = &state.board;
    let direction = color.pawn_direction();
    for from in board.squares_of(Piece::new(PieceType::Pawn, color)) {
        // Pushes
        if let Some(to) = from.offset(0, direction) {
            if board.is_empty(to) {
                push_pawn_move(from, to, color, moves);

                if from.rank() == color.pawn_rank() {
                    if let Some(double) = to.offset(0, direction) {
                        if board.is_empty(double) {
                            moves.push(Move::new(from, double));
                        }
                    }
                }
            }
        }

        // Captures, en passant included
        for df in [-1, 1] {
            if let Some(to) = from.offset(df, direction) {
                if board.is_enemy(to, color) {
                    push_pawn_move(from, to, color, moves);
                } else if state.en_passant == Some(to) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
}

/// Knight and king steps.
fn generate_leaper_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    deltas: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let board = &state.board;

    for from in board.squares_of(Piece::new(piece_type, color)) {
        for &(df, dr) in deltas {
            if let Some(to) = from.offset(df, dr) {
                if !board.is_color(to, color) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
}

/// Bishop, rook and queen rays.
fn generate_slider_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let board = &state.board;

    for from in board.squares_of(Piece::new(piece_type, color)) {
        for &(df, dr) in directions {
            let mut current = from;
            while let Some(to) = current.offset(df, dr) {
                if board.is_empty(to) {
                    moves.push(Move::new(from, to));
                } else {
                    if board.is_enemy(to, color) {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
                current = to;
            }
        }
    }
}

fn generate_castling_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let rights = state.castling.get(color);
    if !rights.any() {
        return;
    }

    let back_rank = color.back_rank();
    let Some(king) = state.board.king_square(color) else {
        return;
    };
    if king.rank() != back_rank || king.file().index() != 4 {
        return;
    }
    if state.is_attacked_by(king, color.opponent()) {
        return;
    }

    let square = |file: u8| File::new(file).map(|f| Square::new(f, back_rank));
    let rook = Some(Piece::new(PieceType::Rook, color));
    let safe = |sq: Square| !state.is_attacked_by(sq, color.opponent());

    if rights.kingside {
        if let (Some(f), Some(g), Some(h)) = (square(5), square(6), square(7)) {
            if state.board.is_empty(f)
                && state.board.is_empty(g)
                && state.board.piece_at(h) == rook
                && safe(f)
                && safe(g)
            {
                moves.push(Move::new(king, g));
            }
        }
    }

    if rights.queenside {
        if let (Some(a), Some(b), Some(c), Some(d)) = (square(0), square(1), square(2), square(3))
        {
            if state.board.is_empty(b)
                && state.board.is_empty(c)
                && state.board.is_empty(d)
                && state.board.piece_at(a) == rook
                && safe(c)
                && safe(d)
            {
                moves.push(Move::new(king, c));
            }
        }
    }
}

/// Checks if the current position is checkmate.
pub fn is_checkmate(state: &GameState) -> bool {
    state.is_in_check() && generate_legal_moves(state).is_empty()
}

/// Checks if the current position is stalemate.
pub fn is_stalemate(state: &GameState) -> bool {
    !state.is_in_check() && generate_legal_moves(state).is_empty()
}
