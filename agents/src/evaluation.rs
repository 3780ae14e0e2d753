use chess_core::{BoardSnapshot, Color, PieceType};

/// Material worth of a piece kind, in pawn tenths.
pub const fn material_value(piece_type: PieceType) -> i32 {
    match piece_type {
        PieceType::Pawn => 10,
        PieceType::Knight => 30,
        PieceType::Bishop => 30,
        PieceType::Rook => 50,
        PieceType::Queen => 90,
        PieceType::King => 900,
    }
}

/// Scores a position by material alone.
/// Positive values favor `perspective`, negative values its opponent.
pub fn evaluate(board: &BoardSnapshot, perspective: Color) -> i32 {
    board
        .iter()
        .flatten()
        .flatten()
        .map(|piece| {
            let value = material_value(piece.piece_type);
            if piece.color == perspective {
                value
            } else {
                -value
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{GameState, Piece};

    fn snapshot(fen: &str) -> BoardSnapshot {
        GameState::from_fen(fen).unwrap().board.snapshot()
    }

    #[test]
    fn test_starting_position_is_balanced() {
        let board = GameState::new().board.snapshot();
        assert_eq!(evaluate(&board, Color::White), 0);
        assert_eq!(evaluate(&board, Color::Black), 0);
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let board: BoardSnapshot = [[None; 8]; 8];
        assert_eq!(evaluate(&board, Color::Black), 0);
    }

    #[test]
    fn test_material_edge() {
        // Black is missing its queen.
        let board = snapshot("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(evaluate(&board, Color::Black), -90);
        assert_eq!(evaluate(&board, Color::White), 90);
    }

    #[test]
    fn test_kings_and_pawn() {
        let board = snapshot("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(evaluate(&board, Color::Black), -10);
    }

    #[test]
    fn test_value_table() {
        let values: Vec<i32> = PieceType::ALL.iter().map(|&pt| material_value(pt)).collect();
        assert_eq!(values.iter().sum::<i32>(), 10 + 30 + 30 + 50 + 90 + 900);

        let mut board: BoardSnapshot = [[None; 8]; 8];
        board[0][0] = Some(Piece::new(PieceType::Rook, Color::Black));
        board[7][7] = Some(Piece::new(PieceType::Knight, Color::White));
        assert_eq!(evaluate(&board, Color::Black), 20);
    }
}
