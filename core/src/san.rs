//! Standard Algebraic Notation for moves.

use crate::game_state::GameState;
use crate::move_gen::{generate_legal_moves, MoveList};
use crate::types::{Move, PieceType};

/// Renders a legal move in SAN, including the check (`+`) or mate (`#`)
/// suffix. `legal` must be the legal move list of `state`.
pub fn to_san(state: &GameState, legal: &MoveList, mv: Move) -> String {
    let Some(piece) = state.board.piece_at(mv.from) else {
        return mv.to_string();
    };

    let mut san = if mv.is_castle(piece) {
        if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        let capture = state.captured_by(mv).is_some();
        let mut san = String::new();

        if piece.piece_type == PieceType::Pawn {
            if capture {
                san.push(mv.from.file().to_char());
            }
        } else {
            san.push(piece.piece_type.to_char().to_ascii_uppercase());
            san.push_str(&disambiguation(state, legal, mv, piece.piece_type));
        }

        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());

        if let Some(promotion) = mv.promotion {
            san.push('=');
            san.push(promotion.to_char().to_ascii_uppercase());
        }
        san
    };

    let next = state.apply_move(mv);
    if next.is_in_check() {
        if generate_legal_moves(&next).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }

    san
}

/// The origin file, rank, or both, needed to tell `mv` apart from another
/// piece of the same kind reaching the same square.
fn disambiguation(state: &GameState, legal: &MoveList, mv: Move, piece_type: PieceType) -> String {
    let rivals: Vec<_> = legal
        .iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && state
                    .board
                    .piece_at(other.from)
                    .is_some_and(|p| p.piece_type == piece_type)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|r| r.from.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|r| r.from.rank() == mv.from.rank());

    match (shares_file, shares_rank) {
        (false, _) => mv.from.file().to_char().to_string(),
        (true, false) => mv.from.rank().to_char().to_string(),
        (true, true) => mv.from.to_string(),
    }
}

/// Strips decorations that do not identify a move (`+`, `#`, `!`, `?`).
pub(crate) fn strip_annotations(san: &str) -> &str {
    san.trim_end_matches(['+', '#', '!', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_of(fen: &str, coordinate: &str) -> String {
        let state = GameState::from_fen(fen).unwrap();
        let legal = generate_legal_moves(&state);
        let mv = Move::from_coordinate(coordinate).unwrap();
        assert!(legal.contains(mv), "{coordinate} is not legal in {fen}");
        to_san(&state, &legal, mv)
    }

    #[test]
    fn test_quiet_moves() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(san_of(start, "e2e4"), "e4");
        assert_eq!(san_of(start, "g1f3"), "Nf3");
    }

    #[test]
    fn test_pawn_capture_names_file() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san_of(fen, "e4d5"), "exd5");
    }

    #[test]
    fn test_en_passant_is_a_capture() {
        assert_eq!(san_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5d6"), "exd6");
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_promotion_with_check() {
        assert_eq!(san_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8q"), "a8=Q+");
        assert_eq!(san_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8n"), "a8=N");
    }

    #[test]
    fn test_disambiguation() {
        // Knights on b1 and f1 can both reach d2.
        let fen = "4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1";
        assert_eq!(san_of(fen, "b1d2"), "Nbd2");
        // Rooks on a1 and a5 share a file.
        let fen = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_of(fen, "a1a3"), "R1a3");
    }

    #[test]
    fn test_mate_suffix() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";
        assert_eq!(san_of(fen, "d8h4"), "Qh4#");
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(strip_annotations("Qh4#"), "Qh4");
        assert_eq!(strip_annotations("e4!?"), "e4");
    }
}
