//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::board::Board;
use crate::game_state::GameState;
use crate::types::{CastlingRights, Color, File, Piece, PieceType, Rank, SideCastlingRights, Square};
use thiserror::Error;

/// FEN parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("Invalid FEN format: {0}")]
    InvalidFormat(String),
    #[error("Invalid piece character: '{0}'")]
    InvalidPiece(char),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid castling rights: {0}")]
    InvalidCastling(String),
    #[error("Invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Missing {0} king")]
    MissingKing(Color),
}

impl GameState {
    /// Parses a FEN string into a game state. Both kings must be present.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        let [placement, turn, castling, en_passant, halfmove, fullmove] = parts[..] else {
            return Err(FenError::InvalidFormat(format!(
                "Expected 6 fields, got {}",
                parts.len()
            )));
        };

        let board = parse_board(placement)?;
        for color in [Color::White, Color::Black] {
            if board.king_square(color).is_none() {
                return Err(FenError::MissingKing(color));
            }
        }

        let turn = match turn {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::InvalidColor(turn.to_string())),
        };

        Ok(GameState {
            board,
            turn,
            castling: parse_castling(castling)?,
            en_passant: parse_en_passant(en_passant)?,
            halfmove_clock: parse_number(halfmove)?,
            fullmove_number: parse_number(fullmove)?,
        })
    }

    /// Converts the game state to a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            board_to_fen(&self.board),
            if self.turn == Color::White { "w" } else { "b" },
            castling_to_fen(self.castling),
            self.en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_number(field: &str) -> Result<u16, FenError> {
    field
        .parse::<u16>()
        .map_err(|_| FenError::InvalidNumber(field.to_string()))
}

/// Parses the placement field, rank 8 first.
fn parse_board(board_str: &str) -> Result<Board, FenError> {
    let mut board = Board::empty();
    let ranks: Vec<&str> = board_str.split('/').collect();

    if ranks.len() != 8 {
        return Err(FenError::InvalidFormat(format!(
            "Expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        let rank_number = 8 - row;
        let rank = Rank::new(7 - row as u8)
            .ok_or_else(|| FenError::InvalidFormat(format!("Bad rank {rank_number}")))?;
        let mut file_idx = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty) = ch.to_digit(10) {
                if !(1..=8).contains(&empty) {
                    return Err(FenError::InvalidFormat(format!(
                        "Bad empty-square count '{ch}' in rank {rank_number}"
                    )));
                }
                file_idx += empty as u8;
                if file_idx > 8 {
                    return Err(FenError::InvalidFormat(format!(
                        "Too many squares in rank {rank_number}"
                    )));
                }
                continue;
            }

            let file = File::new(file_idx).ok_or_else(|| {
                FenError::InvalidFormat(format!("Too many squares in rank {rank_number}"))
            })?;
            board.set_piece(Square::new(file, rank), Some(piece_from_char(ch)?));
            file_idx += 1;
        }

        if file_idx != 8 {
            return Err(FenError::InvalidFormat(format!(
                "Rank {rank_number} has {file_idx} squares, expected 8"
            )));
        }
    }

    Ok(board)
}

fn board_to_fen(board: &Board) -> String {
    let mut fen = String::new();

    for (row, rank) in board.snapshot().iter().enumerate() {
        let mut empty_count = 0;

        for square in rank {
            match square {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            fen.push_str(&empty_count.to_string());
        }
        if row < 7 {
            fen.push('/');
        }
    }

    fen
}

fn piece_from_char(ch: char) -> Result<Piece, FenError> {
    let piece_type = PieceType::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    Ok(Piece::new(piece_type, color))
}

fn parse_castling(castling_str: &str) -> Result<CastlingRights, FenError> {
    if castling_str == "-" {
        return Ok(CastlingRights::none());
    }

    let mut white = SideCastlingRights::none();
    let mut black = SideCastlingRights::none();

    for ch in castling_str.chars() {
        match ch {
            'K' => white.kingside = true,
            'Q' => white.queenside = true,
            'k' => black.kingside = true,
            'q' => black.queenside = true,
            _ => return Err(FenError::InvalidCastling(castling_str.to_string())),
        }
    }

    Ok(CastlingRights { white, black })
}

fn castling_to_fen(castling: CastlingRights) -> String {
    let flags = [
        (castling.white.kingside, 'K'),
        (castling.white.queenside, 'Q'),
        (castling.black.kingside, 'k'),
        (castling.black.queenside, 'q'),
    ];
    let s: String = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, ch)| *ch)
        .collect();

    if s.is_empty() { "-".to_string() } else { s }
}

fn parse_en_passant(ep_str: &str) -> Result<Option<Square>, FenError> {
    if ep_str == "-" {
        return Ok(None);
    }

    Square::from_algebraic(ep_str)
        .map(Some)
        .ok_or_else(|| FenError::InvalidEnPassant(ep_str.to_string()))
}

/// Standard FEN positions for testing.
pub mod positions {
    /// Starting position.
    pub const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Kiwipete position - good for testing complex positions.
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    /// Position after 1.e4 e5.
    pub const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
}
