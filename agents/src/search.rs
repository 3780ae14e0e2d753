use crate::evaluation::evaluate;
use chess_core::{Color, Move, RulesEngine};
use std::time::Instant;
use tracing::{debug, error, trace};

/// Score a maximizing node starts from; also what it returns with no moves.
pub const MAX_SENTINEL: i32 = -9999;
/// Score a minimizing node starts from; also what it returns with no moves.
pub const MIN_SENTINEL: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below each root move.
    pub depth: u8,
    /// The side whose material the search maximizes.
    pub perspective: Color,
}

impl SearchConfig {
    pub fn depth(depth: u8) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            perspective: Color::Black,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
}

struct SearchInfo {
    perspective: Color,
    nodes: u64,
}

/// Plain minimax to a fixed depth, scoring leaves with [`evaluate`].
///
/// The engine is left exactly as it was found.
pub fn minimax<E: RulesEngine>(
    engine: &mut E,
    depth: u8,
    maximizing: bool,
    perspective: Color,
) -> i32 {
    let mut info = SearchInfo {
        perspective,
        nodes: 0,
    };
    minimax_internal(engine, depth, maximizing, &mut info)
}

/// Picks the move for the side to move by scoring every root move with a
/// minimizing reply search. Ties go to the move enumerated last.
pub fn choose_move<E: RulesEngine>(engine: &mut E, config: SearchConfig) -> SearchResult {
    let start = Instant::now();
    let mut info = SearchInfo {
        perspective: config.perspective,
        nodes: 0,
    };

    let mut best_move = None;
    let mut best_score = MAX_SENTINEL;

    for mv in engine.legal_moves() {
        let Some(score) = score_move(engine, mv, config.depth, false, &mut info) else {
            continue;
        };
        trace!(%mv, score, "root move");
        if score >= best_score {
            best_score = score;
            best_move = Some(mv);
        }
    }

    debug!(
        best_move = ?best_move.map(|mv| mv.to_string()),
        score = best_score,
        depth = config.depth,
        nodes = info.nodes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );

    SearchResult {
        best_move,
        score: best_score,
        depth: config.depth,
        nodes: info.nodes,
    }
}

fn minimax_internal<E: RulesEngine>(
    engine: &mut E,
    depth: u8,
    maximizing: bool,
    info: &mut SearchInfo,
) -> i32 {
    info.nodes += 1;

    if depth == 0 {
        return evaluate(&engine.board_snapshot(), info.perspective);
    }

    let mut best = if maximizing { MAX_SENTINEL } else { MIN_SENTINEL };

    for mv in engine.legal_moves() {
        let Some(score) = score_move(engine, mv, depth - 1, !maximizing, info) else {
            continue;
        };
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}

/// Applies `mv`, searches the resulting position and takes the move back.
/// Returns `None` if the engine refused the move.
fn score_move<E: RulesEngine>(
    engine: &mut E,
    mv: Move,
    depth: u8,
    maximizing: bool,
    info: &mut SearchInfo,
) -> Option<i32> {
    if let Err(err) = engine.apply_move(mv) {
        error!(%mv, %err, "engine rejected a move it listed as legal");
        return None;
    }
    let score = minimax_internal(engine, depth, maximizing, info);
    if !engine.undo_last_move() {
        error!(%mv, "engine could not undo a move made during search");
    }
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Game, Square};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 2);
        assert_eq!(config.perspective, Color::Black);
        assert_eq!(SearchConfig::depth(1).perspective, Color::Black);
    }

    #[test]
    fn test_depth_zero_is_evaluation() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert_eq!(minimax(&mut game, 0, true, Color::Black), -10);
        assert_eq!(minimax(&mut game, 0, false, Color::White), 10);
    }

    #[test]
    fn test_mated_node_returns_sentinel() {
        // White is checkmated: a maximizing node keeps its starting value.
        let mut game =
            Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(minimax(&mut game, 2, true, Color::Black), MAX_SENTINEL);
        assert_eq!(minimax(&mut game, 2, false, Color::Black), MIN_SENTINEL);
    }

    #[test]
    fn test_black_takes_hanging_queen() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/q2Q2K1 b - - 0 1").unwrap();
        let result = choose_move(&mut game, SearchConfig::depth(1));
        assert_eq!(result.best_move, Some(Move::new(sq("a1"), sq("d1"))));
        assert_eq!(result.score, 90);
    }

    #[test]
    fn test_search_restores_position() {
        let mut game = Game::new();
        game.apply_move(game.parse_move("e4").unwrap()).unwrap();
        let fen = game.fen();
        let plies = game.ply_count();

        let result = choose_move(&mut game, SearchConfig::default());

        assert!(result.best_move.is_some());
        assert!(result.nodes > 0);
        assert_eq!(game.fen(), fen);
        assert_eq!(game.ply_count(), plies);
    }

    #[test]
    fn test_no_moves_gives_no_result() {
        let mut game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = choose_move(&mut game, SearchConfig::default());
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, MAX_SENTINEL);
    }
}
