use crate::{
    search::{choose_move, SearchConfig},
    Agent,
};
use chess_core::{Game, Move};

pub struct MinimaxAgent {
    name: String,
    config: SearchConfig,
}

impl MinimaxAgent {
    pub fn new(config: SearchConfig) -> Self {
        MinimaxAgent {
            name: format!("Minimax(depth={})", config.depth),
            config,
        }
    }
}

impl Default for MinimaxAgent {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Agent for MinimaxAgent {
    fn best_move(&mut self, game: &mut Game) -> Option<Move> {
        choose_move(game, self.config).best_move
    }

    fn name(&self) -> &str {
        &self.name
    }
}
