use minesweeper_agent as ms;
use wasm_bindgen::prelude::*;

/// A game session held on the JS side between calls.
#[wasm_bindgen]
pub struct Session {
    game: ms::Game,
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new(
        height: usize,
        width: usize,
        mines: usize,
        seed: Option<u64>,
    ) -> Result<Session, String> {
        console_error_panic_hook::set_once();

        let config = ms::GameConfig {
            height,
            width,
            mines,
            seed,
        };
        let game = ms::Game::new(config).map_err(|e| e.to_string())?;
        Ok(Session { game })
    }

    /// Plays one move and returns the serialized snapshot.
    pub fn step(&mut self) -> Result<Vec<u8>, String> {
        self.game.step().map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, String> {
        self.game.snapshot().serialize().map_err(|e| e.to_string())
    }

    /// 0 while playing, 1 when won, 2 when lost.
    pub fn state(&self) -> u8 {
        match self.game.state() {
            ms::GameState::Playing => 0,
            ms::GameState::Won => 1,
            ms::GameState::Lost => 2,
        }
    }

    /// Row-major cell view: the clue for opened cells, -2 for proven mines,
    /// -1 for everything else.
    pub fn cells(&self) -> Vec<i8> {
        let board = self.game.board();
        let agent = self.game.agent();
        ms::grid(board.height(), board.width())
            .map(|cell| match self.game.clues().get(&cell) {
                Some(&clue) => clue as i8,
                None if agent.mines().contains(&cell) => -2,
                None => -1,
            })
            .collect()
    }
}
