//! WASM bindings for tictactoe-core
//!
//! Provides a JavaScript-friendly API for a click-driven page. The page
//! forwards each cell click to `select` and redraws from the returned
//! report, or from the same report handed to its `onTurn` / `onGameOver`
//! callbacks.
//!
//! Callbacks run while `select` is still executing, so they must not call
//! back into the `WasmGame` (wasm-bindgen rejects the recursive borrow).
//! The report carries everything needed to redraw instead.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::{Game, MoveReport, Pos};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
    on_turn: Option<Function>,
    on_game_over: Option<Function>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game with Player One (O) to move
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: Game::new(),
            on_turn: None,
            on_game_over: None,
        }
    }

    /// Register `callback(report)`, called after a move that keeps the game
    /// going. Must not call methods of this game.
    #[wasm_bindgen(js_name = onTurn)]
    pub fn on_turn(&mut self, callback: Function) {
        self.on_turn = Some(callback);
    }

    /// Register `callback(report)`, called after a move that ends the game.
    /// `report.message` holds the text to show and `report.clearBoard` is
    /// set. Must not call methods of this game.
    #[wasm_bindgen(js_name = onGameOver)]
    pub fn on_game_over(&mut self, callback: Function) {
        self.on_game_over = Some(callback);
    }

    /// Handle a click on a cell.
    ///
    /// Returns the move report (`player`, `mark`, `outcome`, `winner`,
    /// `message`, `clearBoard`, `nextPlayer`, `nextMark`, `turnLabel`), or
    /// null if the cell was already marked. An exception thrown by a
    /// callback is rethrown from here; the move itself stays applied.
    pub fn select(&mut self, row: u8, col: u8) -> Result<JsValue, JsValue> {
        let Some(result) = self.inner.select(row, col).map_err(JsError::from)? else {
            return Ok(JsValue::NULL);
        };

        let report = MoveReport::new(result, self.inner.current_player());
        let value = serde_wasm_bindgen::to_value(&report)?;

        let callback = if report.clear_board {
            &self.on_game_over
        } else {
            &self.on_turn
        };
        if let Some(callback) = callback {
            callback.call1(&JsValue::NULL, &value)?;
        }

        Ok(value)
    }

    /// Clear the board and tallies, keeping the current player
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.inner.new_game();
    }

    /// Current player (1 or 2)
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> u8 {
        self.inner.current_player() as u8
    }

    /// Mark of the current player ("O" or "X")
    #[wasm_bindgen(js_name = currentMark)]
    pub fn current_mark(&self) -> String {
        self.inner.current_player().mark().to_string()
    }

    /// Turn indicator text
    #[wasm_bindgen(js_name = turnLabel)]
    pub fn turn_label(&self) -> String {
        self.inner.turn_label()
    }

    /// Mark shown at a cell ("O", "X" or empty string)
    #[wasm_bindgen(js_name = markAt)]
    pub fn mark_at(&self, row: u8, col: u8) -> Result<String, JsError> {
        let pos = Pos::try_from_row_col(row, col)?;
        Ok(self
            .inner
            .board()
            .mark_at(pos)
            .map(|player| player.mark().to_string())
            .unwrap_or_default())
    }

    #[wasm_bindgen(js_name = isOccupied)]
    pub fn is_occupied(&self, row: u8, col: u8) -> Result<bool, JsError> {
        let pos = Pos::try_from_row_col(row, col)?;
        Ok(self.inner.board().is_occupied(pos))
    }

    /// Moves played in the current game
    #[wasm_bindgen(js_name = moveCount)]
    pub fn move_count(&self) -> u8 {
        self.inner.engine().move_count()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
